use crate::error::{Error, Result};
use crate::point::{GeoBoundingBox, GeoPoint};

/// Boundary of a simple polygon, in drawing order. The ring may or may not
/// repeat its first point at the end; `open` gives the points without it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ring {
    pub points: Vec<GeoPoint>,
}

impl Ring {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Ring { points }
    }

    pub fn info(&self) {
        log::info!("ring: len: {}", self.points.len());
        log::info!("ring: closed: {}", self.is_closed());
        if let Some(b) = self.bbox() {
            log::info!("ring: wgs bbox: {}", b);
        }
        if let Some(c) = self.centroid() {
            log::info!("ring: centroid: {}", c);
        }
    }

    /// Exact comparison, no epsilon.
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => self.points.len() > 1 && first == last,
            _ => false,
        }
    }

    pub fn open(&self) -> &[GeoPoint] {
        if self.is_closed() {
            &self.points[..self.points.len() - 1]
        } else {
            &self.points
        }
    }

    /// The ring with its first point repeated at the end, appended only if
    /// it is not already there.
    pub fn closed(&self) -> Vec<GeoPoint> {
        let mut ret = self.points.clone();
        if let Some(first) = self.points.first() {
            if !self.is_closed() {
                ret.push(*first);
            }
        }
        ret
    }

    pub fn ensure_polygon(&self) -> Result<()> {
        let n = self.open().len();
        if n < 3 {
            return Err(Error::InvalidGeometry { points: n });
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (i, p) in self.points.iter().enumerate() {
            p.validate(i)?;
        }
        Ok(())
    }

    pub fn bbox(&self) -> Option<GeoBoundingBox> {
        let first = self.points.first()?;
        let init = GeoBoundingBox::from(first, first);
        Some(self.points.iter().fold(init, |b, p| b.extend(p)))
    }

    /// Vertex average of the open ring. This is what the simulation
    /// backend takes as the request location, not the area centroid.
    pub fn centroid(&self) -> Option<GeoPoint> {
        let open = self.open();
        if open.is_empty() {
            return None;
        }
        let n = open.len() as f64;
        let (lat, lng) = open
            .iter()
            .fold((0f64, 0f64), |(lat, lng), p| (lat + p.lat, lng + p.lng));
        Some(GeoPoint::new(lat / n, lng / n))
    }

    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Ring { points }
    }
}

impl From<Vec<GeoPoint>> for Ring {
    fn from(points: Vec<GeoPoint>) -> Self {
        Ring { points }
    }
}

impl From<Vec<(f64, f64)>> for Ring {
    fn from(pairs: Vec<(f64, f64)>) -> Self {
        Ring {
            points: pairs
                .into_iter()
                .map(|(lat, lng)| GeoPoint::new(lat, lng))
                .collect(),
        }
    }
}

impl From<&geo::LineString<f64>> for Ring {
    fn from(ls: &geo::LineString<f64>) -> Self {
        Ring {
            points: ls.0.iter().map(|c| GeoPoint::from(*c)).collect(),
        }
    }
}

impl From<&Ring> for geo::Polygon<f64> {
    fn from(ring: &Ring) -> Self {
        let coords: Vec<geo::Coord<f64>> = ring.points.iter().map(|p| (*p).into()).collect();
        geo::Polygon::new(coords.into(), vec![])
    }
}
