use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A WGS84 position in decimal degrees, stored latitude first.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "lon", alias = "longitude")]
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        GeoPoint { lat, lng }
    }

    /// Checks that both axes are finite and inside the degree range.
    /// `index` is the position of the point in its ring, used for reporting.
    pub fn validate(&self, index: usize) -> Result<()> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(Error::coordinate(
                index,
                format!("non-finite value in {}", self),
            ));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::coordinate(
                index,
                format!("latitude {} outside [-90, 90]", self.lat),
            ));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::coordinate(
                index,
                format!("longitude {} outside [-180, 180]", self.lng),
            ));
        }
        Ok(())
    }

    /// Reads a `{ "lat": .., "lng": .. }` object as sent by the drawing UI.
    /// Missing or non-numeric axes are coordinate errors, not JSON errors.
    pub fn from_json(index: usize, value: &Value) -> Result<Self> {
        let axis = |names: &[&str]| -> Result<f64> {
            let found = names.iter().find_map(|n| value.get(*n));
            match found {
                None => Err(Error::coordinate(index, format!("missing {}", names[0]))),
                Some(v) => v
                    .as_f64()
                    .ok_or_else(|| Error::coordinate(index, format!("{} is not a number", names[0]))),
            }
        };
        let lat = axis(&["lat", "latitude"])?;
        let lng = axis(&["lng", "lon", "longitude"])?;
        Ok(GeoPoint { lat, lng })
    }

    /// GeoJSON position, longitude first.
    pub fn position(&self) -> Vec<f64> {
        vec![self.lng, self.lat]
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wgs(lat: {:.6}, lng: {:.6})", self.lat, self.lng)
    }
}

impl From<geo::Coord<f64>> for GeoPoint {
    fn from(c: geo::Coord<f64>) -> Self {
        GeoPoint { lat: c.y, lng: c.x }
    }
}

impl From<GeoPoint> for geo::Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        geo::Coord { x: p.lng, y: p.lat }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeoBoundingBox {
    pub min: GeoPoint,
    pub max: GeoPoint,
}

impl GeoBoundingBox {
    pub fn from(p1: &GeoPoint, p2: &GeoPoint) -> Self {
        let min = GeoPoint::new(p1.lat.min(p2.lat), p1.lng.min(p2.lng));
        let max = GeoPoint::new(p1.lat.max(p2.lat), p1.lng.max(p2.lng));
        Self { min, max }
    }

    pub fn extend(&self, p: &GeoPoint) -> Self {
        GeoBoundingBox {
            min: GeoPoint::new(self.min.lat.min(p.lat), self.min.lng.min(p.lng)),
            max: GeoPoint::new(self.max.lat.max(p.lat), self.max.lng.max(p.lng)),
        }
    }
}

impl fmt::Display for GeoBoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wgsbbox(min: {}, max: {})", self.min, self.max)
    }
}
