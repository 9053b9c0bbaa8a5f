use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::Number;

use crate::area::{geodesic_area, round_to};
use crate::error::Result;
use crate::polygon::Ring;
use crate::zone::Zone;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssemblyOptions {
    /// Attach the geodesic area as `properties.area`.
    pub area: bool,
    pub area_decimals: u32,
    /// Round output coordinates. `None` keeps them as given.
    pub coordinate_decimals: Option<u32>,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        AssemblyOptions {
            area: false,
            area_decimals: 2,
            coordinate_decimals: None,
        }
    }
}

impl AssemblyOptions {
    pub fn with_area(mut self) -> Self {
        self.area = true;
        self
    }

    pub fn with_area_decimals(mut self, decimals: u32) -> Self {
        self.area_decimals = decimals;
        self
    }

    pub fn with_coordinate_decimals(mut self, decimals: u32) -> Self {
        self.coordinate_decimals = Some(decimals);
        self
    }
}

/// Closed `[lng, lat]` ring. Closure is decided on the input values, before
/// any rounding.
pub fn closed_positions(ring: &Ring, decimals: Option<u32>) -> Result<Vec<Vec<f64>>> {
    ring.ensure_polygon()?;
    ring.validate()?;
    let round = |v: f64| match decimals {
        Some(d) => round_to(v, d),
        None => v,
    };
    Ok(ring
        .closed()
        .iter()
        .map(|p| p.position().into_iter().map(round).collect())
        .collect())
}

pub fn polygon_geometry(ring: &Ring, decimals: Option<u32>) -> Result<Geometry> {
    let exterior = closed_positions(ring, decimals)?;
    Ok(Geometry::new(Value::Polygon(vec![exterior])))
}

pub fn to_feature(zone: &Zone, options: &AssemblyOptions) -> Result<Feature> {
    let geometry = polygon_geometry(&zone.ring, options.coordinate_decimals)?;

    let mut properties = JsonObject::new();
    properties.insert("preset".to_string(), zone.kind.preset().into());
    properties.extend(zone.parameters.filtered(zone.kind)?);
    if options.area {
        let area = round_to(geodesic_area(&zone.ring)?, options.area_decimals);
        properties.insert("area".to_string(), area.into());
    }

    Ok(Feature {
        bbox: None,
        geometry: Some(geometry),
        id: zone.id.map(|id| Id::Number(Number::from(id))),
        properties: Some(properties),
        foreign_members: None,
    })
}

/// All or nothing: the first zone that fails fails the collection.
pub fn to_feature_collection(zones: &[Zone], options: &AssemblyOptions) -> Result<FeatureCollection> {
    let features = zones
        .iter()
        .map(|z| to_feature(z, options))
        .collect::<Result<Vec<_>>>()?;
    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}
