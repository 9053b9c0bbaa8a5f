use geojson::Geometry;
use serde::Serialize;

use crate::area::{geodesic_area, round_to};
use crate::assemble::{closed_positions, polygon_geometry};
use crate::error::{Error, Result};
use crate::zone::{Zone, ZoneKind};

/// Radius in meters around the request location that the backend samples
/// its baseline layers from.
pub const DEFAULT_BUFFER: u32 = 50000;

/// Body of a single-zone simulation call.
#[derive(Clone, Debug, Serialize)]
pub struct SimulationRequest {
    pub preset: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub buffer: u32,
    pub geometry: Geometry,
}

impl SimulationRequest {
    pub fn from_zone(zone: &Zone, buffer: u32) -> Result<Self> {
        let geometry = polygon_geometry(&zone.ring, None)?;
        let centroid = zone
            .ring
            .centroid()
            .ok_or(Error::InvalidGeometry { points: 0 })?;
        Ok(SimulationRequest {
            preset: zone.kind.preset(),
            latitude: centroid.lat,
            longitude: centroid.lng,
            buffer,
            geometry,
        })
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub total_zones: usize,
    pub total_area: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExportZone {
    pub id: Option<u64>,
    #[serde(rename = "type")]
    pub kind: ZoneKind,
    pub area: f64,
    pub coordinates: Vec<Vec<f64>>,
    pub geometry: Geometry,
}

/// Snapshot of every drawn zone with its area, for download.
#[derive(Clone, Debug, Serialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub zones: Vec<ExportZone>,
}

const EXPORT_AREA_DECIMALS: u32 = 2;
const EXPORT_COORDINATE_DECIMALS: u32 = 6;

impl ExportDocument {
    pub fn from_zones(zones: &[Zone]) -> Result<Self> {
        let mut total = 0f64;
        let mut exported = Vec::with_capacity(zones.len());
        for zone in zones {
            let area = geodesic_area(&zone.ring)?;
            total += area;
            let coordinates = closed_positions(&zone.ring, Some(EXPORT_COORDINATE_DECIMALS))?;
            let geometry = Geometry::new(geojson::Value::Polygon(vec![coordinates.clone()]));
            exported.push(ExportZone {
                id: zone.id,
                kind: zone.kind,
                area: round_to(area, EXPORT_AREA_DECIMALS),
                coordinates,
                geometry,
            });
        }
        Ok(ExportDocument {
            metadata: ExportMetadata {
                total_zones: zones.len(),
                total_area: round_to(total, EXPORT_AREA_DECIMALS),
            },
            zones: exported,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::Ring;
    use serde_json::json;

    fn square() -> Ring {
        Ring::from(vec![(29.0, -111.0), (29.0, -110.9), (29.1, -110.9), (29.1, -111.0)])
    }

    #[test]
    fn test_request_payload() {
        let zone = Zone::new(ZoneKind::Green, square());
        let req = SimulationRequest::from_zone(&zone, DEFAULT_BUFFER).unwrap();
        assert_eq!(req.preset, "green_area");
        assert!((req.latitude - 29.05).abs() < 1e-12);
        assert!((req.longitude + 110.95).abs() < 1e-12);

        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["buffer"], json!(50000));
        assert_eq!(v["geometry"]["type"], json!("Polygon"));
        assert_eq!(v["geometry"]["coordinates"][0][0], json!([-111.0, 29.0]));
        assert_eq!(v["geometry"]["coordinates"][0][4], json!([-111.0, 29.0]));
    }

    #[test]
    fn test_request_rejects_short_ring() {
        let zone = Zone::new(ZoneKind::Industrial, Ring::from(vec![(0.0, 0.0), (0.0, 1.0)]));
        assert!(matches!(
            SimulationRequest::from_zone(&zone, 1000),
            Err(Error::InvalidGeometry { points: 2 })
        ));
    }

    #[test]
    fn test_export_document() {
        let zones = vec![
            Zone::new(ZoneKind::Green, square()).with_id(1),
            Zone::new(ZoneKind::Industrial, square()).with_id(2),
        ];
        let doc = ExportDocument::from_zones(&zones).unwrap();
        assert_eq!(doc.metadata.total_zones, 2);
        let one = round_to(geodesic_area(&square()).unwrap(), 2);
        assert!((doc.metadata.total_area - 2.0 * one).abs() < 0.02);

        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(v["metadata"]["totalZones"], json!(2));
        assert_eq!(v["zones"][1]["type"], json!("industrial"));
        assert_eq!(v["zones"][0]["id"], json!(1));
        assert_eq!(v["zones"][0]["coordinates"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_export_rounds_coordinates() {
        let ring = Ring::from(vec![
            (29.12345678, -111.98765432),
            (29.2, -111.9),
            (29.1, -111.8),
        ]);
        let doc = ExportDocument::from_zones(&[Zone::new(ZoneKind::Residential, ring.clone())])
            .unwrap();
        let zone = &doc.zones[0];
        assert_eq!(zone.coordinates[0], vec![-111.987654, 29.123457]);
        assert_eq!(zone.coordinates[3], zone.coordinates[0]);
        assert_eq!(zone.area, round_to(geodesic_area(&ring).unwrap(), 2));

        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            v["zones"][0]["geometry"]["coordinates"][0][0],
            json!([-111.987654, 29.123457])
        );
    }
}
