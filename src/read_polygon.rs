use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::point::GeoPoint;
use crate::polygon::Ring;
use crate::zone::{ParameterSet, Zone, ZoneKind};

mod lockml {
    use super::*;
    use kml::Kml;
    use kml::types::Geometry;

    fn collect_polygons(kml: &Kml, out: &mut Vec<geo::Polygon>) {
        match kml {
            Kml::KmlDocument(doc) => doc.elements.iter().for_each(|e| collect_polygons(e, out)),
            Kml::Document { elements, .. } => elements.iter().for_each(|e| collect_polygons(e, out)),
            Kml::Folder(z) => z.elements.iter().for_each(|e| collect_polygons(e, out)),
            Kml::Placemark(p) => {
                if let Some(Geometry::Polygon(ls)) = &p.geometry {
                    out.push(geo::Polygon::from(ls.clone()));
                }
            }
            _ => {}
        }
    }

    pub fn read(content: &str) -> Result<Vec<Ring>> {
        let kml = content
            .parse::<Kml>()
            .map_err(|e| Error::Kml(e.to_string()))?;
        let mut polygons = Vec::new();
        collect_polygons(&kml, &mut polygons);
        Ok(polygons.iter().map(|p| Ring::from(p.exterior())).collect())
    }
}

mod locgpx {
    use super::*;
    use gpx::Gpx;
    use std::io::Cursor;

    pub fn read(content: &str) -> Result<Vec<Ring>> {
        let gpx: Gpx = gpx::read(Cursor::new(content)).map_err(|e| Error::Gpx(e.to_string()))?;

        // every track segment is one ring
        Ok(gpx
            .tracks
            .iter()
            .flat_map(|track| {
                track.segments.iter().map(|segment| {
                    let points: Vec<GeoPoint> = segment
                        .points
                        .iter()
                        .map(|w| GeoPoint::new(w.point().y(), w.point().x()))
                        .collect();
                    Ring::new(points)
                })
            })
            .collect())
    }
}

mod locjson {
    use super::*;
    use geojson::{GeoJson, Geometry, Value};

    pub fn read(content: &str) -> Result<Vec<Ring>> {
        let geojson: GeoJson = content.parse()?;

        let rings = match geojson {
            GeoJson::FeatureCollection(collection) => collection
                .features
                .iter()
                .filter_map(|feature| feature.geometry.as_ref())
                .filter_map(geometry_to_ring)
                .collect(),
            GeoJson::Feature(feature) => feature
                .geometry
                .as_ref()
                .and_then(geometry_to_ring)
                .into_iter()
                .collect(),
            GeoJson::Geometry(geometry) => geometry_to_ring(&geometry).into_iter().collect(),
        };
        Ok(rings)
    }

    fn exterior_to_ring(exterior: &[Vec<f64>]) -> Ring {
        Ring::new(exterior.iter().map(|p| GeoPoint::new(p[1], p[0])).collect())
    }

    fn geometry_to_ring(geometry: &Geometry) -> Option<Ring> {
        match &geometry.value {
            Value::Polygon(coords) => coords.first().map(|e| exterior_to_ring(e)),
            // only the first polygon of a multipolygon
            Value::MultiPolygon(multi) => multi
                .first()
                .and_then(|coords| coords.first())
                .map(|e| exterior_to_ring(e)),
            _ => None,
        }
    }
}

/// Drawn-zone documents, `{ "polygons": [ { id, zoneType, latLngs, params } ] }`
/// or the bare array.
mod loczones {
    use super::*;
    use serde::de::Error as _;
    use serde_json::Value;

    fn zone_from_json(item: &Value) -> Result<Zone> {
        let kind: ZoneKind = match item.get("zoneType").or_else(|| item.get("type")) {
            Some(Value::String(s)) => s.parse()?,
            other => return Err(Error::UnknownZone(format!("{:?}", other))),
        };
        let points = match item.get("latLngs").or_else(|| item.get("points")) {
            Some(Value::Array(points)) => points
                .iter()
                .enumerate()
                .map(|(i, p)| GeoPoint::from_json(i, p))
                .collect::<Result<Vec<_>>>()?,
            _ => return Err(Error::InvalidGeometry { points: 0 }),
        };
        let parameters = match item.get("params") {
            None | Some(Value::Null) => ParameterSet::new(),
            Some(v) => serde_json::from_value(v.clone())?,
        };
        Ok(Zone {
            id: item.get("id").and_then(Value::as_u64),
            kind,
            ring: Ring::new(points),
            parameters,
        })
    }

    pub fn read(content: &str) -> Result<Vec<Zone>> {
        let doc: Value = serde_json::from_str(content)?;
        let list = doc.get("polygons").unwrap_or(&doc);
        let items = list
            .as_array()
            .ok_or_else(|| serde_json::Error::custom("expected an array of polygons"))?;
        items.iter().map(zone_from_json).collect()
    }
}

pub fn parse_zones(content: &str) -> Result<Vec<Zone>> {
    loczones::read(content)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

pub fn is_supported(path: &Path) -> bool {
    matches!(
        extension(path).as_deref(),
        Some("kml") | Some("gpx") | Some("geojson") | Some("json")
    )
}

/// Rings from a KML, GPX, GeoJSON or drawn-zone JSON file, without their
/// classification.
pub fn read_rings(path: &Path) -> Result<Vec<Ring>> {
    let content = fs::read_to_string(path)?;
    let rings = match extension(path).as_deref() {
        Some("kml") => lockml::read(&content)?,
        Some("gpx") => locgpx::read(&content)?,
        Some("geojson") => locjson::read(&content)?,
        Some("json") => loczones::read(&content)?
            .into_iter()
            .map(|z| z.ring)
            .collect(),
        _ => {
            log::warn!("{}: unsupported ring format", path.display());
            Vec::new()
        }
    };
    log::trace!("{}: {} rings", path.display(), rings.len());
    Ok(rings)
}

/// Zones from one file. Drawn-zone `.json` carries its own classification
/// and parameters; other formats take `kind` and `parameters` for every
/// ring they hold, and fail without a `kind`.
pub fn read_zones(path: &Path, kind: Option<ZoneKind>, parameters: &ParameterSet) -> Result<Vec<Zone>> {
    if extension(path).as_deref() == Some("json") {
        let zones = parse_zones(&fs::read_to_string(path)?)?;
        log::trace!("{}: {} zones", path.display(), zones.len());
        return Ok(zones);
    }
    let rings = read_rings(path)?;
    if rings.is_empty() {
        return Ok(Vec::new());
    }
    let kind = kind.ok_or_else(|| {
        Error::UnknownZone(format!("no zone classification given for {}", path.display()))
    })?;
    Ok(rings
        .into_iter()
        .map(|ring| Zone::new(kind, ring).with_parameters(parameters.clone()))
        .collect())
}

/// `path` itself if it is a file, otherwise every supported file below it,
/// sorted by name.
pub fn input_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut ret = Vec::new();
    for entry in walkdir::WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_supported(entry.path()) {
            ret.push(entry.into_path());
        } else {
            log::warn!("skipping {}", entry.path().display());
        }
    }
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>park</name>
      <Polygon>
        <outerBoundaryIs>
          <LinearRing>
            <coordinates>-111.0,29.08,0 -110.9,29.08,0 -110.9,29.0,0 -111.0,29.08,0</coordinates>
          </LinearRing>
        </outerBoundaryIs>
      </Polygon>
    </Placemark>
  </Document>
</kml>"#;

    const GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <trkseg>
      <trkpt lat="29.08" lon="-111.0"></trkpt>
      <trkpt lat="29.08" lon="-110.9"></trkpt>
      <trkpt lat="29.0" lon="-110.9"></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    const GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature", "properties": {},
      "geometry": { "type": "Polygon",
        "coordinates": [[[-111.0, 29.08], [-110.9, 29.08], [-110.9, 29.0], [-111.0, 29.08]]] } },
    { "type": "Feature", "properties": {},
      "geometry": { "type": "Point", "coordinates": [0.0, 0.0] } },
    { "type": "Feature", "properties": {},
      "geometry": { "type": "MultiPolygon",
        "coordinates": [[[[1.0, 2.0], [1.0, 3.0], [2.0, 3.0], [1.0, 2.0]]],
                        [[[5.0, 5.0], [5.0, 6.0], [6.0, 6.0], [5.0, 5.0]]]] } }
  ]
}"#;

    const ZONES: &str = r#"{
  "polygons": [
    { "id": 101, "zoneType": "green zone",
      "latLngs": [ {"lat": 29.08, "lng": -111.0}, {"lat": 29.08, "lng": -110.9}, {"lat": 29.0, "lng": -110.9} ],
      "params": { "arboles": 500, "agua": true, "ch4": 20 } },
    { "id": 102, "zoneType": "industrial zone",
      "latLngs": [ {"lat": 1, "lng": 1}, {"lat": 1, "lng": 2}, {"lat": 2, "lng": 2} ] }
  ]
}"#;

    #[test]
    fn test_kml() {
        let rings = lockml::read(KML).unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].points[0], GeoPoint::new(29.08, -111.0));
        assert_eq!(rings[0].open().len(), 3);
    }

    #[test]
    fn test_gpx() {
        let rings = locgpx::read(GPX).unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].points.len(), 3);
        assert_eq!(rings[0].points[1], GeoPoint::new(29.08, -110.9));
    }

    #[test]
    fn test_geojson() {
        let rings = locjson::read(GEOJSON).unwrap();
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].points[0], GeoPoint::new(29.08, -111.0));
        assert!(rings[0].is_closed());
        assert_eq!(rings[1].points[0], GeoPoint::new(2.0, 1.0));
    }

    #[test]
    fn test_geojson_invalid() {
        assert!(matches!(locjson::read("{ nope"), Err(Error::GeoJson(_))));
    }

    #[test]
    fn test_drawn_zones() {
        let zones = parse_zones(ZONES).unwrap();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].id, Some(101));
        assert_eq!(zones[0].kind, ZoneKind::Green);
        assert_eq!(zones[0].ring.points.len(), 3);
        assert!(zones[0].parameters.get("ch4").is_some());
        assert_eq!(zones[1].kind, ZoneKind::Industrial);
        assert!(zones[1].parameters.is_empty());
    }

    #[test]
    fn test_drawn_zones_bad_point() {
        let doc = r#"[ { "zoneType": "verde", "latLngs": [ {"lat": 1, "lng": 1}, {"lng": 2} ] } ]"#;
        assert!(matches!(
            parse_zones(doc),
            Err(Error::InvalidCoordinate { index: 1, .. })
        ));
    }

    #[test]
    fn test_drawn_zones_bad_kind() {
        let doc = r#"[ { "zoneType": "commercial zone", "latLngs": [] } ]"#;
        assert!(matches!(parse_zones(doc), Err(Error::UnknownZone(_))));
        assert!(matches!(parse_zones(r#"{"polygons": 3}"#), Err(Error::Json(_))));
    }

    #[test]
    fn test_drawn_zones_foreign_params() {
        let doc = r#"[ { "id": 5, "zoneType": "green zone",
            "latLngs": [ {"lat": 1, "lng": 1}, {"lat": 1, "lng": 2}, {"lat": 2, "lng": 2} ],
            "params": { "arboles": 500, "note": "park by the river", "ch4": null } } ]"#;
        let zones = parse_zones(doc).unwrap();
        assert_eq!(zones.len(), 1);
        let props = zones[0].parameters.filtered(zones[0].kind).unwrap();
        assert_eq!(props.len(), 1);
        assert!(props.contains_key("arboles"));
    }

    /// Scratch directory below the system temp dir, removed on drop.
    struct Scratch(PathBuf);

    impl Scratch {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir()
                .join(format!("zonegeo-{}-{}", name, std::process::id()));
            let _ = fs::remove_dir_all(&dir);
            fs::create_dir_all(&dir).unwrap();
            Scratch(dir)
        }

        fn write(&self, name: &str, content: &str) -> PathBuf {
            let path = self.0.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            path
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn test_input_files_walks_sorted() {
        let dir = Scratch::new("walk");
        dir.write("b.kml", KML);
        dir.write("a.gpx", GPX);
        dir.write("notes.txt", "not a polygon");
        dir.write("sub/c.geojson", GEOJSON);
        dir.write("sub/deeper/ZONES.JSON", ZONES);

        let files = input_files(&dir.0).unwrap();
        let names: Vec<PathBuf> = files
            .iter()
            .map(|f| f.strip_prefix(&dir.0).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.gpx"),
                PathBuf::from("b.kml"),
                PathBuf::from("sub/c.geojson"),
                PathBuf::from("sub/deeper/ZONES.JSON"),
            ]
        );

        let single = dir.0.join("notes.txt");
        assert_eq!(input_files(&single).unwrap(), vec![single]);
    }

    #[test]
    fn test_read_rings_by_extension() {
        let dir = Scratch::new("rings");
        let zones = dir.write("ZONES.JSON", ZONES);
        let rings = read_rings(&zones).unwrap();
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].points[0], GeoPoint::new(29.08, -111.0));

        let txt = dir.write("notes.txt", "not a polygon");
        assert!(read_rings(&txt).unwrap().is_empty());
    }

    #[test]
    fn test_read_zones_needs_kind() {
        let dir = Scratch::new("kind");
        let kml = dir.write("park.kml", KML);
        assert!(matches!(
            read_zones(&kml, None, &ParameterSet::new()),
            Err(Error::UnknownZone(_))
        ));

        // drawn-zone files carry their own kind and parameters
        let json = dir.write("zones.json", ZONES);
        let zones = read_zones(&json, None, &ParameterSet::new().with("ch4", 1.0)).unwrap();
        assert_eq!(zones[0].kind, ZoneKind::Green);
        assert!(zones[1].parameters.is_empty());
    }

    #[test]
    fn test_read_zones_applies_parameters() {
        let dir = Scratch::new("params");
        let geojson = dir.write("zones.geojson", GEOJSON);
        let params = ParameterSet::new().with("ch4", 12.0).with("arboles", 3.0);
        let zones = read_zones(&geojson, Some(ZoneKind::Industrial), &params).unwrap();
        assert_eq!(zones.len(), 2);
        for zone in &zones {
            assert_eq!(zone.kind, ZoneKind::Industrial);
            assert_eq!(zone.parameters, params);
        }
    }

    #[test]
    fn test_supported() {
        assert!(is_supported(Path::new("a/b.KML")));
        assert!(is_supported(Path::new("zones.json")));
        assert!(!is_supported(Path::new("notes.txt")));
        assert!(!is_supported(Path::new("noext")));
    }
}
