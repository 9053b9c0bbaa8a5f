use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid geometry: ring has {points} points, at least 3 required")]
    InvalidGeometry { points: usize },
    #[error("invalid coordinate at index {index}: {reason}")]
    InvalidCoordinate { index: usize, reason: String },
    #[error("invalid parameter {key}: {reason}")]
    InvalidParameter { key: String, reason: String },
    #[error("unknown zone classification: {0}")]
    UnknownZone(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("KML error: {0}")]
    Kml(String),
    #[error("GPX error: {0}")]
    Gpx(String),
}

impl Error {
    pub fn coordinate(index: usize, reason: impl Into<String>) -> Self {
        Error::InvalidCoordinate {
            index,
            reason: reason.into(),
        }
    }

    pub fn parameter(key: &str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
