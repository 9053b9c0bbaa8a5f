pub mod area;
pub mod assemble;
pub mod error;
pub mod point;
pub mod polygon;
pub mod read_polygon;
pub mod request;
pub mod zone;

pub use area::{EARTH_RADIUS, ellipsoidal_area, geodesic_area};
pub use assemble::{AssemblyOptions, to_feature, to_feature_collection};
pub use error::{Error, Result};
pub use point::GeoPoint;
pub use polygon::Ring;
pub use zone::{ParameterSet, ParameterValue, Zone, ZoneKind};
