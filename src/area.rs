use geo::algorithm::geodesic_area::GeodesicArea;
use geo::orient::Direction;
use geo::{Orient, Polygon};

use crate::error::Result;
use crate::polygon::Ring;

/// WGS84 equatorial radius in meters.
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Area enclosed by `ring` in square meters, on a sphere of radius
/// [`EARTH_RADIUS`]. The closing edge from the last point back to the first
/// is implied. Winding order does not matter.
///
/// Fails with `InvalidGeometry` below three points and with
/// `InvalidCoordinate` on a non-finite or out-of-range point. Simplicity is
/// not checked: a self-intersecting ring gives a number, not an error.
pub fn geodesic_area(ring: &Ring) -> Result<f64> {
    ring.ensure_polygon()?;
    ring.validate()?;

    let points = &ring.points;
    let mut sum = 0f64;
    let mut prev = &points[points.len() - 1];
    for p in points {
        let dlng = (p.lng - prev.lng).to_radians();
        sum += dlng * (2.0 + prev.lat.to_radians().sin() + p.lat.to_radians().sin());
        prev = p;
    }
    Ok((sum * EARTH_RADIUS * EARTH_RADIUS / 2.0).abs())
}

/// Area on the WGS84 ellipsoid (Karney), for comparison with
/// [`geodesic_area`]. Same input checks.
pub fn ellipsoidal_area(ring: &Ring) -> Result<f64> {
    ring.ensure_polygon()?;
    ring.validate()?;

    let mut polygon = Polygon::from(ring);
    polygon = polygon.orient(Direction::Default);
    Ok(polygon.geodesic_area_unsigned())
}

/// Decimal places an `f64` can hold. Rounding past this is a no-op.
pub const MAX_DECIMALS: u32 = 15;

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if decimals > MAX_DECIMALS {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
