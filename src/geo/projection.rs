//! Map projection into tile-pixel space.
//!
//! Both projections produce coordinates in the zoom-0 tile grid
//! (`0..tile_size` on each axis). Zoom is applied later as a matrix scale,
//! so nothing here depends on the current view.
//!
//! Inputs are assumed finite. NaN and infinities are not trapped; they
//! propagate through the arithmetic to the caller.

use super::{GeoPoint, MeterPoint, PixelPoint};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Circumference of the earth at the equator in meters (2πR for the WGS84
/// semi-major axis).
pub const EARTH_EQUATOR: f64 = 40_075_016.685_578_49;

/// WGS84 semi-major axis in meters, the sphere radius of web-mercator.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Edge length of a zoom-0 tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Which projection turns the viewport corner into tile pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Latitude/longitude straight to mercator tile pixels.
    #[default]
    Geographic,
    /// Latitude/longitude to EPSG:3857 meters, then meters to tile pixels.
    SphericalMercator,
}

impl Projection {
    pub fn to_pixel(self, p: GeoPoint, tile_size: f64) -> PixelPoint {
        match self {
            Projection::Geographic => to_pixel_geographic(p, tile_size),
            Projection::SphericalMercator => {
                to_pixel_spherical_mercator(spherical_mercator_meters(p), tile_size)
            }
        }
    }
}

/// Converts spherical-mercator meters to tile pixels.
///
/// The meter range `[-EARTH_EQUATOR / 2, EARTH_EQUATOR / 2]` maps onto
/// `[0, tile_size]`, with the y axis flipped so north is up.
pub fn to_pixel_spherical_mercator(p: MeterPoint, tile_size: f64) -> PixelPoint {
    let half = EARTH_EQUATOR / 2.0;
    let x = (p.x + half) / (EARTH_EQUATOR / tile_size);
    let y = (p.y - half) / (EARTH_EQUATOR / -tile_size);
    PixelPoint::new(x, y)
}

/// Converts latitude/longitude to tile pixels using the standard web-map
/// formula.
///
/// `(0, 0)` lands exactly on the tile center. Latitudes of ±90° diverge to
/// infinity on the y axis; the usable range is about ±85.0511°.
pub fn to_pixel_geographic(p: GeoPoint, tile_size: f64) -> PixelPoint {
    let sin_lat = (p.lat * PI / 180.0).sin();
    let x = ((p.lng + 180.0) / 360.0) * tile_size;
    let y = (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (PI * 4.0)) * tile_size;
    PixelPoint::new(x, y)
}

/// Projects latitude/longitude to spherical-mercator meters.
pub fn spherical_mercator_meters(p: GeoPoint) -> MeterPoint {
    let x = EARTH_RADIUS * p.lng.to_radians();
    let y = EARTH_RADIUS * (PI / 4.0 + p.lat.to_radians() / 2.0).tan().ln();
    MeterPoint::new(x, y)
}
