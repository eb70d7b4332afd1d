//! Geographic coordinates and web-map projections.
//!
//! This module converts latitude/longitude (or spherical-mercator meters)
//! into tile-pixel space, the space the overlay's model-view matrix is
//! built in.

mod point;
mod projection;

pub use point::{GeoPoint, LatLngBounds, MeterPoint, PixelPoint};
pub use projection::{
    spherical_mercator_meters, to_pixel_geographic, to_pixel_spherical_mercator, Projection,
    EARTH_EQUATOR, EARTH_RADIUS, TILE_SIZE,
};
