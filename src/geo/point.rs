//! Coordinate value types used on the per-frame path.

use geo_types::Coord;

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<Coord<f64>> for GeoPoint {
    /// Follows the `geo-types` convention of x = longitude, y = latitude.
    fn from(coord: Coord<f64>) -> Self {
        Self {
            lat: coord.y,
            lng: coord.x,
        }
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        Coord { x: p.lng, y: p.lat }
    }
}

/// A position in tile-pixel units (`0..tile_size` at zoom 0).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A position in spherical web-mercator meters (EPSG:3857).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeterPoint {
    pub x: f64,
    pub y: f64,
}

impl MeterPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Visible geographic extent of the map, as reported by the map each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl LatLngBounds {
    pub const fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// The top-left corner of the viewport.
    pub fn north_west(&self) -> GeoPoint {
        GeoPoint::new(self.north, self.west)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_conversion_swaps_axes() {
        let p = GeoPoint::from(Coord { x: -98.0, y: 39.0 });
        assert_eq!(p, GeoPoint::new(39.0, -98.0));

        let back: Coord<f64> = p.into();
        assert_eq!(back.x, -98.0);
        assert_eq!(back.y, 39.0);
    }

    #[test]
    fn test_bounds_north_west() {
        let bounds = LatLngBounds::new(45.0, 30.0, -80.0, -110.0);
        assert_eq!(bounds.north_west(), GeoPoint::new(45.0, -110.0));
    }
}
