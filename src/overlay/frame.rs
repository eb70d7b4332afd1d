//! Per-frame model-view transform.
//!
//! Geometry is expected in zoom-0 tile pixels. The transform pans the
//! viewport's top-left corner to the origin, applies the zoom, converts
//! surface pixels to clip space and flips y.

use super::{OverlayOptions, SurfaceSize};
use crate::geo::{GeoPoint, LatLngBounds, PixelPoint};
use crate::render::{zoom_scale, ModelViewMatrix};

/// Everything derived from the map's view for one redraw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransform {
    /// Top-left corner of the viewport.
    pub north_west: GeoPoint,
    /// `north_west` in zoom-0 tile pixels.
    pub offset: PixelPoint,
    pub zoom: f64,
    /// `2^zoom`.
    pub scale: f64,
    pub size: SurfaceSize,
    pub matrix: ModelViewMatrix,
}

impl FrameTransform {
    pub fn compute(
        bounds: &LatLngBounds,
        zoom: f64,
        size: SurfaceSize,
        options: &OverlayOptions,
    ) -> Self {
        let north_west = bounds.north_west();
        let offset = options.projection.to_pixel(north_west, options.tile_size);
        let scale = zoom_scale(zoom);

        Self {
            north_west,
            offset,
            zoom,
            scale,
            size,
            matrix: model_view_matrix(offset, scale, size),
        }
    }
}

/// Builds the transform from tile pixels to clip space.
///
/// The order of operations is fixed; changing it changes the projection.
pub fn model_view_matrix(offset: PixelPoint, scale: f64, size: SurfaceSize) -> ModelViewMatrix {
    let mut m = ModelViewMatrix::identity();
    m.translate(-1.0, 1.0)
        .scale(2.0 / size.width as f64, -2.0 / size.height as f64)
        .scale(scale, scale)
        .translate(-offset.x, -offset.y);
    m
}
