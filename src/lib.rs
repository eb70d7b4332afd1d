#![warn(clippy::all)]

//! GPU overlays for tiled web maps.
//!
//! A [`ViewportBinding`] owns a graphics context and shader program for a
//! drawing surface laid over a map. On every redraw it reads the map's
//! bounds and zoom, projects the viewport's north-west corner into tile
//! pixels, and uploads a model-view matrix that maps zoom-0 tile pixels to
//! clip space. Draw calls issued afterwards can therefore use geometry in
//! fixed tile-pixel coordinates regardless of pan and zoom.

pub mod geo;
pub mod overlay;
pub mod render;

pub use geo::{GeoPoint, LatLngBounds, MeterPoint, PixelPoint, Projection};
pub use overlay::{
    BindingError, BindingPhase, DrawingSurface, FrameTransform, MapView, OverlayOptions,
    SurfaceSize, ViewportBinding,
};
pub use render::{
    CompiledShader, GlowContext, GraphicsContext, ModelViewMatrix, ShaderError, ShaderKind,
    ShaderProgram,
};
