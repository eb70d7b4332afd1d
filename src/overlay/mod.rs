//! The map overlay: host collaborators, per-overlay options, the per-frame
//! transform and the viewport binding that ties them together.

mod binding;
mod frame;
mod host;
mod options;

pub use binding::{BindingError, BindingPhase, ViewportBinding};
pub use frame::{model_view_matrix, FrameTransform};
pub use host::{DrawingSurface, MapView, SurfaceSize};
pub use options::OverlayOptions;

#[cfg(target_arch = "wasm32")]
pub use host::WebCanvasSurface;
