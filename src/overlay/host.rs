//! Collaborators supplied by the embedding application: the map that owns
//! the viewport and the surface the overlay draws into.

use crate::geo::LatLngBounds;
use crate::render::GraphicsContext;
use std::rc::Rc;

/// Live pan/zoom state of a tiled web map.
pub trait MapView {
    fn bounds(&self) -> LatLngBounds;
    fn zoom(&self) -> f64;
}

impl<T: MapView + ?Sized> MapView for &T {
    fn bounds(&self) -> LatLngBounds {
        (**self).bounds()
    }

    fn zoom(&self) -> f64 {
        (**self).zoom()
    }
}

impl<T: MapView + ?Sized> MapView for Rc<T> {
    fn bounds(&self) -> LatLngBounds {
        (**self).bounds()
    }

    fn zoom(&self) -> f64 {
        (**self).zoom()
    }
}

/// Size of a drawing surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A host-owned drawing surface that can produce a graphics context.
///
/// The overlay only reads its dimensions; allocation and resizing stay with
/// the host.
pub trait DrawingSurface {
    type Context: GraphicsContext;

    /// Drawing-buffer width in device pixels.
    fn width(&self) -> u32;
    /// Drawing-buffer height in device pixels.
    fn height(&self) -> u32;
    /// Displayed width in layout pixels.
    fn client_width(&self) -> u32;
    /// Displayed height in layout pixels.
    fn client_height(&self) -> u32;

    /// Acquires a graphics context, or `None` if the surface cannot provide
    /// one.
    fn create_context(&self, check_errors: bool) -> Option<Self::Context>;

    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width(), self.height())
    }

    fn client_size(&self) -> SurfaceSize {
        SurfaceSize::new(self.client_width(), self.client_height())
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebCanvasSurface;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{DrawingSurface, SurfaceSize};
    use crate::render::GlowContext;
    use wasm_bindgen::JsCast;
    use web_sys::{HtmlCanvasElement, WebGl2RenderingContext};

    /// A `<canvas>` element drawn with WebGL2.
    pub struct WebCanvasSurface {
        canvas: HtmlCanvasElement,
    }

    impl WebCanvasSurface {
        pub fn new(canvas: HtmlCanvasElement) -> Self {
            Self { canvas }
        }

        pub fn canvas(&self) -> &HtmlCanvasElement {
            &self.canvas
        }

        /// Resizes the drawing buffer to the canvas's displayed size.
        pub fn fit_to_client(&self) -> SurfaceSize {
            let size = self.client_size();
            self.canvas.set_width(size.width);
            self.canvas.set_height(size.height);
            size
        }
    }

    impl DrawingSurface for WebCanvasSurface {
        type Context = GlowContext;

        fn width(&self) -> u32 {
            self.canvas.width()
        }

        fn height(&self) -> u32 {
            self.canvas.height()
        }

        fn client_width(&self) -> u32 {
            self.canvas.client_width().max(0) as u32
        }

        fn client_height(&self) -> u32 {
            self.canvas.client_height().max(0) as u32
        }

        fn create_context(&self, check_errors: bool) -> Option<GlowContext> {
            let webgl2 = match self.canvas.get_context("webgl2") {
                Ok(Some(ctx)) => ctx.dyn_into::<WebGl2RenderingContext>().ok()?,
                Ok(None) => return None,
                Err(e) => {
                    log::warn!("WebGL2 context request failed: {:?}", e);
                    return None;
                }
            };
            let gl = glow::Context::from_webgl2_context(webgl2);
            Some(GlowContext::from(gl).with_error_checks(check_errors))
        }
    }
}
