//! GPU-facing building blocks: the model-view matrix, the graphics-context
//! capability trait with its `glow` implementation, and shader programs.

mod context;
mod debug;
mod matrix;
mod shader;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{GlowContext, GraphicsContext};
pub use debug::gl_error_name;
pub use matrix::{zoom_scale, ModelViewMatrix};
pub use shader::{CompiledShader, ShaderError, ShaderKind, ShaderProgram};
