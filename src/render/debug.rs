//! GL error diagnostics.

/// Returns the symbolic name of a `glGetError` code.
pub fn gl_error_name(code: u32) -> &'static str {
    match code {
        glow::NO_ERROR => "NO_ERROR",
        glow::INVALID_ENUM => "INVALID_ENUM",
        glow::INVALID_VALUE => "INVALID_VALUE",
        glow::INVALID_OPERATION => "INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "OUT_OF_MEMORY",
        glow::STACK_OVERFLOW => "STACK_OVERFLOW",
        glow::STACK_UNDERFLOW => "STACK_UNDERFLOW",
        CONTEXT_LOST_WEBGL => "CONTEXT_LOST_WEBGL",
        _ => "UNKNOWN_GL_ERROR",
    }
}

/// WebGL-only error code reported after the context is lost.
const CONTEXT_LOST_WEBGL: u32 = 0x9242;
