//! The graphics capabilities the overlay needs, and their `glow` backing.

use super::debug::gl_error_name;
use super::ShaderKind;
use glow::HasContext;
use std::fmt::Debug;
use std::sync::Arc;

const MAX_DRAINED_ERRORS: usize = 8;

/// Graphics-context capabilities consumed by the shader and viewport code.
///
/// Mirrors the subset of GL the overlay uses, so the core can be driven by
/// a real `glow` context or by a recording stand-in.
pub trait GraphicsContext {
    type Shader: Copy + Debug;
    type Program: Copy + Debug;
    type UniformLocation: Clone + Debug;

    fn create_shader(&self, kind: ShaderKind) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&self, program: Option<Self::Program>);
    fn delete_program(&self, program: Self::Program);
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    /// Enables `SRC_ALPHA, ONE_MINUS_SRC_ALPHA` blending.
    fn enable_alpha_blending(&self);
    fn disable_depth_test(&self);
    fn clear_color_buffer(&self, color: [f32; 4]);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn uniform_matrix_4(&self, location: &Self::UniformLocation, matrix: &[f32]);
}

/// [`GraphicsContext`] backed by a shared `glow` context.
///
/// With error checks enabled every call is followed by `glGetError`, and any
/// error is logged by name along with the call that raised it.
pub struct GlowContext {
    gl: Arc<glow::Context>,
    check_errors: bool,
}

impl GlowContext {
    pub fn new(gl: Arc<glow::Context>) -> Self {
        Self {
            gl,
            check_errors: false,
        }
    }

    pub fn with_error_checks(mut self, enabled: bool) -> Self {
        self.check_errors = enabled;
        self
    }

    /// The underlying `glow` context, for issuing draw calls.
    pub fn gl(&self) -> &Arc<glow::Context> {
        &self.gl
    }

    fn check(&self, call: &str) {
        if !self.check_errors {
            return;
        }
        // A lost context can report errors forever; drain a bounded number.
        for _ in 0..MAX_DRAINED_ERRORS {
            let code = unsafe { self.gl.get_error() };
            if code == glow::NO_ERROR {
                break;
            }
            log::error!("{} was caused by call to {}", gl_error_name(code), call);
        }
    }
}

impl From<glow::Context> for GlowContext {
    fn from(gl: glow::Context) -> Self {
        Self::new(Arc::new(gl))
    }
}

impl GraphicsContext for GlowContext {
    type Shader = <glow::Context as HasContext>::Shader;
    type Program = <glow::Context as HasContext>::Program;
    type UniformLocation = <glow::Context as HasContext>::UniformLocation;

    fn create_shader(&self, kind: ShaderKind) -> Result<Self::Shader, String> {
        let shader_type = match kind {
            ShaderKind::Vertex => glow::VERTEX_SHADER,
            ShaderKind::Fragment => glow::FRAGMENT_SHADER,
        };
        let shader = unsafe { self.gl.create_shader(shader_type) };
        self.check("createShader");
        shader
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { self.gl.shader_source(shader, source) };
        self.check("shaderSource");
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.compile_shader(shader) };
        self.check("compileShader");
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) };
        self.check("deleteShader");
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        let program = unsafe { self.gl.create_program() };
        self.check("createProgram");
        program
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) };
        self.check("attachShader");
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.detach_shader(program, shader) };
        self.check("detachShader");
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.gl.link_program(program) };
        self.check("linkProgram");
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) };
        self.check("useProgram");
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) };
        self.check("deleteProgram");
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        let location = unsafe { self.gl.get_uniform_location(program, name) };
        self.check("getUniformLocation");
        location
    }

    fn enable_alpha_blending(&self) {
        unsafe {
            self.gl.enable(glow::BLEND);
            self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }
        self.check("blendFunc");
    }

    fn disable_depth_test(&self) {
        unsafe { self.gl.disable(glow::DEPTH_TEST) };
        self.check("disable");
    }

    fn clear_color_buffer(&self, color: [f32; 4]) {
        unsafe {
            self.gl.clear_color(color[0], color[1], color[2], color[3]);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }
        self.check("clear");
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) };
        self.check("viewport");
    }

    fn uniform_matrix_4(&self, location: &Self::UniformLocation, matrix: &[f32]) {
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(location), false, matrix)
        };
        self.check("uniformMatrix4fv");
    }
}
