//! Ties a drawing surface and its shader program to a map's live viewport.
//!
//! A binding moves through
//! `Detached -> Attached -> ContextReady -> ProgramReady -> Rendering`.
//! Each operation is only accepted in the phases it documents; anything
//! else is rejected with [`BindingError::InvalidState`] and the binding is
//! left as it was.

use super::{DrawingSurface, FrameTransform, MapView, OverlayOptions, SurfaceSize};
use crate::render::{GraphicsContext, ShaderError, ShaderProgram};
use std::fmt;
use std::mem;
use thiserror::Error;

type Gl<S> = <S as DrawingSurface>::Context;
type Uniform<S> = <Gl<S> as GraphicsContext>::UniformLocation;

/// Surface dimensions as GL viewport arguments, saturating at `i32::MAX`.
fn gl_dimension(pixels: u32) -> i32 {
    i32::try_from(pixels).unwrap_or(i32::MAX)
}

/// Lifecycle phase of a [`ViewportBinding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingPhase {
    Detached,
    Attached,
    ContextReady,
    ProgramReady,
    Rendering,
}

impl fmt::Display for BindingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BindingPhase::Detached => "detached",
            BindingPhase::Attached => "attached",
            BindingPhase::ContextReady => "context ready",
            BindingPhase::ProgramReady => "program ready",
            BindingPhase::Rendering => "rendering",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    #[error("surface could not provide a graphics context")]
    ContextUnavailable,

    #[error("{operation} is not allowed while {phase}")]
    InvalidState {
        operation: &'static str,
        phase: BindingPhase,
    },

    #[error(transparent)]
    Shader(#[from] ShaderError),
}

struct Host<M, S> {
    map: M,
    surface: S,
}

enum State<M, S: DrawingSurface> {
    Detached,
    Attached {
        host: Host<M, S>,
    },
    ContextReady {
        host: Host<M, S>,
        gl: Gl<S>,
    },
    ProgramReady {
        host: Host<M, S>,
        gl: Gl<S>,
        program: ShaderProgram<Gl<S>>,
    },
    Rendering {
        host: Host<M, S>,
        gl: Gl<S>,
        program: ShaderProgram<Gl<S>>,
        model_view: Uniform<S>,
    },
}

impl<M, S: DrawingSurface> State<M, S> {
    fn phase(&self) -> BindingPhase {
        match self {
            State::Detached => BindingPhase::Detached,
            State::Attached { .. } => BindingPhase::Attached,
            State::ContextReady { .. } => BindingPhase::ContextReady,
            State::ProgramReady { .. } => BindingPhase::ProgramReady,
            State::Rendering { .. } => BindingPhase::Rendering,
        }
    }

    fn host(&self) -> Option<&Host<M, S>> {
        match self {
            State::Detached => None,
            State::Attached { host }
            | State::ContextReady { host, .. }
            | State::ProgramReady { host, .. }
            | State::Rendering { host, .. } => Some(host),
        }
    }

    fn gl(&self) -> Option<&Gl<S>> {
        match self {
            State::ContextReady { gl, .. }
            | State::ProgramReady { gl, .. }
            | State::Rendering { gl, .. } => Some(gl),
            _ => None,
        }
    }

    fn program(&self) -> Option<&ShaderProgram<Gl<S>>> {
        match self {
            State::ProgramReady { program, .. } | State::Rendering { program, .. } => Some(program),
            _ => None,
        }
    }
}

/// A GPU overlay bound to a map viewport.
///
/// The binding exclusively owns its graphics context and shader program.
/// GPU resources are released by [`ViewportBinding::detach`].
pub struct ViewportBinding<M, S: DrawingSurface> {
    options: OverlayOptions,
    state: State<M, S>,
}

impl<M: MapView, S: DrawingSurface> Default for ViewportBinding<M, S> {
    fn default() -> Self {
        Self::new(OverlayOptions::default())
    }
}

impl<M: MapView, S: DrawingSurface> ViewportBinding<M, S> {
    pub fn new(options: OverlayOptions) -> Self {
        Self {
            options,
            state: State::Detached,
        }
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    pub fn phase(&self) -> BindingPhase {
        self.state.phase()
    }

    pub fn map(&self) -> Option<&M> {
        self.state.host().map(|host| &host.map)
    }

    pub fn surface(&self) -> Option<&S> {
        self.state.host().map(|host| &host.surface)
    }

    /// The surface's current drawing-buffer size, which frames render at.
    pub fn size(&self) -> Option<SurfaceSize> {
        self.state.host().map(|host| host.surface.size())
    }

    pub fn context(&self) -> Option<&Gl<S>> {
        self.state.gl()
    }

    pub fn program(&self) -> Option<&ShaderProgram<Gl<S>>> {
        self.state.program()
    }

    fn invalid(&self, operation: &'static str) -> BindingError {
        BindingError::InvalidState {
            operation,
            phase: self.phase(),
        }
    }

    /// Puts back a state taken for a transition that does not apply to it.
    fn restore<T>(
        &mut self,
        state: State<M, S>,
        operation: &'static str,
    ) -> Result<T, BindingError> {
        self.state = state;
        Err(self.invalid(operation))
    }

    /// Binds to a map and its drawing surface.
    ///
    /// The surface's size is not cached; every frame reads the drawing
    /// buffer's current size, so host resizes take effect on the next redraw.
    pub fn attach(&mut self, map: M, surface: S) -> Result<(), BindingError> {
        if !matches!(self.state, State::Detached) {
            return Err(self.invalid("attach"));
        }

        let client = surface.client_size();
        log::info!(
            "Attached overlay to {}x{} surface (drawing buffer {}x{})",
            client.width,
            client.height,
            surface.width(),
            surface.height()
        );
        self.state = State::Attached {
            host: Host { map, surface },
        };
        Ok(())
    }

    /// Acquires a graphics context from the surface.
    ///
    /// Failure is fatal: the binding drops its map and surface and returns
    /// to `Detached`.
    pub fn init_context(&mut self) -> Result<(), BindingError> {
        let host = match mem::replace(&mut self.state, State::Detached) {
            State::Attached { host } => host,
            other => return self.restore(other, "init_context"),
        };

        match host.surface.create_context(self.options.check_gl_errors) {
            Some(gl) => {
                log::info!("Acquired graphics context");
                self.state = State::ContextReady { host, gl };
                Ok(())
            }
            None => {
                log::error!("Surface could not provide a graphics context, detaching");
                Err(BindingError::ContextUnavailable)
            }
        }
    }

    /// Compiles and links the overlay's program and makes it current.
    ///
    /// On failure the binding stays in `ContextReady` so the caller can try
    /// other sources.
    pub fn init_shaders(&mut self, vertex_src: &str, fragment_src: &str) -> Result<(), BindingError> {
        let (host, gl) = match mem::replace(&mut self.state, State::Detached) {
            State::ContextReady { host, gl } => (host, gl),
            other => return self.restore(other, "init_shaders"),
        };

        match ShaderProgram::from_sources(&gl, vertex_src, fragment_src) {
            Ok(program) => {
                self.state = State::ProgramReady { host, gl, program };
                Ok(())
            }
            Err(e) => {
                self.state = State::ContextReady { host, gl };
                Err(e.into())
            }
        }
    }

    /// Resolves the `mat4` uniform that receives the model-view matrix.
    ///
    /// May be called again while rendering to switch uniforms; a failed
    /// lookup keeps the previous one.
    pub fn set_model_view_location(&mut self, name: &str) -> Result<(), BindingError> {
        let (host, gl, mut program, previous) = match mem::replace(&mut self.state, State::Detached)
        {
            State::ProgramReady { host, gl, program } => (host, gl, program, None),
            State::Rendering {
                host,
                gl,
                program,
                model_view,
            } => (host, gl, program, Some(model_view)),
            other => return self.restore(other, "set_model_view_location"),
        };

        match program.resolve_uniform(&gl, name) {
            Ok(model_view) => {
                self.state = State::Rendering {
                    host,
                    gl,
                    program,
                    model_view,
                };
                Ok(())
            }
            Err(e) => {
                self.state = match previous {
                    Some(model_view) => State::Rendering {
                        host,
                        gl,
                        program,
                        model_view,
                    },
                    None => State::ProgramReady { host, gl, program },
                };
                Err(e.into())
            }
        }
    }

    /// Prepares the surface for a redraw and uploads this frame's
    /// model-view matrix. Must run once per redraw before any draw calls.
    pub fn update_model_view(&self) -> Result<(), BindingError> {
        self.upload_frame("update_model_view").map(|_| ())
    }

    /// Runs [`update_model_view`](Self::update_model_view), then hands the
    /// context, program and frame transform to `draw`.
    pub fn render_frame<F>(&self, draw: F) -> Result<FrameTransform, BindingError>
    where
        F: FnOnce(&Gl<S>, &ShaderProgram<Gl<S>>, &FrameTransform),
    {
        let frame = self.upload_frame("render_frame")?;
        if let State::Rendering { gl, program, .. } = &self.state {
            draw(gl, program, &frame);
        }
        Ok(frame)
    }

    fn upload_frame(&self, operation: &'static str) -> Result<FrameTransform, BindingError> {
        let State::Rendering {
            host,
            gl,
            program,
            model_view,
        } = &self.state
        else {
            return Err(self.invalid(operation));
        };

        if self.options.blend {
            gl.enable_alpha_blending();
        }
        gl.disable_depth_test();
        gl.clear_color_buffer(self.options.clear_color);
        let size = host.surface.size();
        gl.viewport(0, 0, gl_dimension(size.width), gl_dimension(size.height));

        let frame = FrameTransform::compute(
            &host.map.bounds(),
            host.map.zoom(),
            size,
            &self.options,
        );
        program.bind(gl);
        gl.uniform_matrix_4(model_view, frame.matrix.as_slice());

        log::debug!(
            "Frame at zoom {} offset ({}, {}): {:?}",
            frame.zoom,
            frame.offset.x,
            frame.offset.y,
            frame.matrix
        );
        Ok(frame)
    }

    /// Releases the program and hands back the map and surface.
    pub fn detach(&mut self) -> Option<(M, S)> {
        let host = match mem::replace(&mut self.state, State::Detached) {
            State::Detached => return None,
            State::Attached { host } | State::ContextReady { host, .. } => host,
            State::ProgramReady { host, gl, program }
            | State::Rendering {
                host, gl, program, ..
            } => {
                program.destroy(&gl);
                host
            }
        };
        log::info!("Detached overlay");
        Some((host.map, host.surface))
    }
}

impl<M, S: DrawingSurface> fmt::Display for ViewportBinding<M, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WebGL map overlay ({})", self.state.phase())
    }
}

impl<M: MapView, S: DrawingSurface> fmt::Debug for ViewportBinding<M, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewportBinding")
            .field("phase", &self.state.phase())
            .field("size", &self.size())
            .field("options", &self.options)
            .finish()
    }
}
