//! Shader compilation, program linking and uniform lookup.

use super::GraphicsContext;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Used when the driver reports a failure but leaves the info log empty.
const MISSING_LOG: &str = "no info log was provided by the driver";

/// Pipeline stage of a shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    /// Parses the `type` attribute of a `<script>` element holding shader
    /// source (`x-shader/x-vertex` or `x-shader/x-fragment`).
    pub fn from_script_type(script_type: &str) -> Result<Self, ShaderError> {
        match script_type {
            "x-shader/x-vertex" => Ok(ShaderKind::Vertex),
            "x-shader/x-fragment" => Ok(ShaderKind::Fragment),
            other => Err(ShaderError::UnknownShaderKind(other.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShaderKind::Vertex => "vertex",
            ShaderKind::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ShaderKind {
    type Err = ShaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vertex" => Ok(ShaderKind::Vertex),
            "fragment" => Ok(ShaderKind::Fragment),
            other => Self::from_script_type(other),
        }
    }
}

/// Errors from building or querying a shader program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShaderError {
    #[error("unknown shader type: {0:?}")]
    UnknownShaderKind(String),

    #[error("could not create GL object: {0}")]
    CreateFailed(String),

    #[error("{kind} shader failed to compile: {log}")]
    CompileFailed { kind: ShaderKind, log: String },

    #[error("could not link shader program: {log}")]
    LinkFailed { log: String },

    #[error("uniform {name:?} not found in shader program")]
    UniformNotFound { name: String },
}

fn non_empty_log(log: String) -> String {
    if log.trim().is_empty() {
        MISSING_LOG.to_string()
    } else {
        log
    }
}

/// A successfully compiled shader object.
///
/// Consumed by [`ShaderProgram::link`]; call [`CompiledShader::delete`] to
/// release one that will not be linked.
pub struct CompiledShader<G: GraphicsContext> {
    shader: G::Shader,
    kind: ShaderKind,
}

impl<G: GraphicsContext> fmt::Debug for CompiledShader<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledShader")
            .field("shader", &self.shader)
            .field("kind", &self.kind)
            .finish()
    }
}

impl<G: GraphicsContext> CompiledShader<G> {
    /// Compiles `source` as a shader of the given kind.
    ///
    /// On failure the shader object is deleted and the driver's info log is
    /// returned in the error.
    pub fn compile(gl: &G, kind: ShaderKind, source: &str) -> Result<Self, ShaderError> {
        let shader = gl.create_shader(kind).map_err(ShaderError::CreateFailed)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.shader_compile_status(shader) {
            let log = non_empty_log(gl.shader_info_log(shader));
            gl.delete_shader(shader);
            log::error!("Failed to compile {} shader: {}", kind, log);
            return Err(ShaderError::CompileFailed { kind, log });
        }

        Ok(Self { shader, kind })
    }

    /// Compiles source tagged with a `<script>` type string.
    pub fn compile_script(gl: &G, script_type: &str, source: &str) -> Result<Self, ShaderError> {
        let kind = ShaderKind::from_script_type(script_type).inspect_err(|_| {
            log::warn!("Unknown shader type {:?}", script_type);
        })?;
        Self::compile(gl, kind, source)
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn raw(&self) -> G::Shader {
        self.shader
    }

    pub fn delete(self, gl: &G) {
        gl.delete_shader(self.shader);
    }
}

/// A linked vertex + fragment program.
///
/// Uniform locations are resolved on first request and cached by name.
/// The program is not released on drop; call [`ShaderProgram::destroy`]
/// with the context that created it.
pub struct ShaderProgram<G: GraphicsContext> {
    program: G::Program,
    uniforms: HashMap<String, G::UniformLocation>,
}

impl<G: GraphicsContext> fmt::Debug for ShaderProgram<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("program", &self.program)
            .field("uniforms", &self.uniforms.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<G: GraphicsContext> ShaderProgram<G> {
    /// Links a vertex and a fragment shader and makes the program current.
    ///
    /// Both shaders are consumed and deleted whatever the outcome. A failed
    /// link deletes the program and leaves no program current.
    pub fn link(
        gl: &G,
        vertex: CompiledShader<G>,
        fragment: CompiledShader<G>,
    ) -> Result<Self, ShaderError> {
        if vertex.kind != ShaderKind::Vertex || fragment.kind != ShaderKind::Fragment {
            let log = format!(
                "expected vertex and fragment shaders, got {} and {}",
                vertex.kind, fragment.kind
            );
            vertex.delete(gl);
            fragment.delete(gl);
            return Err(ShaderError::LinkFailed { log });
        }

        let program = match gl.create_program() {
            Ok(program) => program,
            Err(e) => {
                vertex.delete(gl);
                fragment.delete(gl);
                return Err(ShaderError::CreateFailed(e));
            }
        };

        let shaders = [vertex.shader, fragment.shader];
        for shader in shaders {
            gl.attach_shader(program, shader);
        }
        gl.link_program(program);
        let linked = gl.program_link_status(program);
        let log = (!linked).then(|| non_empty_log(gl.program_info_log(program)));

        for shader in shaders {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }

        if let Some(log) = log {
            gl.delete_program(program);
            gl.use_program(None);
            log::error!("Failed to link shader program: {}", log);
            return Err(ShaderError::LinkFailed { log });
        }

        gl.use_program(Some(program));
        log::info!("Linked shader program {:?}", program);

        Ok(Self {
            program,
            uniforms: HashMap::new(),
        })
    }

    /// Compiles both stages and links them.
    pub fn from_sources(gl: &G, vertex_src: &str, fragment_src: &str) -> Result<Self, ShaderError> {
        let vertex = CompiledShader::compile(gl, ShaderKind::Vertex, vertex_src)?;
        let fragment = match CompiledShader::compile(gl, ShaderKind::Fragment, fragment_src) {
            Ok(fragment) => fragment,
            Err(e) => {
                vertex.delete(gl);
                return Err(e);
            }
        };
        Self::link(gl, vertex, fragment)
    }

    /// Returns the location of a uniform, querying the context only the
    /// first time a name is seen.
    pub fn resolve_uniform(
        &mut self,
        gl: &G,
        name: &str,
    ) -> Result<G::UniformLocation, ShaderError> {
        if let Some(location) = self.uniforms.get(name) {
            return Ok(location.clone());
        }

        let location =
            gl.uniform_location(self.program, name)
                .ok_or_else(|| ShaderError::UniformNotFound {
                    name: name.to_string(),
                })?;
        log::debug!("Resolved uniform {:?} to {:?}", name, location);
        self.uniforms.insert(name.to_string(), location.clone());
        Ok(location)
    }

    /// Makes this program current again.
    pub fn bind(&self, gl: &G) {
        gl.use_program(Some(self.program));
    }

    pub fn raw(&self) -> G::Program {
        self.program
    }

    pub fn destroy(self, gl: &G) {
        gl.delete_program(self.program);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::{MockCall, MockContext, FRAGMENT_SOURCE, VERTEX_SOURCE};

    #[test]
    fn test_script_types() {
        assert_eq!(
            ShaderKind::from_script_type("x-shader/x-vertex"),
            Ok(ShaderKind::Vertex)
        );
        assert_eq!(
            ShaderKind::from_script_type("x-shader/x-fragment"),
            Ok(ShaderKind::Fragment)
        );
        assert_eq!(
            ShaderKind::from_script_type("text/javascript"),
            Err(ShaderError::UnknownShaderKind("text/javascript".into()))
        );
        assert_eq!("fragment".parse::<ShaderKind>(), Ok(ShaderKind::Fragment));
        assert!("geometry".parse::<ShaderKind>().is_err());
    }

    #[test]
    fn test_compile_script_rejects_unknown_type() {
        let gl = MockContext::new();
        let err = CompiledShader::compile_script(&gl, "x-shader/x-geometry", VERTEX_SOURCE)
            .unwrap_err();
        assert!(matches!(err, ShaderError::UnknownShaderKind(_)));
        assert_eq!(gl.live_shaders(), 0);
    }

    #[test]
    fn test_compile_empty_source_fails_with_log() {
        let gl = MockContext::new();
        let err = CompiledShader::compile(&gl, ShaderKind::Vertex, "").unwrap_err();
        match err {
            ShaderError::CompileFailed { kind, log } => {
                assert_eq!(kind, ShaderKind::Vertex);
                assert!(!log.is_empty());
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(gl.live_shaders(), 0);
    }

    #[test]
    fn test_compile_failure_log_never_empty() {
        let gl = MockContext::with_empty_logs();
        let err = CompiledShader::compile(&gl, ShaderKind::Fragment, "").unwrap_err();
        assert_eq!(
            err,
            ShaderError::CompileFailed {
                kind: ShaderKind::Fragment,
                log: MISSING_LOG.to_string(),
            }
        );
    }

    #[test]
    fn test_link_makes_program_current() {
        let gl = MockContext::new();
        let program = ShaderProgram::from_sources(&gl, VERTEX_SOURCE, FRAGMENT_SOURCE).unwrap();
        assert_eq!(gl.current_program(), Some(program.raw()));
        // Shaders are released once linked.
        assert_eq!(gl.live_shaders(), 0);
        assert_eq!(gl.live_programs(), 1);
    }

    #[test]
    fn test_link_failure_leaves_no_current_program() {
        let gl = MockContext::failing_link();
        let vertex = CompiledShader::compile(&gl, ShaderKind::Vertex, VERTEX_SOURCE).unwrap();
        let fragment = CompiledShader::compile(&gl, ShaderKind::Fragment, FRAGMENT_SOURCE).unwrap();

        let err = ShaderProgram::link(&gl, vertex, fragment).unwrap_err();
        assert!(matches!(err, ShaderError::LinkFailed { ref log } if !log.is_empty()));
        assert_eq!(gl.current_program(), None);
        assert_eq!(gl.live_programs(), 0);
        assert_eq!(gl.live_shaders(), 0);
        assert_eq!(gl.calls().last(), Some(&MockCall::UseProgram(None)));
    }

    #[test]
    fn test_link_rejects_swapped_stages() {
        let gl = MockContext::new();
        let vertex = CompiledShader::compile(&gl, ShaderKind::Vertex, VERTEX_SOURCE).unwrap();
        let fragment = CompiledShader::compile(&gl, ShaderKind::Fragment, FRAGMENT_SOURCE).unwrap();

        let err = ShaderProgram::link(&gl, fragment, vertex).unwrap_err();
        assert!(matches!(err, ShaderError::LinkFailed { .. }));
        assert_eq!(gl.live_shaders(), 0);
    }

    #[test]
    fn test_fragment_failure_releases_vertex_shader() {
        let gl = MockContext::new();
        let err = ShaderProgram::from_sources(&gl, VERTEX_SOURCE, "precision mediump float;")
            .unwrap_err();
        assert!(matches!(
            err,
            ShaderError::CompileFailed {
                kind: ShaderKind::Fragment,
                ..
            }
        ));
        assert_eq!(gl.live_shaders(), 0);
        assert_eq!(gl.live_programs(), 0);
    }

    #[test]
    fn test_resolve_uniform() {
        let gl = MockContext::new();
        let mut program =
            ShaderProgram::from_sources(&gl, VERTEX_SOURCE, FRAGMENT_SOURCE).unwrap();

        let location = program.resolve_uniform(&gl, "mapMatrix").unwrap();
        assert_eq!(location.name, "mapMatrix");
        assert_eq!(location.program, program.raw());
        assert!(program.resolve_uniform(&gl, "color").is_ok());

        assert_eq!(
            program.resolve_uniform(&gl, "pointSize"),
            Err(ShaderError::UniformNotFound {
                name: "pointSize".into()
            })
        );
    }

    #[test]
    fn test_destroy_releases_program() {
        let gl = MockContext::new();
        let program = ShaderProgram::from_sources(&gl, VERTEX_SOURCE, FRAGMENT_SOURCE).unwrap();
        program.destroy(&gl);
        assert_eq!(gl.live_programs(), 0);
        assert_eq!(gl.current_program(), None);
    }
}
