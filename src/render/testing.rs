//! Recording stand-in for a GL context, used by unit tests.

use super::{GraphicsContext, ShaderKind};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Observable side effects, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    UseProgram(Option<u32>),
    DeleteShader(u32),
    DeleteProgram(u32),
    EnableAlphaBlending,
    DisableDepthTest,
    Clear([f32; 4]),
    Viewport(i32, i32, i32, i32),
    UniformMatrix4(String, Vec<f32>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockUniform {
    pub program: u32,
    pub name: String,
}

struct MockShader {
    kind: ShaderKind,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Default)]
struct MockProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    uniforms: Vec<String>,
}

#[derive(Default)]
struct MockState {
    next_id: u32,
    shaders: HashMap<u32, MockShader>,
    programs: HashMap<u32, MockProgram>,
    current: Option<u32>,
    calls: Vec<MockCall>,
}

/// Compiles any shader with a `main` function, links any compiled
/// vertex/fragment pair, and exposes the `uniform` declarations of the
/// linked sources. Clones share state, so a test can keep a handle to a
/// context it has given away.
#[derive(Default, Clone)]
pub struct MockContext {
    state: Rc<RefCell<MockState>>,
    fail_link: bool,
    empty_logs: bool,
}

impl MockContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every link fails with a driver log.
    pub fn failing_link() -> Self {
        Self {
            fail_link: true,
            ..Self::default()
        }
    }

    /// Info logs come back empty, as some drivers do.
    pub fn with_empty_logs() -> Self {
        Self {
            empty_logs: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().current
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    fn record(&self, call: MockCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

fn declared_uniforms(source: &str) -> impl Iterator<Item = String> + '_ {
    source
        .split(';')
        .map(str::trim)
        .filter_map(|stmt| stmt.strip_prefix("uniform "))
        .filter_map(|decl| decl.split_whitespace().last())
        .map(str::to_string)
}

impl GraphicsContext for MockContext {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = MockUniform;

    fn create_shader(&self, kind: ShaderKind) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.shaders.insert(
            id,
            MockShader {
                kind,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: u32) {
        let empty_logs = self.empty_logs;
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.compiled = s.source.contains("main");
            s.log = if s.compiled || empty_logs {
                String::new()
            } else if s.source.trim().is_empty() {
                "ERROR: 0:1: '' : syntax error, unexpected end of file".to_string()
            } else {
                "ERROR: 0:1: 'main' : function not defined".to_string()
            };
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().shaders.remove(&shader);
        self.record(MockCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.programs.insert(id, MockProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.retain(|s| *s != shader);
        }
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let attached = match state.programs.get(&program) {
            Some(p) => p.attached.clone(),
            None => return,
        };

        let shaders: Vec<&MockShader> = attached
            .iter()
            .filter_map(|id| state.shaders.get(id))
            .collect();
        let has = |kind| shaders.iter().any(|s| s.kind == kind && s.compiled);
        let linked = !self.fail_link && has(ShaderKind::Vertex) && has(ShaderKind::Fragment);
        let uniforms: Vec<String> = shaders
            .iter()
            .flat_map(|s| declared_uniforms(&s.source))
            .collect();

        let log = if linked || self.empty_logs {
            String::new()
        } else {
            "error: linking with uncompiled or mismatched shaders".to_string()
        };

        if let Some(p) = state.programs.get_mut(&program) {
            p.linked = linked;
            p.log = log;
            p.uniforms = if linked { uniforms } else { Vec::new() };
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        self.state.borrow_mut().current = program;
        self.record(MockCall::UseProgram(program));
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        if state.current == Some(program) {
            state.current = None;
        }
        state.calls.push(MockCall::DeleteProgram(program));
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<MockUniform> {
        let state = self.state.borrow();
        let p = state.programs.get(&program)?;
        p.uniforms.iter().any(|u| u == name).then(|| MockUniform {
            program,
            name: name.to_string(),
        })
    }

    fn enable_alpha_blending(&self) {
        self.record(MockCall::EnableAlphaBlending);
    }

    fn disable_depth_test(&self) {
        self.record(MockCall::DisableDepthTest);
    }

    fn clear_color_buffer(&self, color: [f32; 4]) {
        self.record(MockCall::Clear(color));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(MockCall::Viewport(x, y, width, height));
    }

    fn uniform_matrix_4(&self, location: &MockUniform, matrix: &[f32]) {
        self.record(MockCall::UniformMatrix4(
            location.name.clone(),
            matrix.to_vec(),
        ));
    }
}

pub const VERTEX_SOURCE: &str = "
attribute vec4 worldCoord;
uniform mat4 mapMatrix;
void main() {
    gl_Position = mapMatrix * worldCoord;
}
";

pub const FRAGMENT_SOURCE: &str = "
precision mediump float;
uniform vec4 color;
void main() {
    gl_FragColor = color;
}
";
