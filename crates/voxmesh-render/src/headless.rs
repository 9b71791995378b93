//! In-memory [`GpuDevice`] that records what it is asked to do. Used by the
//! CLI for offline stats and by tests to check uploads, draws and leaks.

use std::cell::RefCell;

use hashbrown::HashMap;
use voxmesh_mesh_cpu::{IndexWidth, VertexAttribute};

use crate::device::{BufferId, BufferTarget, BufferUsage, GpuDevice, ProgramId, TextureId, UniformValue};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub draw_calls: usize,
    pub indices_drawn: usize,
    pub bytes_uploaded: usize,
    pub buffers_created: usize,
    pub textures_created: usize,
}

#[derive(Default)]
struct ProgramInfo {
    attribs: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Default)]
struct State {
    next_id: u32,
    buffers: HashMap<BufferId, Vec<u8>>,
    textures: HashMap<TextureId, (usize, usize)>,
    array: Option<BufferId>,
    element: Option<BufferId>,
    programs: Vec<ProgramInfo>,
    current: Option<ProgramId>,
    uniforms: HashMap<i32, UniformValue>,
    enabled: Vec<u32>,
    depth_range: (f32, f32),
    stats: DrawStats,
}

pub struct HeadlessDevice {
    state: RefCell<State>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self {
            state: RefCell::new(State {
                depth_range: (0.0, 1.0),
                ..State::default()
            }),
        }
    }
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a program; locations follow list order.
    pub fn register_program(&self, attribs: &[&str], uniforms: &[&str]) -> ProgramId {
        let mut s = self.state.borrow_mut();
        s.programs.push(ProgramInfo {
            attribs: attribs.iter().map(|a| a.to_string()).collect(),
            uniforms: uniforms.iter().map(|u| u.to_string()).collect(),
        });
        ProgramId(s.programs.len() as u32 - 1)
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    pub fn stats(&self) -> DrawStats {
        self.state.borrow().stats
    }

    pub fn reset_stats(&self) {
        self.state.borrow_mut().stats = DrawStats::default();
    }

    pub fn buffer_contents(&self, id: BufferId) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&id).cloned()
    }

    /// Last value written to `location` of any program.
    pub fn uniform(&self, location: i32) -> Option<UniformValue> {
        self.state.borrow().uniforms.get(&location).copied()
    }

    pub fn enabled_attributes(&self) -> usize {
        self.state.borrow().enabled.len()
    }

    pub fn current_depth_range(&self) -> (f32, f32) {
        self.state.borrow().depth_range
    }

    fn next_id(s: &mut State) -> u32 {
        s.next_id += 1;
        s.next_id
    }
}

impl GpuDevice for HeadlessDevice {
    fn gen_buffer(&self) -> BufferId {
        let mut s = self.state.borrow_mut();
        let id = BufferId(Self::next_id(&mut s));
        s.buffers.insert(id, Vec::new());
        s.stats.buffers_created += 1;
        id
    }

    fn delete_buffer(&self, id: BufferId) {
        let mut s = self.state.borrow_mut();
        let existed = s.buffers.remove(&id).is_some();
        debug_assert!(existed, "double delete of {id:?}");
        if s.array == Some(id) {
            s.array = None;
        }
        if s.element == Some(id) {
            s.element = None;
        }
    }

    fn bind_buffer(&self, target: BufferTarget, id: Option<BufferId>) {
        let mut s = self.state.borrow_mut();
        match target {
            BufferTarget::Array => s.array = id,
            BufferTarget::ElementArray => s.element = id,
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], _usage: BufferUsage) {
        let mut s = self.state.borrow_mut();
        let bound = match target {
            BufferTarget::Array => s.array,
            BufferTarget::ElementArray => s.element,
        };
        let Some(id) = bound else {
            log::warn!("buffer_data with nothing bound to {:?}", target);
            return;
        };
        if let Some(buf) = s.buffers.get_mut(&id) {
            buf.clear();
            buf.extend_from_slice(data);
        }
        s.stats.bytes_uploaded += data.len();
    }

    fn create_texture(&self, width: usize, height: usize, pixels: &[u8]) -> TextureId {
        debug_assert_eq!(pixels.len(), width * height * 4);
        let mut s = self.state.borrow_mut();
        let id = TextureId(Self::next_id(&mut s));
        s.textures.insert(id, (width, height));
        s.stats.textures_created += 1;
        s.stats.bytes_uploaded += pixels.len();
        id
    }

    fn delete_texture(&self, id: TextureId) {
        let existed = self.state.borrow_mut().textures.remove(&id).is_some();
        debug_assert!(existed, "double delete of {id:?}");
    }

    fn bind_texture(&self, _unit: u32, _id: Option<TextureId>) {}

    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        let s = self.state.borrow();
        let info = s.programs.get(program.0 as usize)?;
        info.attribs.iter().position(|a| a == name).map(|i| i as u32)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<i32> {
        let s = self.state.borrow();
        let info = s.programs.get(program.0 as usize)?;
        // Distinct per program so recorded values do not alias.
        info.uniforms
            .iter()
            .position(|u| u == name)
            .map(|i| (program.0 as i32) * 1000 + i as i32)
    }

    fn use_program(&self, program: ProgramId) {
        self.state.borrow_mut().current = Some(program);
    }

    fn vertex_attrib_pointer(&self, location: u32, attr: &VertexAttribute, stride: usize) {
        let s = self.state.borrow();
        debug_assert!(s.array.is_some(), "attribute {} set without an array buffer", attr.name);
        debug_assert!(attr.offset < stride);
        log::trace!("attrib {} -> {} @{}", location, attr.name, attr.offset);
    }

    fn enable_vertex_attrib_array(&self, location: u32, enabled: bool) {
        let mut s = self.state.borrow_mut();
        if enabled {
            if !s.enabled.contains(&location) {
                s.enabled.push(location);
            }
        } else {
            s.enabled.retain(|&l| l != location);
        }
    }

    fn set_uniform(&self, location: i32, value: UniformValue) {
        self.state.borrow_mut().uniforms.insert(location, value);
    }

    fn depth_range(&self, near: f32, far: f32) {
        self.state.borrow_mut().depth_range = (near, far);
    }

    fn draw_elements(&self, index_count: usize, width: IndexWidth) {
        let mut s = self.state.borrow_mut();
        debug_assert!(s.current.is_some(), "draw without a program");
        let bytes = s.element.and_then(|id| s.buffers.get(&id)).map_or(0, |b| b.len());
        debug_assert!(
            index_count * width.bytes() <= bytes,
            "draw of {index_count} indices overruns element buffer of {bytes} bytes"
        );
        s.stats.draw_calls += 1;
        s.stats.indices_drawn += index_count;
    }
}
