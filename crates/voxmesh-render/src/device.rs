//! The sink every renderer submits to. Methods take `&self`; implementations
//! keep their own interior state so one device can be shared through `Rc`.

use voxmesh_mesh_cpu::{IndexWidth, VertexAttribute};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferUsage {
    /// Written once (models).
    StaticDraw,
    /// Rewritten on edits (terrain chunks).
    DynamicDraw,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
}

pub trait GpuDevice {
    fn gen_buffer(&self) -> BufferId;
    fn delete_buffer(&self, id: BufferId);
    fn bind_buffer(&self, target: BufferTarget, id: Option<BufferId>);
    /// Replaces the contents of the buffer bound to `target`.
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);

    /// Creates an RGBA8 texture; `pixels` holds `width * height * 4` bytes.
    fn create_texture(&self, width: usize, height: usize, pixels: &[u8]) -> TextureId;
    fn delete_texture(&self, id: TextureId);
    fn bind_texture(&self, unit: u32, id: Option<TextureId>);

    /// `None` when the program has no such active attribute.
    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<u32>;
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<i32>;
    fn use_program(&self, program: ProgramId);

    /// Points `location` at `attr` inside the bound array buffer.
    fn vertex_attrib_pointer(&self, location: u32, attr: &VertexAttribute, stride: usize);
    fn enable_vertex_attrib_array(&self, location: u32, enabled: bool);
    fn set_uniform(&self, location: i32, value: UniformValue);
    fn depth_range(&self, near: f32, far: f32);

    /// Draws indexed triangles from the bound element buffer.
    fn draw_elements(&self, index_count: usize, width: IndexWidth);
}
