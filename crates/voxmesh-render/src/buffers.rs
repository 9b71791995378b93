use std::rc::Rc;

use bytemuck::Pod;
use voxmesh_mesh_cpu::{IndexWidth, MeshBuild, MeshIndex, VertexLayout};

use crate::device::{BufferTarget, BufferUsage, GpuDevice};
use crate::program::ProgramBindings;
use crate::resource::GpuBuffer;

/// Uploaded vertex and index buffers plus what a pass needs to draw them.
#[derive(Debug)]
pub struct MeshBuffers {
    vertex: GpuBuffer,
    index: GpuBuffer,
    layout: VertexLayout,
    index_width: IndexWidth,
    index_count: usize,
}

impl MeshBuffers {
    /// Returns `None` for an empty mesh; empty meshes never reach the device.
    pub fn upload<V: Pod, I: MeshIndex>(
        device: &Rc<dyn GpuDevice>,
        mesh: &MeshBuild<V, I>,
        layout: VertexLayout,
        usage: BufferUsage,
    ) -> Option<Self> {
        if mesh.is_empty() {
            return None;
        }
        debug_assert_eq!(layout.stride, std::mem::size_of::<V>());
        let vertex = GpuBuffer::upload(device, BufferTarget::Array, mesh.vertex_bytes(), usage);
        let index = GpuBuffer::upload(device, BufferTarget::ElementArray, mesh.index_bytes(), usage);
        Some(Self {
            vertex,
            index,
            layout,
            index_width: I::WIDTH,
            index_count: mesh.indices.len(),
        })
    }

    #[inline]
    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    #[inline]
    pub fn index_width(&self) -> IndexWidth {
        self.index_width
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.index_count / 3
    }

    pub fn vertex_buffer(&self) -> &GpuBuffer {
        &self.vertex
    }

    pub fn index_buffer(&self) -> &GpuBuffer {
        &self.index
    }

    /// Binds the attributes of this layout that `program` resolved, restricted
    /// to `names`, and leaves the element buffer bound. Returns the enabled
    /// locations so the caller can disable them afterwards.
    pub fn bind(&self, device: &dyn GpuDevice, program: &ProgramBindings, names: &[&str]) -> Vec<u32> {
        self.vertex.bind(BufferTarget::Array);
        let mut enabled = Vec::with_capacity(names.len());
        for attr in self.layout.attributes {
            if !names.contains(&attr.name) {
                continue;
            }
            let Some(loc) = program.attrib(attr.name) else {
                continue;
            };
            device.vertex_attrib_pointer(loc, attr, self.layout.stride);
            device.enable_vertex_attrib_array(loc, true);
            enabled.push(loc);
        }
        device.bind_buffer(BufferTarget::Array, None);
        self.index.bind(BufferTarget::ElementArray);
        enabled
    }

    pub fn draw(&self, device: &dyn GpuDevice) {
        device.draw_elements(self.index_count, self.index_width);
    }

    pub fn unbind(device: &dyn GpuDevice, enabled: &[u32]) {
        device.bind_buffer(BufferTarget::ElementArray, None);
        for &loc in enabled {
            device.enable_vertex_attrib_array(loc, false);
        }
    }
}
