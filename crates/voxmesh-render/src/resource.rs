use std::rc::Rc;

use voxmesh_mesh_cpu::Bitmap;

use crate::device::{BufferId, BufferTarget, BufferUsage, GpuDevice, TextureId};

/// Device buffer deleted when dropped.
pub struct GpuBuffer {
    device: Rc<dyn GpuDevice>,
    id: BufferId,
    len: usize,
}

impl GpuBuffer {
    /// Generates a buffer, fills it with `bytes` and leaves `target` unbound.
    pub fn upload(device: &Rc<dyn GpuDevice>, target: BufferTarget, bytes: &[u8], usage: BufferUsage) -> Self {
        let id = device.gen_buffer();
        device.bind_buffer(target, Some(id));
        device.buffer_data(target, bytes, usage);
        device.bind_buffer(target, None);
        Self {
            device: Rc::clone(device),
            id,
            len: bytes.len(),
        }
    }

    #[inline]
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bind(&self, target: BufferTarget) {
        self.device.bind_buffer(target, Some(self.id));
    }
}

impl Drop for GpuBuffer {
    fn drop(&mut self) {
        self.device.delete_buffer(self.id);
    }
}

impl std::fmt::Debug for GpuBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuBuffer")
            .field("id", &self.id)
            .field("len", &self.len)
            .finish()
    }
}

/// Device texture deleted when dropped.
pub struct GpuTexture {
    device: Rc<dyn GpuDevice>,
    id: TextureId,
    width: usize,
    height: usize,
}

impl GpuTexture {
    pub fn from_bitmap(device: &Rc<dyn GpuDevice>, bitmap: &Bitmap) -> Self {
        let id = device.create_texture(bitmap.width(), bitmap.height(), &bitmap.rgba_bytes());
        Self {
            device: Rc::clone(device),
            id,
            width: bitmap.width(),
            height: bitmap.height(),
        }
    }

    #[inline]
    pub fn id(&self) -> TextureId {
        self.id
    }

    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn bind(&self, unit: u32) {
        self.device.bind_texture(unit, Some(self.id));
    }
}

impl Drop for GpuTexture {
    fn drop(&mut self) {
        self.device.delete_texture(self.id);
    }
}

impl std::fmt::Debug for GpuTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuTexture")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
