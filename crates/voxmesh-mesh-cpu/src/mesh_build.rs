use bytemuck::Pod;

/// Width of one element in an index buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IndexWidth {
    U16,
    U32,
}

impl IndexWidth {
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            IndexWidth::U16 => 2,
            IndexWidth::U32 => 4,
        }
    }
}

/// Integer types usable as mesh indices.
pub trait MeshIndex: Pod + Copy {
    const WIDTH: IndexWidth;
    /// Converts a vertex number; callers keep it within range.
    fn from_vertex(i: usize) -> Self;
}

impl MeshIndex for u16 {
    const WIDTH: IndexWidth = IndexWidth::U16;
    #[inline]
    fn from_vertex(i: usize) -> Self {
        debug_assert!(i <= u16::MAX as usize, "vertex {i} overflows a 16-bit index");
        i as u16
    }
}

impl MeshIndex for u32 {
    const WIDTH: IndexWidth = IndexWidth::U32;
    #[inline]
    fn from_vertex(i: usize) -> Self {
        i as u32
    }
}

/// CPU-side vertex and index arrays for one mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshBuild<V, I> {
    pub vertices: Vec<V>,
    pub indices: Vec<I>,
}

impl<V, I> Default for MeshBuild<V, I> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }
}

impl<V: Pod, I: MeshIndex> MeshBuild<V, I> {
    /// Clears all arrays but retains capacity for reuse across rebuilds.
    #[inline]
    pub fn clear_keep_capacity(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Pre-reserve capacity for approximately `n_quads` unshared quads.
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        self.vertices.reserve(n_quads * 4);
        self.indices.reserve(n_quads * 6);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Index the next pushed vertex will get.
    #[inline]
    pub fn next_index(&self) -> I {
        I::from_vertex(self.vertices.len())
    }

    #[inline]
    pub fn index_width(&self) -> IndexWidth {
        I::WIDTH
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::ModelVertex;

    #[test]
    fn byte_views_match_element_sizes() {
        let mut m: MeshBuild<ModelVertex, u32> = MeshBuild::default();
        m.vertices.push(ModelVertex::default());
        m.vertices.push(ModelVertex {
            x: 3,
            ..Default::default()
        });
        m.indices.extend_from_slice(&[0, 1, 1]);
        assert_eq!(m.vertex_bytes().len(), 24);
        assert_eq!(m.vertex_bytes()[12], 3);
        assert_eq!(m.index_bytes().len(), 12);
        assert_eq!(m.triangle_count(), 1);
        assert_eq!(m.index_width(), IndexWidth::U32);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut m: MeshBuild<ModelVertex, u16> = MeshBuild::default();
        m.reserve_quads(8);
        let cap = m.vertices.capacity();
        m.vertices.push(ModelVertex::default());
        m.indices.push(0);
        m.clear_keep_capacity();
        assert!(m.is_empty());
        assert!(m.vertices.capacity() >= cap);
        assert_eq!(m.next_index(), 0u16);
    }
}
