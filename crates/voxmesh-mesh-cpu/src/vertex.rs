//! Packed GPU vertex formats and the byte layouts handed to the sink.

use bytemuck::{Pod, Zeroable};
use std::mem::{offset_of, size_of};

/// Terrain vertex. Positions are chunk-local, so a chunk is at most 16 cells wide.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct ChunkVertex {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub _pad0: u8,
    /// Texel coordinate into the AO lookup texture.
    pub ao_x: u16,
    pub ao_y: u16,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Face shading, read by the shader as the color's alpha.
    pub shading: u8,
    pub nx: i8,
    pub ny: i8,
    pub nz: i8,
    /// `2 * corner + u + v`: a point pulled half a cell toward the quad's
    /// centre, used to sample shadow maps without self-shadowing.
    pub sx: i8,
    pub sy: i8,
    pub sz: i8,
    pub _pad1: [u8; 2],
}

/// Model vertex; UVs are texels in the model's own atlas.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct ModelVertex {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub _pad0: u8,
    pub u: u16,
    pub v: u16,
    pub nx: i8,
    pub ny: i8,
    pub nz: i8,
    pub _pad1: i8,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AttribFormat {
    U8,
    I8,
    U16,
}

impl AttribFormat {
    pub const fn size(self) -> usize {
        match self {
            AttribFormat::U8 | AttribFormat::I8 => 1,
            AttribFormat::U16 => 2,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VertexAttribute {
    /// Shader attribute name the binding table resolves.
    pub name: &'static str,
    pub components: u8,
    pub format: AttribFormat,
    pub normalized: bool,
    pub offset: usize,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VertexLayout {
    pub stride: usize,
    pub attributes: &'static [VertexAttribute],
}

impl VertexLayout {
    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

const CHUNK_ATTRIBUTES: [VertexAttribute; 5] = [
    VertexAttribute {
        name: "positionAttribute",
        components: 3,
        format: AttribFormat::U8,
        normalized: false,
        offset: offset_of!(ChunkVertex, x),
    },
    VertexAttribute {
        name: "ambientOcclusionCoordAttribute",
        components: 2,
        format: AttribFormat::U16,
        normalized: false,
        offset: offset_of!(ChunkVertex, ao_x),
    },
    VertexAttribute {
        name: "colorAttribute",
        components: 4,
        format: AttribFormat::U8,
        normalized: true,
        offset: offset_of!(ChunkVertex, r),
    },
    VertexAttribute {
        name: "normalAttribute",
        components: 3,
        format: AttribFormat::I8,
        normalized: false,
        offset: offset_of!(ChunkVertex, nx),
    },
    VertexAttribute {
        name: "fixedPositionAttribute",
        components: 3,
        format: AttribFormat::I8,
        normalized: false,
        offset: offset_of!(ChunkVertex, sx),
    },
];

const MODEL_ATTRIBUTES: [VertexAttribute; 3] = [
    VertexAttribute {
        name: "positionAttribute",
        components: 4,
        format: AttribFormat::U8,
        normalized: false,
        offset: offset_of!(ModelVertex, x),
    },
    VertexAttribute {
        name: "textureCoordAttribute",
        components: 2,
        format: AttribFormat::U16,
        normalized: false,
        offset: offset_of!(ModelVertex, u),
    },
    VertexAttribute {
        name: "normalAttribute",
        components: 3,
        format: AttribFormat::I8,
        normalized: false,
        offset: offset_of!(ModelVertex, nx),
    },
];

impl ChunkVertex {
    pub const LAYOUT: VertexLayout = VertexLayout {
        stride: size_of::<ChunkVertex>(),
        attributes: &CHUNK_ATTRIBUTES,
    };
}

impl ModelVertex {
    pub const LAYOUT: VertexLayout = VertexLayout {
        stride: size_of::<ModelVertex>(),
        attributes: &MODEL_ATTRIBUTES,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_sizes() {
        assert_eq!(size_of::<ChunkVertex>(), 20);
        assert_eq!(size_of::<ModelVertex>(), 12);
        assert_eq!(ChunkVertex::LAYOUT.stride, 20);
        assert_eq!(ModelVertex::LAYOUT.stride, 12);
    }

    #[test]
    fn documented_offsets() {
        let offs: Vec<usize> = ChunkVertex::LAYOUT.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offs, vec![0, 4, 8, 12, 15]);
        let offs: Vec<usize> = ModelVertex::LAYOUT.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offs, vec![0, 4, 8]);
    }

    #[test]
    fn attributes_fit_inside_stride() {
        for layout in [ChunkVertex::LAYOUT, ModelVertex::LAYOUT] {
            for a in layout.attributes {
                let end = a.offset + a.components as usize * a.format.size();
                assert!(end <= layout.stride, "{} overruns stride", a.name);
            }
        }
    }

    #[test]
    fn lookup_by_name() {
        let color = ChunkVertex::LAYOUT.attribute("colorAttribute");
        assert!(color.is_some_and(|a| a.normalized));
        assert!(ModelVertex::LAYOUT.attribute("fixedPositionAttribute").is_none());
    }
}
