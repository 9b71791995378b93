//! Packing helpers for the 32-bit cell value.

pub const RGB_MASK: u32 = 0x00FF_FFFF;

/// Health value of an undamaged terrain block.
pub const HEALTH_FULL: u8 = 100;

#[inline]
pub const fn pack(rgb: [u8; 3], tag: u8) -> u32 {
    (rgb[0] as u32) | ((rgb[1] as u32) << 8) | ((rgb[2] as u32) << 16) | ((tag as u32) << 24)
}

#[inline]
pub const fn rgb(value: u32) -> u32 {
    value & RGB_MASK
}

#[inline]
pub const fn tag(value: u32) -> u8 {
    (value >> 24) as u8
}

#[inline]
pub const fn with_tag(value: u32, tag: u8) -> u32 {
    (value & RGB_MASK) | ((tag as u32) << 24)
}

/// Material carried in the tag byte of model cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    #[default]
    Default,
    /// Self-lit; receives no ambient occlusion.
    Emissive,
}

impl MaterialKind {
    #[inline]
    pub const fn from_tag(tag: u8) -> MaterialKind {
        match tag {
            1 => MaterialKind::Emissive,
            _ => MaterialKind::Default,
        }
    }

    #[inline]
    pub const fn tag(self) -> u8 {
        match self {
            MaterialKind::Default => 0,
            MaterialKind::Emissive => 1,
        }
    }
}
