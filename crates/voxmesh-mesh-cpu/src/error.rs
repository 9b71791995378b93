use thiserror::Error;

/// Inputs the packed vertex formats cannot represent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("model of {width}x{height}x{depth} cells exceeds the 255-cell vertex position range")]
    ModelTooLarge {
        width: usize,
        height: usize,
        depth: usize,
    },
    #[error("atlas of {width}x{height} texels exceeds 16-bit texture coordinates")]
    AtlasTooLarge { width: usize, height: usize },
}
