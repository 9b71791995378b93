//! CPU meshing crate: chunk quads, sliced and triangulated models, AO selectors and atlases.
#![forbid(unsafe_code)]

pub mod ao;
pub mod atlas;
pub mod chunk;
pub mod face;
pub mod grid2;
pub mod mesh_build;
pub mod model;
pub mod triangulate;
pub mod vertex;

mod error;

pub use ao::{AoPattern, ao_pattern};
pub use atlas::{AtlasBuilder, Bitmap, PackedAtlas, Placement};
pub use chunk::{CHUNK_SIZE, ChunkMeshCPU, ChunkMeshOptions, ChunkMesher, build_chunk_mesh};
pub use error::MeshError;
pub use face::Face;
pub use grid2::{Grid2, Rect};
pub use mesh_build::{IndexWidth, MeshBuild, MeshIndex};
pub use model::{ModelMeshCPU, ModelMeshStats, build_model_mesh};
pub use triangulate::{Occupancy, Point, doubled_area, triangulate};
pub use vertex::{AttribFormat, ChunkVertex, ModelVertex, VertexAttribute, VertexLayout};
