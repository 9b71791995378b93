//! GPU submission boundary: device sink, owned GPU resources, chunk and model renderers.
#![forbid(unsafe_code)]

pub mod buffers;
pub mod chunk;
pub mod cull;
pub mod device;
pub mod headless;
pub mod map;
pub mod model;
pub mod program;
pub mod resource;

pub use buffers::MeshBuffers;
pub use chunk::{CHUNK_DEPTH_ATTRIBS, CHUNK_DLIGHT_ATTRIBS, CHUNK_SUNLIGHT_ATTRIBS, ChunkFrame, MapChunk};
pub use cull::{CullVolume, DynamicLight, ModelRenderParam, NoCull, SphereCull, ViewState};
pub use device::{BufferId, BufferTarget, BufferUsage, GpuDevice, ProgramId, TextureId, UniformValue};
pub use headless::{DrawStats, HeadlessDevice};
pub use map::{CHUNK_DLIGHT_UNIFORMS, CHUNK_UNIFORMS, ChunkPrograms, MapRenderer, MapStats};
pub use model::{MODEL_ATTRIBS, MODEL_UNIFORMS, ModelPrograms, ModelRenderer, OptimizedVoxelModel, SHADOW_ATTRIBS};
pub use program::ProgramBindings;
pub use resource::{GpuBuffer, GpuTexture};
