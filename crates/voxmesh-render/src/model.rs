//! Uploaded static models and the per-frame instance list that draws them.

use std::rc::Rc;

use hashbrown::HashMap;
use voxmesh_geom::{Aabb, Vec3};
use voxmesh_mesh_cpu::{MeshError, ModelMeshCPU, ModelVertex, build_model_mesh};
use voxmesh_voxel::VoxelModel;

use crate::buffers::MeshBuffers;
use crate::chunk::set_light;
use crate::cull::{CullVolume, DynamicLight, ModelRenderParam, ViewState};
use crate::device::{BufferUsage, GpuDevice, ProgramId, UniformValue};
use crate::program::ProgramBindings;
use crate::resource::GpuTexture;

/// Vertex attributes and uniforms of the model programs, by shader name.
pub const MODEL_ATTRIBS: &[&str] = &["positionAttribute", "textureCoordAttribute", "normalAttribute"];
pub const SHADOW_ATTRIBS: &[&str] = &["positionAttribute", "normalAttribute"];
pub const MODEL_UNIFORMS: &[&str] = &[
    "modelOrigin",
    "texScale",
    "modelTexture",
    "modelPosition",
    "modelScale",
    "customColor",
    "modelOpacity",
    "dynamicLightOrigin",
    "dynamicLightRadius",
    "dynamicLightColor",
];

/// Texture unit of the model atlas; unit 0 holds the AO lookup texture.
const ATLAS_UNIT: u32 = 1;

/// Depth range squeezed for depth-hacked (first-person) instances.
const DEPTH_HACK_FAR: f32 = 0.1;

#[derive(Clone, Debug)]
pub struct ModelPrograms {
    pub sunlight: ProgramBindings,
    pub dlight: ProgramBindings,
    pub shadow_map: ProgramBindings,
}

impl ModelPrograms {
    pub fn link(device: &dyn GpuDevice, sunlight: ProgramId, dlight: ProgramId, shadow_map: ProgramId) -> Self {
        Self {
            sunlight: ProgramBindings::link(device, sunlight, MODEL_ATTRIBS, MODEL_UNIFORMS),
            dlight: ProgramBindings::link(device, dlight, MODEL_ATTRIBS, MODEL_UNIFORMS),
            shadow_map: ProgramBindings::link(device, shadow_map, SHADOW_ATTRIBS, MODEL_UNIFORMS),
        }
    }
}

/// A model meshed once and kept only on the device.
#[derive(Debug)]
pub struct OptimizedVoxelModel {
    buffers: Option<MeshBuffers>,
    texture: GpuTexture,
    origin: Vec3,
    dims: [usize; 3],
    bounds: Aabb,
    radius: f32,
}

impl OptimizedVoxelModel {
    pub fn new(device: &Rc<dyn GpuDevice>, model: &VoxelModel) -> Result<Self, MeshError> {
        Ok(Self::from_mesh(device, build_model_mesh(model)?))
    }

    /// Uploads `cpu`; its arrays are dropped afterwards.
    pub fn from_mesh(device: &Rc<dyn GpuDevice>, cpu: ModelMeshCPU) -> Self {
        let buffers = MeshBuffers::upload(device, &cpu.mesh, ModelVertex::LAYOUT, BufferUsage::StaticDraw);
        let texture = GpuTexture::from_bitmap(device, &cpu.atlas);
        Self {
            buffers,
            texture,
            origin: cpu.origin,
            dims: cpu.dims,
            bounds: cpu.bounds,
            radius: cpu.radius,
        }
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn triangle_count(&self) -> usize {
        self.buffers.as_ref().map_or(0, |b| b.triangle_count())
    }

    pub fn buffers(&self) -> Option<&MeshBuffers> {
        self.buffers.as_ref()
    }

    pub fn texture(&self) -> &GpuTexture {
        &self.texture
    }

    fn begin(&self, device: &dyn GpuDevice, prog: &ProgramBindings, names: &[&str]) -> Option<Vec<u32>> {
        let buffers = self.buffers.as_ref()?;
        prog.use_program(device);
        let o = self.origin;
        prog.set(device, "modelOrigin", UniformValue::Vec3([o.x, o.y, o.z]));
        let (w, h) = self.texture.size();
        prog.set(device, "texScale", UniformValue::Vec2([1.0 / w as f32, 1.0 / h as f32]));
        prog.set(device, "modelTexture", UniformValue::Int(ATLAS_UNIT as i32));
        self.texture.bind(ATLAS_UNIT);
        Some(buffers.bind(device, prog, names))
    }

    fn end(device: &dyn GpuDevice, enabled: &[u32]) {
        MeshBuffers::unbind(device, enabled);
        device.bind_texture(ATLAS_UNIT, None);
    }

    fn set_instance(device: &dyn GpuDevice, prog: &ProgramBindings, p: &ModelRenderParam) {
        let pos = p.position;
        prog.set(device, "modelPosition", UniformValue::Vec3([pos.x, pos.y, pos.z]));
        prog.set(device, "modelScale", UniformValue::Float(p.scale));
    }

    fn draw(&self, device: &dyn GpuDevice) {
        if let Some(b) = self.buffers.as_ref() {
            b.draw(device);
        }
    }

    /// Returns the number of draw calls issued.
    pub fn render_shadow_map_pass(
        &self,
        device: &dyn GpuDevice,
        prog: &ProgramBindings,
        params: &[ModelRenderParam],
        cull: &dyn CullVolume,
    ) -> usize {
        let Some(enabled) = self.begin(device, prog, SHADOW_ATTRIBS) else {
            return 0;
        };
        let mut draws = 0;
        for p in params {
            if p.depth_hack || !p.cast_shadow || p.ghost {
                continue;
            }
            if !cull.sphere_visible(p.position, self.radius * p.scale) {
                continue;
            }
            Self::set_instance(device, prog, p);
            self.draw(device);
            draws += 1;
        }
        Self::end(device, &enabled);
        draws
    }

    /// Draws the instances whose ghost flag equals `ghost_pass`.
    pub fn render_sunlight_pass(
        &self,
        device: &dyn GpuDevice,
        prog: &ProgramBindings,
        params: &[ModelRenderParam],
        ghost_pass: bool,
        view: ViewState,
        cull: &dyn CullVolume,
    ) -> usize {
        let Some(enabled) = self.begin(device, prog, MODEL_ATTRIBS) else {
            return 0;
        };
        let mut draws = 0;
        for p in params {
            if view.mirror && p.depth_hack {
                continue;
            }
            if p.ghost != ghost_pass {
                continue;
            }
            if !cull.sphere_visible(p.position, self.radius * p.scale) {
                continue;
            }
            Self::set_instance(device, prog, p);
            let c = p.custom_color;
            prog.set(device, "customColor", UniformValue::Vec3([c.x, c.y, c.z]));
            prog.set(device, "modelOpacity", UniformValue::Float(p.opacity));
            if p.depth_hack {
                device.depth_range(0.0, DEPTH_HACK_FAR);
            }
            self.draw(device);
            if p.depth_hack {
                device.depth_range(0.0, 1.0);
            }
            draws += 1;
        }
        Self::end(device, &enabled);
        draws
    }

    /// One draw per (instance, light) pair whose spheres overlap.
    pub fn render_dynamic_light_pass(
        &self,
        device: &dyn GpuDevice,
        prog: &ProgramBindings,
        params: &[ModelRenderParam],
        lights: &[DynamicLight],
        view: ViewState,
        cull: &dyn CullVolume,
    ) -> usize {
        let Some(enabled) = self.begin(device, prog, MODEL_ATTRIBS) else {
            return 0;
        };
        let mut draws = 0;
        for p in params {
            if (view.mirror && p.depth_hack) || p.ghost {
                continue;
            }
            let rad = self.radius * p.scale;
            if !cull.sphere_visible(p.position, rad) {
                continue;
            }
            Self::set_instance(device, prog, p);
            let c = p.custom_color;
            prog.set(device, "customColor", UniformValue::Vec3([c.x, c.y, c.z]));
            if p.depth_hack {
                device.depth_range(0.0, DEPTH_HACK_FAR);
            }
            for light in lights {
                if !light.touches_sphere(p.position, rad) {
                    continue;
                }
                set_light(device, prog, light);
                self.draw(device);
                draws += 1;
            }
            if p.depth_hack {
                device.depth_range(0.0, 1.0);
            }
        }
        Self::end(device, &enabled);
        draws
    }
}

struct RenderModel {
    model: Rc<OptimizedVoxelModel>,
    params: Vec<ModelRenderParam>,
}

/// Per-frame instance list grouped by model. Holding an `Rc` keeps each
/// model alive until [`ModelRenderer::clear`].
pub struct ModelRenderer {
    device: Rc<dyn GpuDevice>,
    programs: ModelPrograms,
    models: Vec<RenderModel>,
    slots: HashMap<*const OptimizedVoxelModel, usize>,
    instances: usize,
}

impl ModelRenderer {
    pub fn new(device: Rc<dyn GpuDevice>, programs: ModelPrograms) -> Self {
        Self {
            device,
            programs,
            models: Vec::new(),
            slots: HashMap::new(),
            instances: 0,
        }
    }

    pub fn add_model(&mut self, model: &Rc<OptimizedVoxelModel>, param: ModelRenderParam) {
        let key = Rc::as_ptr(model);
        let slot = *self.slots.entry(key).or_insert_with(|| {
            self.models.push(RenderModel {
                model: Rc::clone(model),
                params: Vec::new(),
            });
            self.models.len() - 1
        });
        self.models[slot].params.push(param);
        self.instances += 1;
    }

    pub fn unique_models(&self) -> usize {
        self.models.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances
    }

    pub fn render_shadow_map_pass(&self, cull: &dyn CullVolume) -> usize {
        let device = self.device.as_ref();
        self.models
            .iter()
            .map(|m| m.model.render_shadow_map_pass(device, &self.programs.shadow_map, &m.params, cull))
            .sum()
    }

    pub fn render_sunlight_pass(&self, ghost_pass: bool, view: ViewState, cull: &dyn CullVolume) -> usize {
        let device = self.device.as_ref();
        self.models
            .iter()
            .map(|m| {
                m.model
                    .render_sunlight_pass(device, &self.programs.sunlight, &m.params, ghost_pass, view, cull)
            })
            .sum()
    }

    pub fn render_dynamic_light_pass(&self, lights: &[DynamicLight], view: ViewState, cull: &dyn CullVolume) -> usize {
        if lights.is_empty() {
            return 0;
        }
        let device = self.device.as_ref();
        self.models
            .iter()
            .map(|m| {
                m.model
                    .render_dynamic_light_pass(device, &self.programs.dlight, &m.params, lights, view, cull)
            })
            .sum()
    }

    /// Drops every instance and the renderer's model references.
    pub fn clear(&mut self) {
        log::trace!(
            "model renderer cleared: {} instances of {} models",
            self.instances,
            self.models.len()
        );
        self.models.clear();
        self.slots.clear();
        self.instances = 0;
    }
}
