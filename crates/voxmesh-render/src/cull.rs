//! Culling inputs consumed by the render passes. The frustum itself belongs
//! to the caller; passes only ask yes/no questions through [`CullVolume`].

use voxmesh_geom::{Aabb, Vec3};

pub trait CullVolume {
    fn box_visible(&self, bounds: &Aabb) -> bool;
    fn sphere_visible(&self, center: Vec3, radius: f32) -> bool;
}

/// Accepts everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoCull;

impl CullVolume for NoCull {
    fn box_visible(&self, _: &Aabb) -> bool {
        true
    }
    fn sphere_visible(&self, _: Vec3, _: f32) -> bool {
        true
    }
}

/// Visibility sphere around a viewpoint, for headless runs without a camera frustum.
#[derive(Copy, Clone, Debug)]
pub struct SphereCull {
    pub center: Vec3,
    pub radius: f32,
}

impl CullVolume for SphereCull {
    fn box_visible(&self, bounds: &Aabb) -> bool {
        bounds.distance_sq(self.center) <= self.radius * self.radius
    }

    fn sphere_visible(&self, center: Vec3, radius: f32) -> bool {
        let r = self.radius + radius;
        let d = center - self.center;
        d.dot(d) <= r * r
    }
}

/// Point light with a finite range.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DynamicLight {
    pub position: Vec3,
    pub radius: f32,
    pub color: Vec3,
}

impl DynamicLight {
    pub fn touches_box(&self, bounds: &Aabb) -> bool {
        bounds.distance_sq(self.position) <= self.radius * self.radius
    }

    pub fn touches_sphere(&self, center: Vec3, radius: f32) -> bool {
        let r = self.radius + radius;
        let d = center - self.position;
        d.dot(d) <= r * r
    }
}

/// Per-frame view facts shared by every pass.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ViewState {
    pub eye: Vec3,
    /// Set while rendering a mirrored view.
    pub mirror: bool,
}

/// One instance of a model in the scene.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModelRenderParam {
    /// World position of the model origin.
    pub position: Vec3,
    /// Uniform scale; the bounding radius grows with it.
    pub scale: f32,
    pub custom_color: Vec3,
    pub opacity: f32,
    /// First-person items drawn in a compressed depth range.
    pub depth_hack: bool,
    pub cast_shadow: bool,
    pub ghost: bool,
}

impl Default for ModelRenderParam {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: 1.0,
            custom_color: Vec3::ZERO,
            opacity: 1.0,
            depth_hack: false,
            cast_shadow: true,
            ghost: false,
        }
    }
}

impl ModelRenderParam {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}
