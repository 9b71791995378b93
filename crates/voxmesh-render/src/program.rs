use hashbrown::HashMap;

use crate::device::{GpuDevice, ProgramId, UniformValue};

/// Attribute and uniform locations of one linked program, resolved once.
#[derive(Clone, Debug)]
pub struct ProgramBindings {
    program: ProgramId,
    attribs: HashMap<String, u32>,
    uniforms: HashMap<String, i32>,
}

impl ProgramBindings {
    /// Looks up every listed name; names the program does not use are left out
    /// and silently skipped later.
    pub fn link(device: &dyn GpuDevice, program: ProgramId, attribs: &[&str], uniforms: &[&str]) -> Self {
        let mut a = HashMap::new();
        for &name in attribs {
            match device.attrib_location(program, name) {
                Some(loc) => {
                    a.insert(name.to_string(), loc);
                }
                None => log::debug!("program {:?}: no attribute {}", program, name),
            }
        }
        let mut u = HashMap::new();
        for &name in uniforms {
            if let Some(loc) = device.uniform_location(program, name) {
                u.insert(name.to_string(), loc);
            }
        }
        Self {
            program,
            attribs: a,
            uniforms: u,
        }
    }

    #[inline]
    pub fn program(&self) -> ProgramId {
        self.program
    }

    #[inline]
    pub fn attrib(&self, name: &str) -> Option<u32> {
        self.attribs.get(name).copied()
    }

    #[inline]
    pub fn uniform(&self, name: &str) -> Option<i32> {
        self.uniforms.get(name).copied()
    }

    pub fn use_program(&self, device: &dyn GpuDevice) {
        device.use_program(self.program);
    }

    /// Sets `name` if the program has it.
    pub fn set(&self, device: &dyn GpuDevice, name: &str, value: UniformValue) {
        if let Some(loc) = self.uniform(name) {
            device.set_uniform(loc, value);
        }
    }
}
