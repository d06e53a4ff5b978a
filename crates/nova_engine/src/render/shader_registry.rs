//! Registry of every live shader program

use super::device::{GraphicsDevice, ProgramHandle};
use super::shader::{Shader, ShaderError};
use crate::foundation::collections::{OrderedSlotMap, ShaderId};

/// Outcome of recompiling one shader
#[derive(Debug)]
pub struct RecompileOutcome {
    /// Which shader
    pub id: ShaderId,
    /// Shader name
    pub name: String,
    /// New program or the failure
    pub result: Result<ProgramHandle, ShaderError>,
}

/// Per-shader results of [`ShaderRegistry::recompile_all`], in registration order
#[derive(Debug, Default)]
pub struct RecompileReport {
    /// One entry per registered shader
    pub outcomes: Vec<RecompileOutcome>,
}

impl RecompileReport {
    /// Number of shaders that failed
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    /// Whether every shader linked
    pub fn all_linked(&self) -> bool {
        self.failures() == 0
    }
}

/// Owns shaders so they can be rebuilt together
#[derive(Debug, Default)]
pub struct ShaderRegistry {
    shaders: OrderedSlotMap<ShaderId, Shader>,
}

impl ShaderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a shader
    pub fn register(&mut self, shader: Shader) -> ShaderId {
        log::debug!("Registering shader '{}'", shader.name());
        self.shaders.insert(shader)
    }

    /// Shader by id
    pub fn get(&self, id: ShaderId) -> Option<&Shader> {
        self.shaders.get(id)
    }

    /// Mutable shader by id
    pub fn get_mut(&mut self, id: ShaderId) -> Option<&mut Shader> {
        self.shaders.get_mut(id)
    }

    /// Current program of a shader, INVALID for unknown ids or unlinked shaders
    pub fn program(&self, id: ShaderId) -> ProgramHandle {
        self.shaders.get(id).map_or(ProgramHandle::INVALID, Shader::program)
    }

    /// Number of registered shaders
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    /// Whether no shaders are registered
    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    /// Shaders in registration order
    pub fn iter(&self) -> impl Iterator<Item = (ShaderId, &Shader)> {
        self.shaders.iter()
    }

    /// Compile one shader
    pub fn compile(&mut self, id: ShaderId, device: &mut dyn GraphicsDevice) -> Option<Result<ProgramHandle, ShaderError>> {
        self.shaders.get_mut(id).map(|shader| shader.compile(device))
    }

    /// Recompile every shader in registration order. A failure does not stop the rest.
    pub fn recompile_all(&mut self, device: &mut dyn GraphicsDevice) -> RecompileReport {
        let ids: Vec<ShaderId> = self.shaders.keys().collect();
        let mut report = RecompileReport::default();

        for id in ids {
            if let Some(shader) = self.shaders.get_mut(id) {
                let result = shader.compile(device);
                report.outcomes.push(RecompileOutcome {
                    id,
                    name: shader.name().to_string(),
                    result,
                });
            }
        }

        if report.all_linked() {
            log::info!("Recompiled {} shaders", report.outcomes.len());
        } else {
            log::warn!(
                "Recompiled {} shaders, {} failed",
                report.outcomes.len(),
                report.failures()
            );
        }
        report
    }

    /// Current handle of every registered shader, in registration order
    pub fn all_program_handles(&self) -> Vec<ProgramHandle> {
        self.shaders.iter().map(|(_, shader)| shader.program()).collect()
    }

    /// Remove a shader and delete its program
    pub fn destroy(&mut self, id: ShaderId, device: &mut dyn GraphicsDevice) -> bool {
        match self.shaders.remove(id) {
            Some(mut shader) => {
                shader.destroy(device);
                true
            }
            None => false,
        }
    }

    /// Remove every shader and delete their programs
    pub fn destroy_all(&mut self, device: &mut dyn GraphicsDevice) {
        for mut shader in self.shaders.drain() {
            shader.destroy(device);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::RecordingDevice;
    use crate::render::shader::test_support::*;
    use crate::render::shader::ShaderPaths;

    #[test]
    fn test_recompile_all_isolates_failures() {
        let mut device = RecordingDevice::new();
        let mut registry = ShaderRegistry::new();

        let good = registry.register(Shader::with_paths("good", valid_paths("iso_good")));
        let bad_paths = ShaderPaths::new(
            write_temp("iso_bad_vs", VERTEX),
            write_temp("iso_bad_fs", BROKEN_FRAGMENT),
        );
        let bad = registry.register(Shader::with_paths("bad", bad_paths));
        let last = registry.register(Shader::with_paths("last", valid_paths("iso_last")));

        let report = registry.recompile_all(&mut device);
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.failures(), 1);
        assert_eq!(report.outcomes[1].id, bad);

        assert!(registry.program(good).is_valid());
        assert!(!registry.program(bad).is_valid());
        assert!(registry.program(last).is_valid());
    }

    #[test]
    fn test_all_program_handles_in_order() {
        let mut device = RecordingDevice::new();
        let mut registry = ShaderRegistry::new();
        let a = registry.register(Shader::with_paths("a", valid_paths("order_a")));
        let b = registry.register(Shader::with_paths("b", valid_paths("order_b")));
        registry.recompile_all(&mut device);

        assert_eq!(
            registry.all_program_handles(),
            vec![registry.program(a), registry.program(b)]
        );
    }

    #[test]
    fn test_destroy_all_deletes_programs() {
        let mut device = RecordingDevice::new();
        let mut registry = ShaderRegistry::new();
        let id = registry.register(Shader::with_paths("a", valid_paths("destroy")));
        registry.recompile_all(&mut device);
        assert_eq!(device.live_programs(), 1);

        registry.destroy_all(&mut device);
        assert!(registry.is_empty());
        assert!(registry.get(id).is_none());
        assert_eq!(device.live_programs(), 0);
    }
}
