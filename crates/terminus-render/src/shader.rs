//! Shader module cache with contract validation and on-disk overrides.
//!
//! Every WGSL asset is embedded at build time. When an override directory
//! is configured and holds `<name>.wgsl`, that file is used instead. Either
//! way the source must pass its [`ShaderContract`] before a module is built.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};
use terminus_shading::{ShaderContract, ShaderError};

/// Compiled shader modules keyed by contract name.
#[derive(Default)]
pub struct ShaderLibrary {
    modules: HashMap<&'static str, Arc<wgpu::ShaderModule>>,
    override_dir: Option<PathBuf>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.override_dir = Some(dir.into());
        self
    }

    /// Picks the override file if present, else `embedded`, and validates it.
    pub fn resolve_source<'a>(
        &self,
        contract: &ShaderContract,
        embedded: &'a str,
    ) -> Result<Cow<'a, str>, ShaderError> {
        if let Some(dir) = &self.override_dir {
            let path = dir.join(format!("{}.wgsl", contract.name));
            if path.is_file() {
                return contract.load_file(&path).map(Cow::Owned);
            }
        }
        contract.validate(embedded)?;
        debug!("Using embedded shader '{}'", contract.name);
        Ok(Cow::Borrowed(embedded))
    }

    /// Builds (or rebuilds) the module for `contract`.
    pub fn load(
        &mut self,
        device: &wgpu::Device,
        contract: &ShaderContract,
        embedded: &str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        let source = self.resolve_source(contract, embedded)?;
        let module = Arc::new(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(contract.name),
            source: wgpu::ShaderSource::Wgsl(source),
        }));
        if self.modules.insert(contract.name, Arc::clone(&module)).is_some() {
            info!("Replaced shader '{}'", contract.name);
        } else {
            info!("Loaded shader '{}' v{}", contract.name, contract.version);
        }
        Ok(module)
    }

    pub fn get(&self, name: &str) -> Option<Arc<wgpu::ShaderModule>> {
        self.modules.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terminus_shading::{PLANET_CONTRACT, PLANET_SHADER_SOURCE};

    #[test]
    fn test_embedded_source_is_used_without_override() {
        let library = ShaderLibrary::new();
        let source = library
            .resolve_source(&PLANET_CONTRACT, PLANET_SHADER_SOURCE)
            .expect("embedded planet shader is valid");
        assert!(matches!(source, Cow::Borrowed(_)));
    }

    #[test]
    fn test_override_file_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let patched = PLANET_SHADER_SOURCE.replace("5.5", "4.0");
        std::fs::write(dir.path().join("planet.wgsl"), &patched).expect("write");
        let library = ShaderLibrary::new().with_override_dir(dir.path());
        let source = library
            .resolve_source(&PLANET_CONTRACT, PLANET_SHADER_SOURCE)
            .expect("override is valid");
        assert_eq!(source, patched);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let broken = PLANET_SHADER_SOURCE.replace("fn fs_main", "fn fs_other");
        std::fs::write(dir.path().join("planet.wgsl"), broken).expect("write");
        let library = ShaderLibrary::new().with_override_dir(dir.path());
        let err = library
            .resolve_source(&PLANET_CONTRACT, PLANET_SHADER_SOURCE)
            .expect_err("missing entry point");
        assert!(matches!(err, ShaderError::MissingEntryPoint { .. }));
    }

    #[test]
    fn test_override_dir_without_file_falls_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let library = ShaderLibrary::new().with_override_dir(dir.path());
        assert!(
            library
                .resolve_source(&PLANET_CONTRACT, PLANET_SHADER_SOURCE)
                .is_ok()
        );
    }
}
