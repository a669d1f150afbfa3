//! Versioned WGSL assets and the interface checks run before pipeline creation.
//!
//! Each shader starts with a header line `// terminus-shader: <name> v<N>`.
//! A [`ShaderContract`] lists the name, version, entry points and
//! `@group/@binding` slots the host code expects. [`ShaderContract::validate`]
//! rejects a source whose interface drifted from what the pipeline binds.

use std::path::{Path, PathBuf};

/// Embedded day/night surface shader.
pub const PLANET_SHADER_SOURCE: &str = include_str!("planet.wgsl");

/// Interface of [`PLANET_SHADER_SOURCE`].
pub const PLANET_CONTRACT: ShaderContract = ShaderContract {
    name: "planet",
    version: 1,
    entry_points: &["vs_main", "fs_main"],
    bindings: &[(0, 0), (1, 0), (1, 1), (1, 2), (1, 3), (1, 4)],
};

const HEADER_PREFIX: &str = "// terminus-shader:";

/// Errors raised while loading or validating a shader asset.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    /// The first non-blank line is not a `terminus-shader` header.
    #[error("shader '{expected}' has no version header")]
    MissingHeader { expected: String },

    /// The header names a different shader or version.
    #[error("shader header mismatch: expected {expected} v{expected_version}, found '{found}'")]
    HeaderMismatch {
        expected: String,
        expected_version: u32,
        found: String,
    },

    /// A required entry point is not defined.
    #[error("shader '{shader}' is missing entry point '{entry_point}'")]
    MissingEntryPoint { shader: String, entry_point: String },

    /// A required resource slot is not declared.
    #[error("shader '{shader}' does not declare @group({group}) @binding({binding})")]
    MissingBinding {
        shader: String,
        group: u32,
        binding: u32,
    },

    /// The override file does not exist.
    #[error("shader file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The override file could not be read.
    #[error("failed to read shader file: {0}")]
    IoError(#[from] std::io::Error),
}

/// Declared interface of a WGSL asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderContract {
    /// Name used in the header line and in pipeline labels.
    pub name: &'static str,
    /// Interface version; bumped when bindings or entry points change.
    pub version: u32,
    /// Entry points the pipeline refers to.
    pub entry_points: &'static [&'static str],
    /// `(group, binding)` pairs the host binds.
    pub bindings: &'static [(u32, u32)],
}

impl ShaderContract {
    /// Checks `source` against this contract.
    pub fn validate(&self, source: &str) -> Result<(), ShaderError> {
        let header = source
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .filter(|line| line.starts_with(HEADER_PREFIX))
            .ok_or_else(|| ShaderError::MissingHeader {
                expected: self.name.to_string(),
            })?;

        let declared = header[HEADER_PREFIX.len()..].trim();
        let expected = format!("{} v{}", self.name, self.version);
        if declared != expected {
            return Err(ShaderError::HeaderMismatch {
                expected: self.name.to_string(),
                expected_version: self.version,
                found: declared.to_string(),
            });
        }

        let code = strip_line_comments(source);

        for entry_point in self.entry_points {
            if !defines_function(&code, entry_point) {
                return Err(ShaderError::MissingEntryPoint {
                    shader: self.name.to_string(),
                    entry_point: entry_point.to_string(),
                });
            }
        }

        let declared_bindings = binding_slots(&code);
        for &(group, binding) in self.bindings {
            if !declared_bindings.contains(&(group, binding)) {
                return Err(ShaderError::MissingBinding {
                    shader: self.name.to_string(),
                    group,
                    binding,
                });
            }
        }

        log::debug!("Shader '{}' v{} passed contract checks", self.name, self.version);
        Ok(())
    }

    /// Reads an override source from disk and validates it.
    pub fn load_file(&self, path: &Path) -> Result<String, ShaderError> {
        if !path.exists() {
            return Err(ShaderError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let source = std::fs::read_to_string(path)?;
        self.validate(&source)?;
        log::info!("Loaded shader '{}' from {}", self.name, path.display());
        Ok(source)
    }
}

fn strip_line_comments(source: &str) -> String {
    source
        .lines()
        .map(|line| line.split("//").next().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
}

fn defines_function(code: &str, name: &str) -> bool {
    code.match_indices("fn ").any(|(idx, _)| {
        let rest = code[idx + 3..].trim_start();
        rest.strip_prefix(name)
            .is_some_and(|after| after.trim_start().starts_with('('))
    })
}

/// All `(group, binding)` pairs of `@group(g) @binding(b)` attributes.
fn binding_slots(code: &str) -> Vec<(u32, u32)> {
    let mut slots = Vec::new();
    for (idx, _) in code.match_indices("@group(") {
        let rest = &code[idx + "@group(".len()..];
        let Some((group, rest)) = parse_attr_number(rest) else {
            continue;
        };
        let Some(rest) = rest.trim_start().strip_prefix("@binding(") else {
            continue;
        };
        if let Some((binding, _)) = parse_attr_number(rest) {
            slots.push((group, binding));
        }
    }
    slots
}

fn parse_attr_number(s: &str) -> Option<(u32, &str)> {
    let close = s.find(')')?;
    let value = s[..close].trim().parse().ok()?;
    Some((value, &s[close + 1..]))
}
