use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::CapabilityTier;

fn default_snippet_max_chars() -> usize {
    4000
}

/// Filesystem roots the sandbox may resolve paths into.
///
/// `default_root` anchors relative paths and is always allowed;
/// `allowed_roots` extends the set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspacePolicy {
    pub default_root: PathBuf,
    #[serde(default)]
    pub allowed_roots: Vec<PathBuf>,
}

impl WorkspacePolicy {
    pub fn single_root(root: impl Into<PathBuf>) -> Self {
        Self {
            default_root: root.into(),
            allowed_roots: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub capability_tier: CapabilityTier,
    #[serde(default = "default_snippet_max_chars")]
    pub snippet_max_chars: usize,
    pub workspace: WorkspacePolicy,
}

impl RuntimeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: RuntimeConfig =
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

        if let Ok(root) = std::env::var("NEURAL_DESK_WORKSPACE") {
            config.workspace.default_root = PathBuf::from(root);
        }

        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            capability_tier: CapabilityTier::Standard,
            snippet_max_chars: default_snippet_max_chars(),
            workspace: WorkspacePolicy::single_root("."),
        }
    }
}
