//! Optional file-driven configuration. Lets a host supply call-level
//! defaults from a file instead of constructing them programmatically;
//! doesn't change the shape of [`crate::simulate::simulate`] itself.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Call-level defaults a host can load from a file instead of constructing
/// programmatically. Mirrors `materials_core::config::Config::from_file`'s
/// dual YAML/TOML loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Deterministic seed for the call; combined per-electron via splitmix64.
    pub seed: u64,

    /// Worker thread count for the rayon pool. `None` uses rayon's global
    /// pool sizing.
    pub workers: Option<usize>,

    /// Minimum energy below which a trajectory terminates (keV).
    pub e_min: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            workers: None,
            e_min: 0.1,
        }
    }
}

impl SimConfig {
    /// Load from a YAML, TOML, or JSON file, selected by extension.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::invalid_input(format!("reading {}: {e}", path.display())))?;
        Self::from_str_with_extension(&content, &path)
    }

    fn from_str_with_extension(content: &str, path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|s| s.to_str());
        let config = match ext {
            Some("yaml") | Some("yml") => serde_yaml::from_str(content)
                .map_err(|e| Error::invalid_input(format!("invalid YAML config: {e}")))?,
            Some("toml") => toml::from_str(content)
                .map_err(|e| Error::invalid_input(format!("invalid TOML config: {e}")))?,
            _ => serde_json::from_str(content)
                .map_err(|e| Error::invalid_input(format!("invalid JSON config: {e}")))?,
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml() {
        let yaml = "seed: 42\nworkers: 4\ne_min: 0.2\n";
        let cfg: SimConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.workers, Some(4));
        assert_eq!(cfg.e_min, 0.2);
    }

    #[test]
    fn default_has_no_worker_override() {
        let cfg = SimConfig::default();
        assert!(cfg.workers.is_none());
    }
}
