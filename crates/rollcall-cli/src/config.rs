use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// CLI configuration; every field has a default so a partial TOML file is
/// fine and no config file at all means pure defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Match threshold (cosine distance). Lower is stricter.
    pub threshold: f32,
    /// Embedding model identifier, passed through to the external embedder.
    pub model: String,
    /// Detector backend identifier, passed through to the external detector.
    pub detector: String,
    /// Path of the attendance ledger database.
    pub ledger: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: 0.40,
            model: "VGG-Face".to_string(),
            detector: "opencv".to_string(),
            ledger: PathBuf::from("attendance.db"),
        }
    }
}

pub fn load(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}
