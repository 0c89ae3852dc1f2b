use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Submesh name fragments that mark a part as non-rendering during
/// normalization (temple arms and similar parts that would clip the face).
pub const DEFAULT_SUPPRESSED_PARTS: [&str; 4] = ["temple", "arm", "ear", "handle"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Consecutive missed-detection frames tolerated before tracking is
    /// declared lost and the held pose is dropped.
    pub grace_frames: u32,
    /// Enables the exponential-moving-average smoothing stage between the
    /// estimator and the renderer.
    pub smoothing: bool,
    /// Blend factor toward the raw estimate when smoothing is enabled;
    /// 1.0 is pass-through, smaller values smooth harder.
    pub smoothing_alpha: f32,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        StabilizerConfig {
            grace_frames: 3,
            smoothing: false,
            smoothing_alpha: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Case-insensitive substrings matched against submesh names; matching
    /// parts are suppressed from rendering and excluded from the visible
    /// bounding box.
    pub suppressed_parts: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        NormalizerConfig {
            suppressed_parts: DEFAULT_SUPPRESSED_PARTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct TryOnConfig {
    pub stabilizer: StabilizerConfig,
    pub normalizer: NormalizerConfig,
}

impl TryOnConfig {
    /// load reads the configuration from a JSON file, falling back to
    /// defaults for missing fields or a missing file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            return Ok(TryOnConfig::default());
        }
        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str::<TryOnConfig>(&content)?;
        Ok(config)
    }

    /// save writes the configuration to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
