//! Default warmup and cooldown steps
//!
//! Used when an exercise brings no warmup/cooldown of its own. A JSON file
//! `{"warmup": [...], "cooldown": [...]}` can replace either list.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

const DEFAULT_WARMUP: &[&str] = &[
    "Walk slowly around the room together for a minute to loosen up",
    "Let the dog stretch forward and back with a treat lure",
    "Gently massage shoulders, hips and legs",
];

const DEFAULT_COOLDOWN: &[&str] = &[
    "Walk slowly side by side to bring the heart rate down",
    "Lure a gentle side stretch to each side",
    "Let the dog lie down and stroke it calmly",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Presets {
    #[serde(default = "default_warmup")]
    pub warmup: Vec<String>,
    #[serde(default = "default_cooldown")]
    pub cooldown: Vec<String>,
}

fn default_warmup() -> Vec<String> {
    DEFAULT_WARMUP.iter().map(|s| s.to_string()).collect()
}

fn default_cooldown() -> Vec<String> {
    DEFAULT_COOLDOWN.iter().map(|s| s.to_string()).collect()
}

impl Default for Presets {
    fn default() -> Self {
        Self {
            warmup: default_warmup(),
            cooldown: default_cooldown(),
        }
    }
}

impl Presets {
    /// Read presets from a JSON file; missing keys keep the built-in lists
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading presets {}", path.display()))?;
        let presets: Presets = serde_json::from_str(&text)
            .with_context(|| format!("parsing presets {}", path.display()))?;
        info!(
            "Loaded presets from {} ({} warmup, {} cooldown)",
            path.display(),
            presets.warmup.len(),
            presets.cooldown.len()
        );
        Ok(presets)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_presets_not_empty() {
        let presets = Presets::default();
        assert_eq!(presets.warmup.len(), 3);
        assert_eq!(presets.cooldown.len(), 3);
    }

    #[test]
    fn test_load_partial_file_keeps_other_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"warmup": ["jog"]}}"#).unwrap();

        let presets = Presets::load(file.path()).unwrap();
        assert_eq!(presets.warmup, vec!["jog".to_string()]);
        assert_eq!(presets.cooldown, Presets::default().cooldown);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Presets::load(&dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn test_load_or_default_without_path() {
        assert_eq!(Presets::load_or_default(None).unwrap(), Presets::default());
    }
}
