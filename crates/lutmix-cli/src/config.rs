//! Chain descriptions: `--lut PATH[:INTENSITY]` flags and YAML chain files.
//!
//! ```yaml
//! show_original: false
//! stages:
//!   - lut: looks/teal.cube
//!     intensity: 0.8
//!   - lut: looks/contrast.cube
//! ```
//!
//! Relative LUT paths in a chain file resolve against the file's directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// One chain stage as given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct LutSpec {
    pub path: PathBuf,
    pub intensity: f32,
}

impl FromStr for LutSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("empty LUT path".into());
        }
        // Only a trailing number counts as intensity, so `C:\looks\a.cube` stays a path
        if let Some((path, value)) = s.rsplit_once(':') {
            if let Ok(intensity) = value.parse::<f32>() {
                if path.is_empty() {
                    return Err(format!("missing LUT path in '{s}'"));
                }
                return Ok(Self { path: PathBuf::from(path), intensity });
            }
        }
        Ok(Self { path: PathBuf::from(s), intensity: 1.0 })
    }
}

/// YAML chain file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    /// Compare toggle, only meaningful for previews.
    #[serde(default)]
    pub show_original: bool,
    /// Stages in application order.
    pub stages: Vec<StageConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    pub lut: PathBuf,
    #[serde(default = "full_intensity")]
    pub intensity: f32,
}

fn full_intensity() -> f32 {
    1.0
}

impl ChainConfig {
    /// Parses YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Invalid chain file")
    }

    /// Loads a chain file, resolving relative LUT paths against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read chain file: {}", path.display()))?;
        let mut config = Self::from_yaml(&text)
            .with_context(|| format!("Failed to parse chain file: {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_relative(base);
        }
        Ok(config)
    }

    fn resolve_relative(&mut self, base: &Path) {
        for stage in &mut self.stages {
            if stage.lut.is_relative() {
                stage.lut = base.join(&stage.lut);
            }
        }
    }

    /// Stages as command-line style specs.
    pub fn into_specs(self) -> Vec<LutSpec> {
        self.stages
            .into_iter()
            .map(|s| LutSpec { path: s.lut, intensity: s.intensity })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_with_and_without_intensity() {
        let a: LutSpec = "looks/teal.cube:0.25".parse().unwrap();
        assert_eq!(a, LutSpec { path: "looks/teal.cube".into(), intensity: 0.25 });

        let b: LutSpec = "looks/teal.cube".parse().unwrap();
        assert_eq!(b.intensity, 1.0);

        let c: LutSpec = r"C:\looks\teal.cube".parse().unwrap();
        assert_eq!(c.path, PathBuf::from(r"C:\looks\teal.cube"));

        assert!(":0.5".parse::<LutSpec>().is_err());
        assert!("".parse::<LutSpec>().is_err());
    }

    #[test]
    fn yaml_defaults() {
        let cfg = ChainConfig::from_yaml(
            "stages:\n  - lut: a.cube\n    intensity: 0.3\n  - lut: b.cube\n",
        )
        .unwrap();
        assert!(!cfg.show_original);
        let specs = cfg.into_specs();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].intensity, 0.3);
        assert_eq!(specs[1].intensity, 1.0);
    }

    #[test]
    fn yaml_rejects_unknown_keys() {
        assert!(ChainConfig::from_yaml("stages: []\nblend: add\n").is_err());
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grade.yaml");
        std::fs::write(&path, "stages:\n  - lut: looks/a.cube\n  - lut: /abs/b.cube\n").unwrap();

        let specs = ChainConfig::load(&path).unwrap().into_specs();
        assert_eq!(specs[0].path, dir.path().join("looks/a.cube"));
        assert_eq!(specs[1].path, PathBuf::from("/abs/b.cube"));
    }
}
