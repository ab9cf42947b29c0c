use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RANKED_MIN_SHOTS: usize = 250;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntropyConfig {
    pub grid_x: usize,
    pub grid_y: usize,
    pub exclude_penalties: bool,

    // Unscaled stability weights; they should sum to <= 1.0 for a clean reading.
    pub w_shot_entropy: f64,
    pub w_spatial_entropy: f64,
    pub w_type_entropy: f64,
    pub w_box_share: f64,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            grid_x: 6,
            grid_y: 4,
            exclude_penalties: true,
            w_shot_entropy: 0.40,
            w_spatial_entropy: 0.30,
            w_type_entropy: 0.15,
            w_box_share: 0.15,
        }
    }
}

impl EntropyConfig {
    pub fn with_grid(self, grid_x: usize, grid_y: usize) -> Self {
        Self {
            grid_x: grid_x.max(1),
            grid_y: grid_y.max(1),
            ..self
        }
    }

    pub fn weight_sum(&self) -> f64 {
        self.w_shot_entropy + self.w_spatial_entropy + self.w_type_entropy + self.w_box_share
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoxInBoxConfig {
    pub max_spatial_entropy: f64,
    pub min_box_share: f64,
    pub min_xg_per_shot: f64,
    pub min_shots: usize,
}

impl Default for FoxInBoxConfig {
    fn default() -> Self {
        Self {
            max_spatial_entropy: 0.35,
            min_box_share: 0.80,
            min_xg_per_shot: 0.13,
            min_shots: 50,
        }
    }
}

/// Everything one run needs besides the input location.
///
/// `min_shots` gates the ranked view and the rendered reports. It is unrelated
/// to `fox.min_shots`, which only feeds the fox-in-box rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub entropy: EntropyConfig,
    pub fox: FoxInBoxConfig,
    pub min_shots: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            entropy: EntropyConfig::default(),
            fox: FoxInBoxConfig::default(),
            min_shots: DEFAULT_RANKED_MIN_SHOTS,
        }
    }
}

impl RunConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Self::default());
        }
        let cfg: Self = serde_json::from_str(trimmed).context("invalid run config json")?;
        Ok(cfg.normalized())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read run config {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("parse run config {}", path.display()))
    }

    /// Apply `XG_ENTROPY_*` environment overrides on top of `self`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse_usize = |key: &str| lookup(key).and_then(|v| v.trim().parse::<usize>().ok());
        if let Some(v) = parse_usize("XG_ENTROPY_GRID_X") {
            self.entropy.grid_x = v;
        }
        if let Some(v) = parse_usize("XG_ENTROPY_GRID_Y") {
            self.entropy.grid_y = v;
        }
        if let Some(v) = parse_usize("XG_ENTROPY_MIN_SHOTS") {
            self.min_shots = v;
        }
        if let Some(v) = lookup("XG_ENTROPY_EXCLUDE_PENS").and_then(|v| parse_bool(&v)) {
            self.entropy.exclude_penalties = v;
        }
        self.normalized()
    }

    fn normalized(self) -> Self {
        Self {
            entropy: self.entropy.with_grid(self.entropy.grid_x, self.entropy.grid_y),
            ..self
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{EntropyConfig, FoxInBoxConfig, RunConfig};

    #[test]
    fn defaults_match_documented_values() {
        let e = EntropyConfig::default();
        assert_eq!((e.grid_x, e.grid_y), (6, 4));
        assert!(e.exclude_penalties);
        assert!((e.weight_sum() - 1.0).abs() < 1e-12);

        let f = FoxInBoxConfig::default();
        assert_eq!(f.min_shots, 50);
        assert_eq!(RunConfig::default().min_shots, 250);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg = RunConfig::from_json_str(r#"{"entropy":{"grid_x":10},"min_shots":100}"#)
            .expect("partial config should parse");
        assert_eq!(cfg.entropy.grid_x, 10);
        assert_eq!(cfg.entropy.grid_y, 4);
        assert_eq!(cfg.min_shots, 100);
        assert_eq!(cfg.fox, FoxInBoxConfig::default());
        assert_eq!(RunConfig::from_json_str("null").unwrap(), RunConfig::default());
    }

    #[test]
    fn zero_grid_is_clamped() {
        let cfg = RunConfig::from_json_str(r#"{"entropy":{"grid_x":0,"grid_y":0}}"#).unwrap();
        assert_eq!((cfg.entropy.grid_x, cfg.entropy.grid_y), (1, 1));
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("XG_ENTROPY_GRID_X", "8"),
            ("XG_ENTROPY_MIN_SHOTS", "oops"),
            ("XG_ENTROPY_EXCLUDE_PENS", "false"),
        ]);
        let cfg = RunConfig::default().with_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.entropy.grid_x, 8);
        assert_eq!(cfg.min_shots, 250);
        assert!(!cfg.entropy.exclude_penalties);
    }
}
