use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::{AdminLevel, Pointer};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// A reconciliation project: the shared admin levels plus the old (`from`)
/// and new (`to`) versions of the boundary hierarchy.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub levels: Vec<AdminLevel>,
    #[serde(default)]
    pub options: MatchOptions,
    pub from: SetConfig,
    pub to: SetConfig,
}

// ---------------------------------------------------------------------------
// Sets + layers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SetConfig {
    pub title: String,
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
}

/// One admin level of one set: where its GeoJSON lives and how to read it.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerConfig {
    pub level: String,
    pub file: String,
    #[serde(default)]
    pub pointer: Pointer,
}

impl SetConfig {
    pub fn layer_for(&self, level_key: &str) -> Option<&LayerConfig> {
        self.layers.iter().find(|l| l.level == level_key)
    }
}

// ---------------------------------------------------------------------------
// Match options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct MatchOptions {
    /// Emit `{from, to}` links for units matched without any change.
    /// When off, unchanged units have no link at all.
    #[serde(default = "default_emit_unmodified")]
    pub emit_unmodified: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            emit_unmodified: default_emit_unmodified(),
        }
    }
}

fn default_emit_unmodified() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ProjectConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ProjectConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.levels.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one admin level is required".into(),
            ));
        }

        let mut keys = HashSet::new();
        let mut ordinals = HashSet::new();
        for level in &self.levels {
            if level.key.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "admin level key must not be empty".into(),
                ));
            }
            if !keys.insert(level.key.as_str()) {
                return Err(ReconError::ConfigValidation(format!(
                    "duplicate admin level key '{}'",
                    level.key
                )));
            }
            if !ordinals.insert(level.level) {
                return Err(ReconError::ConfigValidation(format!(
                    "admin level '{}': level {} is already used",
                    level.key, level.level
                )));
            }
        }

        for (side, set) in [("from", &self.from), ("to", &self.to)] {
            let mut seen = HashSet::new();
            for layer in &set.layers {
                if !keys.contains(layer.level.as_str()) {
                    return Err(ReconError::UnknownLevel(format!(
                        "set '{side}': layer '{}' references an undeclared level",
                        layer.level
                    )));
                }
                if !seen.insert(layer.level.as_str()) {
                    return Err(ReconError::ConfigValidation(format!(
                        "set '{side}': more than one layer for level '{}'",
                        layer.level
                    )));
                }
            }
        }

        Ok(())
    }

    /// Admin levels ordered root-to-leaf.
    pub fn admin_levels(&self) -> Vec<AdminLevel> {
        let mut levels = self.levels.clone();
        levels.sort_by_key(|l| l.level);
        levels
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
