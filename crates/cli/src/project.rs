//! Loading a project from disk: the TOML config, each layer's GeoJSON, and
//! persisted mappings. Layer paths are resolved against the config's directory.

use std::path::{Path, PathBuf};

use dora_recon::config::SetConfig;
use dora_recon::engine::load_settings;
use dora_recon::{AdminSet, Mapping, ProjectConfig, ReconInput};

use crate::exit_codes::EXIT_RUNTIME;
use crate::CliError;

pub struct Project {
    pub config: ProjectConfig,
    pub base_dir: PathBuf,
}

impl Project {
    /// Read and validate a project config without touching any layer file.
    pub fn open(config_path: &Path) -> Result<Self, CliError> {
        let text = read_file(config_path, "project config")?;
        let config = ProjectConfig::from_toml(&text).map_err(|e| {
            CliError::recon(&e).with_hint(format!("check {}", config_path.display()))
        })?;
        let base_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self { config, base_dir })
    }

    /// Load every layer of both sets.
    pub fn load_input(&self) -> Result<ReconInput, CliError> {
        Ok(ReconInput {
            project_name: self.config.name.clone(),
            levels: self.config.admin_levels(),
            from: self.load_set(&self.config.from)?,
            to: self.load_set(&self.config.to)?,
        })
    }

    fn load_set(&self, set: &SetConfig) -> Result<AdminSet, CliError> {
        let mut settings = Vec::with_capacity(set.layers.len());
        for layer in &set.layers {
            let path = self.base_dir.join(&layer.file);
            let text = read_file(&path, "GeoJSON layer")?;
            let loaded = load_settings(layer, &layer.file, &text).map_err(|e| CliError::recon(&e))?;
            tracing::info!(
                set = %set.title,
                level = %layer.level,
                features = loaded.collection.len(),
                "loaded {}",
                path.display()
            );
            settings.push(loaded);
        }
        Ok(AdminSet {
            title: set.title.clone(),
            settings,
        })
    }
}

pub fn read_mapping(path: &Path) -> Result<Mapping, CliError> {
    let text = read_file(path, "mapping")?;
    Mapping::from_json_str(&text).map_err(|e| {
        CliError::recon(&e).with_hint(format!("{} is not a mapping written by `dora map`", path.display()))
    })
}

pub fn write_mapping(path: &Path, mapping: &Mapping) -> Result<(), CliError> {
    let mut json = mapping.to_json_string();
    json.push('\n');
    std::fs::write(path, json).map_err(|e| {
        CliError::new(EXIT_RUNTIME, format!("cannot write {}: {e}", path.display()))
    })?;
    tracing::debug!("wrote {}", path.display());
    Ok(())
}

fn read_file(path: &Path, what: &str) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_RUNTIME, format!("cannot read {what} {}: {e}", path.display()))
    })
}
