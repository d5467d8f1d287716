use super::rendering::{ShaderPaths, WindowConfig};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "triangles.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// RGBA, purple by default
    pub clear_color: [f32; 4],
    pub window: WindowConfig,
    pub shaders: ShaderPaths,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.5, 0.0, 0.5, 0.0],
            window: WindowConfig::default(),
            shaders: ShaderPaths::default(),
        }
    }
}

impl DemoConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Loads `triangles.toml` from the platform config directory, writing the
/// defaults there first if it does not exist yet.
pub fn load_or_create_config() -> Result<DemoConfig> {
    let config_path = get_config_path()?;
    load_or_create_at(&config_path)
}

fn load_or_create_at(config_path: &Path) -> Result<DemoConfig> {
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    if !config_path.exists() {
        let default_config = DemoConfig::default();
        let toml_content = toml::to_string_pretty(&default_config)?;
        std::fs::write(config_path, toml_content).context("Failed to write default config")?;
        return Ok(default_config);
    }

    DemoConfig::from_file(config_path)
}

fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "MetroManDevTeam", "Triangles")
        .context("Couldn't determine project directory")?;
    Ok(proj_dirs.config_dir().join(CONFIG_FILE))
}
