use crate::export::ExportConfig;
use crate::render::ExportFormat;
use crate::render::encode::DEFAULT_QUALITY;
use crate::store::DEFAULT_CAPACITY_BYTES;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use wheelcore::ViewportClass;

pub const DEFAULT_MAX_IMAGE_DIMENSION: u32 = 1000;
pub const STORE_FILE_NAME: &str = "store.json";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportSettings {
    pub scale: u32,
    pub format: ExportFormat,
    pub quality: f64,
    /// Where exports land; the current directory when unset.
    pub directory: Option<PathBuf>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        let config = ExportConfig::default();
        Self {
            scale: config.scale,
            format: config.format,
            quality: DEFAULT_QUALITY,
            directory: None,
        }
    }
}

impl ExportSettings {
    pub fn config(&self) -> ExportConfig {
        ExportConfig {
            scale: self.scale,
            format: self.format,
            quality: self.quality,
        }
        .clamped()
    }

    pub fn directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    pub max_image_dimension: u32,
    pub capacity_bytes: usize,
    /// Holds the key-value store and the working session; the platform data
    /// directory when unset.
    pub directory: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            max_image_dimension: DEFAULT_MAX_IMAGE_DIMENSION,
            capacity_bytes: DEFAULT_CAPACITY_BYTES,
            directory: None,
        }
    }
}

impl StorageSettings {
    pub fn directory(&self) -> Result<PathBuf, ConfigError> {
        match &self.directory {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().to_path_buf()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub viewport: ViewportClass,
    pub export: ExportSettings,
    pub storage: StorageSettings,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from("org", "wheelhouse", "wheelhouse").ok_or(ConfigError::ConfigDirNotFound)
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("WHEELHOUSE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Layers an optional TOML file under `WHEELHOUSE_*` environment variables
/// (`WHEELHOUSE_EXPORT__SCALE=8`).
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    load_layers(path, environment())
}

fn load_layers(path: &Path, env: config::Environment) -> Result<Settings, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(env)
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(&get_config_path()?)
}

pub fn load_or_default() -> Settings {
    match load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load settings, using defaults: {}", e);
            Settings::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");
