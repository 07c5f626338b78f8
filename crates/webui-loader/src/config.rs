//! Application configuration.
//!
//! Two presets exist. `local` rereads the model files on every load and
//! keeps no markup cache. `server` reloads the model only when the files
//! change and caches level-neutral markup on disk. A TOML file can
//! override any field of the selected preset.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LoaderError;

/// Choice lists with at most this many options render as radio buttons.
pub const DEFAULT_RADIO_MAX: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Local,
    Server,
}

impl Preset {
    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Local => "local",
            Preset::Server => "server",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Preset::Local),
            "server" => Ok(Preset::Server),
            _ => Err(LoaderError::UnknownPreset(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormConfig {
    pub preset: Preset,
    pub model_file: PathBuf,
    pub accesslevel_file: PathBuf,
    /// Level selected when a form is first shown; the lowest level if unset.
    pub default_level: Option<String>,
    /// Highest level the user may submit at; the highest level if unset.
    pub user_max_level: Option<String>,
    pub hide_disabled_components: bool,
    pub radio_max: Option<usize>,
    /// Reload model files only when their modification time changes.
    pub cache_model: bool,
    /// Where rendered markup is cached between runs.
    pub cache_file: Option<PathBuf>,
}

impl FormConfig {
    pub fn preset(preset: Preset) -> Self {
        let base = Self {
            preset,
            model_file: PathBuf::from("./model/model.json"),
            accesslevel_file: PathBuf::from("./model/accesslevels.json"),
            default_level: None,
            user_max_level: None,
            hide_disabled_components: true,
            radio_max: Some(DEFAULT_RADIO_MAX),
            cache_model: false,
            cache_file: None,
        };
        match preset {
            Preset::Local => base,
            Preset::Server => Self {
                cache_model: true,
                cache_file: Some(PathBuf::from("./cache/form.json")),
                ..base
            },
        }
    }

    pub fn local() -> Self {
        Self::preset(Preset::Local)
    }

    pub fn server() -> Self {
        Self::preset(Preset::Server)
    }

    /// Load the preset and apply the overrides from a TOML file.
    ///
    /// Relative paths in the file are resolved against the file's directory.
    pub fn from_toml_file(preset: Preset, path: &Path) -> Result<Self, LoaderError> {
        let text = std::fs::read_to_string(path).map_err(|e| LoaderError::io(path, e))?;
        let overrides: ConfigOverrides =
            toml::from_str(&text).map_err(|source| LoaderError::Toml {
                path: path.to_path_buf(),
                source,
            })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let preset = overrides.preset.unwrap_or(preset);
        let config = overrides.apply(Self::preset(preset), base_dir);
        debug!(path = %path.display(), preset = %config.preset, "loaded configuration file");
        Ok(config)
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self::local()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverrides {
    preset: Option<Preset>,
    model_file: Option<PathBuf>,
    accesslevel_file: Option<PathBuf>,
    default_level: Option<String>,
    user_max_level: Option<String>,
    hide_disabled_components: Option<bool>,
    radio_max: Option<usize>,
    cache_model: Option<bool>,
    cache_file: Option<PathBuf>,
}

impl ConfigOverrides {
    fn apply(self, mut config: FormConfig, base_dir: &Path) -> FormConfig {
        let resolve = |path: PathBuf| {
            if path.is_relative() {
                base_dir.join(path)
            } else {
                path
            }
        };
        if let Some(path) = self.model_file {
            config.model_file = resolve(path);
        }
        if let Some(path) = self.accesslevel_file {
            config.accesslevel_file = resolve(path);
        }
        if let Some(level) = self.default_level {
            config.default_level = Some(level);
        }
        if let Some(level) = self.user_max_level {
            config.user_max_level = Some(level);
        }
        if let Some(hide) = self.hide_disabled_components {
            config.hide_disabled_components = hide;
        }
        if let Some(radio_max) = self.radio_max {
            config.radio_max = (radio_max > 0).then_some(radio_max);
        }
        if let Some(cache) = self.cache_model {
            config.cache_model = cache;
        }
        if let Some(path) = self.cache_file {
            config.cache_file = Some(resolve(path));
        }
        config
    }
}
