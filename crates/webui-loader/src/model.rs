//! Loading of the form model and its access level catalog.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use webui_model::{Component, Level, LevelCatalog, parse_forest, walk};

use crate::config::FormConfig;
use crate::error::LoaderError;

/// A file together with the modification time it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStamp {
    pub path: PathBuf,
    pub modified: SystemTime,
}

impl FileStamp {
    pub fn read(path: &Path) -> Result<Self, LoaderError> {
        let modified = std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|e| LoaderError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            modified,
        })
    }

    /// Whole seconds since the epoch, truncated.
    pub fn secs(&self) -> u64 {
        self.modified
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct FormModel {
    pub forest: Vec<Component>,
    pub catalog: LevelCatalog,
    pub model_stamp: FileStamp,
    pub levels_stamp: FileStamp,
    /// Problems that do not prevent rendering, such as unknown level names.
    pub warnings: Vec<String>,
}

impl FormModel {
    pub fn load(config: &FormConfig) -> Result<Self, LoaderError> {
        Self::from_files(&config.model_file, &config.accesslevel_file)
    }

    pub fn from_files(model_file: &Path, accesslevel_file: &Path) -> Result<Self, LoaderError> {
        let levels_stamp = FileStamp::read(accesslevel_file)?;
        let catalog = read_catalog(accesslevel_file)?;
        let model_stamp = FileStamp::read(model_file)?;
        let text = std::fs::read_to_string(model_file).map_err(|e| LoaderError::io(model_file, e))?;
        let forest = parse_forest(&text).map_err(|e| LoaderError::model(model_file, e))?;

        let warnings = unknown_level_warnings(&forest, &catalog);
        for warning in &warnings {
            warn!(path = %model_file.display(), "{warning}");
        }
        debug!(
            model = %model_file.display(),
            levels = catalog.len(),
            components = forest.len(),
            "loaded form model"
        );
        Ok(Self {
            forest,
            catalog,
            model_stamp,
            levels_stamp,
            warnings,
        })
    }

    /// Identifies the pair of files this model was read from, as
    /// `v<levels mtime>-<model mtime>`.
    pub fn version_tag(&self) -> String {
        format!("v{}-{}", self.levels_stamp.secs(), self.model_stamp.secs())
    }

    /// Resolve a configured level name. `None` yields `fallback`.
    pub fn resolve_level(
        &self,
        setting: &'static str,
        name: Option<&str>,
        fallback: Level,
    ) -> Result<Level, LoaderError> {
        match name {
            None => Ok(fallback),
            Some(name) => self
                .catalog
                .find(name)
                .ok_or_else(|| LoaderError::UnknownLevel {
                    setting,
                    name: name.to_string(),
                }),
        }
    }

    /// Initial and maximum level named by the configuration.
    pub fn configured_levels(&self, config: &FormConfig) -> Result<(Level, Level), LoaderError> {
        let initial = self.resolve_level(
            "default_level",
            config.default_level.as_deref(),
            self.catalog.lowest(),
        )?;
        let max = self.resolve_level(
            "user_max_level",
            config.user_max_level.as_deref(),
            self.catalog.highest(),
        )?;
        Ok((initial, max))
    }
}

fn read_catalog(path: &Path) -> Result<LevelCatalog, LoaderError> {
    let text = std::fs::read_to_string(path).map_err(|e| LoaderError::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| LoaderError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn unknown_level_warnings(forest: &[Component], catalog: &LevelCatalog) -> Vec<String> {
    let mut warnings = Vec::new();
    for (path, component) in walk(forest) {
        let Some(levels) = component.access_levels() else {
            continue;
        };
        for name in levels.iter() {
            if catalog.find(name.as_str()).is_none() {
                warnings.push(format!(
                    "component {path} references unknown access level {name}"
                ));
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_levels_are_reported_with_their_path() {
        let forest = parse_forest(
            r#"[{"type": "section", "label": "S", "children": [
                {"type": "parameter", "name": "x", "datatype": "string", "accesslevels": ["wizard"]}
            ]}]"#,
        )
        .unwrap();
        let catalog = LevelCatalog::from_names(["easy", "expert"]).unwrap();
        assert_eq!(
            unknown_level_warnings(&forest, &catalog),
            vec!["component 0.0 references unknown access level wizard".to_string()]
        );
    }

    #[test]
    fn stamp_seconds_truncate() {
        let stamp = FileStamp {
            path: PathBuf::from("model.json"),
            modified: UNIX_EPOCH + std::time::Duration::from_millis(1_500),
        };
        assert_eq!(stamp.secs(), 1);
    }
}
