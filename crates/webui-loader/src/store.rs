//! Reload-on-change holder for the form model.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::FormConfig;
use crate::error::LoaderError;
use crate::model::{FileStamp, FormModel};

/// Keeps the last loaded [`FormModel`] and reloads it when either file's
/// modification time moves forward. With caching disabled every call
/// reloads.
///
/// Long-lived hosts keep one store and call [`get`](Self::get) per request.
/// One-shot callers such as the CLI use [`into_model`](Self::into_model).
#[derive(Debug)]
pub struct ModelStore {
    model_file: PathBuf,
    accesslevel_file: PathBuf,
    cache: bool,
    current: Option<FormModel>,
    loads: usize,
}

impl ModelStore {
    pub fn new(config: &FormConfig) -> Self {
        Self {
            model_file: config.model_file.clone(),
            accesslevel_file: config.accesslevel_file.clone(),
            cache: config.cache_model,
            current: None,
            loads: 0,
        }
    }

    /// Number of times the files were actually read.
    pub fn loads(&self) -> usize {
        self.loads
    }

    pub fn get(&mut self) -> Result<&FormModel, LoaderError> {
        let model = match self.current.take() {
            Some(model) if self.cache && !self.changed_since(&model)? => model,
            _ => self.reload()?,
        };
        Ok(self.current.insert(model))
    }

    /// Current model by value, reloading under the same rules as [`get`](Self::get).
    pub fn into_model(mut self) -> Result<FormModel, LoaderError> {
        match self.current.take() {
            Some(model) if self.cache && !self.changed_since(&model)? => Ok(model),
            _ => self.reload(),
        }
    }

    fn reload(&mut self) -> Result<FormModel, LoaderError> {
        let model = FormModel::from_files(&self.model_file, &self.accesslevel_file)?;
        self.loads += 1;
        info!(tag = %model.version_tag(), loads = self.loads, "form model loaded");
        Ok(model)
    }

    fn changed_since(&self, current: &FormModel) -> Result<bool, LoaderError> {
        let model = FileStamp::read(&self.model_file)?;
        let levels = FileStamp::read(&self.accesslevel_file)?;
        let changed = model.modified > current.model_stamp.modified
            || levels.modified > current.levels_stamp.modified;
        if changed {
            debug!(model = %self.model_file.display(), "model files changed on disk");
        }
        Ok(changed)
    }
}
