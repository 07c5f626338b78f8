//! Rendered markup cache keyed by the model version tag.
//!
//! The cache is a single slot: it remembers the markup of the last render
//! and the version tag it was produced for. A different tag invalidates it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::Digest;
use tracing::{debug, info, warn};

use webui_model::Component;

use crate::error::{CacheError, RenderError};
use crate::render::Renderer;

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedMarkup {
    pub tag: String,
    pub sha256: String,
    pub html: String,
}

impl CachedMarkup {
    pub fn new(tag: impl Into<String>, html: impl Into<String>) -> Self {
        let html = html.into();
        Self {
            tag: tag.into(),
            sha256: sha256_hex(html.as_bytes()),
            html,
        }
    }

    /// Whether the stored digest still matches the markup.
    pub fn is_intact(&self) -> bool {
        sha256_hex(self.html.as_bytes()) == self.sha256
    }
}

pub trait MarkupCache {
    fn load(&self) -> Result<Option<CachedMarkup>, CacheError>;
    fn store(&mut self, entry: CachedMarkup) -> Result<(), CacheError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entry: Option<CachedMarkup>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarkupCache for MemoryCache {
    fn load(&self) -> Result<Option<CachedMarkup>, CacheError> {
        Ok(self.entry.clone())
    }

    fn store(&mut self, entry: CachedMarkup) -> Result<(), CacheError> {
        self.entry = Some(entry);
        Ok(())
    }
}

/// Cache slot persisted as a JSON file.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MarkupCache for FileCache {
    fn load(&self) -> Result<Option<CachedMarkup>, CacheError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(&self.path, e)),
        };
        let entry: CachedMarkup = match serde_json::from_str(&contents) {
            Ok(entry) => entry,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "ignoring unreadable markup cache");
                return Ok(None);
            }
        };
        if !entry.is_intact() {
            warn!(path = %self.path.display(), "ignoring markup cache with a bad digest");
            return Ok(None);
        }
        Ok(Some(entry))
    }

    fn store(&mut self, entry: CachedMarkup) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::io(parent, e))?;
        }
        let json = serde_json::to_string(&entry).map_err(|source| CacheError::Json {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(|e| CacheError::io(&self.path, e))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedRender {
    pub html: String,
    /// True when the markup came from the cache.
    pub hit: bool,
    /// Notices from a fresh render; empty on a hit.
    pub notices: Vec<RenderError>,
}

/// Return cached markup when its tag matches, otherwise render and replace
/// the cache slot.
pub fn render_cached(
    renderer: &Renderer,
    forest: &[Component],
    tag: &str,
    cache: &mut impl MarkupCache,
) -> Result<CachedRender, CacheError> {
    if let Some(entry) = cache.load()? {
        if entry.tag == tag {
            info!(tag, "markup cache hit");
            return Ok(CachedRender {
                html: entry.html,
                hit: true,
                notices: Vec::new(),
            });
        }
        debug!(cached = %entry.tag, tag, "markup cache is stale");
    }

    let output = renderer.render(forest);
    let html = output.to_html()?;
    cache.store(CachedMarkup::new(tag, html.clone()))?;
    Ok(CachedRender {
        html,
        hit: false,
        notices: output.notices,
    })
}
