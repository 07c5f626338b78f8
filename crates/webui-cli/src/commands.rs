use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use webui_loader::{
    FormConfig, FormModel, ModelStore, Preset, SubmissionOutcome, check_submission,
};
use webui_model::Level;
use webui_render::{
    FieldSpec, FileCache, FormSession, RenderError, RenderOptions, Renderer, Transition, count,
    render_cached,
};

/// Where the configuration comes from, after command line overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    pub preset: Preset,
    pub config_file: Option<PathBuf>,
    pub model: Option<PathBuf>,
    pub levels: Option<PathBuf>,
}

impl ConfigSource {
    pub fn resolve(&self) -> Result<FormConfig> {
        let mut config = match &self.config_file {
            Some(path) => FormConfig::from_toml_file(self.preset, path)
                .with_context(|| format!("load config {}", path.display()))?,
            None => FormConfig::preset(self.preset),
        };
        if let Some(path) = &self.model {
            config.model_file = path.clone();
        }
        if let Some(path) = &self.levels {
            config.accesslevel_file = path.clone();
        }
        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub level: Option<String>,
    pub no_cache: bool,
}

#[derive(Debug, Clone)]
pub struct RenderResult {
    pub html: String,
    pub version_tag: String,
    pub level: Option<String>,
    pub cache_hit: bool,
    /// Submission would be refused at the applied level.
    pub too_high: bool,
    pub notices: Vec<RenderError>,
    pub warnings: Vec<String>,
}

pub fn load_model(config: &FormConfig) -> Result<FormModel> {
    ModelStore::new(config).into_model().with_context(|| {
        format!(
            "load model {} with levels {}",
            config.model_file.display(),
            config.accesslevel_file.display()
        )
    })
}

fn renderer_for(config: &FormConfig) -> Renderer {
    Renderer::new(RenderOptions {
        radio_max: config.radio_max,
    })
}

pub fn run_render(config: &FormConfig, request: &RenderRequest) -> Result<RenderResult> {
    let model = load_model(config)?;
    let version_tag = model.version_tag();
    let span = info_span!("render", tag = %version_tag);
    let _guard = span.enter();
    let renderer = renderer_for(config);

    let Some(level_name) = request.level.as_deref() else {
        return render_neutral(config, &model, &renderer, request.no_cache);
    };

    let mut output = renderer.render(&model.forest);
    let (initial, user_max) = model
        .configured_levels(config)
        .context("resolve configured levels")?;
    let mut session = FormSession::new(model.forest.clone(), model.catalog.clone(), &output.fields)
        .with_user_max(user_max)
        .with_initial_level(initial);
    let transition = session
        .set_level_by_name(level_name, true, &mut |_: &str| true)
        .with_context(|| format!("select level {level_name}"))?;
    let too_high = matches!(transition, Transition::Applied { too_high: true, .. });
    session.apply_to_markup(&mut output.fragments, config.hide_disabled_components);
    let html = output.to_html().context("serialize markup")?;

    Ok(RenderResult {
        html,
        version_tag,
        level: Some(level_name.to_string()),
        cache_hit: false,
        too_high,
        notices: output.notices,
        warnings: model.warnings,
    })
}

fn render_neutral(
    config: &FormConfig,
    model: &FormModel,
    renderer: &Renderer,
    no_cache: bool,
) -> Result<RenderResult> {
    let version_tag = model.version_tag();
    let (html, cache_hit, notices) = match config.cache_file.as_deref() {
        Some(path) if !no_cache => {
            let mut cache = FileCache::new(path);
            let rendered = render_cached(renderer, &model.forest, &version_tag, &mut cache)
                .with_context(|| format!("markup cache {}", path.display()))?;
            (rendered.html, rendered.hit, rendered.notices)
        }
        _ => {
            let output = renderer.render(&model.forest);
            let html = output.to_html().context("serialize markup")?;
            (html, false, output.notices)
        }
    };
    Ok(RenderResult {
        html,
        version_tag,
        level: None,
        cache_hit,
        too_high: false,
        notices,
        warnings: model.warnings.clone(),
    })
}

pub fn write_html(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    std::fs::write(path, html).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), bytes = html.len(), "wrote form markup");
    Ok(())
}

pub fn run_count(config: &FormConfig) -> Result<usize> {
    let model = load_model(config)?;
    Ok(count(&model.forest))
}

pub fn run_fields(config: &FormConfig) -> Result<Vec<FieldSpec>> {
    let model = load_model(config)?;
    let output = renderer_for(config).render(&model.forest);
    for notice in &output.notices {
        warn!(%notice, "component skipped");
    }
    Ok(output.fields)
}

/// One row of the `levels` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRow {
    pub level: Level,
    pub name: String,
    pub label: String,
    pub is_default: bool,
    pub is_max: bool,
}

pub fn run_levels(config: &FormConfig) -> Result<Vec<LevelRow>> {
    let model = load_model(config)?;
    let (initial, user_max) = model
        .configured_levels(config)
        .context("resolve configured levels")?;
    Ok(model
        .catalog
        .iter()
        .map(|(level, entry)| LevelRow {
            level,
            name: entry.name.to_string(),
            label: entry.display_label().to_string(),
            is_default: level == initial,
            is_max: level == user_max,
        })
        .collect())
}

pub fn run_check_submission(config: &FormConfig, file: &Path) -> Result<SubmissionOutcome> {
    let model = load_model(config)?;
    let (_, user_max) = model
        .configured_levels(config)
        .context("resolve configured levels")?;
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("read submission {}", file.display()))?;
    Ok(check_submission(&json, &model, user_max))
}
