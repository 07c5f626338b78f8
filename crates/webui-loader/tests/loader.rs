//! Tests for model loading, configuration and submission checks.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use webui_loader::{
    FormConfig, FormModel, LoaderError, ModelStore, Preset, Rejection, check_submission,
    validate_submission,
};

fn unique_temp_dir(name: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "webui-loader-{}-{}-{}",
        name,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

const LEVELS: &str = r#"[{"name": "easy", "label": "Easy"}, {"name": "expert"}, {"name": "guru"}]"#;

const MODEL: &str = r#"{"components": [
    {"type": "section", "label": "Sampling", "accesslevels": ["expert", "wizard"], "children": [
        {"type": "parameter", "name": "structures", "datatype": "integer", "default": 1000}
    ]}
]}"#;

fn set_mtime(path: &Path, secs: u64) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

fn write_model(dir: &Path) -> FormConfig {
    let model_file = dir.join("model.json");
    let accesslevel_file = dir.join("accesslevels.json");
    std::fs::write(&model_file, MODEL).unwrap();
    std::fs::write(&accesslevel_file, LEVELS).unwrap();
    set_mtime(&accesslevel_file, 1_700_000_000);
    set_mtime(&model_file, 1_700_000_500);
    FormConfig {
        model_file,
        accesslevel_file,
        cache_model: true,
        ..FormConfig::local()
    }
}

#[test]
fn load_reads_both_files_and_tags_the_version() {
    let dir = unique_temp_dir("load");
    let config = write_model(&dir);

    let model = FormModel::load(&config).unwrap();
    assert_eq!(model.forest.len(), 1);
    assert_eq!(model.catalog.len(), 3);
    assert_eq!(model.version_tag(), "v1700000000-1700000500");
    assert_eq!(
        model.warnings,
        vec!["component 0 references unknown access level wizard".to_string()]
    );

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn missing_model_file_is_an_io_error() {
    let dir = unique_temp_dir("missing");
    let config = FormConfig {
        model_file: dir.join("absent.json"),
        accesslevel_file: dir.join("absent-levels.json"),
        ..FormConfig::local()
    };
    assert!(matches!(
        FormModel::load(&config),
        Err(LoaderError::Io { .. })
    ));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn configured_levels_resolve_by_name() {
    let dir = unique_temp_dir("levels");
    let mut config = write_model(&dir);
    let model = FormModel::load(&config).unwrap();

    let (initial, max) = model.configured_levels(&config).unwrap();
    assert_eq!(initial, model.catalog.lowest());
    assert_eq!(max, model.catalog.highest());

    config.default_level = Some("expert".to_string());
    config.user_max_level = Some("admin".to_string());
    assert!(matches!(
        model.configured_levels(&config),
        Err(LoaderError::UnknownLevel { setting: "user_max_level", name }) if name == "admin"
    ));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn store_reloads_only_when_files_change() {
    let dir = unique_temp_dir("store");
    let config = write_model(&dir);
    let mut store = ModelStore::new(&config);

    let first = store.get().unwrap().version_tag();
    store.get().unwrap();
    assert_eq!(store.loads(), 1);

    set_mtime(&config.model_file, 1_700_000_900);
    let second = store.get().unwrap().version_tag();
    assert_eq!(store.loads(), 2);
    assert_ne!(first, second);
    assert_eq!(second, "v1700000000-1700000900");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn store_hands_out_cached_model_by_value() {
    let dir = unique_temp_dir("into-model");
    let config = write_model(&dir);
    let mut store = ModelStore::new(&config);
    store.get().unwrap();

    let model = store.into_model().unwrap();
    assert_eq!(model.version_tag(), "v1700000000-1700000500");

    let fresh = ModelStore::new(&config).into_model().unwrap();
    assert_eq!(fresh.forest, model.forest);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn store_without_caching_always_reloads() {
    let dir = unique_temp_dir("nocache");
    let config = FormConfig {
        cache_model: false,
        ..write_model(&dir)
    };
    let mut store = ModelStore::new(&config);
    store.get().unwrap();
    store.get().unwrap();
    assert_eq!(store.loads(), 2);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn toml_file_overrides_preset() {
    let dir = unique_temp_dir("toml");
    let path = dir.join("webui.toml");
    std::fs::write(
        &path,
        r#"
preset = "server"
model_file = "forms/model.json"
default_level = "expert"
radio_max = 5
hide_disabled_components = false
"#,
    )
    .unwrap();

    let config = FormConfig::from_toml_file(Preset::Local, &path).unwrap();
    assert_eq!(config.preset, Preset::Server);
    assert!(config.cache_model);
    assert_eq!(config.model_file, dir.join("forms/model.json"));
    assert_eq!(config.default_level.as_deref(), Some("expert"));
    assert_eq!(config.radio_max, Some(5));
    assert!(!config.hide_disabled_components);
    assert_eq!(config.accesslevel_file, FormConfig::server().accesslevel_file);

    std::fs::write(&path, "port = 80\n").unwrap();
    assert!(matches!(
        FormConfig::from_toml_file(Preset::Local, &path),
        Err(LoaderError::Toml { .. })
    ));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn submission_checks_version_and_level() {
    let dir = unique_temp_dir("submission");
    let config = write_model(&dir);
    let model = FormModel::load(&config).unwrap();
    let easy = model.catalog.find("easy").unwrap();
    let guru = model.catalog.find("guru").unwrap();
    let tag = model.version_tag();

    let post = format!(r#"{{"form_version": "{tag}", "level": "expert", "structures": 12}}"#);
    let accepted = validate_submission(&post, &model, guru).unwrap();
    assert_eq!(accepted.level, model.catalog.find("expert").unwrap());
    assert_eq!(accepted.values.len(), 1);

    assert_eq!(
        validate_submission(&post, &model, easy),
        Err(Rejection::LevelTooHigh)
    );
    assert_eq!(
        validate_submission(r#"{"form_version": "v0-0", "level": "easy"}"#, &model, guru),
        Err(Rejection::ModelChanged)
    );
    assert_eq!(
        validate_submission(&format!(r#"{{"form_version": "{tag}", "level": "admin"}}"#), &model, guru),
        Err(Rejection::LevelTooHigh)
    );
    assert_eq!(
        validate_submission(r#"{"level": "easy"}"#, &model, guru),
        Err(Rejection::Incomplete)
    );
    assert_eq!(
        validate_submission("{not json", &model, guru),
        Err(Rejection::InvalidJson)
    );

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn rejected_outcome_serializes_like_the_form_expects() {
    let dir = unique_temp_dir("outcome");
    let config = write_model(&dir);
    let model = FormModel::load(&config).unwrap();
    let outcome = check_submission(
        r#"{"form_version": "v1-1", "level": "easy"}"#,
        &model,
        model.catalog.highest(),
    );

    insta::assert_json_snapshot!(outcome, @r#"
    {
      "success": false,
      "message": "The data model has changed since you loaded this form, please reload and try again."
    }
    "#);

    let _ = std::fs::remove_dir_all(dir);
}
