use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

use super::*;

#[test]
fn defaults_match_widget_conventions() {
    let settings = LoaderSettings::default();
    assert_eq!(settings.url_attr, "data-load");
    assert_eq!(settings.plain_text_attr, "data-load-plain-text");
    assert_eq!(settings.instant_load_timeout_ms, 300);
    assert_eq!(settings.request_timeout_ms, 20_000);
    assert_eq!(settings.load_state_changed_event, "load-state-changed");
    assert!(!settings.plain_text);
}

#[test]
fn partial_file_keeps_remaining_defaults() {
    let settings = parse_settings(
        r#"
        instant_load_timeout_ms = 0
        content_selector = ""
        plain_text = true
        "#,
    )
    .expect("parse");
    assert_eq!(settings.instant_load_timeout_ms, 0);
    assert_eq!(settings.content_selector, "");
    assert!(settings.plain_text);
    assert_eq!(settings.error_selector, ".js-load__error");
}

#[test]
fn rejects_mistyped_values() {
    assert!(parse_settings("request_timeout_ms = \"soon\"").is_err());
}

#[test]
fn env_overrides_win_and_bad_numbers_are_ignored() {
    let vars = HashMap::from([
        ("LOADER__URL_ATTR".to_string(), "data-src".to_string()),
        ("LOADER__REQUEST_TIMEOUT_MS".to_string(), "1500".to_string()),
        ("LOADER__INSTANT_LOAD_TIMEOUT_MS".to_string(), "later".to_string()),
        ("LOADER__PLAIN_TEXT".to_string(), "yes".to_string()),
    ]);
    let mut settings = LoaderSettings::default();
    apply_env_overrides(&mut settings, |key| vars.get(key).cloned());

    assert_eq!(settings.url_attr, "data-src");
    assert_eq!(settings.request_timeout_ms, 1500);
    assert_eq!(settings.instant_load_timeout_ms, 300);
    assert!(settings.plain_text);
}

#[test]
fn explicit_settings_file_is_read() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("loader_settings_test_{suffix}.toml"));
    fs::write(&path, "loaded_class = \"is-ready\"\n").expect("write settings");

    let settings = load_settings(Some(&path)).expect("load settings");
    assert_eq!(settings.loaded_class, "is-ready");

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn missing_explicit_settings_file_is_an_error() {
    let err = load_settings(Some(Path::new("/nonexistent/loader.toml"))).expect_err("missing");
    assert!(err.to_string().contains("failed to read settings file"));
}

#[test]
fn absent_default_settings_file_falls_back_to_defaults() {
    let settings =
        read_optional_settings(Path::new("/nonexistent/loader.toml")).expect("defaults");
    assert_eq!(settings, LoaderSettings::default());
}

#[test]
fn unreadable_default_settings_file_is_an_error() {
    let err = read_optional_settings(&env::temp_dir()).expect_err("directory");
    assert!(err.to_string().contains("failed to read settings file"));
}
