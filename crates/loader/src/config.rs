use std::{fs, io, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_SETTINGS_FILE: &str = "loader.toml";
const ENV_PREFIX: &str = "LOADER__";

/// Plain-value loader options as they appear in a settings file.
///
/// An empty string switches an optional option (class, selector, event)
/// off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    pub request_timeout_ms: u64,
    pub instant_load_timeout_ms: u64,
    pub not_loaded_class: String,
    pub loading_class: String,
    pub loaded_class: String,
    pub load_error_class: String,
    pub error_selector: String,
    pub content_selector: String,
    pub root_selector: String,
    pub load_state_changed_event: String,
    pub url_attr: String,
    pub plain_text_attr: String,
    pub plain_text: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: 20_000,
            instant_load_timeout_ms: 300,
            not_loaded_class: "js-load--not-loaded".into(),
            loading_class: "js-load--loading".into(),
            loaded_class: "js-load--loaded".into(),
            load_error_class: "js-load--error".into(),
            error_selector: ".js-load__error".into(),
            content_selector: ".js-load__content".into(),
            root_selector: ".js-load".into(),
            load_state_changed_event: "load-state-changed".into(),
            url_attr: "data-load".into(),
            plain_text_attr: "data-load-plain-text".into(),
            plain_text: false,
        }
    }
}

/// Defaults, then the settings file, then `LOADER__*` environment variables.
///
/// With no explicit path a missing `loader.toml` in the working directory is
/// not an error; an explicit path must exist and parse.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<LoaderSettings> {
    let mut settings = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
            parse_settings(&raw)
                .with_context(|| format!("invalid settings file '{}'", path.display()))?
        }
        None => read_optional_settings(Path::new(DEFAULT_SETTINGS_FILE))?,
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

/// Defaults when `path` does not exist; any other read failure is an error.
fn read_optional_settings(path: &Path) -> anyhow::Result<LoaderSettings> {
    match fs::read_to_string(path) {
        Ok(raw) => parse_settings(&raw)
            .with_context(|| format!("invalid settings file '{}'", path.display())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(LoaderSettings::default()),
        Err(err) => Err(err)
            .with_context(|| format!("failed to read settings file '{}'", path.display())),
    }
}

pub fn parse_settings(raw: &str) -> anyhow::Result<LoaderSettings> {
    Ok(toml::from_str(raw)?)
}

/// Applies `LOADER__<FIELD>` overrides read through `lookup`.
pub fn apply_env_overrides(
    settings: &mut LoaderSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let var = |field: &str| lookup(&format!("{ENV_PREFIX}{}", field.to_ascii_uppercase()));

    for (field, target) in [
        ("not_loaded_class", &mut settings.not_loaded_class),
        ("loading_class", &mut settings.loading_class),
        ("loaded_class", &mut settings.loaded_class),
        ("load_error_class", &mut settings.load_error_class),
        ("error_selector", &mut settings.error_selector),
        ("content_selector", &mut settings.content_selector),
        ("root_selector", &mut settings.root_selector),
        ("load_state_changed_event", &mut settings.load_state_changed_event),
        ("url_attr", &mut settings.url_attr),
        ("plain_text_attr", &mut settings.plain_text_attr),
    ] {
        if let Some(v) = var(field) {
            *target = v;
        }
    }

    for (field, target) in [
        ("request_timeout_ms", &mut settings.request_timeout_ms),
        ("instant_load_timeout_ms", &mut settings.instant_load_timeout_ms),
    ] {
        if let Some(v) = var(field) {
            match v.trim().parse::<u64>() {
                Ok(parsed) => *target = parsed,
                Err(err) => warn!(field, value = %v, error = %err, "loader: ignoring invalid override"),
            }
        }
    }

    if let Some(v) = var("plain_text") {
        settings.plain_text =
            shared::domain::parse_binary_attr(Some("plain_text"), Some(&v), settings.plain_text);
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
