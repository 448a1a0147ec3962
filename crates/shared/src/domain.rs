use serde::{Deserialize, Serialize};

/// Lifecycle of a single loader widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    LoadError,
}

impl LoadState {
    pub const ALL: [LoadState; 4] = [
        LoadState::NotLoaded,
        LoadState::Loading,
        LoadState::Loaded,
        LoadState::LoadError,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LoadState::NotLoaded => "not_loaded",
            LoadState::Loading => "loading",
            LoadState::Loaded => "loaded",
            LoadState::LoadError => "load_error",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves a boolean option from a marker attribute.
///
/// A missing attribute (or no attribute name at all) yields `default`. A bare
/// marker (`data-x`, `data-x=""`, `data-x="data-x"`) or one of `true`, `1`,
/// `yes`, `on` is `true`; `false`, `0`, `no`, `off` is `false`. Any other
/// value falls back to `default`.
pub fn parse_binary_attr(attr_name: Option<&str>, value: Option<&str>, default: bool) -> bool {
    let (Some(name), Some(value)) = (attr_name, value) else {
        return default;
    };

    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(name) {
        return true;
    }

    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_state_serializes_as_snake_case() {
        let json = serde_json::to_string(&LoadState::LoadError).expect("serialize");
        assert_eq!(json, "\"load_error\"");
        let back: LoadState = serde_json::from_str("\"not_loaded\"").expect("deserialize");
        assert_eq!(back, LoadState::NotLoaded);
    }

    #[test]
    fn missing_attribute_uses_default() {
        assert!(!parse_binary_attr(Some("data-plain"), None, false));
        assert!(parse_binary_attr(Some("data-plain"), None, true));
        assert!(parse_binary_attr(None, Some("true"), true));
    }

    #[test]
    fn bare_marker_is_true() {
        assert!(parse_binary_attr(Some("data-plain"), Some(""), false));
        assert!(parse_binary_attr(Some("data-plain"), Some("data-plain"), false));
    }

    #[test]
    fn explicit_values_override_default() {
        assert!(parse_binary_attr(Some("data-plain"), Some("Yes"), false));
        assert!(!parse_binary_attr(Some("data-plain"), Some("off"), true));
        assert!(parse_binary_attr(Some("data-plain"), Some("garbage"), true));
    }
}
