use std::{fs, path::Path};

use client_core::{view::DEFAULT_DATE_PATTERN, DEFAULT_ITEMS_PER_PAGE};
use serde::Deserialize;
use shared::domain::PaginationMode;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub items_per_page: u32,
    pub pagination_mode: PaginationMode,
    pub date_format: String,
    pub request_timeout_secs: u64,
    pub assume_yes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".into(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            pagination_mode: PaginationMode::Server,
            date_format: DEFAULT_DATE_PATTERN.into(),
            request_timeout_secs: 30,
            assume_yes: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    api_url: Option<String>,
    items_per_page: Option<u32>,
    pagination_mode: Option<PaginationMode>,
    date_format: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then `path` if it exists, then the process environment.
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();
    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!("config: ignoring unreadable settings file: {err}");
            return;
        }
    };
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.items_per_page.filter(|v| *v > 0) {
        settings.items_per_page = v;
    }
    if let Some(v) = file_cfg.pagination_mode {
        settings.pagination_mode = v;
    }
    if let Some(v) = file_cfg.date_format {
        settings.date_format = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs.filter(|v| *v > 0) {
        settings.request_timeout_secs = v;
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("EXPENSES_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = lookup("APP__ITEMS_PER_PAGE") {
        match v.parse::<u32>() {
            Ok(parsed) if parsed > 0 => settings.items_per_page = parsed,
            _ => warn!("config: ignoring APP__ITEMS_PER_PAGE={v:?}"),
        }
    }

    if let Some(v) = lookup("APP__PAGINATION_MODE") {
        match PaginationMode::parse(&v) {
            Some(mode) => settings.pagination_mode = mode,
            None => warn!("config: ignoring APP__PAGINATION_MODE={v:?}"),
        }
    }

    if let Some(v) = lookup("APP__DATE_FORMAT") {
        settings.date_format = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.request_timeout_secs = parsed,
            _ => warn!("config: ignoring APP__REQUEST_TIMEOUT_SECS={v:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn file_values_override_defaults() {
        let mut settings = Settings::default();
        apply_file(
            &mut settings,
            r#"
api_url = "http://expenses.internal:8080"
items_per_page = 10
pagination_mode = "client"
date_format = "%Y-%m-%d"
"#,
        );
        assert_eq!(settings.api_url, "http://expenses.internal:8080");
        assert_eq!(settings.items_per_page, 10);
        assert_eq!(settings.pagination_mode, PaginationMode::Client);
        assert_eq!(settings.date_format, "%Y-%m-%d");
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn malformed_file_leaves_defaults() {
        let mut settings = Settings::default();
        apply_file(&mut settings, "items_per_page = \"lots\"");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn zero_page_size_in_file_is_ignored() {
        let mut settings = Settings::default();
        apply_file(&mut settings, "items_per_page = 0");
        assert_eq!(settings.items_per_page, DEFAULT_ITEMS_PER_PAGE);
    }

    #[test]
    fn app_prefixed_env_wins_over_plain_env() {
        let mut settings = Settings::default();
        apply_env(
            &mut settings,
            env_of(&[
                ("EXPENSES_API_URL", "http://plain:1"),
                ("APP__API_URL", "http://prefixed:2"),
                ("APP__PAGINATION_MODE", "CLIENT"),
            ]),
        );
        assert_eq!(settings.api_url, "http://prefixed:2");
        assert_eq!(settings.pagination_mode, PaginationMode::Client);
    }

    #[test]
    fn invalid_numeric_env_values_are_ignored() {
        let mut settings = Settings::default();
        apply_env(
            &mut settings,
            env_of(&[
                ("APP__ITEMS_PER_PAGE", "zero"),
                ("APP__REQUEST_TIMEOUT_SECS", "0"),
            ]),
        );
        assert_eq!(settings.items_per_page, DEFAULT_ITEMS_PER_PAGE);
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = load_settings(Path::new("definitely/not/here/expenses.toml"));
        assert!(settings.items_per_page > 0);
    }
}
