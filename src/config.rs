use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::filter::{FilterType, SortKey};

const DEFAULT_INGEST_DELAY_MS: u64 = 800;
const DEFAULT_AUTO_PREVIEW_DELAY_MS: u64 = 500;
const DEFAULT_AUTOPLAY_INTERVAL_MS: u64 = 5000;
const DEFAULT_TRANSITION_MS: u64 = 700;

#[derive(Debug, Default, Serialize, Deserialize)]
/// Persisted UI/application settings for the showcase.
pub struct AppConfig {
    pub window_width: Option<f32>,
    pub window_height: Option<f32>,
    pub theme: Option<String>,
    pub default_filter: Option<String>,
    pub default_sort: Option<String>,
    pub ingest_delay_ms: Option<u64>,
    pub auto_preview_delay_ms: Option<u64>,
    pub autoplay_interval_ms: Option<u64>,
    pub transition_ms: Option<u64>,
    pub last_upload_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Returns the user config file path, if a config directory is available.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("product-showcase").join("config.toml"))
    }

    /// Loads config from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Self {
        match toml::from_str(contents) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(%err, "ignoring malformed config");
                Self::default()
            }
        }
    }

    /// Writes config to disk, ignoring filesystem/serialization errors.
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(s) = toml::to_string_pretty(self) {
            let _ = std::fs::write(&path, s);
        }
    }

    pub fn filter(&self) -> FilterType {
        self.default_filter
            .as_deref()
            .and_then(FilterType::parse)
            .unwrap_or_default()
    }

    pub fn sort(&self) -> SortKey {
        self.default_sort
            .as_deref()
            .and_then(SortKey::parse)
            .unwrap_or_default()
    }

    pub fn timings(&self) -> Timings {
        let ms = |value: Option<u64>, default: u64| Duration::from_millis(value.unwrap_or(default));
        Timings {
            ingest_delay: ms(self.ingest_delay_ms, DEFAULT_INGEST_DELAY_MS),
            auto_preview_delay: ms(self.auto_preview_delay_ms, DEFAULT_AUTO_PREVIEW_DELAY_MS),
            autoplay_interval: ms(self.autoplay_interval_ms, DEFAULT_AUTOPLAY_INTERVAL_MS),
            transition: ms(self.transition_ms, DEFAULT_TRANSITION_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Simulated processing latency before a batch lands.
    pub ingest_delay: Duration,
    /// Wait before the first batch flips the view to the carousel.
    pub auto_preview_delay: Duration,
    pub autoplay_interval: Duration,
    pub transition: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        AppConfig::default().timings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_default_timings() {
        let timings = AppConfig::parse("").timings();
        assert_eq!(timings.ingest_delay, Duration::from_millis(800));
        assert_eq!(timings.auto_preview_delay, Duration::from_millis(500));
        assert_eq!(timings.autoplay_interval, Duration::from_millis(5000));
        assert_eq!(timings.transition, Duration::from_millis(700));
    }

    #[test]
    fn overrides_are_read_from_toml() {
        let config = AppConfig::parse(
            r#"
            theme = "light"
            default_sort = "size"
            default_filter = "png"
            ingest_delay_ms = 0
            "#,
        );
        assert_eq!(config.theme.as_deref(), Some("light"));
        assert_eq!(config.sort(), SortKey::Size);
        assert_eq!(config.filter(), FilterType::Png);
        assert_eq!(config.timings().ingest_delay, Duration::ZERO);
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        let config = AppConfig::parse("window_width = \"wide\"");
        assert!(config.window_width.is_none());
        assert_eq!(config.sort(), SortKey::Date);
    }

    #[test]
    fn unknown_view_values_use_defaults() {
        let config = AppConfig::parse("default_sort = \"colour\"\ndefault_filter = \"tiff\"");
        assert_eq!(config.sort(), SortKey::Date);
        assert_eq!(config.filter(), FilterType::All);
    }
}
