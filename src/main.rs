mod app;
mod browser;
mod carousel;
mod config;
mod error;
mod filter;
mod handle;
mod ingest;
mod metadata;
mod notice;
mod record;
mod state;
mod summary;
mod thumbnail;
mod toast;
mod viewer;

use app::ShowcaseApp;
use config::AppConfig;

const THEME_ENV: &str = "SHOWCASE_THEME";

fn parse_theme(value: &str) -> egui::Theme {
    match value.trim().to_ascii_lowercase().as_str() {
        "light" => egui::Theme::Light,
        _ => egui::Theme::Dark,
    }
}

fn resolve_theme(env: Option<&str>, config: &AppConfig) -> egui::Theme {
    if let Some(raw) = env {
        return parse_theme(raw);
    }
    if let Some(raw) = config.theme.as_deref() {
        return parse_theme(raw);
    }
    egui::Theme::Dark
}

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load();
    let theme = resolve_theme(std::env::var(THEME_ENV).ok().as_deref(), &config);
    tracing::info!(?theme, "starting product showcase");

    let width = config.window_width.unwrap_or(1200.0);
    let height = config.window_height.unwrap_or(800.0);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Product Showcase")
            .with_app_id("product-showcase")
            .with_inner_size([width, height])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "product-showcase",
        native_options,
        Box::new(move |cc| Ok(Box::new(ShowcaseApp::new(cc, config, theme)))),
    )
}

#[cfg(test)]
mod tests {
    use super::{parse_theme, resolve_theme};
    use crate::config::AppConfig;

    #[test]
    fn parse_theme_handles_supported_values() {
        assert_eq!(parse_theme("light"), egui::Theme::Light);
        assert_eq!(parse_theme(" Light "), egui::Theme::Light);
        assert_eq!(parse_theme("dark"), egui::Theme::Dark);
    }

    #[test]
    fn parse_theme_defaults_to_dark_for_unknown_values() {
        assert_eq!(parse_theme("solarized"), egui::Theme::Dark);
    }

    #[test]
    fn environment_overrides_config_theme() {
        let config = AppConfig {
            theme: Some("light".into()),
            ..Default::default()
        };
        assert_eq!(resolve_theme(None, &config), egui::Theme::Light);
        assert_eq!(resolve_theme(Some("dark"), &config), egui::Theme::Dark);
        assert_eq!(resolve_theme(None, &AppConfig::default()), egui::Theme::Dark);
    }
}
