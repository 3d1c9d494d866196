//! Plugin settings CLI commands.

use crate::cli::common::{load_settings, print_json, CliError, CliResult};
use crate::config::{validate_max_accessories, ModelQuality, Settings};
use crate::constants::APP_NAME;
use crate::models::{CssDimension, Theme};
use crate::mount::descriptor::parse_bool;
use crate::mount::SettingsTab;
use clap::{Args, Subcommand};

/// Plugin settings commands
#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    command: SettingsCommand,
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    /// Display current settings
    Show(SettingsShowArgs),
    /// Set settings values
    Set(SettingsSetArgs),
}

/// Display current settings
#[derive(Args, Debug)]
pub struct SettingsShowArgs {
    /// Only show one tab (general, display, performance, advanced)
    #[arg(long, value_name = "TAB")]
    tab: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set settings values
#[derive(Args, Debug, Default)]
pub struct SettingsSetArgs {
    /// Maximum accessories per configuration (1-100)
    #[arg(long, value_name = "N")]
    max_accessories: Option<u32>,

    /// Default theme (default, dark, light, minimal)
    #[arg(long, value_name = "THEME")]
    theme: Option<String>,

    /// Default container width (e.g. 100%, 800px)
    #[arg(long, value_name = "CSS")]
    width: Option<String>,

    /// Default container height (e.g. 600px, 70vh)
    #[arg(long, value_name = "CSS")]
    height: Option<String>,

    /// 3D model quality (high, medium, low, auto)
    #[arg(long, value_name = "QUALITY")]
    model_quality: Option<String>,

    /// Debug mode (true/false)
    #[arg(long, value_name = "BOOL")]
    debug: Option<String>,

    /// Custom API endpoint URL ("" to clear)
    #[arg(long, value_name = "URL")]
    api_endpoint: Option<String>,
}

impl SettingsArgs {
    /// Execute settings subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            SettingsCommand::Show(args) => args.execute(),
            SettingsCommand::Set(args) => args.execute(),
        }
    }
}

impl SettingsShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let settings = load_settings()?;
        let tab = self.tab.as_deref().map(SettingsTab::from_slug);

        if self.json {
            return match tab {
                None => print_json(&settings),
                Some(SettingsTab::General) => print_json(&settings.general),
                Some(SettingsTab::Display) => print_json(&settings.display),
                Some(SettingsTab::Performance) => print_json(&settings.performance),
                Some(SettingsTab::Advanced) => print_json(&settings.advanced),
            };
        }

        let title = format!("{APP_NAME} Settings");
        println!("{title}");
        println!("{}", "=".repeat(title.len()));
        println!();

        match tab {
            Some(tab) => output_tab(&settings, tab),
            None => {
                for tab in SettingsTab::all() {
                    output_tab(&settings, *tab);
                }
            }
        }

        Ok(())
    }
}

fn enabled(value: bool) -> &'static str {
    if value {
        "enabled"
    } else {
        "disabled"
    }
}

/// Output one settings tab in human-readable format
fn output_tab(settings: &Settings, tab: SettingsTab) {
    println!("{}:", tab.display_name());
    match tab {
        SettingsTab::General => {
            let general = &settings.general;
            println!("  Mobile Optimization: {}", enabled(general.mobile_optimization));
            println!("  Analytics:           {}", enabled(general.analytics));
            println!("  Max Accessories:     {}", general.max_accessories);
            println!("  Theme Integration:   {}", enabled(general.theme_integration));
        }
        SettingsTab::Display => {
            let display = &settings.display;
            println!("  Default Theme:  {}", display.default_theme);
            println!("  Default Width:  {}", display.default_width);
            println!("  Default Height: {}", display.default_height);
            if display.custom_css.trim().is_empty() {
                println!("  Custom CSS:     (none)");
            } else {
                println!("  Custom CSS:     {} bytes", display.custom_css.len());
            }
        }
        SettingsTab::Performance => {
            let performance = &settings.performance;
            println!("  Model Caching:  {}", enabled(performance.model_caching));
            println!("  Model Quality:  {}", performance.model_quality);
            println!("  Preload Models: {}", enabled(performance.preload_models));
        }
        SettingsTab::Advanced => {
            let advanced = &settings.advanced;
            println!("  Debug Mode:   {}", enabled(advanced.debug_mode));
            println!(
                "  API Endpoint: {}",
                advanced.api_endpoint.as_deref().unwrap_or("(default)")
            );
        }
    }
    println!();
}

impl SettingsSetArgs {
    fn is_empty(&self) -> bool {
        self.max_accessories.is_none()
            && self.theme.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.model_quality.is_none()
            && self.debug.is_none()
            && self.api_endpoint.is_none()
    }

    /// Applies the requested changes to `settings`.
    fn apply(&self, settings: &mut Settings) -> CliResult<()> {
        if let Some(max) = self.max_accessories {
            validate_max_accessories(max).map_err(|e| CliError::validation(e.to_string()))?;
            settings.general.max_accessories = max;
        }

        if let Some(theme) = &self.theme {
            settings.display.default_theme = theme
                .parse::<Theme>()
                .map_err(|e| CliError::validation(e.to_string()))?;
        }

        if let Some(width) = &self.width {
            settings.display.default_width = CssDimension::parse(width)
                .map_err(|e| CliError::validation(format!("Invalid width: {e}")))?;
        }

        if let Some(height) = &self.height {
            settings.display.default_height = CssDimension::parse(height)
                .map_err(|e| CliError::validation(format!("Invalid height: {e}")))?;
        }

        if let Some(quality) = &self.model_quality {
            settings.performance.model_quality = quality
                .parse::<ModelQuality>()
                .map_err(|e| CliError::validation(e.to_string()))?;
        }

        if let Some(debug) = &self.debug {
            settings.advanced.debug_mode = parse_bool(debug).ok_or_else(|| {
                CliError::validation(format!("Invalid debug value '{debug}': expected true or false"))
            })?;
        }

        if let Some(endpoint) = &self.api_endpoint {
            let endpoint = endpoint.trim();
            settings.advanced.api_endpoint =
                (!endpoint.is_empty()).then(|| endpoint.to_string());
        }

        settings
            .validate()
            .map_err(|e| CliError::validation(format!("{e:#}")))
    }

    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        if self.is_empty() {
            return Err(CliError::validation(
                "At least one setting must be specified: --max-accessories, --theme, --width, --height, --model-quality, --debug, or --api-endpoint",
            ));
        }

        let mut settings = load_settings()?;
        self.apply(&mut settings)?;

        settings
            .save()
            .map_err(|e| CliError::io(format!("Failed to save settings: {e:#}")))?;

        println!("Settings updated successfully.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_valid_changes() {
        let mut settings = Settings::new();
        let args = SettingsSetArgs {
            max_accessories: Some(20),
            theme: Some("dark".into()),
            width: Some("800".into()),
            model_quality: Some("high".into()),
            debug: Some("yes".into()),
            api_endpoint: Some("https://shop.example/api".into()),
            ..SettingsSetArgs::default()
        };

        args.apply(&mut settings).unwrap();

        assert_eq!(settings.general.max_accessories, 20);
        assert_eq!(settings.display.default_theme, Theme::Dark);
        assert_eq!(settings.display.default_width.as_str(), "800px");
        assert_eq!(settings.performance.model_quality, ModelQuality::High);
        assert!(settings.advanced.debug_mode);
        assert_eq!(
            settings.advanced.api_endpoint.as_deref(),
            Some("https://shop.example/api")
        );
    }

    #[test]
    fn test_apply_rejects_out_of_range() {
        let mut settings = Settings::new();
        let args = SettingsSetArgs {
            max_accessories: Some(101),
            ..SettingsSetArgs::default()
        };
        assert!(args.apply(&mut settings).is_err());
        assert_eq!(settings.general.max_accessories, 50);
    }

    #[test]
    fn test_empty_endpoint_clears_override() {
        let mut settings = Settings::new();
        settings.advanced.api_endpoint = Some("https://old.example".into());
        let args = SettingsSetArgs {
            api_endpoint: Some(String::new()),
            ..SettingsSetArgs::default()
        };
        args.apply(&mut settings).unwrap();
        assert!(settings.advanced.api_endpoint.is_none());
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let mut settings = Settings::new();
        let args = SettingsSetArgs {
            api_endpoint: Some("ftp://x".into()),
            ..SettingsSetArgs::default()
        };
        assert!(args.apply(&mut settings).is_err());
    }
}
