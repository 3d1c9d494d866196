//! Blasti Configurator - command-line access to the configurator core
//!
//! Browse the product catalog, build and price saved configurations, render
//! mount scaffolds and edit plugin settings without a browser.

use blasti_configurator::cli::{
    CatalogArgs, CliError, ExitCode, MountArgs, PriceArgs, SavedArgs, SettingsArgs,
};
use blasti_configurator::config::Settings;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Blasti Configurator - pegboard and accessory configurator tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse the product catalog
    Catalog(CatalogArgs),
    /// Manage saved configurations
    Saved(SavedArgs),
    /// Price a saved configuration
    Price(PriceArgs),
    /// Render a configurator mount from shortcode attributes
    Mount(MountArgs),
    /// Show or change plugin settings
    Settings(SettingsArgs),
}

impl Command {
    fn execute(&self) -> Result<(), CliError> {
        match self {
            Self::Catalog(args) => args.execute(),
            Self::Saved(args) => args.execute(),
            Self::Price(args) => args.execute(),
            Self::Mount(args) => args.execute(),
            Self::Settings(args) => args.execute(),
        }
    }
}

/// Logs go to stderr so `--json` output stays machine-readable.
fn init_tracing(verbose: bool) {
    let debug_mode = Settings::load().is_ok_and(|settings| settings.advanced.debug_mode);
    let filter = if verbose || debug_mode { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command.execute() {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code
        }
    };

    std::process::exit(code.code());
}
