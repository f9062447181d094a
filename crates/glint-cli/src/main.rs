use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glint_core::GlintConfig;

mod commands;

#[derive(Parser)]
#[command(name = "glint")]
#[command(author, version, about = "Scroll-driven page effects, previewed and simulated in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file to use instead of ~/.config/glint/config.toml
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Preview the effects on a page in the terminal
    Preview {
        /// Page description (TOML); defaults to the built-in sample page
        #[arg(short = 'p', long)]
        page: Option<PathBuf>,
    },
    /// Run a scripted scenario and print the mutation trace
    Simulate {
        /// Scenario file (TOML)
        scenario: PathBuf,
        /// Print the trace as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print an easing curve as a table
    Curve {
        /// Curve name (none, linear, cubic_in_out, cubic, quintic, ease_out)
        #[arg(short = 'e', long, default_value = "cubic_in_out")]
        easing: String,
        /// Distance covered, in pixels
        #[arg(long, default_value_t = 1000.0)]
        distance: f64,
        /// Duration in milliseconds
        #[arg(long, default_value_t = 1000.0)]
        duration: f64,
        /// Number of rows
        #[arg(short = 's', long, default_value_t = 10)]
        steps: u32,
    },
    /// Print the effective configuration
    Config {
        /// Write the default configuration to ~/.config/glint/config.toml
        #[arg(long)]
        init: bool,
    },
    /// Report which features a page activates
    Check {
        /// Page description (TOML); defaults to the built-in sample page
        #[arg(short = 'p', long)]
        page: Option<PathBuf>,
    },
}

/// Log to stderr, or to a file in the data dir while the preview owns the
/// terminal
fn init_logging(config: &GlintConfig, to_file: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
    );

    if to_file {
        let dir = config.data_dir();
        fs::create_dir_all(&dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("glint.log"))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => GlintConfig::load_from(path)?,
        None => GlintConfig::load()?,
    };

    let previewing = matches!(cli.command, Some(Commands::Preview { .. }) | None);
    init_logging(&config, previewing)?;

    match cli.command {
        Some(Commands::Preview { page }) => commands::preview::run(config, page.as_deref()).await,
        None => commands::preview::run(config, None).await,
        Some(Commands::Simulate { scenario, json }) => {
            commands::simulate::run(config, &scenario, json).await
        }
        Some(Commands::Curve {
            easing,
            distance,
            duration,
            steps,
        }) => commands::curve::run(&easing, distance, duration, steps),
        Some(Commands::Config { init }) => commands::config::run(&config, init),
        Some(Commands::Check { page }) => commands::check::run(config, page.as_deref()).await,
    }
}
