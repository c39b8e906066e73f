//! # Halo Shell
//!
//! Client-side desktop shell: decorates every compositor output with a
//! status panel and a wallpaper surface, answers session-lock requests
//! with a modal unlock dialog, and spawns launcher processes.
//!
//! The compositor protocol transport is the embedding session's concern;
//! `--demo` drives the full engine against the simulated compositor.

use anyhow::Result;
use clap::Parser;
use log::{error, info};

use halo_shell::config::HaloConfig;
use halo_shell::runtime;

#[derive(Parser)]
#[command(name = "halo-shell")]
#[command(about = "Client-side desktop shell with per-output panels, wallpaper and a lock screen")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.config/halo-shell/halo-shell.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Run a scripted session against the simulated compositor
    #[arg(long)]
    demo: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    info!("🚀 Starting Halo Shell");
    info!(
        "📄 Version: {} (built {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_DATE")
    );

    if let Err(e) = run(cli) {
        // Only unrecoverable startup failures land here
        error!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Load configuration; a missing or broken file degrades to defaults
    let config = match HaloConfig::load(&cli.config) {
        Ok(config) => {
            info!("✅ Configuration loaded from: {}", cli.config);
            config
        }
        Err(e) => {
            info!("📝 Using default configuration ({})", e);
            HaloConfig::default()
        }
    };

    if cli.demo {
        runtime::run_demo(config)
    } else {
        runtime::run_session(config)
    }
}
