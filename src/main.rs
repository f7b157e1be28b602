//! Podcaster CLI entry point.

use anyhow::Result;
use clap::Parser;
use podcaster::cli::{commands, Cli, Commands};
use podcaster::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load_from(Some(&config_path))?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("podcaster={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match cli.command {
        Commands::Init => {
            commands::run_init(&settings, &config_path)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path).await?;
        }

        Commands::Generate {
            topic,
            turns,
            timeout,
            debug_bids,
            generate_audio,
            personas,
            director,
            seed,
        } => {
            let options = commands::GenerateOptions {
                topic,
                turns,
                timeout,
                debug_bids,
                generate_audio,
                personas,
                director,
                seed,
            };
            commands::run_generate(options, settings).await?;
        }

        Commands::Synthesize {
            transcript,
            personas,
        } => {
            commands::run_synthesize(&transcript, personas.as_deref(), settings).await?;
        }

        Commands::Personas { personas } => {
            let path = personas
                .as_deref()
                .map(Settings::expand_path)
                .unwrap_or_else(|| settings.personas_path());
            commands::run_personas(&path)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings, &config_path)?;
        }
    }

    Ok(())
}
