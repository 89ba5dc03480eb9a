use clap::Parser;
use intraday_backtest::cli::{Cli, Commands};
use intraday_backtest::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    intraday_backtest::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting intent replay");
            args.execute(&config).await?;
        }
        Commands::Signal(args) => {
            tracing::info!(strategy = %config.strategy.label(), "Starting signal backtest");
            args.execute(&config).await?;
        }
        Commands::Sweep(args) => {
            tracing::info!(strategies = config.sweep.len(), "Starting strategy sweep");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
