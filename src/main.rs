use clap::Parser;
use market_radar::cli::{Cli, Commands};
use market_radar::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using bundled default configuration");
            Config::parse(include_str!("../config.toml.example"))?
        }
    };
    config.validate()?;

    // Initialize telemetry
    market_radar::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting market scanner");
            args.execute(&config).await?;
        }
        Commands::Scan(args) => {
            tracing::info!(dry_run = args.dry_run, "Running single scan");
            args.execute(&config).await?;
        }
        Commands::Levels(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("# Effective configuration ({})", cli.config);
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
