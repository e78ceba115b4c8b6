use clap::Parser;
use turnstile::{Cli, Commands, TurnstileConfig, cache_key, policy_lines};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TurnstileConfig::from_file(path)?,
        None => TurnstileConfig::load()?,
    };
    tracing::debug!(
        operations = config.cache.operations().len(),
        "Configuration ready"
    );

    match cli.command {
        Commands::Policies => {
            for line in policy_lines(&config.cache) {
                println!("{}", line);
            }
        }
        Commands::Key { operation, args } => {
            println!("{}", cache_key(&operation, &args)?);
        }
    }

    Ok(())
}
