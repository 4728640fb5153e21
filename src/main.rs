use clap::Parser;
use faqrag::cli::handlers::*;
use faqrag::cli::Cli;
use faqrag::cli::Commands;
use faqrag::config::AppConfig;
use faqrag::FaqService;
use faqrag::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    if cli.verbose {
        faqrag::logging::init_logging_with_level("debug")?;
    } else {
        faqrag::logging::init_logging_with_config(Some(&config))?;
    }
    info!("Configuration loaded successfully");

    // Config display does not need the store or providers
    if let Commands::Config = cli.command {
        return handle_config_command(&config);
    }

    let service = FaqService::new(&config).await?;

    match cli.command {
        Commands::Ask { question, json } => {
            handle_ask_command(&service, &question.join(" "), json).await
        }
        Commands::Faqs { limit, json } => handle_faqs_command(&service, limit, json).await,
        Commands::Status { json } => handle_status_command(&service, json),
        Commands::Ingest { file, clear } => handle_ingest_command(&service, &file, clear).await,
        Commands::Populate => handle_populate_command(&service, &config).await,
        Commands::Clear { force } => handle_clear_command(&service, force).await,
        Commands::TestProvider { provider, question } => {
            handle_test_provider_command(&service, provider.into(), &question).await
        }
        Commands::Config => handle_config_command(&config),
    }
}
