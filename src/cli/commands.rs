//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

use crate::models::ProviderTag;

#[derive(Parser)]
#[command(name = "faqrag")]
#[command(about = "Retrieval-augmented FAQ answering over a local vector store")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: configured level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a question
    Ask {
        /// The question text
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
        /// Print the full answer envelope as JSON
        #[arg(long)]
        json: bool,
    },
    /// List stored FAQ entries
    Faqs {
        /// Maximum number of entries to print
        #[arg(short, long)]
        limit: Option<usize>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show provider availability and corpus size
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ingest FAQ entries from a JSON file
    Ingest {
        /// JSON array of {"question", "answer"} objects
        file: PathBuf,
        /// Remove existing entries first
        #[arg(long)]
        clear: bool,
    },
    /// Ingest the default FAQ data file if the store is empty
    Populate,
    /// Remove all FAQ entries from the store
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Run a single provider against a fixed test context
    TestProvider {
        #[arg(value_enum)]
        provider: ProviderArg,
        /// Question to send
        #[arg(short, long, default_value = "What is your return policy?")]
        question: String,
    },
    /// Show current configuration
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderArg {
    Openai,
    Gemini,
}

impl From<ProviderArg> for ProviderTag {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Openai => ProviderTag::OpenAI,
            ProviderArg::Gemini => ProviderTag::Gemini,
        }
    }
}
