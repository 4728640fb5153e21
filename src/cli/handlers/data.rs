//! Corpus management handlers (list, ingest, populate, clear)

use std::path::Path;

use crate::cli::output::print_faq_list;
use crate::cli::output::print_info;
use crate::cli::output::print_prompt;
use crate::cli::output::print_success;
use crate::cli::output::print_warning;
use crate::service::PopulateOutcome;
use crate::AppConfig;
use crate::FaqService;
use crate::Result;

pub async fn handle_faqs_command(
    service: &FaqService,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut faqs = service.list_faqs().await?;
    let total = faqs.len();
    if let Some(limit) = limit {
        faqs.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&faqs)?);
    } else if faqs.is_empty() {
        print_warning("No FAQ entries stored");
    } else {
        print_faq_list(&faqs, total);
    }
    Ok(())
}

pub async fn handle_ingest_command(service: &FaqService, file: &Path, clear: bool) -> Result<()> {
    print_info(&format!("Ingesting {}", file.display()));
    let ingested = service.ingest_file(file, clear).await?;
    print_success(&format!(
        "Ingested {} entries ({} total)",
        ingested,
        service.corpus_size()?
    ));
    Ok(())
}

pub async fn handle_populate_command(service: &FaqService, config: &AppConfig) -> Result<()> {
    match service
        .populate_if_empty(&config.retrieval.faq_data_paths)
        .await?
    {
        PopulateOutcome::AlreadyPopulated(count) => {
            print_info(&format!("Store already contains {count} entries"));
        }
        PopulateOutcome::Populated { path, entries } => {
            print_success(&format!("Ingested {} entries from {}", entries, path.display()));
        }
        PopulateOutcome::NoDataFile => {
            print_warning(&format!(
                "No FAQ data file found; looked in {:?}",
                config.retrieval.faq_data_paths
            ));
        }
    }
    Ok(())
}

pub async fn handle_clear_command(service: &FaqService, force: bool) -> Result<()> {
    if !force {
        print_prompt("Remove all FAQ entries? [y/N] ")?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !matches!(input.trim(), "y" | "Y" | "yes") {
            print_info("Aborted");
            return Ok(());
        }
    }

    let removed = service.clear().await?;
    print_success(&format!("Removed {removed} entries"));
    Ok(())
}
