//! Question answering handlers

use tracing::debug;

use crate::cli::output::print_answer;
use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::cli::output::print_warning;
use crate::models::ProviderTag;
use crate::FaqService;
use crate::Result;

pub async fn handle_ask_command(service: &FaqService, question: &str, json: bool) -> Result<()> {
    if service.corpus_size()? == 0 {
        print_warning("The FAQ store is empty. Run: faqrag populate");
    }

    let envelope = service.answer(question).await;
    debug!(provider = %envelope.provider, "answer ready");

    if json {
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else {
        print_answer(&envelope);
    }
    Ok(())
}

pub async fn handle_test_provider_command(
    service: &FaqService,
    provider: ProviderTag,
    question: &str,
) -> Result<()> {
    print_info(&format!("Testing {provider} with: \"{question}\""));

    let report = service.test_provider(provider, question).await?;
    match report.response {
        Some(text) => {
            print_success(&format!("{provider} responded"));
            println!("{text}");
        }
        None => print_warning(&format!("{provider} returned no text")),
    }
    Ok(())
}
