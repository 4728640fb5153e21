//! CLI output formatting utilities

use crate::llm::ProviderStatus;
use crate::models::AnswerEnvelope;
use crate::models::RetrievedMatch;
use crate::service::ServiceStatus;
use crate::AppConfig;

/// Safely truncate a string at character boundary (not byte boundary)
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

pub fn print_answer(envelope: &AnswerEnvelope) {
    println!("💬 {}", envelope.answer);
    println!();
    println!(
        "   provider: {} | confidence: {} | matches: {}",
        envelope.provider,
        envelope.confidence,
        envelope.relevant_matches.len()
    );
    for (idx, m) in envelope.relevant_matches.iter().enumerate() {
        println!("   {}. {}", idx + 1, truncate_str(&m.question, 80));
    }
}

pub fn print_faq_list(faqs: &[RetrievedMatch], total: usize) {
    println!("📋 Showing {} of {} FAQ entries:", faqs.len(), total);
    for (idx, faq) in faqs.iter().enumerate() {
        println!("  {}. Q: {}", idx + 1, faq.question);
        println!("     A: {}", truncate_str(&faq.answer, 120));
    }
}

fn provider_line(status: &ProviderStatus) -> String {
    let mark = if status.available { "✓" } else { "✗" };
    match &status.model {
        Some(model) => format!("  {mark} {} ({model})", status.provider),
        None => format!("  {mark} {}", status.provider),
    }
}

pub fn print_status(status: &ServiceStatus) {
    println!("📊 FAQ service status");
    println!();
    println!("🗄️  Store: {}", status.store_path.display());
    println!("  Entries: {}", status.corpus_size);
    println!();
    println!("🤖 Providers ({} available):", status.available_providers);
    for provider in &status.providers {
        println!("{}", provider_line(provider));
    }
    if status.fallback_mode {
        println!("  Fallback mode: answers come straight from the FAQ store");
    }
    println!();
    println!("🔑 Keys:");
    println!("  OPENAI_API_KEY set: {}", status.openai_key_set);
    println!("  GOOGLE_API_KEY set: {}", status.google_key_set);
}

/// Print configuration; API keys are reported as set/unset only
pub fn print_config(config: &AppConfig) {
    println!("📋 faqrag configuration:");
    println!();

    println!("🗄️  Store:");
    println!("  Path: {}", config.store_path().display());
    println!("  Collection: {}", config.store.collection);
    println!();

    println!("🧠 Embeddings:");
    println!("  Backend: {:?}", config.embeddings.backend);
    println!("  Model: {}", config.embedding_model());
    println!("  Dimension: {}", config.embedding_dimension());
    println!();

    println!("🔍 Retrieval:");
    println!("  Limit: {}", config.retrieval_limit());
    println!("  FAQ data paths: {:?}", config.retrieval.faq_data_paths);
    println!();

    println!("🤖 OpenAI:");
    println!("  Model: {}", config.openai.model);
    println!("  Key set: {}", config.openai_key_set());
    println!();

    println!("🤖 Gemini:");
    println!("  Candidate models: {:?}", config.gemini.candidate_models);
    println!("  Key set: {}", config.google_key_set());
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
}

pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_prompt(msg: &str) -> std::io::Result<()> {
    print!("{msg}");
    std::io::Write::flush(&mut std::io::stdout())
}
