//! FAQ corpus files: a JSON array of `{"question": ..., "answer": ...}` objects

use std::path::Path;
use std::path::PathBuf;

use crate::errors::FaqRagError;
use crate::errors::Result;
use crate::models::NewFaqEntry;

/// Read and validate a corpus file
pub fn load_faq_file(path: impl AsRef<Path>) -> Result<Vec<NewFaqEntry>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let entries: Vec<NewFaqEntry> = serde_json::from_str(&content)?;

    if let Some(idx) = entries
        .iter()
        .position(|e| e.question.trim().is_empty() || e.answer.trim().is_empty())
    {
        return Err(FaqRagError::Custom(format!(
            "{}: entry {} has an empty question or answer",
            path.display(),
            idx
        )));
    }

    Ok(entries)
}

/// First candidate path that exists
pub fn find_faq_file(candidates: &[PathBuf]) -> Option<&Path> {
    candidates
        .iter()
        .map(PathBuf::as_path)
        .find(|path| path.is_file())
}
