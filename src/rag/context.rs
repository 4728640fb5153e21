//! Context assembly from retrieved FAQ matches

use crate::models::RetrievedMatch;

/// Format a single match for the prompt
fn format_match(m: &RetrievedMatch) -> String {
    format!("Q: {}\nA: {}", m.question, m.answer)
}

/// Join matches in retrieval order, one `Q:`/`A:` block each
#[must_use]
pub fn assemble_context(matches: &[RetrievedMatch]) -> String {
    matches
        .iter()
        .map(format_match)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_context_keeps_order() {
        let matches = vec![
            RetrievedMatch {
                question: "What is your return policy?".to_string(),
                answer: "30 days.".to_string(),
            },
            RetrievedMatch {
                question: "Do you offer refunds?".to_string(),
                answer: "Yes, to the original payment method.".to_string(),
            },
        ];

        assert_eq!(
            assemble_context(&matches),
            "Q: What is your return policy?\nA: 30 days.\nQ: Do you offer refunds?\nA: Yes, to the original payment method."
        );
    }

    #[test]
    fn test_assemble_context_empty() {
        assert_eq!(assemble_context(&[]), "");
    }
}
