//! Prompt templates for FAQ answering

use std::collections::HashMap;

/// Template for generating prompts
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            template,
            variables,
        }
    }

    /// Fill in the template with variables
    ///
    /// Single pass over the template: substituted values are never scanned for
    /// placeholders themselves.
    #[must_use]
    pub fn render(&self, values: &HashMap<&str, &str>) -> String {
        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                result.push_str(&rest[start..]);
                rest = "";
                break;
            };

            let name = &after[..end];
            match values.get(name) {
                Some(value) => result.push_str(value),
                None => {
                    result.push_str("{{");
                    result.push_str(name);
                    result.push_str("}}");
                }
            }
            rest = &after[end + 2..];
        }

        result.push_str(rest);
        result
    }

    /// Get required variables
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

/// Extract variable names from template
fn extract_variables(template: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '{' && chars.peek() == Some(&'{') {
            chars.next(); // skip second '{'
            let mut var_name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch == '}' {
                    chars.next();
                    if chars.peek() == Some(&'}') {
                        chars.next();
                        break;
                    }
                } else {
                    var_name.push(ch);
                    chars.next();
                }
            }
            if !var_name.is_empty() && !variables.contains(&var_name) {
                variables.push(var_name);
            }
        }
    }

    variables
}

const FAQ_ANSWER_TEMPLATE: &str = r"You are a helpful FAQ bot. Based on the following FAQ information, provide a natural and helpful response to the user's question.

FAQ Context:
{{context}}

User Question: {{question}}

Please provide a clear, concise, and helpful response. If the FAQ context doesn't fully answer the question, acknowledge what you know and suggest contacting customer support for more specific help.

Response:";

/// The prompt every provider answers
#[must_use]
pub fn faq_answer() -> PromptTemplate {
    PromptTemplate::new(FAQ_ANSWER_TEMPLATE)
}

/// Render the FAQ prompt for one question
#[must_use]
pub fn build_faq_prompt(question: &str, context: &str) -> String {
    let values = HashMap::from([("context", context), ("question", question)]);
    faq_answer().render(&values)
}
