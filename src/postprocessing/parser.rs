//! Splits one combined model answer into its explanation and example sections.

use regex::Regex;
use serde::Serialize;

pub const EXPLANATION_FALLBACK: &str = "I'm sorry, I could not generate an explanation.";
pub const EXAMPLE_FALLBACK: &str = "I'm sorry, I could not generate an example.";

pub const DEFAULT_EXPLANATION_MARKER: &str = "Explanation";
pub const DEFAULT_EXAMPLE_MARKER: &str = "Example";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub explanation: String,
    pub example: String,
}

#[derive(Debug, Clone)]
pub struct ResponseParser {
    explanation: Regex,
    example: Regex,
}

impl ResponseParser {
    /// Markers are matched literally and must be followed by a colon.
    pub fn new(explanation_marker: &str, example_marker: &str) -> Result<Self, regex::Error> {
        let explanation_marker = regex::escape(explanation_marker);
        let example_marker = regex::escape(example_marker);

        // Explanation stops at the first example marker; example runs to the end.
        let explanation = Regex::new(&format!(
            r"(?s){}:\s*(.*?){}:",
            explanation_marker, example_marker
        ))?;
        let example = Regex::new(&format!(r"(?s){}:\s*(.*)", example_marker))?;

        Ok(Self {
            explanation,
            example,
        })
    }

    /// Always yields both fields; a missing or empty section becomes its fallback text.
    pub fn parse(&self, raw: &str) -> ParsedResponse {
        ParsedResponse {
            explanation: capture(&self.explanation, raw)
                .unwrap_or_else(|| EXPLANATION_FALLBACK.to_string()),
            example: capture(&self.example, raw).unwrap_or_else(|| EXAMPLE_FALLBACK.to_string()),
        }
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new(DEFAULT_EXPLANATION_MARKER, DEFAULT_EXAMPLE_MARKER)
            .expect("escaped markers always form a valid pattern")
    }
}

fn capture(pattern: &Regex, raw: &str) -> Option<String> {
    let text = pattern.captures(raw)?.get(1)?.as_str().trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
