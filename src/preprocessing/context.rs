use crate::preprocessing::ValidationError;
use serde::{Deserialize, Serialize};

/// Optional subject and topic the student attached to the question.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct RequestTopic {
    pub subject: Option<String>,
    pub topic: Option<String>,
}

impl RequestTopic {
    pub const MAX_LENGTH: usize = 200;

    /// Blank values count as absent.
    pub fn new(subject: Option<&str>, topic: Option<&str>) -> Result<Self, ValidationError> {
        Ok(Self {
            subject: Self::field("subject", subject)?,
            topic: Self::field("topic", topic)?,
        })
    }

    fn field(name: &'static str, value: Option<&str>) -> Result<Option<String>, ValidationError> {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };
        let length = value.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(ValidationError::FieldTooLong {
                field: name,
                length,
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Some(value.to_string()))
    }

    /// Prompt lines describing the context, empty when nothing was given.
    pub fn prompt_lines(&self) -> String {
        let mut lines = String::new();
        if let Some(subject) = &self.subject {
            lines.push_str(&format!("Subject: {}\n", subject));
        }
        if let Some(topic) = &self.topic {
            lines.push_str(&format!("Topic: {}\n", topic));
        }
        lines
    }
}
