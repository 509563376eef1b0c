use crate::conversation::Turn;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CleanerError {
    #[error("Message cannot be empty")]
    EmptyInput,
    #[error("Message exceeds maximum length: {0} > {max} characters", max = Cleaner::MAX_LENGTH)]
    TooLong(usize),
}

pub struct Cleaner;

impl Cleaner {
    pub const MAX_LENGTH: usize = Turn::MAX_CONTENT_LENGTH;

    /// Trims the query and checks it holds 1 to `MAX_LENGTH` characters.
    pub fn clean(input: &str) -> Result<String, CleanerError> {
        let cleaned = input.trim();

        if cleaned.is_empty() {
            return Err(CleanerError::EmptyInput);
        }

        let length = cleaned.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(CleanerError::TooLong(length));
        }

        Ok(cleaned.to_string())
    }
}
