//! Turns raw model output into the sections shown to the student.

pub mod parser;

pub use parser::{
    ParsedResponse, ResponseParser, EXAMPLE_FALLBACK, EXPLANATION_FALLBACK,
};
