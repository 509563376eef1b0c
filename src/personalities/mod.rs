//! The two tutoring personas and their fixed instruction text.
//!
//! Personas are a closed set: each variant carries its display name and the
//! teaching-style prefix that is placed in front of the student's question.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Explainer,
    ExampleProvider,
}

impl Persona {
    /// Every persona, in response order.
    pub const ALL: [Persona; 2] = [Persona::Explainer, Persona::ExampleProvider];

    pub fn name(&self) -> &'static str {
        match self {
            Persona::Explainer => "Explainer",
            Persona::ExampleProvider => "Example Provider",
        }
    }

    /// Wire tag, matching the serde representation.
    pub fn tag(&self) -> &'static str {
        match self {
            Persona::Explainer => "explainer",
            Persona::ExampleProvider => "example_provider",
        }
    }

    pub fn instructions(&self) -> &'static str {
        match self {
            Persona::Explainer => {
                "You are the Explainer, a patient tutor who makes ideas click.
Teaching style:
- Break the concept down step by step, from first principles
- Explain why things work, not only what they are
- Define any technical term the first time you use it
- Use short paragraphs and plain language
- Do not give worked examples; another tutor covers those

Answer the student's question below with a clear explanation."
            }
            Persona::ExampleProvider => {
                "You are the Example Provider, a practical tutor who teaches by showing.
Teaching style:
- Give one or two concrete, realistic examples
- Walk through each example so the student can follow every step
- Prefer everyday situations or small runnable snippets
- Keep theory to a minimum; another tutor covers the explanation

Answer the student's question below with illustrative examples."
            }
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "explainer" => Ok(Persona::Explainer),
            "example_provider" => Ok(Persona::ExampleProvider),
            _ => Err(format!("Invalid persona: {}", s)),
        }
    }
}
