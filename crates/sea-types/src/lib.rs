//! Wire types shared between the SEA backend client and its callers.
//!
//! These mirror the JSON payloads exchanged with the backend one to one;
//! field names are the backend's snake_case keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who authored a turn in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Originator {
    User,
    Agent,
}

impl fmt::Display for Originator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Originator::User => write!(f, "user"),
            Originator::Agent => write!(f, "agent"),
        }
    }
}

/// One turn of conversation history sent with an inference query.
///
/// Order matters: a slice of interactions is the conversation as it
/// happened, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceInteraction {
    pub originator: Originator,
    pub text: String,
}

impl InferenceInteraction {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            originator: Originator::User,
            text: text.into(),
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            originator: Originator::Agent,
            text: text.into(),
        }
    }
}

/// A document excerpt the backend cited for an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceSource {
    /// Excerpt of the source text
    pub text: String,
    pub file_name: String,
    /// Content hash, usable with the document download endpoint
    pub file_hash: String,
    pub start_page_no: u32,
    pub end_page_no: u32,
}

impl InferenceSource {
    /// Formats the citation as `file, p. 3` or `file, pp. 3-5`.
    pub fn citation(&self) -> String {
        if self.start_page_no == self.end_page_no {
            format!("{}, p. {}", self.file_name, self.start_page_no)
        } else {
            format!(
                "{}, pp. {}-{}",
                self.file_name, self.start_page_no, self.end_page_no
            )
        }
    }
}

/// Answer to an inference query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub text: String,
    pub sources: Vec<InferenceSource>,
}

impl InferenceResult {
    /// Renders the answer as markdown, followed by a sorted citation list
    /// when the backend returned sources.
    pub fn to_markdown(&self) -> String {
        if self.sources.is_empty() {
            return self.text.clone();
        }

        let mut citations: Vec<String> = self
            .sources
            .iter()
            .map(|s| format!("- {}", s.citation()))
            .collect();
        citations.sort();

        format!("{}\n\n----------\n\n{}", self.text, citations.join("\n"))
    }
}

/// A document matching a search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSearchResult {
    pub file_name: String,
    pub file_hash: String,
}

/// The user returned by a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub display_name: String,
}
