//! Whitelist document model and its JSON encodings.
//!
//! The on-disk shape is a single object with one recognized field:
//!
//! ```json
//! {"ExclusiveJoin": ["P1", "P2"]}
//! ```
//!
//! Readers accept both the compact and the pretty-printed form. Blank input
//! decodes to an empty list.

use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

/// The whitelist: an ordered list of opaque player identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Whitelist {
    #[serde(rename = "ExclusiveJoin")]
    pub exclusive_join: Vec<String>,
}

impl Whitelist {
    pub fn new(entries: Vec<String>) -> Self {
        Self {
            exclusive_join: entries,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.exclusive_join.iter().any(|entry| entry == id)
    }

    pub fn len(&self) -> usize {
        self.exclusive_join.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exclusive_join.is_empty()
    }

    /// Decode a document, treating blank input as an empty whitelist.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(text)
    }

    /// Single-line encoding used by the file and gist backends.
    pub fn to_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Four-space indented encoding with trailing newline (repository backend).
    pub fn to_pretty(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)?;
        let mut text = String::from_utf8_lossy(&buf).into_owned();
        text.push('\n');
        Ok(text)
    }
}
