//! Prohibited term table
//!
//! The scorer never reads a global list: a `TermList` is built once at
//! startup (built-in defaults or a JSON file) and handed to the scorer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

use crate::types::{ModerationError, Result};

/// Category a prohibited term belongs to
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TermCategory {
    /// Fair-housing violations (excluding protected groups)
    Discriminatory,
    /// Financial scams and misleading claims
    Misleading,
    /// Illegal use of the property
    Illegal,
}

const DISCRIMINATORY_TERMS: &[&str] = &[
    "no children",
    "no kids",
    "adults only",
    "no families",
    "christians only",
    "no immigrants",
    "whites only",
    "no section 8",
    "no wheelchairs",
    "english speakers only",
];

const MISLEADING_TERMS: &[&str] = &[
    "guaranteed return",
    "wire money",
    "western union",
    "deposit before viewing",
    "no viewing required",
    "guaranteed approval",
    "bitcoin only",
    "gift cards accepted",
    "owner is overseas",
];

const ILLEGAL_TERMS: &[&str] = &[
    "grow house",
    "drug lab",
    "illegal sublet",
    "unpermitted unit",
    "no lease required",
    "cash under the table",
    "stolen goods",
    "squatter rights sale",
];

/// On-disk shape of a term list override
#[derive(Debug, Default, Deserialize)]
struct TermListFile {
    #[serde(default)]
    discriminatory: Vec<String>,
    #[serde(default)]
    misleading: Vec<String>,
    #[serde(default)]
    illegal: Vec<String>,
}

/// Immutable table of lowercase prohibited terms
#[derive(Debug, Clone)]
pub struct TermList {
    entries: Vec<(TermCategory, String)>,
}

impl TermList {
    /// Build a list from `(category, term)` pairs.
    ///
    /// Terms are trimmed and lowercased; blanks are dropped and duplicates collapse.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = (TermCategory, S)>,
        S: AsRef<str>,
    {
        let mut seen = BTreeSet::new();
        let entries = terms
            .into_iter()
            .filter_map(|(category, term)| {
                let term = term.as_ref().trim().to_lowercase();
                if term.is_empty() || !seen.insert(term.clone()) {
                    None
                } else {
                    Some((category, term))
                }
            })
            .collect();

        Self { entries }
    }

    /// Load a term list from a JSON file with `discriminatory`, `misleading`
    /// and `illegal` arrays
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ModerationError::Config(format!("Failed to read term list {}: {}", path.display(), e))
        })?;
        let file: TermListFile = serde_json::from_str(&raw).map_err(|e| {
            ModerationError::Config(format!("Invalid term list {}: {}", path.display(), e))
        })?;

        let list = Self::new(
            file.discriminatory
                .into_iter()
                .map(|t| (TermCategory::Discriminatory, t))
                .chain(file.misleading.into_iter().map(|t| (TermCategory::Misleading, t)))
                .chain(file.illegal.into_iter().map(|t| (TermCategory::Illegal, t))),
        );

        if list.is_empty() {
            warn!("Term list {} is empty; no listing text will be flagged", path.display());
        } else {
            info!("Loaded {} prohibited terms from {}", list.len(), path.display());
        }
        Ok(list)
    }

    /// Number of distinct terms
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Terms in one category
    pub fn terms_in(&self, category: TermCategory) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(c, _)| *c == category)
            .map(|(_, t)| t.as_str())
    }

    /// Every term contained in `text`, case-insensitively
    pub fn matches(&self, text: &str) -> BTreeSet<String> {
        let haystack = text.to_lowercase();
        self.entries
            .iter()
            .filter(|(_, term)| haystack.contains(term.as_str()))
            .map(|(_, term)| term.clone())
            .collect()
    }
}

impl Default for TermList {
    fn default() -> Self {
        Self::new(
            DISCRIMINATORY_TERMS
                .iter()
                .map(|t| (TermCategory::Discriminatory, *t))
                .chain(MISLEADING_TERMS.iter().map(|t| (TermCategory::Misleading, *t)))
                .chain(ILLEGAL_TERMS.iter().map(|t| (TermCategory::Illegal, *t))),
        )
    }
}
