//! Listing text scorer
//!
//! Scores a title or description by counting prohibited terms and applying a
//! per-field weight. Titles are scored more strictly than descriptions, and
//! each field keeps its own flag and approval thresholds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::terms::TermList;

/// Upper bound of a moderation score
pub const MAX_SCORE: u8 = 100;

/// Weight and thresholds for one text field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPolicy {
    /// Points added per matched term
    pub weight: u8,
    /// Flagged when `score >= flag_at`
    pub flag_at: u8,
    /// Approved only when `score < approve_below`
    pub approve_below: u8,
}

impl FieldPolicy {
    pub const TITLE: FieldPolicy = FieldPolicy {
        weight: 35,
        flag_at: 20,
        approve_below: 35,
    };

    pub const DESCRIPTION: FieldPolicy = FieldPolicy {
        weight: 25,
        flag_at: 25,
        approve_below: 50,
    };

    fn score(&self, match_count: usize) -> u8 {
        let raw = match_count.saturating_mul(self.weight as usize);
        raw.min(MAX_SCORE as usize) as u8
    }
}

/// Advisory result for one text field
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub is_approved: bool,
    pub flagged: bool,
    pub prohibited_terms: BTreeSet<String>,
    pub moderation_score: u8,
}

impl Verdict {
    /// Verdict for empty or absent text
    pub fn clean() -> Self {
        Self {
            is_approved: true,
            flagged: false,
            prohibited_terms: BTreeSet::new(),
            moderation_score: 0,
        }
    }
}

/// Title and description submitted for a listing
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingText {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ListingText {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
        }
    }
}

/// Verdict for a whole listing, keeping the per-field breakdown
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CombinedVerdict {
    pub is_approved: bool,
    pub flagged: bool,
    pub prohibited_terms: BTreeSet<String>,
    pub moderation_score: u8,
    pub title: Verdict,
    pub description: Verdict,
}

/// Scores listing text against an injected term list. Pure and `Sync`.
#[derive(Debug, Clone, Default)]
pub struct ContentScorer {
    terms: TermList,
}

impl ContentScorer {
    pub fn new(terms: TermList) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &TermList {
        &self.terms
    }

    pub fn score_title(&self, text: Option<&str>) -> Verdict {
        self.score_field(text, FieldPolicy::TITLE)
    }

    pub fn score_description(&self, text: Option<&str>) -> Verdict {
        self.score_field(text, FieldPolicy::DESCRIPTION)
    }

    pub fn score_listing(&self, listing: &ListingText) -> CombinedVerdict {
        let title = self.score_title(listing.title.as_deref());
        let description = self.score_description(listing.description.as_deref());

        CombinedVerdict {
            is_approved: title.is_approved && description.is_approved,
            flagged: title.flagged || description.flagged,
            prohibited_terms: title
                .prohibited_terms
                .union(&description.prohibited_terms)
                .cloned()
                .collect(),
            moderation_score: title.moderation_score.max(description.moderation_score),
            title,
            description,
        }
    }

    fn score_field(&self, text: Option<&str>, policy: FieldPolicy) -> Verdict {
        let text = match text {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Verdict::clean(),
        };

        let prohibited_terms = self.terms.matches(text);
        let moderation_score = policy.score(prohibited_terms.len());

        Verdict {
            is_approved: moderation_score < policy.approve_below,
            flagged: moderation_score >= policy.flag_at,
            prohibited_terms,
            moderation_score,
        }
    }
}
