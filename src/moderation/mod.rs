//! Prohibited-term screening for listing text
//!
//! Verdicts are advisory: callers surface them to the author but they never
//! change a listing's moderation status.

pub mod scorer;
pub mod terms;

pub use scorer::{CombinedVerdict, ContentScorer, FieldPolicy, ListingText, Verdict, MAX_SCORE};
pub use terms::{TermCategory, TermList};
