//! Listing document schema
//!
//! Only the fields that take part in moderation are modelled here: the
//! author-supplied text, the moderation status and the embedded report log.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for listings
pub const LISTING_COLLECTION: &str = "listings";

/// Visibility-governing moderation state of a listing
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    /// Awaiting a moderator decision
    #[default]
    Pending,
    /// Visible
    Approved,
    /// Removed by a moderator; never changed by report escalation
    Rejected,
    /// Hidden pending review, set by moderators or by report escalation
    Flagged,
}

impl ModerationStatus {
    /// Stored string form (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
            ModerationStatus::Flagged => "flagged",
        }
    }
}

impl std::fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(ModerationStatus::Pending),
            "approved" => Ok(ModerationStatus::Approved),
            "rejected" => Ok(ModerationStatus::Rejected),
            "flagged" => Ok(ModerationStatus::Flagged),
            other => Err(format!("unknown moderation status '{}'", other)),
        }
    }
}

/// A single user report against a listing
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReportEntry {
    pub reporter_id: String,
    pub reason: String,
    pub created_at: DateTime,
}

impl ReportEntry {
    pub fn new(reporter_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            reporter_id: reporter_id.into(),
            reason: reason.into(),
            created_at: DateTime::now(),
        }
    }
}

/// Listing document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ListingDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// User who created the listing
    pub owner_id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub moderation_status: ModerationStatus,

    /// Always equal to `reports.len()`
    #[serde(default)]
    pub report_count: i32,

    /// Append-only, at most one entry per reporter
    #[serde(default)]
    pub reports: Vec<ReportEntry>,
}

impl ListingDoc {
    /// Create a new listing in the `Pending` state with no reports
    pub fn new(owner_id: String, title: String, description: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            owner_id,
            title,
            description,
            moderation_status: ModerationStatus::Pending,
            report_count: 0,
            reports: Vec::new(),
        }
    }

    /// Hex form of the document id
    pub fn id_hex(&self) -> Option<String> {
        self._id.map(|id| id.to_hex())
    }

    pub fn has_report_from(&self, reporter_id: &str) -> bool {
        self.reports.iter().any(|r| r.reporter_id == reporter_id)
    }
}

impl IntoIndexes for ListingDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "owner_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("owner_id_index".to_string())
                        .build(),
                ),
            ),
            // Moderation queue lookups
            (
                doc! { "moderation_status": 1 },
                Some(
                    IndexOptions::builder()
                        .name("moderation_status_index".to_string())
                        .build(),
                ),
            ),
            // Duplicate-report filter
            (
                doc! { "reports.reporter_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("reports_reporter_id_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for ListingDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
