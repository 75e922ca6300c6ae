//! Admin notification document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for notifications
pub const NOTIFICATION_COLLECTION: &str = "notifications";

/// Notification shown in the admin inbox
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct NotificationDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Role whose members see the notification (e.g. "admin")
    pub recipient_role: String,

    /// Event kind (e.g. "listing_reported")
    pub kind: String,

    pub listing_id: String,

    pub reporter_id: String,

    pub reason: String,

    /// Listing report count after the report was recorded
    pub report_count: i32,

    /// Whether this report moved the listing to `flagged`
    #[serde(default)]
    pub escalated: bool,

    #[serde(default)]
    pub read: bool,
}

impl IntoIndexes for NotificationDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "recipient_role": 1, "read": 1 },
            Some(
                IndexOptions::builder()
                    .name("recipient_unread_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for NotificationDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
