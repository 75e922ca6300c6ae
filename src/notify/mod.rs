//! Admin notifications for user reports
//!
//! Notification is best-effort. `ReportService` logs and drops notifier
//! errors so a delivered report is never turned into a failed request.

pub mod nats;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::schemas::{ModerationStatus, NotificationDoc, NOTIFICATION_COLLECTION};
use crate::db::{MongoClient, MongoCollection};
use crate::types::Result;

pub use self::nats::{NatsClient, NatsNotifier};

/// A report that was successfully recorded
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportEvent {
    pub listing_id: String,
    pub reporter_id: String,
    pub reason: String,
    /// Report count after this report
    pub report_count: i32,
    /// Status after escalation was applied
    pub moderation_status: ModerationStatus,
    /// True when this report moved the listing to `Flagged`
    pub escalated: bool,
    pub occurred_at: DateTime<Utc>,
}

#[async_trait]
pub trait AdminNotifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn notify(&self, event: &ReportEvent) -> Result<()>;
}

/// Writes report events to the service log (dev default)
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl AdminNotifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, event: &ReportEvent) -> Result<()> {
        info!(
            listing_id = %event.listing_id,
            reporter_id = %event.reporter_id,
            report_count = event.report_count,
            status = %event.moderation_status,
            escalated = event.escalated,
            "Listing reported"
        );
        Ok(())
    }
}

/// Stores report events in the admin notification inbox
pub struct MongoNotifier {
    collection: MongoCollection<NotificationDoc>,
}

impl MongoNotifier {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        let collection = mongo
            .collection::<NotificationDoc>(NOTIFICATION_COLLECTION)
            .await?;
        Ok(Self { collection })
    }
}

impl From<&ReportEvent> for NotificationDoc {
    fn from(event: &ReportEvent) -> Self {
        NotificationDoc {
            recipient_role: "admin".to_string(),
            kind: "listing_reported".to_string(),
            listing_id: event.listing_id.clone(),
            reporter_id: event.reporter_id.clone(),
            reason: event.reason.clone(),
            report_count: event.report_count,
            escalated: event.escalated,
            read: false,
            ..Default::default()
        }
    }
}

#[async_trait]
impl AdminNotifier for MongoNotifier {
    fn name(&self) -> &'static str {
        "mongo"
    }

    async fn notify(&self, event: &ReportEvent) -> Result<()> {
        self.collection.insert_one(NotificationDoc::from(event)).await?;
        Ok(())
    }
}
