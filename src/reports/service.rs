//! User report submission

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::schemas::{ModerationStatus, ReportEntry};
use crate::notify::{AdminNotifier, ReportEvent};
use crate::store::{AppendOutcome, ListingStore};
use crate::types::{ModerationError, Result};

/// Records user reports and notifies admins
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn ListingStore>,
    notifier: Arc<dyn AdminNotifier>,
}

impl ReportService {
    pub fn new(store: Arc<dyn ListingStore>, notifier: Arc<dyn AdminNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Record `reporter_id`'s report against a listing.
    ///
    /// Fails with `Validation` for a blank reason or reporter, `NotFound` for
    /// an unknown listing and `Conflict` when the reporter already reported
    /// it. Nothing is written on failure. Escalation to `Flagged` happens in
    /// the same store update as the append.
    pub async fn submit_report(
        &self,
        listing_id: &str,
        reporter_id: &str,
        reason: &str,
    ) -> Result<ReportEntry> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ModerationError::Validation("reason is required".into()));
        }
        let reporter_id = reporter_id.trim();
        if reporter_id.is_empty() {
            return Err(ModerationError::Validation("reporter is required".into()));
        }

        let entry = ReportEntry::new(reporter_id, reason);
        let (previous_status, listing) =
            match self.store.append_report(listing_id, entry.clone()).await? {
                AppendOutcome::Appended {
                    previous_status,
                    listing,
                } => (previous_status, listing),
                AppendOutcome::DuplicateReporter => {
                    return Err(ModerationError::Conflict(format!(
                        "listing {} already reported by {}",
                        listing_id, reporter_id
                    )))
                }
                AppendOutcome::ListingMissing => {
                    return Err(ModerationError::NotFound(format!("listing {}", listing_id)))
                }
            };

        let escalated = listing.moderation_status == ModerationStatus::Flagged
            && previous_status != ModerationStatus::Flagged;

        if escalated {
            warn!(
                "Listing {} flagged after {} reports",
                listing_id, listing.report_count
            );
        } else {
            info!(
                "Report on listing {} by {} recorded ({} total)",
                listing_id, reporter_id, listing.report_count
            );
        }

        let event = ReportEvent {
            listing_id: listing_id.to_string(),
            reporter_id: reporter_id.to_string(),
            reason: reason.to_string(),
            report_count: listing.report_count,
            moderation_status: listing.moderation_status,
            escalated,
            occurred_at: Utc::now(),
        };

        if let Err(e) = self.notifier.notify(&event).await {
            warn!(
                "Admin notification via {} failed for listing {}: {}",
                self.notifier.name(),
                listing_id,
                e
            );
        }

        // The stored entry is the one we built; return it as recorded
        Ok(listing
            .reports
            .into_iter()
            .rev()
            .find(|r| r.reporter_id == reporter_id)
            .unwrap_or(entry))
    }
}
