//! Listing persistence seam
//!
//! `ListingStore` lets the services run against MongoDB in production and an
//! in-process map in dev mode and tests. Implementations must make
//! `append_report` atomic per listing: the duplicate check, the append, the
//! counter increment and the escalation rule land together or not at all.

pub mod memory;

use async_trait::async_trait;

use crate::db::schemas::{ListingDoc, ModerationStatus, ReportEntry};
use crate::reports::escalated_status;
use crate::types::Result;

pub use memory::InMemoryListingStore;

/// Result of trying to record a report
#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    /// Report recorded
    Appended {
        /// Status the listing had right before this report
        previous_status: ModerationStatus,
        /// Listing as stored afterwards
        listing: ListingDoc,
    },
    /// The reporter already has a report on this listing; nothing written
    DuplicateReporter,
    /// No such listing; nothing written
    ListingMissing,
}

#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Persist a new listing and return it with its id assigned
    async fn insert_listing(&self, listing: ListingDoc) -> Result<ListingDoc>;

    async fn get_listing(&self, id: &str) -> Result<Option<ListingDoc>>;

    /// Replace title and description; moderation fields are left alone
    async fn update_text(
        &self,
        id: &str,
        title: String,
        description: String,
    ) -> Result<Option<ListingDoc>>;

    /// Moderator override of the status
    async fn set_status(&self, id: &str, status: ModerationStatus) -> Result<Option<ListingDoc>>;

    async fn list_by_status(&self, status: ModerationStatus) -> Result<Vec<ListingDoc>>;

    /// Record a report and apply escalation in one atomic step
    async fn append_report(&self, id: &str, entry: ReportEntry) -> Result<AppendOutcome>;
}

/// Append `entry` to `listing`, bump the counter and apply escalation.
///
/// Returns the status the listing had before. Stores call this on the
/// pre-update document they hold inside their atomic step.
pub(crate) fn apply_report(listing: &mut ListingDoc, entry: ReportEntry) -> ModerationStatus {
    let previous = listing.moderation_status;
    listing.metadata.updated_at = Some(entry.created_at);
    listing.reports.push(entry);
    listing.report_count += 1;
    listing.moderation_status = escalated_status(previous, listing.report_count);
    previous
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_with_reports(status: ModerationStatus, reporters: &[&str]) -> ListingDoc {
        let mut listing = ListingDoc::new("owner".into(), "Loft".into(), "Bright".into());
        listing.moderation_status = status;
        for reporter in reporters {
            listing.reports.push(ReportEntry::new(*reporter, "spam"));
        }
        listing.report_count = reporters.len() as i32;
        listing
    }

    #[test]
    fn test_apply_report_returns_previous_status() {
        let mut listing = listing_with_reports(ModerationStatus::Approved, &["u1", "u2"]);

        let previous = apply_report(&mut listing, ReportEntry::new("u3", "spam"));
        assert_eq!(previous, ModerationStatus::Approved);
        assert_eq!(listing.moderation_status, ModerationStatus::Flagged);
        assert_eq!(listing.report_count, 3);
        assert_eq!(listing.reports.len(), 3);
        assert_eq!(listing.metadata.updated_at, Some(listing.reports[2].created_at));
    }

    #[test]
    fn test_apply_report_below_threshold_keeps_status() {
        let mut listing = listing_with_reports(ModerationStatus::Pending, &["u1"]);

        let previous = apply_report(&mut listing, ReportEntry::new("u2", "spam"));
        assert_eq!(previous, ModerationStatus::Pending);
        assert_eq!(listing.moderation_status, ModerationStatus::Pending);
        assert_eq!(listing.report_count, 2);
    }

    #[test]
    fn test_apply_report_leaves_rejected() {
        let mut listing = listing_with_reports(ModerationStatus::Rejected, &["u1", "u2", "u3"]);

        let previous = apply_report(&mut listing, ReportEntry::new("u4", "spam"));
        assert_eq!(previous, ModerationStatus::Rejected);
        assert_eq!(listing.moderation_status, ModerationStatus::Rejected);
        assert_eq!(listing.report_count, 4);
    }
}
