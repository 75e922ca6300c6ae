//! Database schemas
//!
//! MongoDB document structures for listings and admin notifications.

mod listing;
mod metadata;
mod notification;

pub use listing::{ListingDoc, ModerationStatus, ReportEntry, LISTING_COLLECTION};
pub use metadata::Metadata;
pub use notification::{NotificationDoc, NOTIFICATION_COLLECTION};
