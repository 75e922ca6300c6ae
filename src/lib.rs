//! Listing moderation for the property marketplace
//!
//! Two independent pieces:
//!
//! - **Moderation**: scores listing titles and descriptions against a
//!   prohibited-term list and returns an advisory verdict
//! - **Reports**: records one report per user per listing and flags the
//!   listing once enough users have reported it
//!
//! Listings live in MongoDB (or an in-memory store in dev mode); admins are
//! notified of reports through the log, a MongoDB inbox or NATS.

pub mod config;
pub mod db;
pub mod listings;
pub mod logging;
pub mod moderation;
pub mod notify;
pub mod reports;
pub mod routes;
pub mod server;
pub mod store;
pub mod types;

pub use config::Args;
pub use listings::ListingService;
pub use moderation::{CombinedVerdict, ContentScorer, ListingText, TermList, Verdict};
pub use reports::ReportService;
pub use server::{run, AppState};
pub use types::{ModerationError, Result};
