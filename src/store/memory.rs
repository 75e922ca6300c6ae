//! In-process listing store
//!
//! Backed by a `DashMap` keyed by hex object id. Each mutation runs while
//! holding the entry's shard lock, which gives the same per-listing
//! atomicity the MongoDB store gets from single-document updates.

use async_trait::async_trait;
use bson::oid::ObjectId;
use dashmap::DashMap;
use tracing::debug;

use super::{apply_report, AppendOutcome, ListingStore};
use crate::db::schemas::{ListingDoc, Metadata, ModerationStatus, ReportEntry};
use crate::types::Result;

#[derive(Debug, Default)]
pub struct InMemoryListingStore {
    listings: DashMap<String, ListingDoc>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert_listing(&self, mut listing: ListingDoc) -> Result<ListingDoc> {
        let id = ObjectId::new();
        listing._id = Some(id);
        listing.metadata = Metadata::new();
        self.listings.insert(id.to_hex(), listing.clone());
        debug!("Stored listing {} in memory", id);
        Ok(listing)
    }

    async fn get_listing(&self, id: &str) -> Result<Option<ListingDoc>> {
        Ok(self.listings.get(id).map(|l| l.clone()))
    }

    async fn update_text(
        &self,
        id: &str,
        title: String,
        description: String,
    ) -> Result<Option<ListingDoc>> {
        Ok(self.listings.get_mut(id).map(|mut listing| {
            listing.title = title;
            listing.description = description;
            listing.metadata.touch();
            listing.clone()
        }))
    }

    async fn set_status(&self, id: &str, status: ModerationStatus) -> Result<Option<ListingDoc>> {
        Ok(self.listings.get_mut(id).map(|mut listing| {
            listing.moderation_status = status;
            listing.metadata.touch();
            listing.clone()
        }))
    }

    async fn list_by_status(&self, status: ModerationStatus) -> Result<Vec<ListingDoc>> {
        let mut listings: Vec<ListingDoc> = self
            .listings
            .iter()
            .filter(|l| l.moderation_status == status)
            .map(|l| l.clone())
            .collect();
        listings.sort_by_key(|l| l.metadata.created_at);
        Ok(listings)
    }

    async fn append_report(&self, id: &str, entry: ReportEntry) -> Result<AppendOutcome> {
        let Some(mut listing) = self.listings.get_mut(id) else {
            return Ok(AppendOutcome::ListingMissing);
        };

        if listing.has_report_from(&entry.reporter_id) {
            return Ok(AppendOutcome::DuplicateReporter);
        }

        let previous_status = apply_report(&mut listing, entry);

        Ok(AppendOutcome::Appended {
            previous_status,
            listing: listing.clone(),
        })
    }
}
