//! MongoDB-backed listing store
//!
//! Report submission is one `find_one_and_update`: the filter skips listings
//! that already hold a report from the same user, and an aggregation
//! pipeline appends the entry, bumps the counter and then re-evaluates the
//! escalation rule against the new count. The server applies all of it to
//! the single document atomically and hands back the pre-update document,
//! which is replayed locally to produce the stored result.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use mongodb::options::ReturnDocument;
use tracing::debug;

use crate::db::mongo::{MongoClient, MongoCollection};
use crate::db::schemas::{ListingDoc, ModerationStatus, ReportEntry, LISTING_COLLECTION};
use crate::reports::REPORT_ESCALATION_THRESHOLD;
use crate::store::{apply_report, AppendOutcome, ListingStore};
use crate::types::{ModerationError, Result};

#[derive(Clone)]
pub struct MongoListingStore {
    collection: MongoCollection<ListingDoc>,
}

impl MongoListingStore {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        let collection = mongo.collection::<ListingDoc>(LISTING_COLLECTION).await?;
        Ok(Self { collection })
    }
}

/// Parse a hex id; malformed ids simply match nothing
fn id_filter(id: &str) -> Option<Document> {
    ObjectId::parse_str(id).ok().map(|oid| doc! { "_id": oid })
}

/// Pipeline that records `entry` and applies the escalation rule
pub(crate) fn report_pipeline(entry: &ReportEntry) -> Vec<Document> {
    // User text goes through $literal so it is never read as a field path
    let new_entry = doc! {
        "reporter_id": { "$literal": entry.reporter_id.as_str() },
        "reason": { "$literal": entry.reason.as_str() },
        "created_at": entry.created_at,
    };

    vec![
        doc! {
            "$set": {
                "reports": {
                    "$concatArrays": [ { "$ifNull": ["$reports", []] }, [new_entry] ]
                },
                "report_count": { "$add": [ { "$ifNull": ["$report_count", 0] }, 1 ] },
                "metadata.updated_at": entry.created_at,
            }
        },
        doc! {
            "$set": {
                "moderation_status": {
                    "$cond": {
                        "if": {
                            "$and": [
                                { "$gte": ["$report_count", REPORT_ESCALATION_THRESHOLD] },
                                { "$ne": ["$moderation_status", ModerationStatus::Rejected.as_str()] },
                            ]
                        },
                        "then": ModerationStatus::Flagged.as_str(),
                        "else": "$moderation_status",
                    }
                }
            }
        },
    ]
}

#[async_trait]
impl ListingStore for MongoListingStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn insert_listing(&self, listing: ListingDoc) -> Result<ListingDoc> {
        let id = self.collection.insert_one(listing).await?;
        self.collection
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| ModerationError::Database(format!("Listing {} vanished after insert", id)))
    }

    async fn get_listing(&self, id: &str) -> Result<Option<ListingDoc>> {
        match id_filter(id) {
            Some(filter) => self.collection.find_one(filter).await,
            None => Ok(None),
        }
    }

    async fn update_text(
        &self,
        id: &str,
        title: String,
        description: String,
    ) -> Result<Option<ListingDoc>> {
        let Some(filter) = id_filter(id) else {
            return Ok(None);
        };

        self.collection
            .find_one_and_update(
                filter,
                doc! {
                    "$set": {
                        "title": title,
                        "description": description,
                        "metadata.updated_at": DateTime::now(),
                    }
                },
                ReturnDocument::After,
            )
            .await
    }

    async fn set_status(&self, id: &str, status: ModerationStatus) -> Result<Option<ListingDoc>> {
        let Some(filter) = id_filter(id) else {
            return Ok(None);
        };

        self.collection
            .find_one_and_update(
                filter,
                doc! {
                    "$set": {
                        "moderation_status": status.as_str(),
                        "metadata.updated_at": DateTime::now(),
                    }
                },
                ReturnDocument::After,
            )
            .await
    }

    async fn list_by_status(&self, status: ModerationStatus) -> Result<Vec<ListingDoc>> {
        self.collection
            .find_many(doc! { "moderation_status": status.as_str() })
            .await
    }

    async fn append_report(&self, id: &str, entry: ReportEntry) -> Result<AppendOutcome> {
        let Some(mut filter) = id_filter(id) else {
            return Ok(AppendOutcome::ListingMissing);
        };
        let by_id = filter.clone();
        filter.insert(
            "reports.reporter_id",
            doc! { "$ne": Bson::String(entry.reporter_id.clone()) },
        );

        let before = self
            .collection
            .find_one_and_update(filter, report_pipeline(&entry), ReturnDocument::Before)
            .await?;

        if let Some(mut listing) = before {
            let previous_status = apply_report(&mut listing, entry);
            return Ok(AppendOutcome::Appended {
                previous_status,
                listing,
            });
        }

        // Nothing matched: either the listing is gone or the reporter is a repeat
        match self.collection.find_one(by_id).await? {
            Some(_) => {
                debug!("Reporter {} already reported listing {}", entry.reporter_id, id);
                Ok(AppendOutcome::DuplicateReporter)
            }
            None => Ok(AppendOutcome::ListingMissing),
        }
    }
}
