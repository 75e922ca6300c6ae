//! Listing write paths
//!
//! Create and edit run the content scorer and hand the verdict back to the
//! caller. The verdict is advisory: it never blocks the write and never
//! touches the moderation status. Status changes come from moderators
//! (`moderate`) or from report escalation.

use std::sync::Arc;
use tracing::{debug, info};

use crate::db::schemas::{ListingDoc, ModerationStatus};
use crate::moderation::{CombinedVerdict, ContentScorer, ListingText};
use crate::store::ListingStore;
use crate::types::{ModerationError, Result};

#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn ListingStore>,
    scorer: Arc<ContentScorer>,
}

impl ListingService {
    pub fn new(store: Arc<dyn ListingStore>, scorer: Arc<ContentScorer>) -> Self {
        Self { store, scorer }
    }

    pub fn store(&self) -> &Arc<dyn ListingStore> {
        &self.store
    }

    pub fn scorer(&self) -> &ContentScorer {
        &self.scorer
    }

    /// Score text without storing anything
    pub fn check_text(&self, text: &ListingText) -> CombinedVerdict {
        self.scorer.score_listing(text)
    }

    /// Create a `Pending` listing and return it with its advisory verdict
    pub async fn create_listing(
        &self,
        owner_id: &str,
        text: ListingText,
    ) -> Result<(ListingDoc, CombinedVerdict)> {
        let owner_id = owner_id.trim();
        if owner_id.is_empty() {
            return Err(ModerationError::Unauthorized("owner is required".into()));
        }

        let title = text.title.as_deref().unwrap_or("").trim().to_string();
        if title.is_empty() {
            return Err(ModerationError::Validation("title is required".into()));
        }
        let description = text.description.as_deref().unwrap_or("").trim().to_string();

        let verdict = self.scorer.score_listing(&text);
        let listing = self
            .store
            .insert_listing(ListingDoc::new(owner_id.to_string(), title, description))
            .await?;

        info!(
            "Listing {} created by {} (score {}, flagged {})",
            listing.id_hex().unwrap_or_default(),
            owner_id,
            verdict.moderation_score,
            verdict.flagged
        );

        Ok((listing, verdict))
    }

    /// Edit title and/or description. Absent fields keep their stored value.
    pub async fn update_listing(
        &self,
        id: &str,
        editor_id: &str,
        text: ListingText,
    ) -> Result<(ListingDoc, CombinedVerdict)> {
        let editor_id = editor_id.trim();
        if editor_id.is_empty() {
            return Err(ModerationError::Unauthorized("editor is required".into()));
        }

        let existing = self.get_listing(id).await?;
        if existing.owner_id != editor_id {
            return Err(ModerationError::Forbidden(format!(
                "only the owner may edit listing {}",
                id
            )));
        }

        let title = match text.title {
            Some(t) if t.trim().is_empty() => {
                return Err(ModerationError::Validation("title cannot be empty".into()))
            }
            Some(t) => t.trim().to_string(),
            None => existing.title,
        };
        let description = text
            .description
            .map(|d| d.trim().to_string())
            .unwrap_or(existing.description);

        let merged = ListingText::new(title.clone(), description.clone());
        let verdict = self.scorer.score_listing(&merged);

        let listing = self
            .store
            .update_text(id, title, description)
            .await?
            .ok_or_else(|| ModerationError::NotFound(format!("listing {}", id)))?;

        debug!(
            "Listing {} edited (score {}, flagged {})",
            id, verdict.moderation_score, verdict.flagged
        );

        Ok((listing, verdict))
    }

    pub async fn get_listing(&self, id: &str) -> Result<ListingDoc> {
        self.store
            .get_listing(id)
            .await?
            .ok_or_else(|| ModerationError::NotFound(format!("listing {}", id)))
    }

    /// Moderator decision; the only way a listing leaves `Flagged`
    pub async fn moderate(&self, id: &str, status: ModerationStatus) -> Result<ListingDoc> {
        let listing = self
            .store
            .set_status(id, status)
            .await?
            .ok_or_else(|| ModerationError::NotFound(format!("listing {}", id)))?;

        info!("Listing {} moderated to {}", id, status);
        Ok(listing)
    }

    /// Listings currently flagged for review
    pub async fn moderation_queue(&self) -> Result<Vec<ListingDoc>> {
        self.store.list_by_status(ModerationStatus::Flagged).await
    }
}
