use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::diff::ListingReview;
use super::domain::{
    ListingFields, ListingId, ListingRecord, ListingState, ListingStatus, DEFAULT_CURRENCY,
};
use super::lifecycle::{self, SubmitError};
use super::repository::ListingRepository;
use super::slug::listing_slug;
use crate::workflows::access::ActorContext;
use crate::workflows::error::{PreconditionError, RepositoryError, WorkflowError};

const SLUG_ATTEMPTS: usize = 3;
pub const DEFAULT_QUEUE_LIMIT: usize = 100;

/// Service owning the listing publish lifecycle: drafts, edits, review and deletion.
pub struct ListingLifecycleService<R> {
    repository: Arc<R>,
}

impl<R> ListingLifecycleService<R>
where
    R: ListingRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create a draft owned by the calling agent.
    pub fn create_draft(
        &self,
        actor: &ActorContext,
        fields: ListingFields,
    ) -> Result<ListingRecord, WorkflowError> {
        actor.require_agent_or_admin()?;
        let fields = fields.normalized();
        lifecycle::validate_draft(&fields)?;

        let now = Utc::now();
        let mut rng = rand::thread_rng();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let record = ListingRecord {
                id: ListingId(Uuid::new_v4().to_string()),
                slug: listing_slug(&fields.title, &mut rng),
                listed_by_user_id: actor.id.clone(),
                currency: DEFAULT_CURRENCY.to_string(),
                fields: fields.clone(),
                state: ListingState::Draft,
                last_published_snapshot: None,
                published_at: None,
                review: None,
                created_at: now,
                updated_at: now,
                revision: 0,
            };

            match self.repository.insert(record) {
                Ok(stored) => {
                    info!(listing_id = %stored.id, slug = %stored.slug, owner = %actor.id, "listing draft created");
                    return Ok(stored);
                }
                Err(RepositoryError::Conflict) if attempt < SLUG_ATTEMPTS => {
                    warn!(attempt, "listing slug collided; retrying with a new suffix");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Owner or admin fetch of a single listing in any status.
    pub fn get(
        &self,
        actor: &ActorContext,
        listing_id: &ListingId,
    ) -> Result<ListingRecord, WorkflowError> {
        let record = self.load(listing_id)?;
        actor.require_owner_or_admin(&record.listed_by_user_id)?;
        Ok(record)
    }

    /// Save dashboard edits; published listings get their changes staged for review.
    pub fn save_edits(
        &self,
        actor: &ActorContext,
        listing_id: &ListingId,
        fields: ListingFields,
    ) -> Result<ListingRecord, WorkflowError> {
        let record = self.load(listing_id)?;
        actor.require_owner_or_admin(&record.listed_by_user_id)?;

        let from = record.status();
        let revision = record.revision;
        let next = lifecycle::save_edits(record, fields, Utc::now());
        let stored = self.commit(next, revision)?;
        info!(listing_id = %stored.id, %from, to = %stored.status(), actor = %actor.id, staged = stored.state.pending_changes().is_some(), "listing edits saved");
        Ok(stored)
    }

    /// Validate and send a listing to admin review.
    pub fn submit_for_approval(
        &self,
        actor: &ActorContext,
        listing_id: &ListingId,
        fields: ListingFields,
    ) -> Result<ListingRecord, WorkflowError> {
        let record = self.load(listing_id)?;
        actor.require_owner_or_admin(&record.listed_by_user_id)?;

        let from = record.status();
        let revision = record.revision;
        let next = match lifecycle::submit_for_approval(record, fields, Utc::now()) {
            Ok(next) => next,
            Err(err) => {
                warn!(listing_id = %listing_id, %from, error = %err, "listing submission refused");
                return Err(match err {
                    SubmitError::Validation(err) => err.into(),
                    SubmitError::Precondition(err) => err.into(),
                });
            }
        };
        let stored = self.commit(next, revision)?;
        info!(listing_id = %stored.id, %from, to = %stored.status(), actor = %actor.id, "listing submitted for approval");
        Ok(stored)
    }

    /// Publish a pending listing, merging staged changes and recording the prior snapshot.
    ///
    /// The write is conditional on the revision that was read, so two concurrent approvals
    /// cannot both commit.
    pub fn approve(
        &self,
        actor: &ActorContext,
        listing_id: &ListingId,
    ) -> Result<ListingRecord, WorkflowError> {
        actor.require_admin()?;
        let record = self.load(listing_id)?;
        let revision = record.revision;

        let next = lifecycle::approve(record, &actor.id, Utc::now()).map_err(|err| {
            warn!(listing_id = %listing_id, error = %err, "approval refused");
            err
        })?;
        let stored = self.commit(next, revision)?;
        info!(listing_id = %stored.id, slug = %stored.slug, reviewer = %actor.id, "listing published");
        Ok(stored)
    }

    /// Reject a pending listing with an optional reason.
    pub fn reject(
        &self,
        actor: &ActorContext,
        listing_id: &ListingId,
        reason: Option<&str>,
    ) -> Result<ListingRecord, WorkflowError> {
        actor.require_admin()?;
        let record = self.load(listing_id)?;
        let revision = record.revision;

        let next = lifecycle::reject(record, &actor.id, reason, Utc::now()).map_err(|err| {
            warn!(listing_id = %listing_id, error = %err, "rejection refused");
            err
        })?;
        let stored = self.commit(next, revision)?;
        info!(listing_id = %stored.id, reviewer = %actor.id, reason = stored.state.rejection_reason().unwrap_or_default(), "listing rejected");
        Ok(stored)
    }

    /// Snapshot-versus-proposed comparison for the admin review screen.
    pub fn review(
        &self,
        actor: &ActorContext,
        listing_id: &ListingId,
    ) -> Result<ListingReview, WorkflowError> {
        actor.require_admin()?;
        let record = self.load(listing_id)?;
        Ok(ListingReview::for_record(&record))
    }

    /// Admin moderation queue for one status, newest first.
    pub fn review_queue(
        &self,
        actor: &ActorContext,
        status: ListingStatus,
        limit: usize,
    ) -> Result<Vec<ListingRecord>, WorkflowError> {
        actor.require_admin()?;
        Ok(self.repository.by_status(status, limit)?)
    }

    /// The calling agent's own listings, newest first.
    pub fn owned_listings(&self, actor: &ActorContext) -> Result<Vec<ListingRecord>, WorkflowError> {
        actor.require_agent_or_admin()?;
        Ok(self.repository.by_owner(&actor.id)?)
    }

    /// Anonymous read at a slug; anything not published is reported as missing.
    pub fn public_listing(&self, slug: &str) -> Result<ListingRecord, WorkflowError> {
        let record = self
            .repository
            .fetch_by_slug(slug)?
            .filter(ListingRecord::is_publicly_visible)
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Authorize and hand the delete to the store's cascading procedure.
    pub fn delete_listing(
        &self,
        actor: &ActorContext,
        listing_id: &ListingId,
    ) -> Result<(), WorkflowError> {
        let record = self.load(listing_id)?;
        if let Err(err) = lifecycle::authorize_delete(actor, &record) {
            warn!(listing_id = %listing_id, actor = %actor.id, error = %err, "listing delete refused");
            return Err(err.into());
        }

        self.repository.delete_cascade(listing_id)?;
        info!(listing_id = %listing_id, status = %record.status(), actor = %actor.id, "listing deleted");
        Ok(())
    }

    fn load(&self, listing_id: &ListingId) -> Result<ListingRecord, WorkflowError> {
        let record = self
            .repository
            .fetch(listing_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    fn commit(
        &self,
        record: ListingRecord,
        expected_revision: u64,
    ) -> Result<ListingRecord, WorkflowError> {
        let listing_id = record.id.clone();
        match self.repository.update(record, expected_revision) {
            Ok(stored) => Ok(stored),
            Err(RepositoryError::Stale) => {
                warn!(listing_id = %listing_id, expected_revision, "listing changed concurrently");
                Err(PreconditionError::StaleRecord.into())
            }
            Err(err) => {
                warn!(listing_id = %listing_id, error = %err, "listing write failed");
                Err(err.into())
            }
        }
    }
}
