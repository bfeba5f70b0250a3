//! Transitions of the listing publish lifecycle.
//!
//! Every function here is pure: it receives the record as read, returns the record to write,
//! and leaves persistence (and the revision check that makes read-then-write atomic) to the
//! service.

use chrono::{DateTime, Utc};

use super::domain::{
    ListingFields, ListingRecord, ListingSnapshot, ListingState, ListingStatus, ReviewStamp,
};
use crate::workflows::access::{ActorContext, UserId};
use crate::workflows::error::{AuthorizationError, PreconditionError, ValidationError};

pub const DEFAULT_REJECTION_REASON: &str = "Not specified";

/// Fields required to create a draft at all.
pub fn validate_draft(fields: &ListingFields) -> Result<(), ValidationError> {
    if fields.title.trim().is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    if !matches!(fields.price, Some(price) if price > 0) {
        return Err(ValidationError::InvalidPrice);
    }
    Ok(())
}

/// Fields required before a listing can go to review.
pub fn validate_for_submission(fields: &ListingFields) -> Result<(), ValidationError> {
    validate_draft(fields)?;
    if fields
        .city
        .as_deref()
        .map_or(true, |city| city.trim().is_empty())
    {
        return Err(ValidationError::MissingCity);
    }
    Ok(())
}

/// Owner edit from the dashboard.
///
/// Published content is never touched: the edit is staged and the listing goes back to review.
/// While such an edit is already under review, saving again replaces the staged copy. Any
/// other state writes the live columns directly.
pub fn save_edits(
    mut record: ListingRecord,
    edit: ListingFields,
    now: DateTime<Utc>,
) -> ListingRecord {
    let edit = edit.normalized();

    record.state = match record.state {
        ListingState::Published | ListingState::PendingEdit { .. } => {
            ListingState::PendingEdit { staged: edit }
        }
        ListingState::PendingNew => {
            record.fields = edit;
            ListingState::PendingNew
        }
        ListingState::Draft | ListingState::Rejected { .. } => {
            record.fields = edit;
            ListingState::Draft
        }
    };
    record.updated_at = now;
    record
}

/// Send a draft, rejected or pending listing to admin review.
///
/// Changes land on the live columns and only await sign-off, unlike the staged path taken by
/// edits to published content.
pub fn submit_for_approval(
    mut record: ListingRecord,
    edit: ListingFields,
    now: DateTime<Utc>,
) -> Result<ListingRecord, SubmitError> {
    let edit = edit.normalized();

    if record.state == ListingState::Published {
        return Err(PreconditionError::SubmitNotAllowed {
            status: ListingStatus::Published,
        }
        .into());
    }
    validate_for_submission(&edit)?;

    record.state = match record.state {
        ListingState::PendingEdit { .. } => ListingState::PendingEdit { staged: edit },
        _ => {
            record.fields = edit;
            ListingState::PendingNew
        }
    };
    record.updated_at = now;
    Ok(record)
}

/// Error returned by [`submit_for_approval`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}

/// Content that was public right before an approval lands.
///
/// A listing that was never published had nothing public, so its snapshot is empty.
pub fn pre_approval_snapshot(record: &ListingRecord) -> ListingSnapshot {
    if record.published_at.is_some() {
        record.fields.to_snapshot()
    } else {
        ListingSnapshot::default()
    }
}

/// Admin approval of a pending listing: snapshot, merge staged changes, publish.
pub fn approve(
    mut record: ListingRecord,
    reviewer: &UserId,
    now: DateTime<Utc>,
) -> Result<ListingRecord, PreconditionError> {
    let staged = match record.state {
        ListingState::PendingNew => None,
        ListingState::PendingEdit { ref staged } => Some(staged.clone()),
        ref other => {
            return Err(PreconditionError::NotPending {
                status: other.status(),
            })
        }
    };

    let snapshot = pre_approval_snapshot(&record);
    if let Some(staged) = staged {
        record.fields = staged;
    }

    record.state = ListingState::Published;
    record.last_published_snapshot = Some(snapshot);
    record.published_at = Some(now);
    record.review = Some(ReviewStamp {
        reviewed_at: now,
        reviewed_by: reviewer.clone(),
    });
    record.updated_at = now;
    Ok(record)
}

/// Admin rejection of a pending listing. Staged changes are kept so the owner can resume them.
pub fn reject(
    mut record: ListingRecord,
    reviewer: &UserId,
    reason: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ListingRecord, PreconditionError> {
    let staged = match record.state {
        ListingState::PendingNew => None,
        ListingState::PendingEdit { ref staged } => Some(staged.clone()),
        ref other => {
            return Err(PreconditionError::NotPending {
                status: other.status(),
            })
        }
    };

    let reason = reason
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .unwrap_or(DEFAULT_REJECTION_REASON)
        .to_string();

    record.state = ListingState::Rejected { staged, reason };
    record.review = Some(ReviewStamp {
        reviewed_at: now,
        reviewed_by: reviewer.clone(),
    });
    record.updated_at = now;
    Ok(record)
}

/// Owners may delete only listings that never reached (or were bounced from) review; admins
/// may delete anything.
pub fn authorize_delete(
    actor: &ActorContext,
    record: &ListingRecord,
) -> Result<(), AuthorizationError> {
    actor.require_owner_or_admin(&record.listed_by_user_id)?;
    if actor.is_admin() {
        return Ok(());
    }
    match record.status() {
        ListingStatus::Draft | ListingStatus::Rejected => Ok(()),
        status => Err(AuthorizationError::DeleteNotAllowed { status }),
    }
}
