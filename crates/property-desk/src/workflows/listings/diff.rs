use serde::Serialize;

use super::domain::{
    FieldValue, ListingField, ListingRecord, ListingSnapshot, ListingState, ListingView,
};

/// One row of the "last published → requested" comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    pub field: ListingField,
    pub label: &'static str,
    pub current: FieldValue,
    pub proposed: FieldValue,
    pub changed: bool,
}

fn current_content(record: &ListingRecord) -> ListingSnapshot {
    let snapshot = record
        .last_published_snapshot
        .as_ref()
        .filter(|snapshot| !snapshot.is_empty());
    match (snapshot, &record.state) {
        (Some(snapshot), _) => snapshot.clone(),
        (None, ListingState::PendingEdit { .. }) => record.fields.to_snapshot(),
        (None, _) => ListingSnapshot::default(),
    }
}

/// Compare the last published snapshot with what the owner is asking to publish.
///
/// `current` comes from the snapshot (empty when the listing was never approved); `proposed`
/// comes from the staged changes, or from the live columns for first-time submissions.
/// A staged edit whose snapshot is empty compares against the live columns, which still hold
/// the published content.
pub fn compute_diff(record: &ListingRecord) -> Vec<FieldDiff> {
    let current = current_content(record);
    let proposed = record.state.pending_changes().unwrap_or(&record.fields);

    ListingField::ordered()
        .into_iter()
        .map(|field| {
            let current = current.get(field);
            let proposed = proposed.value_of(field);
            FieldDiff {
                field,
                label: field.label(),
                changed: current != proposed,
                current,
                proposed,
            }
        })
        .collect()
}

/// Everything the admin review screen needs for one listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListingReview {
    pub listing: ListingView,
    pub has_snapshot: bool,
    pub has_pending_changes: bool,
    pub changes: Vec<FieldDiff>,
}

impl ListingReview {
    pub fn for_record(record: &ListingRecord) -> Self {
        Self {
            listing: record.view(),
            has_snapshot: record.last_published_snapshot.is_some(),
            has_pending_changes: record.state.pending_changes().is_some(),
            changes: compute_diff(record),
        }
    }

    pub fn changed_fields(&self) -> impl Iterator<Item = &FieldDiff> {
        self.changes.iter().filter(|diff| diff.changed)
    }
}
