use super::domain::{ListingId, ListingRecord, ListingStatus};
use super::gallery::{MediaId, MediaItem, SortOrderUpdate};
use crate::workflows::access::UserId;
use crate::workflows::error::RepositoryError;

/// Storage abstraction over the `properties` table so the service can be exercised in isolation.
pub trait ListingRepository: Send + Sync {
    /// Insert a new row. Slug collisions are reported as [`RepositoryError::Conflict`].
    fn insert(&self, record: ListingRecord) -> Result<ListingRecord, RepositoryError>;

    /// Replace a row only if its stored revision still equals `expected_revision`.
    ///
    /// Returns the stored record with the revision bumped, or [`RepositoryError::Stale`] when
    /// someone else committed in between.
    fn update(
        &self,
        record: ListingRecord,
        expected_revision: u64,
    ) -> Result<ListingRecord, RepositoryError>;

    fn fetch(&self, id: &ListingId) -> Result<Option<ListingRecord>, RepositoryError>;

    fn fetch_by_slug(&self, slug: &str) -> Result<Option<ListingRecord>, RepositoryError>;

    /// Listings in one status, newest first.
    fn by_status(
        &self,
        status: ListingStatus,
        limit: usize,
    ) -> Result<Vec<ListingRecord>, RepositoryError>;

    /// Listings owned by one user, newest first.
    fn by_owner(&self, owner: &UserId) -> Result<Vec<ListingRecord>, RepositoryError>;

    /// Transactional delete of a listing with its media, leads and favorites.
    fn delete_cascade(&self, id: &ListingId) -> Result<(), RepositoryError>;
}

/// Storage abstraction over the `property_media` table.
pub trait MediaRepository: Send + Sync {
    fn list(&self, listing_id: &ListingId) -> Result<Vec<MediaItem>, RepositoryError>;
    fn insert(&self, item: MediaItem) -> Result<MediaItem, RepositoryError>;
    fn fetch(&self, id: &MediaId) -> Result<Option<MediaItem>, RepositoryError>;
    fn apply_sort_orders(&self, updates: &[SortOrderUpdate]) -> Result<(), RepositoryError>;
    fn remove(&self, id: &MediaId) -> Result<(), RepositoryError>;
}
