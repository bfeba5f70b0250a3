use super::domain::Favorite;
use crate::workflows::access::UserId;
use crate::workflows::error::RepositoryError;
use crate::workflows::listings::domain::ListingId;

/// Storage abstraction over the `favorites` table, keyed by `(user_id, listing_id)`.
pub trait FavoriteRepository: Send + Sync {
    fn contains(&self, user: &UserId, listing_id: &ListingId) -> Result<bool, RepositoryError>;

    /// Save a listing. A pair that is already present is reported as [`RepositoryError::Conflict`].
    fn add(&self, favorite: Favorite) -> Result<(), RepositoryError>;

    /// Returns `false` when the pair was not stored.
    fn remove(&self, user: &UserId, listing_id: &ListingId) -> Result<bool, RepositoryError>;

    /// A user's favorites, newest first.
    fn for_user(&self, user: &UserId) -> Result<Vec<Favorite>, RepositoryError>;
}
