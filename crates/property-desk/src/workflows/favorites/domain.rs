use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::access::UserId;
use crate::workflows::listings::domain::ListingId;

/// One row of the `favorites` table; a user saves a listing at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub user_id: UserId,
    pub listing_id: ListingId,
    pub created_at: DateTime<Utc>,
}

/// Whether the caller currently has the listing saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FavoriteState {
    pub favorited: bool,
}
