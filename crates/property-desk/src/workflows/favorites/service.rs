use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{Favorite, FavoriteState};
use super::repository::FavoriteRepository;
use crate::workflows::access::ActorContext;
use crate::workflows::error::{RepositoryError, WorkflowError};
use crate::workflows::listings::domain::{ListingId, PublicListingView};
use crate::workflows::listings::repository::ListingRepository;

/// Service behind the heart button and the favorites page.
pub struct FavoritesService<F, P> {
    favorites: Arc<F>,
    listings: Arc<P>,
}

impl<F, P> FavoritesService<F, P>
where
    F: FavoriteRepository + 'static,
    P: ListingRepository + 'static,
{
    pub fn new(favorites: Arc<F>, listings: Arc<P>) -> Self {
        Self {
            favorites,
            listings,
        }
    }

    pub fn state(
        &self,
        actor: &ActorContext,
        listing_id: &ListingId,
    ) -> Result<FavoriteState, WorkflowError> {
        let favorited = self.favorites.contains(&actor.id, listing_id)?;
        Ok(FavoriteState { favorited })
    }

    /// Flip the caller's saved flag for a listing.
    ///
    /// Unsaving always works; saving requires the listing to be publicly visible.
    pub fn toggle(
        &self,
        actor: &ActorContext,
        listing_id: &ListingId,
    ) -> Result<FavoriteState, WorkflowError> {
        if self.favorites.remove(&actor.id, listing_id)? {
            info!(listing_id = %listing_id, user_id = %actor.id, "favorite removed");
            return Ok(FavoriteState { favorited: false });
        }

        let listing = self
            .listings
            .fetch(listing_id)?
            .filter(|listing| listing.is_publicly_visible())
            .ok_or(RepositoryError::NotFound)?;
        match self.favorites.add(Favorite {
            user_id: actor.id.clone(),
            listing_id: listing.id.clone(),
            created_at: Utc::now(),
        }) {
            Ok(()) | Err(RepositoryError::Conflict) => {}
            Err(error) => return Err(error.into()),
        }
        info!(listing_id = %listing_id, user_id = %actor.id, "favorite added");
        Ok(FavoriteState { favorited: true })
    }

    /// Saved listings that are still public, most recently saved first.
    pub fn favorites(&self, actor: &ActorContext) -> Result<Vec<PublicListingView>, WorkflowError> {
        let mut views = Vec::new();
        for favorite in self.favorites.for_user(&actor.id)? {
            if let Some(listing) = self.listings.fetch(&favorite.listing_id)? {
                if listing.is_publicly_visible() {
                    views.push(listing.public_view());
                }
            }
        }
        Ok(views)
    }
}
