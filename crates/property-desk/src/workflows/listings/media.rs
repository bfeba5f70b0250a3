use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::domain::{ListingId, ListingRecord};
use super::gallery::{
    self, GalleryImage, MediaId, MediaItem, MediaUrlResolver, MoveDirection, ObjectStore,
};
use super::repository::{ListingRepository, MediaRepository};
use crate::workflows::access::ActorContext;
use crate::workflows::error::{RepositoryError, WorkflowError};

/// Gallery management for a listing's images. Mutations need the owner or an admin.
///
/// Anyone may read the gallery of a published listing; other galleries are visible to the
/// owner and admins only.
pub struct ListingGalleryService<R, M> {
    listings: Arc<R>,
    media: Arc<M>,
    urls: Arc<dyn MediaUrlResolver>,
    objects: Arc<dyn ObjectStore>,
}

impl<R, M> ListingGalleryService<R, M>
where
    R: ListingRepository + 'static,
    M: MediaRepository + 'static,
{
    pub fn new(
        listings: Arc<R>,
        media: Arc<M>,
        urls: Arc<dyn MediaUrlResolver>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            listings,
            media,
            urls,
            objects,
        }
    }

    /// Ordered gallery with public URLs; the first entry is the cover.
    pub fn gallery(
        &self,
        actor: Option<&ActorContext>,
        listing_id: &ListingId,
    ) -> Result<Vec<GalleryImage>, WorkflowError> {
        self.visible(actor, listing_id)?;
        self.images(listing_id)
    }

    /// Public URL of the cover image, if the listing has any images.
    pub fn cover_url(
        &self,
        actor: Option<&ActorContext>,
        listing_id: &ListingId,
    ) -> Result<Option<String>, WorkflowError> {
        self.visible(actor, listing_id)?;
        let items = self.media.list(listing_id)?;
        Ok(gallery::cover(&items).map(|item| self.urls.public_url(&item.path)))
    }

    /// Register an uploaded file at the end of the gallery.
    pub fn add_image(
        &self,
        actor: &ActorContext,
        listing_id: &ListingId,
        file_name: &str,
    ) -> Result<MediaItem, WorkflowError> {
        self.authorize(actor, listing_id)?;
        let existing = self.media.list(listing_id)?;

        let item = MediaItem {
            id: MediaId(Uuid::new_v4().to_string()),
            listing_id: listing_id.clone(),
            path: gallery::storage_path(listing_id, file_name),
            sort_order: gallery::next_sort_order(&existing),
            created_at: Utc::now(),
        };
        let stored = self.media.insert(item)?;
        info!(listing_id = %listing_id, path = %stored.path, sort_order = stored.sort_order, "listing image added");
        Ok(stored)
    }

    pub fn set_cover(
        &self,
        actor: &ActorContext,
        media_id: &MediaId,
    ) -> Result<Vec<GalleryImage>, WorkflowError> {
        let (listing_id, items) = self.load_gallery(actor, media_id)?;
        let updates =
            gallery::set_as_cover(&items, media_id).ok_or(RepositoryError::NotFound)?;
        self.media.apply_sort_orders(&updates)?;
        info!(listing_id = %listing_id, media_id = %media_id.0, "listing cover changed");
        self.images(&listing_id)
    }

    /// Swap an image with its neighbour. Moving past either end leaves the gallery unchanged.
    pub fn move_image(
        &self,
        actor: &ActorContext,
        media_id: &MediaId,
        direction: MoveDirection,
    ) -> Result<Vec<GalleryImage>, WorkflowError> {
        let (listing_id, items) = self.load_gallery(actor, media_id)?;
        if let Some(updates) = gallery::move_item(&items, media_id, direction) {
            self.media.apply_sort_orders(&updates)?;
        }
        self.images(&listing_id)
    }

    /// Delete the stored object, then the media row. Remaining images keep their order.
    pub fn remove_image(
        &self,
        actor: &ActorContext,
        media_id: &MediaId,
    ) -> Result<Vec<GalleryImage>, WorkflowError> {
        let item = self
            .media
            .fetch(media_id)?
            .ok_or(RepositoryError::NotFound)?;
        self.authorize(actor, &item.listing_id)?;

        if let Err(err) = self.objects.remove_object(&item.path) {
            warn!(listing_id = %item.listing_id, path = %item.path, error = %err, "listing image object not removed");
            return Err(err.into());
        }
        self.media.remove(media_id)?;
        info!(listing_id = %item.listing_id, media_id = %media_id.0, actor = %actor.id, "listing image removed");
        self.images(&item.listing_id)
    }

    fn images(&self, listing_id: &ListingId) -> Result<Vec<GalleryImage>, WorkflowError> {
        let items = self.media.list(listing_id)?;
        Ok(gallery::gallery_images(&items, self.urls.as_ref()))
    }

    fn visible(
        &self,
        actor: Option<&ActorContext>,
        listing_id: &ListingId,
    ) -> Result<(), WorkflowError> {
        let record = self
            .listings
            .fetch(listing_id)?
            .ok_or(RepositoryError::NotFound)?;
        if record.is_publicly_visible() {
            return Ok(());
        }
        match actor {
            Some(actor) => Ok(actor.require_owner_or_admin(&record.listed_by_user_id)?),
            None => Err(RepositoryError::NotFound.into()),
        }
    }

    fn load_gallery(
        &self,
        actor: &ActorContext,
        media_id: &MediaId,
    ) -> Result<(ListingId, Vec<MediaItem>), WorkflowError> {
        let item = self
            .media
            .fetch(media_id)?
            .ok_or(RepositoryError::NotFound)?;
        self.authorize(actor, &item.listing_id)?;
        let items = self.media.list(&item.listing_id)?;
        Ok((item.listing_id, items))
    }

    fn authorize(
        &self,
        actor: &ActorContext,
        listing_id: &ListingId,
    ) -> Result<ListingRecord, WorkflowError> {
        let record = self
            .listings
            .fetch(listing_id)?
            .ok_or(RepositoryError::NotFound)?;
        actor.require_owner_or_admin(&record.listed_by_user_id)?;
        Ok(record)
    }
}
