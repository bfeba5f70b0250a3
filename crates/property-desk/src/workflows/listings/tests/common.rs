use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::{HeaderValue, Request};
use axum::response::Response;
use serde_json::Value;

use crate::workflows::access::{ActorContext, Role, UserId, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
use crate::workflows::error::RepositoryError;
use crate::workflows::listings::domain::{
    ListingFields, ListingId, ListingPurpose, ListingRecord, ListingStatus, PropertyType,
};
use crate::workflows::listings::gallery::{
    MediaId, MediaItem, ObjectStore, PublicBucketUrls, SortOrderUpdate,
};
use crate::workflows::listings::repository::{ListingRepository, MediaRepository};
use crate::workflows::listings::{ListingGalleryService, ListingLifecycleService};

pub(super) fn agent() -> ActorContext {
    ActorContext::new("agent-1", Role::Agent)
}

pub(super) fn other_agent() -> ActorContext {
    ActorContext::new("agent-2", Role::Agent)
}

pub(super) fn admin() -> ActorContext {
    ActorContext::new("admin-1", Role::Admin)
}

pub(super) fn buyer() -> ActorContext {
    ActorContext::new("buyer-1", Role::Buyer)
}

pub(super) fn draft_fields() -> ListingFields {
    ListingFields {
        purpose: ListingPurpose::Rent,
        property_type: PropertyType::Apartment,
        title: "Sea view apartment".to_string(),
        price: Some(4_500),
        bedrooms: Some(2),
        ..ListingFields::default()
    }
}

pub(super) fn complete_fields() -> ListingFields {
    ListingFields {
        city: Some("Jeddah".to_string()),
        district: Some("Al Shati".to_string()),
        description: Some("Furnished, two balconies".to_string()),
        ..draft_fields()
    }
}

pub(super) fn edited_fields() -> ListingFields {
    ListingFields {
        title: "Sea view apartment, renovated".to_string(),
        price: Some(5_200),
        ..complete_fields()
    }
}

pub(super) fn build_service() -> (ListingLifecycleService<MemoryListings>, Arc<MemoryListings>) {
    let repository = Arc::new(MemoryListings::default());
    (ListingLifecycleService::new(repository.clone()), repository)
}

pub(super) fn build_gallery() -> (
    ListingLifecycleService<MemoryListings>,
    ListingGalleryService<MemoryListings, MemoryMedia>,
    Arc<MemoryMedia>,
) {
    let listings = Arc::new(MemoryListings::default());
    let media = Arc::new(MemoryMedia::default());
    let urls = Arc::new(PublicBucketUrls::new(
        "https://cdn.example.sa/storage",
        "property-media",
    ));
    (
        ListingLifecycleService::new(listings.clone()),
        ListingGalleryService::new(listings, media.clone(), urls, media.clone()),
        media,
    )
}

/// Create, submit and approve a listing so it is live with `complete_fields`.
pub(super) fn published_listing(
    service: &ListingLifecycleService<impl ListingRepository + 'static>,
) -> ListingRecord {
    let draft = service
        .create_draft(&agent(), draft_fields())
        .expect("draft created");
    service
        .submit_for_approval(&agent(), &draft.id, complete_fields())
        .expect("submitted");
    service.approve(&admin(), &draft.id).expect("approved")
}

#[derive(Default, Clone)]
pub(super) struct MemoryListings {
    pub(super) records: Arc<Mutex<HashMap<ListingId, ListingRecord>>>,
}

impl MemoryListings {
    pub(super) fn stored(&self, id: &ListingId) -> ListingRecord {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
            .expect("record stored")
    }

    fn sorted(&self, keep: impl Fn(&ListingRecord) -> bool) -> Vec<ListingRecord> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<ListingRecord> =
            guard.values().filter(|record| keep(record)).cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}

impl ListingRepository for MemoryListings {
    fn insert(&self, record: ListingRecord) -> Result<ListingRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) || guard.values().any(|row| row.slug == record.slug) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(
        &self,
        mut record: ListingRecord,
        expected_revision: u64,
    ) -> Result<ListingRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let current = guard.get(&record.id).ok_or(RepositoryError::NotFound)?;
        if current.revision != expected_revision {
            return Err(RepositoryError::Stale);
        }
        record.revision = expected_revision + 1;
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ListingId) -> Result<Option<ListingRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_by_slug(&self, slug: &str) -> Result<Option<ListingRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().find(|record| record.slug == slug).cloned())
    }

    fn by_status(
        &self,
        status: ListingStatus,
        limit: usize,
    ) -> Result<Vec<ListingRecord>, RepositoryError> {
        let mut records = self.sorted(|record| record.status() == status);
        records.truncate(limit);
        Ok(records)
    }

    fn by_owner(&self, owner: &UserId) -> Result<Vec<ListingRecord>, RepositoryError> {
        Ok(self.sorted(|record| &record.listed_by_user_id == owner))
    }

    fn delete_cascade(&self, id: &ListingId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

/// Slug index that reports a collision for the first `collisions` inserts.
#[derive(Default)]
pub(super) struct CollidingListings {
    pub(super) inner: MemoryListings,
    pub(super) collisions: Mutex<usize>,
}

impl CollidingListings {
    pub(super) fn new(collisions: usize) -> Self {
        Self {
            inner: MemoryListings::default(),
            collisions: Mutex::new(collisions),
        }
    }
}

impl ListingRepository for CollidingListings {
    fn insert(&self, record: ListingRecord) -> Result<ListingRecord, RepositoryError> {
        let mut remaining = self.collisions.lock().expect("collision mutex poisoned");
        if *remaining > 0 {
            *remaining -= 1;
            return Err(RepositoryError::Conflict);
        }
        self.inner.insert(record)
    }

    fn update(
        &self,
        record: ListingRecord,
        expected_revision: u64,
    ) -> Result<ListingRecord, RepositoryError> {
        self.inner.update(record, expected_revision)
    }

    fn fetch(&self, id: &ListingId) -> Result<Option<ListingRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn fetch_by_slug(&self, slug: &str) -> Result<Option<ListingRecord>, RepositoryError> {
        self.inner.fetch_by_slug(slug)
    }

    fn by_status(
        &self,
        status: ListingStatus,
        limit: usize,
    ) -> Result<Vec<ListingRecord>, RepositoryError> {
        self.inner.by_status(status, limit)
    }

    fn by_owner(&self, owner: &UserId) -> Result<Vec<ListingRecord>, RepositoryError> {
        self.inner.by_owner(owner)
    }

    fn delete_cascade(&self, id: &ListingId) -> Result<(), RepositoryError> {
        self.inner.delete_cascade(id)
    }
}

/// Commits a competing write right before the first update it receives.
#[derive(Default)]
pub(super) struct RacingListings {
    pub(super) inner: MemoryListings,
    raced: AtomicBool,
}

impl ListingRepository for RacingListings {
    fn insert(&self, record: ListingRecord) -> Result<ListingRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(
        &self,
        record: ListingRecord,
        expected_revision: u64,
    ) -> Result<ListingRecord, RepositoryError> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            let competing = self.inner.stored(&record.id);
            self.inner.update(competing, expected_revision)?;
        }
        self.inner.update(record, expected_revision)
    }

    fn fetch(&self, id: &ListingId) -> Result<Option<ListingRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn fetch_by_slug(&self, slug: &str) -> Result<Option<ListingRecord>, RepositoryError> {
        self.inner.fetch_by_slug(slug)
    }

    fn by_status(
        &self,
        status: ListingStatus,
        limit: usize,
    ) -> Result<Vec<ListingRecord>, RepositoryError> {
        self.inner.by_status(status, limit)
    }

    fn by_owner(&self, owner: &UserId) -> Result<Vec<ListingRecord>, RepositoryError> {
        self.inner.by_owner(owner)
    }

    fn delete_cascade(&self, id: &ListingId) -> Result<(), RepositoryError> {
        self.inner.delete_cascade(id)
    }
}

pub(super) struct UnavailableListings;

impl ListingRepository for UnavailableListings {
    fn insert(&self, _record: ListingRecord) -> Result<ListingRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(
        &self,
        _record: ListingRecord,
        _expected_revision: u64,
    ) -> Result<ListingRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ListingId) -> Result<Option<ListingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_by_slug(&self, _slug: &str) -> Result<Option<ListingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn by_status(
        &self,
        _status: ListingStatus,
        _limit: usize,
    ) -> Result<Vec<ListingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn by_owner(&self, _owner: &UserId) -> Result<Vec<ListingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_cascade(&self, _id: &ListingId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Media rows plus the object paths the gallery asked the store to delete.
#[derive(Default, Clone)]
pub(super) struct MemoryMedia {
    items: Arc<Mutex<HashMap<MediaId, MediaItem>>>,
    pub(super) removed_paths: Arc<Mutex<Vec<String>>>,
}

impl ObjectStore for MemoryMedia {
    fn remove_object(&self, path: &str) -> Result<(), RepositoryError> {
        self.removed_paths
            .lock()
            .expect("object mutex poisoned")
            .push(path.to_string());
        Ok(())
    }
}

impl MediaRepository for MemoryMedia {
    fn list(&self, listing_id: &ListingId) -> Result<Vec<MediaItem>, RepositoryError> {
        let guard = self.items.lock().expect("media mutex poisoned");
        Ok(guard
            .values()
            .filter(|item| &item.listing_id == listing_id)
            .cloned()
            .collect())
    }

    fn insert(&self, item: MediaItem) -> Result<MediaItem, RepositoryError> {
        let mut guard = self.items.lock().expect("media mutex poisoned");
        guard.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    fn fetch(&self, id: &MediaId) -> Result<Option<MediaItem>, RepositoryError> {
        let guard = self.items.lock().expect("media mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn apply_sort_orders(&self, updates: &[SortOrderUpdate]) -> Result<(), RepositoryError> {
        let mut guard = self.items.lock().expect("media mutex poisoned");
        for update in updates {
            let item = guard
                .get_mut(&update.media_id)
                .ok_or(RepositoryError::NotFound)?;
            item.sort_order = update.sort_order;
        }
        Ok(())
    }

    fn remove(&self, id: &MediaId) -> Result<(), RepositoryError> {
        let mut guard = self.items.lock().expect("media mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

pub(super) fn with_actor<B>(mut request: Request<B>, actor: &ActorContext) -> Request<B> {
    let headers = request.headers_mut();
    headers.insert(
        ACTOR_ID_HEADER,
        HeaderValue::from_str(&actor.id.0).expect("header value"),
    );
    headers.insert(
        ACTOR_ROLE_HEADER,
        HeaderValue::from_static(actor.role.label()),
    );
    request
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
