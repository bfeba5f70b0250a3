use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::{HeaderValue, Request};
use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::access::{ActorContext, Role, UserId, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
use crate::workflows::error::RepositoryError;
use crate::workflows::favorites::domain::Favorite;
use crate::workflows::favorites::repository::FavoriteRepository;
use crate::workflows::favorites::service::FavoritesService;
use crate::workflows::listings::domain::{
    AvailabilityStatus, ListingFields, ListingId, ListingRecord, ListingState, ListingStatus,
    DEFAULT_CURRENCY,
};
use crate::workflows::listings::repository::ListingRepository;

pub(super) type MemoryFavoritesService = FavoritesService<MemoryFavorites, MemoryListings>;

pub(super) fn buyer() -> ActorContext {
    ActorContext::new("buyer-1", Role::Buyer)
}

pub(super) fn other_buyer() -> ActorContext {
    ActorContext::new("buyer-2", Role::Buyer)
}

pub(super) fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn listing(id: &str, state: ListingState) -> ListingRecord {
    ListingRecord {
        id: ListingId(id.to_string()),
        slug: format!("{id}-slug"),
        listed_by_user_id: UserId("agent-1".to_string()),
        currency: DEFAULT_CURRENCY.to_string(),
        fields: ListingFields {
            title: format!("Listing {id}"),
            price: Some(1_200_000),
            city: Some("Jeddah".to_string()),
            availability_status: AvailabilityStatus::Available,
            ..ListingFields::default()
        },
        state,
        last_published_snapshot: None,
        published_at: None,
        review: None,
        created_at: at(0),
        updated_at: at(0),
        revision: 1,
    }
}

pub(super) fn build_service(
    records: Vec<ListingRecord>,
) -> (MemoryFavoritesService, Arc<MemoryFavorites>, Arc<MemoryListings>) {
    let favorites = Arc::new(MemoryFavorites::default());
    let listings = Arc::new(MemoryListings::with(records));
    let service = FavoritesService::new(favorites.clone(), listings.clone());
    (service, favorites, listings)
}

/// Favorites keyed by `(user, listing)`; every add gets a strictly later timestamp.
#[derive(Default)]
pub(super) struct MemoryFavorites {
    rows: Mutex<HashMap<(UserId, ListingId), Favorite>>,
    clock: AtomicI64,
}

impl MemoryFavorites {
    pub(super) fn len(&self) -> usize {
        self.rows.lock().expect("favorites mutex poisoned").len()
    }
}

impl FavoriteRepository for MemoryFavorites {
    fn contains(&self, user: &UserId, listing_id: &ListingId) -> Result<bool, RepositoryError> {
        let rows = self.rows.lock().expect("favorites mutex poisoned");
        Ok(rows.contains_key(&(user.clone(), listing_id.clone())))
    }

    fn add(&self, mut favorite: Favorite) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().expect("favorites mutex poisoned");
        let key = (favorite.user_id.clone(), favorite.listing_id.clone());
        if rows.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        let tick = self.clock.fetch_add(1, Ordering::SeqCst);
        favorite.created_at = at(1) + Duration::minutes(tick);
        rows.insert(key, favorite);
        Ok(())
    }

    fn remove(&self, user: &UserId, listing_id: &ListingId) -> Result<bool, RepositoryError> {
        let mut rows = self.rows.lock().expect("favorites mutex poisoned");
        Ok(rows.remove(&(user.clone(), listing_id.clone())).is_some())
    }

    fn for_user(&self, user: &UserId) -> Result<Vec<Favorite>, RepositoryError> {
        let rows = self.rows.lock().expect("favorites mutex poisoned");
        let mut favorites: Vec<Favorite> = rows
            .values()
            .filter(|favorite| &favorite.user_id == user)
            .cloned()
            .collect();
        favorites.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(favorites)
    }
}

/// Listing table whose rows tests can swap out to simulate moderation.
#[derive(Default)]
pub(super) struct MemoryListings {
    records: Mutex<HashMap<ListingId, ListingRecord>>,
}

impl MemoryListings {
    pub(super) fn with(records: Vec<ListingRecord>) -> Self {
        Self {
            records: Mutex::new(
                records
                    .into_iter()
                    .map(|record| (record.id.clone(), record))
                    .collect(),
            ),
        }
    }

    pub(super) fn replace(&self, record: ListingRecord) {
        self.records
            .lock()
            .expect("listings mutex poisoned")
            .insert(record.id.clone(), record);
    }
}

impl ListingRepository for MemoryListings {
    fn insert(&self, record: ListingRecord) -> Result<ListingRecord, RepositoryError> {
        self.replace(record.clone());
        Ok(record)
    }

    fn update(
        &self,
        record: ListingRecord,
        _expected_revision: u64,
    ) -> Result<ListingRecord, RepositoryError> {
        self.replace(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ListingId) -> Result<Option<ListingRecord>, RepositoryError> {
        let records = self.records.lock().expect("listings mutex poisoned");
        Ok(records.get(id).cloned())
    }

    fn fetch_by_slug(&self, slug: &str) -> Result<Option<ListingRecord>, RepositoryError> {
        let records = self.records.lock().expect("listings mutex poisoned");
        Ok(records.values().find(|record| record.slug == slug).cloned())
    }

    fn by_status(
        &self,
        status: ListingStatus,
        _limit: usize,
    ) -> Result<Vec<ListingRecord>, RepositoryError> {
        let records = self.records.lock().expect("listings mutex poisoned");
        Ok(records
            .values()
            .filter(|record| record.status() == status)
            .cloned()
            .collect())
    }

    fn by_owner(&self, owner: &UserId) -> Result<Vec<ListingRecord>, RepositoryError> {
        let records = self.records.lock().expect("listings mutex poisoned");
        Ok(records
            .values()
            .filter(|record| &record.listed_by_user_id == owner)
            .cloned()
            .collect())
    }

    fn delete_cascade(&self, id: &ListingId) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().expect("listings mutex poisoned");
        records.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
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
