use metrics_exporter_prometheus::PrometheusHandle;
use property_desk::workflows::error::RepositoryError;
use property_desk::workflows::favorites::{Favorite, FavoriteRepository};
use property_desk::workflows::leads::{
    BuyerProfile, InboxFilter, LeadId, LeadRecord, LeadRepository, LeadScope, LeadStatus,
    NewLead, ProfileDirectory,
};
use property_desk::workflows::listings::{
    ListingId, ListingRecord, ListingRepository, ListingStatus, MediaId, MediaItem,
    MediaRepository, ObjectStore, SortOrderUpdate,
};
use property_desk::workflows::UserId;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local stand-in for the hosted database and its image bucket.
///
/// Listing writes are compare-and-swap on the revision and deletes cascade, matching what the
/// hosted store guarantees. Removed bucket objects are only recorded.
#[derive(Default, Clone)]
pub(crate) struct InMemoryMarketplace {
    listings: Arc<Mutex<HashMap<ListingId, ListingRecord>>>,
    media: Arc<Mutex<HashMap<MediaId, MediaItem>>>,
    leads: Arc<Mutex<HashMap<LeadId, LeadRecord>>>,
    profiles: Arc<Mutex<HashMap<UserId, BuyerProfile>>>,
    favorites: Arc<Mutex<Vec<Favorite>>>,
    removed_objects: Arc<Mutex<Vec<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store lock poisoned".to_string()))
}

fn newest_first(records: &mut [ListingRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

impl InMemoryMarketplace {
    pub(crate) fn upsert_profile(&self, profile: BuyerProfile) -> Result<(), RepositoryError> {
        lock(&self.profiles)?.insert(profile.user_id.clone(), profile);
        Ok(())
    }

    pub(crate) fn removed_objects(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(lock(&self.removed_objects)?.clone())
    }
}

impl ListingRepository for InMemoryMarketplace {
    fn insert(&self, record: ListingRecord) -> Result<ListingRecord, RepositoryError> {
        let mut guard = lock(&self.listings)?;
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
        let mut guard = lock(&self.listings)?;
        let current = guard.get(&record.id).ok_or(RepositoryError::NotFound)?;
        if current.revision != expected_revision {
            return Err(RepositoryError::Stale);
        }
        record.revision = expected_revision + 1;
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ListingId) -> Result<Option<ListingRecord>, RepositoryError> {
        Ok(lock(&self.listings)?.get(id).cloned())
    }

    fn fetch_by_slug(&self, slug: &str) -> Result<Option<ListingRecord>, RepositoryError> {
        Ok(lock(&self.listings)?
            .values()
            .find(|record| record.slug == slug)
            .cloned())
    }

    fn by_status(
        &self,
        status: ListingStatus,
        limit: usize,
    ) -> Result<Vec<ListingRecord>, RepositoryError> {
        let mut records: Vec<ListingRecord> = lock(&self.listings)?
            .values()
            .filter(|record| record.status() == status)
            .cloned()
            .collect();
        newest_first(&mut records);
        records.truncate(limit);
        Ok(records)
    }

    fn by_owner(&self, owner: &UserId) -> Result<Vec<ListingRecord>, RepositoryError> {
        let mut records: Vec<ListingRecord> = lock(&self.listings)?
            .values()
            .filter(|record| &record.listed_by_user_id == owner)
            .cloned()
            .collect();
        newest_first(&mut records);
        Ok(records)
    }

    fn delete_cascade(&self, id: &ListingId) -> Result<(), RepositoryError> {
        let mut listings = lock(&self.listings)?;
        let mut media = lock(&self.media)?;
        let mut leads = lock(&self.leads)?;
        let mut favorites = lock(&self.favorites)?;

        listings.remove(id).ok_or(RepositoryError::NotFound)?;
        media.retain(|_, item| &item.listing_id != id);
        leads.retain(|_, lead| &lead.listing_id != id);
        favorites.retain(|favorite| &favorite.listing_id != id);
        Ok(())
    }
}

impl MediaRepository for InMemoryMarketplace {
    fn list(&self, listing_id: &ListingId) -> Result<Vec<MediaItem>, RepositoryError> {
        Ok(lock(&self.media)?
            .values()
            .filter(|item| &item.listing_id == listing_id)
            .cloned()
            .collect())
    }

    fn insert(&self, item: MediaItem) -> Result<MediaItem, RepositoryError> {
        let mut guard = lock(&self.media)?;
        if guard.contains_key(&item.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    fn fetch(&self, id: &MediaId) -> Result<Option<MediaItem>, RepositoryError> {
        Ok(lock(&self.media)?.get(id).cloned())
    }

    fn apply_sort_orders(&self, updates: &[SortOrderUpdate]) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.media)?;
        if updates
            .iter()
            .any(|update| !guard.contains_key(&update.media_id))
        {
            return Err(RepositoryError::NotFound);
        }
        for update in updates {
            if let Some(item) = guard.get_mut(&update.media_id) {
                item.sort_order = update.sort_order;
            }
        }
        Ok(())
    }

    fn remove(&self, id: &MediaId) -> Result<(), RepositoryError> {
        lock(&self.media)?
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

impl ObjectStore for InMemoryMarketplace {
    fn remove_object(&self, path: &str) -> Result<(), RepositoryError> {
        lock(&self.removed_objects)?.push(path.to_string());
        Ok(())
    }
}

impl FavoriteRepository for InMemoryMarketplace {
    fn contains(&self, user: &UserId, listing_id: &ListingId) -> Result<bool, RepositoryError> {
        Ok(lock(&self.favorites)?
            .iter()
            .any(|favorite| &favorite.user_id == user && &favorite.listing_id == listing_id))
    }

    fn add(&self, favorite: Favorite) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.favorites)?;
        if guard
            .iter()
            .any(|row| row.user_id == favorite.user_id && row.listing_id == favorite.listing_id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.push(favorite);
        Ok(())
    }

    fn remove(&self, user: &UserId, listing_id: &ListingId) -> Result<bool, RepositoryError> {
        let mut guard = lock(&self.favorites)?;
        let before = guard.len();
        guard.retain(|row| !(&row.user_id == user && &row.listing_id == listing_id));
        Ok(guard.len() != before)
    }

    fn for_user(&self, user: &UserId) -> Result<Vec<Favorite>, RepositoryError> {
        let mut favorites: Vec<Favorite> = lock(&self.favorites)?
            .iter()
            .filter(|row| &row.user_id == user)
            .cloned()
            .collect();
        favorites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(favorites)
    }
}

impl LeadRepository for InMemoryMarketplace {
    fn insert(&self, lead: NewLead) -> Result<Option<LeadId>, RepositoryError> {
        let id = LeadId(Uuid::new_v4().to_string());
        lock(&self.leads)?.insert(id.clone(), LeadRecord::from_new(id.clone(), lead));
        Ok(Some(id))
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        Ok(lock(&self.leads)?.get(id).cloned())
    }

    fn set_status(&self, id: &LeadId, status: LeadStatus) -> Result<LeadRecord, RepositoryError> {
        let mut guard = lock(&self.leads)?;
        let lead = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        lead.status = status;
        Ok(lead.clone())
    }

    fn advance_status(
        &self,
        id: &LeadId,
        expected: LeadStatus,
        next: LeadStatus,
    ) -> Result<Option<LeadRecord>, RepositoryError> {
        let mut guard = lock(&self.leads)?;
        let lead = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if lead.status != expected {
            return Ok(None);
        }
        lead.status = next;
        Ok(Some(lead.clone()))
    }

    fn list(
        &self,
        scope: &LeadScope,
        filter: InboxFilter,
    ) -> Result<Vec<LeadRecord>, RepositoryError> {
        Ok(lock(&self.leads)?
            .values()
            .filter(|lead| scope.includes(lead) && filter.matches(lead))
            .cloned()
            .collect())
    }
}

impl ProfileDirectory for InMemoryMarketplace {
    fn profile(&self, user: &UserId) -> Result<Option<BuyerProfile>, RepositoryError> {
        Ok(lock(&self.profiles)?.get(user).cloned())
    }
}
