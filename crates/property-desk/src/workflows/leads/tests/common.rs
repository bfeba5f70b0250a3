use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::{HeaderValue, Request};
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::config::MarketplaceConfig;
use crate::workflows::access::{ActorContext, Role, UserId, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
use crate::workflows::error::RepositoryError;
use crate::workflows::leads::domain::{BuyerProfile, LeadId, LeadRecord, LeadStatus, NewLead};
use crate::workflows::leads::inbox::InboxFilter;
use crate::workflows::leads::repository::{LeadRepository, LeadScope, ProfileDirectory};
use crate::workflows::leads::service::LeadPipelineService;
use crate::workflows::listings::domain::{
    AvailabilityStatus, ListingFields, ListingId, ListingRecord, ListingState, ListingStatus,
    DEFAULT_CURRENCY,
};
use crate::workflows::listings::repository::ListingRepository;

pub(super) type MemoryPipeline = LeadPipelineService<MemoryLeads, StaticListings, MemoryProfiles>;

pub(super) fn owner() -> ActorContext {
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

pub(super) fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn marketplace() -> MarketplaceConfig {
    MarketplaceConfig {
        site_url: "https://homes.example.sa".to_string(),
        ..MarketplaceConfig::default()
    }
}

pub(super) fn listing(id: &str, state: ListingState, availability: AvailabilityStatus) -> ListingRecord {
    ListingRecord {
        id: ListingId(id.to_string()),
        slug: format!("{id}-slug"),
        listed_by_user_id: owner().id,
        currency: DEFAULT_CURRENCY.to_string(),
        fields: ListingFields {
            title: "Garden villa".to_string(),
            price: Some(2_000_000),
            city: Some("Riyadh".to_string()),
            availability_status: availability,
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

pub(super) fn live_listing() -> ListingRecord {
    listing("lst-live", ListingState::Published, AvailabilityStatus::Available)
}

pub(super) fn build_service() -> (MemoryPipeline, Arc<MemoryLeads>) {
    build_service_with(Arc::new(MemoryLeads::default()))
}

pub(super) fn build_service_with<L: LeadRepository + 'static>(
    leads: Arc<L>,
) -> (LeadPipelineService<L, StaticListings, MemoryProfiles>, Arc<L>) {
    let listings = StaticListings::with(vec![
        live_listing(),
        listing("lst-sold", ListingState::Published, AvailabilityStatus::Sold),
        listing("lst-draft", ListingState::Draft, AvailabilityStatus::Available),
    ]);
    let profiles = MemoryProfiles::with(vec![BuyerProfile {
        user_id: buyer().id,
        full_name: Some("Sara".to_string()),
        phone: Some("05 1234 5678".to_string()),
    }]);
    let service = LeadPipelineService::new(
        leads.clone(),
        Arc::new(listings),
        Arc::new(profiles),
        marketplace(),
    );
    (service, leads)
}

/// Seed a lead directly in the store with a fixed creation time.
pub(super) fn seed_lead(leads: &MemoryLeads, id: &str, status: LeadStatus, hour: u32) -> LeadId {
    let lead = LeadRecord {
        id: LeadId(id.to_string()),
        listing_id: live_listing().id,
        buyer_user_id: buyer().id,
        listing_owner_id: owner().id,
        message: None,
        status,
        created_at: at(hour),
    };
    leads
        .records
        .lock()
        .expect("lead mutex poisoned")
        .insert(lead.id.clone(), lead.clone());
    lead.id
}

#[derive(Default)]
pub(super) struct MemoryLeads {
    pub(super) records: Mutex<HashMap<LeadId, LeadRecord>>,
    sequence: AtomicU64,
    pub(super) writes: AtomicU64,
}

impl MemoryLeads {
    pub(super) fn status_of(&self, id: &LeadId) -> LeadStatus {
        self.records
            .lock()
            .expect("lead mutex poisoned")
            .get(id)
            .map(|lead| lead.status)
            .expect("lead stored")
    }
}

impl LeadRepository for MemoryLeads {
    fn insert(&self, lead: NewLead) -> Result<Option<LeadId>, RepositoryError> {
        let id = LeadId(format!(
            "lead-{}",
            self.sequence.fetch_add(1, Ordering::SeqCst) + 1
        ));
        let record = LeadRecord::from_new(id.clone(), lead);
        self.records
            .lock()
            .expect("lead mutex poisoned")
            .insert(id.clone(), record);
        Ok(Some(id))
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("lead mutex poisoned")
            .get(id)
            .cloned())
    }

    fn set_status(&self, id: &LeadId, status: LeadStatus) -> Result<LeadRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("lead mutex poisoned");
        let lead = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        lead.status = status;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(lead.clone())
    }

    fn advance_status(
        &self,
        id: &LeadId,
        expected: LeadStatus,
        next: LeadStatus,
    ) -> Result<Option<LeadRecord>, RepositoryError> {
        let mut guard = self.records.lock().expect("lead mutex poisoned");
        let lead = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if lead.status != expected {
            return Ok(None);
        }
        lead.status = next;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(lead.clone()))
    }

    fn list(
        &self,
        scope: &LeadScope,
        filter: InboxFilter,
    ) -> Result<Vec<LeadRecord>, RepositoryError> {
        let guard = self.records.lock().expect("lead mutex poisoned");
        Ok(guard
            .values()
            .filter(|lead| scope.includes(lead) && filter.matches(lead))
            .cloned()
            .collect())
    }
}

/// Store that accepts inserts without handing back an id.
#[derive(Default)]
pub(super) struct SilentLeads;

impl LeadRepository for SilentLeads {
    fn insert(&self, _lead: NewLead) -> Result<Option<LeadId>, RepositoryError> {
        Ok(None)
    }

    fn fetch(&self, _id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        Ok(None)
    }

    fn set_status(&self, _id: &LeadId, _status: LeadStatus) -> Result<LeadRecord, RepositoryError> {
        Err(RepositoryError::NotFound)
    }

    fn advance_status(
        &self,
        _id: &LeadId,
        _expected: LeadStatus,
        _next: LeadStatus,
    ) -> Result<Option<LeadRecord>, RepositoryError> {
        Err(RepositoryError::NotFound)
    }

    fn list(
        &self,
        _scope: &LeadScope,
        _filter: InboxFilter,
    ) -> Result<Vec<LeadRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

/// Read-only listing lookup for lead tests.
#[derive(Default)]
pub(super) struct StaticListings {
    records: HashMap<ListingId, ListingRecord>,
}

impl StaticListings {
    pub(super) fn with(records: Vec<ListingRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.id.clone(), record))
                .collect(),
        }
    }
}

impl ListingRepository for StaticListings {
    fn insert(&self, _record: ListingRecord) -> Result<ListingRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn update(
        &self,
        _record: ListingRecord,
        _expected_revision: u64,
    ) -> Result<ListingRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, id: &ListingId) -> Result<Option<ListingRecord>, RepositoryError> {
        Ok(self.records.get(id).cloned())
    }

    fn fetch_by_slug(&self, slug: &str) -> Result<Option<ListingRecord>, RepositoryError> {
        Ok(self.records.values().find(|record| record.slug == slug).cloned())
    }

    fn by_status(
        &self,
        status: ListingStatus,
        _limit: usize,
    ) -> Result<Vec<ListingRecord>, RepositoryError> {
        Ok(self
            .records
            .values()
            .filter(|record| record.status() == status)
            .cloned()
            .collect())
    }

    fn by_owner(&self, owner: &UserId) -> Result<Vec<ListingRecord>, RepositoryError> {
        Ok(self
            .records
            .values()
            .filter(|record| &record.listed_by_user_id == owner)
            .cloned()
            .collect())
    }

    fn delete_cascade(&self, _id: &ListingId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryProfiles {
    profiles: HashMap<UserId, BuyerProfile>,
}

impl MemoryProfiles {
    pub(super) fn with(profiles: Vec<BuyerProfile>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|profile| (profile.user_id.clone(), profile))
                .collect(),
        }
    }
}

impl ProfileDirectory for MemoryProfiles {
    fn profile(&self, user: &UserId) -> Result<Option<BuyerProfile>, RepositoryError> {
        Ok(self.profiles.get(user).cloned())
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
