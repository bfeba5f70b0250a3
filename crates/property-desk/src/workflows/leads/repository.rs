use super::domain::{BuyerProfile, LeadId, LeadRecord, LeadStatus, NewLead};
use super::inbox::InboxFilter;
use crate::workflows::access::UserId;
use crate::workflows::error::RepositoryError;

/// Which leads an inbox query may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadScope {
    Everything,
    ListingsOwnedBy(UserId),
}

impl LeadScope {
    pub fn includes(&self, lead: &LeadRecord) -> bool {
        match self {
            LeadScope::Everything => true,
            LeadScope::ListingsOwnedBy(owner) => &lead.listing_owner_id == owner,
        }
    }
}

/// Storage abstraction over the `leads` table.
pub trait LeadRepository: Send + Sync {
    /// Insert a lead and return the id the store generated.
    ///
    /// `Ok(None)` means the store accepted the write without confirming a row.
    fn insert(&self, lead: NewLead) -> Result<Option<LeadId>, RepositoryError>;

    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError>;

    /// Unconditional status write used by manual overrides.
    fn set_status(&self, id: &LeadId, status: LeadStatus) -> Result<LeadRecord, RepositoryError>;

    /// Write `next` only while the stored status is still `expected`.
    ///
    /// Returns `None` when the stored status had already moved on.
    fn advance_status(
        &self,
        id: &LeadId,
        expected: LeadStatus,
        next: LeadStatus,
    ) -> Result<Option<LeadRecord>, RepositoryError>;

    /// Leads in scope matching the filter, in no particular order.
    fn list(
        &self,
        scope: &LeadScope,
        filter: InboxFilter,
    ) -> Result<Vec<LeadRecord>, RepositoryError>;
}

/// Read access to user profiles kept by the auth platform.
pub trait ProfileDirectory: Send + Sync {
    fn profile(&self, user: &UserId) -> Result<Option<BuyerProfile>, RepositoryError>;
}
