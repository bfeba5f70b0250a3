use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::access::UserId;
use crate::workflows::error::ValidationError;
use crate::workflows::listings::domain::ListingId;

/// Identifier wrapper for buyer inquiries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub String);

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pipeline position of a lead. Any status may be set manually; only `new -> contacted` happens
/// on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Closed,
    Spam,
}

impl LeadStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::New, Self::Contacted, Self::Closed, Self::Spam]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Closed => "closed",
            Self::Spam => "spam",
        }
    }

    /// Inbox rank; lower sorts first.
    pub const fn priority(self) -> u8 {
        match self {
            Self::New => 0,
            Self::Contacted => 1,
            Self::Closed => 2,
            Self::Spam => 3,
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LeadStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ordered()
            .into_iter()
            .find(|status| status.label() == trimmed)
            .ok_or_else(|| ValidationError::UnknownLeadStatus(trimmed.to_string()))
    }
}

/// Insert payload handed to the lead store; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub listing_id: ListingId,
    pub buyer_user_id: UserId,
    pub listing_owner_id: UserId,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Repository record for a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: LeadId,
    pub listing_id: ListingId,
    pub buyer_user_id: UserId,
    /// Copied from the listing at submission so inbox scoping needs no join.
    pub listing_owner_id: UserId,
    pub message: Option<String>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

impl LeadRecord {
    pub fn from_new(id: LeadId, lead: NewLead) -> Self {
        Self {
            id,
            listing_id: lead.listing_id,
            buyer_user_id: lead.buyer_user_id,
            listing_owner_id: lead.listing_owner_id,
            message: lead.message,
            status: LeadStatus::New,
            created_at: lead.created_at,
        }
    }
}

/// Contact details held by the profile store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerProfile {
    pub user_id: UserId,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}
