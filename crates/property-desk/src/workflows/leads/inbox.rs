use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::{LeadRecord, LeadStatus};
use crate::workflows::error::ValidationError;

/// Status tab of the leads inbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InboxFilter {
    #[default]
    All,
    Status(LeadStatus),
}

impl InboxFilter {
    pub fn matches(self, lead: &LeadRecord) -> bool {
        match self {
            InboxFilter::All => true,
            InboxFilter::Status(status) => lead.status == status,
        }
    }
}

impl FromStr for InboxFilter {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | "all" => Ok(InboxFilter::All),
            other => other.parse().map(InboxFilter::Status),
        }
    }
}

impl fmt::Display for InboxFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InboxFilter::All => f.write_str("all"),
            InboxFilter::Status(status) => f.write_str(status.label()),
        }
    }
}

/// New leads first, then by status priority; newest first within a status.
pub fn sort_for_inbox(mut leads: Vec<LeadRecord>) -> Vec<LeadRecord> {
    leads.sort_by_key(|lead| (lead.status.priority(), Reverse(lead.created_at)));
    leads
}

/// Inbox row: the lead plus what the agent needs to reach the buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxEntry {
    #[serde(flatten)]
    pub lead: LeadRecord,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub listing_title: Option<String>,
    pub listing_slug: Option<String>,
    pub tel_link: Option<String>,
    pub whatsapp_link: Option<String>,
}
