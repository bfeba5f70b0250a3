//! Buyer inquiries: submission against live listings, the agent inbox and contact actions.

pub mod contact;
pub mod domain;
pub mod inbox;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use contact::{tel_link, whatsapp_link, whatsapp_number, ContactChannel, InquiryContext};
pub use domain::{BuyerProfile, LeadId, LeadRecord, LeadStatus, NewLead};
pub use inbox::{sort_for_inbox, InboxEntry, InboxFilter};
pub use repository::{LeadRepository, LeadScope, ProfileDirectory};
pub use router::lead_router;
pub use service::{ContactAction, ContactOutcome, LeadPipelineService};
