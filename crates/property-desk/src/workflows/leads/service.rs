use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::contact::{self, ContactChannel, InquiryContext};
use super::domain::{LeadId, LeadRecord, LeadStatus, NewLead};
use super::inbox::{sort_for_inbox, InboxEntry, InboxFilter};
use super::repository::{LeadRepository, LeadScope, ProfileDirectory};
use crate::config::MarketplaceConfig;
use crate::workflows::access::{ActorContext, Role};
use crate::workflows::error::{PreconditionError, RepositoryError, WorkflowError};
use crate::workflows::listings::domain::{ListingId, ListingRecord};
use crate::workflows::listings::repository::ListingRepository;

/// Result of the automatic `new -> contacted` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ContactOutcome {
    Advanced { lead: LeadRecord },
    Unchanged,
}

/// Link to open for a contact action and what it did to the lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactAction {
    pub channel: ContactChannel,
    pub link: Option<String>,
    #[serde(flatten)]
    pub outcome: ContactOutcome,
}

/// Service tracking buyer inquiries from submission through the agent's inbox.
pub struct LeadPipelineService<L, P, D> {
    leads: Arc<L>,
    listings: Arc<P>,
    profiles: Arc<D>,
    marketplace: MarketplaceConfig,
}

impl<L, P, D> LeadPipelineService<L, P, D>
where
    L: LeadRepository + 'static,
    P: ListingRepository + 'static,
    D: ProfileDirectory + 'static,
{
    pub fn new(
        leads: Arc<L>,
        listings: Arc<P>,
        profiles: Arc<D>,
        marketplace: MarketplaceConfig,
    ) -> Self {
        Self {
            leads,
            listings,
            profiles,
            marketplace,
        }
    }

    /// Record a buyer inquiry against a published, available listing.
    pub fn submit_lead(
        &self,
        actor: &ActorContext,
        listing_id: &ListingId,
        message: Option<String>,
    ) -> Result<LeadRecord, WorkflowError> {
        let listing = self
            .listings
            .fetch(listing_id)?
            .ok_or(RepositoryError::NotFound)?;
        if !listing.accepts_leads() {
            warn!(listing_id = %listing_id, status = %listing.status(), availability = %listing.fields.availability_status, "lead refused; listing closed for inquiries");
            return Err(PreconditionError::ListingClosedForLeads {
                status: listing.status(),
                availability: listing.fields.availability_status,
            }
            .into());
        }

        let lead = NewLead {
            listing_id: listing.id.clone(),
            buyer_user_id: actor.id.clone(),
            listing_owner_id: listing.listed_by_user_id.clone(),
            message: message.filter(|text| !text.trim().is_empty()),
            created_at: Utc::now(),
        };

        let Some(id) = self.leads.insert(lead.clone())? else {
            warn!(listing_id = %listing_id, buyer = %actor.id, "lead store returned no id");
            return Err(WorkflowError::LeadNotCreated);
        };
        info!(lead_id = %id, listing_id = %listing_id, buyer = %actor.id, "lead submitted");
        Ok(LeadRecord::from_new(id, lead))
    }

    /// Manual override to any of the four statuses.
    pub fn set_status(
        &self,
        actor: &ActorContext,
        lead_id: &LeadId,
        next: &str,
    ) -> Result<LeadRecord, WorkflowError> {
        let lead = self.authorized_lead(actor, lead_id)?;
        let next: LeadStatus = next.parse()?;

        let stored = self.leads.set_status(lead_id, next)?;
        info!(lead_id = %lead_id, from = %lead.status, to = %next, actor = %actor.id, "lead status set");
        Ok(stored)
    }

    /// Move a lead the caller saw as `new` to `contacted`. Repeat calls are no-ops.
    pub fn auto_advance_on_contact(
        &self,
        actor: &ActorContext,
        lead_id: &LeadId,
        observed: LeadStatus,
    ) -> Result<ContactOutcome, WorkflowError> {
        self.authorized_lead(actor, lead_id)?;
        if observed != LeadStatus::New {
            return Ok(ContactOutcome::Unchanged);
        }

        match self
            .leads
            .advance_status(lead_id, LeadStatus::New, LeadStatus::Contacted)?
        {
            Some(lead) => {
                info!(lead_id = %lead_id, actor = %actor.id, "lead marked contacted");
                Ok(ContactOutcome::Advanced { lead })
            }
            None => Ok(ContactOutcome::Unchanged),
        }
    }

    /// Build the call or message link for a lead and advance it when a link exists.
    pub fn contact(
        &self,
        actor: &ActorContext,
        lead_id: &LeadId,
        channel: ContactChannel,
        observed: LeadStatus,
    ) -> Result<ContactAction, WorkflowError> {
        let lead = self.authorized_lead(actor, lead_id)?;
        let entry = self.inbox_entry(lead)?;
        let link = match channel {
            ContactChannel::Call => entry.tel_link,
            ContactChannel::Message => entry.whatsapp_link,
        };

        let outcome = if link.is_some() {
            self.auto_advance_on_contact(actor, lead_id, observed)?
        } else {
            warn!(lead_id = %lead_id, ?channel, "buyer has no usable phone number");
            ContactOutcome::Unchanged
        };
        Ok(ContactAction {
            channel,
            link,
            outcome,
        })
    }

    /// Leads visible to the caller, new first, with contact links resolved.
    pub fn inbox(
        &self,
        actor: &ActorContext,
        filter: InboxFilter,
    ) -> Result<Vec<InboxEntry>, WorkflowError> {
        actor.require_agent_or_admin()?;
        let scope = match actor.role {
            Role::Admin => LeadScope::Everything,
            _ => LeadScope::ListingsOwnedBy(actor.id.clone()),
        };

        let leads = sort_for_inbox(self.leads.list(&scope, filter)?);
        leads
            .into_iter()
            .map(|lead| self.inbox_entry(lead))
            .collect()
    }

    fn authorized_lead(
        &self,
        actor: &ActorContext,
        lead_id: &LeadId,
    ) -> Result<LeadRecord, WorkflowError> {
        actor.require_agent_or_admin()?;
        let lead = self
            .leads
            .fetch(lead_id)?
            .ok_or(RepositoryError::NotFound)?;
        actor.require_owner_or_admin(&lead.listing_owner_id)?;
        Ok(lead)
    }

    fn inbox_entry(&self, lead: LeadRecord) -> Result<InboxEntry, WorkflowError> {
        let buyer = self.profiles.profile(&lead.buyer_user_id)?.unwrap_or_default();
        let listing: Option<ListingRecord> = self.listings.fetch(&lead.listing_id)?;
        let listing_title = listing.as_ref().map(|listing| listing.fields.title.clone());
        let listing_slug = listing.as_ref().map(|listing| listing.slug.clone());

        let phone = buyer.phone.as_deref().unwrap_or_default();
        let context = InquiryContext {
            buyer_name: buyer.full_name.as_deref(),
            listing_title: listing_title.as_deref(),
            listing_slug: listing_slug.as_deref(),
        };
        let tel_link = contact::tel_link(phone);
        let whatsapp_link = contact::whatsapp_link(phone, &context, &self.marketplace);

        Ok(InboxEntry {
            lead,
            buyer_name: buyer.full_name,
            buyer_phone: buyer.phone,
            listing_title,
            listing_slug,
            tel_link,
            whatsapp_link,
        })
    }
}
