use crate::infra::InMemoryMarketplace;
use clap::Args;
use property_desk::config::MarketplaceConfig;
use property_desk::error::AppError;
use property_desk::workflows::favorites::FavoritesService;
use property_desk::workflows::leads::{
    BuyerProfile, ContactChannel, ContactOutcome, InboxFilter, LeadPipelineService,
};
use property_desk::workflows::listings::{
    ListingFields, ListingGalleryService, ListingLifecycleService, ListingRecord, ListingReview,
    PublicBucketUrls,
};
use property_desk::workflows::{ActorContext, Role, UserId, WorkflowError};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Title for the demo listing.
    #[arg(long)]
    pub(crate) title: Option<String>,
    /// Asking price in SAR for the first submission.
    #[arg(long)]
    pub(crate) price: Option<u64>,
    /// Skip the buyer inquiry portion of the demo.
    #[arg(long)]
    pub(crate) skip_leads: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        title,
        price,
        skip_leads,
    } = args;

    let marketplace = MarketplaceConfig::default();
    let store = Arc::new(InMemoryMarketplace::default());
    let listings = ListingLifecycleService::new(store.clone());
    let gallery = ListingGalleryService::new(
        store.clone(),
        store.clone(),
        Arc::new(PublicBucketUrls::from_config(&marketplace)),
        store.clone(),
    );

    let agent = ActorContext::new("agent-demo", Role::Agent);
    let admin = ActorContext::new("admin-demo", Role::Admin);
    let buyer = ActorContext::new("buyer-demo", Role::Buyer);

    println!("{} listing moderation demo", marketplace.brand_name);

    let fields = ListingFields {
        title: title.unwrap_or_else(|| "Sea view apartment".to_string()),
        description: Some("Two bedrooms facing the corniche.".to_string()),
        price: Some(price.unwrap_or(4500)),
        bedrooms: Some(2),
        bathrooms: Some(2),
        area_sqm: Some(140),
        city: Some("Jeddah".to_string()),
        district: Some("Al Shati".to_string()),
        ..ListingFields::default()
    };

    let draft = listings.create_draft(&agent, fields.clone())?;
    render_listing("Draft created", &draft);

    let submitted = listings.submit_for_approval(&agent, &draft.id, fields.clone())?;
    render_listing("Submitted for approval", &submitted);
    render_review(&listings.review(&admin, &draft.id)?);

    let published = listings.approve(&admin, &draft.id)?;
    render_listing("Approved", &published);
    println!(
        "  Public page: {}/property/{}",
        marketplace.site_url, published.slug
    );

    let mut edited = fields;
    edited.price = edited.price.map(|price| price + 500);
    edited.title = format!("{}, renovated", edited.title);
    let staged = listings.save_edits(&agent, &draft.id, edited)?;
    render_listing("Edit staged", &staged);
    println!(
        "  Publicly visible while under review: {}",
        listings.public_listing(&staged.slug).is_ok()
    );
    render_review(&listings.review(&admin, &draft.id)?);

    let republished = listings.approve(&admin, &draft.id)?;
    render_listing("Edit approved", &republished);

    gallery.add_image(&agent, &draft.id, "living-room.jpg")?;
    let balcony = gallery.add_image(&agent, &draft.id, "balcony.jpg")?;
    let blurry = gallery.add_image(&agent, &draft.id, "blurry.jpg")?;
    gallery.set_cover(&agent, &balcony.id)?;
    println!("\nGallery after choosing a new cover and removing a photo");
    for image in gallery.remove_image(&agent, &blurry.id)? {
        let marker = if image.is_cover { " (cover)" } else { "" };
        println!("- #{} {}{}", image.sort_order, image.url, marker);
    }
    for path in store.removed_objects().map_err(WorkflowError::from)? {
        println!("  Removed from bucket: {}", path);
    }

    let favorites = FavoritesService::new(store.clone(), store.clone());
    favorites.toggle(&buyer, &draft.id)?;
    for saved in favorites.favorites(&buyer)? {
        println!("  {} saved {}", buyer.id, saved.fields.title);
    }

    if skip_leads {
        return Ok(());
    }

    println!("\nLead pipeline demo");
    store.upsert_profile(BuyerProfile {
        user_id: UserId("buyer-demo".to_string()),
        full_name: Some("Sara Al-Harbi".to_string()),
        phone: Some("055 111 2222".to_string()),
    })
    .map_err(WorkflowError::from)?;
    let leads = LeadPipelineService::new(store.clone(), store.clone(), store, marketplace);

    let lead = leads.submit_lead(
        &buyer,
        &draft.id,
        Some("Is the unit available next month?".to_string()),
    )?;
    println!("- Inquiry {} received -> status {}", lead.id, lead.status);

    for entry in leads.inbox(&agent, InboxFilter::All)? {
        println!(
            "  Inbox: {} about {} [{}]",
            entry.buyer_name.as_deref().unwrap_or("Unknown buyer"),
            entry.listing_title.as_deref().unwrap_or("a listing"),
            entry.lead.status
        );
    }

    let action = leads.contact(&agent, &lead.id, ContactChannel::Message, lead.status)?;
    match &action.link {
        Some(link) => println!("  WhatsApp link: {}", link),
        None => println!("  WhatsApp link unavailable: no phone on file"),
    }
    match action.outcome {
        ContactOutcome::Advanced { lead } => println!("  Lead advanced to {}", lead.status),
        ContactOutcome::Unchanged => println!("  Lead status unchanged"),
    }

    let closed = leads.set_status(&agent, &lead.id, "closed")?;
    println!("- Inquiry {} closed -> status {}", closed.id, closed.status);
    Ok(())
}

fn render_listing(heading: &str, record: &ListingRecord) {
    println!("\n{}", heading);
    println!(
        "- {} [{}] slug {} revision {}",
        record.fields.title,
        record.status(),
        record.slug,
        record.revision
    );
    if let Some(staged) = record.state.pending_changes() {
        println!("  Staged title: {}", staged.title);
    }
}

fn render_review(review: &ListingReview) {
    let changed: Vec<_> = review.changed_fields().collect();
    if changed.is_empty() {
        println!("  Review: no field changes");
        return;
    }
    println!(
        "  Review ({}):",
        if review.has_snapshot {
            "against last published version"
        } else {
            "first publication"
        }
    );
    for diff in changed {
        println!("    - {}: {} -> {}", diff.label, diff.current, diff.proposed);
    }
}
