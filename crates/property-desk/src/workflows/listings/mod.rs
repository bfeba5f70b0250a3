//! Listing publish lifecycle: drafting, moderation with staged edits, and the image gallery.
//!
//! Edits to a published listing are staged rather than written live; approval merges the staged
//! copy and records what was public before.

pub mod diff;
pub mod domain;
pub mod gallery;
pub mod lifecycle;
pub mod media;
pub mod repository;
pub mod router;
pub mod service;
pub mod slug;

#[cfg(test)]
mod tests;

pub use diff::{compute_diff, FieldDiff, ListingReview};
pub use domain::{
    AvailabilityStatus, FieldValue, ListingField, ListingFields, ListingId, ListingPurpose,
    ListingRecord, ListingSnapshot, ListingState, ListingStatus, ListingView, PropertyType,
    PublicListingView, ReviewStamp,
};
pub use gallery::{
    GalleryImage, MediaId, MediaItem, MediaUrlResolver, MoveDirection, ObjectStore,
    PublicBucketUrls, SortOrderUpdate,
};
pub use media::ListingGalleryService;
pub use repository::{ListingRepository, MediaRepository};
pub use router::{gallery_router, listing_router};
pub use service::ListingLifecycleService;
