use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::ListingId;
use crate::config::MarketplaceConfig;
use crate::workflows::error::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(pub String);

/// Image row stored alongside a listing. `path` addresses the object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: MediaId,
    pub listing_id: ListingId,
    pub path: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

/// A single `sort_order` write produced by a reorder plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrderUpdate {
    pub media_id: MediaId,
    pub sort_order: i32,
}

fn gallery_cmp(a: &MediaItem, b: &MediaItem) -> Ordering {
    a.sort_order
        .cmp(&b.sort_order)
        .then_with(|| a.created_at.cmp(&b.created_at))
}

/// Cover first, then by `sort_order`; ties go to the earliest upload.
pub fn gallery_order(items: &[MediaItem]) -> Vec<&MediaItem> {
    let mut ordered: Vec<&MediaItem> = items.iter().collect();
    ordered.sort_by(|a, b| gallery_cmp(a, b));
    ordered
}

pub fn cover(items: &[MediaItem]) -> Option<&MediaItem> {
    items.iter().min_by(|a, b| gallery_cmp(a, b))
}

pub fn next_sort_order(items: &[MediaItem]) -> i32 {
    items
        .iter()
        .map(|item| item.sort_order)
        .max()
        .map_or(0, |max| max + 1)
}

/// Make `media_id` the cover: it takes order 0 and every other image moves back one slot.
pub fn set_as_cover(items: &[MediaItem], media_id: &MediaId) -> Option<Vec<SortOrderUpdate>> {
    if !items.iter().any(|item| &item.id == media_id) {
        return None;
    }

    let mut updates: Vec<SortOrderUpdate> = items
        .iter()
        .filter(|item| &item.id != media_id)
        .map(|item| SortOrderUpdate {
            media_id: item.id.clone(),
            sort_order: item.sort_order + 1,
        })
        .collect();
    updates.push(SortOrderUpdate {
        media_id: media_id.clone(),
        sort_order: 0,
    });
    Some(updates)
}

/// Swap an image with its neighbour in gallery order. `None` at either end.
pub fn move_item(
    items: &[MediaItem],
    media_id: &MediaId,
    direction: MoveDirection,
) -> Option<[SortOrderUpdate; 2]> {
    let ordered = gallery_order(items);
    let index = ordered.iter().position(|item| &item.id == media_id)?;
    let neighbour = match direction {
        MoveDirection::Up => index.checked_sub(1)?,
        MoveDirection::Down => index + 1,
    };
    let (a, b) = (ordered[index], *ordered.get(neighbour)?);

    Some([
        SortOrderUpdate {
            media_id: a.id.clone(),
            sort_order: b.sort_order,
        },
        SortOrderUpdate {
            media_id: b.id.clone(),
            sort_order: a.sort_order,
        },
    ])
}

/// Object path for a new upload, scoped under the listing id.
pub fn storage_path(listing_id: &ListingId, file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    format!("{}/{}-{}", listing_id, Uuid::new_v4(), safe)
}

/// Capability offered by the object store: turn a stored path into a public URL.
pub trait MediaUrlResolver: Send + Sync {
    fn public_url(&self, path: &str) -> String;
}

/// Object-store deletion, used when an image is removed from a gallery.
pub trait ObjectStore: Send + Sync {
    fn remove_object(&self, path: &str) -> Result<(), RepositoryError>;
}

/// Public bucket addressing: `<base>/<bucket>/<path>`.
#[derive(Debug, Clone)]
pub struct PublicBucketUrls {
    base_url: String,
    bucket: String,
}

impl PublicBucketUrls {
    pub fn new(base_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
        }
    }

    pub fn from_config(config: &MarketplaceConfig) -> Self {
        Self::new(&config.media_base_url, &config.media_bucket)
    }
}

impl MediaUrlResolver for PublicBucketUrls {
    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            self.bucket,
            path.trim_start_matches('/')
        )
    }
}

/// Gallery entry as rendered on listing pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryImage {
    pub id: MediaId,
    pub url: String,
    pub sort_order: i32,
    pub is_cover: bool,
}

pub fn gallery_images(items: &[MediaItem], urls: &dyn MediaUrlResolver) -> Vec<GalleryImage> {
    gallery_order(items)
        .into_iter()
        .enumerate()
        .map(|(index, item)| GalleryImage {
            id: item.id.clone(),
            url: urls.public_url(&item.path),
            sort_order: item.sort_order,
            is_cover: index == 0,
        })
        .collect()
}
