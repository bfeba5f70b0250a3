use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::access::UserId;
use crate::workflows::error::ValidationError;

pub const DEFAULT_CURRENCY: &str = "SAR";

/// Identifier wrapper for property listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingPurpose {
    #[default]
    Rent,
    Sale,
}

impl ListingPurpose {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Sale => "sale",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[default]
    Apartment,
    Villa,
    Land,
    Office,
}

impl PropertyType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::Villa => "villa",
            Self::Land => "land",
            Self::Office => "office",
        }
    }
}

/// Market availability. Independent of the publish lifecycle; gates new inquiries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    #[default]
    Available,
    Reserved,
    Sold,
    Rented,
}

impl AvailabilityStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Sold => "sold",
            Self::Rented => "rented",
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Publish lifecycle as stored in the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Draft,
    Pending,
    Published,
    Rejected,
}

impl ListingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Published => "published",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ListingStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "published" => Ok(Self::Published),
            "rejected" => Ok(Self::Rejected),
            other => Err(ValidationError::UnknownListingStatus(other.to_string())),
        }
    }
}

/// Editable content columns of a listing. Everything here is tracked by review snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFields {
    #[serde(default)]
    pub purpose: ListingPurpose,
    #[serde(default)]
    pub property_type: PropertyType,
    #[serde(default)]
    pub availability_status: AvailabilityStatus,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<u64>,
    #[serde(default)]
    pub bedrooms: Option<u16>,
    #[serde(default)]
    pub bathrooms: Option<u16>,
    #[serde(default)]
    pub area_sqm: Option<u32>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
}

impl ListingFields {
    /// Blank strings are stored as null, matching what the edit form submits.
    pub fn normalized(mut self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value.filter(|text| !text.trim().is_empty())
        }

        self.description = blank_to_none(self.description);
        self.city = blank_to_none(self.city);
        self.district = blank_to_none(self.district);
        self
    }

    pub fn value_of(&self, field: ListingField) -> FieldValue {
        match field {
            ListingField::Purpose => FieldValue::text(self.purpose.label()),
            ListingField::PropertyType => FieldValue::text(self.property_type.label()),
            ListingField::AvailabilityStatus => {
                FieldValue::text(self.availability_status.label())
            }
            ListingField::Title => FieldValue::text(&self.title),
            ListingField::Description => FieldValue::optional_text(self.description.as_deref()),
            ListingField::Price => FieldValue::optional_number(self.price),
            ListingField::Bedrooms => FieldValue::optional_number(self.bedrooms.map(u64::from)),
            ListingField::Bathrooms => FieldValue::optional_number(self.bathrooms.map(u64::from)),
            ListingField::AreaSqm => FieldValue::optional_number(self.area_sqm.map(u64::from)),
            ListingField::City => FieldValue::optional_text(self.city.as_deref()),
            ListingField::District => FieldValue::optional_text(self.district.as_deref()),
        }
    }

    /// Full-field mapping of the tracked columns.
    pub fn to_snapshot(&self) -> ListingSnapshot {
        ListingSnapshot(
            ListingField::ordered()
                .into_iter()
                .map(|field| (field, self.value_of(field)))
                .collect(),
        )
    }
}

/// Columns tracked by snapshots and review diffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingField {
    Purpose,
    PropertyType,
    AvailabilityStatus,
    Title,
    Description,
    Price,
    Bedrooms,
    Bathrooms,
    AreaSqm,
    City,
    District,
}

impl ListingField {
    pub const fn ordered() -> [Self; 11] {
        [
            Self::Purpose,
            Self::PropertyType,
            Self::AvailabilityStatus,
            Self::Title,
            Self::Description,
            Self::Price,
            Self::Bedrooms,
            Self::Bathrooms,
            Self::AreaSqm,
            Self::City,
            Self::District,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Purpose => "purpose",
            Self::PropertyType => "property_type",
            Self::AvailabilityStatus => "availability_status",
            Self::Title => "title",
            Self::Description => "description",
            Self::Price => "price",
            Self::Bedrooms => "bedrooms",
            Self::Bathrooms => "bathrooms",
            Self::AreaSqm => "area_sqm",
            Self::City => "city",
            Self::District => "district",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Purpose => "Purpose",
            Self::PropertyType => "Type",
            Self::AvailabilityStatus => "Availability",
            Self::Title => "Title",
            Self::Description => "Description",
            Self::Price => "Price",
            Self::Bedrooms => "Bedrooms",
            Self::Bathrooms => "Bathrooms",
            Self::AreaSqm => "Area (sqm)",
            Self::City => "City",
            Self::District => "District",
        }
    }
}

/// Value representation for a tracked column so snapshots stay schema-agnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Empty,
    Number(u64),
    Text(String),
}

impl FieldValue {
    pub fn text(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }

    pub fn optional_text(value: Option<&str>) -> Self {
        value.map(Self::text).unwrap_or_default()
    }

    pub fn optional_number(value: Option<u64>) -> Self {
        value.map(FieldValue::Number).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => f.write_str("-"),
            FieldValue::Number(value) => write!(f, "{value}"),
            FieldValue::Text(value) => f.write_str(value),
        }
    }
}

/// Content of a listing captured when it was last approved.
///
/// First-time approvals record an empty snapshot: nothing was public before.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingSnapshot(pub BTreeMap<ListingField, FieldValue>);

impl ListingSnapshot {
    pub fn get(&self, field: ListingField) -> FieldValue {
        self.0.get(&field).cloned().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Lifecycle of a listing as an explicit variant.
///
/// Staged changes only exist while an edit to published content awaits review (or after that
/// review was rejected), and a rejection reason only exists on rejected listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ListingState {
    Draft,
    /// Live columns already hold the submitted content; only sign-off is missing.
    PendingNew,
    /// Live columns still hold the published content; `staged` replaces it on approval.
    PendingEdit { staged: ListingFields },
    Published,
    Rejected {
        staged: Option<ListingFields>,
        reason: String,
    },
}

impl ListingState {
    pub fn status(&self) -> ListingStatus {
        match self {
            ListingState::Draft => ListingStatus::Draft,
            ListingState::PendingNew | ListingState::PendingEdit { .. } => ListingStatus::Pending,
            ListingState::Published => ListingStatus::Published,
            ListingState::Rejected { .. } => ListingStatus::Rejected,
        }
    }

    pub fn pending_changes(&self) -> Option<&ListingFields> {
        match self {
            ListingState::PendingEdit { staged } => Some(staged),
            ListingState::Rejected { staged, .. } => staged.as_ref(),
            _ => None,
        }
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            ListingState::Rejected { reason, .. } => Some(reason.as_str()),
            _ => None,
        }
    }
}

/// Audit stamp written by admin review decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStamp {
    pub reviewed_at: DateTime<Utc>,
    pub reviewed_by: UserId,
}

/// Repository record for a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: ListingId,
    pub slug: String,
    pub listed_by_user_id: UserId,
    pub currency: String,
    pub fields: ListingFields,
    pub state: ListingState,
    pub last_published_snapshot: Option<ListingSnapshot>,
    pub published_at: Option<DateTime<Utc>>,
    pub review: Option<ReviewStamp>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by every committed write; repositories compare it before replacing a row.
    pub revision: u64,
}

impl ListingRecord {
    pub fn status(&self) -> ListingStatus {
        self.state.status()
    }

    pub fn is_publicly_visible(&self) -> bool {
        self.status() == ListingStatus::Published
    }

    pub fn accepts_leads(&self) -> bool {
        self.is_publicly_visible()
            && self.fields.availability_status == AvailabilityStatus::Available
    }

    pub fn view(&self) -> ListingView {
        ListingView {
            id: self.id.clone(),
            slug: self.slug.clone(),
            status: self.status(),
            listed_by_user_id: self.listed_by_user_id.clone(),
            currency: self.currency.clone(),
            fields: self.fields.clone(),
            pending_changes: self.state.pending_changes().cloned(),
            last_published_snapshot: self.last_published_snapshot.clone(),
            rejection_reason: self.state.rejection_reason().map(str::to_string),
            reviewed_at: self.review.as_ref().map(|stamp| stamp.reviewed_at),
            reviewed_by: self.review.as_ref().map(|stamp| stamp.reviewed_by.clone()),
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Anonymous projection: live content only, no moderation audit trail.
    pub fn public_view(&self) -> PublicListingView {
        PublicListingView {
            id: self.id.clone(),
            slug: self.slug.clone(),
            listed_by_user_id: self.listed_by_user_id.clone(),
            currency: self.currency.clone(),
            fields: self.fields.clone(),
            published_at: self.published_at,
        }
    }
}

/// Row-shaped projection exposed over HTTP: status string plus nullable side channels.
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub id: ListingId,
    pub slug: String,
    pub status: ListingStatus,
    pub listed_by_user_id: UserId,
    pub currency: String,
    #[serde(flatten)]
    pub fields: ListingFields,
    pub pending_changes: Option<ListingFields>,
    pub last_published_snapshot: Option<ListingSnapshot>,
    pub rejection_reason: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<UserId>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What the public property page and favorites list show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicListingView {
    pub id: ListingId,
    pub slug: String,
    pub listed_by_user_id: UserId,
    pub currency: String,
    #[serde(flatten)]
    pub fields: ListingFields,
    pub published_at: Option<DateTime<Utc>>,
}
