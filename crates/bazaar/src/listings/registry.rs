use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The six listing domains served by the marketplace. Closed set: adding a
/// domain is a compile-time-checked change, every dispatch below is an
/// exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    Service,
    Ad,
    Rent,
    RentAd,
    Work,
    WorkAd,
}

impl ListingType {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Service,
            Self::Ad,
            Self::Rent,
            Self::RentAd,
            Self::Work,
            Self::WorkAd,
        ]
    }

    /// Wire tag used in URLs and stored rows.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Ad => "ad",
            Self::Rent => "rent",
            Self::RentAd => "rent_ad",
            Self::Work => "work",
            Self::WorkAd => "work_ad",
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Raised when a caller-supplied type tag names no known listing domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown listing type '{0}'")]
pub struct ParseListingTypeError(pub String);

impl FromStr for ListingType {
    type Err = ParseListingTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "service" => Ok(Self::Service),
            "ad" => Ok(Self::Ad),
            "rent" => Ok(Self::Rent),
            "rent_ad" => Ok(Self::RentAd),
            "work" => Ok(Self::Work),
            "work_ad" => Ok(Self::WorkAd),
            other => Err(ParseListingTypeError(other.to_string())),
        }
    }
}

/// Storage layout for one listing domain: which table owns the row and which
/// columns carry the id, the shared `status` field, and the serialized
/// promotion window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingTypeDescriptor {
    pub table: &'static str,
    pub id_column: &'static str,
    pub status_column: &'static str,
    pub promotion_column: &'static str,
}

/// Static mapping from a listing type to the table that owns it. Storage
/// adapters resolve their SQL through this instead of dispatching on raw
/// type strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListingTypeRegistry;

impl ListingTypeRegistry {
    pub const fn descriptor(listing_type: ListingType) -> ListingTypeDescriptor {
        const ID: &str = "id";
        const STATUS: &str = "status";
        const PROMOTION: &str = "top";

        let table = match listing_type {
            ListingType::Service => "services",
            ListingType::Ad => "ads",
            ListingType::Rent => "rents",
            ListingType::RentAd => "rent_ads",
            ListingType::Work => "works",
            ListingType::WorkAd => "work_ads",
        };

        ListingTypeDescriptor {
            table,
            id_column: ID,
            status_column: STATUS,
            promotion_column: PROMOTION,
        }
    }

    pub fn parse(tag: &str) -> Result<ListingType, ParseListingTypeError> {
        tag.parse()
    }
}

/// Identifies a listing independent of its concrete table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListingRef {
    pub listing_type: ListingType,
    pub id: i64,
}

impl ListingRef {
    pub const fn new(listing_type: ListingType, id: i64) -> Self {
        Self { listing_type, id }
    }
}

impl fmt::Display for ListingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.listing_type, self.id)
    }
}

/// Lifecycle of the listing row itself. Shared mutable state: the listing
/// CRUD collaborator writes it too, so the core only ever touches it inside
/// the transaction that also writes the engagement rows causing the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    InProgress,
    Done,
    Archived,
}

impl ListingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Archived => "archived",
        }
    }
}
