use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::listings::registry::ListingRef;
use crate::listings::store::{ChatId, UserId};

/// Identifier wrapper for submitted responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResponseId(pub i64);

/// Identifier wrapper for confirmation rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfirmationId(pub i64);

/// A candidate performer's bid of interest in a listing.
///
/// Invariant: at most one non-deleted response per (listing, user), enforced
/// by a pre-insert check and backed by a storage-level uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: ResponseId,
    pub listing: ListingRef,
    pub user_id: UserId,
    pub price: u32,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a response; the repository assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewResponse {
    pub listing: ListingRef,
    pub user_id: UserId,
    pub price: u32,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle of a confirmation row. `Done` and `Archived` are terminal for
/// the row; a fresh row can start a new cycle on the same listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    Active,
    InProgress,
    Done,
    Archived,
}

impl ConfirmationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Archived => "archived",
        }
    }
}

/// The exclusivity lock on a listing.
///
/// Invariant: at most one confirmation with `confirmed = true` per listing
/// at any time. Multiple unconfirmed `active` rows may coexist, one per
/// candidate conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confirmation {
    pub id: ConfirmationId,
    pub listing: ListingRef,
    pub chat_id: ChatId,
    pub client_id: UserId,
    pub performer_id: UserId,
    pub confirmed: bool,
    pub status: ConfirmationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Confirmation {
    /// Whether `user` is one of the two recorded parties.
    pub fn involves(&self, user: UserId) -> bool {
        self.client_id == user || self.performer_id == user
    }

    pub fn status_view(&self) -> ConfirmationView {
        ConfirmationView {
            id: self.id,
            listing: self.listing,
            chat_id: self.chat_id,
            client_id: self.client_id,
            performer_id: self.performer_id,
            confirmed: self.confirmed,
            status: self.status.label(),
            updated_at: self.updated_at,
        }
    }
}

/// Insert payload for a confirmation; always starts unconfirmed and `active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewConfirmation {
    pub listing: ListingRef,
    pub chat_id: ChatId,
    pub client_id: UserId,
    pub performer_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Sanitized representation of a confirmation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationView {
    pub id: ConfirmationId,
    pub listing: ListingRef,
    pub chat_id: ChatId,
    pub client_id: UserId,
    pub performer_id: UserId,
    pub confirmed: bool,
    pub status: &'static str,
    pub updated_at: DateTime<Utc>,
}

/// Sanitized representation of a response for candidate lists.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseView {
    pub id: ResponseId,
    pub user_id: UserId,
    pub price: u32,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Response> for ResponseView {
    fn from(response: &Response) -> Self {
        Self {
            id: response.id,
            user_id: response.user_id,
            price: response.price,
            description: response.description.clone(),
            created_at: response.created_at,
        }
    }
}
