//! Narrow interfaces to out-of-scope collaborators: the per-type listing
//! store, the chat service, and the read-only review source.

use super::registry::{ListingRef, ListingStatus};

/// Identifier for a marketplace user. The core trusts caller-supplied ids
/// and performs no authentication itself.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct UserId(pub i64);

/// Identifier for a conversation channel owned by the chat collaborator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ChatId(pub i64);

/// Error enumeration for listing-store failures.
#[derive(Debug, thiserror::Error)]
pub enum ListingStoreError {
    #[error("listing not found")]
    NotFound,
    #[error("listing store unavailable: {0}")]
    Unavailable(String),
}

/// Read/write access to the listing rows owned by the external CRUD
/// collaborator. One implementation serves all six domains by resolving the
/// table through [`super::registry::ListingTypeRegistry`].
pub trait ListingStore: Send + Sync {
    fn status(&self, listing: ListingRef) -> Result<ListingStatus, ListingStoreError>;
    fn set_status(&self, listing: ListingRef, status: ListingStatus)
        -> Result<(), ListingStoreError>;
    fn owner_id(&self, listing: ListingRef) -> Result<UserId, ListingStoreError>;
    fn promotion_field(&self, listing: ListingRef) -> Result<Option<String>, ListingStoreError>;
    /// Overwrites the serialized promotion window and refreshes the row's
    /// `updated_at`. Fails `NotFound` when zero rows are affected.
    fn set_promotion_field(&self, listing: ListingRef, raw: &str)
        -> Result<(), ListingStoreError>;
}

/// Error raised by the chat collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat service unavailable: {0}")]
    Unavailable(String),
}

/// Conversation-channel collaborator. The core only stores the returned id,
/// it never creates messages itself.
pub trait ChatService: Send + Sync {
    fn create_chat(&self, client: UserId, performer: UserId) -> Result<ChatId, ChatError>;
}

/// Read-only review aggregates consumed by display call sites.
pub trait ReviewSource: Send + Sync {
    fn review_count(&self, listing: ListingRef) -> u32;
    fn average_rating(&self, listing: ListingRef) -> f32;
}
