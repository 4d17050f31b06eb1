use std::collections::BTreeSet;

use super::domain::{
    Confirmation, ConfirmationId, NewConfirmation, NewResponse, Response, ResponseId,
};
use crate::listings::registry::{ListingRef, ListingStatus};
use crate::listings::store::UserId;

/// Error enumeration for engagement-storage failures.
#[derive(Debug, thiserror::Error)]
pub enum EngagementStoreError {
    /// A uniqueness constraint rejected the write.
    #[error("row already exists")]
    Conflict,
    #[error("row not found")]
    NotFound,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Row-level primitives available inside one transaction.
///
/// Statement order matters to callers: the confirm cascade updates the
/// confirmation before deleting rival responses, and relies on
/// read-your-writes semantics within the transaction.
pub trait EngagementTx {
    fn insert_response(&mut self, response: NewResponse) -> Result<Response, EngagementStoreError>;
    fn count_responses(
        &mut self,
        listing: ListingRef,
        user: UserId,
    ) -> Result<u64, EngagementStoreError>;
    fn delete_response(&mut self, id: ResponseId) -> Result<bool, EngagementStoreError>;
    /// Deletes every response for `listing` except the one from `keep`;
    /// returns the number of rows removed.
    fn delete_rival_responses(
        &mut self,
        listing: ListingRef,
        keep: UserId,
    ) -> Result<u64, EngagementStoreError>;
    /// Responses for a listing ordered by `created_at` ascending.
    fn responses_for_listing(
        &mut self,
        listing: ListingRef,
    ) -> Result<Vec<Response>, EngagementStoreError>;

    fn insert_confirmation(
        &mut self,
        confirmation: NewConfirmation,
    ) -> Result<Confirmation, EngagementStoreError>;
    /// The most recent non-terminal row where `user` is client or performer.
    fn confirmation_for_actor(
        &mut self,
        listing: ListingRef,
        user: UserId,
    ) -> Result<Option<Confirmation>, EngagementStoreError>;
    /// The row currently holding the exclusivity lock, if any.
    fn confirmed_confirmation(
        &mut self,
        listing: ListingRef,
    ) -> Result<Option<Confirmation>, EngagementStoreError>;
    fn update_confirmation(
        &mut self,
        confirmation: &Confirmation,
    ) -> Result<(), EngagementStoreError>;
    /// Hard-deletes the unconfirmed row for `performer`, if one exists;
    /// returns the deleted id.
    fn delete_unconfirmed_by_performer(
        &mut self,
        listing: ListingRef,
        performer: UserId,
    ) -> Result<Option<ConfirmationId>, EngagementStoreError>;
    /// Distinct performer ids across all confirmation rows for a listing.
    fn performer_ids(
        &mut self,
        listing: ListingRef,
    ) -> Result<BTreeSet<UserId>, EngagementStoreError>;

    /// Writes the listing's shared `status` field. Only reachable from
    /// inside a transaction so the write commits or rolls back together
    /// with the engagement rows that caused it.
    fn set_listing_status(
        &mut self,
        listing: ListingRef,
        status: ListingStatus,
    ) -> Result<(), EngagementStoreError>;
}

/// Storage abstraction for the engagement subsystem.
///
/// `transaction` runs the closure against a transactional view; every write
/// is committed only when the closure returns `Ok`, and discarded wholesale
/// on `Err`. No partial cascade is ever observable.
pub trait EngagementRepository: Send + Sync {
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<EngagementStoreError>,
        F: FnOnce(&mut dyn EngagementTx) -> Result<T, E>;
}
