use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{Confirmation, ConfirmationStatus, NewConfirmation};
use super::repository::{EngagementRepository, EngagementStoreError};
use crate::listings::registry::{ListingRef, ListingStatus};
use crate::listings::store::{ChatError, ChatService, UserId};

/// The confirmation workflow: pending conversations, exclusive confirmation,
/// cancellation, and completion, with their cascading side effects.
///
/// Every mutating operation runs as a single transaction; a failure midway
/// rolls back all writes, including the listing-status write it would have
/// carried.
pub struct EngagementStateMachine<R, C> {
    repository: Arc<R>,
    chat: Arc<C>,
}

impl<R, C> Clone for EngagementStateMachine<R, C> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            chat: self.chat.clone(),
        }
    }
}

impl<R, C> EngagementStateMachine<R, C>
where
    R: EngagementRepository + 'static,
    C: ChatService + 'static,
{
    pub fn new(repository: Arc<R>, chat: Arc<C>) -> Self {
        Self { repository, chat }
    }

    /// Start a candidate conversation: create the chat channel, then insert
    /// an unconfirmed `active` row holding its id. No exclusivity check at
    /// this point, parallel candidate conversations may coexist.
    ///
    /// The chat call happens before the transaction begins; a caller-side
    /// abort is only safe there, never mid-transaction.
    pub fn open(
        &self,
        listing: ListingRef,
        client: UserId,
        performer: UserId,
        now: DateTime<Utc>,
    ) -> Result<Confirmation, EngagementError> {
        let chat_id = self.chat.create_chat(client, performer)?;

        self.repository.transaction(|tx| {
            let confirmation = tx.insert_confirmation(NewConfirmation {
                listing,
                chat_id,
                client_id: client,
                performer_id: performer,
                created_at: now,
            })?;
            Ok(confirmation)
        })
    }

    /// Lock in the performer recorded on the acting user's conversation.
    ///
    /// In one transaction: mark the row confirmed and `in_progress`, delete
    /// every rival response, and move the listing itself to `in_progress`.
    /// Calling confirm again on an already-locked engagement is a no-op
    /// success for either party; a stale confirm against a listing locked to
    /// someone else fails `ConfirmationNotFound`.
    pub fn confirm(
        &self,
        listing: ListingRef,
        acting_user: UserId,
        now: DateTime<Utc>,
    ) -> Result<Confirmation, EngagementError> {
        let confirmation = self.repository.transaction(|tx| {
            if let Some(existing) = tx.confirmed_confirmation(listing)? {
                if existing.involves(acting_user) {
                    return Ok(existing);
                }
                return Err(EngagementError::ConfirmationNotFound);
            }

            let mut row = tx
                .confirmation_for_actor(listing, acting_user)?
                .ok_or(EngagementError::ConfirmationNotFound)?;

            row.confirmed = true;
            row.status = ConfirmationStatus::InProgress;
            row.updated_at = now;
            tx.update_confirmation(&row)?;

            // The cascade filter reads the performer just made durable above.
            tx.delete_rival_responses(listing, row.performer_id)?;
            tx.set_listing_status(listing, ListingStatus::InProgress)?;

            Ok(row)
        })?;

        info!(listing = %listing, performer = confirmation.performer_id.0, "engagement confirmed");
        Ok(confirmation)
    }

    /// Release the exclusivity lock: the confirmed row becomes `archived`
    /// and unconfirmed, and the listing can start a fresh cycle.
    ///
    /// Rival responses deleted by the confirm cascade are NOT restored;
    /// rejected candidates must bid again.
    pub fn cancel(
        &self,
        listing: ListingRef,
        acting_user: UserId,
        now: DateTime<Utc>,
    ) -> Result<Confirmation, EngagementError> {
        self.repository.transaction(|tx| {
            let mut row = tx
                .confirmed_confirmation(listing)?
                .filter(|row| row.involves(acting_user))
                .ok_or(EngagementError::ConfirmationNotFound)?;

            row.confirmed = false;
            row.status = ConfirmationStatus::Archived;
            row.updated_at = now;
            tx.update_confirmation(&row)?;

            Ok(row)
        })
    }

    /// Mark the confirmed engagement finished, on both the row and the
    /// listing, in one transaction.
    pub fn complete(
        &self,
        listing: ListingRef,
        now: DateTime<Utc>,
    ) -> Result<Confirmation, EngagementError> {
        self.repository.transaction(|tx| {
            let mut row = tx
                .confirmed_confirmation(listing)?
                .ok_or(EngagementError::ConfirmationNotFound)?;

            row.status = ConfirmationStatus::Done;
            row.updated_at = now;
            tx.update_confirmation(&row)?;
            tx.set_listing_status(listing, ListingStatus::Done)?;

            Ok(row)
        })
    }

    /// Let a performer withdraw from a conversation before being locked in.
    /// Silent no-op when no unconfirmed row exists for them.
    pub fn delete_pending_by_performer(
        &self,
        listing: ListingRef,
        performer: UserId,
    ) -> Result<(), EngagementError> {
        self.repository.transaction(|tx| {
            tx.delete_unconfirmed_by_performer(listing, performer)?;
            Ok(())
        })
    }

    /// Distinct performer ids across all confirmation rows for a listing,
    /// used for notification fan-out by the messaging collaborator.
    pub fn performer_ids(&self, listing: ListingRef) -> Result<BTreeSet<UserId>, EngagementError> {
        self.repository.transaction(|tx| Ok(tx.performer_ids(listing)?))
    }
}

/// Error raised by the engagement state machine.
#[derive(Debug, thiserror::Error)]
pub enum EngagementError {
    #[error("no matching confirmation for this listing")]
    ConfirmationNotFound,
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error(transparent)]
    Store(#[from] EngagementStoreError),
}
