//! In-memory engagement repository with real transaction semantics: the
//! closure runs against a staged copy of the state, which replaces the live
//! state only on `Ok`. Used by the demo service and the test suites; a
//! relational adapter implements the same traits over its own transactions.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use super::domain::{
    Confirmation, ConfirmationId, ConfirmationStatus, NewConfirmation, NewResponse, Response,
    ResponseId,
};
use super::repository::{EngagementRepository, EngagementStoreError, EngagementTx};
use crate::listings::registry::{ListingRef, ListingStatus};
use crate::listings::store::UserId;

#[derive(Debug, Clone, Default)]
struct EngagementState {
    next_response_id: i64,
    next_confirmation_id: i64,
    responses: Vec<Response>,
    confirmations: Vec<Confirmation>,
    listing_status: HashMap<ListingRef, ListingStatus>,
}

#[derive(Default)]
pub struct InMemoryEngagementRepository {
    state: Mutex<EngagementState>,
}

impl InMemoryEngagementRepository {
    /// Committed listing status, for asserting the transactional writes the
    /// state machine carries.
    pub fn listing_status(&self, listing: ListingRef) -> Option<ListingStatus> {
        let state = self.state.lock().expect("engagement mutex poisoned");
        state.listing_status.get(&listing).copied()
    }

    /// Committed confirmation rows for a listing, insertion order.
    pub fn confirmations_for(&self, listing: ListingRef) -> Vec<Confirmation> {
        let state = self.state.lock().expect("engagement mutex poisoned");
        state
            .confirmations
            .iter()
            .filter(|row| row.listing == listing)
            .cloned()
            .collect()
    }
}

impl EngagementRepository for InMemoryEngagementRepository {
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<EngagementStoreError>,
        F: FnOnce(&mut dyn EngagementTx) -> Result<T, E>,
    {
        let mut guard = self.state.lock().expect("engagement mutex poisoned");
        let mut staged = guard.clone();

        match f(&mut MemoryTx { state: &mut staged }) {
            Ok(value) => {
                *guard = staged;
                Ok(value)
            }
            Err(error) => Err(error),
        }
    }
}

struct MemoryTx<'a> {
    state: &'a mut EngagementState,
}

impl EngagementTx for MemoryTx<'_> {
    fn insert_response(&mut self, response: NewResponse) -> Result<Response, EngagementStoreError> {
        // Uniqueness constraint on (listing, user), mirrored from the schema.
        let duplicate = self
            .state
            .responses
            .iter()
            .any(|row| row.listing == response.listing && row.user_id == response.user_id);
        if duplicate {
            return Err(EngagementStoreError::Conflict);
        }

        self.state.next_response_id += 1;
        let row = Response {
            id: ResponseId(self.state.next_response_id),
            listing: response.listing,
            user_id: response.user_id,
            price: response.price,
            description: response.description,
            created_at: response.created_at,
        };
        self.state.responses.push(row.clone());
        Ok(row)
    }

    fn count_responses(
        &mut self,
        listing: ListingRef,
        user: UserId,
    ) -> Result<u64, EngagementStoreError> {
        let count = self
            .state
            .responses
            .iter()
            .filter(|row| row.listing == listing && row.user_id == user)
            .count();
        Ok(count as u64)
    }

    fn delete_response(&mut self, id: ResponseId) -> Result<bool, EngagementStoreError> {
        let before = self.state.responses.len();
        self.state.responses.retain(|row| row.id != id);
        Ok(self.state.responses.len() < before)
    }

    fn delete_rival_responses(
        &mut self,
        listing: ListingRef,
        keep: UserId,
    ) -> Result<u64, EngagementStoreError> {
        let before = self.state.responses.len();
        self.state
            .responses
            .retain(|row| row.listing != listing || row.user_id == keep);
        Ok((before - self.state.responses.len()) as u64)
    }

    fn responses_for_listing(
        &mut self,
        listing: ListingRef,
    ) -> Result<Vec<Response>, EngagementStoreError> {
        let mut rows: Vec<Response> = self
            .state
            .responses
            .iter()
            .filter(|row| row.listing == listing)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    fn insert_confirmation(
        &mut self,
        confirmation: NewConfirmation,
    ) -> Result<Confirmation, EngagementStoreError> {
        self.state.next_confirmation_id += 1;
        let row = Confirmation {
            id: ConfirmationId(self.state.next_confirmation_id),
            listing: confirmation.listing,
            chat_id: confirmation.chat_id,
            client_id: confirmation.client_id,
            performer_id: confirmation.performer_id,
            confirmed: false,
            status: ConfirmationStatus::Active,
            created_at: confirmation.created_at,
            updated_at: confirmation.created_at,
        };
        self.state.confirmations.push(row.clone());
        Ok(row)
    }

    fn confirmation_for_actor(
        &mut self,
        listing: ListingRef,
        user: UserId,
    ) -> Result<Option<Confirmation>, EngagementStoreError> {
        let row = self
            .state
            .confirmations
            .iter()
            .filter(|row| {
                row.listing == listing
                    && row.involves(user)
                    && matches!(
                        row.status,
                        ConfirmationStatus::Active | ConfirmationStatus::InProgress
                    )
            })
            .max_by_key(|row| (row.created_at, row.id));
        Ok(row.cloned())
    }

    fn confirmed_confirmation(
        &mut self,
        listing: ListingRef,
    ) -> Result<Option<Confirmation>, EngagementStoreError> {
        let row = self
            .state
            .confirmations
            .iter()
            .find(|row| row.listing == listing && row.confirmed);
        Ok(row.cloned())
    }

    fn update_confirmation(
        &mut self,
        confirmation: &Confirmation,
    ) -> Result<(), EngagementStoreError> {
        let row = self
            .state
            .confirmations
            .iter_mut()
            .find(|row| row.id == confirmation.id)
            .ok_or(EngagementStoreError::NotFound)?;
        *row = confirmation.clone();
        Ok(())
    }

    fn delete_unconfirmed_by_performer(
        &mut self,
        listing: ListingRef,
        performer: UserId,
    ) -> Result<Option<ConfirmationId>, EngagementStoreError> {
        let position = self.state.confirmations.iter().position(|row| {
            row.listing == listing && row.performer_id == performer && !row.confirmed
        });
        Ok(position.map(|index| self.state.confirmations.remove(index).id))
    }

    fn performer_ids(
        &mut self,
        listing: ListingRef,
    ) -> Result<BTreeSet<UserId>, EngagementStoreError> {
        Ok(self
            .state
            .confirmations
            .iter()
            .filter(|row| row.listing == listing)
            .map(|row| row.performer_id)
            .collect())
    }

    fn set_listing_status(
        &mut self,
        listing: ListingRef,
        status: ListingStatus,
    ) -> Result<(), EngagementStoreError> {
        self.state.listing_status.insert(listing, status);
        Ok(())
    }
}
