use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::domain::{NewResponse, Response, ResponseId};
use super::repository::{EngagementRepository, EngagementStoreError};
use crate::listings::registry::ListingRef;
use crate::listings::store::UserId;

/// Per (listing, user) uniqueness enforcement for "I am interested"
/// submissions.
pub struct ResponseLedger<R> {
    repository: Arc<R>,
}

impl<R> Clone for ResponseLedger<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<R> ResponseLedger<R>
where
    R: EngagementRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Submit a bid of interest. The pre-insert existence check runs in the
    /// same transaction as the insert; the storage layer's uniqueness
    /// constraint backstops the check under true concurrency, and its
    /// conflict is reported as `AlreadyResponded` as well.
    pub fn submit(
        &self,
        listing: ListingRef,
        user: UserId,
        price: u32,
        description: String,
        now: DateTime<Utc>,
    ) -> Result<Response, ResponseLedgerError> {
        self.repository.transaction(|tx| {
            if tx.count_responses(listing, user)? > 0 {
                return Err(ResponseLedgerError::AlreadyResponded);
            }

            match tx.insert_response(NewResponse {
                listing,
                user_id: user,
                price,
                description,
                created_at: now,
            }) {
                Ok(response) => Ok(response),
                Err(EngagementStoreError::Conflict) => Err(ResponseLedgerError::AlreadyResponded),
                Err(other) => Err(other.into()),
            }
        })
    }

    /// Author-initiated deletion. Unlike the confirm cascade, a missing row
    /// here is reported as an error.
    pub fn delete(&self, id: ResponseId) -> Result<(), ResponseLedgerError> {
        self.repository.transaction(|tx| {
            if tx.delete_response(id)? {
                Ok(())
            } else {
                Err(ResponseLedgerError::ResponseNotFound)
            }
        })
    }

    /// Candidate list for a listing, first responder first.
    pub fn list_by_listing(&self, listing: ListingRef) -> Result<Vec<Response>, ResponseLedgerError> {
        self.repository
            .transaction(|tx| Ok(tx.responses_for_listing(listing)?))
    }
}

/// Error raised by the response ledger.
#[derive(Debug, thiserror::Error)]
pub enum ResponseLedgerError {
    #[error("user has already responded to this listing")]
    AlreadyResponded,
    #[error("response not found")]
    ResponseNotFound,
    #[error(transparent)]
    Store(#[from] EngagementStoreError),
}
