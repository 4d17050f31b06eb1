use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::window::{InvalidDuration, PromotionWindow};
use crate::listings::registry::ListingRef;
use crate::listings::store::{ListingStore, ListingStoreError, UserId};

/// Applies a purchased boost window to a listing. Orthogonal to ranking;
/// shares the window encoding with the clock and ranker.
pub struct TopAssignmentService<S> {
    store: Arc<S>,
}

impl<S> Clone for TopAssignmentService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S> TopAssignmentService<S>
where
    S: ListingStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Write a fresh window over whatever was stored before. The store
    /// refreshes the row's `updated_at` as part of the same write.
    pub fn activate(
        &self,
        listing: ListingRef,
        duration_days: i64,
        now: DateTime<Utc>,
    ) -> Result<PromotionWindow, PromotionError> {
        let window = PromotionWindow::new(now, duration_days)?;
        self.store
            .set_promotion_field(listing, &window.encode())
            .map_err(|error| match error {
                ListingStoreError::NotFound => PromotionError::ListingNotFound,
                other => PromotionError::Store(other),
            })?;

        info!(listing = %listing, days = duration_days, "promotion window activated");
        Ok(window)
    }

    /// Owner lookup for the authorization collaborator gating boost
    /// purchases.
    pub fn owner_id(&self, listing: ListingRef) -> Result<UserId, PromotionError> {
        self.store.owner_id(listing).map_err(|error| match error {
            ListingStoreError::NotFound => PromotionError::ListingNotFound,
            other => PromotionError::Store(other),
        })
    }

    /// The currently stored window, decoded. `None` covers empty, lapsed
    /// legacy, and malformed fields alike.
    pub fn current_window(
        &self,
        listing: ListingRef,
    ) -> Result<Option<PromotionWindow>, PromotionError> {
        let raw = self
            .store
            .promotion_field(listing)
            .map_err(|error| match error {
                ListingStoreError::NotFound => PromotionError::ListingNotFound,
                other => PromotionError::Store(other),
            })?;

        Ok(raw.as_deref().and_then(PromotionWindow::decode))
    }
}

/// Error raised by the top-assignment service.
#[derive(Debug, thiserror::Error)]
pub enum PromotionError {
    #[error(transparent)]
    InvalidDuration(#[from] InvalidDuration),
    #[error("listing not found")]
    ListingNotFound,
    #[error(transparent)]
    Store(ListingStoreError),
}
