//! Response/confirmation workflow: turning an open listing into an exclusive
//! engagement between a client and one performer.
//!
//! One generic engine serves all six listing domains; per-domain storage
//! layout is resolved through the listing-type registry, never duplicated.

pub mod domain;
pub mod ledger;
pub mod machine;
pub mod memory;
pub mod repository;
pub mod router;

#[cfg(test)]
mod tests;

pub use domain::{
    Confirmation, ConfirmationId, ConfirmationStatus, ConfirmationView, NewConfirmation,
    NewResponse, Response, ResponseId, ResponseView,
};
pub use ledger::{ResponseLedger, ResponseLedgerError};
pub use memory::InMemoryEngagementRepository;
pub use machine::{EngagementError, EngagementStateMachine};
pub use repository::{EngagementRepository, EngagementStoreError, EngagementTx};
pub use router::{engagement_router, EngagementHandle};
