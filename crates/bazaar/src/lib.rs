//! Marketplace backend engine: listing engagement workflows and promotion ranking.
//!
//! The crate is a library-level core invoked by an HTTP layer. Listing CRUD,
//! chat storage, and review aggregation live behind narrow collaborator traits
//! in [`listings::store`]; the hard invariants (response uniqueness,
//! confirmation exclusivity, transactional cascades, promotion ordering) live
//! here.

pub mod config;
pub mod error;
pub mod listings;
pub mod telemetry;
