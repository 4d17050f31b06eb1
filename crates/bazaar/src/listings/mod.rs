//! Listing-domain core: type registry, storage seams, the engagement state
//! machine, and the promotion subsystem.

pub mod engagement;
pub mod promotion;
pub mod registry;
pub mod store;

pub use registry::{
    ListingRef, ListingStatus, ListingType, ListingTypeDescriptor, ListingTypeRegistry,
    ParseListingTypeError,
};
