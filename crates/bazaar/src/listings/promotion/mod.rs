//! Promotion ("Top") subsystem: time-bounded boost windows and the
//! comparators that reorder listing result sets around them.
//!
//! Expiry is evaluated lazily at read time via [`PromotionWindow::is_active`];
//! there is no sweep job. A lapsed window simply stops sorting first and is
//! overwritten by the next purchase.

pub mod assignment;
pub mod ranker;
pub mod window;

pub use assignment::{PromotionError, TopAssignmentService};
pub use ranker::{lift_promoted, rank_full, Promotable};
pub use window::{InvalidDuration, PromotionWindow};
