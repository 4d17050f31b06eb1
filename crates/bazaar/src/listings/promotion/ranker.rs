use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::window::PromotionWindow;

/// Sort inputs for the promotion comparators. Implemented by whatever
/// projection a call site renders (listing cards, filtered search rows).
pub trait Promotable {
    fn promotion(&self) -> Option<&PromotionWindow>;
    fn created_at(&self) -> DateTime<Utc>;
}

fn active_window<T: Promotable>(item: &T, now: DateTime<Utc>) -> Option<&PromotionWindow> {
    item.promotion().filter(|window| window.is_active(now))
}

/// Full comparator, for "my listings" and status-filtered views.
///
/// Active boosts sort first; among them, later activation wins, ties broken
/// by newer creation. Among inactive items, newer creation first. The sort
/// is stable, equal-rank items keep their input order.
pub fn rank_full<T: Promotable>(items: &mut [T], now: DateTime<Utc>) {
    items.sort_by(|a, b| {
        match (active_window(a, now), active_window(b, now)) {
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(wa), Some(wb)) => wb
                .activated_at
                .cmp(&wa.activated_at)
                .then_with(|| b.created_at().cmp(&a.created_at())),
            (None, None) => b.created_at().cmp(&a.created_at()),
        }
    });
}

/// Lift-only comparator, for paginated or filtered search results.
///
/// The only rule applied is "active before inactive"; items of equal
/// active-state keep the relative order the underlying query produced
/// (price, rating, distance, ...). Correctness depends entirely on the
/// stability of `sort_by_key`.
pub fn lift_promoted<T: Promotable>(items: &mut [T], now: DateTime<Utc>) {
    items.sort_by_key(|item| active_window(item, now).is_none());
}
