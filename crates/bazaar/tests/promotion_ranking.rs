//! Integration specifications for the promotion subsystem: boost purchase,
//! lazy expiry, and the two ranking modes over decoded listing projections.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use bazaar::listings::promotion::{
    lift_promoted, rank_full, Promotable, PromotionWindow, TopAssignmentService,
};
use bazaar::listings::registry::{ListingRef, ListingStatus, ListingType};
use bazaar::listings::store::{ListingStore, ListingStoreError, UserId};

#[derive(Default)]
struct MemoryListingStore {
    rows: Mutex<HashMap<ListingRef, ListingRow>>,
}

#[derive(Clone)]
struct ListingRow {
    owner: UserId,
    status: ListingStatus,
    promotion: Option<String>,
}

impl MemoryListingStore {
    fn seed(&self, listing: ListingRef, owner: UserId) {
        self.rows.lock().expect("store mutex poisoned").insert(
            listing,
            ListingRow {
                owner,
                status: ListingStatus::Active,
                promotion: None,
            },
        );
    }
}

impl ListingStore for MemoryListingStore {
    fn status(&self, listing: ListingRef) -> Result<ListingStatus, ListingStoreError> {
        let rows = self.rows.lock().expect("store mutex poisoned");
        rows.get(&listing)
            .map(|row| row.status)
            .ok_or(ListingStoreError::NotFound)
    }

    fn set_status(
        &self,
        listing: ListingRef,
        status: ListingStatus,
    ) -> Result<(), ListingStoreError> {
        let mut rows = self.rows.lock().expect("store mutex poisoned");
        let row = rows.get_mut(&listing).ok_or(ListingStoreError::NotFound)?;
        row.status = status;
        Ok(())
    }

    fn owner_id(&self, listing: ListingRef) -> Result<UserId, ListingStoreError> {
        let rows = self.rows.lock().expect("store mutex poisoned");
        rows.get(&listing)
            .map(|row| row.owner)
            .ok_or(ListingStoreError::NotFound)
    }

    fn promotion_field(&self, listing: ListingRef) -> Result<Option<String>, ListingStoreError> {
        let rows = self.rows.lock().expect("store mutex poisoned");
        rows.get(&listing)
            .map(|row| row.promotion.clone())
            .ok_or(ListingStoreError::NotFound)
    }

    fn set_promotion_field(
        &self,
        listing: ListingRef,
        raw: &str,
    ) -> Result<(), ListingStoreError> {
        let mut rows = self.rows.lock().expect("store mutex poisoned");
        let row = rows.get_mut(&listing).ok_or(ListingStoreError::NotFound)?;
        row.promotion = Some(raw.to_string());
        Ok(())
    }
}

#[derive(Debug)]
struct SearchRow {
    listing: ListingRef,
    price: u32,
    promotion: Option<PromotionWindow>,
    created_at: DateTime<Utc>,
}

impl Promotable for SearchRow {
    fn promotion(&self) -> Option<&PromotionWindow> {
        self.promotion.as_ref()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, d, 0, 0, 0)
        .single()
        .expect("valid date")
}

fn listing(id: i64) -> ListingRef {
    ListingRef::new(ListingType::Ad, id)
}

#[test]
fn purchased_boost_lifts_a_search_page_without_reordering_the_rest() {
    let store = Arc::new(MemoryListingStore::default());
    for id in 1..=4 {
        store.seed(listing(id), UserId(10 + id));
    }
    let service = TopAssignmentService::new(store.clone());

    // Listings 2 and 4 buy boosts on different days.
    service.activate(listing(2), 7, day(10)).expect("boost 2");
    service.activate(listing(4), 7, day(12)).expect("boost 4");

    // A price-ascending search page, promotion decoded per row.
    let now = day(14);
    let mut page: Vec<SearchRow> = (1..=4)
        .map(|id| SearchRow {
            listing: listing(id),
            price: 100 * id as u32,
            promotion: service.current_window(listing(id)).expect("readable"),
            created_at: day(id as u32),
        })
        .collect();

    lift_promoted(&mut page, now);

    let ids: Vec<i64> = page.iter().map(|row| row.listing.id).collect();
    assert_eq!(ids, vec![2, 4, 1, 3], "actives lifted, both groups keep price order");
    let prices: Vec<u32> = page.iter().map(|row| row.price).collect();
    assert_eq!(prices, vec![200, 400, 100, 300]);
}

#[test]
fn full_ranking_orders_actives_by_activation_then_recency() {
    let store = Arc::new(MemoryListingStore::default());
    for id in 1..=4 {
        store.seed(listing(id), UserId(10 + id));
    }
    let service = TopAssignmentService::new(store.clone());
    service.activate(listing(1), 30, day(5)).expect("boost 1");
    service.activate(listing(3), 30, day(9)).expect("boost 3");

    let now = day(15);
    let mut mine: Vec<SearchRow> = (1..=4)
        .map(|id| SearchRow {
            listing: listing(id),
            price: 100,
            promotion: service.current_window(listing(id)).expect("readable"),
            created_at: day(id as u32),
        })
        .collect();

    rank_full(&mut mine, now);

    let ids: Vec<i64> = mine.iter().map(|row| row.listing.id).collect();
    // Later activation first among actives; newer creation first among the rest.
    assert_eq!(ids, vec![3, 1, 4, 2]);
}

#[test]
fn boosts_lapse_lazily_at_read_time() {
    let store = Arc::new(MemoryListingStore::default());
    store.seed(listing(1), UserId(11));
    let service = TopAssignmentService::new(store);

    let window = service.activate(listing(1), 7, day(1)).expect("boost");
    assert!(window.is_active(day(7)));
    assert!(!window.is_active(day(8)));

    // Nothing rewrites the stored field when it lapses.
    let stored = service
        .current_window(listing(1))
        .expect("readable")
        .expect("still stored");
    assert_eq!(stored, window);
    assert!(!stored.is_active(day(9)));
}

#[test]
fn owner_check_supports_the_authorization_collaborator() {
    let store = Arc::new(MemoryListingStore::default());
    store.seed(listing(1), UserId(77));
    let service = TopAssignmentService::new(store);

    assert_eq!(service.owner_id(listing(1)).expect("owner"), UserId(77));
}
