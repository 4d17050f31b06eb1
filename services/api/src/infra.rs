use bazaar::listings::registry::{ListingRef, ListingStatus, ListingType};
use bazaar::listings::store::{
    ChatError, ChatId, ChatService, ListingStore, ListingStoreError, ReviewSource, UserId,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Listing-row adapter backing all six domains with one map keyed by
/// `ListingRef`, the way a relational adapter resolves one table per type.
#[derive(Default)]
pub(crate) struct InMemoryListingStore {
    rows: Mutex<HashMap<ListingRef, ListingRow>>,
}

#[derive(Clone)]
struct ListingRow {
    owner: UserId,
    status: ListingStatus,
    promotion: Option<String>,
}

impl InMemoryListingStore {
    pub(crate) fn seed(&self, listing: ListingRef, owner: UserId) {
        self.rows.lock().expect("listing mutex poisoned").insert(
            listing,
            ListingRow {
                owner,
                status: ListingStatus::Active,
                promotion: None,
            },
        );
    }
}

impl ListingStore for InMemoryListingStore {
    fn status(&self, listing: ListingRef) -> Result<ListingStatus, ListingStoreError> {
        let rows = self.rows.lock().expect("listing mutex poisoned");
        rows.get(&listing)
            .map(|row| row.status)
            .ok_or(ListingStoreError::NotFound)
    }

    fn set_status(
        &self,
        listing: ListingRef,
        status: ListingStatus,
    ) -> Result<(), ListingStoreError> {
        let mut rows = self.rows.lock().expect("listing mutex poisoned");
        let row = rows.get_mut(&listing).ok_or(ListingStoreError::NotFound)?;
        row.status = status;
        Ok(())
    }

    fn owner_id(&self, listing: ListingRef) -> Result<UserId, ListingStoreError> {
        let rows = self.rows.lock().expect("listing mutex poisoned");
        rows.get(&listing)
            .map(|row| row.owner)
            .ok_or(ListingStoreError::NotFound)
    }

    fn promotion_field(&self, listing: ListingRef) -> Result<Option<String>, ListingStoreError> {
        let rows = self.rows.lock().expect("listing mutex poisoned");
        rows.get(&listing)
            .map(|row| row.promotion.clone())
            .ok_or(ListingStoreError::NotFound)
    }

    fn set_promotion_field(
        &self,
        listing: ListingRef,
        raw: &str,
    ) -> Result<(), ListingStoreError> {
        let mut rows = self.rows.lock().expect("listing mutex poisoned");
        let row = rows.get_mut(&listing).ok_or(ListingStoreError::NotFound)?;
        row.promotion = Some(raw.to_string());
        Ok(())
    }
}

/// Chat adapter issuing sequential conversation ids.
#[derive(Default)]
pub(crate) struct InMemoryChatService {
    next_id: AtomicI64,
}

impl ChatService for InMemoryChatService {
    fn create_chat(&self, _client: UserId, _performer: UserId) -> Result<ChatId, ChatError> {
        Ok(ChatId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1))
    }
}

/// Review aggregates for listing cards; unknown listings read as unreviewed.
#[derive(Default)]
pub(crate) struct InMemoryReviewSource {
    aggregates: Mutex<HashMap<ListingRef, (u32, f32)>>,
}

impl InMemoryReviewSource {
    pub(crate) fn seed(&self, listing: ListingRef, count: u32, rating: f32) {
        self.aggregates
            .lock()
            .expect("review mutex poisoned")
            .insert(listing, (count, rating));
    }
}

impl ReviewSource for InMemoryReviewSource {
    fn review_count(&self, listing: ListingRef) -> u32 {
        let aggregates = self.aggregates.lock().expect("review mutex poisoned");
        aggregates.get(&listing).map(|(count, _)| *count).unwrap_or(0)
    }

    fn average_rating(&self, listing: ListingRef) -> f32 {
        let aggregates = self.aggregates.lock().expect("review mutex poisoned");
        aggregates.get(&listing).map(|(_, rating)| *rating).unwrap_or(0.0)
    }
}

/// One renderable catalog row. The serving layer keeps title/price/creation
/// alongside the `ListingRef`; the store only carries status and promotion.
#[derive(Clone)]
pub(crate) struct CatalogEntry {
    pub(crate) listing: ListingRef,
    pub(crate) title: String,
    pub(crate) price: u32,
    pub(crate) created_at: DateTime<Utc>,
}

/// Demo catalog used by `serve` without a database and by the CLI demo.
/// Price-ascending, so the lift-only mode has a meaningful base order.
pub(crate) fn seed_catalog(
    store: &InMemoryListingStore,
    reviews: &InMemoryReviewSource,
) -> Vec<CatalogEntry> {
    let entries = vec![
        catalog_entry(ListingType::Service, 1, "Apartment deep clean", 90, 3),
        catalog_entry(ListingType::Service, 2, "Furniture assembly", 120, 9),
        catalog_entry(ListingType::Work, 3, "Weekend courier shifts", 150, 5),
        catalog_entry(ListingType::Rent, 4, "Studio near the station", 480, 1),
        catalog_entry(ListingType::Ad, 5, "Road bike, barely used", 650, 7),
    ];

    for (index, entry) in entries.iter().enumerate() {
        store.seed(entry.listing, UserId(10 + index as i64));
        reviews.seed(entry.listing, 4 + index as u32, 4.9 - index as f32 * 0.3);
    }

    entries
}

fn catalog_entry(
    listing_type: ListingType,
    id: i64,
    title: &str,
    price: u32,
    created_day: u32,
) -> CatalogEntry {
    CatalogEntry {
        listing: ListingRef::new(listing_type, id),
        title: title.to_string(),
        price,
        created_at: Utc
            .with_ymd_and_hms(2024, 6, created_day, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
}
