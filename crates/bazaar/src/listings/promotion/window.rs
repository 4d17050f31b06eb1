use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A time-bounded paid boost, serialized into a single text field on the
/// listing row.
///
/// Invariant: `expires_at = activated_at + duration_days` (days, UTC). A
/// later purchase overwrites the whole window; there is no stacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionWindow {
    pub activated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub duration_days: i64,
}

impl PromotionWindow {
    /// Build a window starting at `activated_at` (normalized to UTC).
    /// Fails for non-positive durations.
    pub fn new(
        activated_at: DateTime<Utc>,
        duration_days: i64,
    ) -> Result<Self, InvalidDuration> {
        if duration_days <= 0 {
            return Err(InvalidDuration { duration_days });
        }

        Ok(Self {
            activated_at,
            expires_at: activated_at + Duration::days(duration_days),
            duration_days,
        })
    }

    /// Serialized form stored in the listing's promotion column.
    pub fn encode(&self) -> String {
        // PromotionWindow serializes to a flat JSON object; infallible.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse the stored text. Falls back to interpreting legacy data (a bare
    /// RFC3339 timestamp) as an already-expired window. Total failure is
    /// `None`, which callers must treat as "no active promotion", never as
    /// a fault; a diagnostic is logged so malformed rows stay visible.
    pub fn decode(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Ok(window) = serde_json::from_str::<Self>(trimmed) {
            return Some(window);
        }

        if let Ok(legacy) = DateTime::parse_from_rfc3339(trimmed) {
            let instant = legacy.with_timezone(&Utc);
            return Some(Self {
                activated_at: instant,
                expires_at: instant,
                duration_days: 0,
            });
        }

        warn!(raw = trimmed, "unparseable promotion field, treating as inactive");
        None
    }

    /// Whether the boost is live at `now`: within `[activated_at, expires_at)`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.activated_at <= now && now < self.expires_at
    }
}

/// Raised for boost purchases with a non-positive duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("promotion duration must be positive, got {duration_days} days")]
pub struct InvalidDuration {
    pub duration_days: i64,
}
