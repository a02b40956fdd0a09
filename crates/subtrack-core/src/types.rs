//! # Domain Types
//!
//! Core domain types used throughout SubTrack.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Subscription   │   │   UserRecord    │   │  PendingWrite   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (millis)    │   │  id (opaque)    │   │  id (UUID)      │       │
//! │  │  name           │   │  name           │   │  kind           │       │
//! │  │  amount (cents) │   │  email          │   │  user_id        │       │
//! │  │  frequency      │   │  created_at     │   │  payload (JSON) │       │
//! │  │  priority       │   │  last_login     │   │  enqueued_at    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Frequency     │   │    Priority     │   │   RecordKind    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Weekly         │   │  Low            │   │  Subscriptions  │       │
//! │  │  Monthly        │   │  Medium         │   │  Income         │       │
//! │  │  Yearly         │   │  High           │   └─────────────────┘       │
//! │  │  OneTime        │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Subscription ids are creation-time-derived milliseconds, unique within a
//! single user's set (see [`next_subscription_id`]). Pending writes use
//! UUID v4 - globally unique without coordination, which matters offline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Record Kind
// =============================================================================

/// The two record kinds the document store holds per user.
///
/// Doubles as the cache namespace: the local store keys entries by
/// `(kind, user_id)`, so the kind string is an internal storage detail
/// rather than a contract callers build keys from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// The user's subscription list.
    Subscriptions,
    /// The user's monthly income scalar.
    Income,
}

impl RecordKind {
    /// Stable string form, used for storage columns and log fields.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Subscriptions => "subscriptions",
            RecordKind::Income => "income",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscriptions" => Ok(RecordKind::Subscriptions),
            "income" => Ok(RecordKind::Income),
            other => Err(crate::error::CoreError::UnknownRecordKind(other.to_string())),
        }
    }
}

// =============================================================================
// Frequency
// =============================================================================

/// How often a subscription recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    /// Charged every week; contributes `amount × 4.33` to the monthly total.
    Weekly,
    /// Charged every month; contributes `amount` as-is.
    Monthly,
    /// Charged once a year; contributes `amount ÷ 12`.
    Yearly,
    /// A single payment; contributes nothing to the recurring monthly total.
    OneTime,
}

impl Frequency {
    /// Normalizes an amount charged at this frequency to a monthly figure.
    ///
    /// ## Example
    /// ```rust
    /// use subtrack_core::{Frequency, Money};
    ///
    /// assert_eq!(
    ///     Frequency::Yearly.monthly_equivalent(Money::from_cents(12000)).cents(),
    ///     1000
    /// );
    /// assert!(Frequency::OneTime.monthly_equivalent(Money::from_cents(5000)).is_zero());
    /// ```
    pub fn monthly_equivalent(&self, amount: Money) -> Money {
        match self {
            Frequency::Weekly => amount.per_month_from_weekly(),
            Frequency::Monthly => amount,
            Frequency::Yearly => amount.per_month_from_yearly(),
            // One-time payments don't affect the recurring monthly picture
            Frequency::OneTime => Money::zero(),
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Monthly
    }
}

// =============================================================================
// Priority
// =============================================================================

/// User-assigned importance of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// A recurring subscription tracked against the monthly income.
///
/// Collection semantics: insertion-ordered, deleted by explicit user action,
/// never edited in place. A new entry replaces nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Creation-time-derived id (Unix milliseconds), unique per user.
    pub id: i64,

    /// Display name of the service ("Netflix", "Gym", ...).
    pub name: String,

    /// Amount charged per billing period, in cents.
    pub amount: Money,

    /// Billing period.
    pub frequency: Frequency,

    /// User-assigned importance.
    pub priority: Priority,

    /// Optional free-form note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Optional billing or renewal date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl Subscription {
    /// Creates a subscription with a creation-time-derived id.
    pub fn new(
        name: impl Into<String>,
        amount: Money,
        frequency: Frequency,
        priority: Priority,
    ) -> Self {
        Subscription {
            id: Utc::now().timestamp_millis(),
            name: name.into(),
            amount,
            frequency,
            priority,
            note: None,
            date: None,
        }
    }

    /// This subscription's contribution to the monthly total.
    #[inline]
    pub fn monthly_cost(&self) -> Money {
        self.frequency.monthly_equivalent(self.amount)
    }
}

/// Returns `candidate` or the smallest larger id that doesn't collide.
///
/// Millisecond ids collide when two subscriptions are created in the same
/// millisecond - trivial for Rust callers, impossible in the original UI.
pub fn next_subscription_id(existing: &[Subscription], candidate: i64) -> i64 {
    let mut id = candidate;
    while existing.iter().any(|s| s.id == id) {
        id += 1;
    }
    id
}

// =============================================================================
// User Record
// =============================================================================

/// An account record, owned by the auth subsystem.
///
/// Immutable after signup except for the login/update timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Opaque user id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
    /// Most recent successful login.
    pub last_login: Option<DateTime<Utc>>,
}

// =============================================================================
// Pending Write
// =============================================================================

/// A write intended for the remote store that could not be applied
/// immediately and is queued for replay.
///
/// Queue semantics: ordered by enqueue time, replayed in that order, NOT
/// deduplicated by key - two pending writes of the same kind for the same
/// user both replay, and the later one wins at the store. Consumed (and
/// removed) exactly once on successful replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingWrite {
    /// Queue entry id (UUID v4).
    pub id: String,
    /// Which record kind the payload replaces.
    pub kind: RecordKind,
    /// Owner of the record.
    pub user_id: String,
    /// The full value as JSON - a subscription list or an income scalar.
    pub payload: String,
    /// Number of replay attempts so far.
    pub attempts: i64,
    /// Last replay error, if any.
    pub last_error: Option<String>,
    /// When the write was queued; drives replay order.
    pub enqueued_at: DateTime<Utc>,
}

impl PendingWrite {
    /// Creates a fresh queue entry for a value that failed to reach the
    /// remote store.
    pub fn new(kind: RecordKind, user_id: impl Into<String>, payload: impl Into<String>) -> Self {
        PendingWrite {
            id: Uuid::new_v4().to_string(),
            kind,
            user_id: user_id.into(),
            payload: payload.into(),
            attempts: 0,
            last_error: None,
            enqueued_at: Utc::now(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_kind_round_trip() {
        for kind in [RecordKind::Subscriptions, RecordKind::Income] {
            let parsed: RecordKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("receipts".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_frequency_serde_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Frequency::OneTime).unwrap(),
            "\"one-time\""
        );
        let f: Frequency = serde_json::from_str("\"weekly\"").unwrap();
        assert_eq!(f, Frequency::Weekly);
    }

    #[test]
    fn test_monthly_equivalents() {
        let amount = Money::from_cents(1200);
        assert_eq!(Frequency::Monthly.monthly_equivalent(amount), amount);
        assert_eq!(
            Frequency::Yearly.monthly_equivalent(amount).cents(),
            100
        );
        assert!(Frequency::OneTime.monthly_equivalent(amount).is_zero());
    }

    #[test]
    fn test_next_subscription_id_skips_collisions() {
        let mut a = Subscription::new("A", Money::from_cents(100), Frequency::Monthly, Priority::Low);
        a.id = 1000;
        let mut b = a.clone();
        b.id = 1001;
        let existing = vec![a, b];

        assert_eq!(next_subscription_id(&existing, 1000), 1002);
        assert_eq!(next_subscription_id(&existing, 999), 999);
    }

    #[test]
    fn test_subscription_json_shape() {
        let mut sub = Subscription::new(
            "Gym",
            Money::from_cents(3000),
            Frequency::Monthly,
            Priority::High,
        );
        sub.id = 1700000000000;

        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["name"], "Gym");
        assert_eq!(json["amount"], 3000);
        assert_eq!(json["frequency"], "monthly");
        assert_eq!(json["priority"], "high");
        // Absent optionals stay out of the document
        assert!(json.get("note").is_none());
        assert!(json.get("date").is_none());
    }

    #[test]
    fn test_pending_write_new() {
        let w = PendingWrite::new(RecordKind::Income, "user-1", "2500");
        assert_eq!(w.kind, RecordKind::Income);
        assert_eq!(w.attempts, 0);
        assert!(w.last_error.is_none());
        assert!(Uuid::parse_str(&w.id).is_ok());
    }
}
