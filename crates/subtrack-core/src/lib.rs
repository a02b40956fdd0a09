//! # subtrack-core: Pure Business Logic for SubTrack
//!
//! This crate is the **heart** of SubTrack. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SubTrack Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI / API Surface                             │   │
//! │  │    subscription list ──► budget summary ──► offline notice     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    subtrack-sync                                │   │
//! │  │    SyncedRepository: remote-first reads, cache-backed writes   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ subtrack-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  budget   │  │ validation│  │   │
//! │  │   │ Subscript.│  │   Money   │  │  Summary  │  │   rules   │  │   │
//! │  │   │ Frequency │  │  (cents)  │  │  math     │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Subscription, PendingWrite, UserRecord, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`budget`] - Monthly total / remaining budget computation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use subtrack_core::money::Money;
//! use subtrack_core::types::Frequency;
//!
//! // Create money from cents (never from floats!)
//! let amount = Money::from_cents(1000); // 10.00/week
//!
//! // Weekly spend normalized to a month (× 4.33)
//! let monthly = Frequency::Weekly.monthly_equivalent(amount);
//! assert_eq!(monthly.cents(), 4330); // 43.30/month
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod budget;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use subtrack_core::Money` instead of
// `use subtrack_core::money::Money`

pub use budget::BudgetSummary;
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Average weeks per month, in hundredths (433 = 4.33).
///
/// ## Why hundredths?
/// The weekly→monthly factor is the only fractional constant in the budget
/// math. Keeping it as an integer lets every monthly-equivalent amount be
/// computed in exact integer cents: `cents × 433 / 100`, rounded half up.
pub const WEEKS_PER_MONTH_HUNDREDTHS: i64 = 433;

/// Months per year, for normalizing yearly subscriptions.
pub const MONTHS_PER_YEAR: i64 = 12;

/// Maximum length of a subscription name.
///
/// ## Business Reason
/// Prevents runaway rows in the subscription table; more than enough for
/// any real service name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length of a subscription note.
pub const MAX_NOTE_LENGTH: usize = 500;
