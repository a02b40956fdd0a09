//! # Validation Module
//!
//! Input validation utilities for SubTrack.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI form                                                       │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (NOT NULL / CHECK constraints)                      │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use subtrack_core::validation::{validate_amount, validate_name};
//! use subtrack_core::Money;
//!
//! validate_name("Netflix").unwrap();
//! validate_amount(Money::from_cents(1500)).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Subscription;
use crate::{MAX_NAME_LENGTH, MAX_NOTE_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a subscription name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most [`MAX_NAME_LENGTH`] characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates an optional subscription note.
pub fn validate_note(note: Option<&str>) -> ValidationResult<()> {
    if let Some(note) = note {
        if note.len() > MAX_NOTE_LENGTH {
            return Err(ValidationError::TooLong {
                field: "note".to_string(),
                max: MAX_NOTE_LENGTH,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Amount Validators
// =============================================================================

/// Validates a subscription amount.
///
/// ## Rules
/// - Must be strictly positive: the original entry form rejects a
///   zero-amount subscription outright
pub fn validate_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a monthly income figure.
///
/// ## Rules
/// - Must not be negative; zero is a valid "no income recorded" state
pub fn validate_income(income: Money) -> ValidationResult<()> {
    if income.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "income".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a complete subscription before it enters a user's set.
pub fn validate_subscription(sub: &Subscription) -> ValidationResult<()> {
    validate_name(&sub.name)?;
    validate_amount(sub.amount)?;
    validate_note(sub.note.as_deref())?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Frequency, Priority};

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Netflix").is_ok());
        assert!(validate_name("  ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_amount_rejects_zero() {
        assert!(validate_amount(Money::from_cents(1)).is_ok());
        assert!(validate_amount(Money::zero()).is_err());
        assert!(validate_amount(Money::from_cents(-100)).is_err());
    }

    #[test]
    fn test_validate_income_allows_zero() {
        assert!(validate_income(Money::zero()).is_ok());
        assert!(validate_income(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_subscription() {
        let mut sub = Subscription::new(
            "Gym",
            Money::from_cents(3000),
            Frequency::Monthly,
            Priority::High,
        );
        assert!(validate_subscription(&sub).is_ok());

        sub.amount = Money::zero();
        assert!(validate_subscription(&sub).is_err());
    }
}
