//! # Budget Summary
//!
//! The live summary figures the UI renders: total monthly spend, remaining
//! budget, remaining percentage.
//!
//! ## Computation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Budget Summary Computation                          │
//! │                                                                         │
//! │  Subscriptions                         Monthly equivalents             │
//! │  ─────────────                         ──────────────────              │
//! │  weekly   10.00  ──► × 4.33      ──►   43.30                           │
//! │  monthly  20.00  ──► as-is       ──►   20.00                           │
//! │  yearly  120.00  ──► ÷ 12        ──►   10.00                           │
//! │  one-time 50.00  ──► excluded    ──►    0.00                           │
//! │                                        ─────                           │
//! │  monthly_total                         73.30                           │
//! │                                                                         │
//! │  remaining         = income − monthly_total                            │
//! │  remaining_percent = remaining / income × 100  (0 when income is 0)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The summary is a pure function of `(income, subscriptions)`, so it is
//! identical whether the inputs were served by the remote store or by the
//! local cache.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::Subscription;

// =============================================================================
// Budget Summary
// =============================================================================

/// The three figures the summary panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    /// Sum of all monthly-equivalent subscription costs.
    pub monthly_total: Money,

    /// Income minus total. Negative when the user is over budget.
    pub remaining: Money,

    /// Remaining as a percentage of income (display only; 0 when income is 0).
    pub remaining_percent: f64,
}

impl BudgetSummary {
    /// Computes the summary for a user's income and subscription list.
    ///
    /// ## Example
    /// ```rust
    /// use subtrack_core::{BudgetSummary, Frequency, Money, Priority, Subscription};
    ///
    /// let subs = vec![Subscription::new(
    ///     "Netflix",
    ///     Money::from_cents(1500),
    ///     Frequency::Monthly,
    ///     Priority::Medium,
    /// )];
    /// let summary = BudgetSummary::compute(Money::from_cents(200_000), &subs);
    /// assert_eq!(summary.monthly_total.cents(), 1500);
    /// assert_eq!(summary.remaining.cents(), 198_500);
    /// ```
    pub fn compute(income: Money, subscriptions: &[Subscription]) -> BudgetSummary {
        let monthly_total: Money = subscriptions.iter().map(Subscription::monthly_cost).sum();
        let remaining = income - monthly_total;

        BudgetSummary {
            monthly_total,
            remaining,
            remaining_percent: remaining.percent_of(income),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Frequency, Priority};

    fn sub(name: &str, cents: i64, frequency: Frequency) -> Subscription {
        Subscription::new(name, Money::from_cents(cents), frequency, Priority::Medium)
    }

    #[test]
    fn test_mixed_frequencies_total() {
        // weekly(10) + monthly(20) + yearly(120) + one-time(50) → 73.30/month
        let subs = vec![
            sub("Coffee club", 1000, Frequency::Weekly),
            sub("Streaming", 2000, Frequency::Monthly),
            sub("Domain", 12000, Frequency::Yearly),
            sub("Course", 5000, Frequency::OneTime),
        ];

        let summary = BudgetSummary::compute(Money::from_cents(250_000), &subs);
        assert_eq!(summary.monthly_total.cents(), 7330);
        assert_eq!(summary.remaining.cents(), 242_670);
        assert!((summary.remaining_percent - 97.068).abs() < 0.001);
    }

    #[test]
    fn test_empty_list() {
        let summary = BudgetSummary::compute(Money::from_cents(100_000), &[]);
        assert!(summary.monthly_total.is_zero());
        assert_eq!(summary.remaining.cents(), 100_000);
        assert_eq!(summary.remaining_percent, 100.0);
    }

    #[test]
    fn test_zero_income_percent_is_zero() {
        let subs = vec![sub("Streaming", 2000, Frequency::Monthly)];
        let summary = BudgetSummary::compute(Money::zero(), &subs);
        assert_eq!(summary.remaining.cents(), -2000);
        assert_eq!(summary.remaining_percent, 0.0);
    }

    #[test]
    fn test_over_budget_goes_negative() {
        let subs = vec![sub("Everything", 150_000, Frequency::Monthly)];
        let summary = BudgetSummary::compute(Money::from_cents(100_000), &subs);
        assert_eq!(summary.remaining.cents(), -50_000);
        assert_eq!(summary.remaining_percent, -50.0);
    }
}
