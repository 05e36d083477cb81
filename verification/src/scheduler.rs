//! Recurrence scheduling.

use pension_types::Timestamp;

/// Compute the next re-verification deadline from a successful outcome.
///
/// Pure: no state, no side effects, exact to the second, idempotent for the
/// same inputs.
pub fn next_due(verified_at: Timestamp, cadence_days: u32) -> Timestamp {
    verified_at.plus_days(cadence_days)
}
