//! Discount Validity Windows
//!
//! A discount is applied only while its validity window contains "now".
//! States are evaluated lazily on every read/write touching the discount or
//! its target — there is no background job flipping flags.

use serde::Serialize;

/// Lifecycle state of a discount relative to a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountState {
    /// start_at is in the future
    Pending,
    /// start_at <= now < end_at
    Active,
    /// end_at has passed
    Expired,
}

/// Evaluate the state of a validity window at `now` (Unix millis)
pub fn state_at(start_at: i64, end_at: i64, now: i64) -> DiscountState {
    if now < start_at {
        DiscountState::Pending
    } else if now < end_at {
        DiscountState::Active
    } else {
        DiscountState::Expired
    }
}

/// Whether the window contains `now` (start inclusive, end exclusive)
pub fn is_active_at(start_at: i64, end_at: i64, now: i64) -> bool {
    state_at(start_at, end_at, now) == DiscountState::Active
}
