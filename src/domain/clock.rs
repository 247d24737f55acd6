//! Timestamps written to the backing store.
//!
//! Rows store naive timestamps shifted back by a fixed nine hours, matching the data set the
//! store was seeded with.

use time::{Duration, OffsetDateTime, PrimitiveDateTime};

pub const STORE_CLOCK_OFFSET: Duration = Duration::hours(9);

/// Naive store timestamp for the given instant.
pub fn store_timestamp(now: OffsetDateTime) -> PrimitiveDateTime {
    let shifted = now - STORE_CLOCK_OFFSET;
    PrimitiveDateTime::new(shifted.date(), shifted.time())
}

/// Naive store timestamp for the current instant.
pub fn store_now() -> PrimitiveDateTime {
    store_timestamp(OffsetDateTime::now_utc())
}
