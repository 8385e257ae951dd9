use std::sync::atomic::{AtomicI64, Ordering};

use time::OffsetDateTime;

static LAST_SORT_KEY: AtomicI64 = AtomicI64::new(i64::MIN);

/// Creation-order key, strictly increasing within the process.
///
/// Based on the creation time in nanoseconds, bumped by one on collisions so that
/// two records created in the same instant still get distinct positions.
pub fn next_sort_key(created: OffsetDateTime) -> i64 {
    let candidate = i64::try_from(created.unix_timestamp_nanos()).unwrap_or(i64::MAX);

    let previous = LAST_SORT_KEY
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(candidate.max(last.saturating_add(1)))
        })
        .unwrap_or_else(|last| last);

    candidate.max(previous.saturating_add(1))
}
