//! Total order over merged events.

use crate::domain::{EventKind, TimeMs};

/// Sort key for the merged event stream.
///
/// Ordering: timestamp -> kind (trade before mark) -> input sequence.
/// The sequence keeps same-kind, same-instant events in the order the caller
/// supplied them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventOrderingKey {
    pub time_ms: TimeMs,
    pub kind: EventKind,
    pub seq: usize,
}

impl EventOrderingKey {
    pub fn new(time_ms: TimeMs, kind: EventKind, seq: usize) -> Self {
        EventOrderingKey { time_ms, kind, seq }
    }
}

/// Sort items by timestamp, keeping input order among equal timestamps.
pub fn sort_by_time_stable<T>(items: &mut [T], time_of: impl Fn(&T) -> TimeMs) {
    items.sort_by_key(|item| time_of(item));
}
