//! Facts emitted by aggregates.

use chrono::{DateTime, Utc};

/// Something that already happened to the ledger.
///
/// Events are never edited. Replaying the same events in the same order
/// rebuilds the same state.
pub trait Event: Clone + core::fmt::Debug + 'static {
    /// Dotted name such as `rentals.item.returned`.
    fn event_type(&self) -> &'static str;

    /// Payload schema revision.
    fn version(&self) -> u32;

    /// Business time of the fact, taken from the injected clock.
    fn occurred_at(&self) -> DateTime<Utc>;
}
