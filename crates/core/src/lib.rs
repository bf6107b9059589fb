//! `rentdesk-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no IO, no presentation).

pub mod aggregate;
pub mod clock;
pub mod entity;
pub mod error;
pub mod event;
pub mod id;

pub use aggregate::Aggregate;
pub use clock::{Clock, ManualClock, SystemClock};
pub use entity::{Entity, find_by_id, position_of};
pub use error::{DomainError, DomainResult};
pub use event::Event;
pub use id::{HistoryId, IdGenerator, ItemId, SequentialIdGenerator, UuidV7Generator};
