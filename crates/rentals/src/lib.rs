//! Equipment rental domain module.
//!
//! This crate contains the rental ledger (items, history, and the add / rent /
//! return / delete transitions) as deterministic domain logic: no IO, no
//! presentation, time and ids injected.

pub mod catalog;
pub mod history;
pub mod item;
pub mod ledger;
pub mod query;

pub use history::{HistoryRecord, HistoryStatus};
pub use item::{Item, ItemStatus, Rental};
pub use ledger::{
    ALREADY_RENTED_REASON, AddItem, DELETE_RENTED_REASON, DeleteItem, ItemAdded, ItemDeleted,
    ItemRented, ItemReturned, LedgerCommand, LedgerEvent, RentItem, RentalLedger, ReturnItem,
};
pub use query::{
    Stats, StatusFilter, compute_stats, filter_items, history_newest_first, overdue_items,
};
