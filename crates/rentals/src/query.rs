//! Read-only views over ledger collections: search, status filter, counts.

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use rentdesk_core::DomainError;

use crate::history::HistoryRecord;
use crate::item::{Item, ItemStatus};

/// Status constraint for [`filter_items`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Available,
    Rented,
}

impl StatusFilter {
    pub fn matches(self, status: ItemStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Available => status == ItemStatus::Available,
            StatusFilter::Rented => status == ItemStatus::Rented,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "available" => Ok(StatusFilter::Available),
            "rented" => Ok(StatusFilter::Rented),
            other => Err(DomainError::validation(format!(
                "unknown status filter '{other}' (expected all, available or rented)"
            ))),
        }
    }
}

/// Item counts by status. `total == available + rented` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    pub available: usize,
    pub rented: usize,
}

/// Items whose name, category or description contains `query`
/// (case-insensitive) and whose status passes `status`.
///
/// Relative order is preserved; an empty query matches everything.
pub fn filter_items<'a>(items: &'a [Item], query: &str, status: StatusFilter) -> Vec<&'a Item> {
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| status.matches(item.status()))
        .filter(|item| matches_query(item, &needle))
        .collect()
}

fn matches_query(item: &Item, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [item.name(), item.category(), item.description()]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

pub fn compute_stats(items: &[Item]) -> Stats {
    let rented = items.iter().filter(|i| !i.is_available()).count();
    Stats {
        total: items.len(),
        available: items.len() - rented,
        rented,
    }
}

/// Rented items past their due date, in item order.
pub fn overdue_items(items: &[Item], today: NaiveDate) -> Vec<&Item> {
    items.iter().filter(|i| i.is_overdue(today)).collect()
}

/// History log, most recent episode first.
pub fn history_newest_first(history: &[HistoryRecord]) -> impl Iterator<Item = &HistoryRecord> {
    history.iter().rev()
}
