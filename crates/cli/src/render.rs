//! Text and JSON views of ledger data.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use rentdesk_core::ItemId;
use rentdesk_rentals::catalog::{DEFAULT_CATEGORIES, DEFAULT_ICONS, default_category};
use rentdesk_rentals::{HistoryRecord, HistoryStatus, Item, ItemStatus, Stats};

/// Flat, serializable view of an item as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub image_ref: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borrower: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rented_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub overdue: bool,
}

impl ItemView {
    pub fn new(item: &Item, today: NaiveDate) -> Self {
        Self {
            id: item.id(),
            name: item.name().to_string(),
            category: item.category().to_string(),
            description: item.description().to_string(),
            image_ref: item.image_ref().to_string(),
            status: item.status(),
            borrower: item.borrower().map(str::to_string),
            rented_at: item.rented_at(),
            due_date: item.due_date(),
            overdue: item.is_overdue(today),
        }
    }
}

pub fn item_line(item: &Item, today: NaiveDate) -> String {
    let mut line = String::new();
    if !item.image_ref().is_empty() {
        line.push_str(item.image_ref());
        line.push(' ');
    }
    line.push_str(&format!(
        "{}  [{}] {}  {}",
        item.name(),
        item.category(),
        item.status(),
        item.id()
    ));
    if let Some(rental) = item.rental() {
        line.push_str(&format!(
            "\n    {}: rented {} by {}, due {}",
            item.description(),
            rental.rented_at.format("%Y-%m-%d"),
            rental.borrower,
            rental.due_date
        ));
        if item.is_overdue(today) {
            line.push_str(" (OVERDUE)");
        }
    } else {
        line.push_str(&format!("\n    {}", item.description()));
    }
    line
}

pub fn item_list(items: &[&Item], today: NaiveDate) -> String {
    if items.is_empty() {
        return "no items found".to_string();
    }
    items
        .iter()
        .map(|item| item_line(item, today))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn history_line(record: &HistoryRecord) -> String {
    let mut line = format!(
        "{}  {:<8}  {} by {}",
        record.rented_at().format("%Y-%m-%d %H:%M"),
        record.status(),
        record.item_name(),
        record.borrower()
    );
    if let (HistoryStatus::Returned, Some(at)) = (record.status(), record.returned_at()) {
        line.push_str(&format!(", returned {}", at.format("%Y-%m-%d %H:%M")));
    }
    line
}

pub fn history_list<'a>(records: impl Iterator<Item = &'a HistoryRecord>) -> String {
    let lines: Vec<String> = records.map(history_line).collect();
    if lines.is_empty() {
        return "no rental history yet".to_string();
    }
    lines.join("\n")
}

pub fn stats_line(stats: &Stats) -> String {
    format!(
        "total {}, available {}, rented {}",
        stats.total, stats.available, stats.rented
    )
}

/// Suggested categories (default marked with `*`) and icons.
pub fn categories_text() -> String {
    let categories: Vec<String> = DEFAULT_CATEGORIES
        .iter()
        .map(|c| {
            if *c == default_category() {
                format!("{c}*")
            } else {
                c.to_string()
            }
        })
        .collect();
    format!(
        "categories: {}\nicons: {}",
        categories.join(", "),
        DEFAULT_ICONS.join(" ")
    )
}

#[derive(Debug, Serialize)]
pub struct CatalogView {
    pub categories: &'static [&'static str],
    pub default_category: &'static str,
    pub icons: &'static [&'static str],
}

impl CatalogView {
    pub fn defaults() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES,
            default_category: default_category(),
            icons: DEFAULT_ICONS,
        }
    }
}

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// JSON error body: `{"error": code, "message": ...}`.
pub fn json_error(code: &str, message: impl Into<String>) -> String {
    serde_json::json!({
        "error": code,
        "message": message.into(),
    })
    .to_string()
}
