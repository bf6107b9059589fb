use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rentdesk_core::{Entity, HistoryId, ItemId};

/// Whether a rental episode is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Active,
    Returned,
}

impl HistoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryStatus::Active => "active",
            HistoryStatus::Returned => "returned",
        }
    }
}

impl core::fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One rental episode in the append-only history log.
///
/// `item_name` is a snapshot taken at rent time so the record stays readable
/// after the item itself is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    id: HistoryId,
    item_id: ItemId,
    item_name: String,
    borrower: String,
    rented_at: DateTime<Utc>,
    returned_at: Option<DateTime<Utc>>,
    status: HistoryStatus,
}

impl HistoryRecord {
    pub(crate) fn open(
        id: HistoryId,
        item_id: ItemId,
        item_name: String,
        borrower: String,
        rented_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            item_id,
            item_name,
            borrower,
            rented_at,
            returned_at: None,
            status: HistoryStatus::Active,
        }
    }

    pub fn id(&self) -> HistoryId {
        self.id
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn borrower(&self) -> &str {
        &self.borrower
    }

    pub fn rented_at(&self) -> DateTime<Utc> {
        self.rented_at
    }

    pub fn returned_at(&self) -> Option<DateTime<Utc>> {
        self.returned_at
    }

    pub fn status(&self) -> HistoryStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == HistoryStatus::Active
    }

    /// Close the episode. Returned records are never touched again.
    pub(crate) fn close(&mut self, returned_at: DateTime<Utc>) {
        if self.is_active() {
            self.returned_at = Some(returned_at);
            self.status = HistoryStatus::Returned;
        }
    }
}

impl Entity for HistoryRecord {
    type Id = HistoryId;

    fn id(&self) -> HistoryId {
        self.id
    }
}
