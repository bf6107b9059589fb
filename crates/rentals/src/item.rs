use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use rentdesk_core::{Entity, ItemId};

/// Rental status of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Available,
    Rented,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "available",
            ItemStatus::Rented => "rented",
        }
    }
}

impl core::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.as_str())
    }
}

/// The outstanding loan of a rented item.
///
/// Borrower, rental time and due date only exist together, so they travel as
/// one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rental {
    pub borrower: String,
    pub rented_at: DateTime<Utc>,
    pub due_date: NaiveDate,
}

/// A rentable piece of equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    name: String,
    category: String,
    description: String,
    image_ref: String,
    rental: Option<Rental>,
}

impl Item {
    pub(crate) fn new(
        id: ItemId,
        name: String,
        category: String,
        description: String,
        image_ref: String,
    ) -> Self {
        Self {
            id,
            name,
            category,
            description,
            image_ref,
            rental: None,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Icon, emoji or image URL chosen by the operator. May be empty.
    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }

    pub fn status(&self) -> ItemStatus {
        if self.rental.is_some() {
            ItemStatus::Rented
        } else {
            ItemStatus::Available
        }
    }

    pub fn is_available(&self) -> bool {
        self.rental.is_none()
    }

    pub fn rental(&self) -> Option<&Rental> {
        self.rental.as_ref()
    }

    pub fn borrower(&self) -> Option<&str> {
        self.rental.as_ref().map(|r| r.borrower.as_str())
    }

    pub fn rented_at(&self) -> Option<DateTime<Utc>> {
        self.rental.as_ref().map(|r| r.rented_at)
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.rental.as_ref().map(|r| r.due_date)
    }

    /// Rented and past its due date as of `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date().is_some_and(|due| due < today)
    }

    pub(crate) fn start_rental(&mut self, rental: Rental) {
        self.rental = Some(rental);
    }

    pub(crate) fn end_rental(&mut self) -> Option<Rental> {
        self.rental.take()
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rentdesk_core::{IdGenerator, SequentialIdGenerator};

    fn projector() -> Item {
        Item::new(
            SequentialIdGenerator::new().next_item_id(),
            "Projector".to_string(),
            "전자기기".to_string(),
            "HD projector".to_string(),
            "📽️".to_string(),
        )
    }

    #[test]
    fn new_item_is_available_without_rental_fields() {
        let item = projector();
        assert_eq!(item.status(), ItemStatus::Available);
        assert!(item.borrower().is_none());
        assert!(item.rented_at().is_none());
        assert!(item.due_date().is_none());
    }

    #[test]
    fn rental_fields_move_together() {
        let mut item = projector();
        let rented_at = Utc.with_ymd_and_hms(2024, 5, 25, 9, 0, 0).unwrap();
        let due = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        item.start_rental(Rental {
            borrower: "Kim".to_string(),
            rented_at,
            due_date: due,
        });

        assert_eq!(item.status(), ItemStatus::Rented);
        assert_eq!(item.borrower(), Some("Kim"));
        assert_eq!(item.rented_at(), Some(rented_at));
        assert_eq!(item.due_date(), Some(due));

        let ended = item.end_rental();
        assert!(ended.is_some());
        assert_eq!(item.status(), ItemStatus::Available);
        assert!(item.borrower().is_none());
    }

    #[test]
    fn overdue_only_after_due_date() {
        let mut item = projector();
        let due = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        item.start_rental(Rental {
            borrower: "Kim".to_string(),
            rented_at: Utc.with_ymd_and_hms(2024, 5, 25, 9, 0, 0).unwrap(),
            due_date: due,
        });

        assert!(!item.is_overdue(due));
        assert!(item.is_overdue(due.succ_opt().unwrap()));
        assert!(!projector().is_overdue(due.succ_opt().unwrap()));
    }

    #[test]
    fn status_displays_lowercase() {
        assert_eq!(ItemStatus::Rented.to_string(), "rented");
        assert_eq!(ItemStatus::Available.to_string(), "available");
    }
}
