use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use rentdesk_core::{
    Aggregate, Clock, DomainError, DomainResult, Event, HistoryId, IdGenerator, ItemId,
    SystemClock, UuidV7Generator, find_by_id, position_of,
};

use crate::history::HistoryRecord;
use crate::item::{Item, Rental};
use crate::query::{Stats, compute_stats};

/// Reason given when deleting an item that is still out on loan.
pub const DELETE_RENTED_REASON: &str = "cannot delete a rented item; return it first";

/// Reason given when renting an item that is already out.
pub const ALREADY_RENTED_REASON: &str = "item is already rented";

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub item_id: ItemId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub image_ref: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RentItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentItem {
    pub item_id: ItemId,
    /// Id of the history record opened by this rental.
    pub record_id: HistoryId,
    pub borrower: String,
    pub due_date: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReturnItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnItem {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeleteItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteItem {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCommand {
    AddItem(AddItem),
    RentItem(RentItem),
    ReturnItem(ReturnItem),
    DeleteItem(DeleteItem),
}

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub item_id: ItemId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub image_ref: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRented {
    pub item_id: ItemId,
    pub record_id: HistoryId,
    pub item_name: String,
    pub borrower: String,
    pub due_date: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemReturned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReturned {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDeleted {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    ItemAdded(ItemAdded),
    ItemRented(ItemRented),
    ItemReturned(ItemReturned),
    ItemDeleted(ItemDeleted),
}

impl LedgerEvent {
    pub fn item_id(&self) -> ItemId {
        match self {
            LedgerEvent::ItemAdded(e) => e.item_id,
            LedgerEvent::ItemRented(e) => e.item_id,
            LedgerEvent::ItemReturned(e) => e.item_id,
            LedgerEvent::ItemDeleted(e) => e.item_id,
        }
    }
}

impl Event for LedgerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::ItemAdded(_) => "rentals.item.added",
            LedgerEvent::ItemRented(_) => "rentals.item.rented",
            LedgerEvent::ItemReturned(_) => "rentals.item.returned",
            LedgerEvent::ItemDeleted(_) => "rentals.item.deleted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LedgerEvent::ItemAdded(e) => e.occurred_at,
            LedgerEvent::ItemRented(e) => e.occurred_at,
            LedgerEvent::ItemReturned(e) => e.occurred_at,
            LedgerEvent::ItemDeleted(e) => e.occurred_at,
        }
    }
}

/// The authoritative in-memory holder of items and rental history.
///
/// Items keep insertion order; history is chronological and append-only.
/// "Now" and fresh ids come from the injected [`Clock`] and [`IdGenerator`],
/// so a ledger built with `ManualClock` + `SequentialIdGenerator` is fully
/// deterministic.
#[derive(Debug)]
pub struct RentalLedger {
    items: Vec<Item>,
    history: Vec<HistoryRecord>,
    version: u64,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
}

impl Default for RentalLedger {
    fn default() -> Self {
        Self::new(SystemClock, UuidV7Generator)
    }
}

impl RentalLedger {
    pub fn new(clock: impl Clock + 'static, ids: impl IdGenerator + 'static) -> Self {
        Self::from_boxed(Box::new(clock), Box::new(ids))
    }

    pub fn from_boxed(clock: Box<dyn Clock>, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            items: Vec::new(),
            history: Vec::new(),
            version: 0,
            clock,
            ids,
        }
    }

    /// Rebuild a ledger by folding previously emitted events, in order.
    ///
    /// The clock and generator are only used for operations issued after the
    /// replay; pick a generator that will not hand out ids already present in
    /// `events`.
    pub fn replay<'a>(
        clock: impl Clock + 'static,
        ids: impl IdGenerator + 'static,
        events: impl IntoIterator<Item = &'a LedgerEvent>,
    ) -> Self {
        let mut ledger = Self::new(clock, ids);
        for event in events {
            ledger.apply(event);
        }
        ledger
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn item(&self, item_id: ItemId) -> Option<&Item> {
        find_by_id(&self.items, item_id)
    }

    /// The open history record of a rented item, if any.
    pub fn open_record(&self, item_id: ItemId) -> Option<&HistoryRecord> {
        self.history
            .iter()
            .find(|r| r.item_id() == item_id && r.is_active())
    }

    /// All rental episodes of an item, oldest first. Survives item deletion.
    pub fn records_for_item(&self, item_id: ItemId) -> impl Iterator<Item = &HistoryRecord> {
        self.history.iter().filter(move |r| r.item_id() == item_id)
    }

    pub fn stats(&self) -> Stats {
        compute_stats(&self.items)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Register a new available item and return it.
    ///
    /// `name`, `category` and `description` are trimmed and must not be empty.
    pub fn add_item(
        &mut self,
        name: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        image_ref: impl Into<String>,
    ) -> DomainResult<Item> {
        let item_id = self.ids.next_item_id();
        let cmd = AddItem {
            item_id,
            name: name.into(),
            category: category.into(),
            description: description.into(),
            image_ref: image_ref.into(),
            occurred_at: self.clock.now(),
        };
        self.execute(LedgerCommand::AddItem(cmd))?;
        self.item(item_id).cloned().ok_or_else(DomainError::not_found)
    }

    /// Lend an available item to `borrower` until `due_date`.
    ///
    /// The ledger does not check `due_date` against today; callers do.
    pub fn rent_item(
        &mut self,
        item_id: ItemId,
        borrower: impl Into<String>,
        due_date: NaiveDate,
    ) -> DomainResult<()> {
        let cmd = RentItem {
            item_id,
            record_id: self.ids.next_history_id(),
            borrower: borrower.into(),
            due_date,
            occurred_at: self.clock.now(),
        };
        self.execute(LedgerCommand::RentItem(cmd)).map(|_| ())
    }

    /// Take a rented item back and close its open history record.
    pub fn return_item(&mut self, item_id: ItemId) -> DomainResult<()> {
        let cmd = ReturnItem {
            item_id,
            occurred_at: self.clock.now(),
        };
        self.execute(LedgerCommand::ReturnItem(cmd)).map(|_| ())
    }

    /// Remove an available item. Its history records are kept.
    pub fn delete_item(&mut self, item_id: ItemId) -> DomainResult<()> {
        let cmd = DeleteItem {
            item_id,
            occurred_at: self.clock.now(),
        };
        self.execute(LedgerCommand::DeleteItem(cmd)).map(|_| ())
    }

    /// Validate `command` and, if accepted, apply every resulting event.
    pub fn execute(&mut self, command: LedgerCommand) -> DomainResult<Vec<LedgerEvent>> {
        let events = match self.handle(&command) {
            Ok(events) => events,
            Err(err) => {
                tracing::debug!("ledger rejected command ({}): {}", err.kind(), err);
                return Err(err);
            }
        };

        for event in &events {
            self.apply(event);
            tracing::info!(
                "{} for item {} (ledger version {})",
                event.event_type(),
                event.item_id(),
                self.version
            );
        }

        Ok(events)
    }

    fn position(&self, item_id: ItemId) -> Option<usize> {
        position_of(&self.items, item_id)
    }

    fn existing(&self, item_id: ItemId) -> Result<&Item, DomainError> {
        self.item(item_id).ok_or_else(DomainError::not_found)
    }

    fn handle_add(&self, cmd: &AddItem) -> Result<Vec<LedgerEvent>, DomainError> {
        if self.item(cmd.item_id).is_some() {
            return Err(DomainError::invalid_transition("item already exists"));
        }

        let name = required(&cmd.name, "name")?;
        let category = required(&cmd.category, "category")?;
        let description = required(&cmd.description, "description")?;

        Ok(vec![LedgerEvent::ItemAdded(ItemAdded {
            item_id: cmd.item_id,
            name,
            category,
            description,
            image_ref: cmd.image_ref.trim().to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_rent(&self, cmd: &RentItem) -> Result<Vec<LedgerEvent>, DomainError> {
        let item = self.existing(cmd.item_id)?;
        if !item.is_available() {
            return Err(DomainError::invalid_transition(ALREADY_RENTED_REASON));
        }
        let borrower = required(&cmd.borrower, "borrower")?;

        Ok(vec![LedgerEvent::ItemRented(ItemRented {
            item_id: cmd.item_id,
            record_id: cmd.record_id,
            item_name: item.name().to_string(),
            borrower,
            due_date: cmd.due_date,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_return(&self, cmd: &ReturnItem) -> Result<Vec<LedgerEvent>, DomainError> {
        let item = self.existing(cmd.item_id)?;
        if item.is_available() {
            return Err(DomainError::invalid_transition("item is not rented"));
        }

        Ok(vec![LedgerEvent::ItemReturned(ItemReturned {
            item_id: cmd.item_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_delete(&self, cmd: &DeleteItem) -> Result<Vec<LedgerEvent>, DomainError> {
        let item = self.existing(cmd.item_id)?;
        if !item.is_available() {
            return Err(DomainError::invalid_transition(DELETE_RENTED_REASON));
        }

        Ok(vec![LedgerEvent::ItemDeleted(ItemDeleted {
            item_id: cmd.item_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

fn required(value: &str, field: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

impl Aggregate for RentalLedger {
    type Command = LedgerCommand;
    type Event = LedgerEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LedgerEvent::ItemAdded(e) => {
                self.items.push(Item::new(
                    e.item_id,
                    e.name.clone(),
                    e.category.clone(),
                    e.description.clone(),
                    e.image_ref.clone(),
                ));
            }
            LedgerEvent::ItemRented(e) => {
                if let Some(idx) = self.position(e.item_id) {
                    self.items[idx].start_rental(Rental {
                        borrower: e.borrower.clone(),
                        rented_at: e.occurred_at,
                        due_date: e.due_date,
                    });
                    self.history.push(HistoryRecord::open(
                        e.record_id,
                        e.item_id,
                        e.item_name.clone(),
                        e.borrower.clone(),
                        e.occurred_at,
                    ));
                }
            }
            LedgerEvent::ItemReturned(e) => {
                if let Some(idx) = self.position(e.item_id) {
                    self.items[idx].end_rental();
                }
                // Close every open record for the item, not just the first.
                for record in self
                    .history
                    .iter_mut()
                    .filter(|r| r.item_id() == e.item_id && r.is_active())
                {
                    record.close(e.occurred_at);
                }
            }
            LedgerEvent::ItemDeleted(e) => {
                self.items.retain(|i| i.id() != e.item_id);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LedgerCommand::AddItem(cmd) => self.handle_add(cmd),
            LedgerCommand::RentItem(cmd) => self.handle_rent(cmd),
            LedgerCommand::ReturnItem(cmd) => self.handle_return(cmd),
            LedgerCommand::DeleteItem(cmd) => self.handle_delete(cmd),
        }
    }

    fn version(&self) -> u64 {
        self.version
    }
}
