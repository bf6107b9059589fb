//! A shell session: one ledger, driven one command at a time.

use serde_json::json;

use rentdesk_core::{DomainError, ItemId, SystemClock};
use rentdesk_rentals::catalog::{default_due_date, default_icon, validate_due_date};
use rentdesk_rentals::{
    ALREADY_RENTED_REASON, DELETE_RENTED_REASON, Item, RentalLedger, StatusFilter, filter_items,
    history_newest_first, overdue_items,
};

use crate::config::{CliConfig, OutputFormat};
use crate::render::{self, ItemView};
use crate::shell::{HELP, ShellCommand, ShellError};

/// Result of running one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Output(String),
    Quit,
}

/// Owns the ledger for the lifetime of the shell.
#[derive(Debug)]
pub struct Session {
    ledger: RentalLedger,
    config: CliConfig,
}

impl Session {
    /// Fresh, empty ledger on the wall clock with the configured id strategy.
    pub fn new(config: CliConfig) -> Self {
        let ledger = RentalLedger::from_boxed(Box::new(SystemClock), config.id_strategy.generator());
        Self::with_ledger(ledger, config)
    }

    pub fn with_ledger(ledger: RentalLedger, config: CliConfig) -> Self {
        Self { ledger, config }
    }

    pub fn ledger(&self) -> &RentalLedger {
        &self.ledger
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Parse and run a line. Blank lines and comments produce no outcome.
    pub fn run_line(&mut self, line: &str) -> Result<Option<Outcome>, ShellError> {
        match ShellCommand::parse(line)? {
            Some(command) => self.run(command).map(Some),
            None => Ok(None),
        }
    }

    pub fn run(&mut self, command: ShellCommand) -> Result<Outcome, ShellError> {
        let output = match command {
            ShellCommand::Add {
                name,
                category,
                description,
                icon,
            } => {
                let icon = icon.unwrap_or_else(|| default_icon().to_string());
                let item = self.ledger.add_item(name, category, description, icon)?;
                self.item_output(&item, |item| format!("added {} ({})", item.name(), item.id()))?
            }
            ShellCommand::Rent {
                item,
                borrower,
                due_date,
            } => {
                let item_id = self.resolve_item(&item)?;
                if !self.current_item(item_id)?.is_available() {
                    return Err(DomainError::invalid_transition(ALREADY_RENTED_REASON).into());
                }
                let today = self.ledger.today();
                let due = due_date.unwrap_or_else(|| default_due_date(today, self.config.rental_days));
                validate_due_date(due, today)?;

                self.ledger.rent_item(item_id, borrower, due)?;
                let item = self.current_item(item_id)?;
                self.item_output(&item, |item| {
                    format!(
                        "rented {} to {} until {}",
                        item.name(),
                        item.borrower().unwrap_or_default(),
                        due
                    )
                })?
            }
            ShellCommand::Return { item } => {
                let item_id = self.resolve_item(&item)?;
                self.ledger.return_item(item_id)?;
                let item = self.current_item(item_id)?;
                self.item_output(&item, |item| format!("returned {}", item.name()))?
            }
            ShellCommand::Delete { item, confirmed } => {
                let item_id = self.resolve_item(&item)?;
                self.delete(item_id, confirmed)?
            }
            ShellCommand::List { query, status } => self.list(&query, status)?,
            ShellCommand::Overdue => {
                let today = self.ledger.today();
                let overdue = overdue_items(self.ledger.items(), today);
                match self.config.output {
                    OutputFormat::Text => render::item_list(&overdue, today),
                    OutputFormat::Json => render::json(&views(&overdue, today))?,
                }
            }
            ShellCommand::History => {
                let records = history_newest_first(self.ledger.history());
                match self.config.output {
                    OutputFormat::Text => render::history_list(records),
                    OutputFormat::Json => render::json(&records.collect::<Vec<_>>())?,
                }
            }
            ShellCommand::Stats => {
                let stats = self.ledger.stats();
                match self.config.output {
                    OutputFormat::Text => render::stats_line(&stats),
                    OutputFormat::Json => render::json(&stats)?,
                }
            }
            ShellCommand::Categories => match self.config.output {
                OutputFormat::Text => render::categories_text(),
                OutputFormat::Json => render::json(&render::CatalogView::defaults())?,
            },
            ShellCommand::Help => match self.config.output {
                OutputFormat::Text => HELP.to_string(),
                OutputFormat::Json => render::json(&json!({ "help": HELP }))?,
            },
            ShellCommand::Quit => return Ok(Outcome::Quit),
        };
        Ok(Outcome::Output(output))
    }

    /// Format an error for the operator in the configured output format.
    pub fn render_error(&self, err: &ShellError) -> String {
        match self.config.output {
            OutputFormat::Text => format!("error: {err}"),
            OutputFormat::Json => render::json_error(err.code(), err.to_string()),
        }
    }

    /// Accept a full item id, or a prefix matching exactly one listed item.
    fn resolve_item(&self, token: &str) -> Result<ItemId, ShellError> {
        if let Ok(id) = token.parse::<ItemId>() {
            return Ok(id);
        }

        let needle = token.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return Err(ShellError::UnknownItem(token.to_string()));
        }

        let mut matches = self
            .ledger
            .items()
            .iter()
            .filter(|item| item.id().to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(item), None) => Ok(item.id()),
            (None, _) => Err(ShellError::UnknownItem(token.to_string())),
            (Some(_), Some(_)) => Err(ShellError::AmbiguousItem(token.to_string())),
        }
    }

    fn current_item(&self, item_id: ItemId) -> Result<Item, ShellError> {
        self.ledger
            .item(item_id)
            .cloned()
            .ok_or(ShellError::Domain(DomainError::NotFound))
    }

    fn delete(&mut self, item_id: ItemId, confirmed: bool) -> Result<String, ShellError> {
        let item = self.current_item(item_id)?;

        // A rented item is refused before asking for confirmation.
        if !item.is_available() {
            return Err(DomainError::invalid_transition(DELETE_RENTED_REASON).into());
        }

        if !confirmed {
            return Ok(match self.config.output {
                OutputFormat::Text => format!(
                    "delete \"{}\"? re-run as: delete {} --yes",
                    item.name(),
                    item.id()
                ),
                OutputFormat::Json => render::json(&json!({
                    "confirmation_required": true,
                    "item": ItemView::new(&item, self.ledger.today()),
                }))?,
            });
        }

        self.ledger.delete_item(item_id)?;
        Ok(match self.config.output {
            OutputFormat::Text => format!("deleted {}", item.name()),
            OutputFormat::Json => render::json(&json!({
                "deleted": item.id(),
                "name": item.name(),
            }))?,
        })
    }

    fn list(&self, query: &str, status: StatusFilter) -> Result<String, ShellError> {
        let today = self.ledger.today();
        let found = filter_items(self.ledger.items(), query, status);
        Ok(match self.config.output {
            OutputFormat::Text => render::item_list(&found, today),
            OutputFormat::Json => render::json(&views(&found, today))?,
        })
    }

    fn item_output(
        &self,
        item: &Item,
        text: impl FnOnce(&Item) -> String,
    ) -> Result<String, ShellError> {
        Ok(match self.config.output {
            OutputFormat::Text => text(item),
            OutputFormat::Json => render::json(&ItemView::new(item, self.ledger.today()))?,
        })
    }
}

fn views(items: &[&Item], today: chrono::NaiveDate) -> Vec<ItemView> {
    items.iter().map(|item| ItemView::new(item, today)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdStrategy;
    use chrono::{TimeZone, Utc};
    use rentdesk_core::{ManualClock, SequentialIdGenerator};

    const FIRST_ID: &str = "00000000-0000-0000-0000-000000000001";

    fn session(output: OutputFormat) -> Session {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 25, 9, 0, 0).unwrap());
        let ledger = RentalLedger::new(clock, SequentialIdGenerator::new());
        let config = CliConfig {
            id_strategy: IdStrategy::Sequential,
            output,
            ..CliConfig::default()
        };
        Session::with_ledger(ledger, config)
    }

    fn output(session: &mut Session, line: &str) -> String {
        match session.run_line(line).unwrap() {
            Some(Outcome::Output(text)) => text,
            other => panic!("expected output for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn add_uses_default_icon() {
        let mut s = session(OutputFormat::Text);
        let out = output(&mut s, "add Laptop 전자기기 \"14 inch laptop\"");
        assert_eq!(out, format!("added Laptop ({FIRST_ID})"));
        assert_eq!(s.ledger().items()[0].image_ref(), "💻");
    }

    #[test]
    fn rent_defaults_due_date_to_rental_period() {
        let mut s = session(OutputFormat::Text);
        output(&mut s, "add Projector 전자기기 \"HD projector\"");
        let out = output(&mut s, &format!("rent {FIRST_ID} Kim"));
        assert_eq!(out, "rented Projector to Kim until 2024-06-01");
    }

    #[test]
    fn rent_rejects_past_due_date() {
        let mut s = session(OutputFormat::Text);
        output(&mut s, "add Projector 전자기기 \"HD projector\"");
        let err = s
            .run_line(&format!("rent {FIRST_ID} Kim 2024-05-24"))
            .unwrap_err();
        assert!(matches!(err, ShellError::Domain(DomainError::Validation(_))));
        assert!(s.ledger().items()[0].is_available());
    }

    #[test]
    fn rented_item_is_refused_before_due_date_check() {
        let mut s = session(OutputFormat::Text);
        output(&mut s, "add Projector 전자기기 \"HD projector\"");
        output(&mut s, &format!("rent {FIRST_ID} Kim 2024-06-01"));

        let err = s
            .run_line(&format!("rent {FIRST_ID} Lee 2020-01-01"))
            .unwrap_err();
        assert_eq!(err.code(), "invalid_transition");
        assert_eq!(
            err.to_string(),
            format!("invalid transition: {ALREADY_RENTED_REASON}")
        );
        assert_eq!(s.ledger().history().len(), 1);
    }

    #[test]
    fn categories_lists_catalog_defaults() {
        let mut s = session(OutputFormat::Text);
        assert!(output(&mut s, "categories").contains("전자기기*"));

        let mut s = session(OutputFormat::Json);
        let body: serde_json::Value = serde_json::from_str(&output(&mut s, "categories")).unwrap();
        assert_eq!(body["default_category"], "전자기기");
        assert_eq!(s.config().output, OutputFormat::Json);
    }

    #[test]
    fn item_prefix_must_be_unique() {
        let mut s = session(OutputFormat::Text);
        output(&mut s, "add Projector 전자기기 \"HD projector\"");
        output(&mut s, "add Chair 가구 \"Mesh chair\"");

        assert!(matches!(
            s.run_line("return 0000"),
            Err(ShellError::AmbiguousItem(_))
        ));
        assert!(matches!(
            s.run_line("return ffff"),
            Err(ShellError::UnknownItem(_))
        ));
    }

    #[test]
    fn delete_asks_for_confirmation_first() {
        let mut s = session(OutputFormat::Text);
        output(&mut s, "add Projector 전자기기 \"HD projector\"");

        let prompt = output(&mut s, &format!("delete {FIRST_ID}"));
        assert!(prompt.contains("--yes"));
        assert_eq!(s.ledger().items().len(), 1);

        let done = output(&mut s, &format!("delete {FIRST_ID} --yes"));
        assert_eq!(done, "deleted Projector");
        assert!(s.ledger().items().is_empty());
    }

    #[test]
    fn delete_of_rented_item_is_refused_even_unconfirmed() {
        let mut s = session(OutputFormat::Text);
        output(&mut s, "add Projector 전자기기 \"HD projector\"");
        output(&mut s, &format!("rent {FIRST_ID} Kim 2024-06-01"));

        for line in [format!("delete {FIRST_ID}"), format!("delete {FIRST_ID} --yes")] {
            let err = s.run_line(&line).unwrap_err();
            assert_eq!(err.code(), "invalid_transition");
            assert_eq!(
                s.render_error(&err),
                format!("error: invalid transition: {DELETE_RENTED_REASON}")
            );
        }
        assert_eq!(s.ledger().items().len(), 1);
    }

    #[test]
    fn json_output_renders_views_and_errors() {
        let mut s = session(OutputFormat::Json);
        output(&mut s, "add Projector 전자기기 \"HD projector\" 📽️");
        let rented: serde_json::Value =
            serde_json::from_str(&output(&mut s, &format!("rent {FIRST_ID} Kim 2024-06-01")))
                .unwrap();
        assert_eq!(rented["status"], "rented");
        assert_eq!(rented["borrower"], "Kim");
        assert_eq!(rented["due_date"], "2024-06-01");

        let stats: serde_json::Value = serde_json::from_str(&output(&mut s, "stats")).unwrap();
        assert_eq!(stats["total"], 1);
        assert_eq!(stats["rented"], 1);

        let err = s.run_line(&format!("rent {FIRST_ID} Lee")).unwrap_err();
        let body: serde_json::Value = serde_json::from_str(&s.render_error(&err)).unwrap();
        assert_eq!(body["error"], "invalid_transition");
    }

    #[test]
    fn quit_ends_the_session() {
        let mut s = session(OutputFormat::Text);
        assert_eq!(s.run_line("quit").unwrap(), Some(Outcome::Quit));
        assert_eq!(s.run_line("").unwrap(), None);
    }
}
