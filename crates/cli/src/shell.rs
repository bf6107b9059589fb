//! Line parsing for the interactive shell.

use chrono::NaiveDate;
use thiserror::Error;

use rentdesk_core::DomainError;
use rentdesk_rentals::StatusFilter;

pub const HELP: &str = "\
commands:
  add <name> <category> <description> [icon]   register an item
  rent <item> <borrower> [YYYY-MM-DD]          lend an item (due date defaults to the rental period)
  return <item>                                take an item back
  delete <item> --yes                          remove an available item
  list [query] [--status all|available|rented] search items (quote multi-word queries)
  overdue                                      rented items past their due date
  history                                      rental log, newest first
  stats                                        item counts by status
  categories                                   suggested categories and icons
  help                                         show this text
  quit                                         leave the shell
<item> is an item id or a unique prefix of one; quote arguments containing spaces.";

/// Errors surfaced to the operator. None of them end the session.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unterminated quote")]
    UnterminatedQuote,

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("no item matches '{0}'")]
    UnknownItem(String),

    #[error("'{0}' matches more than one item; use more characters")]
    AmbiguousItem(String),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

impl ShellError {
    /// Stable error code, used for JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            ShellError::UnknownCommand(_) => "unknown_command",
            ShellError::Usage(_) => "usage",
            ShellError::UnterminatedQuote => "unterminated_quote",
            ShellError::InvalidDate(_) => "invalid_date",
            ShellError::UnknownItem(_) => "not_found",
            ShellError::AmbiguousItem(_) => "ambiguous_item",
            ShellError::Domain(e) => e.kind(),
            ShellError::Render(_) => "render_error",
        }
    }
}

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Add {
        name: String,
        category: String,
        description: String,
        icon: Option<String>,
    },
    Rent {
        item: String,
        borrower: String,
        due_date: Option<NaiveDate>,
    },
    Return {
        item: String,
    },
    Delete {
        item: String,
        confirmed: bool,
    },
    List {
        query: String,
        status: StatusFilter,
    },
    Overdue,
    History,
    Stats,
    Categories,
    Help,
    Quit,
}

impl ShellCommand {
    /// Parse a line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ShellError> {
        let args = split_args(line)?;
        let Some((head, rest)) = args.split_first() else {
            return Ok(None);
        };
        if head.starts_with('#') {
            return Ok(None);
        }

        let command = match head.to_ascii_lowercase().as_str() {
            "add" => parse_add(rest)?,
            "rent" => parse_rent(rest)?,
            "return" => match rest {
                [item] => ShellCommand::Return { item: item.clone() },
                _ => return Err(ShellError::Usage("return <item>")),
            },
            "delete" => parse_delete(rest)?,
            "list" | "ls" => parse_list(rest)?,
            "overdue" => ShellCommand::Overdue,
            "history" => ShellCommand::History,
            "stats" => ShellCommand::Stats,
            "categories" => ShellCommand::Categories,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(ShellError::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn parse_add(args: &[String]) -> Result<ShellCommand, ShellError> {
    match args {
        [name, category, description] => Ok(ShellCommand::Add {
            name: name.clone(),
            category: category.clone(),
            description: description.clone(),
            icon: None,
        }),
        [name, category, description, icon] => Ok(ShellCommand::Add {
            name: name.clone(),
            category: category.clone(),
            description: description.clone(),
            icon: Some(icon.clone()),
        }),
        _ => Err(ShellError::Usage("add <name> <category> <description> [icon]")),
    }
}

fn parse_rent(args: &[String]) -> Result<ShellCommand, ShellError> {
    let (item, borrower, due) = match args {
        [item, borrower] => (item, borrower, None),
        [item, borrower, due] => (item, borrower, Some(due)),
        _ => return Err(ShellError::Usage("rent <item> <borrower> [YYYY-MM-DD]")),
    };
    let due_date = due.map(|raw| parse_date(raw)).transpose()?;
    Ok(ShellCommand::Rent {
        item: item.clone(),
        borrower: borrower.clone(),
        due_date,
    })
}

fn parse_delete(args: &[String]) -> Result<ShellCommand, ShellError> {
    let mut item = None;
    let mut confirmed = false;
    for arg in args {
        match arg.as_str() {
            "--yes" | "-y" => confirmed = true,
            _ if item.is_none() => item = Some(arg.clone()),
            _ => return Err(ShellError::Usage("delete <item> --yes")),
        }
    }
    let item = item.ok_or(ShellError::Usage("delete <item> --yes"))?;
    Ok(ShellCommand::Delete { item, confirmed })
}

fn parse_list(args: &[String]) -> Result<ShellCommand, ShellError> {
    const USAGE: &str = "list [query] [--status all|available|rented]";

    let mut words = Vec::new();
    let mut status = StatusFilter::All;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--status" {
            let value = iter.next().ok_or(ShellError::Usage(USAGE))?;
            status = value.parse()?;
        } else {
            words.push(arg.as_str());
        }
    }
    Ok(ShellCommand::List {
        query: words.join(" "),
        status,
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, ShellError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ShellError::InvalidDate(raw.to_string()))
}

/// Split on whitespace; double quotes group words and may be empty.
pub fn split_args(line: &str) -> Result<Vec<String>, ShellError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_quotes {
        return Err(ShellError::UnterminatedQuote);
    }
    if in_token {
        args.push(current);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ShellCommand {
        ShellCommand::parse(line).unwrap().unwrap()
    }

    #[test]
    fn splits_quoted_arguments() {
        let args = split_args(r#"add "Office Chair" 가구 "Ergonomic mesh chair" 🪑"#).unwrap();
        assert_eq!(args, ["add", "Office Chair", "가구", "Ergonomic mesh chair", "🪑"]);
        assert_eq!(split_args(r#"rent 01 """#).unwrap(), ["rent", "01", ""]);
        assert!(matches!(
            split_args(r#"add "Chair"#),
            Err(ShellError::UnterminatedQuote)
        ));
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(ShellCommand::parse("   ").unwrap(), None);
        assert_eq!(ShellCommand::parse("# setup").unwrap(), None);
    }

    #[test]
    fn parses_add_with_optional_icon() {
        assert_eq!(
            parse("add Projector 전자기기 \"HD projector\""),
            ShellCommand::Add {
                name: "Projector".to_string(),
                category: "전자기기".to_string(),
                description: "HD projector".to_string(),
                icon: None,
            }
        );
        assert!(matches!(
            parse("ADD Projector 전자기기 HD 📽️"),
            ShellCommand::Add { icon: Some(icon), .. } if icon == "📽️"
        ));
        assert!(matches!(
            ShellCommand::parse("add Projector"),
            Err(ShellError::Usage(_))
        ));
    }

    #[test]
    fn parses_rent_due_date() {
        assert_eq!(
            parse("rent 0190 Kim 2024-06-01"),
            ShellCommand::Rent {
                item: "0190".to_string(),
                borrower: "Kim".to_string(),
                due_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            }
        );
        assert!(matches!(parse("rent 0190 Kim"), ShellCommand::Rent { due_date: None, .. }));
        assert!(matches!(
            ShellCommand::parse("rent 0190 Kim 06/01/2024"),
            Err(ShellError::InvalidDate(_))
        ));
    }

    #[test]
    fn delete_needs_explicit_confirmation_flag() {
        assert_eq!(
            parse("delete 0190"),
            ShellCommand::Delete {
                item: "0190".to_string(),
                confirmed: false
            }
        );
        assert_eq!(
            parse("delete --yes 0190"),
            ShellCommand::Delete {
                item: "0190".to_string(),
                confirmed: true
            }
        );
        assert!(ShellCommand::parse("delete").is_err());
    }

    #[test]
    fn parses_list_query_and_status() {
        assert_eq!(
            parse("list"),
            ShellCommand::List {
                query: String::new(),
                status: StatusFilter::All
            }
        );
        assert_eq!(
            parse("list hd projector --status available"),
            ShellCommand::List {
                query: "hd projector".to_string(),
                status: StatusFilter::Available
            }
        );
        assert!(matches!(
            ShellCommand::parse("list --status lost"),
            Err(ShellError::Domain(DomainError::Validation(_)))
        ));
        assert!(matches!(
            ShellCommand::parse("list --status"),
            Err(ShellError::Usage(_))
        ));
    }

    #[test]
    fn quoted_query_keeps_inner_spacing() {
        assert_eq!(
            parse(r#"list "hd   projector""#),
            ShellCommand::List {
                query: "hd   projector".to_string(),
                status: StatusFilter::All
            }
        );
        assert!(HELP.contains("quote multi-word queries"));
    }

    #[test]
    fn parses_categories() {
        assert_eq!(parse("categories"), ShellCommand::Categories);
    }

    #[test]
    fn unknown_command_is_reported() {
        let err = ShellCommand::parse("lend 01 Kim").unwrap_err();
        assert_eq!(err.code(), "unknown_command");
    }
}
