//! Defaults offered to operators when registering and lending equipment.

use chrono::{Duration, NaiveDate};

use rentdesk_core::{DomainError, DomainResult};

/// Categories suggested when adding an item. The first one is the default.
pub const DEFAULT_CATEGORIES: &[&str] = &["전자기기", "가구", "음향장비", "사무용품", "전기용품", "기타"];

/// Icons suggested for `image_ref`. The first one is the default.
pub const DEFAULT_ICONS: &[&str] = &[
    "💻", "📽️", "🪑", "📷", "🎤", "📋", "🔌", "🔊", "📦", "🎒", "⌨️", "🖥️", "📱", "🎧", "🔧",
];

/// Rental period used when the operator does not pick a due date.
pub const DEFAULT_RENTAL_DAYS: u32 = 7;

pub fn default_category() -> &'static str {
    DEFAULT_CATEGORIES[0]
}

pub fn default_icon() -> &'static str {
    DEFAULT_ICONS[0]
}

/// `today + days`, saturating at the last representable date.
pub fn default_due_date(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Reject due dates in the past. Due today is allowed.
pub fn validate_due_date(due: NaiveDate, today: NaiveDate) -> DomainResult<()> {
    if due < today {
        return Err(DomainError::validation(format!(
            "due date {due} is before today ({today})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_due_date_is_a_week_out() {
        assert_eq!(
            default_due_date(date(2024, 5, 25), DEFAULT_RENTAL_DAYS),
            date(2024, 6, 1)
        );
    }

    #[test]
    fn due_date_must_not_be_in_the_past() {
        let today = date(2024, 5, 25);
        assert!(validate_due_date(today, today).is_ok());
        assert!(validate_due_date(date(2024, 6, 1), today).is_ok());
        assert!(matches!(
            validate_due_date(date(2024, 5, 24), today),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn defaults_come_first() {
        assert_eq!(default_category(), "전자기기");
        assert_eq!(default_icon(), "💻");
    }
}
