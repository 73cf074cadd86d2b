//! Calendar arithmetic for period offsets and the business-day fallback.

use chrono::{Datelike, Weekday};
use malaga_traits::{Date, MalagaError, Result};
use serde::{Deserialize, Serialize};

/// Unit of a period offset from the start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetUnit {
    /// Calendar months, clamped to the end of shorter months.
    #[default]
    Months,
    /// Calendar days.
    Days,
}

impl OffsetUnit {
    /// Short name used in logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Months => "months",
            Self::Days => "days",
        }
    }
}

/// Adds `amount` units to `start`.
///
/// Month arithmetic clamps to the last day of the target month, so
/// 2024-01-31 + 1 month is 2024-02-29.
///
/// # Errors
///
/// Returns [`MalagaError::InvalidDate`] if the result is out of range.
pub fn offset_date(start: Date, unit: OffsetUnit, amount: u32) -> Result<Date> {
    let shifted = match unit {
        OffsetUnit::Months => start.checked_add_months(chrono::Months::new(amount)),
        OffsetUnit::Days => start.checked_add_days(chrono::Days::new(u64::from(amount))),
    };
    shifted.ok_or_else(|| {
        MalagaError::InvalidDate(format!(
            "{start} + {amount} {} is out of range",
            unit.as_str()
        ))
    })
}

/// Whether `date` falls on a Saturday or Sunday.
pub fn is_weekend(date: Date) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The most recent weekday strictly before `date`.
///
/// Only weekends are skipped; there is no holiday calendar.
///
/// # Errors
///
/// Returns [`MalagaError::InvalidDate`] at the lower bound of the date range.
pub fn previous_business_day(date: Date) -> Result<Date> {
    let mut day = date;
    loop {
        day = day
            .pred_opt()
            .ok_or_else(|| MalagaError::InvalidDate(format!("no day before {date}")))?;
        if !is_weekend(day) {
            return Ok(day);
        }
    }
}
