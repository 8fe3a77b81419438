use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::app_error::{AppError, AppResult};

/// Day of month on which invoices fall due.
const DUE_DAY: u32 = 5;

/// One (month, year) billing cycle.
///
/// This is the single home of period arithmetic; both the scheduled generator
/// and the reconciliation rollover go through it so the next-period and
/// due-date rules are defined exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub month: u32,
    pub year: i32,
}

impl BillingPeriod {
    pub fn new(month: u32, year: i32) -> AppResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(AppError::InvalidInput(format!(
                "month must be 1..=12, got {}",
                month
            )));
        }
        Ok(Self { month, year })
    }

    /// The period for a given calendar date.
    pub fn containing(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            month: date.month(),
            year: date.year(),
        }
    }

    /// The following billing period, rolling the year past December.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                month: 1,
                year: self.year + 1,
            }
        } else {
            Self {
                month: self.month + 1,
                year: self.year,
            }
        }
    }

    /// When an invoice for this period falls due: the 5th of the following
    /// month. An invoice for June 2024 is due 2024-07-05.
    pub fn payment_due_date(self) -> NaiveDate {
        let next = self.next();
        NaiveDate::from_ymd_opt(next.year, next.month, DUE_DAY)
            .expect("day 5 exists in every month")
    }

    /// Human-readable label for notification copy, e.g. "June 2024".
    pub fn label(self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "?",
    }
}
