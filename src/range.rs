use chrono::{Duration, Local, NaiveDate};

use crate::models::DateRange;

pub const DEFAULT_WINDOW_DAYS: i64 = 7;

const ISO_DATE: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("start date {start} is after end date {end}")]
    Inverted { start: String, end: String },
}

/// Fills in missing bounds: today for the start, today plus a week for the end.
/// Supplied bounds are used verbatim.
pub fn resolve(start_date: Option<&str>, end_date: Option<&str>) -> DateRange {
    resolve_at(Local::now().date_naive(), start_date, end_date)
}

pub fn resolve_at(today: NaiveDate, start_date: Option<&str>, end_date: Option<&str>) -> DateRange {
    let start = match start_date {
        Some(value) => value.to_string(),
        None => today.format(ISO_DATE).to_string(),
    };
    let end = match end_date {
        Some(value) => value.to_string(),
        None => (today + Duration::days(DEFAULT_WINDOW_DAYS))
            .format(ISO_DATE)
            .to_string(),
    };
    DateRange { start, end }
}

impl DateRange {
    pub fn validate(&self) -> Result<(), RangeError> {
        let start = parse_iso(&self.start)?;
        let end = parse_iso(&self.end)?;
        if start > end {
            return Err(RangeError::Inverted {
                start: self.start.clone(),
                end: self.end.clone(),
            });
        }
        Ok(())
    }
}

fn parse_iso(value: &str) -> Result<NaiveDate, RangeError> {
    NaiveDate::parse_from_str(value, ISO_DATE).map_err(|_| RangeError::InvalidDate(value.into()))
}
