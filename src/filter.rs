//! Date-range selection over the order table.
//!
//! A range is a pair of calendar days, inclusive on both ends. Filtering
//! borrows from the loaded table and never copies or mutates orders.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::models::Order;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq)]
pub enum RangeError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("start date {start} is after end date {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },

    #[error("dataset has no approved orders")]
    EmptyDataset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Clamp both bounds into `span`, the dataset's first and last day
    pub fn clamp_to(&self, span: DateRange) -> DateRange {
        let start = self.start.clamp(span.start, span.end);
        let end = self.end.clamp(span.start, span.end);
        DateRange { start, end }
    }

    /// Build a selection from optional user input.
    ///
    /// Missing bounds default to the dataset span. A range overlapping the
    /// span is narrowed to it; a disjoint one is kept as is and selects
    /// nothing. Fails on unparseable text or when start ends up after end.
    pub fn from_selection(
        start: Option<&str>,
        end: Option<&str>,
        span: Option<DateRange>,
    ) -> Result<DateRange, RangeError> {
        let start = start.filter(|s| !s.trim().is_empty()).map(parse_date).transpose()?;
        let end = end.filter(|s| !s.trim().is_empty()).map(parse_date).transpose()?;

        match span {
            Some(span) => {
                // A lone bound past the span edge must not invert the default
                let start = start.unwrap_or(end.map_or(span.start, |e| e.min(span.start)));
                let end = end.unwrap_or(span.end.max(start));
                let range = DateRange::new(start, end)?;
                if range.overlaps(&span) {
                    Ok(range.clamp_to(span))
                } else {
                    Ok(range)
                }
            }
            None => match (start, end) {
                (Some(start), Some(end)) => DateRange::new(start, end),
                _ => Err(RangeError::EmptyDataset),
            },
        }
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, RangeError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| RangeError::InvalidDate(s.to_string()))
}

/// Orders approved within `range`; rows without an approval time never match
pub fn filter_orders<'a>(orders: &'a [Order], range: &DateRange) -> Vec<&'a Order> {
    orders
        .iter()
        .filter(|o| o.approved_date().is_some_and(|d| range.contains(d)))
        .collect()
}
