use chrono::{Datelike, Months, NaiveDate};

/// A month-aligned query range covering exactly twelve months.
///
/// `start` is inclusive, `end` exclusive, both first-of-month. The dashboard
/// includes the current partial month (range ends at the start of next
/// month); the snapshot stops at the start of the current month. The two
/// anchors are kept distinct on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostQueryWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CostQueryWindow {
    /// Twelve months ending at the start of the current month, or at the
    /// start of next month when `include_current_month` is set.
    pub fn trailing_year(today: NaiveDate, include_current_month: bool) -> Self {
        let anchor = month_start(today);
        let end = if include_current_month {
            anchor + Months::new(1)
        } else {
            anchor
        };
        let start = end - Months::new(12);
        Self { start, end }
    }

    /// Inclusive start endpoint in the cost API's date-string format.
    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-01").to_string()
    }

    /// Exclusive end endpoint in the cost API's date-string format.
    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-01").to_string()
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .expect("first of month is always a valid date")
}
