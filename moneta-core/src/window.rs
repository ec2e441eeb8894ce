//! Date-window resolution: anchor instant + period code -> half of the
//! filtering story. Total by construction; unrecognized codes degrade to an
//! unbounded window instead of failing.

use chrono::{Datelike, Days, Months, NaiveDateTime};

/// Reporting periods accepted by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// From the first instant of the anchor's calendar month.
    Month,
    /// From the first instant of the anchor's calendar year.
    Year,
    /// From the most recent Monday at or before the anchor, midnight.
    Week,
    /// Unbounded lower bound.
    All,
    /// From the anchor minus N calendar months.
    MonthsBack(u32),
}

impl Period {
    /// Map an export-facing period code (`M`, `Y`, `W`, `ALL`,
    /// case-insensitive). Unrecognized codes fold to `All`, so the window
    /// degenerates rather than erroring; callers that care validate the
    /// code upstream.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "M" => Period::Month,
            "Y" => Period::Year,
            "W" => Period::Week,
            _ => Period::All,
        }
    }
}

/// Closed `[start, end]` window, both bounds inclusive. `start <= end`
/// always holds; out-of-order bounds are swapped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    pub fn new(a: NaiveDateTime, b: NaiveDateTime) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Resolve an anchor instant plus a period into a window ending at the
/// anchor.
pub fn resolve(anchor: NaiveDateTime, period: Period) -> DateWindow {
    let start = match period {
        Period::Month => month_start(anchor),
        Period::Year => year_start(anchor),
        Period::Week => week_start(anchor),
        Period::All => NaiveDateTime::MIN,
        Period::MonthsBack(months) => anchor
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDateTime::MIN),
    };
    DateWindow::new(start, anchor)
}

fn month_start(anchor: NaiveDateTime) -> NaiveDateTime {
    anchor
        .date()
        .with_day(1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

fn year_start(anchor: NaiveDateTime) -> NaiveDateTime {
    anchor
        .date()
        .with_ordinal(1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

fn week_start(anchor: NaiveDateTime) -> NaiveDateTime {
    let offset = u64::from(anchor.date().weekday().num_days_from_monday());
    anchor
        .checked_sub_days(Days::new(offset))
        .map(|d| d.date())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}
