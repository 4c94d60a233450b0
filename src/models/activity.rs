use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One event/activity as returned by the remote service. The shape is owned
/// by the service, so records stay as untyped field maps.
pub type ActivityRecord = Map<String, Value>;

/// One view group (event category) record, same deal as [`ActivityRecord`].
pub type GroupRecord = Map<String, Value>;

/// Days covered by the default range when no end date is supplied.
pub const DEFAULT_RANGE_DAYS: i64 = 5;
/// Days covered by the week view.
pub const WEEK_WINDOW_DAYS: i64 = 7;
/// Days covered by the month view.
pub const MONTH_WINDOW_DAYS: i64 = 31;

/// A calendar date window. Both bounds are optional at the call boundary and
/// defaulted when resolved.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Substitutes `today` for a missing start and `today + 5 days` for a
    /// missing end.
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = self.start.unwrap_or(today);
        let end = self
            .end
            .unwrap_or(today + Duration::days(DEFAULT_RANGE_DAYS));
        (start, end)
    }
}

/// Current local calendar date. Windows are computed from the date alone, so
/// time of day never shifts them.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Formats a date the way the service wants it on the wire.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
