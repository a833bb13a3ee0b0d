//! Domain types — raw day records as fetched, and the collated table.

pub mod day;
pub mod table;

pub use day::{parse_calendar_date, DayRecord, HistoricalMapping, RawDay};
pub use table::{CollatedRow, CollatedTable};
