//! Jalali (Persian solar) calendar support.
//!
//! Forms collect birth dates as Jalali `YYYY/MM/DD` text while records store Gregorian
//! date-times. This module owns the conversion in both directions.

mod jalali;

pub use jalali::{is_leap_year, month_length, persian_date, DateError, JalaliDate};
