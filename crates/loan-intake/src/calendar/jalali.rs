use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// Jalali years at which the 33-year leap cycle is re-anchored.
const BREAKS: [i32; 20] = [
    -61, 9, 38, 199, 426, 686, 756, 818, 1111, 1181, 1210, 1635, 2060, 2097, 2192, 2262, 2324,
    2394, 2456, 3178,
];

const MIN_YEAR: i32 = 1;
/// Last year whose successor still lies inside the break table, so that Esfand of the
/// final year can be located from the following Gregorian year.
const MAX_YEAR: i32 = 3176;

/// Errors raised while parsing or converting Jalali dates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("expected a YYYY/MM/DD date, found `{value}`")]
    Format { value: String },
    #[error("{year:04}/{month:02}/{day:02} is not a valid Jalali date")]
    OutOfRange { year: i32, month: u32, day: u32 },
    #[error("{date} falls outside the supported Jalali years")]
    Unsupported { date: NaiveDate },
}

/// A validated date in the Jalali calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JalaliDate {
    year: i32,
    month: u32,
    day: u32,
}

impl JalaliDate {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        let out_of_range = DateError::OutOfRange { year, month, day };
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) || !(1..=12).contains(&month) {
            return Err(out_of_range);
        }
        if day == 0 || day > month_length(year, month) {
            return Err(out_of_range);
        }

        Ok(Self { year, month, day })
    }

    /// Parse `YYYY/MM/DD` text as submitted by intake forms.
    pub fn parse(value: &str) -> Result<Self, DateError> {
        let format_error = || DateError::Format {
            value: value.to_string(),
        };

        let segments: Vec<&str> = value.trim().split('/').collect();
        if segments.len() != 3 {
            return Err(format_error());
        }
        if segments
            .iter()
            .any(|segment| segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(format_error());
        }

        let year = segments[0].parse::<i32>().map_err(|_| format_error())?;
        let month = segments[1].parse::<u32>().map_err(|_| format_error())?;
        let day = segments[2].parse::<u32>().map_err(|_| format_error())?;

        Self::new(year, month, day)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn to_gregorian(&self) -> NaiveDate {
        let cycle = YearCycle::for_year(self.year);
        let month = self.month as i64;
        let offset = (month - 1) * 31 - (month / 7) * (month - 7) + self.day as i64 - 1;
        cycle.nowruz() + Duration::days(offset)
    }

    pub fn from_gregorian(date: NaiveDate) -> Result<Self, DateError> {
        let unsupported = DateError::Unsupported { date };
        let mut year = date.year() - 621;
        // Dates before Nowruz belong to the previous Jalali year.
        if !(MIN_YEAR..=MAX_YEAR + 1).contains(&year) {
            return Err(unsupported);
        }

        let cycle = YearCycle::for_year(year);
        let mut offset = (date - cycle.nowruz()).num_days();
        if offset >= 0 {
            if year > MAX_YEAR {
                return Err(unsupported);
            }
            if offset <= 185 {
                return Ok(Self {
                    year,
                    month: (1 + offset / 31) as u32,
                    day: (offset % 31 + 1) as u32,
                });
            }
            offset -= 186;
        } else {
            year -= 1;
            if year < MIN_YEAR {
                return Err(unsupported);
            }
            offset += 179;
            if cycle.leap == 1 {
                offset += 1;
            }
        }

        Ok(Self {
            year,
            month: (7 + offset / 30) as u32,
            day: (offset % 30 + 1) as u32,
        })
    }
}

impl fmt::Display for JalaliDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for JalaliDate {
    type Err = DateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// Render a stored Gregorian date-time as Jalali `YYYY/MM/DD`.
pub fn persian_date(value: &NaiveDateTime) -> Result<String, DateError> {
    JalaliDate::from_gregorian(value.date()).map(|date| date.to_string())
}

pub fn is_leap_year(year: i32) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&year) && YearCycle::for_year(year).leap == 0
}

/// Number of days in a Jalali month, zero when the month does not exist.
pub fn month_length(year: i32, month: u32) -> u32 {
    match month {
        1..=6 => 31,
        7..=11 => 30,
        12 if is_leap_year(year) => 30,
        12 => 29,
        _ => 0,
    }
}

/// Position of a Jalali year within its leap cycle plus the Gregorian day of Nowruz.
struct YearCycle {
    /// Years since the last leap year; zero marks a leap year.
    leap: i32,
    gregorian_year: i32,
    march_day: i32,
}

impl YearCycle {
    fn for_year(year: i32) -> Self {
        let gregorian_year = year + 621;
        let mut leap_jalali = -14;
        let mut previous_break = BREAKS[0];
        let mut jump = 0;

        for &next_break in &BREAKS[1..] {
            jump = next_break - previous_break;
            if year < next_break {
                break;
            }
            leap_jalali += jump / 33 * 8 + (jump % 33) / 4;
            previous_break = next_break;
        }

        let mut elapsed = year - previous_break;
        leap_jalali += elapsed / 33 * 8 + (elapsed % 33 + 3) / 4;
        if jump % 33 == 4 && jump - elapsed == 4 {
            leap_jalali += 1;
        }

        let leap_gregorian = gregorian_year / 4 - (gregorian_year / 100 + 1) * 3 / 4 - 150;
        let march_day = 20 + leap_jalali - leap_gregorian;

        if jump - elapsed < 6 {
            elapsed = elapsed - jump + (jump + 4) / 33 * 33;
        }
        let mut leap = ((elapsed + 1) % 33 - 1) % 4;
        if leap == -1 {
            leap = 4;
        }

        Self {
            leap,
            gregorian_year,
            march_day,
        }
    }

    fn nowruz(&self) -> NaiveDate {
        // March 19..=22 for every supported year.
        NaiveDate::from_ymd_opt(self.gregorian_year, 3, self.march_day as u32)
            .unwrap_or(NaiveDate::MIN)
    }
}
