use crate::infra::read_lookup_table;
use chrono::NaiveDate;
use loan_intake::calendar::{DateError, JalaliDate};
use loan_intake::error::AppError;
use std::path::Path;

pub(crate) fn to_gregorian(raw: &str) -> Result<String, AppError> {
    let date = JalaliDate::parse(raw)?;
    Ok(date.to_gregorian().format("%Y-%m-%d").to_string())
}

pub(crate) fn to_jalali(raw: &str) -> Result<String, AppError> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        DateError::Format {
            value: raw.to_string(),
        }
    })?;
    Ok(JalaliDate::from_gregorian(date)?.to_string())
}

/// One line per table with its row count.
pub(crate) fn check_lookups(path: &Path) -> Result<String, AppError> {
    let table = read_lookup_table(path)?;
    let mut summary = String::new();
    for kind in table.kinds() {
        summary.push_str(&format!("{:<22} {:>4}\n", kind.label(), table.len(kind)));
    }
    Ok(summary)
}
