use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use serde_json::Value;

use super::lookup::LookupId;
use crate::calendar::{DateError, JalaliDate};

/// Untrusted key/value input collected by a form. A key may carry several values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct FormData {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every value stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), vec![value.into()]);
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(key.into()).or_default().push(value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn with_list<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.fields
            .insert(key.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn without(mut self, key: &str) -> Self {
        self.fields.remove(key);
        self
    }

    /// Last submitted value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    pub fn get_list(&self, key: &str) -> &[String] {
        self.fields.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    fn present(&self, field: &'static str) -> Option<&str> {
        self.get(field)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn required_text(&self, field: &'static str, max_len: usize) -> Result<String, FieldError> {
        let value = self.present(field).ok_or(FieldError::Missing { field })?;
        if value.chars().count() > max_len {
            return Err(FieldError::TooLong {
                field,
                max: max_len,
            });
        }
        Ok(value.to_string())
    }

    pub fn required_integer(&self, field: &'static str) -> Result<i64, FieldError> {
        let value = self.present(field).ok_or(FieldError::Missing { field })?;
        parse_integer(field, value)
    }

    /// Integer field that falls back to `default` when absent or blank.
    pub fn integer_or(&self, field: &'static str, default: i64) -> Result<i64, FieldError> {
        match self.present(field) {
            Some(value) => parse_integer(field, value),
            None => Ok(default),
        }
    }

    pub fn required_lookup(&self, field: &'static str) -> Result<LookupId, FieldError> {
        self.required_integer(field).map(LookupId)
    }

    /// All ids submitted under `field`; blank entries are skipped.
    pub fn lookup_set(&self, field: &'static str) -> Result<BTreeSet<LookupId>, FieldError> {
        self.get_list(field)
            .iter()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(|value| parse_integer(field, value).map(LookupId))
            .collect()
    }

    pub fn required_date(&self, field: &'static str) -> Result<JalaliDate, FieldError> {
        let value = self.present(field).ok_or(FieldError::Missing { field })?;
        JalaliDate::parse(value).map_err(|source| FieldError::Date { field, source })
    }

    pub fn required_email(&self, field: &'static str, max_len: usize) -> Result<String, FieldError> {
        let value = self.required_text(field, max_len)?;
        if !looks_like_email(&value) {
            return Err(FieldError::invalid(field, "not a valid e-mail address"));
        }
        Ok(value)
    }
}

impl From<BTreeMap<String, Value>> for FormData {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let fields = raw
            .into_iter()
            .filter_map(|(key, value)| {
                let values = match value {
                    Value::Null => return None,
                    Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
                    other => scalar_text(other).into_iter().collect(),
                };
                Some((key, values))
            })
            .collect();
        Self { fields }
    }
}

impl<K, V> FromIterator<(K, V)> for FormData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            form.append(key, value);
        }
        form
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        Value::Number(number) => Some(number.to_string()),
        nested => Some(nested.to_string()),
    }
}

fn parse_integer(field: &'static str, value: &str) -> Result<i64, FieldError> {
    value
        .parse::<i64>()
        .map_err(|_| FieldError::invalid(field, format!("`{value}` is not an integer")))
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

pub(crate) fn ensure_non_negative(field: &'static str, value: i64) -> Result<i64, FieldError> {
    if value < 0 {
        return Err(FieldError::invalid(field, "must not be negative"));
    }
    Ok(value)
}

pub(crate) fn ensure_positive_i32(field: &'static str, value: i64) -> Result<i32, FieldError> {
    if value <= 0 {
        return Err(FieldError::invalid(field, "must be greater than zero"));
    }
    i32::try_from(value).map_err(|_| FieldError::invalid(field, "is too large"))
}

/// Construction failure naming the offending form field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("missing required field `{field}`")]
    Missing { field: &'static str },
    #[error("field `{field}` is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("field `{field}` exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("field `{field}` holds a malformed date: {source}")]
    Date {
        field: &'static str,
        #[source]
        source: DateError,
    },
}

impl FieldError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            FieldError::Missing { field }
            | FieldError::Invalid { field, .. }
            | FieldError::TooLong { field, .. }
            | FieldError::Date { field, .. } => *field,
        }
    }
}

/// Records that can be built from a form submission alone.
pub trait FromForm: Sized {
    fn from_form(form: &FormData) -> Result<Self, FieldError>;
}
