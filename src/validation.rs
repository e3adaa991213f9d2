//! Checks applied before anything reaches the store.

use crate::errors::StoreError;
use crate::models::{Topic, TopicData};
use chrono::{Datelike, NaiveDate};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::ops::RangeInclusive;

/// Years a four-digit `YYYY` key can name.
pub const YEAR_RANGE: RangeInclusive<i32> = 1..=9999;

pub fn required_text(field: &str, value: &str) -> Result<String, StoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub fn entry_value(value: f64) -> Result<f64, StoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(StoreError::validation(format!(
            "value must be a non-negative number, got {value}"
        )));
    }
    Ok(value)
}

/// Validates every value and drops zero entries.
pub fn normalize_data(data: TopicData) -> Result<TopicData, StoreError> {
    let mut normalized = TopicData::new();
    for (date, value) in data {
        check_year(date)?;
        if entry_value(value)? > 0.0 {
            normalized.insert(date, value);
        }
    }
    Ok(normalized)
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, StoreError> {
    let invalid = || StoreError::validation(format!("invalid date `{raw}`, expected YYYY-MM-DD"));
    if raw.len() != 10 {
        return Err(invalid());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?;
    check_year(date).map_err(|_| invalid())
}

fn check_year(date: NaiveDate) -> Result<NaiveDate, StoreError> {
    if !YEAR_RANGE.contains(&date.year()) {
        return Err(StoreError::validation(format!(
            "date {date} is outside years {}..={}",
            YEAR_RANGE.start(),
            YEAR_RANGE.end()
        )));
    }
    Ok(date)
}

/// Parses an import payload. Either every record is valid or nothing is returned.
pub fn import_payload(payload: &Value) -> Result<Vec<Topic>, StoreError> {
    let Value::Array(items) = payload else {
        return Err(StoreError::validation("import payload must be an array of topics"));
    };

    let mut seen = HashSet::new();
    let mut topics = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let topic = import_record(item)
            .map_err(|reason| StoreError::validation(format!("topic at index {index}: {reason}")))?;
        if !seen.insert(topic.id.clone()) {
            return Err(StoreError::validation(format!(
                "topic at index {index}: duplicate id `{}`",
                topic.id
            )));
        }
        topics.push(topic);
    }
    Ok(topics)
}

fn import_record(item: &Value) -> Result<Topic, String> {
    let Value::Object(fields) = item else {
        return Err("expected an object".to_string());
    };

    let id = text_field(fields, "id")?;
    let name = text_field(fields, "name")?;
    let unit = text_field(fields, "unit")?;
    let Some(Value::Object(raw_data)) = fields.get("data") else {
        return Err("`data` must be an object".to_string());
    };

    let mut data = TopicData::new();
    for (key, raw) in raw_data {
        let date = parse_date(key).map_err(|err| err.to_string())?;
        let value = raw
            .as_f64()
            .ok_or_else(|| format!("value for {key} must be a number"))?;
        let value = entry_value(value).map_err(|err| err.to_string())?;
        if value > 0.0 {
            data.insert(date, value);
        }
    }

    Ok(Topic { id, name, unit, data })
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Result<String, String> {
    match fields.get(key) {
        Some(Value::String(text)) => required_text(key, text).map_err(|err| err.to_string()),
        Some(_) => Err(format!("`{key}` must be a string")),
        None => Err(format!("missing `{key}`")),
    }
}
