//! Normalization applied to every freshly loaded lead table.
//!
//! 1. `SNo` is inserted as the first column, numbered from 1 in file order
//! 2. `Create Date` is parsed and a `Year` column is appended
//! 3. Phone numbers lose their spaces and keep only the last 10 characters
//! 4. Empty `Lead Source` cells get the configured default

use crate::errors::AppError;
use crate::models::{
    Cell, LeadTable, CREATE_DATE, LEAD_SOURCE, PHONE_NUMBER, SERIAL_NUMBER, YEAR,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};

/// Digits kept from the end of a phone number.
const PHONE_DIGITS: usize = 10;

/// Text layouts accepted for `Create Date`, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Applies the load-time invariants. Requires a `Create Date` column.
pub fn normalize(mut table: LeadTable, default_lead_source: &str) -> Result<LeadTable, AppError> {
    let create_index = table.column_index(CREATE_DATE).ok_or_else(|| {
        AppError::UnprocessableEntity(format!("Upload has no '{}' column", CREATE_DATE))
    })?;
    let phone_index = table.column_index(PHONE_NUMBER);
    let source_index = table.column_index(LEAD_SOURCE);

    let mut unparsed_dates = 0usize;
    let mut defaulted_sources = 0usize;

    for row in table.rows.iter_mut() {
        row.created_at = parse_create_date(&row.cells[create_index]);
        if row.created_at.is_none() {
            unparsed_dates += 1;
        }

        if let Some(index) = phone_index {
            let cell = &mut row.cells[index];
            *cell = match cell.as_text() {
                Some(raw) => Cell::Text(normalize_phone(&raw)),
                None => Cell::Empty,
            };
        }

        if let Some(index) = source_index {
            if row.cells[index].is_missing() {
                row.cells[index] = Cell::Text(default_lead_source.to_string());
                defaulted_sources += 1;
            }
        }
    }

    // Lead Source is optional in exports; add it so the default still applies.
    if source_index.is_none() {
        table.columns.push(LEAD_SOURCE.to_string());
        for row in table.rows.iter_mut() {
            row.cells.push(Cell::Text(default_lead_source.to_string()));
        }
        defaulted_sources = table.rows.len();
    }

    table.columns.insert(0, SERIAL_NUMBER.to_string());
    table.columns.push(YEAR.to_string());
    for (position, row) in table.rows.iter_mut().enumerate() {
        row.cells.insert(0, Cell::Int(position as i64 + 1));
        let year = row
            .created_at
            .map(|created| Cell::Int(i64::from(created.year())))
            .unwrap_or(Cell::Empty);
        row.cells.push(year);
    }

    if unparsed_dates > 0 {
        tracing::warn!(
            "{} row(s) have a missing or unreadable '{}'",
            unparsed_dates,
            CREATE_DATE
        );
    }
    tracing::debug!(
        "Normalized {} rows ({} lead sources defaulted)",
        table.len(),
        defaulted_sources
    );

    Ok(table)
}

/// Removes spaces and keeps the last 10 characters, dropping country codes.
pub fn normalize_phone(raw: &str) -> String {
    let compact: Vec<char> = raw.chars().filter(|c| *c != ' ').collect();
    let start = compact.len().saturating_sub(PHONE_DIGITS);
    compact[start..].iter().collect()
}

/// Reads a `Create Date` cell as a timestamp.
pub fn parse_create_date(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(value) => Some(*value),
        Cell::Float(serial) => excel_serial_to_datetime(*serial),
        Cell::Int(serial) => excel_serial_to_datetime(*serial as f64),
        Cell::Text(text) => parse_datetime_text(text.trim()),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Some(value.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Converts an Excel 1900-system serial number to a timestamp.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}
