use crate::errors::AppError;
use crate::models::LeadTable;
use chrono::Datelike;

/// Year (and optional month) every view is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodFilter {
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: Option<u32>,
}

impl PeriodFilter {
    pub fn new(year: i32, month: Option<u32>) -> Result<Self, AppError> {
        if let Some(month) = month {
            if !(1..=12).contains(&month) {
                return Err(AppError::BadRequest(format!(
                    "Month must be between 1 and 12, got {}",
                    month
                )));
            }
        }
        Ok(Self { year, month })
    }

    /// Builds a filter from query values; `month` may be `"03"`, `"3"` or empty.
    pub fn from_query(year: Option<i32>, month: Option<&str>, default_year: i32) -> Result<Self, AppError> {
        let month = match month.map(str::trim).filter(|m| !m.is_empty()) {
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| {
                AppError::BadRequest(format!("Month must be a number, got '{}'", raw))
            })?),
            None => None,
        };
        Self::new(year.unwrap_or(default_year), month)
    }

    /// Rows created in the period. Rows without a readable create date never match.
    pub fn apply(&self, table: &LeadTable) -> LeadTable {
        let filtered = table.retain_rows(|row| {
            row.created_at.is_some_and(|created| {
                created.year() == self.year && self.month.map_or(true, |m| created.month() == m)
            })
        });
        tracing::debug!(
            "Period {}-{:?} kept {} of {} rows",
            self.year,
            self.month,
            filtered.len(),
            table.len()
        );
        filtered
    }
}
