//! Shared decode -> load -> normalize -> filter steps.
//!
//! Each view calls this on its own request; nothing is kept between calls.

use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::filter::PeriodFilter;
use crate::loader::load_table;
use crate::models::{LeadTable, ReportMeta, ReportQuery, UploadRequest};
use crate::normalize::normalize;
use crate::upload::{decode_contents, Upload};

/// A period-filtered table plus what it was derived from.
#[derive(Debug, Clone)]
pub struct PreparedTable {
    pub meta: ReportMeta,
    pub table: LeadTable,
}

/// Loads and normalizes an already decoded upload, then applies `filter`.
pub fn prepare_upload(
    upload: &Upload,
    filter: PeriodFilter,
    default_lead_source: &str,
) -> Result<PreparedTable, AppError> {
    let fingerprint = upload.fingerprint();
    let raw = load_table(upload).with_context(|| format!("loading upload {}", short(&fingerprint)))?;
    let table = normalize(raw, default_lead_source)?;
    let filtered = filter.apply(&table);

    tracing::info!(
        "Upload {}: {} rows, {} in {}{}",
        short(&fingerprint),
        table.len(),
        filtered.len(),
        filter.year,
        filter
            .month
            .map(|m| format!("-{:02}", m))
            .unwrap_or_default()
    );

    Ok(PreparedTable {
        meta: ReportMeta {
            fingerprint,
            year: filter.year,
            month: filter.month,
            total_rows: table.len(),
            filtered_rows: filtered.len(),
        },
        table: filtered,
    })
}

/// Full pipeline for an API request.
pub fn prepare(
    request: &UploadRequest,
    query: &ReportQuery,
    config: &Config,
) -> Result<PreparedTable, AppError> {
    let filter = PeriodFilter::from_query(query.year, query.month.as_deref(), config.default_year)?;
    let upload = decode_contents(
        &request.contents,
        request.filename.as_deref(),
        config.max_upload_bytes,
    )?;
    prepare_upload(&upload, filter, &config.default_lead_source)
}

fn short(fingerprint: &str) -> &str {
    &fingerprint[..12.min(fingerprint.len())]
}
