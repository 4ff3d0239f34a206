//! Lead Report Library
//!
//! Turns an uploaded spreadsheet export of sales leads into derived views:
//! the lead table, duplicate records, missing-field counts, per-category pie
//! charts, a country choropleth and an xlsx export of leads without a
//! contact owner. Every view is computed from scratch per request.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `models`: Cells, the lead table and API payloads.
//! - `upload`: Decoding of `data:` URL uploads.
//! - `loader`: Workbook and CSV parsing.
//! - `normalize`: Load-time normalization (serial numbers, years, phones, lead sources).
//! - `filter`: Year/month period filter.
//! - `pipeline`: Decode -> load -> normalize -> filter.
//! - `reports`: Derived views.
//! - `charts`: Plotly figure builders.
//! - `export`: Xlsx export.
//! - `handlers`: HTTP request handlers.
//! - `dashboard`: Single-page dashboard.
//! - `routes`: Router assembly.

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod export;
pub mod filter;
pub mod handlers;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod reports;
pub mod routes;
pub mod upload;
