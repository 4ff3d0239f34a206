use crate::charts::{self, Figure};
use crate::config::Config;
use crate::errors::AppError;
use crate::export::{missing_contact_owner_xlsx, MISSING_OWNER_FILENAME};
use crate::models::{LeadTable, ReportQuery, ReportResponse, UploadRequest};
use crate::pipeline::{prepare, PreparedTable};
use crate::reports::{self, CategoryField, Distribution, DuplicatesReport, LeadsTablePage, MissingOwnerReport};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Largest page a table request may ask for.
const MAX_PAGE_SIZE: usize = 500;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
}

/// A distribution together with the figure drawn from it.
#[derive(Debug, Clone, Serialize)]
pub struct ChartView {
    pub distribution: Distribution,
    pub figure: Figure,
}

/// Every chart of the dashboard in one response.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub country_map: ChartView,
    pub categories: Vec<ChartView>,
    pub months: ChartView,
    pub ages: ChartView,
}

/// Runs the pipeline off the async runtime and wraps the result with its metadata.
async fn run_report<T, F>(
    state: &Arc<AppState>,
    request: UploadRequest,
    query: ReportQuery,
    build: F,
) -> Result<ReportResponse<T>, AppError>
where
    T: Serialize + Send + 'static,
    F: FnOnce(&PreparedTable, &ReportQuery, &Config) -> Result<T, AppError> + Send + 'static,
{
    let config = state.config.clone();
    tokio::task::spawn_blocking(move || {
        let prepared = prepare(&request, &query, &config)?;
        let report = build(&prepared, &query, &config)?;
        Ok::<_, AppError>(ReportResponse {
            meta: prepared.meta,
            report,
        })
    })
    .await?
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "lead-report",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/v1/reports/table
///
/// The filtered lead table, one page at a time.
pub async fn leads_table(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<ReportResponse<LeadsTablePage>>, AppError> {
    tracing::info!("POST /reports/table - query: {:?}", query);
    let response = run_report(&state, request, query, |prepared, query, config| {
        let page = query.page.unwrap_or(0);
        let page_size = query
            .page_size
            .unwrap_or(config.table_page_size)
            .clamp(1, MAX_PAGE_SIZE);
        Ok(reports::leads_table(&prepared.table, page, page_size))
    })
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/reports/duplicates
pub async fn duplicates(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<ReportResponse<DuplicatesReport>>, AppError> {
    tracing::info!("POST /reports/duplicates - query: {:?}", query);
    let response = run_report(&state, request, query, |prepared, _, _| {
        Ok(reports::duplicate_records(&prepared.table))
    })
    .await?;

    tracing::info!(
        "Found {} phone and {} email duplicate rows",
        response.report.phone_matches,
        response.report.email_matches
    );
    Ok(Json(response))
}

/// POST /api/v1/reports/missing-contact-owner
pub async fn missing_contact_owner(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<ReportResponse<MissingOwnerReport>>, AppError> {
    tracing::info!("POST /reports/missing-contact-owner - query: {:?}", query);
    let response = run_report(&state, request, query, |prepared, _, _| {
        Ok(reports::missing_contact_owner(&prepared.table))
    })
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/reports/missing-contact-owner/download
///
/// Same rows as `missing_contact_owner`, as an xlsx attachment.
pub async fn download_missing_contact_owner(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
    Json(request): Json<UploadRequest>,
) -> Result<Response, AppError> {
    tracing::info!(
        "POST /reports/missing-contact-owner/download - query: {:?}",
        query
    );
    let response = run_report(&state, request, query, |prepared, _, _| {
        missing_contact_owner_xlsx(&prepared.table)
    })
    .await?;

    let disposition = format!("attachment; filename=\"{}\"", MISSING_OWNER_FILENAME);
    let mut http_response = (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        response.report,
    )
        .into_response();

    if let Ok(value) = HeaderValue::from_str(&response.meta.fingerprint) {
        http_response
            .headers_mut()
            .insert("x-upload-fingerprint", value);
    }
    Ok(http_response)
}

/// POST /api/v1/reports/distribution/:field
///
/// `field` is `country`, `lead-source`, `contact-owner`, `lead-status`, `month` or `age`.
pub async fn distribution(
    State(state): State<Arc<AppState>>,
    Path(field): Path<String>,
    Query(query): Query<ReportQuery>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<ReportResponse<ChartView>>, AppError> {
    tracing::info!("POST /reports/distribution/{} - query: {:?}", field, query);

    enum View {
        Category(CategoryField),
        Month,
        Age,
    }

    // Resolve the field before touching the upload.
    let view = match field.as_str() {
        "month" => View::Month,
        "age" => View::Age,
        other => View::Category(other.parse()?),
    };

    let response = run_report(&state, request, query, move |prepared, _, _| {
        let table = &prepared.table;
        Ok(match view {
            View::Category(field) => category_view(table, field),
            View::Month => {
                let distribution = reports::month_distribution(table);
                ChartView {
                    figure: charts::month_pie(&distribution),
                    distribution,
                }
            }
            View::Age => {
                let distribution = reports::age_distribution(table);
                ChartView {
                    figure: charts::age_pie(&distribution),
                    distribution,
                }
            }
        })
    })
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/reports/country-map
pub async fn country_map(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<ReportResponse<ChartView>>, AppError> {
    tracing::info!("POST /reports/country-map - query: {:?}", query);
    let response = run_report(&state, request, query, |prepared, _, _| {
        Ok(country_map_view(&prepared.table))
    })
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/reports/dashboard
///
/// Map, category pies, month pie and age pie computed from one upload.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<ReportResponse<DashboardReport>>, AppError> {
    tracing::info!("POST /reports/dashboard - query: {:?}", query);
    let response = run_report(&state, request, query, |prepared, _, _| {
        let table = &prepared.table;
        let months = reports::month_distribution(table);
        let ages = reports::age_distribution(table);
        Ok(DashboardReport {
            country_map: country_map_view(table),
            categories: CategoryField::ALL
                .into_iter()
                .map(|field| category_view(table, field))
                .collect(),
            months: ChartView {
                figure: charts::month_pie(&months),
                distribution: months,
            },
            ages: ChartView {
                figure: charts::age_pie(&ages),
                distribution: ages,
            },
        })
    })
    .await?;
    Ok(Json(response))
}

fn category_view(table: &LeadTable, field: CategoryField) -> ChartView {
    let distribution = reports::category_distribution(table, field);
    ChartView {
        figure: charts::category_pie(field, &distribution),
        distribution,
    }
}

fn country_map_view(table: &LeadTable) -> ChartView {
    let distribution = reports::country_map(table);
    ChartView {
        figure: charts::choropleth(&distribution),
        distribution,
    }
}
