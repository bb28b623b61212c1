use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::eto::{DailyResult, EtoError, Sample};
use crate::export::DAILY_CSV_FILE_NAME;
use crate::fetch_error::FetchError;
use crate::importers::ImportError;
use crate::services::{DateRange, DayDetail, EtoService, ServiceError};
use crate::source::LoadError;

#[derive(Clone)]
pub struct AppState {
    pub eto_service: EtoService,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct DailyTableResponse {
    pub total_days: usize,
    pub results: Vec<DailyResult>,
}

#[derive(Serialize)]
pub struct DaySamplesResponse {
    pub date: NaiveDate,
    pub total_samples: usize,
    pub samples: Vec<Sample>,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub total_samples: usize,
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/eto/daily", get(get_daily_table))
        .route("/eto/daily/export", get(export_daily_table))
        .route("/eto/daily/{date}", get(get_day))
        .route("/eto/daily/{date}/samples", get(get_day_samples))
        .route("/samples/refresh", post(refresh_samples))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

/// HTTP status for a service failure
///
/// Missing data is 404, bad source content or a day without a computable
/// estimate is 422, and an unreachable source is 502.
pub fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::NoData(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
        ServiceError::Load(LoadError::Fetch(FetchError::Import(import)))
        | ServiceError::Load(LoadError::Import(import)) => match import {
            ImportError::Io(_) | ImportError::WorkbookOpen(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        },
        ServiceError::Load(LoadError::Fetch(_)) => StatusCode::BAD_GATEWAY,
        ServiceError::Estimate(EtoError::NonFinite { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Estimate(_)
        | ServiceError::Export(_)
        | ServiceError::Task(_)
        | ServiceError::Load(LoadError::Task(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_and_map(context: &str, err: ServiceError) -> StatusCode {
    let status = status_for(&err);
    if status == StatusCode::NOT_FOUND {
        warn!("{}: {}", context, err);
    } else {
        error!("{}: {}", context, err);
    }
    status
}

#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[instrument(skip(state))]
async fn get_daily_table(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> Result<Json<DailyTableResponse>, StatusCode> {
    debug!("Computing daily table for {}", range);
    let results = state
        .eto_service
        .daily_results(range)
        .await
        .map_err(|e| log_and_map("Failed to compute daily table", e))?;

    info!("Returning {} daily results for {}", results.len(), range);
    Ok(Json(DailyTableResponse {
        total_days: results.len(),
        results,
    }))
}

#[instrument(skip(state))]
async fn export_daily_table(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> Result<impl IntoResponse, StatusCode> {
    let csv = state
        .eto_service
        .export_csv(range)
        .await
        .map_err(|e| log_and_map("Failed to export daily table", e))?;

    info!("Exporting {} bytes of daily results for {}", csv.len(), range);
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", DAILY_CSV_FILE_NAME),
        ),
    ];
    Ok((headers, csv))
}

#[instrument(skip(state), fields(date = %date))]
async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<DayDetail>, StatusCode> {
    debug!("Computing ETo for {}", date);
    let detail = state
        .eto_service
        .day_detail(date)
        .await
        .map_err(|e| log_and_map("Failed to compute day", e))?;

    info!(
        "ETo for {}: {:.3} mm/day from {} samples",
        date, detail.result.eto_mm, detail.sample_count
    );
    Ok(Json(detail))
}

#[instrument(skip(state), fields(date = %date))]
async fn get_day_samples(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<DaySamplesResponse>, StatusCode> {
    let samples = state
        .eto_service
        .day_samples(date)
        .await
        .map_err(|e| log_and_map("Failed to select day samples", e))?;

    debug!("Returning {} samples for {}", samples.len(), date);
    Ok(Json(DaySamplesResponse {
        date,
        total_samples: samples.len(),
        samples,
    }))
}

#[instrument(skip(state))]
async fn refresh_samples(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, StatusCode> {
    let total_samples = state
        .eto_service
        .refresh()
        .await
        .map_err(|e| log_and_map("Failed to refresh samples", e))?;

    Ok(Json(RefreshResponse { total_samples }))
}
