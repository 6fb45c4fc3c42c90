use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::dashboard::DashboardMetrics;
use crate::ApiResponse;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};

/// Create the dashboard router
pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}

/// The landing dashboard rollup
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard metrics returned", body = DashboardMetrics),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let metrics = state.services.dashboard.get_dashboard_metrics().await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(metrics))))
}
