use crate::entities::inventory_log::{self, LogType};
use crate::errors::ServiceError;
use crate::handlers::common::acting_user;
use crate::handlers::AppState;
use crate::services::inventory::ManualAdjustment;
use axum::{
    extract::{Json, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::ApiResponse;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAdjustmentRequest {
    #[validate(length(min = 1, message = "part SKU is required"))]
    pub part_sku: String,
    /// Signed delta; zero is rejected
    pub quantity: i32,
    /// Defaults to the configured adjustment bin
    pub bin: Option<String>,
    pub part_acronym: Option<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct LogQuery {
    /// How many entries to return, newest first
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogEntryResponse {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub part_sku: String,
    pub quantity: i32,
    pub log_type: LogType,
    pub bin: String,
    pub notes: String,
    pub related_request_id: Option<Uuid>,
    pub part_acronym: Option<String>,
}

impl From<inventory_log::Model> for LogEntryResponse {
    fn from(entry: inventory_log::Model) -> Self {
        Self {
            id: entry.id,
            occurred_at: entry.occurred_at,
            part_sku: entry.part_sku,
            quantity: entry.quantity,
            log_type: entry.log_type,
            bin: entry.bin,
            notes: entry.notes,
            related_request_id: entry.related_request_id,
            part_acronym: entry.part_acronym,
        }
    }
}

/// Create the inventory router
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/adjustments", post(create_adjustment))
        .route("/log", get(recent_log))
        .route("/skus", get(list_skus))
        .route("/categories", get(known_categories))
        .route("/stock/summary", get(stock_summary))
        .route("/stock/detailed", get(detailed_stock))
}

/// Record a manual stock adjustment
#[utoipa::path(
    post,
    path = "/api/v1/inventory/adjustments",
    request_body = CreateAdjustmentRequest,
    responses(
        (status = 201, description = "Adjustment recorded", body = LogEntryResponse),
        (status = 400, description = "Invalid adjustment", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn create_adjustment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateAdjustmentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let actor = acting_user(&headers);
    let entry = state
        .services
        .inventory
        .manual_adjustment(
            ManualAdjustment {
                part_sku: payload.part_sku,
                quantity: payload.quantity,
                bin: payload.bin,
                part_acronym: payload.part_acronym,
                notes: payload.notes,
            },
            &actor,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(LogEntryResponse::from(entry))),
    ))
}

/// Inspect the most recent ledger entries
#[utoipa::path(
    get,
    path = "/api/v1/inventory/log",
    params(LogQuery),
    responses(
        (status = 200, description = "Ledger entries returned, newest first"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn recent_log(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let entries = state.services.inventory.recent_entries(query.limit).await?;
    let entries: Vec<LogEntryResponse> = entries.into_iter().map(LogEntryResponse::from).collect();
    Ok((StatusCode::OK, Json(ApiResponse::success(entries))))
}

/// List every SKU the ledger has seen
#[utoipa::path(
    get,
    path = "/api/v1/inventory/skus",
    responses(
        (status = 200, description = "Distinct SKUs returned, sorted"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_skus(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let skus = state.services.inventory.list_skus().await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(skus))))
}

/// List every part category known to the resolver
#[utoipa::path(
    get,
    path = "/api/v1/inventory/categories",
    responses(
        (status = 200, description = "Known categories returned, sorted"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn known_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let categories = state.services.inventory.known_categories().await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(categories))))
}

/// Usable stock totals per resolved category
#[utoipa::path(
    get,
    path = "/api/v1/inventory/stock/summary",
    responses(
        (status = 200, description = "Category totals returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn stock_summary(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state.services.inventory.category_summary().await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(summary))))
}

/// Usable stock per SKU and bin
#[utoipa::path(
    get,
    path = "/api/v1/inventory/stock/detailed",
    responses(
        (status = 200, description = "Detailed stock rows returned", body = Vec<crate::stock::DetailedStockRow>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn detailed_stock(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state.services.inventory.detailed_stock().await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(rows))))
}
