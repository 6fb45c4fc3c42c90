use crate::entities::swap_request::{self, DoaFlag, SwapStatus};
use crate::errors::ServiceError;
use crate::handlers::common::acting_user;
use crate::handlers::AppState;
use crate::services::dashboard::average_days_to_complete;
use crate::services::swaps::{
    DispatchDetails, NewSwapRequest, ReceiptDetails, ReopenReason, SwapRequestEdit,
};
use crate::ApiResponse;
use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSwapRequest {
    #[validate(length(min = 1, message = "ticket is required"))]
    pub ticket: String,
    #[validate(length(min = 1, message = "part abbreviation is required"))]
    pub part_abbreviation: String,
    #[validate(length(min = 1, message = "serial number is required"))]
    pub serial_num: String,
    pub oem_claim_num: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSwapRequest {
    pub ticket: Option<String>,
    pub part_abbreviation: Option<String>,
    pub serial_num: Option<String>,
    pub oem_claim_num: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DispatchRequest {
    #[validate(length(min = 1, message = "stock SKU is required"))]
    pub stock_part_used_sku: String,
    #[validate(length(min = 1, message = "stock bin is required"))]
    pub stock_bin: String,
    #[serde(default)]
    pub dispatch_doa: bool,
    pub inven_adjust: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReceiveRequest {
    #[validate(length(min = 1, message = "received part SKU is required"))]
    pub received_part_sku: String,
    #[validate(length(min = 1, message = "PPID is required"))]
    pub received_ppid: String,
    #[validate(range(min = 1, message = "received quantity must be at least 1"))]
    pub received_qty: i32,
    #[validate(length(min = 1, message = "received bin is required"))]
    pub received_bin: String,
    #[serde(default)]
    pub received_doa: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReopenRequest {
    #[serde(default = "default_reopen_reason")]
    pub reason: ReopenReason,
}

fn default_reopen_reason() -> ReopenReason {
    ReopenReason::Standard
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SwapListQuery {
    /// Restrict the listing to one lifecycle status
    pub status: Option<SwapStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SwapResponse {
    pub id: Uuid,
    pub ticket: String,
    pub part_abbreviation: String,
    pub serial_num: String,
    pub oem_claim_num: Option<String>,
    pub date_requested: DateTime<Utc>,
    pub status: SwapStatus,
    pub stock_part_used_sku: Option<String>,
    pub stock_bin: Option<String>,
    pub dispatch_doa: DoaFlag,
    pub inven_adjust: Option<String>,
    pub date_dispatched: Option<DateTime<Utc>>,
    pub received_part_sku: Option<String>,
    pub received_ppid: Option<String>,
    pub received_qty: Option<i32>,
    pub received_bin: Option<String>,
    pub received_doa: DoaFlag,
    pub date_replenished: Option<DateTime<Utc>>,
    /// Whole days from dispatch to receipt, once both have happened
    pub days_to_complete: Option<i64>,
    pub version: i32,
}

impl From<swap_request::Model> for SwapResponse {
    fn from(swap: swap_request::Model) -> Self {
        let days_to_complete = swap.days_to_complete();
        Self {
            id: swap.id,
            ticket: swap.ticket,
            part_abbreviation: swap.part_abbreviation,
            serial_num: swap.serial_num,
            oem_claim_num: swap.oem_claim_num,
            date_requested: swap.date_requested,
            status: swap.status,
            stock_part_used_sku: swap.stock_part_used_sku,
            stock_bin: swap.stock_bin,
            dispatch_doa: swap.dispatch_doa,
            inven_adjust: swap.inven_adjust,
            date_dispatched: swap.date_dispatched,
            received_part_sku: swap.received_part_sku,
            received_ppid: swap.received_ppid,
            received_qty: swap.received_qty,
            received_bin: swap.received_bin,
            received_doa: swap.received_doa,
            date_replenished: swap.date_replenished,
            days_to_complete,
            version: swap.version,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompletedSwapsResponse {
    pub swaps: Vec<SwapResponse>,
    /// Mean whole-day cycle time, or "N/A" when nothing has completed
    pub avg_days_to_complete: String,
}

/// Create the swaps router
pub fn swap_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_swaps).post(create_swap))
        .route("/completed", get(list_completed_swaps))
        .route(
            "/:id",
            get(get_swap).put(update_swap).delete(cancel_swap),
        )
        .route("/:id/dispatch", post(dispatch_swap).put(correct_dispatch))
        .route("/:id/receive", post(receive_swap))
        .route("/:id/flag-doa", post(flag_dispatch_doa))
        .route("/:id/unflag-doa", post(clear_dispatch_doa))
        .route("/:id/reopen", post(reopen_swap))
}

/// List swap requests, the active queue by default
#[utoipa::path(
    get,
    path = "/api/v1/swaps",
    params(SwapListQuery),
    responses(
        (status = 200, description = "Swap requests returned"),
        (status = 400, description = "Invalid status filter", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "swaps"
)]
pub async fn list_swaps(
    State(state): State<AppState>,
    Query(query): Query<SwapListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let swaps = state.services.swaps.list_swaps(query.status).await?;
    let swaps: Vec<SwapResponse> = swaps.into_iter().map(SwapResponse::from).collect();
    Ok((StatusCode::OK, Json(ApiResponse::success(swaps))))
}

/// Submit a new swap request
#[utoipa::path(
    post,
    path = "/api/v1/swaps",
    request_body = CreateSwapRequest,
    responses(
        (status = 201, description = "Swap request created", body = SwapResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "swaps"
)]
pub async fn create_swap(
    State(state): State<AppState>,
    Json(payload): Json<CreateSwapRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let swap = state
        .services
        .swaps
        .create_swap(NewSwapRequest {
            ticket: payload.ticket,
            part_abbreviation: payload.part_abbreviation,
            serial_num: payload.serial_num,
            oem_claim_num: payload.oem_claim_num,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(SwapResponse::from(swap))),
    ))
}

/// List completed swaps with the average cycle time
#[utoipa::path(
    get,
    path = "/api/v1/swaps/completed",
    responses(
        (status = 200, description = "Completed swaps returned", body = CompletedSwapsResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "swaps"
)]
pub async fn list_completed_swaps(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let completed = state.services.swaps.list_completed().await?;
    let avg_days_to_complete = average_days_to_complete(&completed);
    let swaps: Vec<SwapResponse> = completed.into_iter().map(SwapResponse::from).collect();
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(CompletedSwapsResponse {
            swaps,
            avg_days_to_complete,
        })),
    ))
}

/// Get one swap request
#[utoipa::path(
    get,
    path = "/api/v1/swaps/{id}",
    params(("id" = Uuid, Path, description = "Swap request id")),
    responses(
        (status = 200, description = "Swap request returned", body = SwapResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "swaps"
)]
pub async fn get_swap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let swap = state.services.swaps.get_swap(id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(SwapResponse::from(swap))),
    ))
}

/// Edit the request-stage fields of an active swap
#[utoipa::path(
    put,
    path = "/api/v1/swaps/{id}",
    params(("id" = Uuid, Path, description = "Swap request id")),
    request_body = UpdateSwapRequest,
    responses(
        (status = 200, description = "Swap request updated", body = SwapResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "swaps"
)]
pub async fn update_swap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSwapRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let swap = state
        .services
        .swaps
        .update_request(
            id,
            SwapRequestEdit {
                ticket: payload.ticket,
                part_abbreviation: payload.part_abbreviation,
                serial_num: payload.serial_num,
                oem_claim_num: payload.oem_claim_num,
            },
        )
        .await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(SwapResponse::from(swap))),
    ))
}

/// Cancel an active swap request
#[utoipa::path(
    delete,
    path = "/api/v1/swaps/{id}",
    params(("id" = Uuid, Path, description = "Swap request id")),
    responses(
        (status = 200, description = "Swap request cancelled"),
        (status = 400, description = "Swap already completed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "swaps"
)]
pub async fn cancel_swap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ServiceError> {
    let actor = acting_user(&headers);
    state.services.swaps.cancel_swap(id, &actor).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(json!({
            "message": format!("Swap request {} has been cancelled", id),
            "deleted_id": id
        }))),
    ))
}

/// Dispatch a replacement part from stock
#[utoipa::path(
    post,
    path = "/api/v1/swaps/{id}/dispatch",
    params(("id" = Uuid, Path, description = "Swap request id")),
    request_body = DispatchRequest,
    responses(
        (status = 200, description = "Replacement dispatched", body = SwapResponse),
        (status = 400, description = "Invalid request or wrong state", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "swaps"
)]
pub async fn dispatch_swap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<DispatchRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let actor = acting_user(&headers);
    let swap = state
        .services
        .swaps
        .dispatch_swap(
            id,
            DispatchDetails {
                stock_part_used_sku: payload.stock_part_used_sku,
                stock_bin: payload.stock_bin,
                dispatch_doa: payload.dispatch_doa,
                inven_adjust: payload.inven_adjust,
            },
            &actor,
        )
        .await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(SwapResponse::from(swap))),
    ))
}

/// Correct the dispatch details of a swap awaiting receipt
#[utoipa::path(
    put,
    path = "/api/v1/swaps/{id}/dispatch",
    params(("id" = Uuid, Path, description = "Swap request id")),
    request_body = DispatchRequest,
    responses(
        (status = 200, description = "Dispatch details corrected", body = SwapResponse),
        (status = 400, description = "Invalid request or wrong state", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "swaps"
)]
pub async fn correct_dispatch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<DispatchRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let actor = acting_user(&headers);
    let swap = state
        .services
        .swaps
        .correct_dispatch(
            id,
            DispatchDetails {
                stock_part_used_sku: payload.stock_part_used_sku,
                stock_bin: payload.stock_bin,
                dispatch_doa: payload.dispatch_doa,
                inven_adjust: payload.inven_adjust,
            },
            &actor,
        )
        .await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(SwapResponse::from(swap))),
    ))
}

/// Receive the failed part back and complete the swap
#[utoipa::path(
    post,
    path = "/api/v1/swaps/{id}/receive",
    params(("id" = Uuid, Path, description = "Swap request id")),
    request_body = ReceiveRequest,
    responses(
        (status = 200, description = "Failed part received", body = SwapResponse),
        (status = 400, description = "Invalid request or wrong state", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "swaps"
)]
pub async fn receive_swap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<ReceiveRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let actor = acting_user(&headers);
    let swap = state
        .services
        .swaps
        .receive_swap(
            id,
            ReceiptDetails {
                received_part_sku: payload.received_part_sku,
                received_ppid: payload.received_ppid,
                received_qty: payload.received_qty,
                received_bin: payload.received_bin,
                received_doa: payload.received_doa,
            },
            &actor,
        )
        .await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(SwapResponse::from(swap))),
    ))
}

/// Flag the dispatched part DOA, returning it to stock
#[utoipa::path(
    post,
    path = "/api/v1/swaps/{id}/flag-doa",
    params(("id" = Uuid, Path, description = "Swap request id")),
    responses(
        (status = 200, description = "Dispatch flagged DOA", body = SwapResponse),
        (status = 400, description = "Already flagged or nothing dispatched", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "swaps"
)]
pub async fn flag_dispatch_doa(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ServiceError> {
    let actor = acting_user(&headers);
    let swap = state.services.swaps.flag_dispatch_doa(id, &actor).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(SwapResponse::from(swap))),
    ))
}

/// Clear a DOA flag set in error, deducting the part again
#[utoipa::path(
    post,
    path = "/api/v1/swaps/{id}/unflag-doa",
    params(("id" = Uuid, Path, description = "Swap request id")),
    responses(
        (status = 200, description = "DOA flag cleared", body = SwapResponse),
        (status = 400, description = "Dispatch is not flagged DOA", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "swaps"
)]
pub async fn clear_dispatch_doa(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ServiceError> {
    let actor = acting_user(&headers);
    let swap = state.services.swaps.clear_dispatch_doa(id, &actor).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(SwapResponse::from(swap))),
    ))
}

/// Reopen a completed swap
#[utoipa::path(
    post,
    path = "/api/v1/swaps/{id}/reopen",
    params(("id" = Uuid, Path, description = "Swap request id")),
    request_body(content = ReopenRequest, description = "Omit the body for a standard reopen"),
    responses(
        (status = 200, description = "Swap reopened", body = SwapResponse),
        (status = 400, description = "Swap is not completed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "swaps"
)]
pub async fn reopen_swap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    payload: Option<Json<ReopenRequest>>,
) -> Result<impl IntoResponse, ServiceError> {
    let actor = acting_user(&headers);
    let reason = payload
        .map(|Json(p)| p.reason)
        .unwrap_or(ReopenReason::Standard);
    let swap = state.services.swaps.reopen_swap(id, reason, &actor).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(SwapResponse::from(swap))),
    ))
}
