use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SwapTrack API",
        version = "0.3.0",
        description = r#"
# SwapTrack Depot API

Tracks part swap requests through a repair depot and keeps the spare-part
ledger that backs them.

## Features

- **Swap Lifecycle**: PENDING_DISPATCH -> PENDING_RECEIPT -> COMPLETED, with
  cancel and reopen paths
- **Append-Only Ledger**: every stock movement is a new entry; corrections
  are compensating entries, never edits
- **Derived Stock Views**: category summary and per-bin detail recomputed
  from the full ledger on every read
- **Dashboard**: queue counts, stock summary and average cycle time

## Acting User

Mutating endpoints read the `X-Acting-User` header and record that name in
ledger notes. Requests without the header are attributed to `system`.

## Error Handling

Errors use a consistent JSON shape with appropriate HTTP status codes:

```json
{
  "error": "Not Found",
  "message": "Swap request 4cf0... not found",
  "timestamp": "2024-03-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "swaps", description = "Swap request lifecycle endpoints"),
        (name = "inventory", description = "Ledger and stock view endpoints"),
        (name = "dashboard", description = "Rollup metrics endpoints")
    ),
    paths(
        // Swaps
        crate::handlers::swaps::list_swaps,
        crate::handlers::swaps::create_swap,
        crate::handlers::swaps::list_completed_swaps,
        crate::handlers::swaps::get_swap,
        crate::handlers::swaps::update_swap,
        crate::handlers::swaps::cancel_swap,
        crate::handlers::swaps::dispatch_swap,
        crate::handlers::swaps::correct_dispatch,
        crate::handlers::swaps::receive_swap,
        crate::handlers::swaps::flag_dispatch_doa,
        crate::handlers::swaps::clear_dispatch_doa,
        crate::handlers::swaps::reopen_swap,

        // Inventory
        crate::handlers::inventory::create_adjustment,
        crate::handlers::inventory::recent_log,
        crate::handlers::inventory::list_skus,
        crate::handlers::inventory::known_categories,
        crate::handlers::inventory::stock_summary,
        crate::handlers::inventory::detailed_stock,

        // Dashboard
        crate::handlers::dashboard::get_dashboard,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,

            // Swap types
            crate::handlers::swaps::SwapResponse,
            crate::handlers::swaps::CompletedSwapsResponse,
            crate::handlers::swaps::CreateSwapRequest,
            crate::handlers::swaps::UpdateSwapRequest,
            crate::handlers::swaps::DispatchRequest,
            crate::handlers::swaps::ReceiveRequest,
            crate::handlers::swaps::ReopenRequest,
            crate::services::swaps::ReopenReason,
            crate::entities::swap_request::SwapStatus,
            crate::entities::swap_request::DoaFlag,

            // Inventory types
            crate::handlers::inventory::CreateAdjustmentRequest,
            crate::handlers::inventory::LogEntryResponse,
            crate::entities::inventory_log::LogType,
            crate::stock::DetailedStockRow,

            // Dashboard types
            crate::services::dashboard::DashboardMetrics,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_covers_the_api() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("SwapTrack API"));
        assert!(json.contains("/api/v1/swaps"));
        assert!(json.contains("/api/v1/swaps/{id}/reopen"));
        assert!(json.contains("/api/v1/inventory/stock/summary"));
        assert!(json.contains("/api/v1/dashboard"));
    }
}
