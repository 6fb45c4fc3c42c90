use prometheus::{Encoder, TextEncoder};

use crate::errors::ServiceError;

/// Renders every registered counter in the Prometheus text format.
pub async fn render() -> Result<String, ServiceError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ServiceError::InternalError(format!("failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| ServiceError::InternalError(format!("metrics were not valid UTF-8: {}", e)))
}
