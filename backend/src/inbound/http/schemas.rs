//! Shared OpenAPI schema types for HTTP responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error payload shape documented for every failure response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    pub code: String,
    /// Human-readable description of the failure.
    #[schema(example = "recipe was already added")]
    pub message: String,
    /// Optional structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
