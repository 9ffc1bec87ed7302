//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the structure of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The referenced organization or user does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The change would reuse a name or email, or move a user between
    /// organizations.
    #[schema(rename = "conflict")]
    Conflict,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "name is required")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Organization`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Organization, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct OrganizationSchema {
    /// Stable organization identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    org_id: String,
    /// Organization name, unique across the directory.
    #[schema(example = "Acme")]
    name: String,
    /// Free-form description; omitted when absent.
    #[schema(example = "Rocket skates and anvils")]
    description: Option<String>,
}

/// OpenAPI schema for [`crate::domain::User`].
///
/// A user belongs to exactly one organization for life.
#[derive(ToSchema)]
#[schema(as = crate::domain::User, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    /// Stable user identifier.
    #[schema(example = "9b2d4c1e-0c7a-4d55-8f3e-2f6b9d1a7c44")]
    user_id: String,
    /// Owning organization identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    org_id: String,
    #[schema(example = "Ada Lovelace")]
    name: String,
    /// Email address, unique across the directory.
    #[schema(example = "ada@example.com")]
    email: String,
}
