//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: the organization and user endpoints (synchronous and queued)
//!   plus the health probes
//! - **Schemas**: domain type wrappers ([`ErrorSchema`], [`ErrorCodeSchema`],
//!   [`OrganizationSchema`], [`UserSchema`]) that provide OpenAPI definitions
//!   without coupling domain types to the utoipa framework
//!
//! The generated document is exported via
//! `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::health::{Probe, ProbeBody};
use crate::inbound::http::organizations::{
    CreateOrganizationBody, OrganizationQueuedBody, UpdateOrganizationBody,
};
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, OrganizationSchema, UserSchema,
};
use crate::inbound::http::users::{CreateUserBody, UpdateUserBody, UserQueuedBody};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Roster API",
        description = "Organizations and users, written directly or through the command queue."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::organizations::create_organization,
        crate::inbound::http::organizations::update_organization,
        crate::inbound::http::organizations::list_organizations,
        crate::inbound::http::organizations::queue_create_organization,
        crate::inbound::http::organizations::queue_update_organization,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::list_organization_users,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::queue_create_user,
        crate::inbound::http::users::queue_update_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        OrganizationSchema,
        UserSchema,
        ErrorSchema,
        ErrorCodeSchema,
        CreateOrganizationBody,
        UpdateOrganizationBody,
        OrganizationQueuedBody,
        CreateUserBody,
        UpdateUserBody,
        UserQueuedBody,
        Probe,
        ProbeBody,
    )),
    tags(
        (name = "organizations", description = "Organization records"),
        (name = "users", description = "User records, always scoped by organization"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
