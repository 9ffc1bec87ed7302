//! Organization HTTP handlers.
//!
//! ```text
//! POST /api/v1/organizations {"name":"Acme","description":"Rockets"}
//! PUT /api/v1/organizations {"orgId":"...","name":"Acme Corp"}
//! GET /api/v1/organizations
//! POST /api/v1/queued/organizations {"name":"Acme"}
//! PUT /api/v1/queued/organizations {"orgId":"...","description":"Anvils"}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Organization;
use crate::domain::ports::{CreateOrganizationRequest, UpdateOrganizationRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, OrganizationSchema};
use crate::inbound::http::state::HttpState;

/// Request body for creating an organization.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationBody {
    #[schema(example = "Acme")]
    pub name: Option<String>,
    pub description: Option<String>,
}

impl From<CreateOrganizationBody> for CreateOrganizationRequest {
    fn from(body: CreateOrganizationBody) -> Self {
        Self {
            name: body.name,
            description: body.description,
        }
    }
}

/// Request body for updating an organization. Omitted fields keep their
/// stored value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationBody {
    pub org_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl From<UpdateOrganizationBody> for UpdateOrganizationRequest {
    fn from(body: UpdateOrganizationBody) -> Self {
        Self {
            org_id: body.org_id,
            name: body.name,
            description: body.description,
        }
    }
}

/// Acknowledgement returned by the queued organization routes.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationQueuedBody {
    #[schema(example = "Organization queued")]
    pub message: String,
    pub org_id: String,
}

fn queued(message: &str, org_id: String) -> HttpResponse {
    HttpResponse::Accepted().json(OrganizationQueuedBody {
        message: message.to_owned(),
        org_id,
    })
}

/// Create an organization and store it immediately.
#[utoipa::path(
    post,
    path = "/api/v1/organizations",
    request_body = CreateOrganizationBody,
    responses(
        (status = 201, description = "Organization created", body = OrganizationSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Name already in use", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["organizations"],
    operation_id = "createOrganization"
)]
#[post("/organizations")]
pub async fn create_organization(
    state: web::Data<HttpState>,
    payload: web::Json<CreateOrganizationBody>,
) -> ApiResult<HttpResponse> {
    let org = state
        .direct
        .create_organization(payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(org))
}

/// Update an organization and store it immediately.
#[utoipa::path(
    put,
    path = "/api/v1/organizations",
    request_body = UpdateOrganizationBody,
    responses(
        (status = 200, description = "Organization updated", body = OrganizationSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Organization not found", body = ErrorSchema),
        (status = 409, description = "Name already in use", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["organizations"],
    operation_id = "updateOrganization"
)]
#[put("/organizations")]
pub async fn update_organization(
    state: web::Data<HttpState>,
    payload: web::Json<UpdateOrganizationBody>,
) -> ApiResult<web::Json<Organization>> {
    let org = state
        .direct
        .update_organization(payload.into_inner().into())
        .await?;
    Ok(web::Json(org))
}

/// List every organization in the store.
#[utoipa::path(
    get,
    path = "/api/v1/organizations",
    responses(
        (status = 200, description = "Organizations", body = [OrganizationSchema]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["organizations"],
    operation_id = "listOrganizations"
)]
#[get("/organizations")]
pub async fn list_organizations(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<Organization>>> {
    Ok(web::Json(state.query.list_organizations().await?))
}

/// Validate an organization and queue its creation.
///
/// The returned `orgId` is final; the record becomes visible once a consumer
/// applies the command.
#[utoipa::path(
    post,
    path = "/api/v1/queued/organizations",
    request_body = CreateOrganizationBody,
    responses(
        (status = 202, description = "Creation queued", body = OrganizationQueuedBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Name already in use", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["organizations"],
    operation_id = "queueCreateOrganization"
)]
#[post("/queued/organizations")]
pub async fn queue_create_organization(
    state: web::Data<HttpState>,
    payload: web::Json<CreateOrganizationBody>,
) -> ApiResult<HttpResponse> {
    let accepted = state
        .queued
        .create_organization(payload.into_inner().into())
        .await?;
    Ok(queued("Organization queued", accepted.org_id.into()))
}

/// Validate an organization change and queue it.
#[utoipa::path(
    put,
    path = "/api/v1/queued/organizations",
    request_body = UpdateOrganizationBody,
    responses(
        (status = 202, description = "Update queued", body = OrganizationQueuedBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Organization not found", body = ErrorSchema),
        (status = 409, description = "Name already in use", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["organizations"],
    operation_id = "queueUpdateOrganization"
)]
#[put("/queued/organizations")]
pub async fn queue_update_organization(
    state: web::Data<HttpState>,
    payload: web::Json<UpdateOrganizationBody>,
) -> ApiResult<HttpResponse> {
    let accepted = state
        .queued
        .update_organization(payload.into_inner().into())
        .await?;
    Ok(queued("Organization update queued", accepted.org_id.into()))
}

#[cfg(test)]
#[path = "organizations_tests.rs"]
mod tests;
