//! User HTTP handlers.
//!
//! ```text
//! POST /api/v1/organizations/{orgId}/users {"name":"Ada","email":"ada@example.com"}
//! PUT /api/v1/organizations/{orgId}/users {"userId":"...","name":"Ada L."}
//! GET /api/v1/organizations/{orgId}/users
//! GET /api/v1/users
//! POST /api/v1/queued/organizations/{orgId}/users
//! PUT /api/v1/queued/organizations/{orgId}/users
//! ```
//!
//! The owning organization always comes from the path.

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::User;
use crate::domain::ports::{CreateUserRequest, UpdateUserRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::state::HttpState;

/// Request body for creating a user.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
}

impl CreateUserBody {
    fn into_request(self, org_id: String) -> CreateUserRequest {
        CreateUserRequest {
            org_id,
            name: self.name,
            email: self.email,
        }
    }
}

/// Request body for updating a user. Omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserBody {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UpdateUserBody {
    fn into_request(self, org_id: String) -> UpdateUserRequest {
        UpdateUserRequest {
            org_id,
            user_id: self.user_id,
            name: self.name,
            email: self.email,
        }
    }
}

/// Acknowledgement returned by the queued user routes.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserQueuedBody {
    #[schema(example = "User queued")]
    pub message: String,
    pub user_id: String,
}

fn queued(message: &str, user_id: String) -> HttpResponse {
    HttpResponse::Accepted().json(UserQueuedBody {
        message: message.to_owned(),
        user_id,
    })
}

/// Create a user inside an organization and store it immediately.
#[utoipa::path(
    post,
    path = "/api/v1/organizations/{orgId}/users",
    params(("orgId" = String, Path, description = "Owning organization")),
    request_body = CreateUserBody,
    responses(
        (status = 201, description = "User created", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Organization not found", body = ErrorSchema),
        (status = 409, description = "Email already in use", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/organizations/{orgId}/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<CreateUserBody>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner().into_request(path.into_inner());
    let user = state.direct.create_user(request).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Update a user and store it immediately.
///
/// A path organization other than the user's owner is a conflict.
#[utoipa::path(
    put,
    path = "/api/v1/organizations/{orgId}/users",
    params(("orgId" = String, Path, description = "Owning organization")),
    request_body = UpdateUserBody,
    responses(
        (status = 200, description = "User updated", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 409, description = "Email in use or organization mismatch", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/organizations/{orgId}/users")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateUserBody>,
) -> ApiResult<web::Json<User>> {
    let request = payload.into_inner().into_request(path.into_inner());
    Ok(web::Json(state.direct.update_user(request).await?))
}

/// List the users of one organization.
#[utoipa::path(
    get,
    path = "/api/v1/organizations/{orgId}/users",
    params(("orgId" = String, Path, description = "Owning organization")),
    responses(
        (status = 200, description = "Users of the organization", body = [UserSchema]),
        (status = 404, description = "Organization not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listOrganizationUsers"
)]
#[get("/organizations/{orgId}/users")]
pub async fn list_organization_users(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.query.list_organization_users(path.as_str()).await?;
    Ok(web::Json(users))
}

/// List every user in the store.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [UserSchema]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<User>>> {
    Ok(web::Json(state.query.list_users().await?))
}

/// Validate a user and queue its creation.
#[utoipa::path(
    post,
    path = "/api/v1/queued/organizations/{orgId}/users",
    params(("orgId" = String, Path, description = "Owning organization")),
    request_body = CreateUserBody,
    responses(
        (status = 202, description = "Creation queued", body = UserQueuedBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Organization not found", body = ErrorSchema),
        (status = 409, description = "Email already in use", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "queueCreateUser"
)]
#[post("/queued/organizations/{orgId}/users")]
pub async fn queue_create_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<CreateUserBody>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner().into_request(path.into_inner());
    let accepted = state.queued.create_user(request).await?;
    Ok(queued("User queued", accepted.user_id.into()))
}

/// Validate a user change and queue it.
#[utoipa::path(
    put,
    path = "/api/v1/queued/organizations/{orgId}/users",
    params(("orgId" = String, Path, description = "Owning organization")),
    request_body = UpdateUserBody,
    responses(
        (status = 202, description = "Update queued", body = UserQueuedBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 409, description = "Email in use or organization mismatch", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "queueUpdateUser"
)]
#[put("/queued/organizations/{orgId}/users")]
pub async fn queue_update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateUserBody>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner().into_request(path.into_inner());
    let accepted = state.queued.update_user(request).await?;
    Ok(queued("User update queued", accepted.user_id.into()))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
