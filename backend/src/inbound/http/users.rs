//! Account handlers.
//!
//! `/users/me` must be registered ahead of `/users/{id}` so the literal
//! segment wins.

use actix_web::{delete, get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::UserUpdate;
use crate::domain::{Error, UserId, UserRole};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::Authenticated;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::schemas::{MessageResponse, UserResponse};
use crate::inbound::http::state::HttpState;

/// Partial profile update. `role` is honoured for administrators only.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[schema(value_type = Option<UserRole>)]
    pub role: Option<String>,
}

impl TryFrom<UpdateUserRequest> for UserUpdate {
    type Error = Error;

    fn try_from(request: UpdateUserRequest) -> Result<Self, Self::Error> {
        let role = request
            .role
            .map(|raw| raw.trim().to_ascii_lowercase().parse::<UserRole>())
            .transpose()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        Ok(Self {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            role,
        })
    }
}

fn user_id(raw: &str) -> Result<UserId, Error> {
    UserId::parse(raw).map_err(|err| Error::invalid_request(err.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 403, description = "Administrators only", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security(("bearer" = []))
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state.users.list_users(caller.principal()).await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Caller's profile", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "currentUser",
    security(("bearer" = []))
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<UserResponse>> {
    let principal = caller.principal();
    let user = state.users.get_user(principal, principal.user_id()).await?;
    Ok(web::Json(UserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid profile", body = ErrorBody),
        (status = 403, description = "Role changes need an administrator", body = ErrorBody),
        (status = 409, description = "Email already taken", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser",
    security(("bearer" = []))
)]
#[put("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let update = UserUpdate::try_from(payload.into_inner())?;
    let user = state
        .accounts
        .update_own_profile(caller.principal(), update)
        .await?;
    Ok(web::Json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 403, description = "Not the caller's profile", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security(("bearer" = []))
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = user_id(&path)?;
    let user = state.users.get_user(caller.principal(), &id).await?;
    Ok(web::Json(UserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 403, description = "Administrators only", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 409, description = "Email already taken", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "updateUser",
    security(("bearer" = []))
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = user_id(&path)?;
    let update = UserUpdate::try_from(payload.into_inner())?;
    let user = state
        .accounts
        .update_user(caller.principal(), &id, update)
        .await?;
    Ok(web::Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User and their orders deleted", body = MessageResponse),
        (status = 400, description = "Administrators cannot delete themselves", body = ErrorBody),
        (status = 403, description = "Administrators only", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "deleteUser",
    security(("bearer" = []))
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = user_id(&path)?;
    state.accounts.delete_user(caller.principal(), &id).await?;
    Ok(web::Json(MessageResponse::new("User deleted successfully")))
}
