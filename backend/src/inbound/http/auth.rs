//! Login and registration handlers.
//!
//! ```text
//! POST /api/v1/auth/login    {"email":"ada@example.com","password":"..."}
//! POST /api/v1/auth/register {"email":..,"password":..,"firstName":..,"lastName":..}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    AuthSession, Error, LoginCredentials, LoginValidationError, Registration,
    RegistrationValidationError, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::schemas::UserResponse;
use crate::inbound::http::state::HttpState;

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    /// At least eight characters.
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub user: UserResponse,
    pub access_token: String,
}

/// Envelope returned by the auth endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub data: SessionData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AuthResponse {
    fn new(session: AuthSession, message: Option<&str>) -> Self {
        Self {
            success: true,
            data: SessionData {
                user: UserResponse::from(session.user),
                access_token: session.access_token.into_inner(),
            },
            message: message.map(str::to_owned),
        }
    }
}

fn field_error(message: impl Into<String>, field: &str, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyEmail => field_error(err.to_string(), "email", "empty_email"),
        LoginValidationError::EmptyPassword => {
            field_error(err.to_string(), "password", "empty_password")
        }
    }
}

fn map_registration_error(err: RegistrationValidationError) -> Error {
    let (field, code) = match &err {
        RegistrationValidationError::PasswordTooShort { .. } => ("password", "password_too_short"),
        RegistrationValidationError::PasswordTooLong { .. } => ("password", "password_too_long"),
        RegistrationValidationError::User(user) => match user {
            UserValidationError::EmptyFirstName => ("firstName", "empty_first_name"),
            UserValidationError::EmptyLastName => ("lastName", "empty_last_name"),
            UserValidationError::NameTooLong { .. } => ("name", "name_too_long"),
            _ => ("email", "invalid_email"),
        },
    };
    field_error(err.to_string(), field, code)
}

/// Exchange credentials for a bearer token.
///
/// Unknown emails and wrong passwords get the same `401` body.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(map_login_validation_error)?;
    let session = state.login.login(&credentials).await?;
    Ok(web::Json(AuthResponse::new(session, None)))
}

/// Create a customer account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let registration = Registration::try_from_parts(
        &request.email,
        &request.password,
        &request.first_name,
        &request.last_name,
    )
    .map_err(map_registration_error)?;
    let session = state.registration.register(&registration).await?;
    Ok(HttpResponse::Created().json(AuthResponse::new(session, Some("Registration successful"))))
}
