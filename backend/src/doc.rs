//! OpenAPI documentation for the storefront REST API.
//!
//! [`ApiDoc`] registers every handler under `inbound::http`, the request and
//! response schemas they reference, and the bearer token security scheme.
//! The document is served by Swagger UI at `/docs` and printed by the
//! `openapi-dump` binary.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, OrderStatus, UserRole};
use crate::inbound::http::auth::{AuthResponse, LoginRequest, RegisterRequest, SessionData};
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::health::ProbeResponse;
use crate::inbound::http::orders::{OrderLinePayload, PlaceOrderPayload, UpdateOrderPayload};
use crate::inbound::http::products::{CreateProductRequest, UpdateProductRequest};
use crate::inbound::http::schemas::{
    MessageResponse, OrderItemResponse, OrderResponse, ProductResponse, ShippingAddressResponse,
    UserResponse,
};
use crate::inbound::http::users::UpdateUserRequest;

/// Name of the security scheme referenced by authenticated operations.
pub const BEARER_SCHEME: &str = "bearer";

struct BearerAddon;

impl Modify for BearerAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token from POST /api/v1/auth/login or /api/v1/auth/register.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&BearerAddon),
    info(
        title = "Storefront API",
        description = "Catalogue, ordering and account management for the storefront."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::register,
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::get_product,
        crate::inbound::http::products::create_product,
        crate::inbound::http::products::update_product,
        crate::inbound::http::products::delete_product,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::place_order,
        crate::inbound::http::orders::update_order,
        crate::inbound::http::orders::delete_order,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        ErrorBody,
        LoginRequest,
        RegisterRequest,
        SessionData,
        AuthResponse,
        ProductResponse,
        CreateProductRequest,
        UpdateProductRequest,
        OrderStatus,
        OrderLinePayload,
        PlaceOrderPayload,
        UpdateOrderPayload,
        OrderItemResponse,
        ShippingAddressResponse,
        OrderResponse,
        UserRole,
        UserResponse,
        UpdateUserRequest,
        MessageResponse,
        ProbeResponse,
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "products", description = "Product catalogue"),
        (name = "orders", description = "Order placement and lifecycle"),
        (name = "users", description = "Account management"),
        (name = "health", description = "Readiness and liveness probes")
    )
)]
pub struct ApiDoc;
