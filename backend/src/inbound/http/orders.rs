//! Order handlers. Every route needs a bearer token; customers only see and
//! touch their own orders.

use actix_web::{HttpResponse, delete, get, post, put, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{OrderLineRequest, OrderUpdate, PlaceOrderRequest};
use crate::domain::{Error, OrderId, OrderStatus, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::Authenticated;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::schemas::{MessageResponse, OrderResponse};
use crate::inbound::http::state::HttpState;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLinePayload {
    pub product_id: Uuid,
    pub quantity: i64,
    /// Overrides the catalogue price when present.
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderPayload {
    #[serde(default)]
    pub items: Vec<OrderLinePayload>,
    /// `"street, city, state, zip, country"`.
    #[serde(default)]
    #[schema(example = "1 Main St, Springfield, IL, 62701, US")]
    pub shipping_address: String,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderPayload {
    #[schema(value_type = Option<OrderStatus>)]
    pub status: Option<String>,
    pub shipping_address: Option<String>,
}

impl From<PlaceOrderPayload> for PlaceOrderRequest {
    fn from(payload: PlaceOrderPayload) -> Self {
        Self {
            shipping_address: payload.shipping_address,
            notes: payload.notes,
            items: payload
                .items
                .into_iter()
                .map(|line| OrderLineRequest {
                    product_id: ProductId::from_uuid(line.product_id),
                    quantity: line.quantity,
                    price: line.price,
                })
                .collect(),
        }
    }
}

impl TryFrom<UpdateOrderPayload> for OrderUpdate {
    type Error = Error;

    fn try_from(payload: UpdateOrderPayload) -> Result<Self, Self::Error> {
        let status = payload
            .status
            .map(|raw| raw.trim().to_ascii_lowercase().parse::<OrderStatus>())
            .transpose()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        Ok(Self {
            status,
            shipping_address: payload.shipping_address,
        })
    }
}

fn order_id(raw: &str) -> Result<OrderId, Error> {
    OrderId::parse(raw).map_err(|err| Error::invalid_request(err.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "Caller's orders, or all orders for administrators", body = [OrderResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    tags = ["orders"],
    operation_id = "listOrders",
    security(("bearer" = []))
)]
#[get("/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<OrderResponse>>> {
    let orders = state.orders.list_orders(caller.principal()).await?;
    Ok(web::Json(orders.into_iter().map(OrderResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 403, description = "Not the caller's order", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody)
    ),
    tags = ["orders"],
    operation_id = "getOrder",
    security(("bearer" = []))
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderResponse>> {
    let id = order_id(&path)?;
    let order = state.orders.get_order(caller.principal(), &id).await?;
    Ok(web::Json(OrderResponse::from(order)))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = PlaceOrderPayload,
    responses(
        (status = 201, description = "Order placed and stock reserved", body = OrderResponse),
        (status = 400, description = "Invalid order or insufficient stock", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "Unknown product", body = ErrorBody)
    ),
    tags = ["orders"],
    operation_id = "placeOrder",
    security(("bearer" = []))
)]
#[post("/orders")]
pub async fn place_order(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<PlaceOrderPayload>,
) -> ApiResult<HttpResponse> {
    let order = state
        .order_commands
        .place_order(caller.principal(), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    request_body = UpdateOrderPayload,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Invalid change", body = ErrorBody),
        (status = 403, description = "Not permitted", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody)
    ),
    tags = ["orders"],
    operation_id = "updateOrder",
    security(("bearer" = []))
)]
#[put("/orders/{id}")]
pub async fn update_order(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<UpdateOrderPayload>,
) -> ApiResult<web::Json<OrderResponse>> {
    let id = order_id(&path)?;
    let update = OrderUpdate::try_from(payload.into_inner())?;
    let order = state
        .order_commands
        .update_order(caller.principal(), &id, update)
        .await?;
    Ok(web::Json(OrderResponse::from(order)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deleted", body = MessageResponse),
        (status = 403, description = "Not the caller's order", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody)
    ),
    tags = ["orders"],
    operation_id = "deleteOrder",
    security(("bearer" = []))
)]
#[delete("/orders/{id}")]
pub async fn delete_order(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = order_id(&path)?;
    state
        .order_commands
        .delete_order(caller.principal(), &id)
        .await?;
    Ok(web::Json(MessageResponse::new("Order deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{TestApp, read_json};
    use crate::test_support::ADDRESS;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn bearer(token: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {token}"))
    }

    #[rstest]
    #[case::lowercase("shipped", OrderStatus::Shipped)]
    #[case::mixed_case(" Cancelled ", OrderStatus::Cancelled)]
    fn update_payload_parses_status(#[case] raw: &str, #[case] expected: OrderStatus) {
        let update = OrderUpdate::try_from(UpdateOrderPayload {
            status: Some(raw.into()),
            shipping_address: None,
        })
        .expect("valid status");
        assert_eq!(update.status, Some(expected));
    }

    #[rstest]
    fn update_payload_rejects_unknown_status() {
        let err = OrderUpdate::try_from(UpdateOrderPayload {
            status: Some("lost".into()),
            shipping_address: None,
        })
        .expect_err("unknown status");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    }

    #[actix_web::test]
    async fn placing_an_order_reserves_stock() {
        let app = TestApp::new();
        let (_, token) = app.seed_customer("buyer@example.com").await;
        let product = app.seed_product("Teapot", 1_250, 5).await;
        let service = actix_test::init_service(app.app()).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/orders")
            .insert_header(bearer(&token))
            .set_json(json!({
                "items": [{ "productId": product.id().as_uuid(), "quantity": 2 }],
                "shippingAddress": ADDRESS,
                "notes": "leave at door"
            }))
            .to_request();
        let res = actix_test::call_service(&service, req).await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body = read_json(res).await;
        assert_eq!(body["status"], json!("pending"));
        assert_eq!(body["totalAmount"], json!(25.0));
        assert_eq!(body["totalQuantity"], json!(2));
        assert_eq!(body["shippingAddress"]["zipCode"], json!("62701"));
        assert_eq!(body["items"][0]["productName"], json!("Teapot"));

        let req = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/products/{}", product.id()))
            .to_request();
        let stock = read_json(actix_test::call_service(&service, req).await).await;
        assert_eq!(stock["stock"], json!(3));
    }

    #[actix_web::test]
    async fn insufficient_stock_is_a_bad_request() {
        let app = TestApp::new();
        let (_, token) = app.seed_customer("buyer@example.com").await;
        let product = app.seed_product("Teapot", 1_250, 1).await;
        let service = actix_test::init_service(app.app()).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/orders")
            .insert_header(bearer(&token))
            .set_json(json!({
                "items": [{ "productId": product.id().as_uuid(), "quantity": 2 }],
                "shippingAddress": ADDRESS
            }))
            .to_request();
        let res = actix_test::call_service(&service, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = read_json(res).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Insufficient stock for product Teapot"));
    }

    #[actix_web::test]
    async fn customers_only_see_their_own_orders() {
        let app = TestApp::new();
        let (_, alice) = app.seed_customer("alice@example.com").await;
        let (_, bob) = app.seed_customer("bob@example.com").await;
        let (_, admin) = app.seed_admin("admin@example.com").await;
        let product = app.seed_product("Teapot", 1_000, 10).await;
        let service = actix_test::init_service(app.app()).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/orders")
            .insert_header(bearer(&alice))
            .set_json(json!({
                "items": [{ "productId": product.id().as_uuid(), "quantity": 1 }],
                "shippingAddress": ADDRESS
            }))
            .to_request();
        let placed = read_json(actix_test::call_service(&service, req).await).await;
        let id = placed["id"].as_str().expect("id").to_owned();

        let list = |token: String| {
            actix_test::TestRequest::get()
                .uri("/api/v1/orders")
                .insert_header(bearer(&token))
                .to_request()
        };
        let count = |body: Value| body.as_array().map(Vec::len).unwrap_or_default();
        assert_eq!(
            count(read_json(actix_test::call_service(&service, list(alice.clone())).await).await),
            1
        );
        assert_eq!(
            count(read_json(actix_test::call_service(&service, list(bob.clone())).await).await),
            0
        );
        assert_eq!(
            count(read_json(actix_test::call_service(&service, list(admin)).await).await),
            1
        );

        let req = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/orders/{id}"))
            .insert_header(bearer(&bob))
            .to_request();
        let res = actix_test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn customer_can_cancel_but_not_ship() {
        let app = TestApp::new();
        let (_, token) = app.seed_customer("buyer@example.com").await;
        let product = app.seed_product("Teapot", 1_000, 10).await;
        let service = actix_test::init_service(app.app()).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/orders")
            .insert_header(bearer(&token))
            .set_json(json!({
                "items": [{ "productId": product.id().as_uuid(), "quantity": 1 }],
                "shippingAddress": ADDRESS
            }))
            .to_request();
        let placed = read_json(actix_test::call_service(&service, req).await).await;
        let id = placed["id"].as_str().expect("id").to_owned();

        let req = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/orders/{id}"))
            .insert_header(bearer(&token))
            .set_json(json!({ "status": "shipped" }))
            .to_request();
        let res = actix_test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let req = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/orders/{id}"))
            .insert_header(bearer(&token))
            .set_json(json!({ "status": "cancelled" }))
            .to_request();
        let res = actix_test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(read_json(res).await["status"], json!("cancelled"));

        let req = actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/orders/{id}"))
            .insert_header(bearer(&token))
            .to_request();
        let res = actix_test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            read_json(res).await,
            json!({ "message": "Order deleted successfully" })
        );
    }

    #[actix_web::test]
    async fn orders_require_a_token() {
        let service = actix_test::init_service(TestApp::new().app()).await;
        let req = actix_test::TestRequest::get()
            .uri("/api/v1/orders")
            .to_request();
        let res = actix_test::call_service(&service, req).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = read_json(res).await;
        assert_eq!(body["message"], json!("Access token is required"));
    }
}
