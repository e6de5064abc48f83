//! Catalogue handlers.
//!
//! Reads are public; writes need an administrator's bearer token.

use actix_web::{HttpResponse, delete, get, post, put, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{NewProduct, ProductFilter, ProductUpdate};
use crate::domain::{Error, ProductChanges, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::Authenticated;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::schemas::{MessageResponse, ProductResponse};
use crate::inbound::http::state::HttpState;

/// Catalogue filters. When several are given, `lowStock` wins over `search`,
/// which wins over `category`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Exact category name.
    pub category: Option<String>,
    /// Case-insensitive substring of the name or description.
    pub search: Option<String>,
    /// Only products at or below their low-stock threshold.
    pub low_stock: Option<bool>,
}

impl ProductListQuery {
    fn into_filter(self) -> ProductFilter {
        let non_blank = |value: Option<String>| {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        if self.low_stock.unwrap_or(false) {
            return ProductFilter::LowStock;
        }
        if let Some(term) = non_blank(self.search) {
            return ProductFilter::Search(term);
        }
        match non_blank(self.category) {
            Some(category) => ProductFilter::Category(category),
            None => ProductFilter::All,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[schema(value_type = f64, example = 19.99)]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub stock: i64,
    /// Defaults to 5.
    pub low_stock_threshold: Option<i64>,
}

/// Partial update; omitted fields keep their value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub low_stock_threshold: Option<i64>,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(request: CreateProductRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            price: request.price,
            image_url: request.image_url,
            category: request.category,
            stock: request.stock,
            low_stock_threshold: request.low_stock_threshold,
        }
    }
}

impl From<UpdateProductRequest> for ProductUpdate {
    fn from(request: UpdateProductRequest) -> Self {
        Self {
            changes: ProductChanges {
                name: request.name,
                description: request.description,
                price: request.price,
                image_url: request.image_url,
                category: request.category,
                low_stock_threshold: request.low_stock_threshold,
            },
            stock: request.stock,
        }
    }
}

fn product_id(raw: &str) -> Result<ProductId, Error> {
    ProductId::parse(raw).map_err(|err| Error::invalid_request(err.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Products, newest first", body = [ProductResponse]),
        (status = 400, description = "Invalid query", body = ErrorBody)
    ),
    tags = ["products"],
    operation_id = "listProducts",
    security([])
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    query: web::Query<ProductListQuery>,
) -> ApiResult<web::Json<Vec<ProductResponse>>> {
    let filter = query.into_inner().into_filter();
    let products = state.products.list_products(&filter).await?;
    Ok(web::Json(
        products.into_iter().map(ProductResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ProductResponse),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody)
    ),
    tags = ["products"],
    operation_id = "getProduct",
    security([])
)]
#[get("/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProductResponse>> {
    let id = product_id(&path)?;
    let product = state.products.get_product(&id).await?;
    Ok(web::Json(ProductResponse::from(product)))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid product", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Administrators only", body = ErrorBody)
    ),
    tags = ["products"],
    operation_id = "createProduct",
    security(("bearer" = []))
)]
#[post("/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<CreateProductRequest>,
) -> ApiResult<HttpResponse> {
    let product = state
        .product_admin
        .create_product(caller.principal(), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid product", body = ErrorBody),
        (status = 403, description = "Administrators only", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody)
    ),
    tags = ["products"],
    operation_id = "updateProduct",
    security(("bearer" = []))
)]
#[put("/products/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<UpdateProductRequest>,
) -> ApiResult<web::Json<ProductResponse>> {
    let id = product_id(&path)?;
    let product = state
        .product_admin
        .update_product(caller.principal(), &id, payload.into_inner().into())
        .await?;
    Ok(web::Json(ProductResponse::from(product)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 403, description = "Administrators only", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody)
    ),
    tags = ["products"],
    operation_id = "deleteProduct",
    security(("bearer" = []))
)]
#[delete("/products/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = product_id(&path)?;
    state
        .product_admin
        .delete_product(caller.principal(), &id)
        .await?;
    Ok(web::Json(MessageResponse::new("Product deleted successfully")))
}
