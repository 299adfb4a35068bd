use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::products::{CreateProductRequest, CreatedProduct, ProductList},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::{json_or_form, params::ProductQuery},
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/add-product", post(add_product))
        .route("/delete-product/{id}", post(delete_product))
        .route("/api/products", get(api_list_products).post(api_create_product))
}

#[utoipa::path(
    get,
    path = "/products",
    params(
        ("search" = Option<String>, Query, description = "Substring match on name, case-insensitive"),
        ("sort" = Option<String>, Query, description = "price_asc (default) or price_desc"),
        ("min_price" = Option<i64>, Query, description = "Lower price bound"),
        ("max_price" = Option<i64>, Query, description = "Upper price bound"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Filtered product listing", body = ApiResponse<ProductList>),
        (status = 403, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/add-product",
    request_body = CreateProductRequest,
    responses(
        (status = 303, description = "Created, redirect to the listing"),
        (status = 403, description = "Not a supplier or admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn add_product(
    State(state): State<AppState>,
    user: AuthUser,
    req: Request,
) -> AppResult<Response> {
    let (payload, is_api): (CreateProductRequest, bool) = json_or_form(req).await?;
    let resp = product_service::create_product(&state, &user, payload).await?;

    if is_api {
        Ok((StatusCode::CREATED, Json(resp)).into_response())
    } else {
        Ok(Redirect::to("/products").into_response())
    }
}

#[utoipa::path(
    post,
    path = "/delete-product/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Caller is neither the creator nor an admin"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("search" = Option<String>, Query, description = "Substring match on name, case-insensitive"),
        ("sort" = Option<String>, Query, description = "price_asc (default) or price_desc"),
        ("min_price" = Option<i64>, Query, description = "Lower price bound"),
        ("max_price" = Option<i64>, Query, description = "Upper price bound"),
    ),
    responses(
        (status = 200, description = "Filtered product listing", body = ApiResponse<ProductList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn api_list_products(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<CreatedProduct>),
        (status = 400, description = "Missing product details"),
        (status = 403, description = "Not a supplier or admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn api_create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CreatedProduct>>)> {
    let resp = product_service::create_product(&state, &user, payload).await?;
    let product_id = resp
        .data
        .as_ref()
        .map(|p| p.id.to_string())
        .unwrap_or_default();

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Ürün başarıyla eklendi",
            CreatedProduct { product_id },
            None,
        )),
    ))
}
