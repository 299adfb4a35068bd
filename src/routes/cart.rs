use axum::{
    Json, Router,
    extract::{Path, Request, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{CartView, CheckoutSummary, UpdateCartForm},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::json_or_form,
    services::cart_service::{self, AddToCart},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(view_cart))
        .route("/add-to-cart/{product_id}", post(add_to_cart))
        .route("/update-cart/{item_id}", post(update_cart))
        .route("/remove-from-cart/{item_id}", post(remove_from_cart))
        .route("/checkout", post(checkout))
}

#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "Cart lines and total for the current user", body = ApiResponse<CartView>),
        (status = 403, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::view_cart(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/add-to-cart/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 303, description = "Added, redirect to the cart; unknown products redirect to the listing"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Response> {
    match cart_service::add_to_cart(&state, &user, product_id).await? {
        AddToCart::Added => Ok(Redirect::to("/cart").into_response()),
        AddToCart::ProductMissing => Ok(Redirect::to("/products").into_response()),
    }
}

#[utoipa::path(
    post,
    path = "/update-cart/{item_id}",
    params(("item_id" = Uuid, Path, description = "Cart line ID")),
    request_body = UpdateCartForm,
    responses(
        (status = 303, description = "Quantity replaced, or line removed when non-positive"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<Uuid>,
    req: Request,
) -> AppResult<Response> {
    let (payload, _): (UpdateCartForm, bool) = json_or_form(req).await?;
    let quantity = payload.quantity.unwrap_or(1);

    cart_service::update_cart(&state, &user, item_id, quantity).await?;
    Ok(Redirect::to("/cart").into_response())
}

#[utoipa::path(
    post,
    path = "/remove-from-cart/{item_id}",
    params(("item_id" = Uuid, Path, description = "Cart line ID")),
    responses(
        (status = 303, description = "Removed; absent lines are a no-op"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Response> {
    cart_service::remove_from_cart(&state, &user, item_id).await?;
    Ok(Redirect::to("/cart").into_response())
}

#[utoipa::path(
    post,
    path = "/checkout",
    responses(
        (status = 200, description = "Owners notified, cart cleared", body = ApiResponse<CheckoutSummary>),
        (status = 400, description = "Empty cart"),
        (status = 500, description = "Mail delivery failed, cart left intact"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CheckoutSummary>>> {
    let resp = cart_service::checkout(&state, &user).await?;
    Ok(Json(resp))
}
