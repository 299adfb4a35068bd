use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};

use crate::{
    dto::auth::UserList,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Role,
    response::ApiResponse,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/admin", get(admin_dashboard))
}

#[utoipa::path(
    get,
    path = "/admin",
    responses(
        (status = 200, description = "All users (admin only)", body = ApiResponse<UserList>),
        (status = 303, description = "Non-admins are sent to the listing"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn admin_dashboard(State(state): State<AppState>, user: AuthUser) -> AppResult<Response> {
    if user.role != Role::Admin {
        return Ok(Redirect::to("/products").into_response());
    }

    let resp = admin_service::list_users(&state).await?;
    Ok(Json(resp).into_response())
}
