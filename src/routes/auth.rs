use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};

use crate::{
    dto::auth::{
        ForgotPasswordRequest, LoginRequest, LoginResponse, ProfileUpdateRequest,
        ProfileUpdateResponse, ResetPasswordRequest, ResetTokenQuery, SignupRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    routes::json_or_form,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/profile", get(profile).post(update_profile))
        .route("/forget_password", post(forget_password))
        .route("/verify_reset/{token}", get(verify_reset))
        .route("/reset-password", get(reset_password_form).post(reset_password))
}

fn token_cookie(token: &str, max_age: i64) -> AppResult<HeaderValue> {
    HeaderValue::from_str(&format!("token={token}; HttpOnly; Max-Age={max_age}; Path=/"))
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<User>),
        (status = 400, description = "Invalid role or duplicate username/email"),
    ),
    tag = "Auth"
)]
pub async fn signup(State(state): State<AppState>, req: Request) -> AppResult<Response> {
    let (payload, is_api): (SignupRequest, bool) = json_or_form(req).await?;
    let resp = auth_service::register(&state.users, payload).await?;

    if is_api {
        Ok((StatusCode::CREATED, Json(resp)).into_response())
    } else {
        Ok(Redirect::to("/login").into_response())
    }
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "Auth"
)]
pub async fn login(State(state): State<AppState>, req: Request) -> AppResult<Response> {
    let (payload, is_api): (LoginRequest, bool) = json_or_form(req).await?;

    let result =
        auth_service::login(&state.users, &state.config, &payload.username, &payload.password)
            .await;

    match result {
        Ok((_user, token)) if is_api => Ok(Json(ApiResponse::success(
            "Giriş başarılı",
            LoginResponse { token },
            None,
        ))
        .into_response()),
        Ok((_user, token)) => {
            let mut response = Redirect::to("/products").into_response();
            response.headers_mut().insert(
                header::SET_COOKIE,
                token_cookie(&token, state.config.token_ttl_secs)?,
            );
            Ok(response)
        }
        Err(AppError::Unauthorized(_)) if !is_api => Err(AppError::Unauthorized(
            "Geçersiz kullanıcı adı veya şifre".to_string(),
        )),
        Err(err) => Err(err),
    }
}

#[utoipa::path(
    get,
    path = "/logout",
    responses((status = 303, description = "Clears the token cookie")),
    tag = "Auth"
)]
pub async fn logout() -> Response {
    let mut response = Redirect::to("/login").into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_static("token=; HttpOnly; Max-Age=0; Path=/"),
    );
    response
}

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Current user profile", body = ApiResponse<User>),
        (status = 403, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    use crate::repository::UserRepository;

    let current = state
        .users
        .find_by_id(user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(ApiResponse::success("OK", current, None)))
}

#[utoipa::path(
    post,
    path = "/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<ProfileUpdateResponse>),
        (status = 400, description = "Validation failure"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    req: Request,
) -> AppResult<Response> {
    let (payload, is_api): (ProfileUpdateRequest, bool) = json_or_form(req).await?;

    let outcome =
        auth_service::update_profile(&state.users, &state.config, user.user_id, payload).await?;

    let mut response = Json(ApiResponse::success(
        outcome.message,
        ProfileUpdateResponse {
            token: outcome.token.clone(),
        },
        None,
    ))
    .into_response();

    // Browser sessions carry the identity in the cookie; replace it when the
    // username changed.
    if let Some(token) = outcome.token.filter(|_| !is_api) {
        response.headers_mut().insert(
            header::SET_COOKIE,
            token_cookie(&token, state.config.token_ttl_secs)?,
        );
    }
    Ok(response)
}

#[utoipa::path(
    post,
    path = "/forget_password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Generic acknowledgement, mail sent when the address is known"),
    ),
    tag = "Auth"
)]
pub async fn forget_password(
    State(state): State<AppState>,
    req: Request,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let (payload, _): (ForgotPasswordRequest, bool) = json_or_form(req).await?;

    auth_service::forget_password(&state.users, &state.config, &state.mailer, &payload.email)
        .await?;

    Ok(Json(ApiResponse::success(
        "Şifre sıfırlama linki e-posta adresinize gönderildi.",
        serde_json::json!({}),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/verify_reset/{token}",
    params(("token" = String, Path, description = "Reset token")),
    responses(
        (status = 303, description = "Valid token, redirect to the reset form"),
        (status = 400, description = "Expired or malformed token"),
    ),
    tag = "Auth"
)]
pub async fn verify_reset(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Response> {
    auth_service::validate_reset_token(&token, &state.config.secret_key)?;
    Ok(Redirect::to(&format!("/reset-password?token={token}")).into_response())
}

#[utoipa::path(
    get,
    path = "/reset-password",
    params(("token" = Option<String>, Query, description = "Reset token")),
    responses(
        (status = 200, description = "Token accepted"),
        (status = 400, description = "Missing, expired or malformed token"),
    ),
    tag = "Auth"
)]
pub async fn reset_password_form(
    State(state): State<AppState>,
    Query(query): Query<ResetTokenQuery>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let token = query
        .token
        .ok_or_else(|| AppError::BadRequest("Token bulunamadı".to_string()))?;
    auth_service::validate_reset_token(&token, &state.config.secret_key)?;
    Ok(Json(ApiResponse::success("OK", serde_json::json!({}), None)))
}

#[utoipa::path(
    post,
    path = "/reset-password",
    params(("token" = Option<String>, Query, description = "Reset token")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced"),
        (status = 400, description = "Missing token or password"),
    ),
    tag = "Auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Query(query): Query<ResetTokenQuery>,
    req: Request,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let token = query
        .token
        .ok_or_else(|| AppError::BadRequest("Token bulunamadı".to_string()))?;

    let (payload, _): (ResetPasswordRequest, bool) = json_or_form(req).await?;
    let new_password = payload
        .new_password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("Yeni şifre gönderilmedi.".to_string()))?;

    auth_service::reset_password(&state.users, &state.config, &token, &new_password).await?;

    Ok(Json(ApiResponse::success(
        "Şifreniz başarıyla güncellendi.",
        serde_json::json!({}),
        None,
    )))
}
