use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    error::AppError,
    models::Role,
    response::{ApiResponse, Meta},
    state::AppState,
    token::decode_token,
};

/// Identity decoded from a verified token, attached to the request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    if user.role != Role::Admin {
        return Err(AppError::Forbidden("Yetkiniz yok!".to_string()));
    }
    Ok(())
}

/// Product creation is limited to suppliers and admins.
pub fn ensure_supplier(user: &AuthUser) -> Result<(), AppError> {
    if user.role != Role::Supplier && user.role != Role::Admin {
        return Err(AppError::Forbidden("Yetkiniz yok!".to_string()));
    }
    Ok(())
}

/// API clients (Content-Type: application/json) get a 403 JSON body;
/// browser clients are sent back to the login page.
#[derive(Debug)]
pub enum AuthRejection {
    Api(String),
    Browser,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Api(message) => (
                StatusCode::FORBIDDEN,
                Json(ApiResponse::<serde_json::Value> {
                    message,
                    data: None,
                    meta: Some(Meta::empty()),
                }),
            )
                .into_response(),
            AuthRejection::Browser => Redirect::to("/login").into_response(),
        }
    }
}

fn token_from_cookie(parts: &Parts) -> Option<String> {
    let raw = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "token" && !value.is_empty()).then(|| value.to_string())
    })
}

fn token_from_bearer(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let wants_json = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));
        let reject = |message: &str| {
            if wants_json {
                AuthRejection::Api(message.to_string())
            } else {
                AuthRejection::Browser
            }
        };

        // The cookie wins when both carriers are present.
        let token = token_from_cookie(parts).or_else(|| token_from_bearer(parts));
        let Some(token) = token else {
            return Err(reject("Token eksik!"));
        };

        let claims = decode_token(&token, &state.config.secret_key)
            .map_err(|_| reject("Geçersiz token!"))?;

        let user_id = claims
            .sub
            .parse::<i32>()
            .map_err(|_| reject("Geçersiz token!"))?;
        let role = Role::parse(&claims.role).ok_or_else(|| reject("Geçersiz token!"))?;

        Ok(AuthUser {
            user_id,
            username: claims.username,
            role,
        })
    }
}
