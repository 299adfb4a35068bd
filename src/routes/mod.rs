use axum::{
    Form, Json, Router,
    extract::{FromRequest, Request},
    http::header,
};
use serde::de::DeserializeOwned;

use crate::{error::AppError, state::AppState};

pub mod admin;
pub mod auth;
pub mod cart;
pub mod doc;
pub mod health;
pub mod params;
pub mod products;

// Build the router without binding state; it is provided at the top level.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(products::router())
        .merge(cart::router())
        .merge(admin::router())
}

/// Decode a request body as JSON or an urlencoded form, depending on the
/// declared Content-Type. Returns the payload and whether the client is an
/// API client (JSON), which drives the JSON-vs-redirect response shape.
pub(crate) async fn json_or_form<T>(req: Request) -> Result<(T, bool), AppError>
where
    T: DeserializeOwned,
{
    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    if is_json {
        let Json(payload) = Json::<T>::from_request(req, &())
            .await
            .map_err(|err| AppError::BadRequest(err.body_text()))?;
        Ok((payload, true))
    } else {
        let Form(payload) = Form::<T>::from_request(req, &())
            .await
            .map_err(|err| AppError::BadRequest(err.body_text()))?;
        Ok((payload, false))
    }
}
