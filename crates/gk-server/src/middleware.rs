//! Authentication layer

use axum::{
    extract::{Request, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use gk_auth::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the engine's view of a request from its headers.
///
/// Headers that are not valid UTF-8 are skipped.
pub fn request_context(headers: &HeaderMap) -> RequestContext {
    let pairs: Vec<(&str, &str)> = headers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?)))
        .collect();
    RequestContext::from_pairs(&pairs)
}

/// Authenticate the request and expose the result to handlers as an
/// `Extension<Authenticated>`. A rotated session token rides back on the response.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let ctx = request_context(request.headers());

    let authenticated = match state.authenticator.authenticate(&ctx).await {
        Ok(authenticated) => authenticated,
        Err(rejection) => {
            let intent = rejection.into_intent(&state.authenticator.config().cookie);
            return ApiError::Rejected(intent).into_response();
        }
    };

    let rotated = authenticated.set_cookie().map(str::to_owned);
    request.extensions_mut().insert(authenticated);

    let mut response = next.run(request).await;
    if let Some(cookie) = rotated {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Rotated cookie is not a valid header value: {}", e),
        }
    }
    response
}
