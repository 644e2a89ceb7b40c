//! API error handling
//!
//! Every failure leaves the server as `{status, message}` JSON.

use axum::{
    http::{header::SET_COOKIE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use gk_auth::{AuthError, ResponseIntent};
use gk_core::{ErrorBody, GkError};

#[derive(Debug)]
pub enum ApiError {
    Service(GkError),
    Auth(AuthError),
    /// A refused authentication, already shaped by the engine
    Rejected(ResponseIntent),
    Message { status: u16, message: &'static str },
}

impl ApiError {
    pub fn message(status: u16, message: &'static str) -> Self {
        ApiError::Message { status, message }
    }

    fn into_parts(self) -> (ErrorBody, Option<String>) {
        match self {
            ApiError::Service(err) => {
                if err.status_code() >= 500 {
                    tracing::error!(error = %err, code = err.error_code(), "Request failed");
                }
                (err.to_body(), None)
            }
            ApiError::Auth(err) => {
                if err.is_internal() {
                    tracing::error!(error = %err, "Authorization fault");
                }
                (err.to_body(), None)
            }
            ApiError::Rejected(intent) => (intent.body, intent.set_cookie),
            ApiError::Message { status, message } => (ErrorBody::new(status, message), None),
        }
    }
}

impl From<GkError> for ApiError {
    fn from(err: GkError) -> Self {
        ApiError::Service(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (body, set_cookie) = self.into_parts();
        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = (status, Json(body)).into_response();
        if let Some(cookie) = set_cookie.and_then(|c| HeaderValue::from_str(&c).ok()) {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
