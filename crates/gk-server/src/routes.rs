//! HTTP routes and handlers

use axum::{
    extract::{Path, State},
    http::{header::SET_COOKIE, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use gk_auth::{AuthError, Authenticated, LoginRequest, RoleAuthorizer};
use gk_core::{Id, RoleRank};
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::{ApiError, ApiResult};
use crate::middleware::require_auth;
use crate::state::AppState;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth", get(authorise).post(authorise))
        .route("/auth/permissions/:name", get(check_permission))
        .route("/api-key/gen/:id", post(generate_key))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/auth/login", post(login))
        .merge(protected)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

async fn login(
    State(state): State<AppState>,
    body: Option<Json<LoginRequest>>,
) -> ApiResult<impl IntoResponse> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let outcome = state.login.login(&request).await?;

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, outcome.set_cookie)],
        Json(json!({
            "success": true,
            "message": "OK",
            "token": outcome.session.token,
        })),
    ))
}

#[derive(Debug, Default, Deserialize)]
struct RoleRequest {
    role: Option<RoleRank>,
}

/// Confirms the caller is authenticated and, when a role is named, holds it
async fn authorise(
    Extension(auth): Extension<Authenticated>,
    body: Option<Json<RoleRequest>>,
) -> ApiResult<Json<Value>> {
    if let Some(role) = body.and_then(|Json(request)| request.role) {
        RoleAuthorizer::require(&auth.principal, role)?;
    }

    let mut response = json!({
        "success": true,
        "message": "Authorised",
        "user": auth.principal,
    });
    if let Some(update) = &auth.update {
        response["update"] = json!(update);
    }

    Ok(Json(response))
}

#[derive(Debug, Default, Deserialize)]
struct KeyRequest {
    life: Option<u64>,
}

async fn generate_key(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    Path(id): Path<Id>,
    body: Option<Json<KeyRequest>>,
) -> ApiResult<Json<Value>> {
    let life = body.and_then(|Json(request)| request.life);
    let issued = state.keys.issue(&auth.principal, id, life).await?;

    Ok(Json(json!({
        "success": true,
        "message": "OK",
        "key": issued.token,
    })))
}

async fn check_permission(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    state
        .permissions
        .require(&auth.principal, &name)
        .await
        .map_err(|e| match e {
            AuthError::PermissionDenied(_) => ApiError::Auth(e),
            other => {
                tracing::error!(error = %other, "Permission lookup failed");
                ApiError::message(500, "Permission check failed")
            }
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "OK",
        "permission": name,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header::CONTENT_TYPE, Request, Response};
    use async_trait::async_trait;
    use gk_auth::{Argon2Verifier, GroupStore, MemoryStore, Stores};
    use gk_core::config::AppConfig;
    use gk_core::{GkError, GkResult};
    use gk_models::{ApiKey, Group, Principal};
    use tower::ServiceExt;

    struct UnreachableGroups;

    #[async_trait]
    impl GroupStore for UnreachableGroups {
        async fn find_all_containing_user(&self, _principal_id: Id) -> GkResult<Vec<Group>> {
            Err(GkError::Database("connection refused".into()))
        }
    }

    fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let hash = Argon2Verifier::hash_password("hunter2").unwrap();
        store.insert_principal(Principal::new(1, "alice").with_role(1), hash.clone());
        store.insert_principal(Principal::new(2, "bob"), hash);
        store.insert_api_key(ApiKey::new(10, 1, "alice-ci", 2));
        store.insert_group(
            Group::new(1, "editors")
                .with_member(1)
                .with_permission("edit_posts"),
        );
        store
    }

    fn test_app() -> Router {
        let stores = Stores::from_backend(seeded_store());
        build_router(AppState::new(&AppConfig::default(), stores))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login_token(app: &Router, username: &str, remember: bool) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/login",
                json!({"username": username, "password": "hunter2", "remember": remember}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_login_sets_cookie() {
        let app = test_app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/auth/login",
                json!({"username": "Alice", "password": "hunter2", "remember": true}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("AuthToken="));
        assert!(cookie.ends_with("Max-Age=2592000;"));

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "OK");
    }

    #[tokio::test]
    async fn test_login_failures() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/login",
                json!({"username": "alice", "password": "wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({"status": 401, "message": "Incorrect username or password"})
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/login")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_session_cookie_authorises_and_rotates() {
        let app = test_app();
        let token = login_token(&app, "alice", false).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth")
                    .header("Cookie", format!("AuthToken={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        // Non-remembered sessions are always inside the rotation window
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("AuthToken="));
        assert!(!cookie.contains("Max-Age"));

        let body = body_json(response).await;
        assert_eq!(body["message"], "Authorised");
        assert_eq!(body["user"]["username"], "alice");
        assert!(body["user"].get("password").is_none());
        assert_eq!(body["update"]["expiresIn"], 7200);
    }

    #[tokio::test]
    async fn test_missing_credentials_clear_cookie() {
        let response = test_app()
            .oneshot(Request::builder().uri("/auth").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers()[SET_COOKIE]
            .to_str()
            .unwrap()
            .starts_with("AuthToken=deleted;"));
        assert_eq!(
            body_json(response).await,
            json!({"status": 401, "message": "Auth Error"})
        );
    }

    #[tokio::test]
    async fn test_role_check() {
        let app = test_app();
        let token = login_token(&app, "bob", true).await;

        let request = |role: i32| {
            Request::builder()
                .method("POST")
                .uri("/auth")
                .header(CONTENT_TYPE, "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(json!({ "role": role }).to_string()))
                .unwrap()
        };

        let response = app.clone().oneshot(request(2)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(request(1)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await,
            json!({"status": 403, "message": "Account not authorised"})
        );
    }

    #[tokio::test]
    async fn test_generated_key_authenticates_with_clamped_role() {
        let app = test_app();
        let session = login_token(&app, "alice", true).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api-key/gen/10")
                    .header("Cookie", format!("AuthToken={}", session))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let key = body_json(response).await["key"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth")
                    .header("api-key", key)
                    .header("Cookie", "AuthToken=garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_none());

        let body = body_json(response).await;
        assert_eq!(body["user"]["id"], 1);
        assert_eq!(body["user"]["role"], 2);
        assert_eq!(body["user"]["additionalFields"]["apiKey"]["id"], 10);
        assert!(body.get("update").is_none());
    }

    #[tokio::test]
    async fn test_generate_key_for_foreign_or_missing_key() {
        let app = test_app();
        let session = login_token(&app, "bob", true).await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api-key/gen/10")
                    .header("Cookie", format!("AuthToken={}", session))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"status": 404, "message": "Key not found"})
        );
    }

    #[tokio::test]
    async fn test_bad_api_key() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/auth")
                    .header("api-key", "not-a-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_eq!(
            body_json(response).await,
            json!({"status": 401, "message": "Invalid Key"})
        );
    }

    #[tokio::test]
    async fn test_permission_endpoint() {
        let app = test_app();
        let alice = login_token(&app, "alice", true).await;
        let bob = login_token(&app, "bob", true).await;

        let check = |token: &str| {
            Request::builder()
                .uri("/auth/permissions/edit_posts")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(check(&alice)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(check(&bob)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await,
            json!({"status": 403, "message": "Permission denied"})
        );
    }

    #[tokio::test]
    async fn test_permission_lookup_failure_is_server_error() {
        let mut stores = Stores::from_backend(seeded_store());
        stores.groups = Arc::new(UnreachableGroups);
        let app = build_router(AppState::new(&AppConfig::default(), stores));
        let token = login_token(&app, "alice", true).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth/permissions/edit_posts")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"status": 500, "message": "Permission check failed"})
        );
    }
}
