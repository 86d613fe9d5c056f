//! 路由定义
//!
//! 网关路由同时挂载在根路径和 `/api/v1/radius` 下：
//! - 授权/认证：POST /authorize、POST /authenticate
//! - NAS 查询：GET /client/:ip

use std::time::Duration;

use axum::{
    Router,
    error_handling::HandleErrorLayer,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

use super::AppState;
use super::handlers::*;
use super::middleware::{PathRateLimiter, access_log, handle_timeout_error, rate_limit};

/// REST 模块配置的前缀
pub const API_PREFIX: &str = "/api/v1/radius";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(1);
pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn create_radius_router() -> Router<AppState> {
    Router::new()
        .route("/authorize", post(authorize))
        .route("/authenticate", post(authorize))
        .route("/client/:ip", get(client))
}

/// 组装网关：限流 → 超时 → 访问日志 → 请求体限制 → handler。
pub fn build_app(state: AppState, limiter: PathRateLimiter) -> Router {
    Router::new()
        .merge(create_radius_router())
        .nest(API_PREFIX, create_radius_router())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn_with_state(limiter, rate_limit))
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .timeout(REQUEST_TIMEOUT)
                .layer(from_fn(access_log))
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_storage::{
        InMemoryRouterStore, InMemoryServiceStore, ServiceStore, StorageError,
    };
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use domain::{ReplyRule, SubscriberService};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// 查询耗时超过网关超时的缓存
    struct SlowServiceStore;

    #[async_trait]
    impl ServiceStore for SlowServiceStore {
        async fn put_service(&self, _service: &SubscriberService) -> Result<(), StorageError> {
            Ok(())
        }

        async fn get_service(&self, _username: &str) -> Result<SubscriberService, StorageError> {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok(SubscriberService::default())
        }

        async fn count(&self) -> Result<u64, StorageError> {
            Ok(0)
        }
    }

    async fn app() -> Router {
        let services = Arc::new(InMemoryServiceStore::new());
        services
            .put_service(&SubscriberService {
                username: "alice".to_string(),
                radreply: vec![ReplyRule::new("Session-Timeout", ":=", "3600")],
                ..SubscriberService::default()
            })
            .await
            .expect("service");
        let state = AppState {
            routers: Arc::new(InMemoryRouterStore::new()),
            services,
        };
        build_app(state, PathRateLimiter::radius_default().expect("limiter"))
    }

    fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .expect("request")
    }

    fn alice() -> String {
        serde_json::json!({ "request": { "User-Name": "alice" } }).to_string()
    }

    #[tokio::test]
    async fn prefixed_and_root_routes_share_handler() {
        let app = app().await;
        for uri in ["/api/v1/radius/authorize", "/authenticate"] {
            let response = app.clone().oneshot(post(uri, alice())).await.expect("response");
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert!(response.headers().contains_key("x-request-id"));
            let bytes = response
                .into_body()
                .collect()
                .await
                .expect("body")
                .to_bytes();
            let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
            assert_eq!(body["Session-Timeout"]["value"][0], "3600");
        }
    }

    #[tokio::test]
    async fn non_json_body_is_unauthorized() {
        let response = app()
            .await
            .oneshot(post("/authorize", "not json"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_client_is_not_found() {
        let request = Request::builder()
            .uri("/api/v1/radius/client/198.51.100.7")
            .body(Body::empty())
            .expect("request");
        let response = app().await.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn burst_exhaustion_is_per_path() {
        let app = app().await;
        for _ in 0..crate::middleware::rate_limit::BURST {
            let response = app
                .clone()
                .oneshot(post("/authorize", alice()))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::OK);
        }
        let limited = app
            .clone()
            .oneshot(post("/authorize", alice()))
            .await
            .expect("response");
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(limited.headers().contains_key(header::RETRY_AFTER));

        let other = app
            .oneshot(post("/authenticate", alice()))
            .await
            .expect("response");
        assert_eq!(other.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn slow_lookup_times_out() {
        let state = AppState {
            routers: Arc::new(InMemoryRouterStore::new()),
            services: Arc::new(SlowServiceStore),
        };
        let app = build_app(state, PathRateLimiter::radius_default().expect("limiter"));
        let response = app
            .oneshot(post("/authorize", alice()))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        assert_eq!(&bytes[..], b"timed out");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let body = vec![b' '; MAX_BODY_BYTES + 1];
        let response = app()
            .await
            .oneshot(post("/authorize", body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn zero_quota_is_rejected() {
        assert!(PathRateLimiter::new(0, 5).is_err());
        assert!(PathRateLimiter::new(20, 0).is_err());
    }
}
