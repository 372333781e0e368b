mod config;
mod prices;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method},
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use storekeep_core::{AppConfig, PolarConfig};
use storekeep_polar::{PolarClient, PolarError};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

/// A Polar client bound to the organization whose catalog it serves.
pub struct PolarSource {
    pub client: PolarClient,
    pub organization_id: String,
}

impl PolarSource {
    /// # Errors
    ///
    /// Returns [`PolarError`] if the client cannot be constructed.
    pub fn from_config(config: &PolarConfig, timeout_secs: u64) -> Result<Self, PolarError> {
        Ok(Self {
            client: PolarClient::from_config(config, timeout_secs)?,
            organization_id: config.organization_id.clone(),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// `None` when Polar credentials are not configured.
    pub polar: Option<Arc<PolarSource>>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    polar: &'static str,
    supabase: &'static str,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/config", get(config::public_config))
        .route("/api/polar-prices", get(prices::polar_prices))
        .route("/api/v1/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<HealthData>> {
    let configured = |ok: bool| if ok { "configured" } else { "not_configured" };
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            polar: configured(state.polar.is_some()),
            supabase: configured(
                state.config.supabase_url.is_some() && state.config.supabase_anon_key.is_some(),
            ),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use storekeep_core::Environment;
    use tower::ServiceExt;

    use super::*;

    pub(crate) fn test_config() -> AppConfig {
        AppConfig {
            env: Environment::Test,
            bind_addr: "127.0.0.1:0".parse().expect("addr"),
            log_level: "info".to_string(),
            http_timeout_secs: 5,
            index_html_path: PathBuf::from("index.html"),
            polar_api_token: None,
            polar_org_id: None,
            polar_api_base_url: "https://api.polar.sh".to_string(),
            supabase_url: Some("https://abc.supabase.co".to_string()),
            supabase_key: Some("service-key".to_string()),
            supabase_anon_key: Some("anon-key".to_string()),
        }
    }

    pub(crate) fn app_with(config: AppConfig, polar: Option<PolarSource>) -> Router {
        build_app(AppState {
            config: Arc::new(config),
            polar: polar.map(Arc::new),
        })
    }

    pub(crate) async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response")
    }

    pub(crate) async fn json_body(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json parse")
    }

    #[tokio::test]
    async fn health_reports_configuration_state() {
        let response = get(app_with(test_config(), None), "/api/v1/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let json = json_body(response).await;
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["polar"], "not_configured");
        assert_eq!(json["data"]["supabase"], "configured");
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn incoming_request_id_is_echoed() {
        let response = app_with(test_config(), None)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(
            response.headers().get("x-request-id").map(|v| v.as_bytes()),
            Some(&b"req-42"[..])
        );
    }

    #[tokio::test]
    async fn oversized_request_id_is_replaced() {
        let long = "r".repeat(500);
        let response = app_with(test_config(), None)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", long.as_str())
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let echoed = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .expect("request id header");
        assert_ne!(echoed, long);
        assert_eq!(echoed.len(), 36);
    }

    #[tokio::test]
    async fn unsupported_method_is_rejected() {
        let response = app_with(test_config(), None)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/config")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn cors_preflight_allows_any_origin() {
        let response = app_with(test_config(), None)
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/config")
                    .header("origin", "https://shop.example.com")
                    .header("access-control-request-method", "GET")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .map(|v| v.as_bytes()),
            Some(&b"*"[..])
        );
    }
}
