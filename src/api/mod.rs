//! Pulseboard REST API
//!
//! HTTP API layer for Pulseboard, built with Axum.
//!
//! # Endpoints
//!
//! ## Dashboard
//! - `GET /api/v1/dashboard` - Full live-feed snapshot
//! - `GET /api/v1/dashboard/donations` - Revenue chart and recent donations
//! - `GET /api/v1/dashboard/stats` - Aggregate counters
//! - `GET /api/v1/dashboard/top-campaigns` - Campaigns ranked by growth
//!
//! ## Admin console
//! - `GET /api/v1/admins?q=` - List admins
//! - `POST /api/v1/admins` - Add an admin
//! - `DELETE /api/v1/admins/:address` - Remove an admin
//! - `POST /api/v1/admins/:address/check` - Check admin status
//! - `GET /api/v1/admins/activity` - Activity log
//! - `POST /api/v1/creator/transfer` - Transfer the creator role
//!
//! ## Campaigns
//! - `GET /api/v1/campaigns` - List campaigns
//! - `POST /api/v1/campaigns` - Create a campaign
//! - `GET /api/v1/campaigns/stats` - Campaign summary
//! - `GET /api/v1/campaigns/:id` - Get a campaign
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /api/v1/ws` - Real-time streaming connection

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

#[cfg(test)]
pub(crate) use state::test_state;

use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::websocket::websocket_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Dashboard routes
        .route("/dashboard", get(routes::dashboard::get_dashboard))
        .route("/dashboard/donations", get(routes::dashboard::get_donations))
        .route("/dashboard/stats", get(routes::dashboard::get_stats))
        .route(
            "/dashboard/top-campaigns",
            get(routes::dashboard::get_top_campaigns),
        )
        // Admin console routes
        .route(
            "/admins",
            get(routes::admins::list_admins).post(routes::admins::add_admin),
        )
        .route("/admins/activity", get(routes::admins::list_activity))
        .route("/admins/:address", delete(routes::admins::remove_admin))
        .route("/admins/:address/check", post(routes::admins::check_admin))
        .route("/creator/transfer", post(routes::admins::transfer_creator))
        // Campaign routes
        .route(
            "/campaigns",
            get(routes::campaigns::list_campaigns).post(routes::campaigns::create_campaign),
        )
        .route("/campaigns/stats", get(routes::campaigns::campaign_stats))
        .route("/campaigns/:id", get(routes::campaigns::get_campaign))
        // WebSocket route
        .route("/ws", get(websocket_handler));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let timeout = Duration::from_secs(state.config.request_timeout_secs.max(1));
    let cors = cors_layer(&state.config);
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive unless origins are configured
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Pulseboard API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Pulseboard API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    use crate::websocket::ServerMessage;

    const NEW_ADMIN: &str = "0x3333333333333333333333333333333333333333";

    fn create_test_app() -> (Router, AppState) {
        let state = test_state();
        (build_router(state.clone()), state)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (app, _) = create_test_app();

        for uri in ["/health/live", "/health/ready", "/health"] {
            let response = app.clone().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        }

        let response = app.oneshot(get("/health")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["feed"], "running");
    }

    #[tokio::test]
    async fn test_dashboard_snapshot() {
        let (app, _) = create_test_app();

        let response = app.oneshot(get("/api/v1/dashboard")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["mounted"], true);
        assert_eq!(body["pulse"]["chart"].as_array().unwrap().len(), 20);
        assert_eq!(body["stats"]["hourly_total"], 2660.0);
        assert_eq!(body["top_campaigns"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_dashboard_widgets() {
        let (app, _) = create_test_app();

        let response = app
            .clone()
            .oneshot(get("/api/v1/dashboard/donations"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["recent"].as_array().unwrap().len(), 0);
        assert!(body["highlight"].is_null());

        let response = app
            .clone()
            .oneshot(get("/api/v1/dashboard/top-campaigns?limit=2"))
            .await
            .unwrap();
        let body = body_json(response).await;
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0]["growth"].as_f64() >= rows[1]["growth"].as_f64());

        let response = app
            .oneshot(get("/api/v1/dashboard/top-campaigns?limit=50"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_add_admin_then_duplicate() {
        let (app, state) = create_test_app();
        let body = format!(r#"{{"address": "{}"}}"#, NEW_ADMIN);

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/v1/admins", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let activity_after_add = state.admins.activity().await.len();

        let response = app
            .oneshot(json_request("POST", "/api/v1/admins", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["error"]["code"], "ALREADY_ADMIN");

        assert_eq!(state.admins.activity().await.len(), activity_after_add);
    }

    #[tokio::test]
    async fn test_add_admin_invalid_address() {
        let (app, state) = create_test_app();
        let before = state.admins.admin_count().await;

        let response = app
            .oneshot(json_request("POST", "/api/v1/admins", r#"{"address": "0x111"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(!body["request_id"].as_str().unwrap().is_empty());
        assert_eq!(state.admins.admin_count().await, before);
    }

    #[tokio::test]
    async fn test_list_admins_filter_and_activity() {
        let (app, _) = create_test_app();

        let response = app
            .clone()
            .oneshot(get("/api/v1/admins?q=ZZZZ"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["total"], 0);

        let response = app
            .clone()
            .oneshot(get("/api/v1/admins/activity"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["total"], 3);
    }

    #[tokio::test]
    async fn test_check_remove_and_transfer() {
        let (app, state) = create_test_app();
        state.admins.add_admin(NEW_ADMIN).await.unwrap();

        let uri = format!("/api/v1/admins/{}/check", NEW_ADMIN);
        let response = app
            .clone()
            .oneshot(Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await["is_admin"], true);

        let uri = format!("/api/v1/admins/{}", NEW_ADMIN);
        let response = app
            .clone()
            .oneshot(Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["removed"], true);

        let mut events = state.ws_hub.subscribe_broadcast();
        let body = format!(r#"{{"address": "{}"}}"#, NEW_ADMIN);
        let response = app
            .oneshot(json_request("POST", "/api/v1/creator/transfer", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["creator"], NEW_ADMIN);

        let latest = state.admins.activity().await[0].clone();
        assert_eq!(latest.action.label(), "Creator Transferred");

        let event = events.recv().await.unwrap();
        assert_eq!(event.topic, "admin.activity");
        match event.message {
            ServerMessage::AdminActivity { entry } => assert_eq!(entry, latest),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_campaign_endpoints() {
        let (app, _) = create_test_app();

        let response = app.clone().oneshot(get("/api/v1/campaigns")).await.unwrap();
        assert_eq!(body_json(response).await["total"], 4);

        let response = app
            .clone()
            .oneshot(get("/api/v1/campaigns?status=Active"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert!(body["campaigns"]
            .as_array()
            .unwrap()
            .iter()
            .all(|c| c["status"] == "Active"));

        let response = app
            .clone()
            .oneshot(get("/api/v1/campaigns/stats"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["total"], 4);

        let response = app.oneshot(get("/api/v1/campaigns/999")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_campaign() {
        let (app, state) = create_test_app();
        let mut events = state.ws_hub.subscribe_broadcast();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/campaigns",
                r#"{
                    "creator_address": "0x2222222222222222222222222222222222222222",
                    "label": "Solar Commons",
                    "goal_amount": "25000",
                    "deadline": "2030-01-01T12:00"
                }"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["id"], 36);
        assert_eq!(body["status"], "Active");
        assert_eq!(body["progress"], 0.0);

        let event = events.recv().await.unwrap();
        assert_eq!(event.topic, "campaigns");

        let response = app
            .oneshot(json_request("POST", "/api/v1/campaigns", r#"{"label": "No creator"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_json_rejected() {
        let (app, _) = create_test_app();

        let response = app
            .oneshot(json_request("POST", "/api/v1/admins", "not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
