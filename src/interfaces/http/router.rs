//! HTTP router

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use super::health::health_check;
use super::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::request_id::request_id_middleware;
use super::webhook::{receive_webhook, WebhookState};
use crate::application::SharedWebhookService;

/// Build the router.
///
/// `/metrics` is only mounted when a Prometheus handle is supplied.
pub fn create_router(service: SharedWebhookService, metrics: Option<PrometheusHandle>) -> Router {
    let mut router = Router::new()
        .route("/webhook", post(receive_webhook))
        .route("/health", get(health_check))
        .with_state(WebhookState { service });

    if let Some(handle) = metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use tower::ServiceExt;

    use super::*;
    use crate::application::ports::{FixedClock, MemorySink};
    use crate::application::render::Renderer;
    use crate::application::WebhookService;
    use crate::interfaces::http::request_id::REQUEST_ID_HEADER;

    fn make_app() -> (Router, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
        let service = WebhookService::new(Renderer::default(), Arc::new(clock), sink.clone());
        (create_router(service.shared(), None), sink)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(resp: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), 10_000)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let (app, sink) = make_app();
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, "OK");
        assert!(sink.blocks().is_empty());
    }

    #[tokio::test]
    async fn webhook_renders_message_event() {
        let (app, sink) = make_app();
        let body = r#"{"stationId":"CP1","event":"message","origin":"station","message":"[2,\"123\",\"BootNotification\",{\"vendor\":\"ACME\"}]"}"#;

        let resp = app.oneshot(post_json(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, "OK");

        let blocks = sink.blocks();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains("║ STATION: CP1\n"));
        assert!(blocks[0].contains("║ Action: BootNotification\n"));
        assert!(blocks[0].contains("\"vendor\": \"ACME\""));
    }

    #[tokio::test]
    async fn webhook_acknowledges_incomplete_events() {
        for body in [
            r#"{}"#,
            r#"{"event":"message"}"#,
            r#"{"stationId":"CP1","event":"message","origin":"station","message":"not-json"}"#,
            r#"[1,2,3]"#,
            r#""just a string""#,
        ] {
            let (app, sink) = make_app();
            let resp = app.oneshot(post_json(body)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{}", body);
            assert_eq!(sink.blocks().len(), 1, "{}", body);
        }
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let (app, sink) = make_app();
        let resp = app.oneshot(post_json("{not json")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(sink.blocks().is_empty());
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let (app, _sink) = make_app();
        let req = Request::builder()
            .uri("/health")
            .header(REQUEST_ID_HEADER, "abc-123")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[REQUEST_ID_HEADER], "abc-123");
    }

    #[tokio::test]
    async fn request_id_is_generated() {
        let (app, _sink) = make_app();
        let resp = app.oneshot(post_json(r#"{"event":"connected"}"#)).await.unwrap();
        let id = resp.headers()[REQUEST_ID_HEADER].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn metrics_route_only_when_enabled() {
        let (app, _sink) = make_app();
        let req = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();
        let service = WebhookService::new(
            Renderer::default(),
            Arc::new(FixedClock(Utc::now())),
            Arc::new(MemorySink::new()),
        );
        let app = create_router(service.shared(), Some(handle));
        let req = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
