//! Webhook endpoint

use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;

use crate::application::SharedWebhookService;
use crate::domain::InboundEvent;

#[derive(Clone)]
pub struct WebhookState {
    pub service: SharedWebhookService,
}

/// `POST /webhook`
///
/// Any well-formed JSON body is acknowledged with `200 OK`, whatever it
/// contains. Bodies that are not JSON are rejected by the `Json` extractor
/// before reaching the handler.
pub async fn receive_webhook(
    State(state): State<WebhookState>,
    Json(body): Json<Value>,
) -> (StatusCode, &'static str) {
    let event = InboundEvent::from_json(body);
    state.service.handle(&event);
    (StatusCode::OK, "OK")
}
