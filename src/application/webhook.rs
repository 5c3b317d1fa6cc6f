//! Webhook event handling
//!
//! [`WebhookService`] is what the HTTP layer calls for every POST: it stamps
//! the event with the current time, renders it and writes the block to the
//! sink. Nothing it does can fail the request.

use std::sync::Arc;

use tracing::{debug, error, warn};

use super::ports::{BlockSink, Clock};
use super::render::Renderer;
use crate::domain::{EventKind, InboundEvent};
use crate::support::ocpp_frame::OcppMessage;

pub type SharedWebhookService = Arc<WebhookService>;

pub struct WebhookService {
    renderer: Renderer,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn BlockSink>,
}

impl WebhookService {
    pub fn new(renderer: Renderer, clock: Arc<dyn Clock>, sink: Arc<dyn BlockSink>) -> Self {
        Self {
            renderer,
            clock,
            sink,
        }
    }

    pub fn shared(self) -> SharedWebhookService {
        Arc::new(self)
    }

    /// Render one event and write it to the sink. Returns the rendered block.
    pub fn handle(&self, event: &InboundEvent) -> String {
        for problem in event.missing_fields() {
            warn!(station_id = event.station_id(), "{}", problem);
        }

        let kind = event.kind();
        let decoded = match kind {
            EventKind::Message => match OcppMessage::decode(event.raw_message()) {
                Ok(msg) => Some(msg),
                Err(e) => {
                    debug!(
                        station_id = event.station_id(),
                        "Message did not decode, logging raw text: {}", e
                    );
                    None
                }
            },
            _ => None,
        };

        let event_label = match &kind {
            EventKind::Other(_) => "other",
            known => known.as_str(),
        };
        let message_type = match (&kind, &decoded) {
            (EventKind::Message, Some(msg)) => msg.kind.label(),
            (EventKind::Message, None) => "UNDECODED",
            _ => "NONE",
        };
        metrics::counter!(
            "webhook_events_total",
            "event" => event_label.to_string(),
            "message_type" => message_type
        )
        .increment(1);

        let block = self
            .renderer
            .render_decoded(event, decoded.as_ref(), self.clock.now());

        if let Err(e) = self.sink.write_block(&block) {
            error!(station_id = event.station_id(), "{}", e);
        }

        block
    }

    /// Write the startup banner for `addr` to the sink.
    pub fn announce(&self, addr: &str) {
        if let Err(e) = self.sink.write_block(&self.renderer.banner(addr)) {
            error!("Failed to write startup banner: {}", e);
        }
    }
}
