//! Event block rendering
//!
//! Turns one [`InboundEvent`] into the bordered, color-coded text block that
//! operators read in the service log:
//!
//! ```text
//! ╔════════════════════════════════════════════════════════════
//! ║ TIME: 2024-01-01T12:00:00.000Z
//! ║ STATION: CP1
//! ║ EVENT: MESSAGE
//! ║ ORIGIN: STATION
//! ║
//! ║ Message Type: REQUEST
//! ║ Message ID: 123
//! ║ Action: BootNotification
//! ║ Payload:
//! ║   {
//! ║     "vendor": "ACME"
//! ║   }
//! ╚════════════════════════════════════════════════════════════
//! ```
//!
//! Rendering is pure: the same event, timestamp and options always produce
//! the same bytes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{EventKind, InboundEvent};
use crate::support::ocpp_frame::{MessageKind, OcppMessage};

const BORDER_WIDTH: usize = 60;
const CONTENT_PREFIX: &str = "║ ";
const PAYLOAD_PREFIX: &str = "║   ";
const RESET: &str = "\x1b[0m";

// ── Highlight ──────────────────────────────────────────────────

/// Color category of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Highlight {
    Neutral,
    Info,
    Success,
    Alarm,
}

impl Highlight {
    /// ANSI foreground escape for this category.
    pub fn ansi(self) -> &'static str {
        match self {
            Self::Neutral => "\x1b[37m",
            Self::Info => "\x1b[34m",
            Self::Success => "\x1b[32m",
            Self::Alarm => "\x1b[31m",
        }
    }
}

// ── Options ────────────────────────────────────────────────────

/// How a Response frame is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseColorPolicy {
    /// Every Response is `Success`.
    #[default]
    Always,
    /// `Success` only when `payload.status == "Accepted"`, `Alarm` otherwise.
    StatusAccepted,
}

impl FromStr for ResponseColorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(Self::Always),
            "status-accepted" => Ok(Self::StatusAccepted),
            other => Err(format!(
                "unknown response color policy `{}` (expected `always` or `status-accepted`)",
                other
            )),
        }
    }
}

impl fmt::Display for ResponseColorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::StatusAccepted => f.write_str("status-accepted"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit ANSI color escapes. When off, blocks are plain text.
    pub ansi: bool,
    pub response_color: ResponseColorPolicy,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            ansi: true,
            response_color: ResponseColorPolicy::Always,
        }
    }
}

// ── Renderer ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render an event, decoding its `message` when the event is a message.
    pub fn render(&self, event: &InboundEvent, now: DateTime<Utc>) -> String {
        let decoded = match event.kind() {
            EventKind::Message => OcppMessage::decode(event.raw_message()).ok(),
            _ => None,
        };
        self.render_decoded(event, decoded.as_ref(), now)
    }

    /// Render an event whose message has already been decoded.
    ///
    /// `decoded` is ignored unless the event is a `message` event.
    pub fn render_decoded(
        &self,
        event: &InboundEvent,
        decoded: Option<&OcppMessage>,
        now: DateTime<Utc>,
    ) -> String {
        let kind = event.kind();
        let decoded = decoded.filter(|_| kind == EventKind::Message);
        let highlight = self.highlight(decoded);
        let event_label = event.event_label().to_uppercase();

        let mut lines = vec![String::new()];
        lines.push(format!("{}╔{}", self.paint(highlight), rule()));
        lines.push(format!("{}TIME: {}", CONTENT_PREFIX, timestamp_label(now)));
        lines.push(format!("{}STATION: {}", CONTENT_PREFIX, event.station_id()));
        lines.push(format!("{}EVENT: {}", CONTENT_PREFIX, event_label));

        match kind {
            EventKind::Connected | EventKind::Disconnected => {
                lines.push(CONTENT_PREFIX.to_string());
                lines.push(format!("{}Connection Status: {}", CONTENT_PREFIX, event_label));
            }
            EventKind::Message => {
                lines.push(format!(
                    "{}ORIGIN: {}",
                    CONTENT_PREFIX,
                    event.origin().to_uppercase()
                ));
                lines.push(CONTENT_PREFIX.to_string());

                match decoded {
                    Some(msg) => push_message_lines(&mut lines, msg),
                    None => lines.push(format!(
                        "{}Raw Message: {}",
                        CONTENT_PREFIX,
                        event.raw_message()
                    )),
                }
            }
            EventKind::Other(_) => {}
        }

        lines.push(format!("╚{}{}", rule(), self.reset()));
        lines.push(String::new());
        lines.join("\n")
    }

    /// Color for a block. `None` means "not a message" or "did not decode".
    pub fn highlight(&self, decoded: Option<&OcppMessage>) -> Highlight {
        let Some(msg) = decoded else {
            return Highlight::Neutral;
        };

        match msg.kind {
            MessageKind::Request => Highlight::Info,
            MessageKind::Response => match self.options.response_color {
                ResponseColorPolicy::Always => Highlight::Success,
                ResponseColorPolicy::StatusAccepted if msg.payload_status() == Some("Accepted") => {
                    Highlight::Success
                }
                ResponseColorPolicy::StatusAccepted => Highlight::Alarm,
            },
            MessageKind::Error => Highlight::Alarm,
            MessageKind::Unknown => Highlight::Neutral,
        }
    }

    /// Startup banner announcing where the server listens.
    pub fn banner(&self, addr: &str) -> String {
        [
            String::new(),
            format!("╔{}", rule()),
            format!("{}WEBHOOK SERVER", CONTENT_PREFIX),
            format!("{}Listening at http://{}", CONTENT_PREFIX, addr),
            format!("{}Webhook endpoint: http://{}/webhook", CONTENT_PREFIX, addr),
            format!("╚{}", rule()),
            String::new(),
        ]
        .join("\n")
    }

    fn paint(&self, highlight: Highlight) -> &'static str {
        if self.options.ansi {
            highlight.ansi()
        } else {
            ""
        }
    }

    fn reset(&self) -> &'static str {
        if self.options.ansi {
            RESET
        } else {
            ""
        }
    }
}

fn push_message_lines(lines: &mut Vec<String>, msg: &OcppMessage) {
    lines.push(format!("{}Message Type: {}", CONTENT_PREFIX, msg.kind));
    lines.push(format!(
        "{}Message ID: {}",
        CONTENT_PREFIX,
        display_value(&msg.message_id)
    ));
    if msg.has_action() {
        lines.push(format!("{}Action: {}", CONTENT_PREFIX, display_value(&msg.action)));
    }
    lines.push(format!("{}Payload:", CONTENT_PREFIX));

    let pretty =
        serde_json::to_string_pretty(&msg.payload).unwrap_or_else(|_| msg.payload.to_string());
    lines.extend(pretty.lines().map(|line| format!("{}{}", PAYLOAD_PREFIX, line)));
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-01-01T12:00:00.000Z`.
pub fn timestamp_label(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Strings are shown without quotes; anything else as compact JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn rule() -> String {
    "═".repeat(BORDER_WIDTH)
}
