//! Webhook event record
//!
//! The body a station gateway POSTs for every connection change or OCPP frame.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::support::errors::EventError;

/// What happened at the station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Connected,
    Disconnected,
    Message,
    /// Any other label. Rendered with header lines only.
    Other(String),
}

impl EventKind {
    pub fn parse(label: &str) -> Self {
        match label {
            "connected" => Self::Connected,
            "disconnected" => Self::Disconnected,
            "message" => Self::Message,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Message => "message",
            Self::Other(label) => label,
        }
    }
}

/// Inbound webhook body.
///
/// Every field is optional on the wire. Absent fields render as empty strings
/// and are reported through [`InboundEvent::missing_fields`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub station_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub event: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub origin: Option<String>,
    /// Raw OCPP-J frame text.
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
}

impl InboundEvent {
    /// Build an event from any JSON body. Non-object bodies yield an event
    /// with every field absent.
    pub fn from_json(body: Value) -> Self {
        if body.is_object() {
            serde_json::from_value(body).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    pub fn kind(&self) -> EventKind {
        EventKind::parse(self.event.as_deref().unwrap_or_default())
    }

    pub fn station_id(&self) -> &str {
        self.station_id.as_deref().unwrap_or_default()
    }

    pub fn event_label(&self) -> &str {
        self.event.as_deref().unwrap_or_default()
    }

    pub fn origin(&self) -> &str {
        self.origin.as_deref().unwrap_or_default()
    }

    pub fn raw_message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    /// Required fields that were not supplied.
    ///
    /// `stationId` and `event` are always required; `origin` and `message`
    /// only for `message` events.
    pub fn missing_fields(&self) -> Vec<EventError> {
        let event = self.event_label().to_string();
        let mut required = vec![("stationId", &self.station_id), ("event", &self.event)];
        if self.kind() == EventKind::Message {
            required.push(("origin", &self.origin));
            required.push(("message", &self.message));
        }

        required
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(field, _)| EventError::MissingRequiredField {
                field,
                event: event.clone(),
            })
            .collect()
    }
}

/// Accept any JSON scalar or structure where a string is expected.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_camel_case_body() {
        let event = InboundEvent::from_json(json!({
            "stationId": "CP1",
            "event": "message",
            "origin": "station",
            "message": "[2,\"1\",\"Heartbeat\",{}]"
        }));
        assert_eq!(event.station_id(), "CP1");
        assert_eq!(event.kind(), EventKind::Message);
        assert_eq!(event.origin(), "station");
        assert_eq!(event.raw_message(), "[2,\"1\",\"Heartbeat\",{}]");
        assert!(event.missing_fields().is_empty());
    }

    #[test]
    fn non_string_fields_are_stringified() {
        let event = InboundEvent::from_json(json!({
            "stationId": 17,
            "event": "message",
            "origin": null,
            "message": [2, "1", "Heartbeat", {}]
        }));
        assert_eq!(event.station_id(), "17");
        assert_eq!(event.origin, None);
        assert_eq!(event.raw_message(), r#"[2,"1","Heartbeat",{}]"#);
    }

    #[test]
    fn non_object_body_is_empty_event() {
        assert_eq!(InboundEvent::from_json(json!([1, 2])), InboundEvent::default());
        assert_eq!(InboundEvent::from_json(json!("x")), InboundEvent::default());
    }

    #[test]
    fn event_kinds() {
        assert_eq!(EventKind::parse("connected"), EventKind::Connected);
        assert_eq!(EventKind::parse("disconnected"), EventKind::Disconnected);
        assert_eq!(EventKind::parse("message"), EventKind::Message);
        assert_eq!(
            EventKind::parse("Connected"),
            EventKind::Other("Connected".into())
        );
        assert_eq!(EventKind::Other("reboot".into()).as_str(), "reboot");
    }

    #[test]
    fn missing_origin_on_message_is_reported() {
        let event = InboundEvent::from_json(json!({
            "stationId": "CP1",
            "event": "message",
            "message": "[]"
        }));
        assert_eq!(
            event.missing_fields(),
            vec![EventError::MissingRequiredField {
                field: "origin",
                event: "message".into()
            }]
        );
    }

    #[test]
    fn origin_not_required_for_connection_events() {
        let event = InboundEvent::from_json(json!({"stationId": "CP2", "event": "disconnected"}));
        assert!(event.missing_fields().is_empty());

        let event = InboundEvent::from_json(json!({}));
        let fields: Vec<_> = event
            .missing_fields()
            .into_iter()
            .map(|EventError::MissingRequiredField { field, .. }| field)
            .collect();
        assert_eq!(fields, vec!["stationId", "event"]);
    }
}
