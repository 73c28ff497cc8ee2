//! Phoenix channel frames (JSON serializer v1)

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use shared::ChangeEvent;

use crate::{ClientError, ClientResult};

pub const HEARTBEAT_TOPIC: &str = "phoenix";

/// One socket frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

impl Frame {
    pub fn parse(text: &str) -> ClientResult<Self> {
        serde_json::from_str(text).map_err(|e| ClientError::Realtime(format!("bad frame: {e}")))
    }

    pub fn to_text(&self) -> ClientResult<String> {
        serde_json::to_string(self).map_err(Into::into)
    }

    /// Channel topic for a table in the public schema
    pub fn topic_for(table: &str) -> String {
        format!("realtime:public:{table}")
    }

    /// Join request subscribing to every change of `table`
    pub fn join(table: &str, access_token: Option<&str>, reference: u64) -> Self {
        let mut payload = json!({
            "config": {
                "postgres_changes": [
                    { "event": "*", "schema": "public", "table": table }
                ]
            }
        });
        if let Some(token) = access_token {
            payload["access_token"] = Value::String(token.to_string());
        }
        Self {
            topic: Self::topic_for(table),
            event: "phx_join".into(),
            payload,
            reference: Some(reference.to_string()),
        }
    }

    pub fn heartbeat(reference: u64) -> Self {
        Self {
            topic: HEARTBEAT_TOPIC.into(),
            event: "heartbeat".into(),
            payload: json!({}),
            reference: Some(reference.to_string()),
        }
    }

    /// Push a refreshed access token to a joined channel
    pub fn access_token(table: &str, token: &str, reference: u64) -> Self {
        Self {
            topic: Self::topic_for(table),
            event: "access_token".into(),
            payload: json!({ "access_token": token }),
            reference: Some(reference.to_string()),
        }
    }

    /// Row change carried by a `postgres_changes` frame
    pub fn change_event(&self) -> Option<ChangeEvent> {
        if self.event != "postgres_changes" {
            return None;
        }
        let data = self.payload.get("data")?;
        match serde_json::from_value(data.clone()) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(topic = %self.topic, "undecodable change payload: {e}");
                None
            }
        }
    }

    /// `phx_reply` with a non-ok status, or `phx_error` / `phx_close`
    pub fn is_channel_error(&self) -> bool {
        match self.event.as_str() {
            "phx_error" | "phx_close" => true,
            "phx_reply" => self.payload.get("status").and_then(Value::as_str) != Some("ok"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ChangeKind;

    #[test]
    fn test_join_frame() {
        let frame = Frame::join("shipments", Some("jwt"), 1);
        let value: Value = serde_json::from_str(&frame.to_text().unwrap()).unwrap();
        assert_eq!(value["topic"], "realtime:public:shipments");
        assert_eq!(value["event"], "phx_join");
        assert_eq!(value["ref"], "1");
        assert_eq!(value["payload"]["access_token"], "jwt");
        assert_eq!(
            value["payload"]["config"]["postgres_changes"][0]["table"],
            "shipments"
        );
    }

    #[test]
    fn test_parse_postgres_change() {
        let text = r#"{
            "topic": "realtime:public:shipments",
            "event": "postgres_changes",
            "payload": {
                "ids": [1],
                "data": {
                    "schema": "public",
                    "table": "shipments",
                    "commit_timestamp": "2024-05-01T10:00:00Z",
                    "type": "UPDATE",
                    "record": {"id": "s-1", "status": "delivered"},
                    "old_record": {"id": "s-1", "status": "transit"},
                    "errors": null
                }
            },
            "ref": null
        }"#;
        let frame = Frame::parse(text).unwrap();
        let event = frame.change_event().unwrap();
        assert_eq!(event.kind, ChangeKind::Update);
        assert_eq!(event.changed_str("status"), Some((Some("transit"), "delivered")));
        assert!(frame.reference.is_none());
    }

    #[test]
    fn test_channel_errors() {
        let ok = Frame::parse(
            r#"{"topic":"realtime:public:shipments","event":"phx_reply","payload":{"status":"ok","response":{}},"ref":"1"}"#,
        )
        .unwrap();
        assert!(!ok.is_channel_error());
        assert!(ok.change_event().is_none());

        let err = Frame::parse(
            r#"{"topic":"realtime:public:shipments","event":"phx_reply","payload":{"status":"error","response":{"reason":"unauthorized"}},"ref":"1"}"#,
        )
        .unwrap();
        assert!(err.is_channel_error());
        assert!(Frame::parse("not json").is_err());
    }
}
