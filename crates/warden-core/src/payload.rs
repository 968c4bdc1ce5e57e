//! Local ban payload codec
//!
//! Canonical shape: `{ "banned": true, "reason": "...", "timestamp": "<ISO8601>" }`.
//! Readers also accept the shapes written by earlier releases:
//! `{ "b": 1, "r": "..." }`, `{ "banned": 1, "r": "..." }`, and the bare
//! markers `true` / `1` (the old cookie value).

use crate::types::LocalBanFlag;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

/// Payload text that is not a recognisable ban flag
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct MalformedPayload(pub String);

#[derive(Serialize)]
struct CanonicalPayload<'a> {
    banned: bool,
    reason: &'a str,
    timestamp: String,
}

/// Render a flag as canonical payload text
pub fn encode_flag(flag: &LocalBanFlag) -> String {
    let payload = CanonicalPayload {
        banned: true,
        reason: &flag.reason,
        timestamp: flag.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    // A struct of a bool and two strings always serializes.
    serde_json::to_string(&payload).unwrap_or_else(|_| String::from("{\"banned\":true}"))
}

/// Parse payload text read from a channel.
///
/// `Ok(None)` means the channel holds an explicit negative or nothing.
/// Legacy payloads without a reason take `default_reason`; payloads
/// without a timestamp take `read_time`.
pub fn decode_flag(
    raw: &str,
    default_reason: &str,
    read_time: DateTime<Utc>,
) -> Result<Option<LocalBanFlag>, MalformedPayload> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| MalformedPayload(format!("not JSON: {e}")))?;

    match value {
        Value::Null => Ok(None),
        Value::Object(map) => {
            let marker = map
                .get("banned")
                .or_else(|| map.get("b"))
                .ok_or_else(|| MalformedPayload("object carries no ban marker".into()))?;
            if !is_truthy(marker) {
                return Ok(None);
            }
            let reason = map
                .get("reason")
                .or_else(|| map.get("r"))
                .and_then(Value::as_str)
                .filter(|r| !r.is_empty())
                .unwrap_or(default_reason);
            let timestamp = map
                .get("timestamp")
                .and_then(Value::as_str)
                .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or(read_time);
            Ok(Some(LocalBanFlag::new(reason, timestamp)))
        }
        Value::Bool(_) | Value::Number(_) => {
            if is_truthy(&value) {
                Ok(Some(LocalBanFlag::new(default_reason, read_time)))
            } else {
                Ok(None)
            }
        }
        other => Err(MalformedPayload(format!("unexpected payload shape: {other}"))),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn canonical_payload_round_trips() {
        let flag = LocalBanFlag::new("spam <script>", t0());
        let text = encode_flag(&flag);
        assert!(text.contains("\"banned\":true"));
        assert!(text.contains("2024-03-01T12:00:00.000Z"));
        let back = decode_flag(&text, "Access Denied", Utc::now()).unwrap();
        assert_eq!(back, Some(flag));
    }

    #[test]
    fn legacy_shapes_are_recognised() {
        let now = t0();
        let short = decode_flag(r#"{"b":1,"r":"toxic"}"#, "Access Denied", now).unwrap();
        assert_eq!(short, Some(LocalBanFlag::new("toxic", now)));

        let vault = decode_flag(r#"{"banned":1,"r":"raid"}"#, "Access Denied", now).unwrap();
        assert_eq!(vault.map(|f| f.reason), Some("raid".to_string()));

        let cookie = decode_flag("1", "Access Denied", now).unwrap();
        assert_eq!(cookie, Some(LocalBanFlag::new("Access Denied", now)));

        let bare = decode_flag("true", "Access Denied", now).unwrap();
        assert!(bare.is_some());
    }

    #[test]
    fn explicit_negatives_are_absent() {
        let now = t0();
        assert_eq!(decode_flag("", "x", now).unwrap(), None);
        assert_eq!(decode_flag("null", "x", now).unwrap(), None);
        assert_eq!(decode_flag("0", "x", now).unwrap(), None);
        assert_eq!(decode_flag(r#"{"b":0}"#, "x", now).unwrap(), None);
        assert_eq!(decode_flag(r#"{"banned":false,"reason":"r"}"#, "x", now).unwrap(), None);
    }

    #[test]
    fn garbage_is_malformed_not_banned() {
        let now = t0();
        assert_matches!(decode_flag("{not json", "x", now), Err(MalformedPayload(_)));
        assert_matches!(decode_flag(r#"{"reason":"r"}"#, "x", now), Err(_));
        assert_matches!(decode_flag(r#"["banned"]"#, "x", now), Err(_));
        assert_matches!(decode_flag(r#""banned""#, "x", now), Err(_));
    }
}
