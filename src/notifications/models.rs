//! Notification data models

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier handed over by the booking system.
///
/// The CRM stores integers but the booking front-end is free to send strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalId::Number(n) => write!(f, "{}", n),
            ExternalId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// What happened to the booking.
///
/// Values other than `booking` and `cancellation` are kept verbatim so that a
/// record survives a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationAction {
    Booking,
    Cancellation,
    Other(String),
}

impl From<String> for NotificationAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "booking" => NotificationAction::Booking,
            "cancellation" => NotificationAction::Cancellation,
            _ => NotificationAction::Other(value),
        }
    }
}

impl From<NotificationAction> for String {
    fn from(value: NotificationAction) -> Self {
        match value {
            NotificationAction::Booking => "booking".to_string(),
            NotificationAction::Cancellation => "cancellation".to_string(),
            NotificationAction::Other(s) => s,
        }
    }
}

/// A booking notification in the shape the panel stores and renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<ExternalId>,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub event_title: String,
    #[serde(default)]
    pub event_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facilitator_id: Option<ExternalId>,
    #[serde(default)]
    pub received_at: String,
    #[serde(default)]
    pub processed: bool,
    /// Absent means booking semantics.
    #[serde(
        default,
        deserialize_with = "deserialize_action",
        skip_serializing_if = "Option::is_none"
    )]
    pub action: Option<NotificationAction>,
}

impl NotificationRecord {
    pub fn is_cancellation(&self) -> bool {
        matches!(self.action, Some(NotificationAction::Cancellation))
    }

    pub fn is_booking(&self) -> bool {
        matches!(self.action, None | Some(NotificationAction::Booking))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ExternalId>,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEventDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ExternalId>,
    pub title: String,
    pub date_time: String,
}

/// A booking payload as emitted by the booking front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub user: RawUser,
    pub event: RawEventDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<ExternalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facilitator_id: Option<ExternalId>,
    #[serde(
        default,
        deserialize_with = "deserialize_action",
        skip_serializing_if = "Option::is_none"
    )]
    pub action: Option<NotificationAction>,
}

/// An empty `action` string counts as no action at all.
fn deserialize_action<'de, D>(deserializer: D) -> Result<Option<NotificationAction>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let action = Option::<String>::deserialize(deserializer)?;
    Ok(action.filter(|a| !a.is_empty()).map(NotificationAction::from))
}

impl RawEvent {
    /// Convert into a stored record, synthesizing the local id and receive time.
    pub fn normalize(self) -> NotificationRecord {
        NotificationRecord {
            id: synthesize_id(),
            booking_id: self.booking_id,
            user_name: self.user.name,
            user_email: self.user.email,
            event_title: self.event.title,
            event_date: self.event.date_time,
            facilitator_id: self.facilitator_id,
            received_at: now_timestamp(),
            processed: false,
            action: Some(self.action.unwrap_or(NotificationAction::Booking)),
        }
    }
}

/// An event handed to the panel by one of its producers.
#[derive(Debug, Clone, PartialEq)]
pub enum IncomingEvent {
    Raw(RawEvent),
    Canonical(NotificationRecord),
}

impl IncomingEvent {
    /// Decide the shape of an untyped payload.
    ///
    /// A payload carrying both `user` and `event` is a raw event, anything
    /// else must already be a stored record. Null, false, zero and empty
    /// strings count as missing.
    pub fn classify(value: serde_json::Value) -> serde_json::Result<Self> {
        let is_raw = is_present(value.get("user")) && is_present(value.get("event"));
        if is_raw {
            serde_json::from_value(value).map(IncomingEvent::Raw)
        } else {
            serde_json::from_value(value).map(IncomingEvent::Canonical)
        }
    }

    pub fn into_record(self) -> NotificationRecord {
        match self {
            IncomingEvent::Raw(raw) => raw.normalize(),
            IncomingEvent::Canonical(record) => record,
        }
    }
}

fn is_present(value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false)) => false,
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(_) => true,
    }
}

/// Unix milliseconds plus a random offset to keep same-millisecond events apart.
fn synthesize_id() -> i64 {
    chrono::Utc::now().timestamp_millis() + rand::rng().random_range(0..1000)
}

fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn yoga_raw() -> serde_json::Value {
        json!({
            "user": {"name": "A", "email": "a@x.com"},
            "event": {"title": "Yoga", "date_time": "2024-01-01T10:00:00Z"},
            "booking_id": 1
        })
    }

    #[test]
    fn test_action_serialization() {
        assert_eq!(
            serde_json::to_string(&NotificationAction::Cancellation).unwrap(),
            "\"cancellation\""
        );
        let other: NotificationAction = serde_json::from_str("\"rescheduled\"").unwrap();
        assert_eq!(other, NotificationAction::Other("rescheduled".to_string()));
        assert_eq!(serde_json::to_string(&other).unwrap(), "\"rescheduled\"");
    }

    #[test]
    fn test_classify_raw_event() {
        let event = IncomingEvent::classify(yoga_raw()).unwrap();
        assert!(matches!(event, IncomingEvent::Raw(_)));
    }

    #[test]
    fn test_normalize_raw_event() {
        let IncomingEvent::Raw(raw) = IncomingEvent::classify(yoga_raw()).unwrap() else {
            panic!("expected raw event");
        };
        let record = raw.normalize();

        assert_eq!(record.user_name, "A");
        assert_eq!(record.user_email, "a@x.com");
        assert_eq!(record.event_title, "Yoga");
        assert_eq!(record.event_date, "2024-01-01T10:00:00Z");
        assert_eq!(record.booking_id, Some(ExternalId::Number(1)));
        assert_eq!(record.action, Some(NotificationAction::Booking));
        assert!(!record.processed);
        assert!(record.received_at.ends_with('Z'));
        assert!(record.id >= chrono::Utc::now().timestamp_millis() - 60_000);
    }

    #[test]
    fn test_normalize_keeps_explicit_action() {
        let mut value = yoga_raw();
        value["action"] = json!("cancellation");
        let record = IncomingEvent::classify(value).unwrap().into_record();
        assert_eq!(record.action, Some(NotificationAction::Cancellation));
        assert!(record.is_cancellation());
    }

    #[test]
    fn test_canonical_record_passes_through_unchanged() {
        let value = json!({
            "id": 7,
            "booking_id": 12,
            "user_name": "Bob",
            "user_email": "bob@example.com",
            "event_title": "Pottery",
            "event_date": "2024-03-01T18:00:00",
            "facilitator_id": 3,
            "received_at": "2024-02-20T09:15:00",
            "processed": true
        });
        let expected: NotificationRecord = serde_json::from_value(value.clone()).unwrap();

        let event = IncomingEvent::classify(value.clone()).unwrap();
        assert!(matches!(event, IncomingEvent::Canonical(_)));
        let record = event.into_record();
        assert_eq!(record, expected);
        assert_eq!(serde_json::to_value(&record).unwrap(), value);
    }

    #[test]
    fn test_classify_rejects_raw_without_user_name() {
        let value = json!({"user": {"email": "a@x.com"}, "event": {"title": "Yoga", "date_time": "x"}});
        assert!(IncomingEvent::classify(value).is_err());
    }

    #[test]
    fn test_classify_rejects_canonical_without_id() {
        assert!(IncomingEvent::classify(json!({"user_name": "A"})).is_err());
    }

    #[test]
    fn test_missing_action_means_booking() {
        let record: NotificationRecord = serde_json::from_value(json!({"id": 1})).unwrap();
        assert!(record.action.is_none());
        assert!(record.is_booking());
        assert!(!record.is_cancellation());
    }

    #[test]
    fn test_empty_action_means_booking() {
        let mut value = yoga_raw();
        value["action"] = json!("");
        let record = IncomingEvent::classify(value).unwrap().into_record();
        assert_eq!(record.action, Some(NotificationAction::Booking));

        let record = IncomingEvent::classify(json!({"id": 1, "action": ""}))
            .unwrap()
            .into_record();
        assert!(record.action.is_none());
        assert!(record.is_booking());

        let record: NotificationRecord =
            serde_json::from_value(json!({"id": 2, "action": null})).unwrap();
        assert!(record.action.is_none());
    }

    #[test]
    fn test_null_user_and_event_classify_as_canonical() {
        let event = IncomingEvent::classify(json!({"id": 5, "user": null, "event": null})).unwrap();
        assert!(matches!(event, IncomingEvent::Canonical(ref r) if r.id == 5));

        let event = IncomingEvent::classify(json!({"id": 6, "user": "", "event": {}})).unwrap();
        assert!(matches!(event, IncomingEvent::Canonical(_)));
    }

    #[test]
    fn test_external_id_accepts_strings() {
        let record: NotificationRecord =
            serde_json::from_value(json!({"id": 1, "booking_id": "bk-9"})).unwrap();
        assert_eq!(record.booking_id, Some(ExternalId::Text("bk-9".to_string())));
        assert_eq!(record.booking_id.unwrap().to_string(), "bk-9");
    }
}
