//! Shared test infrastructure for end-to-end tests.

#![allow(dead_code)]

mod fake_crm;

pub use fake_crm::{FakeCrmServer, TEST_TOKEN};

use crm_notification_panel::crm::{CrmClient, StaticToken};
use crm_notification_panel::panel::{HtmlDisplay, NotificationPanel};
use crm_notification_panel::staging::StagingArea;
use std::sync::Arc;

/// A panel wired to a CRM client pointing at `base_url`.
pub fn panel_for(
    base_url: &str,
    token: &str,
    staging: Arc<dyn StagingArea>,
) -> (Arc<NotificationPanel>, Arc<HtmlDisplay>) {
    let client = CrmClient::new(
        base_url.to_string(),
        Arc::new(StaticToken::new(token)),
        Some(std::time::Duration::from_secs(5)),
    )
    .expect("Failed to create CRM client");
    let display = Arc::new(HtmlDisplay::new());
    let panel = Arc::new(NotificationPanel::new(
        display.clone(),
        display.clone(),
        Arc::new(client),
        staging,
    ));
    (panel, display)
}

pub fn canonical(id: i64, user_name: &str, processed: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "booking_id": id * 10,
        "user_name": user_name,
        "user_email": format!("{}@example.com", user_name.to_lowercase()),
        "event_title": "Morning Yoga",
        "event_date": "2024-01-01T10:00:00",
        "facilitator_id": 1,
        "received_at": "2023-12-31T08:00:00.000001",
        "processed": processed
    })
}

pub fn raw(name: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "booking_id": 1,
        "facilitator_id": 2,
        "user": {"id": 3, "name": name, "email": "a@x.com"},
        "event": {"id": 4, "title": title, "date_time": "2024-01-01T10:00:00Z"}
    })
}
