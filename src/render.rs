//! HTML rendering of the notification list.

use chrono::{DateTime, Local, NaiveDateTime};
use std::fmt::Write;

use crate::notifications::{count_records, NotificationCounts, NotificationRecord};

pub const EMPTY_STATE_HTML: &str = "<p>No notifications yet.</p>";

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What the display surface needs to show for one state of the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub counts: NotificationCounts,
    pub list_html: String,
}

pub fn render_panel(records: &[NotificationRecord]) -> PanelView {
    let counts = count_records(records);
    if records.is_empty() {
        return PanelView {
            counts,
            list_html: EMPTY_STATE_HTML.to_string(),
        };
    }

    let mut list_html = String::new();
    for record in records {
        render_item(&mut list_html, record);
    }
    PanelView { counts, list_html }
}

fn verb(record: &NotificationRecord) -> &'static str {
    if record.is_booking() {
        "booked"
    } else if record.is_cancellation() {
        "cancelled booking for"
    } else {
        "interacted with"
    }
}

/// Processed wins over cancellation, which wins over pending.
fn badge(record: &NotificationRecord) -> (&'static str, &'static str) {
    if record.processed {
        ("badge-processed", "Processed")
    } else if record.is_cancellation() {
        ("badge-danger", "Cancellation")
    } else {
        ("badge-pending", "Pending")
    }
}

fn render_item(out: &mut String, record: &NotificationRecord) {
    let (badge_class, badge_label) = badge(record);

    // Writing into a String cannot fail.
    let _ = write!(
        out,
        r#"<li class="notification-item">
    <div class="notification-details">
        <strong>{user}</strong>
        {verb}
        <strong>{title}</strong>
        <div>Event Date: {event_date}</div>
        <div>Received: {received_at}</div>
        <span class="badge {badge_class}">{badge_label}</span>
    </div>
    <div class="notification-actions">"#,
        user = escape_html(&record.user_name),
        verb = verb(record),
        title = escape_html(&record.event_title),
        event_date = escape_html(&format_timestamp(&record.event_date)),
        received_at = escape_html(&format_timestamp(&record.received_at)),
    );

    if !record.processed {
        let _ = write!(
            out,
            r#"
        <form method="post" action="/process/{id}">
            <button class="btn btn-sm" type="submit">Mark Processed</button>
        </form>"#,
            id = record.id
        );
    }

    out.push_str("\n    </div>\n</li>\n");
}

/// Format a stored timestamp for display.
///
/// Offset-carrying timestamps are shown in local time. Naive ones are already
/// local wall-clock values and are shown unchanged.
pub fn format_timestamp(value: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return parsed.with_timezone(&Local).format(DISPLAY_FORMAT).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, pattern) {
            return parsed.format(DISPLAY_FORMAT).to_string();
        }
    }
    "Invalid Date".to_string()
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
