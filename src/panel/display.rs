//! Display surface the panel renders onto.

use std::sync::Mutex;

use crate::render::escape_html;

/// Stable element ids of the dashboard page.
pub const TOTAL_COUNT_ID: &str = "total-notifications";
pub const PENDING_COUNT_ID: &str = "pending-notifications";
pub const PROCESSED_COUNT_ID: &str = "processed-notifications";
pub const LOADING_INDICATOR_ID: &str = "notifications-loading";
pub const NOTIFICATION_LIST_ID: &str = "notification-list";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountTarget {
    Total,
    Pending,
    Processed,
}

impl CountTarget {
    pub fn element_id(&self) -> &'static str {
        match self {
            CountTarget::Total => TOTAL_COUNT_ID,
            CountTarget::Pending => PENDING_COUNT_ID,
            CountTarget::Processed => PROCESSED_COUNT_ID,
        }
    }
}

/// Where rendered output goes.
///
/// All targets exist from construction on, before the first render.
pub trait DisplaySurface: Send + Sync {
    fn set_count(&self, target: CountTarget, value: usize);

    fn hide_loading(&self);

    /// Replace the content of the notification list container and show it.
    fn set_list_html(&self, html: String);
}

/// Blocking acknowledgment shown to the user after an action.
pub trait Acknowledger: Send + Sync {
    fn acknowledge(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub total: usize,
    pub pending: usize,
    pub processed: usize,
    pub loading: bool,
    pub list_visible: bool,
    pub list_html: String,
    pub acknowledgment: Option<String>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            total: 0,
            pending: 0,
            processed: 0,
            loading: true,
            list_visible: false,
            list_html: String::new(),
            acknowledgment: None,
        }
    }
}

/// In-memory page model served by the panel's HTTP server.
#[derive(Default)]
pub struct HtmlDisplay {
    state: Mutex<DisplayState>,
}

impl HtmlDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DisplayState {
        self.lock().clone()
    }

    /// Take the pending acknowledgment, if any, so it is shown once.
    pub fn take_acknowledgment(&self) -> Option<String> {
        self.lock().acknowledgment.take()
    }

    /// Full dashboard page for the current state.
    pub fn page_html(&self) -> String {
        let mut state = self.lock();
        let banner = match state.acknowledgment.take() {
            Some(message) => format!(
                "<div class=\"alert\" role=\"alert\">{}</div>\n",
                escape_html(&message)
            ),
            None => String::new(),
        };
        let loading_style = if state.loading { "block" } else { "none" };
        let list_style = if state.list_visible { "block" } else { "none" };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Facilitator Notifications</title>
</head>
<body>
{banner}<div class="stats">
    <div>Total: <span id="{total_id}">{total}</span></div>
    <div>Pending: <span id="{pending_id}">{pending}</span></div>
    <div>Processed: <span id="{processed_id}">{processed}</span></div>
</div>
<div id="{loading_id}" style="display: {loading_style}">Loading notifications...</div>
<ul id="{list_id}" style="display: {list_style}">
{list_html}
</ul>
</body>
</html>
"#,
            total_id = CountTarget::Total.element_id(),
            pending_id = CountTarget::Pending.element_id(),
            processed_id = CountTarget::Processed.element_id(),
            loading_id = LOADING_INDICATOR_ID,
            list_id = NOTIFICATION_LIST_ID,
            total = state.total,
            pending = state.pending,
            processed = state.processed,
            list_html = state.list_html,
        )
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DisplayState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DisplaySurface for HtmlDisplay {
    fn set_count(&self, target: CountTarget, value: usize) {
        let mut state = self.lock();
        match target {
            CountTarget::Total => state.total = value,
            CountTarget::Pending => state.pending = value,
            CountTarget::Processed => state.processed = value,
        }
    }

    fn hide_loading(&self) {
        self.lock().loading = false;
    }

    fn set_list_html(&self, html: String) {
        let mut state = self.lock();
        state.list_html = html;
        state.list_visible = true;
    }
}

impl Acknowledger for HtmlDisplay {
    fn acknowledge(&self, message: &str) {
        self.lock().acknowledgment = Some(message.to_string());
    }
}
