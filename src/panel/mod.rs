//! Notification panel: store owner, ingestion entry points and action dispatcher.

mod display;
mod notification_panel;

pub use display::{
    Acknowledger, CountTarget, DisplayState, DisplaySurface, HtmlDisplay, LOADING_INDICATOR_ID,
    NOTIFICATION_LIST_ID, PENDING_COUNT_ID, PROCESSED_COUNT_ID, TOTAL_COUNT_ID,
};
pub use notification_panel::{InjectionHandle, NotificationPanel, ProcessOutcome};
