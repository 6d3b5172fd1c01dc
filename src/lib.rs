//! CRM Notification Panel Library
//!
//! Mirrors booking and cancellation notifications from a CRM service into an
//! in-memory list, renders them as HTML and lets a facilitator mark them
//! processed.

pub mod config;
pub mod crm;
pub mod notifications;
pub mod panel;
pub mod render;
pub mod scheduler;
pub mod server;
pub mod staging;

// Re-export commonly used types for convenience
pub use notifications::{IncomingEvent, NotificationRecord, NotificationStore};
pub use panel::{HtmlDisplay, NotificationPanel, ProcessOutcome};
pub use server::{run_server, RequestsLoggingLevel};
