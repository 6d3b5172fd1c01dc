//! The panel state object shared by every producer and the dispatcher.

use reqwest::StatusCode;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use super::display::{Acknowledger, CountTarget, DisplaySurface};
use crate::crm::{CrmClientError, NotificationsApi};
use crate::notifications::{IncomingEvent, NotificationCounts, NotificationRecord, NotificationStore};
use crate::render::render_panel;
use crate::staging::StagingArea;

/// Result of a "mark processed" request, as reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The CRM accepted the request.
    Processed,
    /// The CRM answered with a non-success status.
    Rejected(StatusCode),
    /// The request never got an answer.
    Failed,
}

impl ProcessOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            ProcessOutcome::Processed => "Notification marked as processed!",
            ProcessOutcome::Rejected(_) => "Failed to process notification",
            ProcessOutcome::Failed => "Error processing notification",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProcessOutcome::Processed)
    }
}

/// Owns the notification store and everything that reads or writes it.
///
/// Store mutations happen under a mutex that is never held across an await,
/// so every producer sees them as atomic steps.
pub struct NotificationPanel {
    store: Mutex<NotificationStore>,
    surface: Arc<dyn DisplaySurface>,
    acknowledger: Arc<dyn Acknowledger>,
    api: Arc<dyn NotificationsApi>,
    staging: Arc<dyn StagingArea>,
}

impl NotificationPanel {
    pub fn new(
        surface: Arc<dyn DisplaySurface>,
        acknowledger: Arc<dyn Acknowledger>,
        api: Arc<dyn NotificationsApi>,
        staging: Arc<dyn StagingArea>,
    ) -> Self {
        Self {
            store: Mutex::new(NotificationStore::new()),
            surface,
            acknowledger,
            api,
            staging,
        }
    }

    /// Handler for same-process producers, registered on this panel.
    pub fn injection_handle(self: &Arc<Self>) -> InjectionHandle {
        InjectionHandle {
            panel: Arc::clone(self),
        }
    }

    /// Store an event, normalizing raw booking payloads first.
    pub fn add_notification(&self, event: IncomingEvent) {
        let record = event.into_record();
        debug!("Adding notification {}", record.id);

        let mut store = self.lock_store();
        store.append(record);
        self.render_locked(&store);
    }

    /// Injection entry point for payloads of unknown shape.
    pub fn receive_notification(&self, payload: Value) -> anyhow::Result<()> {
        info!("Received notification");
        let event = IncomingEvent::classify(payload)?;
        self.add_notification(event);
        Ok(())
    }

    /// Replace the whole store with the CRM's current notification set.
    ///
    /// Failures are logged and leave the store untouched. Returns the number
    /// of fetched notifications on success.
    pub async fn refresh_from_remote(&self) -> Option<usize> {
        match self.api.fetch_notifications().await {
            Ok(records) => {
                let count = records.len();
                let mut store = self.lock_store();
                store.replace_all(records);
                self.render_locked(&store);
                info!("Fetched {} notifications from CRM", count);
                Some(count)
            }
            Err(e) => {
                error!("Error fetching notifications from CRM: {}", e);
                None
            }
        }
    }

    /// Move every staged event into the store and empty the staging slot.
    ///
    /// Entries of unknown shape are skipped. An unreadable slot is logged and
    /// left in place. Returns the number of stored events.
    pub fn drain_staging(&self) -> usize {
        let pending = match self.staging.read_pending() {
            Ok(pending) => pending,
            Err(e) => {
                error!("Error checking staged notifications: {:#}", e);
                return 0;
            }
        };
        if pending.is_empty() {
            return 0;
        }

        info!("Found {} staged notifications", pending.len());
        let mut added = 0;
        for payload in pending {
            match IncomingEvent::classify(payload) {
                Ok(event) => {
                    self.add_notification(event);
                    added += 1;
                }
                Err(e) => warn!("Skipping malformed staged notification: {}", e),
            }
        }

        if let Err(e) = self.staging.clear() {
            error!("Failed to clear staged notifications: {:#}", e);
        }
        added
    }

    /// Mark one notification processed on the CRM, then locally.
    ///
    /// The local flag is interim: the next full refresh overwrites it with
    /// whatever the CRM reports.
    pub async fn process_notification(&self, id: i64) -> ProcessOutcome {
        info!("Processing notification: {}", id);

        let outcome = match self.api.mark_processed(id).await {
            Ok(()) => {
                let mut store = self.lock_store();
                if store.mark_processed(id) {
                    self.render_locked(&store);
                } else {
                    debug!("Notification {} processed remotely but not held locally", id);
                }
                ProcessOutcome::Processed
            }
            Err(CrmClientError::Status(status)) => {
                warn!("CRM refused to process notification {}: {}", id, status);
                ProcessOutcome::Rejected(status)
            }
            Err(e) => {
                error!("Error processing notification {}: {}", id, e);
                ProcessOutcome::Failed
            }
        };

        self.acknowledger.acknowledge(outcome.message());
        outcome
    }

    /// Render the current store onto the display surface.
    pub fn render(&self) {
        let store = self.lock_store();
        self.render_locked(&store);
    }

    pub fn snapshot(&self) -> Vec<NotificationRecord> {
        self.lock_store().records().to_vec()
    }

    pub fn counts(&self) -> NotificationCounts {
        self.lock_store().counts()
    }

    // Called with the store lock held so that concurrent renders land in order.
    fn render_locked(&self, store: &NotificationStore) {
        let view = render_panel(store.records());
        self.surface.set_count(CountTarget::Total, view.counts.total);
        self.surface.set_count(CountTarget::Pending, view.counts.pending);
        self.surface.set_count(CountTarget::Processed, view.counts.processed);
        self.surface.hide_loading();
        self.surface.set_list_html(view.list_html);
    }

    fn lock_store(&self) -> MutexGuard<'_, NotificationStore> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Cloneable entry point through which co-resident producers hand events
/// straight to the panel.
#[derive(Clone)]
pub struct InjectionHandle {
    panel: Arc<NotificationPanel>,
}

impl InjectionHandle {
    pub fn receive(&self, payload: Value) -> anyhow::Result<()> {
        self.panel.receive_notification(payload)
    }
}
