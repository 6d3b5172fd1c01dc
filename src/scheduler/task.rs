use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::panel::NotificationPanel;

/// A panel activity that runs once at startup and then on a fixed interval.
///
/// Implementations swallow their own failures: a failed run simply waits for
/// the next tick.
#[async_trait]
pub trait PeriodicTask: Send + Sync {
    /// Unique identifier for this task.
    fn id(&self) -> &'static str;

    /// Description of what this task does.
    fn description(&self) -> &'static str;

    /// Time between two consecutive starts.
    fn interval(&self) -> Duration;

    async fn run(&self);
}

/// Full-state refresh from the CRM.
pub struct RemotePollTask {
    panel: Arc<NotificationPanel>,
    interval: Duration,
}

impl RemotePollTask {
    pub fn new(panel: Arc<NotificationPanel>, interval: Duration) -> Self {
        Self { panel, interval }
    }
}

#[async_trait]
impl PeriodicTask for RemotePollTask {
    fn id(&self) -> &'static str {
        "remote_poll"
    }

    fn description(&self) -> &'static str {
        "Replaces the notification list with the CRM's current set"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) {
        #[cfg(feature = "slowdown")]
        {
            use rand::Rng;
            let delay_ms = rand::rng().random_range(0..1500);
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        self.panel.refresh_from_remote().await;
    }
}

/// Drain of the same-device staging slot.
pub struct StagingDrainTask {
    panel: Arc<NotificationPanel>,
    interval: Duration,
}

impl StagingDrainTask {
    pub fn new(panel: Arc<NotificationPanel>, interval: Duration) -> Self {
        Self { panel, interval }
    }
}

#[async_trait]
impl PeriodicTask for StagingDrainTask {
    fn id(&self) -> &'static str {
        "staging_drain"
    }

    fn description(&self) -> &'static str {
        "Moves events from the staging area into the notification list"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) {
        self.panel.drain_staging();
    }
}
