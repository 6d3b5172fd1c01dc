use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::task::PeriodicTask;

struct ScheduledTask {
    task: Arc<dyn PeriodicTask>,
    next_run_at: Instant,
    running: Option<JoinHandle<()>>,
}

/// Runs the panel's periodic tasks.
///
/// Every task runs once when the scheduler starts and then every interval.
/// A run is skipped while the previous run of the same task is in flight.
pub struct PanelScheduler {
    tasks: HashMap<&'static str, ScheduledTask>,
    shutdown_token: CancellationToken,
}

impl PanelScheduler {
    pub fn new(shutdown_token: CancellationToken) -> Self {
        Self {
            tasks: HashMap::new(),
            shutdown_token,
        }
    }

    /// Register a task with the scheduler.
    pub fn register_task(&mut self, task: Arc<dyn PeriodicTask>) {
        info!(
            "Registering task: {} every {:?} - {}",
            task.id(),
            task.interval(),
            task.description()
        );
        self.tasks.insert(
            task.id(),
            ScheduledTask {
                task,
                next_run_at: Instant::now(),
                running: None,
            },
        );
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Main scheduler loop. Returns once the shutdown token is cancelled.
    pub async fn run(&mut self) {
        info!("Starting panel scheduler with {} tasks", self.tasks.len());

        loop {
            self.cleanup_completed_tasks().await;
            self.run_due_tasks();

            let next_wake = self.next_wake();
            debug!(
                "Scheduler sleeping for {:?}",
                next_wake.saturating_duration_since(Instant::now())
            );

            tokio::select! {
                _ = tokio::time::sleep_until(next_wake) => {}
                _ = self.shutdown_token.cancelled() => {
                    info!("Scheduler received shutdown signal");
                    self.shutdown();
                    break;
                }
            }
        }

        info!("Panel scheduler stopped");
    }

    async fn cleanup_completed_tasks(&mut self) {
        for scheduled in self.tasks.values_mut() {
            let finished = scheduled
                .running
                .as_ref()
                .is_some_and(|handle| handle.is_finished());
            if !finished {
                continue;
            }
            if let Some(handle) = scheduled.running.take() {
                if let Err(e) = handle.await {
                    error!("Task {} panicked: {}", scheduled.task.id(), e);
                }
            }
        }
    }

    fn run_due_tasks(&mut self) {
        let now = Instant::now();
        for scheduled in self.tasks.values_mut() {
            if scheduled.next_run_at > now {
                continue;
            }
            // Next start is counted from the planned start, not from completion.
            scheduled.next_run_at += scheduled.task.interval();
            if scheduled.next_run_at <= now {
                scheduled.next_run_at = now + scheduled.task.interval();
            }

            if scheduled.running.is_some() {
                debug!("Task {} still running, skipping this tick", scheduled.task.id());
                continue;
            }

            let task = Arc::clone(&scheduled.task);
            scheduled.running = Some(tokio::spawn(async move {
                debug!("Running task {}", task.id());
                task.run().await;
            }));
        }
    }

    fn next_wake(&self) -> Instant {
        self.tasks
            .values()
            .map(|scheduled| scheduled.next_run_at)
            .min()
            .unwrap_or_else(|| Instant::now() + Duration::from_secs(60))
    }

    fn shutdown(&mut self) {
        for scheduled in self.tasks.values_mut() {
            if let Some(handle) = scheduled.running.take() {
                handle.abort();
            }
        }
    }
}
