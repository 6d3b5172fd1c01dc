//! Periodic task scheduling for the panel's polling adapters.

#[allow(clippy::module_inception)]
mod scheduler;
mod task;

pub use scheduler::PanelScheduler;
pub use task::{PeriodicTask, RemotePollTask, StagingDrainTask};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    struct CountingTask {
        id: &'static str,
        interval: Duration,
        run_time: Duration,
        starts: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PeriodicTask for CountingTask {
        fn id(&self) -> &'static str {
            self.id
        }

        fn description(&self) -> &'static str {
            "counts its runs"
        }

        fn interval(&self) -> Duration {
            self.interval
        }

        async fn run(&self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
            if !self.run_time.is_zero() {
                tokio::time::sleep(self.run_time).await;
            }
        }
    }

    fn counting(id: &'static str, interval_secs: u64, run_secs: u64) -> (Arc<CountingTask>, Arc<AtomicUsize>) {
        let starts = Arc::new(AtomicUsize::new(0));
        let task = Arc::new(CountingTask {
            id,
            interval: Duration::from_secs(interval_secs),
            run_time: Duration::from_secs(run_secs),
            starts: starts.clone(),
        });
        (task, starts)
    }

    async fn run_for(scheduler: PanelScheduler, token: CancellationToken, duration: Duration) {
        let mut scheduler = scheduler;
        let handle = tokio::spawn(async move { scheduler.run().await });
        tokio::time::sleep(duration).await;
        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_at_startup_and_on_interval() {
        let token = CancellationToken::new();
        let mut scheduler = PanelScheduler::new(token.clone());
        let (poll, poll_starts) = counting("poll", 3, 0);
        let (drain, drain_starts) = counting("drain", 5, 0);
        scheduler.register_task(poll);
        scheduler.register_task(drain);
        assert_eq!(scheduler.task_count(), 2);

        run_for(scheduler, token, Duration::from_millis(7_500)).await;

        // poll at 0, 3, 6 and drain at 0, 5
        assert_eq!(poll_starts.load(Ordering::SeqCst), 3);
        assert_eq!(drain_starts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skips_tick_while_previous_run_in_flight() {
        let token = CancellationToken::new();
        let mut scheduler = PanelScheduler::new(token.clone());
        let (slow, starts) = counting("slow", 3, 10);
        scheduler.register_task(slow);

        run_for(scheduler, token, Duration::from_millis(7_500)).await;

        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_shutdown_without_tasks() {
        let token = CancellationToken::new();
        let scheduler = PanelScheduler::new(token.clone());
        run_for(scheduler, token, Duration::from_secs(1)).await;
    }
}
