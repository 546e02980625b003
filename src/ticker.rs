use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::info;

/// Logs elapsed time while a long call is outstanding.
///
/// Purely cosmetic. [`ElapsedTicker::stop`] signals and joins the task; if the
/// ticker is dropped without being stopped (e.g. the owning future was
/// cancelled) the task is aborted.
pub struct ElapsedTicker {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<u32>>,
}

impl ElapsedTicker {
    /// Spawn the ticker; the first line is logged after one `period`
    pub fn start(label: impl Into<String>, period: Duration) -> Self {
        let label = label.into();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let started = Instant::now();

        let handle = tokio::spawn(async move {
            let mut ticks = interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticks.tick().await;

            let mut count = 0u32;
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticks.tick() => {
                        count += 1;
                        info!(
                            "{}: elapsed time {:.2} seconds",
                            label,
                            started.elapsed().as_secs_f64()
                        );
                    }
                }
            }
            count
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Signal the ticker and wait for it to finish. Returns the number of
    /// lines it logged.
    pub async fn stop(mut self) -> u32 {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        match self.handle.take() {
            Some(handle) => handle.await.unwrap_or(0),
            None => 0,
        }
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
