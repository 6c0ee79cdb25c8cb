//! Fixed-interval poll scheduling.

use std::time::Duration;

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

/// Handle to a running poll loop. Dropping it stops the loop.
#[derive(Debug)]
pub struct PollerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Asks the loop to stop. Ticks already handed out keep running.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Stops the loop and waits for it to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Err(error) = (&mut self.task).await {
            log::warn!("Poller task ended abnormally: {error}");
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Calls `on_tick` immediately and then once every `period` until stopped.
///
/// `on_tick` must not block; it is expected to spawn the actual poll so a
/// slow request never delays the schedule. Late ticks are delayed rather than
/// bunched up. Must be called within a tokio runtime.
pub fn start<F>(period: Duration, mut on_tick: F) -> PollerHandle
where
    F: FnMut() + Send + 'static,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let task = tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => on_tick(),
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }
        log::info!("Notification poller stopped");
    });

    log::info!("Polling notifications every {}s", period.as_secs());
    PollerHandle { stop_tx, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    fn counting() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        (ticks, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_at_startup_and_every_period() {
        let (ticks, on_tick) = counting();
        let _handle = start(Duration::from_secs(30), on_tick);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_loop() {
        let (ticks, on_tick) = counting();
        let handle = start(Duration::from_secs(30), on_tick);
        time::sleep(Duration::from_secs(1)).await;

        handle.shutdown().await;
        time::sleep(Duration::from_secs(120)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_polling() {
        let (ticks, on_tick) = counting();
        let handle = start(Duration::from_secs(60), on_tick);
        time::sleep(Duration::from_secs(1)).await;
        drop(handle);

        time::sleep(Duration::from_secs(300)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }
}
