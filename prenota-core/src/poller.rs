use std::{future::Future, sync::Arc, time::Duration};

use log::debug;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

use crate::{Arrivals, Dashboard, PanelApi};

pub const BOOKINGS_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const SETTINGS_POLL_INTERVAL: Duration = Duration::from_secs(25);

/// Periodically runs a refresh while the page is visible.
///
/// Visibility comes from a [watch] channel: ticks are skipped while it reads
/// `false`, and becoming visible refreshes right away. The task ends when the
/// visibility sender is dropped or the [PollHandle] is stopped.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    every: Duration,
}

/// Keeps a polling task alive. Dropping it stops the task.
#[derive(Debug)]
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl Poller {
    pub fn new(every: Duration) -> Self {
        Self { every }
    }

    pub fn spawn<F, Fut>(self, mut visibility: watch::Receiver<bool>, mut tick: F) -> PollHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let every = self.every;

        let task = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if *visibility.borrow() {
                            tick().await;
                        }
                    }
                    changed = visibility.changed() => {
                        if changed.is_err() {
                            break;
                        }

                        if *visibility.borrow_and_update() {
                            tick().await;
                            ticker.reset();
                        }
                    }
                }
            }

            debug!("Poller stopped");
        });

        PollHandle { task }
    }
}

impl PollHandle {
    pub fn stop(self) {}

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Keeps the dashboard's bookings fresh, sending arrivals so the caller can alert.
pub fn poll_bookings<A>(
    dashboard: Arc<Dashboard<A>>,
    visibility: watch::Receiver<bool>,
    arrivals: mpsc::UnboundedSender<Arrivals>,
) -> PollHandle
where
    A: PanelApi + 'static,
{
    Poller::new(BOOKINGS_POLL_INTERVAL).spawn(visibility, move || {
        let dashboard = dashboard.clone();
        let arrivals = arrivals.clone();

        async move {
            if let Ok(new) = dashboard.refresh().await {
                if !new.is_empty() {
                    let _ = arrivals.send(new);
                }
            }
        }
    })
}

pub fn poll_settings<A>(dashboard: Arc<Dashboard<A>>, visibility: watch::Receiver<bool>) -> PollHandle
where
    A: PanelApi + 'static,
{
    Poller::new(SETTINGS_POLL_INTERVAL).spawn(visibility, move || {
        let dashboard = dashboard.clone();

        async move {
            dashboard.refresh_settings().await;
        }
    })
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::time::sleep;

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() -> futures_util::future::Ready<()> + Send) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();

        let tick = move || {
            inner.fetch_add(1, Ordering::SeqCst);
            futures_util::future::ready(())
        };

        (count, tick)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_while_visible() {
        let (count, tick) = counter();
        let (_visible, visibility) = watch::channel(true);

        let _handle = Poller::new(Duration::from_secs(30)).spawn(visibility, tick);

        sleep(Duration::from_secs(65)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3, "at 0s, 30s and 60s");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_skips_and_visible_refreshes() {
        let (count, tick) = counter();
        let (visible, visibility) = watch::channel(false);

        let _handle = Poller::new(Duration::from_secs(30)).spawn(visibility, tick);

        sleep(Duration::from_secs(95)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0, "hidden the whole time");

        visible.send(true).unwrap();
        sleep(Duration::from_millis(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1, "refreshed on becoming visible");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop() {
        let (count, tick) = counter();
        let (_visible, visibility) = watch::channel(true);

        let handle = Poller::new(Duration::from_secs(30)).spawn(visibility, tick);

        sleep(Duration::from_secs(1)).await;
        handle.stop();

        sleep(Duration::from_secs(120)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ends_without_visibility_sender() {
        let (_count, tick) = counter();
        let (visible, visibility) = watch::channel(true);

        let handle = Poller::new(Duration::from_secs(30)).spawn(visibility, tick);
        drop(visible);

        sleep(Duration::from_secs(1)).await;
        assert!(handle.is_finished());
    }
}
