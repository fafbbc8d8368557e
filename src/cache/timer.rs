//! Tick sources for the eviction sweeper.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// A periodic tick source that can be stopped.
#[async_trait]
pub trait PeriodicTimer: Send {
    /// Wait for the next tick. Returns `None` once the source is closed or
    /// stopped; every later call returns `None` as well.
    async fn tick(&mut self) -> Option<()>;

    /// Close the tick source.
    fn stop(&mut self);
}

/// Wall-clock timer backed by [`tokio::time::Interval`].
///
/// The first tick fires one full period after creation. The timer closes when
/// [`TimerStop::stop`] is called or when every [`TimerStop`] is dropped.
pub struct IntervalTimer {
    interval: Interval,
    stop_rx: watch::Receiver<bool>,
    stopped: bool,
}

/// Remote stop handle for an [`IntervalTimer`].
#[derive(Clone)]
pub struct TimerStop {
    tx: Arc<watch::Sender<bool>>,
}

impl TimerStop {
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

impl IntervalTimer {
    pub fn new(period: Duration) -> (Self, TimerStop) {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let (tx, stop_rx) = watch::channel(false);
        let timer = Self {
            interval,
            stop_rx,
            stopped: false,
        };
        (timer, TimerStop { tx: Arc::new(tx) })
    }
}

#[async_trait]
impl PeriodicTimer for IntervalTimer {
    async fn tick(&mut self) -> Option<()> {
        let stop_requested = *self.stop_rx.borrow_and_update();
        if self.stopped || stop_requested {
            self.stop();
            return None;
        }

        tokio::select! {
            _ = self.interval.tick() => Some(()),
            _ = self.stop_rx.changed() => {
                self.stop();
                None
            }
        }
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Timer advanced by hand through its [`ManualTicker`].
///
/// The source closes when the ticker is dropped, so a test can fire a fixed
/// number of ticks and then let the loop run to completion.
pub struct ManualTimer {
    ticks: mpsc::UnboundedReceiver<()>,
    stopped: bool,
}

pub struct ManualTicker {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTimer {
    pub fn new() -> (Self, ManualTicker) {
        let (tx, ticks) = mpsc::unbounded_channel();
        (
            Self {
                ticks,
                stopped: false,
            },
            ManualTicker { tx },
        )
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl ManualTicker {
    /// Queue one tick. Returns false if the timer is gone or stopped.
    pub fn fire(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

#[async_trait]
impl PeriodicTimer for ManualTimer {
    async fn tick(&mut self) -> Option<()> {
        if self.stopped {
            return None;
        }
        self.ticks.recv().await
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.ticks.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn manual_timer_yields_fired_ticks_then_closes() {
        let (mut timer, ticker) = ManualTimer::new();
        assert!(ticker.fire());
        assert!(ticker.fire());
        drop(ticker);

        assert_eq!(timer.tick().await, Some(()));
        assert_eq!(timer.tick().await, Some(()));
        assert_eq!(timer.tick().await, None);
    }

    #[tokio::test]
    async fn stopped_manual_timer_rejects_ticks() {
        let (mut timer, ticker) = ManualTimer::new();
        timer.stop();

        assert!(timer.is_stopped());
        assert!(!ticker.fire());
        assert_eq!(timer.tick().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_timer_ticks_each_period() {
        let (mut timer, _stop) = IntervalTimer::new(Duration::from_secs(30));

        let started = Instant::now();
        assert_eq!(timer.tick().await, Some(()));
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn interval_timer_stops_promptly() {
        let (mut timer, stop) = IntervalTimer::new(Duration::from_secs(3600));

        let handle = tokio::spawn(async move { timer.tick().await });
        tokio::task::yield_now().await;
        stop.stop();

        assert_eq!(handle.await.expect("tick task joined"), None);
    }

    #[tokio::test]
    async fn dropping_every_stop_handle_closes_the_timer() {
        let (mut timer, stop) = IntervalTimer::new(Duration::from_secs(3600));
        drop(stop);

        assert_eq!(timer.tick().await, None);
        assert_eq!(timer.tick().await, None);
    }
}
