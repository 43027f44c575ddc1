// THEORY:
// The `HoldTimer` models press-and-hold: while the pointer is held down, a
// periodic tick keeps re-colouring the region under it. The timer runs as its
// own `tokio` task so it fires independently of the frame loop, and it hands
// each tick to the frame loop over an `mpsc` channel. The frame loop drains
// pending ticks at the start of a frame, so all scene mutation still happens
// on one thread, in frame order.
//
// Lifecycle rules:
// - `start` on a running timer does nothing.
// - `stop` aborts the task; calling it on an idle timer is harmless.
// - Dropping the timer stops it.
//
// `start` spawns onto the current tokio runtime. Outside a runtime it declines
// to start, which leaves press-and-hold inert without affecting anything else.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Default interval between hold ticks.
pub const DEFAULT_HOLD_INTERVAL: Duration = Duration::from_millis(50);

/// One firing of the hold timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldTick {
    /// Counts ticks since the current hold started, from 1.
    pub sequence: u64,
}

/// A cancelable periodic timer feeding `HoldTick`s into a channel.
pub struct HoldTimer {
    period: Duration,
    ticks_tx: mpsc::UnboundedSender<HoldTick>,
    task: Option<JoinHandle<()>>,
}

impl HoldTimer {
    /// Creates an idle timer and the receiving end of its tick channel.
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<HoldTick>) {
        let (ticks_tx, ticks_rx) = mpsc::unbounded_channel();
        let timer = Self {
            period,
            ticks_tx,
            task: None,
        };
        (timer, ticks_rx)
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Starts ticking one period from now. Returns false if the timer was already
    /// running, or if there is no tokio runtime to run it on.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            tracing::warn!("hold timer needs a tokio runtime; press-and-hold is disabled");
            return false;
        }

        let period = self.period;
        let tx = self.ticks_tx.clone();
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut sequence = 0;
            loop {
                interval.tick().await;
                sequence += 1;
                if tx.send(HoldTick { sequence }).is_err() {
                    // Receiver is gone; nobody is listening for ticks any more.
                    break;
                }
            }
        }));
        tracing::debug!(period_ms = period.as_millis() as u64, "hold timer started");
        true
    }

    /// Stops the timer. Returns false if it was not running.
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                let was_running = !task.is_finished();
                task.abort();
                if was_running {
                    tracing::debug!("hold timer stopped");
                }
                was_running
            }
            None => false,
        }
    }
}

impl Drop for HoldTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::error::TryRecvError;

    fn drain(rx: &mut mpsc::UnboundedReceiver<HoldTick>) -> Vec<HoldTick> {
        let mut ticks = Vec::new();
        while let Ok(tick) = rx.try_recv() {
            ticks.push(tick);
        }
        ticks
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_every_period_while_held() {
        let (mut timer, mut rx) = HoldTimer::new(Duration::from_millis(50));
        assert!(timer.start());

        tokio::time::sleep(Duration::from_millis(175)).await;
        let ticks = drain(&mut rx);
        assert_eq!(
            ticks,
            vec![HoldTick { sequence: 1 }, HoldTick { sequence: 2 }, HoldTick { sequence: 3 }]
        );
        assert!(timer.stop());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_further_ticks() {
        let (mut timer, mut rx) = HoldTimer::new(Duration::from_millis(50));
        timer.start();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(timer.stop());
        drain(&mut rx);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_keeps_a_single_timer() {
        let (mut timer, mut rx) = HoldTimer::new(Duration::from_millis(50));
        assert!(timer.start());
        assert!(!timer.start());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(drain(&mut rx).len(), 2);
        timer.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn restart_counts_from_one_again() {
        let (mut timer, mut rx) = HoldTimer::new(Duration::from_millis(50));
        timer.start();
        tokio::time::sleep(Duration::from_millis(110)).await;
        timer.stop();
        drain(&mut rx);

        timer.start();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(drain(&mut rx), vec![HoldTick { sequence: 1 }]);
    }

    #[test]
    fn stop_on_an_idle_timer_is_harmless() {
        let (mut timer, _rx) = HoldTimer::new(DEFAULT_HOLD_INTERVAL);
        assert!(!timer.is_running());
        assert!(!timer.stop());
    }

    #[test]
    fn start_without_a_runtime_declines() {
        let (mut timer, _rx) = HoldTimer::new(DEFAULT_HOLD_INTERVAL);
        assert!(!timer.start());
        assert!(!timer.is_running());
    }
}
