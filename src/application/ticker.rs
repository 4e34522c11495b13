use std::{future::Future, time::Duration};

use tokio::time::{self, MissedTickBehavior};
use tokio_stream::{StreamExt, wrappers::IntervalStream};
use tracing::{info, warn};

use crate::{application::updater::CountdownUpdater, core::Snapshot};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1_000);

#[derive(Debug, Clone)]
pub struct TickerOptions {
    /// Delay between invocations. The first one fires immediately.
    pub interval: Duration,
    /// Stop after this many invocations, failed ones included.
    pub max_ticks: Option<u64>,
    /// Stop after the first invocation that reports the target reached.
    pub exit_on_expiry: bool,
}

impl Default for TickerOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_TICK_INTERVAL,
            max_ticks: None,
            exit_on_expiry: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TickLimit,
    Expired,
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct TickReport {
    pub invocations: u64,
    pub failures: u64,
    pub last_snapshot: Option<Snapshot>,
    pub stop: StopReason,
}

/// Repeats a [`CountdownUpdater`] on a fixed-delay schedule.
pub struct Ticker {
    updater: CountdownUpdater,
    options: TickerOptions,
}

impl Ticker {
    pub fn new(updater: CountdownUpdater, options: TickerOptions) -> Self {
        Self { updater, options }
    }

    /// Drives updates until a stop condition holds or `shutdown` resolves.
    ///
    /// Invocations never overlap: a slow update delays the following tick
    /// instead of queueing a burst. A failed update is logged and the next
    /// tick tries again.
    pub async fn run<F>(&self, shutdown: F) -> TickReport
    where
        F: Future<Output = ()>,
    {
        let mut interval = time::interval(self.options.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(interval);
        tokio::pin!(shutdown);

        let mut report = TickReport {
            invocations: 0,
            failures: 0,
            last_snapshot: None,
            stop: StopReason::Shutdown,
        };
        if self.options.max_ticks == Some(0) {
            report.stop = StopReason::TickLimit;
            return report;
        }
        info!(
            target_instant = %self.updater.target(),
            interval_ms = self.options.interval.as_millis() as u64,
            "countdown ticker started"
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    report.stop = StopReason::Shutdown;
                    break;
                }
                tick = ticks.next() => {
                    if tick.is_none() {
                        break;
                    }
                    report.invocations += 1;
                    match self.updater.update() {
                        Ok(snapshot) => {
                            let expired = snapshot.expired;
                            report.last_snapshot = Some(snapshot);
                            if expired && self.options.exit_on_expiry {
                                report.stop = StopReason::Expired;
                                break;
                            }
                        }
                        Err(err) => {
                            report.failures += 1;
                            self.release_display();
                            warn!(error = %err, tick = report.invocations, "countdown update failed");
                        }
                    }
                    if self
                        .options
                        .max_ticks
                        .is_some_and(|limit| report.invocations >= limit)
                    {
                        report.stop = StopReason::TickLimit;
                        break;
                    }
                }
            }
        }

        self.release_display();
        info!(
            invocations = report.invocations,
            failures = report.failures,
            stop = ?report.stop,
            "countdown ticker stopped"
        );
        report
    }

    fn release_display(&self) {
        if let Err(err) = self.updater.release() {
            warn!(error = %err, "could not release display");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        Error, Result, Target,
        ports::{Clock, DisplaySink},
    };
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicI64, AtomicU64, Ordering},
    };

    /// Advances by `step` on every read.
    struct SteppingClock {
        next: AtomicI64,
        step: i64,
    }

    impl Clock for SteppingClock {
        fn now_ms(&self) -> i64 {
            self.next.fetch_add(self.step, Ordering::SeqCst)
        }
    }

    #[derive(Default)]
    struct SecondsSink {
        seconds: Mutex<Vec<String>>,
        fail_first: AtomicU64,
        releases: AtomicU64,
    }

    impl DisplaySink for SecondsSink {
        fn set_field(&self, slot: &str, value: &str) -> Result<()> {
            if self.fail_first.load(Ordering::SeqCst) > 0 {
                self.fail_first.fetch_sub(1, Ordering::SeqCst);
                return Err(Error::MissingSlot(slot.to_string()));
            }
            if slot == "seconds" {
                self.seconds.lock().unwrap().push(value.to_string());
            }
            Ok(())
        }

        fn release(&self) -> Result<()> {
            self.releases.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn ticker(target_ms: i64, sink: Arc<SecondsSink>, options: TickerOptions) -> Ticker {
        let clock = Arc::new(SteppingClock {
            next: AtomicI64::new(0),
            step: 1_000,
        });
        Ticker::new(
            CountdownUpdater::new(Target::from_millis(target_ms), clock, sink),
            options,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn first_update_is_immediate_then_one_per_interval() {
        let sink = Arc::new(SecondsSink::default());
        let ticker = ticker(
            10_000,
            sink.clone(),
            TickerOptions {
                max_ticks: Some(3),
                ..Default::default()
            },
        );

        let started = time::Instant::now();
        let report = ticker.run(std::future::pending()).await;

        assert_eq!(report.stop, StopReason::TickLimit);
        assert_eq!(report.invocations, 3);
        assert_eq!(started.elapsed(), Duration::from_secs(2));
        assert_eq!(*sink.seconds.lock().unwrap(), vec!["10", "09", "08"]);
    }

    #[tokio::test(start_paused = true)]
    async fn exit_on_expiry_stops_at_first_zero() {
        let sink = Arc::new(SecondsSink::default());
        let ticker = ticker(
            2_000,
            sink.clone(),
            TickerOptions {
                exit_on_expiry: true,
                ..Default::default()
            },
        );

        let report = ticker.run(std::future::pending()).await;
        assert_eq!(report.stop, StopReason::Expired);
        assert_eq!(report.invocations, 3);
        assert!(report.last_snapshot.expect("snapshot").expired);
        assert_eq!(*sink.seconds.lock().unwrap(), vec!["02", "01", "00"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_update_is_retried_on_next_tick() {
        let sink = Arc::new(SecondsSink {
            fail_first: AtomicU64::new(1),
            ..Default::default()
        });
        let ticker = ticker(
            60_000,
            sink.clone(),
            TickerOptions {
                max_ticks: Some(2),
                ..Default::default()
            },
        );

        let report = ticker.run(std::future::pending()).await;
        assert_eq!(report.invocations, 2);
        assert_eq!(report.failures, 1);
        assert_eq!(*sink.seconds.lock().unwrap(), vec!["59"]);
        // Once before logging the failure, once when the schedule ends.
        assert_eq!(sink.releases.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_tick_limit_runs_no_update() {
        let sink = Arc::new(SecondsSink::default());
        let ticker = ticker(
            60_000,
            sink.clone(),
            TickerOptions {
                max_ticks: Some(0),
                ..Default::default()
            },
        );

        let report = ticker.run(std::future::pending()).await;
        assert_eq!(report.stop, StopReason::TickLimit);
        assert_eq!(report.invocations, 0);
        assert!(report.last_snapshot.is_none());
        assert!(sink.seconds.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_ends_the_schedule() {
        let sink = Arc::new(SecondsSink::default());
        let ticker = ticker(i64::MAX, sink, TickerOptions::default());

        let report = ticker
            .run(time::sleep(Duration::from_millis(4_500)))
            .await;
        assert_eq!(report.stop, StopReason::Shutdown);
        assert_eq!(report.invocations, 5);
    }
}
