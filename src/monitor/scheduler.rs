//! Periodic check timers, one per (project, category)
//!
//! Arming a key always cancels the timer already registered for it, so at
//! most one is live per key. A cancelled timer never starts another tick, and
//! a tick already in flight sees the cancellation through its
//! [`CancelSignal`] before it raises anything.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::monitor::project::Category;

type TimerKey = (String, Category);

/// Cancellation flag handed to every tick
#[derive(Debug, Clone)]
pub struct CancelSignal(watch::Receiver<bool>);

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    #[cfg(test)]
    pub(crate) fn channel() -> (watch::Sender<bool>, Self) {
        let (cancel, cancelled) = watch::channel(false);
        (cancel, Self(cancelled))
    }
}

struct Timer {
    period: Duration,
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Timer {
    fn stop(self) {
        let _ = self.cancel.send(true);
        self.task.abort();
    }
}

#[derive(Default)]
pub struct Scheduler {
    timers: Mutex<HashMap<TimerKey, Timer>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_timers(&self) -> MutexGuard<'_, HashMap<TimerKey, Timer>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the timer for `(project, category)`.
    ///
    /// The existing timer is cancelled first; a zero period, or one too large
    /// to schedule, leaves the key disarmed. Otherwise `tick` runs every
    /// `period_secs`, first one period from now. Returns whether a timer is
    /// now armed. Must be called within a tokio runtime.
    pub fn configure<F, Fut>(
        &self,
        project: &str,
        category: Category,
        period_secs: u64,
        tick: F,
    ) -> bool
    where
        F: Fn(CancelSignal) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let key = (project.to_string(), category);
        let mut timers = self.lock_timers();

        if let Some(timer) = timers.remove(&key) {
            debug!("Cancelling {} timer for {}", category, project);
            timer.stop();
        }

        if period_secs == 0 {
            info!("{} notifications disabled for {}", category, project);
            return false;
        }

        let period = Duration::from_secs(period_secs);
        let Some(start) = Instant::now().checked_add(period) else {
            warn!(
                "Not arming {} for {}: period of {}s is out of range",
                category, project, period_secs
            );
            return false;
        };
        let (cancel, mut cancelled) = watch::channel(false);
        let signal = CancelSignal(cancel.subscribe());
        let label = format!("{}/{}", project, category);

        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.changed() => break,
                    _ = interval.tick() => {}
                }

                if signal.is_cancelled() {
                    break;
                }
                debug!("Running scheduled check {}", label);
                tick(signal.clone()).await;
            }

            debug!("Timer {} stopped", label);
        });

        info!(
            "Checking {} for {} every {}s",
            category, project, period_secs
        );
        timers.insert(
            key,
            Timer {
                period,
                cancel,
                task,
            },
        );
        true
    }

    /// Returns true if a timer was armed for the key
    pub fn cancel(&self, project: &str, category: Category) -> bool {
        let timer = self.lock_timers().remove(&(project.to_string(), category));
        match timer {
            Some(timer) => {
                timer.stop();
                true
            }
            None => false,
        }
    }

    pub fn cancel_project(&self, project: &str) {
        for category in Category::ALL {
            self.cancel(project, category);
        }
    }

    pub fn cancel_all(&self) {
        let timers: Vec<Timer> = self.lock_timers().drain().map(|(_, timer)| timer).collect();
        for timer in timers {
            timer.stop();
        }
    }

    /// Period of the live timer for the key, if armed
    pub fn period(&self, project: &str, category: Category) -> Option<Duration> {
        self.lock_timers()
            .get(&(project.to_string(), category))
            .map(|timer| timer.period)
    }

    pub fn is_armed(&self, project: &str, category: Category) -> bool {
        self.period(project, category).is_some()
    }

    pub fn armed_count(&self) -> usize {
        self.lock_timers().len()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
