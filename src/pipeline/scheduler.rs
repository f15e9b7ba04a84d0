// src/pipeline/scheduler.rs

//! Tick-driven scheduling of checkers and delayed announcements.

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::error::{AppError, Result};
use crate::notify::{Announcement, Notifier, render};
use crate::pipeline::checker::Checker;
use crate::storage::SnapshotStore;

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn lcm(a: u64, b: u64) -> u64 {
    if a == 0 || b == 0 {
        return a.max(b);
    }
    (a / gcd(a, b)).saturating_mul(b)
}

/// Wrapping tick counter.
///
/// The cycle is the least common multiple of all intervals, so every
/// interval divides it and wrapping never shifts a checker's phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickCounter {
    current: u64,
    cycle: u64,
}

impl Default for TickCounter {
    fn default() -> Self {
        Self {
            current: 0,
            cycle: 1,
        }
    }
}

impl TickCounter {
    pub fn new(intervals: impl IntoIterator<Item = u32>) -> Self {
        let mut counter = Self::default();
        for interval in intervals {
            counter.include(interval);
        }
        counter
    }

    /// Widen the cycle so that `interval` divides it.
    pub fn include(&mut self, interval: u32) {
        self.cycle = lcm(self.cycle, u64::from(interval.max(1)));
        if self.current >= self.cycle {
            self.current = 0;
        }
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn is_due(&self, interval: u32) -> bool {
        interval > 0 && self.current % u64::from(interval) == 0
    }

    pub fn advance(&mut self) {
        self.current += 1;
        if self.current >= self.cycle {
            self.current = 0;
        }
    }
}

/// An announcement waiting for its countdown to run out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayedAnnouncement {
    pub announcement: Announcement,
    pub remaining_ticks: u32,
}

/// FIFO of delayed announcements, drained once per tick.
#[derive(Debug, Default)]
pub struct DelayedQueue {
    entries: VecDeque<DelayedAnnouncement>,
}

impl DelayedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, announcement: Announcement, delay_ticks: u32) {
        self.entries.push_back(DelayedAnnouncement {
            announcement,
            remaining_ticks: delay_ticks,
        });
    }

    /// Count every entry down by one and take out the ones that reached zero.
    ///
    /// An entry pushed with delay N comes out of the N-th drain.
    pub fn drain(&mut self) -> Vec<Announcement> {
        let mut due = Vec::new();
        let mut kept = VecDeque::with_capacity(self.entries.len());

        for mut entry in self.entries.drain(..) {
            entry.remaining_ticks = entry.remaining_ticks.saturating_sub(1);
            if entry.remaining_ticks == 0 {
                due.push(entry.announcement);
            } else {
                kept.push_back(entry);
            }
        }

        self.entries = kept;
        due
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DelayedAnnouncement> {
        self.entries.iter()
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    /// Keys of the checkers that were due, in run order.
    pub ran: Vec<String>,
    /// Keys of the checkers whose run failed.
    pub failed: Vec<String>,
    /// Announcements handed to the notifier.
    pub dispatched: usize,
}

/// Runs checkers on their intervals and dispatches their announcements.
pub struct Scheduler {
    checkers: Vec<Box<dyn Checker>>,
    keys: HashSet<String>,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn Notifier>,
    queue: DelayedQueue,
    counter: TickCounter,
}

impl Scheduler {
    pub fn new(store: Arc<dyn SnapshotStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            checkers: Vec::new(),
            keys: HashSet::new(),
            store,
            notifier,
            queue: DelayedQueue::new(),
            counter: TickCounter::default(),
        }
    }

    /// Add a checker. Keys must be unique and intervals non-zero.
    pub fn register(&mut self, checker: Box<dyn Checker>) -> Result<()> {
        let key = checker.key().to_string();
        if checker.interval_ticks() == 0 {
            return Err(AppError::validation(format!(
                "checker '{key}' has a zero interval"
            )));
        }
        if !self.keys.insert(key.clone()) {
            return Err(AppError::validation(format!(
                "checker '{key}' is already registered"
            )));
        }

        self.counter.include(checker.interval_ticks());
        log::info!(
            "Registered checker '{}' (every {} tick(s), delay {})",
            key,
            checker.interval_ticks(),
            checker.announce_delay_ticks()
        );
        self.checkers.push(checker);
        Ok(())
    }

    pub fn checker_keys(&self) -> Vec<&str> {
        self.checkers.iter().map(|c| c.key()).collect()
    }

    pub fn counter(&self) -> &TickCounter {
        &self.counter
    }

    pub fn queue(&self) -> &DelayedQueue {
        &self.queue
    }

    async fn dispatch(notifier: &dyn Notifier, announcement: &Announcement) {
        log::info!("News created: {}", announcement.summary);
        if let Err(e) = notifier.send(announcement).await {
            log::error!("Failed to deliver announcement: {}", e);
        }
    }

    /// Run one tick: due checkers, one queue drain, then queue this tick's
    /// delayed announcements and advance.
    pub async fn tick(&mut self) -> TickReport {
        let mut report = TickReport {
            tick: self.counter.current(),
            ..TickReport::default()
        };

        let mut held = Vec::new();
        for checker in &self.checkers {
            if !self.counter.is_due(checker.interval_ticks()) {
                continue;
            }
            report.ran.push(checker.key().to_string());

            let events = match checker.run_once(self.store.as_ref()).await {
                Ok(events) => events,
                Err(e) => {
                    log::warn!("[{}] Check skipped: {}", checker.key(), e);
                    report.failed.push(checker.key().to_string());
                    continue;
                }
            };

            let delay = checker.announce_delay_ticks();
            for announcement in render(&events) {
                if delay == 0 {
                    Self::dispatch(self.notifier.as_ref(), &announcement).await;
                    report.dispatched += 1;
                } else {
                    log::debug!(
                        "[{}] Holding announcement for {} tick(s)",
                        checker.key(),
                        delay
                    );
                    held.push((announcement, delay));
                }
            }
        }

        for announcement in self.queue.drain() {
            Self::dispatch(self.notifier.as_ref(), &announcement).await;
            report.dispatched += 1;
        }

        // Queued after the drain, so a delay of N ticks is counted from the next tick.
        for (announcement, delay) in held {
            self.queue.push(announcement, delay);
        }

        self.counter.advance();
        report
    }

    /// Tick every `period` until `shutdown` resolves, then close the store.
    ///
    /// Shutdown is only observed between ticks.
    pub async fn run_until<F>(&mut self, shutdown: F, period: Duration) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        log::info!(
            "Scheduler started with {} checker(s), tick every {:?}",
            self.checkers.len(),
            period
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Shutdown requested");
                    break;
                }
                _ = interval.tick() => {
                    let report = self.tick().await;
                    log::debug!(
                        "Tick {} done: ran {:?}, dispatched {}",
                        report.tick,
                        report.ran,
                        report.dispatched
                    );
                }
            }
        }

        if !self.queue.is_empty() {
            log::warn!(
                "Dropping {} pending announcement(s) on shutdown",
                self.queue.len()
            );
        }
        self.store.close().await
    }
}
