//! Power mode: a global, time-boxed window in which every ghost is slowed
//! and can be eaten.

use std::time::{Duration, Instant};

use crate::ghost::Ghost;

#[derive(Debug, Clone, PartialEq)]
pub struct PowerMode {
    duration: Duration,
    started: Option<Instant>,
}

impl PowerMode {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.started.is_some()
    }

    pub fn started(&self) -> Option<Instant> {
        self.started
    }

    /// Time left before the ghosts recover, if active.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.started
            .map(|t| self.duration.saturating_sub(now.saturating_duration_since(t)))
    }

    /// Start power mode. A second pickup while active changes nothing: the
    /// timer is not refreshed and speeds are not halved again.
    pub fn activate(&mut self, now: Instant, ghosts: &mut [Ghost]) -> bool {
        if self.started.is_some() {
            return false;
        }
        self.started = Some(now);
        for ghost in ghosts.iter_mut() {
            ghost.frighten();
        }
        log::debug!("power mode on for {:?}", self.duration);
        true
    }

    /// Returns true on the tick power mode runs out.
    pub fn update(&mut self, now: Instant, ghosts: &mut [Ghost]) -> bool {
        let Some(started) = self.started else {
            return false;
        };
        if now.saturating_duration_since(started) <= self.duration {
            return false;
        }
        for ghost in ghosts.iter_mut().filter(|g| g.frightened) {
            ghost.calm();
        }
        self.started = None;
        log::debug!("power mode over");
        true
    }

    /// Drop power mode without touching ghosts, used when the ghost set is
    /// rebuilt anyway.
    pub fn cancel(&mut self) {
        self.started = None;
    }
}
