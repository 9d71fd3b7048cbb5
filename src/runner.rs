//! The fixed-rate game loop.
//!
//! One iteration samples input, runs one tick, hands the cues to the audio
//! sink, presents the frame and sleeps until the next tick is due.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::audio::CueSink;
use crate::error::GameError;
use crate::input::InputSnapshot;
use crate::level::LevelSource;
use crate::session::{GameOverReason, Session};
use crate::tick::tick;

pub trait InputSource {
    /// Keys held as of `now`. Called once per tick.
    fn poll(&mut self, now: Instant) -> Result<InputSnapshot, GameError>;
}

pub trait Presenter {
    fn present(&mut self, session: &Session, now: Instant) -> Result<(), GameError>;
}

/// Shared "please stop" flag, checked once per tick.
#[derive(Debug, Clone, Default)]
pub struct ExitSignal(Arc<AtomicBool>);

impl ExitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Keeps ticks on a fixed schedule.
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Duration,
    next: Instant,
}

impl Pacer {
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            next: start + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// How long to sleep at `now` before the next tick. A loop that fell more
    /// than a whole interval behind drops the missed ticks instead of
    /// bursting to catch up.
    pub fn delay(&mut self, now: Instant) -> Duration {
        let due = self.next;
        self.next += self.interval;
        if due > now {
            return due - now;
        }
        if now - due > self.interval {
            self.next = now + self.interval;
        }
        Duration::ZERO
    }

    pub fn wait(&mut self) {
        let delay = self.delay(Instant::now());
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

pub struct Runner {
    pacer: Pacer,
    exit: ExitSignal,
}

impl Runner {
    pub fn new(pacer: Pacer, exit: ExitSignal) -> Self {
        Self { pacer, exit }
    }

    /// Run `session` until it ends and report why.
    pub fn run(
        &mut self,
        session: &mut Session,
        levels: &impl LevelSource,
        input: &mut impl InputSource,
        presenter: &mut impl Presenter,
        cues: &mut impl CueSink,
        rng: &mut impl Rng,
    ) -> Result<GameOverReason, GameError> {
        log::info!("Game loop started at {:?} per tick", self.pacer.interval());
        loop {
            let now = Instant::now();
            if self.exit.is_requested() {
                session.end(GameOverReason::Quit);
            }
            let snapshot = input.poll(now)?;
            tick(session, levels, &snapshot, now, rng)?;
            for cue in session.take_cues() {
                cues.play(cue);
            }
            presenter.present(session, now)?;
            if let Some(reason) = session.game_over {
                return Ok(reason);
            }
            self.pacer.wait();
        }
    }
}
