//! Keyboard input.
//!
//! Terminals report key presses and auto-repeats but rarely releases, so a
//! direction counts as held for a short window after its last press. The most
//! recently pressed direction wins while it is still held.

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::components::Dir;
use crate::error::GameError;
use crate::runner::{ExitSignal, InputSource};

pub const INPUT_HOLD_MS: u64 = 160;

/// Keys held during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub confirm: bool,
    pub back: bool,
}

impl InputSnapshot {
    pub fn holding(dir: Dir) -> Self {
        let mut snapshot = Self::default();
        match dir {
            Dir::Up => snapshot.up = true,
            Dir::Down => snapshot.down = true,
            Dir::Left => snapshot.left = true,
            Dir::Right => snapshot.right = true,
        }
        snapshot
    }

    /// Desired heading; with several directions held, up beats down beats
    /// left beats right.
    pub fn heading(&self) -> Option<Dir> {
        [
            (self.up, Dir::Up),
            (self.down, Dir::Down),
            (self.left, Dir::Left),
            (self.right, Dir::Right),
        ]
        .into_iter()
        .find_map(|(held, dir)| held.then_some(dir))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Steer(Dir),
    Confirm,
    Back,
    Erase,
    Char(char),
}

impl KeyAction {
    /// Map a key for gameplay and menus: arrows or hjkl steer, Enter
    /// confirms, Esc or q goes back.
    pub fn from_key(code: KeyCode) -> Option<KeyAction> {
        match code {
            KeyCode::Up | KeyCode::Char('k') => Some(KeyAction::Steer(Dir::Up)),
            KeyCode::Down | KeyCode::Char('j') => Some(KeyAction::Steer(Dir::Down)),
            KeyCode::Left | KeyCode::Char('h') => Some(KeyAction::Steer(Dir::Left)),
            KeyCode::Right | KeyCode::Char('l') => Some(KeyAction::Steer(Dir::Right)),
            KeyCode::Enter | KeyCode::Char(' ') => Some(KeyAction::Confirm),
            KeyCode::Esc | KeyCode::Char('q') => Some(KeyAction::Back),
            KeyCode::Backspace => Some(KeyAction::Erase),
            _ => None,
        }
    }

    /// Map a key while typing a name: letters are text, not commands.
    pub fn from_text_key(code: KeyCode) -> Option<KeyAction> {
        match code {
            KeyCode::Char(c) => Some(KeyAction::Char(c)),
            KeyCode::Enter => Some(KeyAction::Confirm),
            KeyCode::Esc => Some(KeyAction::Back),
            KeyCode::Backspace => Some(KeyAction::Erase),
            _ => None,
        }
    }
}

/// Turns a stream of key presses into per-tick snapshots.
#[derive(Debug, Clone)]
pub struct KeyHold {
    window: Duration,
    last_seen: [Option<Instant>; 4],
    last_pressed: Option<Dir>,
    confirm: bool,
    back: bool,
}

impl Default for KeyHold {
    fn default() -> Self {
        Self::new(Duration::from_millis(INPUT_HOLD_MS))
    }
}

impl KeyHold {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_seen: [None; 4],
            last_pressed: None,
            confirm: false,
            back: false,
        }
    }

    pub fn record(&mut self, action: KeyAction, now: Instant) {
        match action {
            KeyAction::Steer(dir) => {
                self.last_seen[idx_for_dir(dir)] = Some(now);
                self.last_pressed = Some(dir);
            }
            KeyAction::Confirm => self.confirm = true,
            KeyAction::Back => self.back = true,
            KeyAction::Erase | KeyAction::Char(_) => {}
        }
    }

    fn held(&self, dir: Dir, now: Instant) -> Option<Instant> {
        self.last_seen[idx_for_dir(dir)]
            .filter(|t| now.saturating_duration_since(*t) <= self.window)
    }

    /// The last pressed direction if still held, else the most recently seen
    /// direction inside the hold window.
    pub fn active_dir(&self, now: Instant) -> Option<Dir> {
        if let Some(dir) = self.last_pressed {
            if self.held(dir, now).is_some() {
                return Some(dir);
            }
        }
        Dir::ALL
            .into_iter()
            .filter_map(|dir| self.held(dir, now).map(|t| (dir, t)))
            .max_by_key(|(_, t)| *t)
            .map(|(dir, _)| dir)
    }

    /// Snapshot for the tick at `now`. Confirm and back count once.
    pub fn snapshot(&mut self, now: Instant) -> InputSnapshot {
        let mut snapshot = match self.active_dir(now) {
            Some(dir) => InputSnapshot::holding(dir),
            None => InputSnapshot::default(),
        };
        snapshot.confirm = std::mem::take(&mut self.confirm);
        snapshot.back = std::mem::take(&mut self.back);
        snapshot
    }
}

fn idx_for_dir(dir: Dir) -> usize {
    match dir {
        Dir::Up => 0,
        Dir::Down => 1,
        Dir::Left => 2,
        Dir::Right => 3,
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Reads the next key press, waiting at most `timeout`. Ctrl+C requests exit.
pub fn read_key(timeout: Duration, exit: &ExitSignal) -> Result<Option<KeyCode>, GameError> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
            if is_interrupt(&key) {
                exit.request();
                return Ok(None);
            }
            Ok(Some(key.code))
        }
        _ => Ok(None),
    }
}

/// Throw away events that are already queued, such as keys still buffered
/// when a game ends. Ctrl+C among them still requests exit.
pub fn discard_pending(exit: &ExitSignal) -> Result<usize, GameError> {
    drain_events(
        || {
            if event::poll(Duration::ZERO)? {
                event::read().map(Some)
            } else {
                Ok(None)
            }
        },
        exit,
    )
}

fn drain_events(
    mut next: impl FnMut() -> std::io::Result<Option<Event>>,
    exit: &ExitSignal,
) -> Result<usize, GameError> {
    let mut dropped = 0;
    while let Some(ev) = next()? {
        if let Event::Key(key) = ev {
            if is_interrupt(&key) {
                exit.request();
            }
        }
        dropped += 1;
    }
    if dropped > 0 {
        log::debug!("discarded {dropped} pending events");
    }
    Ok(dropped)
}

/// Live keyboard input from the terminal.
pub struct TerminalInput {
    hold: KeyHold,
    exit: ExitSignal,
}

impl TerminalInput {
    pub fn new(exit: ExitSignal) -> Self {
        Self {
            hold: KeyHold::default(),
            exit,
        }
    }
}

impl InputSource for TerminalInput {
    fn poll(&mut self, now: Instant) -> Result<InputSnapshot, GameError> {
        while let Some(code) = read_key(Duration::ZERO, &self.exit)? {
            if let Some(action) = KeyAction::from_key(code) {
                self.hold.record(action, now);
            }
        }
        Ok(self.hold.snapshot(now))
    }
}
