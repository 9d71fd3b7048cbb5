//! Sound cues
//!
//! The simulation only names the cue; what a sink does with it is its own
//! business. A terminal has no mixer, so the terminal sink rings the bell for
//! the cues that matter most and logs the rest. A volume of zero mutes its
//! channel.

use std::io::Write;

/// Cue events raised during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Point eaten
    Chomp,
    /// Fruit eaten
    Fruit,
    /// Power pickup eaten
    Power,
    /// Frightened ghost eaten
    GhostEaten,
    /// Player caught by a ghost
    PlayerDeath,
    /// Score passed the best highscore
    Highscore,
    /// New level starting
    LevelTheme,
}

impl Cue {
    /// Music rather than a sound effect.
    pub fn is_music(self) -> bool {
        matches!(self, Cue::LevelTheme)
    }
}

/// Channel volumes in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volumes {
    pub sound: f32,
    pub music: f32,
}

impl Volumes {
    pub fn muted() -> Self {
        Self {
            sound: 0.0,
            music: 0.0,
        }
    }

    pub fn for_cue(&self, cue: Cue) -> f32 {
        if cue.is_music() {
            self.music
        } else {
            self.sound
        }
    }
}

pub trait CueSink {
    fn play(&mut self, cue: Cue);
}

/// Discards every cue.
#[derive(Debug, Default)]
pub struct Silent;

impl CueSink for Silent {
    fn play(&mut self, _cue: Cue) {}
}

impl CueSink for Vec<Cue> {
    fn play(&mut self, cue: Cue) {
        self.push(cue);
    }
}

pub struct TerminalBell<W: Write> {
    out: W,
    volumes: Volumes,
    broken: bool,
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W, volumes: Volumes) -> Self {
        Self {
            out,
            volumes,
            broken: false,
        }
    }

    fn rings_for(cue: Cue) -> bool {
        matches!(cue, Cue::PlayerDeath | Cue::Highscore | Cue::LevelTheme)
    }
}

impl<W: Write> CueSink for TerminalBell<W> {
    fn play(&mut self, cue: Cue) {
        log::debug!("cue {:?}", cue);
        if self.broken || !Self::rings_for(cue) || self.volumes.for_cue(cue) <= 0.0 {
            return;
        }
        // A missing bell is not worth interrupting the game for.
        if let Err(err) = self.out.write_all(b"\x07").and_then(|_| self.out.flush()) {
            log::warn!("Cannot ring terminal bell: {err}");
            self.broken = true;
        }
    }
}
