use std::io::Write;
use std::time::Instant;

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::components::Body;
use crate::error::GameError;
use crate::grid::{pixel_to_tile, Cell as GridCell};
use crate::runner::Presenter;
use crate::session::Session;

/// Terminal columns per tile.
pub const CELL_W: usize = 2;

const PLAYER_FRAMES: [&str; 3] = ["😃", "😮", "😀"];
const GHOST_COLORS: [Color; 4] = [Color::Red, Color::Magenta, Color::Cyan, Color::Yellow];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Glyph {
    Player(u32),
    Ghost,
    Frightened,
    Wall,
    Gate,
    Empty,
    Point,
    Power,
    Fruit,
}

impl Glyph {
    pub fn text(self) -> &'static str {
        match self {
            Glyph::Player(frame) => PLAYER_FRAMES[frame as usize % PLAYER_FRAMES.len()],
            Glyph::Ghost => "👻",
            Glyph::Frightened => "😱",
            Glyph::Wall => "██",
            Glyph::Gate => "==",
            Glyph::Empty => "  ",
            Glyph::Point => "· ",
            Glyph::Power => "● ",
            Glyph::Fruit => "🍒",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub glyph: Glyph,
    pub color: Color,
}

/// A horizontal stretch of changed cells: row, first column, one past last.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Run {
    pub row: usize,
    pub start: usize,
    pub end: usize,
}

/// Stretches of `next` that differ from `prev`, row by row. Every cell counts
/// as changed when the sizes differ.
pub fn changed_runs(prev: &[Cell], next: &[Cell], width: usize) -> Vec<Run> {
    let mut runs = Vec::new();
    if width == 0 {
        return runs;
    }
    let whole = prev.len() != next.len();
    for (row, cells) in next.chunks(width).enumerate() {
        let mut open: Option<usize> = None;
        for (col, cell) in cells.iter().enumerate() {
            let dirty = whole || prev[row * width + col] != *cell;
            match (dirty, open) {
                (true, None) => open = Some(col),
                (false, Some(start)) => {
                    runs.push(Run { row, start, end: col });
                    open = None;
                }
                _ => {}
            }
        }
        if let Some(start) = open {
            runs.push(Run {
                row,
                start,
                end: cells.len(),
            });
        }
    }
    runs
}

/// Top-left corner that centres a `needed` block in `term`, or `None` when it
/// does not fit. One row is kept free above for the HUD.
fn placement(term: (u16, u16), needed: (u16, u16)) -> Option<(u16, u16)> {
    if term.0 < needed.0 || term.1 < needed.1 {
        return None;
    }
    Some(((term.0 - needed.0) / 2, (term.1 - needed.1) / 2 + 1))
}

/// Draws sessions on a terminal, rewriting only what changed since the
/// previous frame.
pub struct TerminalRenderer<W: Write> {
    out: W,
    shown: Vec<Cell>,
    hud: String,
    status: String,
    /// Grid width and terminal origin of the frame on screen, if any.
    layout: Option<(usize, u16, u16)>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: Vec::new(),
            hud: String::new(),
            status: String::new(),
            layout: None,
        }
    }

    fn render(&mut self, session: &Session, now: Instant) -> Result<(), GameError> {
        let width = session.grid.width();
        let height = session.grid.height();
        let needed = ((width * CELL_W) as u16, (height + 2) as u16);
        let term = terminal::size()?;

        let Some((ox, oy)) = placement(term, needed) else {
            self.layout = None;
            self.out.queue(Clear(ClearType::All))?;
            self.out.queue(MoveTo(0, 0))?;
            self.out.queue(Print(format!(
                "Terminal too small: need {}x{}, have {}x{}.",
                needed.0, needed.1, term.0, term.1
            )))?;
            self.out.flush()?;
            return Ok(());
        };

        if self.layout != Some((width, ox, oy)) {
            self.layout = Some((width, ox, oy));
            self.shown.clear();
            self.hud.clear();
            self.status.clear();
            self.out.queue(Clear(ClearType::All))?;
        }

        let hud = hud_line(session, now);
        if hud != self.hud {
            self.text_line(ox, oy - 1, Color::White, &hud)?;
            self.hud = hud;
        }

        let frame = compose(session);
        for run in changed_runs(&self.shown, &frame, width) {
            let cells = &frame[run.row * width + run.start..run.row * width + run.end];
            self.draw_run(ox + (run.start * CELL_W) as u16, oy + run.row as u16, cells)?;
        }
        self.shown = frame;

        let status = status_line(session);
        if status != self.status {
            self.text_line(ox, oy + height as u16, Color::Yellow, &status)?;
            self.status = status;
        }

        self.out.flush()?;
        Ok(())
    }

    fn text_line(&mut self, x: u16, y: u16, color: Color, text: &str) -> Result<(), GameError> {
        self.out.queue(MoveTo(x, y))?;
        self.out.queue(Clear(ClearType::CurrentLine))?;
        self.out.queue(SetForegroundColor(color))?;
        self.out.queue(Print(text))?;
        self.out.queue(ResetColor)?;
        Ok(())
    }

    /// One cursor move per run; the colour is only switched when it changes.
    fn draw_run(&mut self, x: u16, y: u16, cells: &[Cell]) -> Result<(), GameError> {
        self.out.queue(MoveTo(x, y))?;
        let mut color = None;
        for cell in cells {
            if color != Some(cell.color) {
                self.out.queue(SetForegroundColor(cell.color))?;
                color = Some(cell.color);
            }
            let text = cell.glyph.text();
            self.out.queue(Print(text))?;
            // Keep the grid aligned when a glyph is narrower than a tile.
            for _ in UnicodeWidthStr::width(text)..CELL_W {
                self.out.queue(Print(' '))?;
            }
        }
        self.out.queue(ResetColor)?;
        Ok(())
    }
}

impl<W: Write> Presenter for TerminalRenderer<W> {
    fn present(&mut self, session: &Session, now: Instant) -> Result<(), GameError> {
        self.render(session, now)
    }
}

/// One display cell per grid tile, row-major. Entities are drawn on the tile
/// holding their centre; the player is drawn over ghosts.
pub fn compose(session: &Session) -> Vec<Cell> {
    let width = session.grid.width();
    let mut frame: Vec<Cell> = session
        .grid
        .rows()
        .iter()
        .flatten()
        .map(|&c| tile_cell(c))
        .collect();
    let tile = session.tuning.tile;
    let index_of = |body: &Body| -> Option<usize> {
        let (x, y) = pixel_to_tile(body.center(tile), tile);
        let x = usize::try_from(x).ok().filter(|x| *x < width)?;
        let y = usize::try_from(y).ok().filter(|y| *y < session.grid.height())?;
        Some(y * width + x)
    };

    for ghost in session.ghosts.iter().filter(|g| g.body.alive) {
        if let Some(idx) = index_of(&ghost.body) {
            frame[idx] = if ghost.frightened {
                Cell {
                    glyph: Glyph::Frightened,
                    color: Color::Blue,
                }
            } else {
                Cell {
                    glyph: Glyph::Ghost,
                    color: GHOST_COLORS[ghost.variant % GHOST_COLORS.len()],
                }
            };
        }
    }
    if session.player.body.alive {
        if let Some(idx) = index_of(&session.player.body) {
            frame[idx] = Cell {
                glyph: Glyph::Player(session.anim_frame),
                color: Color::Yellow,
            };
        }
    }
    frame
}

fn tile_cell(cell: GridCell) -> Cell {
    let (glyph, color) = match cell {
        GridCell::Wall => (Glyph::Wall, Color::Blue),
        GridCell::InvisibleWall => (Glyph::Gate, Color::Cyan),
        GridCell::Point => (Glyph::Point, Color::White),
        GridCell::PowerPill => (Glyph::Power, Color::Magenta),
        GridCell::Fruit => (Glyph::Fruit, Color::Green),
        GridCell::Empty | GridCell::Border | GridCell::GhostSpawn | GridCell::PlayerSpawn => {
            (Glyph::Empty, Color::Reset)
        }
    };
    Cell { glyph, color }
}

pub fn hud_line(session: &Session, now: Instant) -> String {
    let best = session.best_score.max(session.score);
    let mut hud = format!(
        "Score: {}  Time: {}s  Best: {}  Lives: {}  Level: {}",
        session.score,
        session.elapsed(now).as_secs(),
        best,
        session.player.lives,
        session.level + 1
    );
    if let Some(left) = session.power.remaining(now) {
        hud.push_str(&format!("  POWER {:.1}s", left.as_secs_f32()));
    }
    hud
}

pub fn status_line(session: &Session) -> String {
    if let Some(reason) = session.game_over {
        format!("GAME OVER ({reason}) - Final Score: {}", session.score)
    } else if session.waiting_to_respawn {
        "READY?".to_string()
    } else {
        "arrows/hjkl to move, q to quit".to_string()
    }
}
