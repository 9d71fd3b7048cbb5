//! Menus and name entry.
//!
//! Navigation is plain state; the `run_*` functions put a screen on the
//! terminal and block until the player picks something.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;

use crate::audio::Volumes;
use crate::components::Dir;
use crate::config::Config;
use crate::consts::VOLUME_STEPS;
use crate::error::GameError;
use crate::highscores::{HighScores, NAME_LEN};
use crate::input::{read_key, KeyAction};
use crate::runner::ExitSignal;

const POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome<T> {
    Pending,
    Chosen(T),
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainChoice {
    StartGame,
    Highscores,
    Settings,
    Credits,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoresChoice {
    Back,
    Reset,
}

/// A vertical list with a wrapping cursor.
#[derive(Debug, Clone)]
pub struct SelectList<T> {
    entries: Vec<(&'static str, T)>,
    selected: usize,
}

impl<T: Copy> SelectList<T> {
    pub fn new(entries: Vec<(&'static str, T)>) -> Self {
        Self {
            entries,
            selected: 0,
        }
    }

    pub fn with_selected(mut self, selected: usize) -> Self {
        if selected < self.entries.len() {
            self.selected = selected;
        }
        self
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(label, _)| *label)
    }

    pub fn handle(&mut self, action: KeyAction) -> MenuOutcome<T> {
        let len = self.entries.len();
        if len == 0 {
            return MenuOutcome::Back;
        }
        match action {
            KeyAction::Steer(Dir::Up) => {
                self.selected = (self.selected + len - 1) % len;
                MenuOutcome::Pending
            }
            KeyAction::Steer(Dir::Down) => {
                self.selected = (self.selected + 1) % len;
                MenuOutcome::Pending
            }
            KeyAction::Confirm => MenuOutcome::Chosen(self.entries[self.selected].1),
            KeyAction::Back => MenuOutcome::Back,
            _ => MenuOutcome::Pending,
        }
    }
}

pub fn main_menu() -> SelectList<MainChoice> {
    SelectList::new(vec![
        ("START GAME", MainChoice::StartGame),
        ("HIGHSCORES", MainChoice::Highscores),
        ("SETTINGS", MainChoice::Settings),
        ("CREDITS", MainChoice::Credits),
        ("QUIT", MainChoice::Quit),
    ])
}

pub fn scores_menu() -> SelectList<ScoresChoice> {
    SelectList::new(vec![
        ("BACK", ScoresChoice::Back),
        ("RESET", ScoresChoice::Reset),
    ])
}

/// YES/NO, defaulting to NO.
pub fn confirm_menu() -> SelectList<bool> {
    SelectList::new(vec![("YES", true), ("NO", false)]).with_selected(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsItem {
    Sound,
    Music,
    Back,
}

/// Volume settings: up/down pick a channel, left/right turn it down or up.
#[derive(Debug, Clone)]
pub struct SettingsScreen {
    list: SelectList<SettingsItem>,
    volumes: Volumes,
}

impl SettingsScreen {
    pub fn new(volumes: Volumes) -> Self {
        Self {
            list: SelectList::new(vec![
                ("SOUND", SettingsItem::Sound),
                ("MUSIC", SettingsItem::Music),
                ("BACK", SettingsItem::Back),
            ]),
            volumes,
        }
    }

    pub fn volumes(&self) -> Volumes {
        self.volumes
    }

    pub fn handle(&mut self, action: KeyAction) -> MenuOutcome<()> {
        let item = self.list.entries[self.list.selected].1;
        let notch = match action {
            KeyAction::Steer(Dir::Left) => -1,
            KeyAction::Steer(Dir::Right) => 1,
            KeyAction::Confirm if item == SettingsItem::Back => return MenuOutcome::Back,
            other => {
                return match self.list.handle(other) {
                    MenuOutcome::Back => MenuOutcome::Back,
                    _ => MenuOutcome::Pending,
                }
            }
        };
        match item {
            SettingsItem::Sound => self.volumes.sound = step_volume(self.volumes.sound, notch),
            SettingsItem::Music => self.volumes.music = step_volume(self.volumes.music, notch),
            SettingsItem::Back => {}
        }
        MenuOutcome::Pending
    }

    fn lines(&self) -> Vec<String> {
        vec![
            volume_bar("SOUND", self.volumes.sound),
            volume_bar("MUSIC", self.volumes.music),
            String::new(),
            "left/right to change".to_string(),
        ]
    }
}

fn notches(volume: f32) -> i32 {
    (volume * VOLUME_STEPS as f32).round() as i32
}

fn step_volume(volume: f32, notch: i32) -> f32 {
    let steps = VOLUME_STEPS as i32;
    (notches(volume) + notch).clamp(0, steps) as f32 / steps as f32
}

pub fn volume_bar(label: &str, volume: f32) -> String {
    let filled = notches(volume).clamp(0, VOLUME_STEPS as i32) as usize;
    let empty = VOLUME_STEPS as usize - filled;
    format!("{label}: [{}{}]", "#".repeat(filled), "-".repeat(empty))
}

pub fn credits_lines() -> Vec<String> {
    vec![
        "Thank you for playing!".to_string(),
        String::new(),
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        "Terminal graphics by crossterm".to_string(),
    ]
}

/// Up to three characters from A-Z and 0-9.
#[derive(Debug, Clone, Default)]
pub struct NameEntry {
    name: String,
}

impl NameEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&mut self, action: KeyAction) -> MenuOutcome<String> {
        match action {
            KeyAction::Char(c) if c.is_ascii_alphanumeric() && self.name.len() < NAME_LEN => {
                self.name.push(c.to_ascii_uppercase());
                MenuOutcome::Pending
            }
            KeyAction::Erase => {
                self.name.pop();
                MenuOutcome::Pending
            }
            KeyAction::Confirm if !self.name.is_empty() => MenuOutcome::Chosen(self.name.clone()),
            KeyAction::Back => MenuOutcome::Back,
            _ => MenuOutcome::Pending,
        }
    }
}

/// Draw a titled screen: body lines, then the options with the cursor.
fn draw_screen<W: Write, T: Copy>(
    out: &mut W,
    title: &str,
    body: &[String],
    list: Option<&SelectList<T>>,
) -> Result<(), GameError> {
    let (term_w, term_h) = terminal::size()?;
    let options = list.map(|l| l.labels().count()).unwrap_or(0);
    let rows = (2 + body.len() + 1 + options) as u16;
    let top = term_h.saturating_sub(rows) / 2;
    let centre = |text: &str| (term_w.saturating_sub(text.chars().count() as u16)) / 2;

    out.queue(Clear(ClearType::All))?;
    out.queue(MoveTo(centre(title), top))?;
    out.queue(SetForegroundColor(Color::Yellow))?;
    out.queue(Print(title))?;
    out.queue(ResetColor)?;

    let mut y = top + 2;
    for line in body {
        out.queue(MoveTo(centre(line), y))?;
        out.queue(Print(line))?;
        y += 1;
    }
    y += 1;
    if let Some(list) = list {
        for (i, label) in list.labels().enumerate() {
            let text = if i == list.selected() {
                format!("> {label} <")
            } else {
                format!("  {label}  ")
            };
            out.queue(MoveTo(centre(&text), y))?;
            if i == list.selected() {
                out.queue(SetForegroundColor(Color::Yellow))?;
            }
            out.queue(Print(text))?;
            out.queue(ResetColor)?;
            y += 1;
        }
    }
    out.flush()?;
    Ok(())
}

/// Block until a key maps to an action. `None` once exit is requested.
fn next_action(exit: &ExitSignal, text: bool) -> Result<Option<KeyAction>, GameError> {
    loop {
        if exit.is_requested() {
            return Ok(None);
        }
        let Some(code) = read_key(POLL, exit)? else {
            continue;
        };
        let action = if text {
            KeyAction::from_text_key(code)
        } else {
            KeyAction::from_key(code)
        };
        if action.is_some() {
            return Ok(action);
        }
    }
}

/// Show `list` until something is chosen or the player backs out.
pub fn run_list<W: Write, T: Copy>(
    out: &mut W,
    title: &str,
    body: &[String],
    list: &mut SelectList<T>,
    exit: &ExitSignal,
) -> Result<MenuOutcome<T>, GameError> {
    loop {
        draw_screen(out, title, body, Some(&*list))?;
        let Some(action) = next_action(exit, false)? else {
            return Ok(MenuOutcome::Back);
        };
        match list.handle(action) {
            MenuOutcome::Pending => {}
            outcome => return Ok(outcome),
        }
    }
}

pub fn run_credits<W: Write>(out: &mut W, exit: &ExitSignal) -> Result<(), GameError> {
    let mut back = SelectList::new(vec![("BACK", ())]);
    run_list(out, "CREDITS", &credits_lines(), &mut back, exit)?;
    Ok(())
}

/// The settings screen. Changed volumes are stored in `config` and saved to
/// `path` on the way out.
pub fn run_settings<W: Write>(
    out: &mut W,
    config: &mut Config,
    path: &Path,
    exit: &ExitSignal,
) -> Result<(), GameError> {
    let mut screen = SettingsScreen::new(config.volumes());
    loop {
        draw_screen(out, "SETTINGS", &screen.lines(), Some(&screen.list))?;
        let Some(action) = next_action(exit, false)? else {
            break;
        };
        if screen.handle(action) == MenuOutcome::Back {
            break;
        }
    }
    if apply_volumes(config, screen.volumes()) {
        config.save(path)?;
        log::info!("Saved settings to {}", path.display());
    }
    Ok(())
}

/// Returns whether anything changed.
fn apply_volumes(config: &mut Config, volumes: Volumes) -> bool {
    if config.volumes() == volumes {
        return false;
    }
    config.sound_volume = volumes.sound;
    config.music_volume = volumes.music;
    true
}

pub fn score_lines(scores: &HighScores) -> Vec<String> {
    if scores.is_empty() {
        return vec!["no scores yet".to_string()];
    }
    scores
        .entries
        .iter()
        .enumerate()
        .map(|(i, e)| format!("{}. {:<3} {:>7}  L{}", i + 1, e.name, e.score, e.level))
        .collect()
}

/// The highscore screen, including the reset confirmation.
pub fn run_highscores<W: Write>(
    out: &mut W,
    scores: &mut HighScores,
    path: &Path,
    exit: &ExitSignal,
) -> Result<(), GameError> {
    loop {
        let body = score_lines(scores);
        let choice = run_list(out, "HIGHSCORES", &body, &mut scores_menu(), exit)?;
        if choice != MenuOutcome::Chosen(ScoresChoice::Reset) {
            return Ok(());
        }
        let question = vec!["Reset all highscores?".to_string()];
        let confirmed = run_list(out, "RESET", &question, &mut confirm_menu(), exit)?;
        if confirmed == MenuOutcome::Chosen(true) {
            scores.reset();
            scores.save(path)?;
        }
    }
}

/// Ask for a name after a qualifying score. `None` if the player skips.
pub fn run_name_entry<W: Write>(
    out: &mut W,
    score: u64,
    exit: &ExitSignal,
) -> Result<Option<String>, GameError> {
    let mut entry = NameEntry::new();
    loop {
        let shown = format!("{:_<width$}", entry.name(), width = NAME_LEN);
        let body = vec![
            format!("Score: {score}"),
            String::new(),
            format!("Name: {shown}"),
            "Enter to save, Esc to skip".to_string(),
        ];
        draw_screen::<W, ()>(out, "NEW HIGHSCORE", &body, None)?;
        let Some(action) = next_action(exit, true)? else {
            return Ok(None);
        };
        match entry.handle(action) {
            MenuOutcome::Pending => {}
            MenuOutcome::Chosen(name) => return Ok(Some(name)),
            MenuOutcome::Back => return Ok(None),
        }
    }
}
