use std::fs::File;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use rand::rngs::StdRng;
use rand::SeedableRng;

use maze_chase::audio::TerminalBell;
use maze_chase::input::{discard_pending, TerminalInput};
use maze_chase::menu::{self, MainChoice, MenuOutcome};
use maze_chase::render::TerminalRenderer;
use maze_chase::runner::{ExitSignal, Pacer, Runner};
use maze_chase::{Config, FileLevels, GameOverReason, HighScores, Session};

/// How long the final frame stays up before the menus return.
const GAME_OVER_PAUSE: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "maze-chase")]
#[command(about = "A tile-based maze chase game for the terminal")]
struct Args {
    /// Config file; created with defaults if missing
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Seed for ghost decisions and fruit placement
    #[arg(long)]
    seed: Option<u64>,

    /// Override the configured tick rate
    #[arg(long)]
    tick_rate: Option<u32>,

    /// Log file; the terminal itself is taken by the game
    #[arg(long, default_value = "maze-chase.log")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let mut config = Config::load(&args.config)
        .with_context(|| format!("invalid config {}", args.config.display()))?;
    config.apply_env();
    if let Some(rate) = args.tick_rate {
        config.tick_rate = rate;
    }
    config.validate()?;

    let mut scores = HighScores::load(&config.highscores_path);
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &mut config, &args.config, &mut scores, &mut rng);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    if let Err(err) = &result {
        log::error!("{err:#}");
    }
    result
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

fn run(
    stdout: &mut Stdout,
    config: &mut Config,
    config_path: &Path,
    scores: &mut HighScores,
    rng: &mut StdRng,
) -> Result<()> {
    let exit = ExitSignal::new();
    let levels = FileLevels::new(config.levels.clone());
    while !exit.is_requested() {
        let choice = menu::run_list(stdout, "MAZE CHASE", &[], &mut menu::main_menu(), &exit)?;
        match choice {
            MenuOutcome::Chosen(MainChoice::StartGame) => {
                play(stdout, config, scores, &levels, &exit, rng)?
            }
            MenuOutcome::Chosen(MainChoice::Highscores) => {
                menu::run_highscores(stdout, scores, &config.highscores_path, &exit)?
            }
            MenuOutcome::Chosen(MainChoice::Settings) => {
                if let Err(err) = menu::run_settings(stdout, config, config_path, &exit) {
                    log::warn!("Cannot save settings: {err}");
                }
            }
            MenuOutcome::Chosen(MainChoice::Credits) => menu::run_credits(stdout, &exit)?,
            MenuOutcome::Chosen(MainChoice::Quit) | MenuOutcome::Back => break,
            MenuOutcome::Pending => {}
        }
    }
    log::info!("Bye");
    Ok(())
}

fn play(
    stdout: &mut Stdout,
    config: &Config,
    scores: &mut HighScores,
    levels: &FileLevels,
    exit: &ExitSignal,
    rng: &mut StdRng,
) -> Result<()> {
    let start = Instant::now();
    let best = scores.top_score().unwrap_or(0);
    let mut session =
        Session::new(config.tuning(), levels, best, start).context("cannot start a game")?;

    let reason = {
        let mut renderer = TerminalRenderer::new(&mut *stdout);
        let mut input = TerminalInput::new(exit.clone());
        let mut bell = TerminalBell::new(io::stdout(), config.volumes());
        let mut runner = Runner::new(Pacer::new(config.tick_interval(), start), exit.clone());
        runner.run(&mut session, levels, &mut input, &mut renderer, &mut bell, rng)?
    };
    if reason != GameOverReason::Quit {
        thread::sleep(GAME_OVER_PAUSE);
    }
    discard_pending(exit)?;
    if exit.is_requested() || !scores.qualifies(session.score) {
        return Ok(());
    }

    if let Some(name) = menu::run_name_entry(stdout, session.score, exit)? {
        scores.add(&name, session.score, session.level as u32 + 1);
        if let Err(err) = scores.save(&config.highscores_path) {
            log::warn!("Cannot save high scores: {err}");
        }
    }
    Ok(())
}
