use std::path::PathBuf;
use std::time::{Duration, Instant};

use maze_chase::collision::{boxes_overlap, try_teleport};
use maze_chase::components::Body;
use maze_chase::ghost::{Ghost, GhostStep};
use maze_chase::grid::tile_to_pixel;
use maze_chase::*;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const TILE: f32 = 20.0;

fn quiet() -> Tuning {
    Tuning {
        max_fruits: 0,
        ..Tuning::default()
    }
}

fn shipped_levels() -> FileLevels {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    FileLevels::new(
        Config::default()
            .levels
            .iter()
            .map(|p| root.join(p))
            .collect(),
    )
}

fn overlaps_blocking(grid: &Grid, body: &Body, blocks_invisible: bool) -> bool {
    grid.rows().iter().enumerate().any(|(y, row)| {
        row.iter().enumerate().any(|(x, cell)| {
            let blocking = *cell == Cell::Wall || (blocks_invisible && *cell == Cell::InvisibleWall);
            blocking && boxes_overlap(body.pos, tile_to_pixel(x, y, TILE), TILE)
        })
    })
}

// ── movement ─────────────────────────────────────────────────────────────────

#[test]
fn ten_ticks_right_in_an_open_room() {
    let mut rows = vec![vec![0; 7]; 5];
    rows[2][3] = 7;
    let levels = StaticLevels::single(rows);
    let t0 = Instant::now();
    let mut session = Session::new(quiet(), &levels, 0, t0).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let origin = session.player.body.pos;
    assert_eq!(origin, Pos::new(80.0, 60.0));

    for _ in 0..10 {
        tick(&mut session, &levels, &InputSnapshot::holding(Dir::Right), t0, &mut rng).unwrap();
    }
    // 5 px per tick; the box entered columns 5 and 6.
    assert_eq!(session.player.body.pos, Pos::new(130.0, 60.0));
    assert_eq!(session.score, 20);
}

#[test]
fn player_stops_at_a_wall() {
    let levels = StaticLevels::single(vec![vec![7, 0, 1]]);
    let t0 = Instant::now();
    let mut session = Session::new(quiet(), &levels, 0, t0).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..10 {
        tick(&mut session, &levels, &InputSnapshot::holding(Dir::Right), t0, &mut rng).unwrap();
    }
    assert_eq!(session.player.body.pos, Pos::new(40.0, 20.0));
    assert_eq!(session.score, 10);
}

#[test]
fn ghost_blocked_going_up_never_turns_down() {
    let grid = Grid::with_border(&[
        vec![1, 1, 1, 1, 1],
        vec![0, 0, 5, 0, 0],
        vec![1, 1, 0, 1, 1],
    ])
    .unwrap();
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ghost = Ghost::spawn_all(&grid, TILE).remove(0);
        ghost.body.dir = Dir::Up;
        assert_eq!(ghost.step(&grid, TILE, &mut rng).unwrap(), GhostStep::Blocked);
        assert_ne!(ghost.body.dir, Dir::Down);
    }
}

#[test]
fn ghost_runs_the_tunnel_and_comes_out_the_far_side() {
    let grid = Grid::with_border(&[
        vec![1, 1, 1, 1, 1, 1],
        vec![0, 0, 5, 0, 0, 0],
        vec![1, 1, 1, 1, 1, 1],
    ])
    .unwrap();
    let mut ghost = Ghost::spawn_all(&grid, TILE).remove(0);
    ghost.body.dir = Dir::Left;
    let mut rng = StdRng::seed_from_u64(7);

    // 4 px per step from x = 60 down to the first inner column.
    for _ in 0..10 {
        assert_eq!(ghost.step(&grid, TILE, &mut rng).unwrap(), GhostStep::Moved);
    }
    assert_eq!(ghost.body.pos, Pos::new(20.0, 40.0));

    assert_eq!(ghost.step(&grid, TILE, &mut rng).unwrap(), GhostStep::Teleported);
    let far_side = (grid.width() as f32 - 2.0) * TILE;
    assert_eq!(ghost.body.pos, Pos::new(far_side, 40.0));

    assert_eq!(ghost.step(&grid, TILE, &mut rng).unwrap(), GhostStep::Moved);
    assert_eq!(ghost.body.pos, Pos::new(far_side - 4.0, 40.0));
    assert_eq!(ghost.body.dir, Dir::Left);
}

// ── power mode ───────────────────────────────────────────────────────────────

#[test]
fn second_power_pickup_does_not_extend_or_stack() {
    let levels = StaticLevels::single(vec![
        vec![7, -3, -3, 0, 0, 0],
        vec![1, 1, 1, 1, 1, 1],
        vec![1, 5, 1, 1, 1, 1],
        vec![1, 1, 1, 1, 1, 1],
    ]);
    let t0 = Instant::now();
    let mut s = Session::new(quiet(), &levels, 0, t0).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let right = InputSnapshot::holding(Dir::Right);

    for _ in 0..4 {
        tick(&mut s, &levels, &right, t0, &mut rng).unwrap();
    }
    assert!(s.power.is_active());
    assert_eq!(s.ghosts[0].body.speed, 2.0);

    let t3 = t0 + Duration::from_secs(3);
    for _ in 0..4 {
        tick(&mut s, &levels, &right, t3, &mut rng).unwrap();
    }
    assert_eq!(s.grid.count(Cell::PowerPill), 0);
    assert_eq!(s.ghosts[0].body.speed, 2.0);
    assert_eq!(s.power.started(), Some(t0));

    tick(&mut s, &levels, &right, t0 + Duration::from_secs(5), &mut rng).unwrap();
    assert!(s.power.is_active());
    tick(&mut s, &levels, &right, t0 + Duration::from_millis(5001), &mut rng).unwrap();
    assert!(!s.power.is_active());
    assert_eq!(s.ghosts[0].body.speed, 4.0);
    assert!(!s.ghosts[0].frightened);
}

// ── lives ────────────────────────────────────────────────────────────────────

#[test]
fn losing_a_life_is_not_game_over_until_the_last() {
    let levels = StaticLevels::single(vec![vec![7, 5]]);
    let t0 = Instant::now();
    let mut s = Session::new(Tuning { lives: 2, ..quiet() }, &levels, 0, t0).unwrap();
    let mut rng = StdRng::seed_from_u64(8);
    let right = InputSnapshot::holding(Dir::Right);

    tick(&mut s, &levels, &right, t0, &mut rng).unwrap();
    assert_eq!(s.player.lives, 1);
    assert!(!s.is_over());
    assert!(s.take_cues().contains(&Cue::PlayerDeath));

    // Waiting out the delay does not cost anything.
    tick(&mut s, &levels, &right, t0 + Duration::from_secs(1), &mut rng).unwrap();
    assert!(s.waiting_to_respawn);
    assert_eq!(s.player.lives, 1);

    tick(&mut s, &levels, &right, t0 + Duration::from_millis(3100), &mut rng).unwrap();
    assert!(s.player.body.alive);
    tick(&mut s, &levels, &right, t0 + Duration::from_millis(3200), &mut rng).unwrap();
    assert_eq!(s.player.lives, 0);
    assert_eq!(s.game_over, Some(GameOverReason::OutOfLives));
}

#[test]
fn eating_a_frightened_ghost_scores_200() {
    let levels = StaticLevels::single(vec![vec![7, 5, 0, 0]]);
    let t0 = Instant::now();
    let mut s = Session::new(quiet(), &levels, 0, t0).unwrap();
    s.power.activate(t0, &mut s.ghosts);
    let mut rng = StdRng::seed_from_u64(5);
    tick(&mut s, &levels, &InputSnapshot::holding(Dir::Right), t0, &mut rng).unwrap();
    assert_eq!(s.score, 200);
    assert!(!s.ghosts[0].body.alive);
    assert_eq!(s.player.lives, 3);

    // Power mode is still on, but the ghost comes back calm.
    let later = t0 + Duration::from_millis(3001);
    let mut ghost = s.ghosts[0].clone();
    assert!(ghost.body.respawn_due(later, s.tuning.respawn_delay));
    ghost.respawn();
    assert!(ghost.body.alive);
    assert!(!ghost.frightened);
    assert_eq!(ghost.body.speed, ghost.base_speed);
}

// ── levels ───────────────────────────────────────────────────────────────────

#[test]
fn shipped_levels_are_playable() {
    let levels = shipped_levels();
    assert_eq!(levels.level_count(), 3);
    for index in 0..levels.level_count() {
        let grid = levels.load(index).unwrap();
        assert_eq!(grid.count(Cell::PlayerSpawn), 1, "level {index}");
        assert!(grid.count(Cell::GhostSpawn) > 0, "level {index}");
        assert!(grid.has_points(), "level {index}");
    }
}

#[test]
fn clearing_every_point_advances_the_level() {
    let levels = StaticLevels::new(vec![vec![vec![0, 7, 0]], vec![vec![7, 0, 5]]]);
    let t0 = Instant::now();
    let mut s = Session::new(quiet(), &levels, 0, t0).unwrap();
    let mut rng = StdRng::seed_from_u64(2);

    for _ in 0..4 {
        tick(&mut s, &levels, &InputSnapshot::holding(Dir::Right), t0, &mut rng).unwrap();
    }
    assert_eq!(s.level, 0);
    for _ in 0..8 {
        tick(&mut s, &levels, &InputSnapshot::holding(Dir::Left), t0, &mut rng).unwrap();
    }
    assert_eq!(s.level, 1);
    assert_eq!(s.score, 20);
    assert_eq!(s.player.lives, 4);
    assert!(s.take_cues().contains(&Cue::LevelTheme));
}

// ── properties ───────────────────────────────────────────────────────────────

fn snapshot_for(key: u8) -> InputSnapshot {
    match key {
        0 => InputSnapshot::holding(Dir::Up),
        1 => InputSnapshot::holding(Dir::Down),
        2 => InputSnapshot::holding(Dir::Left),
        3 => InputSnapshot::holding(Dir::Right),
        _ => InputSnapshot::default(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn nobody_walks_into_walls(seed in any::<u64>(), keys in prop::collection::vec(0u8..5, 300)) {
        let levels = shipped_levels();
        let t0 = Instant::now();
        let tuning = Tuning { lives: 50, ..Tuning::default() };
        let mut s = Session::new(tuning, &levels, 0, t0).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);

        for (i, key) in keys.iter().enumerate() {
            let now = t0 + Duration::from_millis(33 * i as u64);
            tick(&mut s, &levels, &snapshot_for(*key), now, &mut rng).unwrap();
            prop_assert!(!overlaps_blocking(&s.grid, &s.player.body, false));
            for ghost in &s.ghosts {
                prop_assert!(!overlaps_blocking(&s.grid, &ghost.body, true));
            }
            if s.is_over() {
                break;
            }
        }
    }

    #[test]
    fn ghosts_never_reverse_on_a_decision(seed in any::<u64>()) {
        let grid = shipped_levels().load(0).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ghosts = Ghost::spawn_all(&grid, TILE);
        for _ in 0..200 {
            for ghost in ghosts.iter_mut() {
                let before = ghost.body.dir;
                match ghost.step(&grid, TILE, &mut rng).unwrap() {
                    GhostStep::Blocked | GhostStep::Junction => {
                        prop_assert_ne!(ghost.body.dir, before.reverse());
                    }
                    GhostStep::Moved | GhostStep::Teleported => {
                        prop_assert_eq!(ghost.body.dir, before);
                    }
                }
            }
        }
    }

    #[test]
    fn teleport_lands_on_the_opposite_inner_edge(
        w in 3usize..20,
        h in 3usize..20,
        along in 1usize..18,
    ) {
        let grid = Grid::with_border(&vec![vec![0; w - 2]; h - 2]).unwrap();
        let row = along.min(h - 2);
        let col = along.min(w - 2);

        let mut pos = tile_to_pixel(w - 1, row, TILE);
        prop_assert!(try_teleport(&grid, TILE, &mut pos, Dir::Right).unwrap());
        prop_assert_eq!(pos, Pos::new(TILE, row as f32 * TILE));

        let mut pos = tile_to_pixel(0, row, TILE);
        prop_assert!(try_teleport(&grid, TILE, &mut pos, Dir::Left).unwrap());
        prop_assert_eq!(pos, Pos::new(TILE * (w as f32 - 2.0), row as f32 * TILE));

        let mut pos = tile_to_pixel(col, 0, TILE);
        prop_assert!(try_teleport(&grid, TILE, &mut pos, Dir::Up).unwrap());
        prop_assert_eq!(pos, Pos::new(col as f32 * TILE, TILE * (h as f32 - 2.0)));

        let mut pos = tile_to_pixel(col, h - 1, TILE);
        prop_assert!(try_teleport(&grid, TILE, &mut pos, Dir::Down).unwrap());
        prop_assert_eq!(pos, Pos::new(col as f32 * TILE, TILE));

        let mut inside = tile_to_pixel(1, 1, TILE);
        prop_assert!(!try_teleport(&grid, TILE, &mut inside, Dir::Right).unwrap());
    }

    #[test]
    fn pickups_are_consumed_once(codes in prop::collection::vec(prop::sample::select(vec![0, -1, -2, -3, 1, 2, 5]), 1..12)) {
        let mut grid = Grid::with_border(&[codes.clone()]).unwrap();
        for x in 1..=codes.len() {
            let first = grid.consume(x, 1);
            prop_assert_eq!(first.is_some(), matches!(codes[x - 1], 0 | -2 | -3));
            prop_assert_eq!(grid.consume(x, 1), None);
        }
        prop_assert!(!grid.has_points());
    }
}
