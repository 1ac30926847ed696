//! AI-vs-AI self-play.
//!
//! Plays complete games through the public engine and evaluator surface,
//! pitting any two difficulty tiers against each other, and produces one
//! record per game: the winner (if any), move and capture counts, and the
//! board width. Records serialize to JSONL for whatever store consumes
//! match results.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::board::piece::Player;
use crate::engine::{TabEngine, DEFAULT_COLUMNS};
use crate::eval::{choose_move, Difficulty};

/// Configuration for a self-play run.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Board width (clamped odd into the engine's range).
    pub columns: u8,
    /// Tier playing player one.
    pub tier_one: Difficulty,
    /// Tier playing player two.
    pub tier_two: Difficulty,
    /// Turn cap after which an undecided game is recorded as a draw.
    pub max_turns: u32,
    /// Number of parallel threads; 1 plays sequentially.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Suppress per-game progress output.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            columns: DEFAULT_COLUMNS,
            tier_one: Difficulty::Hard,
            tier_two: Difficulty::Hard,
            max_turns: 2000,
            threads: 1,
            seed: 0,
            quiet: false,
        }
    }
}

/// Result of one self-play game.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    /// Sequential game ID within the run.
    pub game_id: usize,
    /// Board width the game was played at.
    pub columns: u8,
    /// The winning side, or `None` for a turn-capped draw.
    pub winner: Option<Player>,
    /// Turns taken, counting both moves and forced passes.
    pub turns: u32,
    /// Moves actually executed (passes excluded).
    pub moves: u32,
    /// Captures made by player one.
    pub captures_by_one: u32,
    /// Captures made by player two.
    pub captures_by_two: u32,
}

/// Plays a single game to completion (or the turn cap) and records it.
pub fn play_game(config: &SelfPlayConfig, game_id: usize, rng: &mut SmallRng) -> GameRecord {
    let mut engine = TabEngine::seeded(config.columns, rng.gen());
    let mut record = GameRecord {
        game_id,
        columns: engine.columns(),
        winner: None,
        turns: 0,
        moves: 0,
        captures_by_one: 0,
        captures_by_two: 0,
    };

    while engine.winner().is_none() && record.turns < config.max_turns {
        record.turns += 1;
        let mover = engine.current_player();
        let tier = match mover {
            Player::One => config.tier_one,
            Player::Two => config.tier_two,
        };

        if engine.can_roll() {
            engine.roll_die().expect("roll with no die pending");
        }

        match choose_move(&engine, tier, rng) {
            Some(mv) => {
                engine.select(mv.from);
                let outcome = engine
                    .move_selected(mv.to)
                    .expect("evaluator chose an illegal move");
                record.moves += 1;
                if outcome.captured.is_some() {
                    match mover {
                        Player::One => record.captures_by_one += 1,
                        Player::Two => record.captures_by_two += 1,
                    }
                }
            }
            None => {
                engine.pass_turn().expect("pass with moves available");
            }
        }
    }

    record.winner = engine.winner();
    record
}

/// Runs self-play, producing all game records.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
pub fn run_self_play(config: &SelfPlayConfig) -> Vec<GameRecord> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(config, |game| {
        games.push(game);
    });
    games.sort_by_key(|g| g.game_id);
    games
}

/// Runs self-play, calling `on_game` with each completed record so the
/// caller can process games incrementally (e.g. stream to disk).
pub fn run_self_play_with_callback<F>(config: &SelfPlayConfig, on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    if config.threads > 1 {
        run_self_play_parallel(config, on_game);
    } else {
        run_self_play_sequential(config, on_game);
    }
}

/// Sequential self-play: plays games one at a time.
fn run_self_play_sequential<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord),
{
    for i in 0..config.num_games {
        let mut rng = game_rng(config, i);
        let game_start = Instant::now();
        let game = play_game(config, i, &mut rng);
        if !config.quiet {
            report_progress(config, i + 1, &game, game_start.elapsed().as_secs_f64());
        }
        on_game(game);
    }
}

/// Parallel self-play: plays games concurrently using rayon.
/// A channel delivers completed games to the callback from worker threads.
fn run_self_play_parallel<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<GameRecord>();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .expect("failed to build rayon thread pool");

    let config_clone = config.clone();
    let handle = std::thread::spawn(move || {
        pool.install(|| {
            (0..config_clone.num_games)
                .into_par_iter()
                .for_each_with(tx, |tx, i| {
                    let mut rng = game_rng(&config_clone, i);
                    let game_start = Instant::now();
                    let game = play_game(&config_clone, i, &mut rng);
                    if !config_clone.quiet {
                        let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        report_progress(
                            &config_clone,
                            n,
                            &game,
                            game_start.elapsed().as_secs_f64(),
                        );
                    }
                    let _ = tx.send(game);
                });
        });
    });

    // Receive completed games on the main thread and pass to the callback.
    for game in rx {
        on_game(game);
    }

    handle.join().expect("self-play worker thread panicked");
}

/// Writes one JSON object per line for each game record.
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    Ok(())
}

fn game_rng(config: &SelfPlayConfig, game_index: usize) -> SmallRng {
    if config.seed != 0 {
        SmallRng::seed_from_u64(config.seed.wrapping_add(game_index as u64))
    } else {
        SmallRng::from_entropy()
    }
}

fn report_progress(config: &SelfPlayConfig, n: usize, game: &GameRecord, elapsed: f64) {
    let outcome = match game.winner {
        Some(Player::One) => "player one wins",
        Some(Player::Two) => "player two wins",
        None => "draw",
    };
    eprintln!(
        "Game {}/{}: {} after {} turns ({:.1}s)",
        n, config.num_games, outcome, game.turns, elapsed,
    );
}
