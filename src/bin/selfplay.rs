//! Self-play CLI.
//!
//! Plays Tâb games between two computer tiers and outputs one JSON record
//! per game as JSONL.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N       Number of games to play (default: 10)
//!   --columns N     Board width, odd, 7-15 (default: 9)
//!   --p1 TIER       Tier for player one: easy|medium|hard (default: hard)
//!   --p2 TIER       Tier for player two: easy|medium|hard (default: hard)
//!   --max-turns N   Turn cap per game (default: 2000)
//!   --threads N     Number of parallel threads (default: 1)
//!   --seed N        Random seed, 0 for entropy (default: 0)
//!   --output FILE   Output file path (default: stdout)
//!   --quiet         Suppress progress and summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::time::Instant;

use tab_engine::board::piece::Player;
use tab_engine::eval::Difficulty;
use tab_engine::selfplay::{self, GameRecord, SelfPlayConfig};

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut output_path: Option<String> = None;
    let mut quiet = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => {
                i += 1;
                config.num_games = args[i].parse().expect("invalid --games value");
            }
            "--columns" => {
                i += 1;
                config.columns = args[i].parse().expect("invalid --columns value");
            }
            "--p1" => {
                i += 1;
                config.tier_one =
                    Difficulty::from_name(&args[i]).expect("invalid --p1 value");
            }
            "--p2" => {
                i += 1;
                config.tier_two =
                    Difficulty::from_name(&args[i]).expect("invalid --p2 value");
            }
            "--max-turns" => {
                i += 1;
                config.max_turns = args[i].parse().expect("invalid --max-turns value");
            }
            "--threads" => {
                i += 1;
                config.threads = args[i].parse().expect("invalid --threads value");
            }
            "--seed" => {
                i += 1;
                config.seed = args[i].parse().expect("invalid --seed value");
            }
            "--output" => {
                i += 1;
                output_path = Some(args[i].clone());
            }
            "--quiet" => {
                quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    config.quiet = quiet;

    if !quiet {
        eprintln!(
            "Self-play: {} games on {} columns, {} vs {}, max {} turns, {} threads",
            config.num_games,
            config.columns,
            config.tier_one.name(),
            config.tier_two.name(),
            config.max_turns,
            config.threads
        );
    }

    let start = Instant::now();
    let games = selfplay::run_self_play(&config);
    let elapsed = start.elapsed();

    if !quiet {
        eprintln!(
            "Completed {} games in {:.1}s",
            games.len(),
            elapsed.as_secs_f64()
        );
        print_summary(&games, &config);
    }

    match output_path {
        Some(path) => {
            let file = File::create(&path).expect("failed to create output file");
            let mut writer = BufWriter::new(file);
            selfplay::write_jsonl(&games, &mut writer).expect("failed to write output");
            if !quiet {
                eprintln!("Wrote {} games to {}", games.len(), path);
            }
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            selfplay::write_jsonl(&games, &mut writer).expect("failed to write output");
        }
    }
}

fn print_summary(games: &[GameRecord], config: &SelfPlayConfig) {
    let one_wins = games
        .iter()
        .filter(|g| g.winner == Some(Player::One))
        .count();
    let two_wins = games
        .iter()
        .filter(|g| g.winner == Some(Player::Two))
        .count();
    let draws = games.len() - one_wins - two_wins;
    let avg_turns = if games.is_empty() {
        0.0
    } else {
        games.iter().map(|g| g.turns as f64).sum::<f64>() / games.len() as f64
    };

    eprintln!(
        "Player one ({}): {} wins; player two ({}): {} wins; draws: {}; avg turns: {:.1}",
        config.tier_one.name(),
        one_wins,
        config.tier_two.name(),
        two_wins,
        draws,
        avg_turns
    );
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N       Number of games to play (default: 10)");
    eprintln!("  --columns N     Board width, odd, 7-15 (default: 9)");
    eprintln!("  --p1 TIER       Tier for player one: easy|medium|hard (default: hard)");
    eprintln!("  --p2 TIER       Tier for player two: easy|medium|hard (default: hard)");
    eprintln!("  --max-turns N   Turn cap per game (default: 2000)");
    eprintln!("  --threads N     Number of parallel threads (default: 1)");
    eprintln!("  --seed N        Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE   Output file path (default: stdout)");
    eprintln!("  --quiet         Suppress progress and summary output");
    eprintln!("  --help          Show this help");
}
