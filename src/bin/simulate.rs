use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use std::time::Instant;

use domino::config::EngineConfig;
use domino::enums::Seat;
use domino::game::{Game, HandResult};
use domino::players::{DominoPlayer, GreedyPlayer, RandomPlayer};
use domino::session::EngineSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Opponent {
    Greedy,
    Random,
}

/// Plays engine partnerships (seats 1 and 3) against baseline players.
#[derive(Parser, Debug)]
#[command(name = "simulate", version)]
struct Args {
    /// Number of hands to play
    #[arg(short = 'n', long, default_value_t = 100)]
    hands: u64,

    /// Seed of the first deal; hand `i` uses `seed + i`
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    #[arg(short, long, value_enum, default_value_t = Opponent::Greedy)]
    opponent: Opponent,

    /// Engine sessions decide with the heuristics alone
    #[arg(long)]
    no_solver: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn seat(index: usize) -> Seat {
    Seat::from_index(index)
}

fn lineup(args: &Args, deal_seed: u64) -> Vec<Box<dyn DominoPlayer>> {
    let config = if args.no_solver {
        EngineConfig::without_solver()
    } else {
        EngineConfig::default()
    };
    (0..4)
        .map(|index| -> Box<dyn DominoPlayer> {
            if index % 2 == 0 {
                Box::new(EngineSession::with_config(config.clone()).pinned(seat(index)))
            } else {
                match args.opponent {
                    Opponent::Greedy => Box::new(GreedyPlayer::new()),
                    Opponent::Random => Box::new(RandomPlayer::new(deal_seed ^ index as u64)),
                }
            }
        })
        .collect()
}

fn play_hand(args: &Args, deal_seed: u64) -> Option<HandResult> {
    let mut game = Game::deal(deal_seed);
    let mut players = lineup(args, deal_seed);
    match game.play_out(&mut players) {
        Ok(result) => Some(result),
        Err(e) => {
            log::error!("Hand with seed {} aborted: {}", deal_seed, e);
            None
        }
    }
}

/// Leaves an explicit `RUST_LOG` alone, otherwise logs at `info`.
fn default_log_filter() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
}

fn main() {
    default_log_filter();
    env_logger::init();
    let args = Args::parse();

    println!("Domino simulation");
    println!("=================");
    println!("  - Hands: {}", args.hands);
    println!("  - Opponent: {:?}", args.opponent);
    println!("  - Endgame solver: {}", !args.no_solver);

    let start = Instant::now();
    let results: Vec<HandResult> = (0..args.hands)
        .into_par_iter()
        .filter_map(|i| play_hand(&args, args.seed.wrapping_add(i)))
        .collect();

    let completed = results.len();
    let engine_wins = results.iter().filter(|r| r.team_won(seat(0))).count();
    let blocked = results.iter().filter(|r| r.blocked).count();
    let turns: usize = results.iter().map(|r| r.turns).sum();

    if args.verbose {
        for (i, result) in results.iter().enumerate() {
            println!(
                "  Hand {}: seat {} partnership in {} turns{}",
                i + 1,
                result.winner,
                result.turns,
                if result.blocked { " (blocked)" } else { "" }
            );
        }
    }

    println!("\nResults:");
    println!("========");
    if completed == 0 {
        println!("No hand completed");
        return;
    }
    let rate = |count: usize| count as f64 / completed as f64 * 100.0;
    println!("Engine (seats 1 and 3): {} wins ({:.1}%)", engine_wins, rate(engine_wins));
    println!(
        "{:?} (seats 2 and 4): {} wins ({:.1}%)",
        args.opponent,
        completed - engine_wins,
        rate(completed - engine_wins)
    );
    println!("Blocked hands: {} ({:.1}%)", blocked, rate(blocked));
    println!("Completed hands: {}/{}", completed, args.hands);
    println!("Average turns per hand: {:.1}", turns as f64 / completed as f64);
    println!("Elapsed: {:?}", start.elapsed());
}
