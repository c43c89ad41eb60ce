//! Checkpoint evaluation binary.
//!
//! Plays the greedy trained agent over many independent games in
//! parallel, optionally next to the random baseline for comparison.
//!
//! Usage:
//!   cargo run --release --bin play -- [OPTIONS]
//!
//! Options:
//!   --checkpoint <FILE>  Checkpoint to load (default: q_state.bin)
//!   --games <N>          Games to play (default: 1000)
//!   --players <N>        Players per game (default: 1)
//!   --seed <N>           Base seed for per-game seeds (optional)
//!   --random             Also run the random baseline

use std::env;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use yahtzee_q::agent::{run_game, RandomAgent, TrainedAgent};
use yahtzee_q::qlearn::QTables;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let mut checkpoint_file = "q_state.bin".to_string();
    let mut games: u64 = 1_000;
    let mut players: usize = 1;
    let mut seed: Option<u64> = None;
    let mut with_baseline = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--checkpoint" | "-c" => {
                i += 1;
                if i < args.len() {
                    checkpoint_file = args[i].clone();
                }
            }
            "--games" | "-g" => {
                i += 1;
                if i < args.len() {
                    games = args[i].parse().unwrap_or(1_000);
                }
            }
            "--players" | "-p" => {
                i += 1;
                if i < args.len() {
                    players = args[i].parse().unwrap_or(1);
                }
            }
            "--seed" | "-s" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().ok();
                }
            }
            "--random" | "-r" => {
                with_baseline = true;
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                return;
            }
        }
        i += 1;
    }

    println!("=================================================");
    println!("  Yahtzee Policy Evaluation");
    println!("=================================================");
    println!();

    // Load the checkpoint; a broken file is an error, never a zero table
    println!("Loading checkpoint from {}...", checkpoint_file);
    let (tables, meta) = match QTables::load(&checkpoint_file) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading checkpoint: {}", e);
            return;
        }
    };
    println!(
        "Loaded {} states x {} actions | trained {} episodes | discount {} | exploration threshold {}",
        tables.num_states(),
        tables.num_actions(),
        meta.epochs,
        meta.discount_rate,
        meta.exploration_threshold
    );

    let base_seed = seed.unwrap_or_else(rand::random);
    println!("Games: {} | Players: {} | Base seed: {}", games, players, base_seed);
    println!();

    let tables = Arc::new(tables);
    let start_time = Instant::now();

    // Each game gets its own agent and seed; the tables are shared
    // read-only across the pool
    let scores: Vec<u32> = (0..games)
        .into_par_iter()
        .map(|game| {
            let game_seed = base_seed.wrapping_add(game);
            let mut agent = TrainedAgent::with_seed(Arc::clone(&tables), game_seed);
            let final_state = run_game(&mut agent, players, game_seed)
                .expect("trained agent plays legally");
            final_state.total_score(0)
        })
        .collect();

    let elapsed = start_time.elapsed().as_secs_f64();
    println!("=== Trained Agent ===");
    print_summary(&scores, elapsed);

    if with_baseline {
        let start_time = Instant::now();
        let scores: Vec<u32> = (0..games)
            .into_par_iter()
            .map(|game| {
                let game_seed = base_seed.wrapping_add(game);
                let mut agent = RandomAgent::with_seed(game_seed);
                let final_state = run_game(&mut agent, players, game_seed)
                    .expect("random agent plays legally");
                final_state.total_score(0)
            })
            .collect();

        let elapsed = start_time.elapsed().as_secs_f64();
        println!();
        println!("=== Random Baseline ===");
        print_summary(&scores, elapsed);
    }

    println!();
    println!("Done!");
}

fn print_summary(scores: &[u32], elapsed: f64) {
    let mean = scores.iter().map(|&s| f64::from(s)).sum::<f64>() / scores.len() as f64;
    let min = scores.iter().min().copied().unwrap_or(0);
    let max = scores.iter().max().copied().unwrap_or(0);
    println!(
        "{} games in {:.2}s ({:.0} games/s)",
        scores.len(),
        elapsed,
        scores.len() as f64 / elapsed
    );
    println!("Mean score: {:.2} | Min: {} | Max: {}", mean, min, max);
}

fn print_help() {
    println!("Yahtzee Policy Evaluation");
    println!();
    println!("Usage: play [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --checkpoint <FILE>  Checkpoint to load (default: q_state.bin)");
    println!("  -g, --games <N>          Games to play (default: 1000)");
    println!("  -p, --players <N>        Players per game (default: 1)");
    println!("  -s, --seed <N>           Base seed for per-game seeds");
    println!("  -r, --random             Also run the random baseline");
    println!("  -h, --help               Show this help");
    println!();
    println!("Examples:");
    println!("  # Evaluate a checkpoint over 10k parallel games");
    println!("  play --checkpoint q_state.bin --games 10000");
    println!();
    println!("  # Reproducible comparison against the random baseline");
    println!("  play --games 2000 --seed 7 --random");
}
