//! Q-learning training binary.
//!
//! Usage:
//!   cargo run --release --bin train -- [OPTIONS]
//!
//! Options:
//!   --config <FILE>      Configuration JSON file (optional)
//!   --epochs <N>         Training episodes (default: 10000)
//!   --discount <F>       Discount rate in (0, 1) (default: 0.9)
//!   --players <N>        Players per self-play game (default: 1)
//!   --seed <N>           Random seed (optional)
//!   --output <FILE>      Checkpoint file (default: q_state.bin)
//!   --stats <FILE>       Write training stats JSON (optional)
//!   --eval <N>           Greedy evaluation games after training (default: 0)

use std::env;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use yahtzee_q::qlearn::{QConfig, QLearner};

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let mut config_file: Option<String> = None;
    let mut epochs: Option<u64> = None;
    let mut discount: Option<f64> = None;
    let mut players: Option<usize> = None;
    let mut seed: Option<u64> = None;
    let mut output_file = "q_state.bin".to_string();
    let mut stats_file: Option<String> = None;
    let mut eval_games: u64 = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(args[i].clone());
                }
            }
            "--epochs" | "-e" => {
                i += 1;
                if i < args.len() {
                    epochs = args[i].parse().ok();
                }
            }
            "--discount" | "-d" => {
                i += 1;
                if i < args.len() {
                    discount = args[i].parse().ok();
                }
            }
            "--players" | "-p" => {
                i += 1;
                if i < args.len() {
                    players = args[i].parse().ok();
                }
            }
            "--seed" | "-s" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().ok();
                }
            }
            "--output" | "-o" => {
                i += 1;
                if i < args.len() {
                    output_file = args[i].clone();
                }
            }
            "--stats" => {
                i += 1;
                if i < args.len() {
                    stats_file = Some(args[i].clone());
                }
            }
            "--eval" => {
                i += 1;
                if i < args.len() {
                    eval_games = args[i].parse().unwrap_or(0);
                }
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
    println!("  Yahtzee Q-Learning Trainer");
    println!("=================================================");
    println!();

    // Load or create configuration, then apply CLI overrides
    let mut config = if let Some(path) = &config_file {
        println!("Loading configuration from: {}", path);
        match QConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                return;
            }
        }
    } else {
        QConfig::default()
    };

    if let Some(n) = epochs {
        config.epochs = n;
    }
    if let Some(d) = discount {
        config.discount_rate = d;
    }
    if let Some(p) = players {
        config.players = p;
    }
    if let Some(s) = seed {
        config.seed = Some(s);
    }

    println!("Epochs: {}", config.epochs);
    println!("Discount rate: {}", config.discount_rate);
    println!("Players: {}", config.players);
    match config.seed {
        Some(s) => println!("Seed: {}", s),
        None => println!("Seed: entropy"),
    }
    println!("Output: {}", output_file);
    println!();

    let mut learner = match QLearner::new(config.clone()) {
        Ok(learner) => learner,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return;
        }
    };

    println!(
        "Tables allocated: {} states x {} actions ({:.1} MB)",
        learner.tables().num_states(),
        learner.tables().num_actions(),
        learner.tables().memory_usage() as f64 / 1024.0 / 1024.0
    );
    println!();
    println!("Starting training...");

    let progress = ProgressBar::new(config.epochs);
    progress.set_style(
        ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos:>8}/{len:8} eps | {per_sec:>10} | {msg}",
        )
        .expect("valid progress template")
        .progress_chars("##-"),
    );

    let callback_interval = (config.epochs / 100).max(1);
    let start_time = Instant::now();

    learner.train_with_callback(callback_interval, |stats| {
        progress.set_position(stats.episodes);
        progress.set_message(format!(
            "mean {:.1} | recent {:.1}",
            stats.mean_score,
            stats.recent_mean(1_000)
        ));
    });
    progress.finish_and_clear();

    let stats = learner.stats().clone();
    println!();
    println!("Training complete!");
    println!("Total time: {:.2}s", start_time.elapsed().as_secs_f64());
    println!("Episodes/second: {:.0}", stats.episodes_per_second);
    println!("Mean score: {:.2}", stats.mean_score);
    println!(
        "Mean score (last 1000 episodes): {:.2}",
        stats.recent_mean(1_000)
    );
    println!();

    // Save checkpoint
    println!("Saving checkpoint to {}...", output_file);
    match learner.save_checkpoint(&output_file) {
        Ok(()) => println!("Checkpoint saved successfully!"),
        Err(e) => eprintln!("Error saving checkpoint: {}", e),
    }

    // Optional stats export
    if let Some(path) = stats_file {
        println!("Writing stats to {}...", path);
        if let Err(e) = stats.save_json(&path) {
            eprintln!("Error saving stats: {}", e);
        }
    }

    // Optional greedy evaluation
    if eval_games > 0 {
        println!();
        println!("=== Greedy Evaluation ===");
        let scores = learner.evaluate(eval_games);
        let mean = scores.iter().map(|&s| f64::from(s)).sum::<f64>() / scores.len() as f64;
        let min = scores.iter().min().copied().unwrap_or(0);
        let max = scores.iter().max().copied().unwrap_or(0);
        println!(
            "{} games | mean {:.2} | min {} | max {}",
            eval_games, mean, min, max
        );
    }

    println!();
    println!("Done!");
}

fn print_help() {
    println!("Yahtzee Q-Learning Trainer");
    println!();
    println!("Usage: train [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <FILE>      Configuration JSON file");
    println!("  -e, --epochs <N>         Training episodes (default: 10000)");
    println!("  -d, --discount <F>       Discount rate in (0, 1) (default: 0.9)");
    println!("  -p, --players <N>        Players per self-play game (default: 1)");
    println!("  -s, --seed <N>           Random seed");
    println!("  -o, --output <FILE>      Checkpoint file (default: q_state.bin)");
    println!("      --stats <FILE>       Write training stats JSON");
    println!("      --eval <N>           Greedy evaluation games after training");
    println!("  -h, --help               Show this help");
    println!();
    println!("Examples:");
    println!("  # Train 100k episodes with a fixed seed and evaluate");
    println!("  train --epochs 100000 --seed 42 --eval 1000");
    println!();
    println!("  # Train from a JSON config and export stats");
    println!("  train --config configs/long_run.json --stats stats.json");
}
