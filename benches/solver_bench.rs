//! Benchmarks for the scoring engine, state encoder, and trainer.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use yahtzee_q::game::{legal_actions, score_roll, GameState, RerollChoice};
use yahtzee_q::qlearn::{QConfig, QLearner, StateEncoder};

fn score_roll_benchmark(c: &mut Criterion) {
    c.bench_function("score_roll_full_house", |b| {
        b.iter(|| score_roll(black_box(&[2, 2, 3, 3, 3])))
    });
    c.bench_function("score_roll_straight", |b| {
        b.iter(|| score_roll(black_box(&[1, 2, 3, 4, 5])))
    });
}

fn state_encoding_benchmark(c: &mut Criterion) {
    let encoder = StateEncoder::new();
    let mut rng = StdRng::seed_from_u64(42);
    let state = GameState::new(1, &mut rng)
        .apply_reroll(RerollChoice::full(), &mut rng)
        .unwrap();

    c.bench_function("state_to_id", |b| {
        b.iter(|| encoder.state_to_id(black_box(&state)))
    });
}

fn legal_actions_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let state = GameState::new(1, &mut rng)
        .apply_reroll(RerollChoice::full(), &mut rng)
        .unwrap();

    c.bench_function("legal_actions", |b| {
        b.iter(|| legal_actions(black_box(&state)).len())
    });
}

fn training_episode_benchmark(c: &mut Criterion) {
    // One learner for the whole benchmark; each train() call runs the
    // configured single episode against the accumulated tables
    let config = QConfig::default().with_epochs(1).with_seed(42);
    let mut learner = QLearner::new(config).expect("valid config");

    c.bench_function("train_single_episode", |b| {
        b.iter(|| {
            learner.train();
            black_box(learner.stats().episodes)
        })
    });

    c.bench_function("greedy_episode", |b| {
        b.iter(|| black_box(learner.play_greedy_episode()))
    });
}

criterion_group!(
    benches,
    score_roll_benchmark,
    state_encoding_benchmark,
    legal_actions_benchmark,
    training_episode_benchmark
);
criterion_main!(benches);
