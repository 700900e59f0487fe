//! Tests for the generation tick loop and the training driver.

#![allow(clippy::float_cmp)]

mod common;

use std::fs;

use flappy_evo::checkpoint;
use flappy_evo::frontend::{FrameView, Frontend, Headless};
use flappy_evo::neat::{NeatConfig, Population};
use flappy_evo::simulation::mask::SpriteMasks;
use flappy_evo::trainer::{
    run_generation, CancelToken, Controller, Trainer, CHECKPOINT_LABEL, WINNER_LABEL,
};
use ndarray::{array, Array1};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use common::{block_on, create_test_params};

/// A scripted controller that always emits the same action value.
struct Always(f32);

impl Controller for Always {
    fn activate(&mut self, _sensors: &Array1<f32>) -> Array1<f32> {
        array![self.0]
    }
}

/// A frontend that requests quit after a fixed number of ticks.
struct QuitAfter {
    remaining: u64,
}

impl Frontend for QuitAfter {
    fn poll_quit(&mut self) -> bool {
        if self.remaining == 0 {
            return true;
        }
        self.remaining -= 1;
        false
    }

    fn draw(&mut self, _view: &FrameView) {}

    async fn present(&mut self) {}
}

#[test]
fn test_never_jumping_bird_falls_to_the_floor() {
    let params = create_test_params();
    let masks = SpriteMasks::default();
    let mut controllers = [Always(0.0)];
    let mut fitness = [0.0f64];
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let result = block_on(run_generation(
        &params,
        &masks,
        &mut controllers,
        &mut fitness,
        1,
        &mut Headless,
        &CancelToken::new(),
        &mut rng,
    ));

    assert!(!result.aborted);
    assert_eq!(result.score, 0);
    // Free fall from y = 350 reaches the floor on tick 23.
    assert_eq!(result.ticks, 23);
    // 23 survival rewards minus one elimination penalty.
    assert!((fitness[0] - 1.3).abs() < 1e-9);
}

#[test]
fn test_constant_jumper_outlives_constant_faller() {
    let params = create_test_params();
    let masks = SpriteMasks::default();
    let mut controllers = [Always(1.0)];
    let mut fitness = [0.0f64];
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let result = block_on(run_generation(
        &params,
        &masks,
        &mut controllers,
        &mut fitness,
        1,
        &mut Headless,
        &CancelToken::new(),
        &mut rng,
    ));

    assert!(!result.aborted);
    // Climbing at the ascent rate from y = 350 crosses the ceiling on
    // tick 38, well after the faller hits the floor.
    assert_eq!(result.ticks, 38);
    assert!((fitness[0] - 2.8).abs() < 1e-9);
}

#[test]
fn test_pass_event_scores_and_rewards_survivors() {
    // No gravity and a gap pinned around the spawn height: the bird hovers
    // inside the gap and the first pipe sails past it.
    let mut params = create_test_params();
    params.gravity = 0.0;
    params.gap_min = 300.0;
    params.gap_max = 300.0001;

    let masks = SpriteMasks::default();
    let mut controllers = [Always(0.0)];
    let mut fitness = [0.0f64];
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut frontend = QuitAfter { remaining: 150 };

    let result = block_on(run_generation(
        &params,
        &masks,
        &mut controllers,
        &mut fitness,
        1,
        &mut frontend,
        &CancelToken::new(),
        &mut rng,
    ));

    assert!(result.aborted);
    assert_eq!(result.ticks, 150);
    // The first pipe (x = 700, 5 px per tick) clears the bird at tick 95;
    // the replacement never catches up within 150 ticks.
    assert_eq!(result.score, 1);
    // 150 survival rewards plus one pass reward, no penalty.
    assert!((fitness[0] - 20.0).abs() < 1e-9);
}

#[test]
fn test_pass_reward_goes_to_every_survivor_and_skips_the_dead() {
    // Same hovering setup as above, but with three slots: the two fallers
    // hover inside the gap while the jumper in the middle hits the ceiling
    // long before the pass.
    let mut params = create_test_params();
    params.gravity = 0.0;
    params.gap_min = 300.0;
    params.gap_max = 300.0001;

    let masks = SpriteMasks::default();
    let mut controllers = [Always(0.0), Always(1.0), Always(0.0)];
    let mut fitness = [0.0f64; 3];
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut frontend = QuitAfter { remaining: 150 };

    let result = block_on(run_generation(
        &params,
        &masks,
        &mut controllers,
        &mut fitness,
        1,
        &mut frontend,
        &CancelToken::new(),
        &mut rng,
    ));

    assert!(result.aborted);
    assert_eq!(result.score, 1);
    // The jumper climbs 12.5 per tick with gravity off and crosses the
    // ceiling on tick 34, well before the pass on tick 95: 34 survival
    // rewards minus the elimination penalty, and no pass bonus.
    assert!((fitness[1] - 2.4).abs() < 1e-9);
    // Both survivors collect the pass bonus on top of 150 survival rewards.
    assert!((fitness[0] - 20.0).abs() < 1e-9);
    assert!((fitness[2] - 20.0).abs() < 1e-9);
}

#[test]
fn test_extreme_pipe_velocity_keeps_a_target_pipe() {
    // Fast enough to carry a pipe from its spawn point to fully off screen
    // within a single tick; the stream must be replenished immediately.
    let mut params = create_test_params();
    params.pipe_velocity = 810.0;

    let masks = SpriteMasks::default();
    let mut controllers = [Always(0.0)];
    let mut fitness = [0.0f64];
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let result = block_on(run_generation(
        &params,
        &masks,
        &mut controllers,
        &mut fitness,
        1,
        &mut Headless,
        &CancelToken::new(),
        &mut rng,
    ));

    assert!(!result.aborted);
    // Pipes vanish before the pass check ever sees them.
    assert_eq!(result.score, 0);
    assert_eq!(result.ticks, 23);
}

#[test]
fn test_fitness_slots_track_their_controller_after_deaths() {
    let params = create_test_params();
    let masks = SpriteMasks::default();
    let mut controllers = [Always(0.0), Always(1.0), Always(0.0)];
    let mut fitness = [0.0f64; 3];
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let result = block_on(run_generation(
        &params,
        &masks,
        &mut controllers,
        &mut fitness,
        1,
        &mut Headless,
        &CancelToken::new(),
        &mut rng,
    ));

    // The two fallers die first; the jumper in the middle slot must keep
    // accumulating into its own entry.
    assert!(!result.aborted);
    assert!((fitness[0] - 1.3).abs() < 1e-9);
    assert!((fitness[1] - 2.8).abs() < 1e-9);
    assert!((fitness[2] - 1.3).abs() < 1e-9);
}

#[test]
fn test_cancelled_token_aborts_before_the_first_tick() {
    let params = create_test_params();
    let masks = SpriteMasks::default();
    let mut controllers = [Always(0.0)];
    let mut fitness = [0.0f64];
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let cancel = CancelToken::new();
    cancel.cancel();

    let result = block_on(run_generation(
        &params,
        &masks,
        &mut controllers,
        &mut fitness,
        1,
        &mut Headless,
        &cancel,
        &mut rng,
    ));

    assert!(result.aborted);
    assert_eq!(result.ticks, 0);
    assert_eq!(result.score, 0);
    assert_eq!(fitness[0], 0.0);
}

#[test]
fn test_score_checkpoint_saves_a_snapshot() {
    let dir = std::env::temp_dir().join("flappy-evo-checkpoint-score-test");
    fs::remove_dir_all(&dir).ok();

    // A zero checkpoint trips at the end of the first tick, whatever the
    // controllers do.
    let mut params = create_test_params();
    params.score_checkpoint = 0;
    let mut trainer = Trainer::new(params, Headless, &dir).unwrap();

    let config = NeatConfig {
        population_size: 5,
        ..NeatConfig::default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut population = Population::new(config, &mut rng);

    let result = block_on(trainer.eval_generation(&mut population)).unwrap();
    assert!(!result.aborted);

    let snapshot = checkpoint::load_genome(&dir, CHECKPOINT_LABEL).unwrap();
    assert!(snapshot.fitness > 0.0);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_trainer_rejects_invalid_params() {
    let mut params = create_test_params();
    params.gap_min = 500.0;
    params.gap_max = 100.0;
    assert!(Trainer::new(params, Headless, "unused").is_err());
}

#[test]
fn test_trainer_runs_headless_and_saves_a_winner() {
    let dir = std::env::temp_dir().join("flappy-evo-trainer-test");
    fs::remove_dir_all(&dir).ok();

    let params = create_test_params();
    let mut trainer = Trainer::new(params, Headless, &dir).unwrap();

    let config = NeatConfig {
        population_size: 10,
        ..NeatConfig::default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut population = Population::new(config, &mut rng);

    let winner = block_on(trainer.train(&mut population, 2)).unwrap();
    let (best, best_fitness) = trainer.best().unwrap();
    assert_eq!(winner.key, best.key);

    let snapshot = checkpoint::load_genome(&dir, WINNER_LABEL).unwrap();
    assert_eq!(snapshot.genome.key, winner.key);
    assert_eq!(snapshot.fitness, best_fitness);

    fs::remove_dir_all(&dir).ok();
}
