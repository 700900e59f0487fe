//! The population evaluator: per-generation tick loop and training driver.
//!
//! Every generation the whole population is simulated at once, one bird and
//! one controller per genome, advanced in lock-step on a single thread.
//! Eliminated entries are tombstoned in place, so index `i` refers to the
//! same genome/bird/controller triple for the entire generation.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info, warn};
use ndarray::{Array1, array};
use rand::Rng;

use crate::checkpoint;
use crate::error::TrainingError;
use crate::frontend::{FrameView, Frontend};
use crate::neat::{Genome, Network, Population};
use crate::simulation::bird::Bird;
use crate::simulation::mask::{PIPE_WIDTH, SpriteMasks};
use crate::simulation::params::Params;
use crate::simulation::pipe::PipePair;

/// Snapshot label used for the final best genome.
pub const WINNER_LABEL: &str = "winner";
/// Snapshot label used when training is interrupted.
pub const INTERRUPTED_LABEL: &str = "interrupted_best";
/// Snapshot label used when a generation reaches the score checkpoint.
pub const CHECKPOINT_LABEL: &str = "checkpoint";

/// A decision function: 3-float sensory vector in, 1-float action out.
///
/// The evaluator is generic over this capability, never over a concrete
/// network representation.
pub trait Controller {
    /// Maps the sensory vector to the action vector.
    fn activate(&mut self, sensors: &Array1<f32>) -> Array1<f32>;
}

impl Controller for Network {
    fn activate(&mut self, sensors: &Array1<f32>) -> Array1<f32> {
        Network::activate(self, sensors)
    }
}

/// Cooperative cancellation flag, polled once per tick.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; the current generation unwinds at its next
    /// poll point.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// True once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Outcome of one generation's tick loop.
#[derive(Debug, Clone, Copy)]
pub struct GenerationResult {
    /// Obstacles passed before the generation ended.
    pub score: u32,
    /// Ticks simulated.
    pub ticks: u64,
    /// True if the loop ended on cancellation or a quit signal instead of
    /// running to completion; an aborted generation has no winner.
    pub aborted: bool,
}

struct Slot {
    bird: Bird,
    alive: bool,
}

/// Runs one generation: the synchronized tick loop over all controllers.
///
/// `controllers[i]` and `fitness[i]` refer to the same logical entity
/// throughout; eliminations flip an alive flag instead of removing entries,
/// so the correspondence can never drift.
#[allow(clippy::too_many_arguments)]
pub async fn run_generation<C, F, R>(
    params: &Params,
    masks: &SpriteMasks,
    controllers: &mut [C],
    fitness: &mut [f64],
    generation: u64,
    frontend: &mut F,
    cancel: &CancelToken,
    rng: &mut R,
) -> GenerationResult
where
    C: Controller,
    F: Frontend,
    R: Rng,
{
    assert_eq!(controllers.len(), fitness.len());

    let mut slots: Vec<Slot> = (0..controllers.len())
        .map(|_| Slot {
            bird: Bird::new(params.spawn_x, params.spawn_y),
            alive: true,
        })
        .collect();
    let mut pipes = vec![PipePair::spawn(params.first_pipe_x, params, rng)];
    let mut score = 0u32;
    let mut ticks = 0u64;

    while slots.iter().any(|s| s.alive) {
        if cancel.is_cancelled() || frontend.poll_quit() {
            info!("generation {generation} aborted after {ticks} ticks");
            return GenerationResult {
                score,
                ticks,
                aborted: true,
            };
        }

        // Controllers need the upcoming gap, not a pair already behind them.
        let lead = slots
            .iter()
            .position(|s| s.alive)
            .expect("loop condition guarantees a live slot");
        let pipe_target = if pipes.len() > 1
            && slots[lead].bird.x > pipes[0].x + PIPE_WIDTH as f32
        {
            1
        } else {
            0
        };
        let (target_gap, target_bottom) = (pipes[pipe_target].gap_y, pipes[pipe_target].bottom);

        for (i, slot) in slots.iter_mut().enumerate() {
            if !slot.alive {
                continue;
            }
            slot.bird.advance(params);
            fitness[i] += params.survival_reward;

            let sensors = array![
                slot.bird.y,
                (slot.bird.y - target_gap).abs(),
                (slot.bird.y - target_bottom).abs(),
            ];
            let action = controllers[i].activate(&sensors);
            if action[0] > params.jump_threshold {
                slot.bird.jump(params);
            }
        }

        for pipe in &mut pipes {
            pipe.advance(params);
            for (i, slot) in slots.iter_mut().enumerate() {
                if slot.alive && pipe.collide(&slot.bird, masks) {
                    fitness[i] -= params.collision_penalty;
                    slot.alive = false;
                }
            }
        }
        pipes.retain(|p| !p.is_offscreen());

        // Pass detection runs against the lead surviving bird; all birds
        // share the same x, so it stands in for the whole population.
        let mut add_pipe = false;
        if let Some(lead) = slots.iter().position(|s| s.alive) {
            let lead_x = slots[lead].bird.x;
            for pipe in &mut pipes {
                if pipe.has_been_passed(lead_x) {
                    pipe.mark_passed();
                    add_pipe = true;
                }
            }
        }
        if add_pipe {
            score += 1;
            info!("generation {generation}: score reached {score}");
            for (i, slot) in slots.iter().enumerate() {
                if slot.alive {
                    fitness[i] += params.pass_reward;
                }
            }
            pipes.push(PipePair::spawn(params.win_width, params, rng));
        }
        if pipes.is_empty() {
            // A stream fast enough to clear the screen in one tick would
            // otherwise leave the next tick without a target.
            pipes.push(PipePair::spawn(params.win_width, params, rng));
        }

        for (i, slot) in slots.iter_mut().enumerate() {
            if slot.alive && slot.bird.out_of_bounds(params.floor_y, params.ceiling_y) {
                fitness[i] -= params.collision_penalty;
                slot.alive = false;
            }
        }

        ticks += 1;

        let birds: Vec<&Bird> = slots.iter().filter(|s| s.alive).map(|s| &s.bird).collect();
        frontend.draw(&FrameView {
            birds: &birds,
            pipes: &pipes,
            pipe_target,
            score,
            generation,
            params,
        });
        frontend.present().await;

        if score >= params.score_checkpoint {
            info!(
                "generation {generation}: score checkpoint {} reached, ending early",
                params.score_checkpoint
            );
            break;
        }
    }

    GenerationResult {
        score,
        ticks,
        aborted: false,
    }
}

/// Drives training across generations: evaluates the population, tracks the
/// best genome ever seen, and hands fitness back to the evolutionary engine.
pub struct Trainer<F: Frontend> {
    params: Params,
    masks: SpriteMasks,
    frontend: F,
    cancel: CancelToken,
    checkpoint_dir: PathBuf,
    generation: u64,
    best_fitness: f64,
    best_genome: Option<Genome>,
}

impl<F: Frontend> Trainer<F> {
    /// Creates a trainer, validating the configuration up front.
    pub fn new(
        params: Params,
        frontend: F,
        checkpoint_dir: impl Into<PathBuf>,
    ) -> Result<Self, TrainingError> {
        params.validate()?;
        Ok(Self {
            params,
            masks: SpriteMasks::default(),
            frontend,
            cancel: CancelToken::new(),
            checkpoint_dir: checkpoint_dir.into(),
            generation: 0,
            best_fitness: f64::NEG_INFINITY,
            best_genome: None,
        })
    }

    /// A handle for requesting cancellation from outside the tick loop.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The best genome seen so far and its fitness, if any generation has
    /// completed.
    pub fn best(&self) -> Option<(&Genome, f64)> {
        self.best_genome.as_ref().map(|g| (g, self.best_fitness))
    }

    /// Runs up to `max_generations` generations and returns the best genome.
    ///
    /// On cancellation the best-known genome is saved on a best-effort basis
    /// before [`TrainingError::Interrupted`] is returned.
    pub async fn train(
        &mut self,
        population: &mut Population,
        max_generations: u64,
    ) -> Result<Genome, TrainingError> {
        info!(
            "starting training: {} genomes, up to {max_generations} generations",
            population.genomes().len()
        );

        for round in 0..max_generations {
            let result = self.eval_generation(population).await?;
            if result.aborted {
                self.save_best(INTERRUPTED_LABEL);
                return Err(TrainingError::Interrupted);
            }
            if population.threshold_reached() {
                info!(
                    "fitness threshold {} reached at generation {}",
                    population.config().fitness_threshold,
                    self.generation
                );
                break;
            }
            if round + 1 < max_generations {
                population.evolve(&mut rand::rng());
            }
        }

        let winner = self
            .best_genome
            .clone()
            .ok_or_else(|| TrainingError::Evaluation("no generation was evaluated".into()))?;
        self.save_best(WINNER_LABEL);
        info!("training complete, best fitness {:.2}", self.best_fitness);
        Ok(winner)
    }

    /// Evaluates every genome of the current generation, writing a fitness
    /// value into each one.
    pub async fn eval_generation(
        &mut self,
        population: &mut Population,
    ) -> Result<GenerationResult, TrainingError> {
        self.generation += 1;
        let generation = self.generation;
        info!("starting generation {generation}");

        let genomes = population.genomes_mut();
        for genome in genomes.iter_mut() {
            genome.fitness = 0.0;
        }
        let mut controllers = genomes
            .iter()
            .map(Network::try_from_genome)
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| error!("generation {generation} failed: {e}"))?;
        let mut fitness = vec![0.0f64; genomes.len()];

        let result = run_generation(
            &self.params,
            &self.masks,
            &mut controllers,
            &mut fitness,
            generation,
            &mut self.frontend,
            &self.cancel,
            &mut rand::rng(),
        )
        .await;

        for (genome, value) in genomes.iter_mut().zip(&fitness) {
            genome.fitness = *value;
        }

        // An aborted generation discards its partial results; the
        // cross-generation best tracker only moves on completed ones.
        if !result.aborted {
            for genome in genomes.iter() {
                if genome.fitness > self.best_fitness {
                    self.best_fitness = genome.fitness;
                    self.best_genome = Some(genome.clone());
                    info!("new best fitness: {:.2}", self.best_fitness);
                }
            }
            info!(
                "generation {generation} completed: score {}, {} ticks",
                result.score, result.ticks
            );
            if result.score >= self.params.score_checkpoint {
                self.save_best(CHECKPOINT_LABEL);
            }
        }

        Ok(result)
    }

    // Save failures are logged, never fatal.
    fn save_best(&self, label: &str) {
        let Some(genome) = &self.best_genome else {
            return;
        };
        match checkpoint::save_genome(&self.checkpoint_dir, label, genome, self.best_fitness) {
            Ok(path) => info!("best genome saved to {}", path.display()),
            Err(e) => warn!("failed to save best genome: {e}"),
        }
    }
}
