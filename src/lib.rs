//! # Flappy Evo - Neuroevolution for a side-scrolling obstacle game
//!
//! Trains neural-network controllers to fly a bird through an endless stream
//! of pipe pairs. Every generation the whole population is simulated in
//! lock-step; survivors accumulate fitness, crashers are culled, and a
//! NEAT-style engine breeds the next generation from the results.
//!
//! ## Features
//!
//! - Tick-driven simulation of many birds at once
//! - Silhouette-mask collision detection (not bounding boxes)
//! - Minimal NEAT engine (speciation, stagnation, topology mutation)
//! - Cooperative cancellation with best-genome recovery
//! - Genome snapshots (save/load) via serde
//! - Optional real-time visualization with macroquad
//!
//! ## Core Modules
//!
//! - [`simulation::bird`] - Bird physics and bounds checks
//! - [`simulation::pipe`] - Obstacle stream
//! - [`simulation::mask`] - Silhouette collision masks
//! - [`neat`] - Genomes, networks, and the population engine
//! - [`trainer`] - The per-generation evaluation loop

/// Game-world entities and their physics.
pub mod simulation {
    /// Bird state and kinematics.
    pub mod bird;
    /// Silhouette masks for shape-accurate collision tests.
    pub mod mask;
    /// Simulation parameters.
    pub mod params;
    /// Pipe pairs: spawning, movement, passing, collision.
    pub mod pipe;
}

/// Minimal NEAT engine: genomes, compiled networks, population management.
pub mod neat;

/// Genome snapshot persistence.
pub mod checkpoint;
/// Error taxonomy for training runs.
pub mod error;
/// Render/input boundary used by the trainer.
pub mod frontend;
/// Macroquad frontend implementation.
pub mod graphics;
/// The population evaluator: per-generation tick loop and training driver.
pub mod trainer;
