//! Minimal NEAT engine.
//!
//! Genomes describe both the topology and the weights of a feed-forward
//! network; the population engine handles speciation by compatibility
//! distance, stagnation culling, crossover, and mutation.
//!
//! Structural mutations use hash-based innovation numbers: the innovation of
//! a connection is a deterministic hash of its endpoint node ids, and the id
//! of a node created by splitting a connection is a hash of that connection's
//! innovation. Identical structural mutations therefore always receive
//! identical ids, with no global counter to thread through.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

pub mod genome;
pub mod network;
pub mod population;

pub use genome::{ConnectionGene, Genome, NodeGene, NodeKind};
pub use network::Network;
pub use population::Population;

/// Identifier of a node gene.
pub type NodeId = u64;
/// Innovation number of a connection gene.
pub type Innovation = u64;

const SPLIT_MARKER: u64 = u64::MAX;

fn hash_pair(a: u64, b: u64) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    a.hash(&mut hasher);
    b.hash(&mut hasher);
    hasher.finish()
}

/// Innovation number for a connection from `input` to `output`.
pub fn connection_innovation(input: NodeId, output: NodeId) -> Innovation {
    hash_pair(input, output)
}

/// Node id for the node created by splitting the connection with the given
/// innovation number.
pub fn node_split_innovation(connection: Innovation) -> NodeId {
    hash_pair(connection, SPLIT_MARKER)
}

/// Parameters of the evolutionary engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeatConfig {
    /// Number of genomes per generation.
    pub population_size: usize,
    /// Sensory vector size.
    pub num_inputs: usize,
    /// Action vector size.
    pub num_outputs: usize,
    /// Evolution stops once any genome reaches this fitness.
    pub fitness_threshold: f64,
    /// Initial weights and biases are drawn uniformly from this magnitude.
    pub weight_init_scale: f32,
    /// Probability that a connection weight is perturbed during mutation.
    pub weight_mutate_rate: f64,
    /// Magnitude of weight perturbations.
    pub weight_perturb_power: f32,
    /// Probability that a mutated weight is replaced outright.
    pub weight_replace_rate: f64,
    /// Probability that a node bias is perturbed during mutation.
    pub bias_mutate_rate: f64,
    /// Magnitude of bias perturbations.
    pub bias_perturb_power: f32,
    /// Probability of an add-connection structural mutation.
    pub add_connection_prob: f64,
    /// Probability of an add-node structural mutation.
    pub add_node_prob: f64,
    /// Genomes closer than this compatibility distance share a species.
    pub compatibility_threshold: f64,
    /// Weight of the disjoint-gene term in compatibility distance.
    pub disjoint_coefficient: f64,
    /// Weight of the average-weight-difference term in compatibility distance.
    pub weight_coefficient: f64,
    /// Fraction of each species allowed to reproduce.
    pub survival_threshold: f64,
    /// Best members copied unchanged from each species.
    pub elitism: usize,
    /// Generations without improvement before a species is culled.
    pub max_stagnation: u64,
}

impl Default for NeatConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            num_inputs: 3,
            num_outputs: 1,
            fitness_threshold: 100.0,
            weight_init_scale: 1.0,
            weight_mutate_rate: 0.8,
            weight_perturb_power: 0.5,
            weight_replace_rate: 0.1,
            bias_mutate_rate: 0.7,
            bias_perturb_power: 0.5,
            add_connection_prob: 0.5,
            add_node_prob: 0.2,
            compatibility_threshold: 3.0,
            disjoint_coefficient: 1.0,
            weight_coefficient: 0.5,
            survival_threshold: 0.2,
            elitism: 1,
            max_stagnation: 20,
        }
    }
}
