//! Genome representation and genetic operators.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Innovation, NeatConfig, NodeId, connection_innovation, node_split_innovation};

/// Role of a node within the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Sensory input, no bias or activation.
    Input,
    /// Internal node created by structural mutation.
    Hidden,
    /// Action output.
    Output,
}

/// A single node gene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeGene {
    /// Stable node id.
    pub id: NodeId,
    /// Bias added before activation (ignored for inputs).
    pub bias: f32,
    /// Role of the node.
    pub kind: NodeKind,
}

/// A single connection gene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionGene {
    /// Innovation number, derived from the endpoint ids.
    pub innovation: Innovation,
    /// Source node.
    pub input: NodeId,
    /// Target node.
    pub output: NodeId,
    /// Connection weight.
    pub weight: f32,
    /// Disabled connections are kept in the genome but not evaluated.
    pub enabled: bool,
}

/// An evolvable network description: nodes, connections, and the fitness
/// accumulated during the current generation.
///
/// Genes live in `BTreeMap`s so iteration order is deterministic; a genome
/// therefore always compiles to the same network, which is what makes saved
/// snapshots reproduce identical controllers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genome {
    /// Unique key within the run.
    pub key: u64,
    /// Node genes by id.
    pub nodes: BTreeMap<NodeId, NodeGene>,
    /// Connection genes by innovation number.
    pub connections: BTreeMap<Innovation, ConnectionGene>,
    /// Cumulative fitness for the current generation.
    pub fitness: f64,
}

impl Genome {
    /// Creates a minimal genome with every input connected to every output.
    pub fn fully_connected(key: u64, config: &NeatConfig, rng: &mut impl Rng) -> Self {
        let scale = config.weight_init_scale;
        let mut nodes = BTreeMap::new();
        let mut connections = BTreeMap::new();

        for id in 0..config.num_inputs as NodeId {
            nodes.insert(
                id,
                NodeGene {
                    id,
                    bias: 0.0,
                    kind: NodeKind::Input,
                },
            );
        }
        for i in 0..config.num_outputs as NodeId {
            let id = config.num_inputs as NodeId + i;
            nodes.insert(
                id,
                NodeGene {
                    id,
                    bias: rng.random_range(-scale..scale),
                    kind: NodeKind::Output,
                },
            );
        }

        for input in 0..config.num_inputs as NodeId {
            for i in 0..config.num_outputs as NodeId {
                let output = config.num_inputs as NodeId + i;
                let innovation = connection_innovation(input, output);
                connections.insert(
                    innovation,
                    ConnectionGene {
                        innovation,
                        input,
                        output,
                        weight: rng.random_range(-scale..scale),
                        enabled: true,
                    },
                );
            }
        }

        Self {
            key,
            nodes,
            connections,
            fitness: 0.0,
        }
    }

    /// Ids of the input nodes, in ascending order.
    pub fn input_ids(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.kind == NodeKind::Input)
            .map(|n| n.id)
            .collect()
    }

    /// Ids of the output nodes, in ascending order.
    pub fn output_ids(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.kind == NodeKind::Output)
            .map(|n| n.id)
            .collect()
    }

    /// Applies weight, bias, and structural mutations in place.
    pub fn mutate(&mut self, config: &NeatConfig, rng: &mut impl Rng) {
        self.mutate_weights(config, rng);
        self.mutate_biases(config, rng);

        if rng.random::<f64>() < config.add_connection_prob {
            self.mutate_add_connection(config, rng);
        }
        if rng.random::<f64>() < config.add_node_prob {
            self.mutate_add_node(config, rng);
        }
    }

    fn mutate_weights(&mut self, config: &NeatConfig, rng: &mut impl Rng) {
        let scale = config.weight_init_scale;
        for conn in self.connections.values_mut() {
            if rng.random::<f64>() < config.weight_replace_rate {
                conn.weight = rng.random_range(-scale..scale);
            } else if rng.random::<f64>() < config.weight_mutate_rate {
                conn.weight +=
                    rng.random_range(-config.weight_perturb_power..config.weight_perturb_power);
            }
        }
    }

    fn mutate_biases(&mut self, config: &NeatConfig, rng: &mut impl Rng) {
        for node in self.nodes.values_mut() {
            if node.kind != NodeKind::Input && rng.random::<f64>() < config.bias_mutate_rate {
                node.bias +=
                    rng.random_range(-config.bias_perturb_power..config.bias_perturb_power);
            }
        }
    }

    /// Adds one new connection between previously unconnected nodes,
    /// skipping anything that would make the network cyclic.
    fn mutate_add_connection(&mut self, config: &NeatConfig, rng: &mut impl Rng) {
        let sources: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|n| n.kind != NodeKind::Output)
            .map(|n| n.id)
            .collect();
        let targets: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|n| n.kind != NodeKind::Input)
            .map(|n| n.id)
            .collect();
        if sources.is_empty() || targets.is_empty() {
            return;
        }

        // A handful of attempts is enough on these small genomes.
        for _ in 0..16 {
            let input = sources[rng.random_range(0..sources.len())];
            let output = targets[rng.random_range(0..targets.len())];
            if input == output {
                continue;
            }
            let innovation = connection_innovation(input, output);
            if self.connections.contains_key(&innovation) {
                continue;
            }
            if self.creates_cycle(input, output) {
                continue;
            }
            let scale = config.weight_init_scale;
            self.connections.insert(
                innovation,
                ConnectionGene {
                    innovation,
                    input,
                    output,
                    weight: rng.random_range(-scale..scale),
                    enabled: true,
                },
            );
            return;
        }
    }

    /// Splits a random enabled connection: the old gene is disabled and a new
    /// node takes its place, wired `input -> new` (weight 1) and
    /// `new -> output` (old weight).
    fn mutate_add_node(&mut self, _config: &NeatConfig, rng: &mut impl Rng) {
        let enabled: Vec<Innovation> = self
            .connections
            .values()
            .filter(|c| c.enabled)
            .map(|c| c.innovation)
            .collect();
        if enabled.is_empty() {
            return;
        }
        let split = enabled[rng.random_range(0..enabled.len())];
        let (input, output, weight) = {
            let conn = self
                .connections
                .get_mut(&split)
                .expect("picked from existing keys");
            conn.enabled = false;
            (conn.input, conn.output, conn.weight)
        };

        let node_id = node_split_innovation(split);
        if self.nodes.contains_key(&node_id) {
            // The same split already happened in an ancestor; re-enabling
            // the original gene would duplicate the path, so leave it off.
            return;
        }
        self.nodes.insert(
            node_id,
            NodeGene {
                id: node_id,
                bias: 0.0,
                kind: NodeKind::Hidden,
            },
        );

        let first = connection_innovation(input, node_id);
        self.connections.insert(
            first,
            ConnectionGene {
                innovation: first,
                input,
                output: node_id,
                weight: 1.0,
                enabled: true,
            },
        );
        let second = connection_innovation(node_id, output);
        self.connections.insert(
            second,
            ConnectionGene {
                innovation: second,
                input: node_id,
                output,
                weight,
                enabled: true,
            },
        );
    }

    /// True if adding `from -> to` would create a directed cycle.
    fn creates_cycle(&self, from: NodeId, to: NodeId) -> bool {
        if from == to {
            return true;
        }
        let mut stack = vec![to];
        let mut visited = std::collections::BTreeSet::new();
        while let Some(node) = stack.pop() {
            if node == from {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            for conn in self.connections.values() {
                if conn.input == node {
                    stack.push(conn.output);
                }
            }
        }
        false
    }

    /// Produces a child genome from two parents.
    ///
    /// Matching genes (same innovation) are inherited from either parent at
    /// random; disjoint and excess genes come from the fitter parent.
    pub fn crossover(&self, other: &Genome, key: u64, rng: &mut impl Rng) -> Genome {
        let (fitter, weaker) = if self.fitness >= other.fitness {
            (self, other)
        } else {
            (other, self)
        };

        let mut connections = BTreeMap::new();
        for (innovation, gene) in &fitter.connections {
            let chosen = match weaker.connections.get(innovation) {
                Some(matching) if rng.random::<bool>() => matching.clone(),
                _ => gene.clone(),
            };
            connections.insert(*innovation, chosen);
        }

        let mut nodes = BTreeMap::new();
        for (id, node) in &fitter.nodes {
            let chosen = match weaker.nodes.get(id) {
                Some(matching) if rng.random::<bool>() => matching.clone(),
                _ => node.clone(),
            };
            nodes.insert(*id, chosen);
        }

        Genome {
            key,
            nodes,
            connections,
            fitness: 0.0,
        }
    }

    /// Compatibility distance used for speciation:
    /// `c1 * disjoint / n + c2 * avg_weight_diff` over matching genes.
    pub fn compatibility_distance(&self, other: &Genome, config: &NeatConfig) -> f64 {
        let mut disjoint = 0usize;
        let mut matching = 0usize;
        let mut weight_diff = 0.0f64;

        for (innovation, gene) in &self.connections {
            match other.connections.get(innovation) {
                Some(matched) => {
                    matching += 1;
                    weight_diff += f64::from((gene.weight - matched.weight).abs());
                }
                None => disjoint += 1,
            }
        }
        disjoint += other
            .connections
            .keys()
            .filter(|k| !self.connections.contains_key(k))
            .count();

        let n = self.connections.len().max(other.connections.len()).max(1) as f64;
        let avg_weight_diff = if matching > 0 {
            weight_diff / matching as f64
        } else {
            0.0
        };

        config.disjoint_coefficient * disjoint as f64 / n
            + config.weight_coefficient * avg_weight_diff
    }
}
