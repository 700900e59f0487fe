//! Compiles a genome into a runnable feed-forward network.

use std::collections::BTreeMap;

use ndarray::Array1;

use crate::error::TrainingError;

use super::genome::{Genome, NodeKind};

struct EvalStep {
    /// Index of the node value being computed.
    node: usize,
    bias: f32,
    /// (source value index, weight) pairs of enabled incoming connections.
    incoming: Vec<(usize, f32)>,
}

/// A compiled feed-forward network with tanh activation.
///
/// Controllers are pure: activation keeps no state between calls, so the same
/// sensory vector always produces the same action vector.
pub struct Network {
    inputs: Vec<usize>,
    outputs: Vec<usize>,
    steps: Vec<EvalStep>,
    num_values: usize,
}

impl Network {
    /// Compiles the genome, or fails if its enabled connections contain a
    /// cycle (not representable as a feed-forward network).
    pub fn try_from_genome(genome: &Genome) -> Result<Self, TrainingError> {
        let index: BTreeMap<_, _> = genome
            .nodes
            .keys()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();

        let inputs: Vec<usize> = genome.input_ids().iter().map(|id| index[id]).collect();
        let outputs: Vec<usize> = genome.output_ids().iter().map(|id| index[id]).collect();

        // Kahn's algorithm over enabled connections.
        let mut in_degree = vec![0usize; index.len()];
        for conn in genome.connections.values().filter(|c| c.enabled) {
            in_degree[index[&conn.output]] += 1;
        }
        let mut ready: Vec<usize> = (0..index.len()).filter(|i| in_degree[*i] == 0).collect();
        let mut order = Vec::with_capacity(index.len());
        while let Some(node) = ready.pop() {
            order.push(node);
            for conn in genome.connections.values().filter(|c| c.enabled) {
                if index[&conn.input] == node {
                    let out = index[&conn.output];
                    in_degree[out] -= 1;
                    if in_degree[out] == 0 {
                        ready.push(out);
                    }
                }
            }
        }
        if order.len() != index.len() {
            return Err(TrainingError::Evaluation(format!(
                "genome {} is not feed-forward",
                genome.key
            )));
        }

        let mut steps = Vec::new();
        for node_idx in order {
            let (id, node) = genome
                .nodes
                .iter()
                .nth(node_idx)
                .expect("index built from this map");
            if node.kind == NodeKind::Input {
                continue;
            }
            let incoming = genome
                .connections
                .values()
                .filter(|c| c.enabled && c.output == *id)
                .map(|c| (index[&c.input], c.weight))
                .collect();
            steps.push(EvalStep {
                node: node_idx,
                bias: node.bias,
                incoming,
            });
        }

        Ok(Self {
            inputs,
            outputs,
            steps,
            num_values: index.len(),
        })
    }

    /// Runs one forward pass: sensory vector in, action vector out.
    pub fn activate(&self, inputs: &Array1<f32>) -> Array1<f32> {
        let mut values = vec![0.0f32; self.num_values];
        for (slot, value) in self.inputs.iter().zip(inputs.iter()) {
            values[*slot] = *value;
        }
        for step in &self.steps {
            let mut sum = step.bias;
            for (source, weight) in &step.incoming {
                sum += values[*source] * weight;
            }
            values[step.node] = sum.tanh();
        }
        Array1::from_iter(self.outputs.iter().map(|slot| values[*slot]))
    }
}
