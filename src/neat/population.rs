//! Population management: speciation, stagnation, and reproduction.

use log::{debug, info, warn};
use rand::Rng;

use super::genome::Genome;
use super::NeatConfig;

/// A species: genomes close enough in compatibility distance to share
/// fitness and breed together.
#[derive(Debug, Clone)]
struct Species {
    id: u64,
    /// Genome the distance test runs against, taken from the previous
    /// generation's membership.
    representative: Genome,
    /// Indices into the population's genome vector.
    members: Vec<usize>,
    best_fitness: f64,
    last_improved: u64,
}

/// The population of genomes evolved across generations.
pub struct Population {
    config: NeatConfig,
    genomes: Vec<Genome>,
    species: Vec<Species>,
    generation: u64,
    next_genome_key: u64,
    next_species_id: u64,
}

impl Population {
    /// Creates a population of minimal fully connected genomes.
    pub fn new(config: NeatConfig, rng: &mut impl Rng) -> Self {
        let genomes = (0..config.population_size as u64)
            .map(|key| Genome::fully_connected(key, &config, rng))
            .collect();
        Self {
            next_genome_key: config.population_size as u64,
            config,
            genomes,
            species: Vec::new(),
            generation: 0,
            next_species_id: 0,
        }
    }

    /// Creates a population seeded from a single genome: one unmodified copy
    /// plus mutated clones, used to resume from a saved snapshot.
    pub fn seeded(config: NeatConfig, seed: &Genome, rng: &mut impl Rng) -> Self {
        let mut genomes = Vec::with_capacity(config.population_size);
        for key in 0..config.population_size as u64 {
            let mut clone = seed.clone();
            clone.key = key;
            clone.fitness = 0.0;
            if key > 0 {
                clone.mutate(&config, rng);
            }
            genomes.push(clone);
        }
        Self {
            next_genome_key: config.population_size as u64,
            config,
            genomes,
            species: Vec::new(),
            generation: 0,
            next_species_id: 0,
        }
    }

    /// Engine parameters.
    pub fn config(&self) -> &NeatConfig {
        &self.config
    }

    /// Current generation number (0 before the first evaluation).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The current genome set.
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Mutable access for the evaluator; every genome's fitness must be set
    /// by the time a generation ends.
    pub fn genomes_mut(&mut self) -> &mut [Genome] {
        &mut self.genomes
    }

    /// The fittest genome of the current generation, if any exist.
    pub fn best(&self) -> Option<&Genome> {
        self.genomes
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }

    /// True once any genome has reached the configured fitness threshold.
    pub fn threshold_reached(&self) -> bool {
        self.genomes
            .iter()
            .any(|g| g.fitness >= self.config.fitness_threshold)
    }

    /// Breeds the next generation from the current fitness values:
    /// speciates, culls stagnant species, then fills the population with
    /// elites and mutated offspring.
    pub fn evolve(&mut self, rng: &mut impl Rng) {
        self.generation += 1;
        self.speciate();
        self.cull_stagnant();

        if self.species.is_empty() {
            // Complete extinction; restart from fresh random genomes rather
            // than aborting the run.
            warn!("all species went extinct, reseeding the population");
            self.genomes = (0..self.config.population_size)
                .map(|_| {
                    let key = self.next_genome_key;
                    self.next_genome_key += 1;
                    Genome::fully_connected(key, &self.config, rng)
                })
                .collect();
            return;
        }

        let spawn_counts = self.spawn_counts();
        let mut next: Vec<Genome> = Vec::with_capacity(self.config.population_size);

        for (species, spawn) in self.species.iter().zip(spawn_counts) {
            if spawn == 0 {
                continue;
            }

            // Members sorted fittest-first; the tail is cut before breeding.
            let mut ranked: Vec<&Genome> =
                species.members.iter().map(|i| &self.genomes[*i]).collect();
            ranked.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

            let mut remaining = spawn;
            for elite in ranked.iter().take(self.config.elitism.min(remaining)) {
                let mut copy = (*elite).clone();
                copy.key = self.next_genome_key;
                copy.fitness = 0.0;
                self.next_genome_key += 1;
                next.push(copy);
                remaining -= 1;
            }

            let cutoff = ((ranked.len() as f64 * self.config.survival_threshold).ceil() as usize)
                .clamp(1, ranked.len());
            let parents = &ranked[..cutoff];

            for _ in 0..remaining {
                let key = self.next_genome_key;
                self.next_genome_key += 1;

                let a: &Genome = parents[rng.random_range(0..parents.len())];
                let b: &Genome = parents[rng.random_range(0..parents.len())];
                let mut child = if a.key == b.key {
                    let mut clone = a.clone();
                    clone.key = key;
                    clone.fitness = 0.0;
                    clone
                } else {
                    a.crossover(b, key, rng)
                };
                child.mutate(&self.config, rng);
                next.push(child);
            }
        }

        // Rounding in the spawn allocation can leave the population short;
        // top up from the overall best species.
        while next.len() < self.config.population_size {
            let key = self.next_genome_key;
            self.next_genome_key += 1;
            let parent = self
                .genomes
                .iter()
                .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
                .expect("population is never empty here");
            let mut child = parent.clone();
            child.key = key;
            child.fitness = 0.0;
            child.mutate(&self.config, rng);
            next.push(child);
        }
        next.truncate(self.config.population_size);

        debug!(
            "generation {}: {} species, {} genomes bred",
            self.generation,
            self.species.len(),
            next.len()
        );
        self.genomes = next;
    }

    /// Number of distinct species after the last `evolve` call.
    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    fn speciate(&mut self) {
        for species in &mut self.species {
            species.members.clear();
        }

        for (idx, genome) in self.genomes.iter().enumerate() {
            let found = self.species.iter_mut().find(|s| {
                genome.compatibility_distance(&s.representative, &self.config)
                    < self.config.compatibility_threshold
            });
            match found {
                Some(species) => species.members.push(idx),
                None => {
                    let id = self.next_species_id;
                    self.next_species_id += 1;
                    self.species.push(Species {
                        id,
                        representative: genome.clone(),
                        members: vec![idx],
                        best_fitness: f64::NEG_INFINITY,
                        last_improved: self.generation,
                    });
                }
            }
        }
        self.species.retain(|s| !s.members.is_empty());

        // New representatives and stagnation bookkeeping from this
        // generation's membership.
        for species in &mut self.species {
            let best = species
                .members
                .iter()
                .map(|i| self.genomes[*i].fitness)
                .fold(f64::NEG_INFINITY, f64::max);
            if best > species.best_fitness {
                species.best_fitness = best;
                species.last_improved = self.generation;
            }
            species.representative = self.genomes[species.members[0]].clone();
        }
    }

    fn cull_stagnant(&mut self) {
        if self.species.len() <= 2 {
            return;
        }
        let mut ranked: Vec<(u64, f64)> = self
            .species
            .iter()
            .map(|s| (s.id, s.best_fitness))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        let protected: Vec<u64> = ranked.iter().take(2).map(|(id, _)| *id).collect();

        let generation = self.generation;
        let max_stagnation = self.config.max_stagnation;
        let before = self.species.len();
        self.species.retain(|s| {
            protected.contains(&s.id) || generation - s.last_improved <= max_stagnation
        });
        if self.species.len() < before {
            info!(
                "culled {} stagnant species at generation {}",
                before - self.species.len(),
                generation
            );
        }
    }

    /// Offspring per species, proportional to mean adjusted (shared)
    /// fitness, summing to the population size.
    fn spawn_counts(&self) -> Vec<usize> {
        // Shift fitness to be non-negative before sharing; collision
        // penalties can push raw fitness below zero.
        let min_fitness = self
            .genomes
            .iter()
            .map(|g| g.fitness)
            .fold(f64::INFINITY, f64::min)
            .min(0.0);

        let adjusted: Vec<f64> = self
            .species
            .iter()
            .map(|s| {
                let sum: f64 = s
                    .members
                    .iter()
                    .map(|i| self.genomes[*i].fitness - min_fitness)
                    .sum();
                sum / (s.members.len() as f64).powi(2)
            })
            .collect();

        let total: f64 = adjusted.iter().sum();
        let pop = self.config.population_size;
        if total <= 0.0 {
            // Degenerate generation; split evenly.
            let share = pop / self.species.len().max(1);
            return vec![share.max(1); self.species.len()];
        }

        adjusted
            .iter()
            .map(|a| ((a / total) * pop as f64).round() as usize)
            .collect()
    }
}
