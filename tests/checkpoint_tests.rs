//! Tests for genome snapshot persistence.

#![allow(clippy::float_cmp)]

use std::fs;
use std::path::PathBuf;

use flappy_evo::checkpoint::{load_genome, save_genome};
use flappy_evo::error::CheckpointError;
use flappy_evo::neat::{Genome, NeatConfig, Network};
use ndarray::array;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("flappy-evo-{name}"));
    fs::remove_dir_all(&dir).ok();
    dir
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = temp_dir("checkpoint-round-trip");

    let config = NeatConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut genome = Genome::fully_connected(7, &config, &mut rng);
    for _ in 0..40 {
        genome.mutate(&config, &mut rng);
    }

    let path = save_genome(&dir, "winner", &genome, 123.45).unwrap();
    assert!(path.ends_with("winner.json"));

    let snapshot = load_genome(&dir, "winner").unwrap();
    assert_eq!(snapshot.fitness, 123.45);
    assert_eq!(snapshot.genome.key, 7);
    assert!(!snapshot.saved_at.is_empty());

    // The restored genome compiles to an identical controller.
    let original = Network::try_from_genome(&genome).unwrap();
    let restored = Network::try_from_genome(&snapshot.genome).unwrap();
    let sensors = array![350.0, 50.0, 150.0];
    assert_eq!(original.activate(&sensors), restored.activate(&sensors));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_missing_label_is_not_found() {
    let dir = temp_dir("checkpoint-missing");
    let err = load_genome(&dir, "winner").unwrap_err();
    assert!(matches!(err, CheckpointError::NotFound { .. }));
}

#[test]
fn test_malformed_snapshot_is_a_format_error() {
    let dir = temp_dir("checkpoint-malformed");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("winner.json"), "{ not json").unwrap();

    let err = load_genome(&dir, "winner").unwrap_err();
    assert!(matches!(err, CheckpointError::Format(_)));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_save_overwrites_an_existing_label() {
    let dir = temp_dir("checkpoint-overwrite");

    let config = NeatConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let first = Genome::fully_connected(1, &config, &mut rng);
    let second = Genome::fully_connected(2, &config, &mut rng);

    save_genome(&dir, "winner", &first, 1.0).unwrap();
    save_genome(&dir, "winner", &second, 2.0).unwrap();

    let snapshot = load_genome(&dir, "winner").unwrap();
    assert_eq!(snapshot.genome.key, 2);
    assert_eq!(snapshot.fitness, 2.0);

    fs::remove_dir_all(&dir).ok();
}
