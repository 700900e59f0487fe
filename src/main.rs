//! Binary entry point: parses arguments, sets up logging, and runs training.

use std::path::PathBuf;
use std::process::exit;

use log::{error, info};
use macroquad::prelude::*;

use flappy_evo::error::TrainingError;
use flappy_evo::frontend::{Frontend, Headless};
use flappy_evo::graphics::WindowFrontend;
use flappy_evo::neat::{NeatConfig, Population};
use flappy_evo::simulation::params::Params;
use flappy_evo::trainer::Trainer;
use flappy_evo::checkpoint;

const USAGE: &str = "usage: flappy-evo train [options]

options:
  --generations N       maximum generations to train (default: 50)
  --headless            skip rendering and run ticks as fast as possible
  --draw-lines          draw sensor lines from birds to the targeted gap
  --checkpoint-dir DIR  where genome snapshots are written (default: checkpoints)
  --seed-from LABEL     seed the population from a saved genome snapshot";

struct Options {
    generations: u64,
    headless: bool,
    draw_lines: bool,
    checkpoint_dir: PathBuf,
    seed_from: Option<String>,
}

fn parse_args(mut args: std::env::Args) -> Result<Options, String> {
    args.next(); // program name

    match args.next().as_deref() {
        Some("train") => {}
        Some(other) => return Err(format!("unknown mode: {other}")),
        None => return Err("missing mode".into()),
    }

    let mut options = Options {
        generations: 50,
        headless: false,
        draw_lines: false,
        checkpoint_dir: PathBuf::from("checkpoints"),
        seed_from: None,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--generations" => {
                let value = args.next().ok_or("--generations needs a value")?;
                options.generations = value
                    .parse()
                    .map_err(|_| format!("invalid generation count: {value}"))?;
            }
            "--headless" => options.headless = true,
            "--draw-lines" => options.draw_lines = true,
            "--checkpoint-dir" => {
                options.checkpoint_dir =
                    PathBuf::from(args.next().ok_or("--checkpoint-dir needs a value")?);
            }
            "--seed-from" => {
                options.seed_from = Some(args.next().ok_or("--seed-from needs a value")?);
            }
            other => return Err(format!("unknown option: {other}")),
        }
    }
    Ok(options)
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Flappy Evo".to_owned(),
        window_width: 600,
        window_height: 800,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = match parse_args(std::env::args()) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}\n{USAGE}");
            exit(2);
        }
    };

    match run(options).await {
        Ok(()) => {}
        Err(TrainingError::Interrupted) => {
            info!("training interrupted by user");
            exit(130);
        }
        Err(e) => {
            error!("training failed: {e}");
            exit(1);
        }
    }
}

async fn run(options: Options) -> Result<(), TrainingError> {
    let params = Params {
        draw_lines: options.draw_lines,
        ..Params::default()
    };

    let config = NeatConfig::default();
    // The macroquad prelude glob re-exports its own `rand` module, which
    // would shadow the rand crate here.
    let mut rng = ::rand::rng();
    let mut population = match &options.seed_from {
        Some(label) => {
            let snapshot = checkpoint::load_genome(&options.checkpoint_dir, label)?;
            info!(
                "seeding population from '{label}' (fitness {:.2}, saved {})",
                snapshot.fitness, snapshot.saved_at
            );
            Population::seeded(config, &snapshot.genome, &mut rng)
        }
        None => Population::new(config, &mut rng),
    };

    if options.headless {
        train(params, Headless, &mut population, &options).await
    } else {
        let frontend = WindowFrontend::new(params.win_width, params.fps);
        train(params, frontend, &mut population, &options).await
    }
}

async fn train<F: Frontend>(
    params: Params,
    frontend: F,
    population: &mut Population,
    options: &Options,
) -> Result<(), TrainingError> {
    let mut trainer = Trainer::new(params, frontend, options.checkpoint_dir.clone())?;
    let winner = trainer.train(population, options.generations).await?;
    info!(
        "winner genome {}: {} nodes, {} connections",
        winner.key,
        winner.nodes.len(),
        winner.connections.len()
    );
    Ok(())
}
