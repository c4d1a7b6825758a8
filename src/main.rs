// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{crate_version, Parser, Subcommand};
use drumloop::clock::TokioClock;
use drumloop::config::{self, Repeat};
use drumloop::output;
use drumloop::scheduler::Scheduler;
use drumloop::sequence::Generator;
use drumloop::util::duration_minutes_seconds;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A randomized drum loop sequencer."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plays the drum loop described by the given config.
    Play {
        /// The path to the sequencer config.
        config_path: String,
        /// Overrides the generation seed from the config.
        #[arg[short, long]]
        seed: Option<u64>,
        /// Overrides the output device from the config.
        #[arg[short, long]]
        output: Option<String>,
    },
    /// Verifies the given config and prints a summary of it.
    Verify {
        /// The path to the sequencer config.
        config_path: String,
    },
    /// Prints one generated cycle without playing it.
    Generate {
        /// The path to the sequencer config.
        config_path: String,
        /// Overrides the generation seed from the config.
        #[arg[short, long]]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            config_path,
            seed,
            output,
        } => {
            let mut sequencer = config::load(&PathBuf::from(&config_path))?;
            if let Some(seed) = seed {
                sequencer = sequencer.with_seed(seed);
            }
            if let Some(output) = output {
                sequencer = sequencer.with_output(&output);
            }

            let output = output::get_output(sequencer.output())?;
            let scheduler = Arc::new(Scheduler::new(sequencer, output, TokioClock));

            let cancel_handle = scheduler.cancel_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupted, stopping sequencer.");
                    cancel_handle.cancel();
                }
            });

            let state = scheduler.run().await?;
            println!("Sequencer {}.", state);
        }
        Commands::Verify { config_path } => {
            let settings = config::load(&PathBuf::from(&config_path))?.validate()?;

            println!("Output: {}", settings.output());
            println!("Tempo: {}", settings.bpm());
            println!(
                "Beat interval: {}",
                duration_minutes_seconds(settings.bpm().beat_interval())
            );
            println!("Line length: {}", settings.line_length());
            println!(
                "Cycle length: {}",
                duration_minutes_seconds(settings.cycle_duration())
            );
            match settings.repeat() {
                Repeat::Count(count) => println!("Cycles: {}", count),
                Repeat::Infinite => println!("Cycles: infinite"),
            }
            match settings.total_duration() {
                Some(total) => println!("Total length: {}", duration_minutes_seconds(total)),
                None => println!("Total length: infinite"),
            }

            println!("\nTracks (count: {}):", settings.track_count());
            for (index, pool) in settings.pools().iter().enumerate() {
                println!("- {} (pan {})", pool, output::pan_for(index));
                for sound in pool.sounds() {
                    println!("  - {}", sound);
                }
            }
        }
        Commands::Generate { config_path, seed } => {
            let settings = config::load(&PathBuf::from(&config_path))?.validate()?;
            let mut generator = Generator::new(seed.or(settings.seed()));

            for pool in settings.pools() {
                let line = generator.generate(settings.line_length(), settings.bpm(), pool);
                println!("{}: {}", pool.name(), line);
            }
        }
    }

    Ok(())
}
