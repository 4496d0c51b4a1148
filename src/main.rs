use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;

use hexamotif::evolve::{self, EvolutionConfig};
use hexamotif::fitness::{self, FitnessBreakdown, VariationBand};
use hexamotif::hexagram::Hexagram;
use hexamotif::midi;
use hexamotif::motif::Motif;
use hexamotif::mutation::{MutationPolicy, Mutator};
use hexamotif::render;
use hexamotif::scale::{Mode, Scale};

/// Evolve short musical motifs seeded from the 64 I Ching hexagrams and
/// render the final population as multi-part MIDI scores.
#[derive(Parser)]
#[command(name = "hexamotif", version, about)]
struct Cli {
    /// Number of generations to run
    #[arg(long)]
    generations: usize,

    /// Size of the population
    #[arg(long)]
    population: usize,

    /// Hexagram number (1-64)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=64))]
    hexagram: u8,

    /// Base note duration in quarter lengths
    #[arg(long)]
    base_duration: f64,

    /// Probability of the mutation pre-passes firing (0-1)
    #[arg(long)]
    mutation_rate: f64,

    /// Bias toward consonant transposition intervals (0-1)
    #[arg(long)]
    harmonicity_ratio: f64,

    /// Bias toward the high velocity band on sounding lines (0-1)
    #[arg(long, default_value_t = 0.5)]
    dynamic_ratio: f64,

    /// Mode name; a random mode is chosen when omitted
    #[arg(long)]
    mode: Option<String>,

    /// Mutation policy
    #[arg(long, value_enum, default_value_t = MutationPolicy::HarmonicityPool)]
    policy: MutationPolicy,

    /// Lower bound of the repetition/variation band
    #[arg(long, default_value_t = 3)]
    variation_min: usize,

    /// Upper bound of the repetition/variation band
    #[arg(long, default_value_t = 7)]
    variation_max: usize,

    /// Draw a fresh gating hexagram for every mutation call
    #[arg(long)]
    resample_gating: bool,

    /// Fix the RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory for MIDI files and the run summary
    #[arg(long, default_value = "midi_out")]
    output_dir: PathBuf,

    /// Verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    mode: &'a str,
    hexagram: u8,
    generations: usize,
    population: usize,
    policy: MutationPolicy,
    mutation_rate: f64,
    harmonicity_ratio: f64,
    dynamic_ratio: f64,
    variation_band: VariationBand,
    preferred_pitches: [i32; 2],
    motifs: Vec<MotifSummary>,
}

#[derive(Serialize)]
struct MotifSummary {
    motif: Motif,
    fitness: FitnessBreakdown,
    total: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    for (name, value) in [
        ("mutation-rate", cli.mutation_rate),
        ("harmonicity-ratio", cli.harmonicity_ratio),
        ("dynamic-ratio", cli.dynamic_ratio),
    ] {
        if !(0.0..=1.0).contains(&value) {
            bail!("--{name} must be between 0 and 1, got {value}");
        }
    }
    if cli.variation_min > cli.variation_max {
        bail!(
            "--variation-min ({}) must not exceed --variation-max ({})",
            cli.variation_min,
            cli.variation_max
        );
    }

    let mut rng: StdRng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mode = match &cli.mode {
        Some(name) => Mode::from_name(name)?,
        None => *Mode::ALL.choose(&mut rng).unwrap(),
    };
    let scale = Scale::for_mode(mode);
    let hexagram = Hexagram::from_number(cli.hexagram)?;

    log::info!(
        "evolving {} motifs over {} generations in {} with hexagram {}",
        cli.population,
        cli.generations,
        mode.name(),
        cli.hexagram
    );

    let band = VariationBand {
        min: cli.variation_min,
        max: cli.variation_max,
    };
    let cfg = EvolutionConfig {
        generations: cli.generations,
        population_size: cli.population,
        band,
        mutator: Mutator {
            policy: cli.policy,
            mutation_rate: cli.mutation_rate,
            harmonicity_ratio: cli.harmonicity_ratio,
            resample_gating: cli.resample_gating,
        },
    };

    let population = evolve::run(&cfg, &scale, &hexagram, &mut rng)?;

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating {}", cli.output_dir.display()))?;
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

    for (index, motif) in population.iter().enumerate() {
        let voices = render::render_motif(
            motif,
            &scale,
            &hexagram,
            cli.base_duration,
            cli.dynamic_ratio,
            &mut rng,
        );
        let path = cli
            .output_dir
            .join(format!("{stamp}_{index:02}_hexagram_motif.mid"));
        midi::write_voices(&voices, &path)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }

    let summary = RunSummary {
        mode: mode.name(),
        hexagram: cli.hexagram,
        generations: cli.generations,
        population: cli.population,
        policy: cli.policy,
        mutation_rate: cli.mutation_rate,
        harmonicity_ratio: cli.harmonicity_ratio,
        dynamic_ratio: cli.dynamic_ratio,
        variation_band: band,
        preferred_pitches: scale.preferred,
        motifs: population
            .iter()
            .map(|motif| {
                let parts = fitness::breakdown(motif, &scale, band);
                MotifSummary {
                    motif: motif.clone(),
                    fitness: parts,
                    total: parts.total(),
                }
            })
            .collect(),
    };
    let summary_path = cli.output_dir.join(format!("{stamp}_summary.json"));
    let file = File::create(&summary_path)
        .with_context(|| format!("creating {}", summary_path.display()))?;
    serde_json::to_writer_pretty(file, &summary)?;
    log::info!("wrote {}", summary_path.display());

    Ok(())
}
