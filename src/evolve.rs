use std::cmp::Ordering;

use rand::prelude::*;

use crate::error::ChingError;
use crate::fitness::{self, VariationBand};
use crate::hexagram::Hexagram;
use crate::motif::{Motif, Slot};
use crate::mutation::Mutator;
use crate::scale::Scale;

/// Probability, per slot, of the crossover post-pass replacing the slot
/// with a draw from the extended scale.
const EXTENDED_NOISE_PROB: f64 = 0.1;

/// Run parameters for one evolution. Constant across the whole run.
#[derive(Debug, Clone, Copy)]
pub struct EvolutionConfig {
    pub generations: usize,
    pub population_size: usize,
    pub band: VariationBand,
    pub mutator: Mutator,
}

/// Build the starting population: every motif walks the run's hexagram,
/// drawing a base-scale pitch for each sounding line and resting on the
/// silent ones.
pub fn initial_population(
    size: usize,
    scale: &Scale,
    hexagram: &Hexagram,
    rng: &mut impl Rng,
) -> Vec<Motif> {
    (0..size)
        .map(|_| {
            let slots = hexagram
                .lines()
                .iter()
                .map(|&sounding| {
                    if sounding {
                        Slot::Pitch(scale.random_pitch(rng))
                    } else {
                        Slot::Rest
                    }
                })
                .collect();
            Motif::new(slots)
        })
        .collect()
}

/// Score the whole population and sort it best-first. The sort is stable,
/// so equal-fitness motifs keep their input order.
fn rank<'a>(
    population: &'a [Motif],
    scale: &Scale,
    band: VariationBand,
) -> Vec<(f64, &'a Motif)> {
    let mut scored: Vec<(f64, &Motif)> = population
        .iter()
        .map(|motif| (fitness::score(motif, scale, band), motif))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored
}

/// Truncation selection: the top half of the ranked population, rounded
/// down.
pub fn select_parents(population: &[Motif], scale: &Scale, band: VariationBand) -> Vec<Motif> {
    rank(population, scale, band)
        .iter()
        .take(population.len() / 2)
        .map(|(_, motif)| (*motif).clone())
        .collect()
}

/// Deterministic single-point recombination at a given cut.
fn splice(parent1: &Motif, parent2: &Motif, cut: usize) -> Motif {
    let mut slots = Vec::with_capacity(parent1.len());
    slots.extend_from_slice(&parent1.slots()[..cut]);
    slots.extend_from_slice(&parent2.slots()[cut..]);
    Motif::new(slots)
}

/// Single-point crossover with the cut drawn from [1, len-1], followed by
/// per-slot extended-range noise: each slot is independently replaced by
/// an extended-scale pitch with a small probability, rests included.
pub fn crossover(
    parent1: &Motif,
    parent2: &Motif,
    scale: &Scale,
    rng: &mut impl Rng,
) -> Motif {
    let cut = rng.random_range(1..parent1.len());
    let child = splice(parent1, parent2, cut);

    let slots = child
        .slots()
        .iter()
        .map(|&slot| {
            if rng.random_bool(EXTENDED_NOISE_PROB) {
                Slot::Pitch(scale.random_extended_pitch(rng))
            } else {
                slot
            }
        })
        .collect();
    Motif::new(slots)
}

/// Breed one full generation: rank, keep the top half, then refill the
/// population entirely with mutated crossover children of two parents
/// distinct per draw.
pub fn next_generation(
    population: &[Motif],
    scale: &Scale,
    hexagram: &Hexagram,
    cfg: &EvolutionConfig,
    generation: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Motif>, ChingError> {
    let ranked = rank(population, scale, cfg.band);
    let best = ranked.first().map(|(s, _)| *s).unwrap_or(0.0);
    let mean = ranked.iter().map(|(s, _)| s).sum::<f64>() / ranked.len().max(1) as f64;
    log::info!(
        "generation {generation}: best fitness = {best:.2}, mean fitness = {mean:.2}"
    );

    let parents: Vec<&Motif> = ranked
        .iter()
        .take(population.len() / 2)
        .map(|(_, motif)| *motif)
        .collect();
    if parents.len() < 2 {
        return Err(ChingError::InsufficientPopulation(parents.len()));
    }

    let mut next = Vec::with_capacity(population.len());
    while next.len() < population.len() {
        let first = rng.random_range(0..parents.len());
        let mut second = rng.random_range(0..parents.len());
        while second == first {
            second = rng.random_range(0..parents.len());
        }
        let child = crossover(parents[first], parents[second], scale, rng);
        next.push(cfg.mutator.mutate(
            &child,
            scale,
            hexagram,
            generation,
            cfg.generations,
            rng,
        ));
    }

    Ok(next)
}

/// Drive the full run: initial population, then `generations` rounds of
/// rank / select / rebreed. The final population comes back unordered.
pub fn run(
    cfg: &EvolutionConfig,
    scale: &Scale,
    hexagram: &Hexagram,
    rng: &mut impl Rng,
) -> Result<Vec<Motif>, ChingError> {
    // Top-half selection must leave at least two parents to sample.
    if cfg.population_size / 2 < 2 {
        return Err(ChingError::InsufficientPopulation(cfg.population_size / 2));
    }

    let mut population = initial_population(cfg.population_size, scale, hexagram, rng);
    for generation in 0..cfg.generations {
        population = next_generation(&population, scale, hexagram, cfg, generation, rng)?;
    }
    Ok(population)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::MutationPolicy;
    use crate::scale::Mode;
    use rand::rngs::StdRng;

    fn config(generations: usize, population_size: usize) -> EvolutionConfig {
        EvolutionConfig {
            generations,
            population_size,
            band: VariationBand::default(),
            mutator: Mutator {
                policy: MutationPolicy::Harmonic,
                mutation_rate: 0.2,
                harmonicity_ratio: 0.6,
                resample_gating: false,
            },
        }
    }

    #[test]
    fn test_initial_population_follows_hexagram() {
        let scale = Scale::for_mode(Mode::Mixolydian);
        let hexagram = Hexagram::from_number(22).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let population = initial_population(12, &scale, &hexagram, &mut rng);
        assert_eq!(population.len(), 12);
        for motif in &population {
            assert_eq!(motif.len(), 6);
            for (i, slot) in motif.slots().iter().enumerate() {
                match slot {
                    Slot::Pitch(p) => {
                        assert!(hexagram.is_sounding(i));
                        assert!(scale.contains(*p));
                    }
                    Slot::Rest => assert!(!hexagram.is_sounding(i)),
                }
            }
        }
    }

    #[test]
    fn test_select_parents_keeps_top_half_scores() {
        let scale = Scale::for_mode(Mode::Ionian);
        let band = VariationBand::default();
        let hexagram = Hexagram::from_number(22).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let population = initial_population(20, &scale, &hexagram, &mut rng);

        let parents = select_parents(&population, &scale, band);
        assert_eq!(parents.len(), 10);

        let mut all: Vec<f64> = population
            .iter()
            .map(|m| fitness::score(m, &scale, band))
            .collect();
        all.sort_by(|a, b| b.partial_cmp(a).unwrap());
        let mut selected: Vec<f64> = parents
            .iter()
            .map(|m| fitness::score(m, &scale, band))
            .collect();
        selected.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert_eq!(selected, all[..10]);
    }

    #[test]
    fn test_select_parents_drops_one_on_odd_sizes() {
        let scale = Scale::for_mode(Mode::Ionian);
        let hexagram = Hexagram::from_number(3).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let population = initial_population(9, &scale, &hexagram, &mut rng);
        let parents = select_parents(&population, &scale, VariationBand::default());
        assert_eq!(parents.len(), 4);
    }

    #[test]
    fn test_select_parents_stable_on_ties() {
        let scale = Scale::for_mode(Mode::Ionian);
        // Both score identically (one in-scale pitch, rests, two distinct
        // values), so selection must keep their input order.
        let tied_a = Motif::from_raw(&[60, -1, -1, -1, -1, -1]);
        let tied_b = Motif::from_raw(&[64, -1, -1, -1, -1, -1]);
        let strong = Motif::from_raw(&[60, 62, -1, 64, 65, -1]);
        let weak = Motif::from_raw(&[-1; 6]);
        let population = vec![strong.clone(), tied_a.clone(), tied_b.clone(), weak];

        let parents = select_parents(&population, &scale, VariationBand::default());
        assert_eq!(parents, vec![strong, tied_a]);

        let swapped_pop = {
            let mut p = Vec::new();
            p.push(parents[0].clone());
            p.push(tied_b.clone());
            p.push(parents[1].clone());
            p.push(Motif::from_raw(&[-1; 6]));
            p
        };
        let reparented = select_parents(&swapped_pop, &scale, VariationBand::default());
        assert_eq!(reparented[1], tied_b);
    }

    #[test]
    fn test_splice_at_forced_cut() {
        let p1 = Motif::from_raw(&[60, 62, 64]);
        let p2 = Motif::from_raw(&[65, 67, 69]);
        assert_eq!(splice(&p1, &p2, 1), Motif::from_raw(&[60, 67, 69]));
    }

    #[test]
    fn test_splice_identical_parents_is_identity() {
        let p = Motif::from_raw(&[60, -1, 64, -1, 67, -1]);
        for cut in 1..p.len() {
            assert_eq!(splice(&p, &p, cut), p);
        }
    }

    #[test]
    fn test_crossover_preserves_length_and_seed_determinism() {
        let scale = Scale::for_mode(Mode::Lydian);
        let p1 = Motif::from_raw(&[60, -1, 64, 66, -1, 71]);
        let p2 = Motif::from_raw(&[67, 69, -1, -1, 62, -1]);

        let mut a = StdRng::seed_from_u64(13);
        let mut b = StdRng::seed_from_u64(13);
        for _ in 0..50 {
            let child_a = crossover(&p1, &p2, &scale, &mut a);
            let child_b = crossover(&p1, &p2, &scale, &mut b);
            assert_eq!(child_a.len(), p1.len());
            assert_eq!(child_a, child_b);
        }
    }

    #[test]
    fn test_next_generation_preserves_population_size() {
        let scale = Scale::for_mode(Mode::Dorian);
        let hexagram = Hexagram::from_number(41).unwrap();
        let cfg = config(10, 0);
        let mut rng = StdRng::seed_from_u64(4);

        for size in [4, 5, 9, 16] {
            let population = initial_population(size, &scale, &hexagram, &mut rng);
            let next =
                next_generation(&population, &scale, &hexagram, &cfg, 3, &mut rng).unwrap();
            assert_eq!(next.len(), size);
            for motif in &next {
                assert_eq!(motif.len(), 6);
            }
        }
    }

    #[test]
    fn test_run_rejects_insufficient_population() {
        let scale = Scale::for_mode(Mode::Aeolian);
        let hexagram = Hexagram::from_number(17).unwrap();
        let mut rng = StdRng::seed_from_u64(6);

        for size in [0, 1, 2, 3] {
            let cfg = config(5, size);
            assert_eq!(
                run(&cfg, &scale, &hexagram, &mut rng),
                Err(ChingError::InsufficientPopulation(size / 2))
            );
        }
    }

    #[test]
    fn test_run_is_deterministic_under_seed() {
        let scale = Scale::for_mode(Mode::Phrygian);
        let hexagram = Hexagram::from_number(30).unwrap();
        let cfg = config(8, 10);

        let mut a = StdRng::seed_from_u64(2024);
        let mut b = StdRng::seed_from_u64(2024);
        let pop_a = run(&cfg, &scale, &hexagram, &mut a).unwrap();
        let pop_b = run(&cfg, &scale, &hexagram, &mut b).unwrap();
        assert_eq!(pop_a, pop_b);
        assert_eq!(pop_a.len(), 10);
    }

    #[test]
    fn test_run_with_zero_generations_returns_initial_population() {
        let scale = Scale::for_mode(Mode::Ionian);
        let hexagram = Hexagram::from_number(5).unwrap();
        let cfg = config(0, 6);
        let mut rng = StdRng::seed_from_u64(9);

        let population = run(&cfg, &scale, &hexagram, &mut rng).unwrap();
        assert_eq!(population.len(), 6);
    }
}
