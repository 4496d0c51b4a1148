use clap::ValueEnum;
use rand::prelude::*;
use serde::Serialize;

use crate::hexagram::Hexagram;
use crate::motif::{Motif, Slot};
use crate::scale::Scale;

/// Intervals favoured when the transposition pre-pass leans consonant
/// (minor/major third, fourth, fifth).
const CONSONANT_INTERVALS: [i32; 4] = [3, 4, 5, 7];

/// Intervals used by the wholesale pool when it leans dissonant.
const DISSONANT_INTERVALS: [i32; 3] = [1, 2, 6];

/// The selectable mutation policies. Each is a pre-pass (or two) composed
/// in front of the shared hexagram-gated core step; `Basic` is the core
/// alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
pub enum MutationPolicy {
    /// Core gating step only.
    Basic,
    /// Global consonant transposition, then the core step.
    Harmonic,
    /// Consonant transposition and mirror-symmetry passes, then the core.
    HarmonicMirror,
    /// Transposition pool blends fully random intervals with a consonant
    /// tail that grows with the harmonicity ratio.
    HarmonicityBlend,
    /// Transposition pool is wholly consonant or wholly dissonant,
    /// decided by comparing the harmonicity ratio against the mutation
    /// rate.
    HarmonicityPool,
}

/// One configured mutation operator. Pure in (motif, scale, generation)
/// plus the random source; the run's hexagram is only ever read.
#[derive(Debug, Clone, Copy)]
pub struct Mutator {
    pub policy: MutationPolicy,
    /// Probability of each pre-pass firing, in [0, 1].
    pub mutation_rate: f64,
    /// Bias toward consonant transposition intervals, in [0, 1].
    pub harmonicity_ratio: f64,
    /// Draw a fresh gating hexagram per call instead of reading the run's
    /// fixed one. Off by default.
    pub resample_gating: bool,
}

impl Mutator {
    pub fn mutate(
        &self,
        motif: &Motif,
        scale: &Scale,
        hexagram: &Hexagram,
        generation: usize,
        max_generations: usize,
        rng: &mut impl Rng,
    ) -> Motif {
        let mut slots = motif.slots().to_vec();

        if let Some(pool) = self.transposition_pool() {
            if rng.random_bool(self.mutation_rate) {
                transpose(&mut slots, *pool.choose(rng).unwrap());
            }
        }

        if self.policy == MutationPolicy::HarmonicMirror && rng.random_bool(self.mutation_rate) {
            mirror(&mut slots);
        }

        let gating = if self.resample_gating {
            Hexagram::random(rng)
        } else {
            *hexagram
        };
        gated_point_mutation(
            &mut slots,
            scale,
            &gating,
            generation_factor(generation, max_generations),
            rng,
        );

        Motif::new(slots)
    }

    /// Interval pool for the global transposition pre-pass, or None when
    /// the policy has no such pass.
    fn transposition_pool(&self) -> Option<Vec<i32>> {
        match self.policy {
            MutationPolicy::Basic => None,
            MutationPolicy::Harmonic | MutationPolicy::HarmonicMirror => {
                Some(CONSONANT_INTERVALS.to_vec())
            }
            MutationPolicy::HarmonicityBlend => {
                let tail = (CONSONANT_INTERVALS.len() as f64 * self.harmonicity_ratio) as usize;
                let mut pool: Vec<i32> = (1..=7).collect();
                pool.extend_from_slice(&CONSONANT_INTERVALS[..tail.min(CONSONANT_INTERVALS.len())]);
                Some(pool)
            }
            MutationPolicy::HarmonicityPool => {
                if self.harmonicity_ratio > self.mutation_rate {
                    Some(CONSONANT_INTERVALS.to_vec())
                } else {
                    Some(DISSONANT_INTERVALS.to_vec())
                }
            }
        }
    }
}

/// Linear schedule in [0, 1] over the run; drives the core step's
/// probabilities upward in later generations.
fn generation_factor(generation: usize, max_generations: usize) -> f64 {
    if max_generations == 0 {
        0.0
    } else {
        generation as f64 / max_generations as f64
    }
}

/// Shift every sounding slot by the same interval; rests are untouched.
fn transpose(slots: &mut [Slot], interval: i32) {
    for slot in slots {
        if let Slot::Pitch(p) = slot {
            *p += interval;
        }
    }
}

/// Overwrite the second half with the mirror image of the first.
fn mirror(slots: &mut [Slot]) {
    let midpoint = slots.len() / 2;
    for i in 0..midpoint {
        slots[slots.len() - 1 - i] = slots[i];
    }
}

/// The shared core step: one slot is picked at random and rewritten
/// depending on its current state and on whether the gating hexagram
/// marks that position as sounding.
fn gated_point_mutation(
    slots: &mut [Slot],
    scale: &Scale,
    gating: &Hexagram,
    factor: f64,
    rng: &mut impl Rng,
) {
    let point = rng.random_range(0..slots.len());
    let choice: f64 = rng.random();

    match slots[point] {
        Slot::Rest => {
            if gating.is_sounding(point) && choice < 0.5 + factor * 0.2 {
                slots[point] = Slot::Pitch(scale.random_pitch(rng));
            }
        }
        Slot::Pitch(_) => {
            if gating.is_sounding(point) {
                if choice < 0.3 + factor * 0.2 {
                    slots[point] = Slot::Pitch(scale.random_pitch(rng));
                }
            } else if choice < 0.4 {
                slots[point] = Slot::Rest;
            } else {
                slots[point] = Slot::Pitch(scale.random_extended_pitch(rng));
            }
        }
    }
}
