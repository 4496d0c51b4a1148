use serde::Serialize;

use crate::motif::Motif;
use crate::scale::Scale;

/// Target band for the repetition/variation term. The musically useful
/// band depends on how varied the pitch material is allowed to get, so it
/// is a run parameter rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VariationBand {
    pub min: usize,
    pub max: usize,
}

impl Default for VariationBand {
    fn default() -> Self {
        VariationBand { min: 3, max: 7 }
    }
}

impl VariationBand {
    fn contains(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

/// The five sub-scores of a motif, kept separate so runs can report where
/// a motif earned its fitness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitnessBreakdown {
    pub conformity: f64,
    pub melodic_interest: f64,
    pub rhythmic_complexity: f64,
    pub motivic_development: f64,
    pub repetition_variation: f64,
}

impl FitnessBreakdown {
    pub fn total(&self) -> f64 {
        self.conformity
            + self.melodic_interest
            + self.rhythmic_complexity
            + self.motivic_development
            + self.repetition_variation
    }
}

/// Count of sounding slots whose pitch lies in the mode's base scale.
pub fn conformity_to_scale(motif: &Motif, scale: &Scale) -> f64 {
    motif
        .sounding_pitches()
        .filter(|&p| scale.contains(p))
        .count() as f64
}

/// Weighted intervals between successive sounding pitches: steps of one or
/// two semitones score 1, leaps beyond four semitones score 2, anything in
/// between scores 0.5.
pub fn melodic_interest(motif: &Motif) -> f64 {
    let pitches: Vec<i32> = motif.sounding_pitches().collect();
    pitches
        .windows(2)
        .map(|pair| match (pair[1] - pair[0]).abs() {
            1 | 2 => 1.0,
            i if i > 4 => 2.0,
            _ => 0.5,
        })
        .sum()
}

/// 1 when the motif alternates sound and silence at all, else 0.
pub fn rhythmic_complexity(motif: &Motif) -> f64 {
    if motif.has_sounding() && motif.has_rest() {
        1.0
    } else {
        0.0
    }
}

/// 1 when the motif contains both material to develop and space to
/// develop it in. Same predicate as rhythmic complexity, counted as its
/// own term.
pub fn motivic_development_potential(motif: &Motif) -> f64 {
    if motif.has_sounding() && motif.has_rest() {
        1.0
    } else {
        0.0
    }
}

/// 1 when the count of distinct slot values falls inside the band.
pub fn repetition_and_variation(motif: &Motif, band: VariationBand) -> f64 {
    if band.contains(motif.unique_value_count()) {
        1.0
    } else {
        0.0
    }
}

pub fn breakdown(motif: &Motif, scale: &Scale, band: VariationBand) -> FitnessBreakdown {
    FitnessBreakdown {
        conformity: conformity_to_scale(motif, scale),
        melodic_interest: melodic_interest(motif),
        rhythmic_complexity: rhythmic_complexity(motif),
        motivic_development: motivic_development_potential(motif),
        repetition_variation: repetition_and_variation(motif, band),
    }
}

/// Composite fitness: plain sum of the five sub-scores. Total for every
/// well-formed motif.
pub fn score(motif: &Motif, scale: &Scale, band: VariationBand) -> f64 {
    breakdown(motif, scale, band).total()
}
