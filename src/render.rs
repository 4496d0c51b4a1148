use rand::prelude::*;
use serde::Serialize;

use crate::hexagram::Hexagram;
use crate::motif::{Motif, Slot};
use crate::scale::Scale;

/// Number of polyphonic voices rendered per motif.
pub const VOICES: usize = 3;

/// Duration multipliers applied to the base duration.
const NOTE_DURATION_FACTORS: [f64; 3] = [1.0, 1.5, 2.0];
const REST_DURATION_FACTORS: [f64; 3] = [0.5, 0.75, 1.0];

/// Velocity bands. Sounding hexagram lines lean toward the high band in
/// proportion to the dynamic ratio; silent lines lean the other way.
const HIGH_VELOCITY: std::ops::Range<u8> = 80..120;
const LOW_VELOCITY: std::ops::Range<u8> = 60..80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    Note { pitch: i32, velocity: u8 },
    Rest,
}

/// One timed event of a rendered voice. Durations are in quarter lengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderedEvent {
    pub kind: EventKind,
    pub quarter_len: f64,
}

/// Render a finished motif into three voices of timed events.
///
/// The first voice plays the motif's own pitches; the other two keep its
/// rhythm but draw their pitches from the extended scale, so the score
/// gets a three-part texture while the evolved pitches stay audible.
pub fn render_motif(
    motif: &Motif,
    scale: &Scale,
    hexagram: &Hexagram,
    base_duration: f64,
    dynamic_ratio: f64,
    rng: &mut impl Rng,
) -> Vec<Vec<RenderedEvent>> {
    (0..VOICES)
        .map(|voice| {
            motif
                .slots()
                .iter()
                .enumerate()
                .map(|(i, slot)| match slot {
                    Slot::Pitch(pitch) => {
                        let pitch = if voice == 0 {
                            *pitch
                        } else {
                            scale.random_extended_pitch(rng)
                        };
                        RenderedEvent {
                            kind: EventKind::Note {
                                pitch,
                                velocity: dynamic_level(
                                    hexagram.is_sounding(i),
                                    dynamic_ratio,
                                    rng,
                                ),
                            },
                            quarter_len: base_duration
                                * NOTE_DURATION_FACTORS.choose(rng).unwrap(),
                        }
                    }
                    Slot::Rest => RenderedEvent {
                        kind: EventKind::Rest,
                        quarter_len: base_duration * REST_DURATION_FACTORS.choose(rng).unwrap(),
                    },
                })
                .collect()
        })
        .collect()
}

/// Pick a velocity from the high or low band depending on the hexagram
/// line character at this position and the dynamic ratio.
fn dynamic_level(line_sounding: bool, dynamic_ratio: f64, rng: &mut impl Rng) -> u8 {
    let favour_high = rng.random::<f64>() < dynamic_ratio;
    let high = line_sounding == favour_high;
    if high {
        rng.random_range(HIGH_VELOCITY)
    } else {
        rng.random_range(LOW_VELOCITY)
    }
}
