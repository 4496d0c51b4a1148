use std::collections::HashSet;

use serde::Serialize;

/// One position in a motif: either silence or an absolute MIDI-style pitch.
/// Pitch values are not bounded to any scale; crossover and mutation may
/// push them outside the mode on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Slot {
    Rest,
    Pitch(i32),
}

/// A fixed-length sequence of slots, the unit of evolution. Motifs are
/// plain values: every genetic operator consumes references and produces
/// a fresh motif, so parents and children never alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Motif {
    slots: Vec<Slot>,
}

impl Motif {
    pub fn new(slots: Vec<Slot>) -> Motif {
        Motif { slots }
    }

    /// Build a motif from the compact integer form where -1 marks a rest.
    pub fn from_raw(values: &[i32]) -> Motif {
        Motif {
            slots: values
                .iter()
                .map(|&v| if v == -1 { Slot::Rest } else { Slot::Pitch(v) })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Pitches of the sounding slots, in order.
    pub fn sounding_pitches(&self) -> impl Iterator<Item = i32> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Pitch(p) => Some(*p),
            Slot::Rest => None,
        })
    }

    pub fn has_sounding(&self) -> bool {
        self.slots.iter().any(|s| matches!(s, Slot::Pitch(_)))
    }

    pub fn has_rest(&self) -> bool {
        self.slots.iter().any(|s| matches!(s, Slot::Rest))
    }

    /// Number of distinct slot values; all rests together count as one.
    pub fn unique_value_count(&self) -> usize {
        self.slots.iter().copied().collect::<HashSet<Slot>>().len()
    }
}
