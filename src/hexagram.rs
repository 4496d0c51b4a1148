use rand::prelude::*;

use crate::error::ChingError;

/// Number of lines in a hexagram, and therefore the fixed motif length.
pub const LINES: usize = 6;

/// Number of distinct hexagrams.
pub const COUNT: u8 = 64;

/// One of the 64 I Ching hexagrams, read as a rhythmic gating template:
/// a sounding line admits a pitch, a silent line calls for a rest.
///
/// Hexagram 1 is all sounding and hexagram 64 all silent, with the first
/// line varying slowest in between. Immutable once chosen for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hexagram {
    lines: [bool; LINES],
}

impl Hexagram {
    /// Build the hexagram for a number in [1, 64].
    pub fn from_number(number: u8) -> Result<Hexagram, ChingError> {
        if !(1..=COUNT).contains(&number) {
            return Err(ChingError::InvalidHexagram(number));
        }
        let index = number - 1;
        let mut lines = [false; LINES];
        for (i, line) in lines.iter_mut().enumerate() {
            *line = (index >> (LINES - 1 - i)) & 1 == 0;
        }
        Ok(Hexagram { lines })
    }

    /// Uniform draw over all 64 hexagrams.
    pub fn random(rng: &mut impl Rng) -> Hexagram {
        let mut lines = [false; LINES];
        for line in &mut lines {
            *line = rng.random_bool(0.5);
        }
        Hexagram { lines }
    }

    /// The number in [1, 64] this hexagram enumerates to.
    pub fn number(&self) -> u8 {
        let mut index = 0u8;
        for (i, &line) in self.lines.iter().enumerate() {
            if !line {
                index |= 1 << (LINES - 1 - i);
            }
        }
        index + 1
    }

    pub fn lines(&self) -> &[bool; LINES] {
        &self.lines
    }

    pub fn is_sounding(&self, position: usize) -> bool {
        self.lines[position]
    }
}
