use rand::prelude::*;
use serde::Serialize;

use crate::error::ChingError;

/// The six diatonic modes in the catalog. All are rooted on middle C
/// (MIDI 60) so their pitch tables differ only in interval structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    Ionian,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Aeolian,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Ionian,
        Mode::Dorian,
        Mode::Phrygian,
        Mode::Lydian,
        Mode::Mixolydian,
        Mode::Aeolian,
    ];

    /// Look a mode up by name (case-insensitive).
    pub fn from_name(name: &str) -> Result<Mode, ChingError> {
        match name.to_ascii_lowercase().as_str() {
            "ionian" => Ok(Mode::Ionian),
            "dorian" => Ok(Mode::Dorian),
            "phrygian" => Ok(Mode::Phrygian),
            "lydian" => Ok(Mode::Lydian),
            "mixolydian" => Ok(Mode::Mixolydian),
            "aeolian" => Ok(Mode::Aeolian),
            _ => Err(ChingError::UnknownMode(name.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Ionian => "ionian",
            Mode::Dorian => "dorian",
            Mode::Phrygian => "phrygian",
            Mode::Lydian => "lydian",
            Mode::Mixolydian => "mixolydian",
            Mode::Aeolian => "aeolian",
        }
    }
}

/// A mode's pitch material: the base octave, the two-octave extended range
/// (base pitches shifted down two octaves followed by the base pitches),
/// and the two melodically central pitches. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct Scale {
    pub mode: Mode,
    pub pitches: [i32; 7],
    pub extended: [i32; 14],
    pub preferred: [i32; 2],
}

impl Scale {
    pub fn for_mode(mode: Mode) -> Scale {
        let (pitches, preferred) = match mode {
            Mode::Ionian => ([60, 62, 64, 65, 67, 69, 71], [60, 71]),
            Mode::Dorian => ([60, 62, 63, 65, 67, 69, 70], [60, 69]),
            Mode::Phrygian => ([60, 61, 63, 65, 67, 68, 70], [60, 61]),
            Mode::Lydian => ([60, 62, 64, 66, 67, 69, 71], [60, 66]),
            Mode::Mixolydian => ([60, 62, 64, 65, 67, 69, 70], [60, 70]),
            Mode::Aeolian => ([60, 62, 63, 65, 67, 68, 70], [60, 68]),
        };

        let mut extended = [0i32; 14];
        for (i, &pitch) in pitches.iter().enumerate() {
            extended[i] = pitch - 24;
            extended[i + 7] = pitch;
        }

        Scale {
            mode,
            pitches,
            extended,
            preferred,
        }
    }

    /// Whether a pitch belongs to the base octave of this scale.
    pub fn contains(&self, pitch: i32) -> bool {
        self.pitches.contains(&pitch)
    }

    pub fn is_preferred(&self, pitch: i32) -> bool {
        self.preferred.contains(&pitch)
    }

    /// Uniform draw from the base scale.
    pub fn random_pitch(&self, rng: &mut impl Rng) -> i32 {
        *self.pitches.choose(rng).unwrap()
    }

    /// Uniform draw from the two-octave extended range.
    pub fn random_extended_pitch(&self, rng: &mut impl Rng) -> i32 {
        *self.extended.choose(rng).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    #[test]
    fn test_from_name() {
        assert_eq!(Mode::from_name("dorian").unwrap(), Mode::Dorian);
        assert_eq!(Mode::from_name("Lydian").unwrap(), Mode::Lydian);
        assert_eq!(
            Mode::from_name("locrian"),
            Err(ChingError::UnknownMode("locrian".to_string()))
        );
    }

    #[test]
    fn test_base_pitches_strictly_increasing() {
        for mode in Mode::ALL {
            let scale = Scale::for_mode(mode);
            for pair in scale.pitches.windows(2) {
                assert!(pair[0] < pair[1], "{:?} is not increasing", mode);
            }
        }
    }

    #[test]
    fn test_extended_is_two_octaves_down_plus_base() {
        let scale = Scale::for_mode(Mode::Ionian);
        assert_eq!(scale.extended.len(), 2 * scale.pitches.len());
        assert_eq!(
            scale.extended,
            [36, 38, 40, 41, 43, 45, 47, 60, 62, 64, 65, 67, 69, 71]
        );
    }

    #[test]
    fn test_preferred_pitches_are_in_scale() {
        for mode in Mode::ALL {
            let scale = Scale::for_mode(mode);
            for &pitch in &scale.preferred {
                assert!(scale.contains(pitch));
                assert!(scale.is_preferred(pitch));
            }
        }
    }

    #[test]
    fn test_random_draws_stay_in_range() {
        let scale = Scale::for_mode(Mode::Aeolian);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            assert!(scale.contains(scale.random_pitch(&mut rng)));
            let p = scale.random_extended_pitch(&mut rng);
            assert!(scale.extended.contains(&p));
        }
    }
}
