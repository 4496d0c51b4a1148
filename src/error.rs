use thiserror::Error;

/// Errors surfaced by the evolutionary core. All of them are fatal to the
/// run; there is no partial-success mode.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChingError {
    #[error("unknown mode '{0}' (expected one of ionian, dorian, phrygian, lydian, mixolydian, aeolian)")]
    UnknownMode(String),

    #[error("hexagram number {0} is out of range (expected 1-64)")]
    InvalidHexagram(u8),

    #[error("only {0} parent(s) available for breeding, need at least 2")]
    InsufficientPopulation(usize),
}
