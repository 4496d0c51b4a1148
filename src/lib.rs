pub mod error;
pub mod evolve;
pub mod fitness;
pub mod hexagram;
pub mod midi;
pub mod motif;
pub mod mutation;
pub mod render;
pub mod scale;
