//! Instrument-specific views of a cube's metadata table.
pub mod spice;
