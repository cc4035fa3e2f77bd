//! Sampling of single channel images at fractional positions.

mod bilinear;

/// Grid generation and coordinate mapping utilities.
pub mod grid;

pub use bilinear::bilinear;
