//! Bloom post chain.
//!
//! The separable blur over the bright-pass image, the tone-mapping
//! composite onto the surface, the CPU mirror of their math, and a
//! software reference of the whole chain.

pub mod blur;
pub mod composite;
pub mod software;
pub mod tone_map;
