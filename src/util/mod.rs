//! Shared utilities for the demo.
//!
//! Currently just frame timing: the clock that drives animation and the
//! smoothed FPS readout fed by its deltas.

pub mod frame_timing;
