//! Composable building blocks for constructing audio-processing graphs.
//!
//! Graph nodes wrap the low-level DSP primitives with what a cue voice needs:
//! a trigger, block-based rendering, and a way to report when it has finished.
//! The `extensions` module adds fluent helpers so voices read as a chain.

/// Multiply two signals together (envelope or tremolo).
pub mod amplify;
/// Attack/release envelope node.
pub mod envelope;
/// Fluent combinators (`.amplify()`, `.mix()`, etc.).
pub mod extensions;
/// Topology-preserving filter node.
pub mod filter;
/// Constant gain stage.
pub mod gain;
/// Low frequency oscillators for slow gain swells.
pub mod lfo;
/// Parallel summing of two sources.
pub mod mix;
/// Core traits shared by all graph nodes.
pub mod node;
/// Audio-band oscillators, sweeps and noise bursts.
pub mod oscillator;
/// Serial chaining of two nodes (source → effect).
pub mod through;

pub use node::{GraphNode, RenderCtx};
