//! Deterministic random number generation
//!
//! Uses the xorshift64* algorithm for fast, deterministic random number
//! generation. CRITICAL: all randomness in the harness MUST go through
//! this module — parameter draws, bind-time resampling, and anything a
//! model does internally.

mod xorshift;

pub use xorshift::RngManager;
