//! Height-banded contextual kerning for Nastaliq-style cursive fonts.
//!
//! In Nastaliq the first letters of a word sit high above the baseline and
//! the word slopes down toward its final glyph, so the right spacing between
//! two words depends on how far the tail of the second word rises. This
//! crate clusters joining forms into rise bins, enumerates the bin sequences
//! a word tail can take, and compiles one shared kern table per quantized
//! height band, dispatched to by contextual chain rules.
//!
//! Glyph metrics, the pairwise kern-distance solver, and the binary rule
//! compiler all live behind traits ([`types::MetricsProvider`],
//! [`types::KernSolver`], [`rules::RuleRegistry`]); this crate owns only the
//! rule generation.

pub mod binning;
pub mod cache;
pub mod compile;
pub mod config;
pub mod error;
pub mod rules;
pub mod sequence;
pub mod tables;
pub mod types;

pub use cache::KernCache;
pub use compile::{compile_at_height, compile_kerning};
pub use config::KernConfig;
pub use error::Error;
