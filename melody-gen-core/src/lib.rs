//! Markov-chain melody generation library.
//!
//! This crate provides:
//! - Note tokenization over a fixed vocabulary (solfège with sharps/flats)
//! - Corpus loading (one piece per file, one measure per line)
//! - N-gram and position-aware transition models
//! - Probabilistic melody generation with an injectable random source
//! - Model persistence (JSON or compact binary) and text reports

/// Default parameters.
pub mod config;

/// Training corpus loading.
pub mod corpus;

/// Error type shared by the whole crate.
pub mod error;

/// Transition models, builders and generators.
pub mod model;

/// Saving and loading models and melodies.
pub mod persist;

/// Read-only text rendering of transition tables.
pub mod report;

/// Note symbols and the tokenizer.
pub mod vocabulary;

/// I/O utilities (file loading, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use error::{ModelError, Result};
