//! Transition models and the generators walking them.
//!
//! - Fixed-order n-gram models (`NgramModel`), order 1 included
//! - Position-partitioned order-1 models (`PositionalModel`)
//! - Two-phase construction: raw counts, then normalized tables
//! - Weighted random generation (`NgramGenerator`, `PositionalGenerator`)

/// Generators producing melodies from trained models.
///
/// Both take any `rand::Rng`, so a seeded `StdRng` pins the output.
pub mod generator;

/// Generation parameters: start strategy, start predicate, dead-end
/// policy and opening note.
pub mod generation_input;

/// Generated melodies and their text rendering.
pub mod melody;

/// Fixed-order n-gram model (`n >= 1`) and its builder.
pub mod ngram_model;

/// Start / middle / end partitioned model and its builder.
pub mod positional_model;

/// Raw transition counts of one source state.
///
/// Only used during accumulation, not exposed publicly.
mod state;

/// Normalized distributions and immutable transition tables.
pub mod table;

/// Build output: model plus warnings.
pub mod trained;
