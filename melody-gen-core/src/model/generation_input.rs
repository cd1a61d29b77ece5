use crate::vocabulary::{Token, Vocabulary};

use super::ngram_model::NgramState;

/// Strategy used to select the starting state of an n-gram walk.
///
/// # Variants
/// - `Random`: pick uniformly among the recorded states accepted by
///   the [`StartFilter`].
/// - `Custom(state)`: start from the given state. It does not need to be
///   recorded in the model (the walk then recovers like on a dead end),
///   but it must hold exactly `order` notes.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum StartState {
	#[default]
	Random,
	Custom(NgramState),
}

/// Predicate deciding which recorded states may start (or restart) a walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StartFilter {
	/// Only states made of unmodified notes, so a walk never opens on a
	/// rare sharp or flat prefix.
	#[default]
	BaseNotes,
	/// Every recorded state.
	Any,
}

/// What the n-gram walk does when the current state has no transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeadEndPolicy {
	/// Pick a fresh start state, append all of its notes and keep going.
	#[default]
	Restart,
	/// End the walk there. The melody may be shorter than requested.
	Stop,
}

/// First note of each measure in positional generation.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Opening {
	/// Uniform among the sources of the `middle` table.
	#[default]
	Random,
	/// Always open on this note.
	Fixed(Token),
}

/// Input parameters for generating melodies.
///
/// # Responsibilities
/// - Hold generation parameters (`start`, `start_filter`, `dead_end`, `opening`)
/// - Carry the vocabulary used to tell base notes from modified ones
///
/// The defaults reproduce the documented behavior: random start among
/// base-note states, restart on dead ends, random opening note.
#[derive(Clone, Debug, Default)]
pub struct GenerationInput {
	pub start: StartState,
	pub start_filter: StartFilter,
	pub dead_end: DeadEndPolicy,
	pub opening: Opening,
	pub vocabulary: Vocabulary,
}

impl GenerationInput {
	/// Default parameters with a custom vocabulary.
	pub fn with_vocabulary(vocabulary: Vocabulary) -> Self {
		Self { vocabulary, ..Self::default() }
	}
}
