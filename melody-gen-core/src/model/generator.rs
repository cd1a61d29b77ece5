use log::debug;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::error::{ModelError, Result};
use crate::vocabulary::Token;

use super::generation_input::{DeadEndPolicy, GenerationInput, Opening, StartState};
use super::melody::Melody;
use super::ngram_model::{NgramModel, NgramState};
use super::positional_model::{Position, PositionalModel};

/// Weighted random walk over an [`NgramModel`].
///
/// # Responsibilities
/// - Select a start state (random among the filtered states, or custom)
/// - Extend the melody one note at a time from the last `order` notes
/// - Recover from dead ends according to [`DeadEndPolicy`]
///
/// The generator only reads the model. Several generators may share one
/// model as long as each uses its own random source.
#[derive(Debug)]
pub struct NgramGenerator<'a> {
	model: &'a NgramModel,
	input: &'a GenerationInput,
}

impl<'a> NgramGenerator<'a> {
	pub fn new(model: &'a NgramModel, input: &'a GenerationInput) -> Self {
		Self { model, input }
	}

	/// Picks a start state uniformly among the states accepted by the filter.
	///
	/// # Errors
	/// - [`ModelError::EmptyModel`] if the model has no state at all.
	/// - [`ModelError::NoValidStartState`] if the filter rejects every state.
	pub fn random_start<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&'a NgramState> {
		if self.model.is_empty() {
			return Err(ModelError::EmptyModel);
		}

		let candidates = self.model.start_candidates(self.input.start_filter, &self.input.vocabulary);
		candidates.choose(rng).copied().ok_or(ModelError::NoValidStartState)
	}

	/// Generates a melody of exactly `length` notes.
	///
	/// # Behavior
	/// - Seeds the melody with the notes of the start state.
	/// - Looks up the last `order` notes and samples the next one.
	/// - On a state without transitions, either appends a fresh start state
	///   (`Restart`, may overshoot, the result is truncated) or stops (`Stop`).
	///
	/// # Errors
	/// - [`ModelError::InvalidLength`] if `length` is 0.
	/// - [`ModelError::EmptyModel`] / [`ModelError::NoValidStartState`] when
	///   no start state can be chosen.
	/// - [`ModelError::StartStateOrder`] if a custom start has the wrong width.
	pub fn generate<R: Rng + ?Sized>(&self, length: usize, rng: &mut R) -> Result<Melody> {
		if length == 0 {
			return Err(ModelError::InvalidLength { name: "length" });
		}
		if self.model.is_empty() {
			return Err(ModelError::EmptyModel);
		}

		let order = self.model.order();
		let mut notes: Vec<Token> = match &self.input.start {
			StartState::Random => self.random_start(rng)?.tokens().to_vec(),
			StartState::Custom(state) => {
				if state.len() != order {
					return Err(ModelError::StartStateOrder { expected: order, found: state.len() });
				}
				state.tokens().to_vec()
			}
		};

		while notes.len() < length {
			let current = NgramState::from(&notes[notes.len() - order..]);

			match self.model.table().distribution(&current) {
				Some(distribution) => {
					let next = distribution.sample(rng)?.clone();
					notes.push(next);
				}
				None => match self.input.dead_end {
					DeadEndPolicy::Restart => {
						let restart = self.random_start(rng)?;
						debug!("Dead end at ({current}) after {} notes, restarting from ({restart})", notes.len());
						notes.extend_from_slice(restart.tokens());
					}
					DeadEndPolicy::Stop => {
						debug!("Dead end at ({current}) after {} notes, stopping", notes.len());
						break;
					}
				},
			}
		}

		notes.truncate(length);
		Ok(Melody::new(notes))
	}

	/// Generates `measures * notes_per_measure` notes and cuts them into measures.
	///
	/// # Errors
	/// Same as [`NgramGenerator::generate`], plus [`ModelError::InvalidLength`]
	/// if either count is 0.
	pub fn generate_measures<R: Rng + ?Sized>(
		&self,
		measures: usize,
		notes_per_measure: usize,
		rng: &mut R,
	) -> Result<Vec<Melody>> {
		check_measure_shape(measures, notes_per_measure)?;
		let melody = self.generate(measures * notes_per_measure, rng)?;
		Ok(melody.measures(notes_per_measure))
	}
}

/// Measure-by-measure generation over a [`PositionalModel`].
///
/// Each measure opens on one note, continues with the `middle` table and
/// closes with the `end` table. A note without transitions in the table
/// being used falls back to a uniform pick among every note the model knows.
#[derive(Debug)]
pub struct PositionalGenerator<'a> {
	model: &'a PositionalModel,
	input: &'a GenerationInput,
}

impl<'a> PositionalGenerator<'a> {
	pub fn new(model: &'a PositionalModel, input: &'a GenerationInput) -> Self {
		Self { model, input }
	}

	/// Generates `measures` measures of `notes_per_measure` notes each.
	///
	/// # Errors
	/// - [`ModelError::InvalidLength`] if either count is 0.
	/// - [`ModelError::EmptyModel`] if the model has no transition at all.
	pub fn generate<R: Rng + ?Sized>(
		&self,
		measures: usize,
		notes_per_measure: usize,
		rng: &mut R,
	) -> Result<Vec<Melody>> {
		check_measure_shape(measures, notes_per_measure)?;
		if self.model.is_empty() {
			return Err(ModelError::EmptyModel);
		}

		let known: Vec<&Token> = self.model.known_notes().into_iter().collect();
		let mut openings: Vec<&Token> = self.model.table(Position::Middle).states().collect();
		if openings.is_empty() {
			debug!("No middle transitions, opening on any known note");
			openings = known.clone();
		}

		let mut result = Vec::with_capacity(measures);
		for _ in 0..measures {
			let mut current = match &self.input.opening {
				Opening::Fixed(note) => note.clone(),
				Opening::Random => openings.choose(rng).map(|note| (*note).clone()).ok_or(ModelError::EmptyModel)?,
			};

			let mut notes = Vec::with_capacity(notes_per_measure);
			notes.push(current.clone());
			while notes.len() < notes_per_measure {
				let position = if notes.len() + 1 == notes_per_measure { Position::End } else { Position::Middle };
				current = self.next_note(position, &current, &known, rng)?;
				notes.push(current.clone());
			}

			result.push(Melody::new(notes));
		}

		Ok(result)
	}

	fn next_note<R: Rng + ?Sized>(
		&self,
		position: Position,
		current: &Token,
		known: &[&Token],
		rng: &mut R,
	) -> Result<Token> {
		match self.model.table(position).distribution(current) {
			Some(distribution) => Ok(distribution.sample(rng)?.clone()),
			None => {
				debug!("No {position} transition from {current}, picking any known note");
				known.choose(rng).map(|note| (*note).clone()).ok_or(ModelError::EmptyModel)
			}
		}
	}
}

fn check_measure_shape(measures: usize, notes_per_measure: usize) -> Result<()> {
	if measures == 0 {
		return Err(ModelError::InvalidLength { name: "measures" });
	}
	if notes_per_measure == 0 {
		return Err(ModelError::InvalidLength { name: "notes_per_measure" });
	}
	Ok(())
}
