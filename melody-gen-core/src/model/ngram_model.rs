use std::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::error::{ModelError, Result};
use crate::vocabulary::{Token, Vocabulary};

use super::generation_input::StartFilter;
use super::table::{TransitionCounter, TransitionTable};
use super::trained::Trained;

/// Ordered tuple of the last `n` notes, used as a lookup key.
///
/// Order matters: `(ド, レ)` and `(レ, ド)` are different states.
/// Serialized as a plain array of notes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NgramState(Vec<Token>);

impl NgramState {
	pub fn new(tokens: Vec<Token>) -> Self {
		Self(tokens)
	}

	/// Builds a state from note symbols.
	pub fn from_notes(notes: &[&str]) -> Self {
		Self(notes.iter().map(|note| Token::new(note)).collect())
	}

	pub fn tokens(&self) -> &[Token] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<&[Token]> for NgramState {
	fn from(tokens: &[Token]) -> Self {
		Self(tokens.to_vec())
	}
}

/// Comma-joined notes, for display only.
impl fmt::Display for NgramState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, token) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(",")?;
			}
			write!(f, "{token}")?;
		}
		Ok(())
	}
}

/// Trained n-gram model: every state of `order` notes mapped to the
/// distribution of the note that follows it.
///
/// # Invariants
/// - `order` is always >= 1
/// - Each state in `table` holds exactly `order` notes
///
/// Both are checked again when a model is deserialized.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "NgramModelRecord")]
pub struct NgramModel {
	/// Number of notes in a state.
	order: usize,
	table: TransitionTable<NgramState>,
}

/// Unchecked shape of a stored [`NgramModel`].
#[derive(Deserialize)]
struct NgramModelRecord {
	order: usize,
	table: TransitionTable<NgramState>,
}

impl TryFrom<NgramModelRecord> for NgramModel {
	type Error = ModelError;

	fn try_from(record: NgramModelRecord) -> Result<Self> {
		if record.order < 1 {
			return Err(ModelError::InvalidOrder { order: record.order });
		}
		if let Some(state) = record.table.states().find(|state| state.len() != record.order) {
			return Err(ModelError::StateWidth { expected: record.order, found: state.len() });
		}
		Ok(Self { order: record.order, table: record.table })
	}
}

impl NgramModel {
	pub fn order(&self) -> usize {
		self.order
	}

	pub fn table(&self) -> &TransitionTable<NgramState> {
		&self.table
	}

	pub fn is_empty(&self) -> bool {
		self.table.is_empty()
	}

	/// States accepted as a generation starting point, in key order.
	pub fn start_candidates(&self, filter: StartFilter, vocabulary: &Vocabulary) -> Vec<&NgramState> {
		self.table
			.states()
			.filter(|state| match filter {
				StartFilter::Any => true,
				StartFilter::BaseNotes => state.tokens().iter().all(|token| vocabulary.is_base(token)),
			})
			.collect()
	}
}

/// Accumulates `(prefix, next)` pairs for a fixed window length.
///
/// # Example
/// ```
/// use melody_gen_core::model::ngram_model::NgramBuilder;
/// use melody_gen_core::vocabulary::Vocabulary;
///
/// let vocabulary = Vocabulary::default();
/// let mut builder = NgramBuilder::new(1).unwrap();
/// builder.add_sequence(&vocabulary.tokenize("ドドミ"));
/// builder.add_sequence(&vocabulary.tokenize("ドミソ"));
/// let trained = builder.build();
/// assert_eq!(trained.model.table().len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct NgramBuilder {
	order: usize,
	counter: TransitionCounter<NgramState>,
	sequences: usize,
}

impl NgramBuilder {
	/// Creates a builder for windows of `order` notes.
	///
	/// # Errors
	/// Returns [`ModelError::InvalidOrder`] if `order < 1`.
	pub fn new(order: usize) -> Result<Self> {
		if order < 1 {
			return Err(ModelError::InvalidOrder { order });
		}
		Ok(Self { order, counter: TransitionCounter::default(), sequences: 0 })
	}

	/// Adds every `(tokens[i..i+n], tokens[i+n])` pair of one sequence.
	///
	/// Returns the number of pairs added: `len - n`, or 0 for a sequence
	/// of `n` notes or fewer.
	pub fn add_sequence(&mut self, tokens: &[Token]) -> usize {
		self.sequences += 1;
		if tokens.len() <= self.order {
			return 0;
		}

		for window in tokens.windows(self.order + 1) {
			let (prefix, next) = window.split_at(self.order);
			self.counter.record(NgramState::from(prefix), &next[0]);
		}

		tokens.len() - self.order
	}

	/// Adds each piece of the corpus as one continuous sequence.
	pub fn add_corpus(&mut self, corpus: &Corpus) -> usize {
		corpus.sequences().map(|sequence| self.add_sequence(&sequence)).sum()
	}

	/// Adds each measure as its own sequence, windows never cross a line.
	pub fn add_measures(&mut self, corpus: &Corpus) -> usize {
		corpus.measures().map(|measure| self.add_sequence(measure)).sum()
	}

	/// Pairs recorded so far.
	pub fn pairs(&self) -> usize {
		self.counter.pairs()
	}

	/// Normalizes the counts into an immutable model.
	///
	/// A build without any pair is not an error: the model is empty and a
	/// [`ModelError::MalformedInput`] warning is attached.
	pub fn build(self) -> Trained<NgramModel> {
		let pairs = self.counter.pairs();
		let mut warnings = Vec::new();

		if pairs == 0 {
			let reason = format!(
				"no sequence among {} is longer than the window of {} note(s)",
				self.sequences, self.order
			);
			warn!("Empty n-gram model: {reason}");
			warnings.push(ModelError::MalformedInput { reason });
		}

		let model = NgramModel { order: self.order, table: self.counter.normalize() };
		info!("Built {}-gram model: {} pairs, {} states", model.order, pairs, model.table.len());

		Trained { model, pairs, warnings }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tokens(notes: &[&str]) -> Vec<Token> {
		notes.iter().map(|note| Token::from(*note)).collect()
	}

	#[test]
	fn order_zero_is_rejected() {
		assert!(matches!(NgramBuilder::new(0), Err(ModelError::InvalidOrder { order: 0 })));
	}

	#[test]
	fn pair_count_is_length_minus_order() {
		let sequence = tokens(&["ド", "レ", "ミ", "ファ", "ソ", "ラ"]);
		for order in 1..sequence.len() {
			let mut builder = NgramBuilder::new(order).unwrap();
			assert_eq!(builder.add_sequence(&sequence), sequence.len() - order);
			assert_eq!(builder.pairs(), sequence.len() - order);
		}
	}

	#[test]
	fn short_sequences_contribute_nothing() {
		let mut builder = NgramBuilder::new(3).unwrap();
		assert_eq!(builder.add_sequence(&tokens(&["ド", "レ", "ミ"])), 0);
		assert_eq!(builder.add_sequence(&[]), 0);

		let trained = builder.build();
		assert!(trained.model.is_empty());
		assert!(matches!(trained.warnings.as_slice(), [ModelError::MalformedInput { .. }]));
	}

	#[test]
	fn order_matters_in_states() {
		let mut builder = NgramBuilder::new(2).unwrap();
		builder.add_sequence(&tokens(&["ド", "レ", "ミ", "レ", "ド", "ソ"]));
		let model = builder.build().model;

		let forward = NgramState::from_notes(&["ド", "レ"]);
		let backward = NgramState::from_notes(&["レ", "ド"]);
		assert_eq!(model.table().distribution(&forward).and_then(|d| d.probability(&Token::from("ミ"))), Some(1.0));
		assert_eq!(model.table().distribution(&backward).and_then(|d| d.probability(&Token::from("ソ"))), Some(1.0));
	}

	#[test]
	fn start_candidates_skip_modified_notes() {
		let mut builder = NgramBuilder::new(1).unwrap();
		builder.add_sequence(&tokens(&["＃ド", "レ", "ミ"]));
		let model = builder.build().model;

		let vocabulary = Vocabulary::default();
		let pure = model.start_candidates(StartFilter::BaseNotes, &vocabulary);
		assert_eq!(pure, vec![&NgramState::from_notes(&["レ"])]);
		assert_eq!(model.start_candidates(StartFilter::Any, &vocabulary).len(), 2);
	}

	#[test]
	fn state_display_is_comma_joined() {
		assert_eq!(NgramState::from_notes(&["ド", "＃レ", "ミ"]).to_string(), "ド,＃レ,ミ");
	}
}
