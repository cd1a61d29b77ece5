use std::collections::BTreeSet;
use std::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::error::ModelError;
use crate::vocabulary::Token;

use super::table::{TransitionCounter, TransitionTable};
use super::trained::Trained;

/// Structural role of a transition inside a measure.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Position {
	/// First note of the measure leading to the second.
	Start,
	/// Any interior pair.
	Middle,
	/// Second-to-last note leading to the last.
	End,
}

impl Position {
	pub const ALL: [Position; 3] = [Position::Start, Position::Middle, Position::End];
}

impl fmt::Display for Position {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Position::Start => "start",
			Position::Middle => "middle",
			Position::End => "end",
		})
	}
}

/// Order-1 model partitioned by position in the measure.
///
/// Each position keeps its own independent table keyed by a single note.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct PositionalModel {
	start: TransitionTable<Token>,
	middle: TransitionTable<Token>,
	end: TransitionTable<Token>,
}

impl PositionalModel {
	pub fn table(&self, position: Position) -> &TransitionTable<Token> {
		match position {
			Position::Start => &self.start,
			Position::Middle => &self.middle,
			Position::End => &self.end,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.start.is_empty() && self.middle.is_empty() && self.end.is_empty()
	}

	/// Every note known to the model: sources and outcomes of all three tables.
	pub fn known_notes(&self) -> BTreeSet<&Token> {
		let mut notes = BTreeSet::new();
		for position in Position::ALL {
			let table = self.table(position);
			notes.extend(table.states());
			notes.extend(table.outcome_notes());
		}
		notes
	}
}

/// Accumulates per-position transitions measure by measure.
#[derive(Clone, Debug, Default)]
pub struct PositionalBuilder {
	start: TransitionCounter<Token>,
	middle: TransitionCounter<Token>,
	end: TransitionCounter<Token>,
	measures: usize,
	skipped: usize,
}

impl PositionalBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds one measure.
	///
	/// - The first pair goes to `start`, the last pair to `end`, every
	///   pair in between to `middle`.
	/// - A two-note measure feeds the same pair to `start` and `end`.
	/// - Measures shorter than two notes are skipped entirely.
	///
	/// Returns the number of adjacent pairs the measure holds.
	pub fn add_measure(&mut self, measure: &[Token]) -> usize {
		self.measures += 1;
		if measure.len() < 2 {
			self.skipped += 1;
			return 0;
		}

		let last = measure.len() - 2;
		for (i, pair) in measure.windows(2).enumerate() {
			let (from, to) = (&pair[0], &pair[1]);
			if i == 0 {
				self.start.record(from.clone(), to);
			}
			if i == last {
				self.end.record(from.clone(), to);
			}
			if i != 0 && i != last {
				self.middle.record(from.clone(), to);
			}
		}

		measure.len() - 1
	}

	pub fn add_corpus(&mut self, corpus: &Corpus) -> usize {
		corpus.measures().map(|measure| self.add_measure(measure)).sum()
	}

	/// Pairs recorded per position, in `Position::ALL` order.
	pub fn pairs(&self) -> [usize; 3] {
		[self.start.pairs(), self.middle.pairs(), self.end.pairs()]
	}

	/// Normalizes the three tables.
	///
	/// Never fails. A corpus without any measure of two notes or more gives
	/// an empty model with a [`ModelError::MalformedInput`] warning.
	pub fn build(self) -> Trained<PositionalModel> {
		let pairs = self.pairs().iter().sum();
		let mut warnings = Vec::new();

		if self.skipped > 0 {
			info!("Skipped {} measure(s) shorter than two notes", self.skipped);
		}
		if pairs == 0 {
			let reason = format!("none of the {} measure(s) holds two notes or more", self.measures);
			warn!("Empty positional model: {reason}");
			warnings.push(ModelError::MalformedInput { reason });
		}

		let model = PositionalModel {
			start: self.start.normalize(),
			middle: self.middle.normalize(),
			end: self.end.normalize(),
		};
		info!(
			"Built positional model: {} start, {} middle, {} end state(s)",
			model.start.len(),
			model.middle.len(),
			model.end.len()
		);

		Trained { model, pairs, warnings }
	}
}
