use serde::{Deserialize, Serialize};

use crate::vocabulary::Token;

/// A generated sequence of notes. Immutable once returned.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct Melody {
	notes: Vec<Token>,
}

impl Melody {
	pub(crate) fn new(notes: Vec<Token>) -> Self {
		Self { notes }
	}

	pub fn notes(&self) -> &[Token] {
		&self.notes
	}

	pub fn len(&self) -> usize {
		self.notes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.notes.is_empty()
	}

	/// Cuts the melody into measures of `notes_per_measure` notes.
	/// The last measure may be shorter.
	pub fn measures(&self, notes_per_measure: usize) -> Vec<Melody> {
		self.notes
			.chunks(notes_per_measure.max(1))
			.map(|chunk| Melody::new(chunk.to_vec()))
			.collect()
	}

	/// Space-separated notes on a single line.
	pub fn to_line(&self) -> String {
		self.notes.iter().map(Token::as_str).collect::<Vec<_>>().join(" ")
	}
}

/// Renders measures as text, one measure per line.
pub fn render_measures(measures: &[Melody]) -> String {
	let mut text = String::new();
	for measure in measures {
		text.push_str(&measure.to_line());
		text.push('\n');
	}
	text
}
