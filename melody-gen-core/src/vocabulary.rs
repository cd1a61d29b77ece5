use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{BASE_NOTES, MODIFIERS};

/// A single note symbol.
///
/// Tokens compare by exact string equality. The tokenizer only ever
/// produces symbols of its vocabulary, but the model layer accepts any
/// token it is given.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
	pub fn new(symbol: &str) -> Self {
		Self(symbol.to_owned())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for Token {
	fn from(symbol: &str) -> Self {
		Self::new(symbol)
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Closed set of note symbols.
///
/// A vocabulary is made of base notes and modifier prefixes. Every base
/// note is a symbol, and so is every `modifier + base` combination.
///
/// # Invariants
/// - `symbols` is sorted by decreasing length, so the first match while
///   scanning is always the longest one (`＃ド` wins over `ド`).
#[derive(Clone, Debug)]
pub struct Vocabulary {
	base: Vec<String>,
	modifiers: Vec<String>,
	symbols: Vec<String>,
}

impl Default for Vocabulary {
	/// Japanese solfège with fullwidth sharp and flat prefixes.
	fn default() -> Self {
		Self::new(&BASE_NOTES, &MODIFIERS)
	}
}

impl Vocabulary {
	/// Creates a vocabulary from base notes and modifier prefixes.
	///
	/// The order of `base` is the display order used by [`Vocabulary::rank`].
	pub fn new(base: &[&str], modifiers: &[&str]) -> Self {
		let base: Vec<String> = base.iter().map(|s| (*s).to_owned()).collect();
		let modifiers: Vec<String> = modifiers.iter().map(|s| (*s).to_owned()).collect();

		let mut symbols: Vec<String> = base.clone();
		for modifier in &modifiers {
			for note in &base {
				symbols.push(format!("{modifier}{note}"));
			}
		}
		// Stable sort keeps the declaration order among equal lengths
		symbols.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

		Self { base, modifiers, symbols }
	}

	/// Splits `text` into notes.
	///
	/// At each position the longest matching symbol is taken. Characters
	/// that do not start any symbol (spaces, bar lines, lyrics) are skipped.
	pub fn tokenize(&self, text: &str) -> Vec<Token> {
		let mut tokens = Vec::new();
		let mut rest = text;

		while let Some(c) = rest.chars().next() {
			match self.symbols.iter().find(|symbol| rest.starts_with(symbol.as_str())) {
				Some(symbol) => {
					tokens.push(Token::new(symbol));
					rest = &rest[symbol.len()..];
				}
				None => rest = &rest[c.len_utf8()..],
			}
		}

		tokens
	}

	/// Splits `text` into measures, one per line, each tokenized on its own.
	///
	/// Lines without any note yield empty measures; the builders skip them.
	pub fn segment(&self, text: &str) -> Vec<Vec<Token>> {
		text.lines().map(|line| self.tokenize(line)).collect()
	}

	/// Returns `true` if `token` is an unmodified note.
	pub fn is_base(&self, token: &Token) -> bool {
		self.base.iter().any(|note| note == token.as_str())
	}

	/// Display rank of a note: base notes first, then one block per modifier.
	///
	/// Unknown tokens all share the last rank.
	pub fn rank(&self, token: &Token) -> usize {
		let symbol = token.as_str();
		if let Some(index) = self.base.iter().position(|note| note == symbol) {
			return index;
		}

		for (m, modifier) in self.modifiers.iter().enumerate() {
			if let Some(note) = symbol.strip_prefix(modifier.as_str()) {
				if let Some(index) = self.base.iter().position(|base| base == note) {
					return self.base.len() * (m + 1) + index;
				}
			}
		}

		self.base.len() * (self.modifiers.len() + 1)
	}
}
