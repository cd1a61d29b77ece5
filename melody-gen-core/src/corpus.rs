use std::path::Path;

use log::{debug, info};

use crate::config::CORPUS_EXTENSION;
use crate::error::Result;
use crate::io::{get_filename, list_files, read_text};
use crate::vocabulary::{Token, Vocabulary};

/// One tokenized melody, usually one corpus file.
#[derive(Clone, Debug, PartialEq)]
pub struct Piece {
	/// File stem the piece was read from.
	pub name: String,
	/// One entry per input line.
	pub measures: Vec<Vec<Token>>,
}

impl Piece {
	/// Tokenizes `text` with `vocabulary`, one measure per line.
	pub fn from_text(name: &str, text: &str, vocabulary: &Vocabulary) -> Self {
		Self {
			name: name.to_owned(),
			measures: vocabulary.segment(text),
		}
	}

	/// All notes of the piece, measure boundaries removed.
	pub fn notes(&self) -> Vec<Token> {
		self.measures.iter().flatten().cloned().collect()
	}
}

/// Training corpus: an ordered list of pieces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Corpus {
	pieces: Vec<Piece>,
}

impl Corpus {
	pub fn new(pieces: Vec<Piece>) -> Self {
		Self { pieces }
	}

	/// Loads a single file or every `.txt` file of a directory.
	///
	/// # Notes
	/// - Directory entries are read in file-name order.
	/// - Subdirectories are ignored.
	///
	/// # Errors
	/// Returns an error if the path cannot be read.
	pub fn load<P: AsRef<Path>>(path: P, vocabulary: &Vocabulary) -> Result<Self> {
		let path = path.as_ref();
		let files = if path.is_dir() {
			list_files(path, CORPUS_EXTENSION)?
		} else {
			vec![path.to_path_buf()]
		};

		let mut pieces = Vec::with_capacity(files.len());
		for file in files {
			let text = read_text(&file)?;
			let piece = Piece::from_text(&get_filename(&file)?, &text, vocabulary);
			debug!("Loaded '{}' ({} measures)", piece.name, piece.measures.len());
			pieces.push(piece);
		}

		info!("Loaded {} piece(s) from {}", pieces.len(), path.display());
		Ok(Self { pieces })
	}

	pub fn pieces(&self) -> &[Piece] {
		&self.pieces
	}

	pub fn is_empty(&self) -> bool {
		self.pieces.is_empty()
	}

	/// Each piece as one continuous sequence (n-gram training).
	pub fn sequences(&self) -> impl Iterator<Item = Vec<Token>> + '_ {
		self.pieces.iter().map(Piece::notes)
	}

	/// Every measure of every piece (positional training).
	pub fn measures(&self) -> impl Iterator<Item = &[Token]> + '_ {
		self.pieces
			.iter()
			.flat_map(|piece| piece.measures.iter().map(Vec::as_slice))
	}
}
