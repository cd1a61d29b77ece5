use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::JSON_EXTENSION;
use crate::error::Result;
use crate::io::{build_output_path, has_extension, read_text};
use crate::model::melody::{Melody, render_measures};
use crate::model::ngram_model::NgramModel;
use crate::model::positional_model::PositionalModel;

/// A model as stored on disk, tagged with its kind.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SavedModel {
	Ngram(NgramModel),
	Positional(PositionalModel),
}

impl From<NgramModel> for SavedModel {
	fn from(model: NgramModel) -> Self {
		SavedModel::Ngram(model)
	}
}

impl From<PositionalModel> for SavedModel {
	fn from(model: PositionalModel) -> Self {
		SavedModel::Positional(model)
	}
}

/// Writes a model to `path`.
///
/// - `.json` files are pretty-printed JSON, notes kept as UTF-8.
/// - Any other extension gets the compact `postcard` binary encoding.
///
/// Both formats reload to bit-identical probabilities.
pub fn save_model<P: AsRef<Path>>(model: &SavedModel, path: P) -> Result<()> {
	let path = path.as_ref();
	if has_extension(path, JSON_EXTENSION) {
		fs::write(path, serde_json::to_string_pretty(model)?)?;
	} else {
		fs::write(path, postcard::to_stdvec(model)?)?;
	}
	info!("Saved model to {}", path.display());
	Ok(())
}

/// Reads a model written by [`save_model`]. The format follows the extension.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<SavedModel> {
	let path = path.as_ref();
	let model = if has_extension(path, JSON_EXTENSION) {
		serde_json::from_str(&read_text(path)?)?
	} else {
		postcard::from_bytes(&fs::read(path)?)?
	};
	info!("Loaded model from {}", path.display());
	Ok(model)
}

/// Writes measures as text, space separated, one measure per line.
pub fn save_melody<P: AsRef<Path>>(measures: &[Melody], path: P) -> Result<()> {
	fs::write(path.as_ref(), render_measures(measures))?;
	info!("Saved melody to {}", path.as_ref().display());
	Ok(())
}

/// Model path used when none is given: the corpus path with a `.json` extension.
///
/// Example: `children_songs/` → `children_songs.json`
pub fn default_model_path<P: AsRef<Path>>(corpus: P) -> Result<PathBuf> {
	Ok(build_output_path(corpus, JSON_EXTENSION)?)
}
