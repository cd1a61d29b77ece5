//! Default parameters shared by the library and the command line.

/// Default n-gram window (three notes of context).
pub const DEFAULT_ORDER: usize = 3;

/// Default number of notes produced by the n-gram generator.
pub const DEFAULT_LENGTH: usize = 50;

/// Default number of measures for measure-shaped generation.
pub const DEFAULT_MEASURES: usize = 8;

/// Default number of notes per generated measure.
pub const DEFAULT_NOTES_PER_MEASURE: usize = 4;

/// Extension of corpus files picked up when training from a directory.
pub const CORPUS_EXTENSION: &str = "txt";

/// Extension selecting the JSON model format. Anything else is binary.
pub const JSON_EXTENSION: &str = "json";

/// Base notes of the default vocabulary, in scale order.
pub const BASE_NOTES: [&str; 7] = ["ド", "レ", "ミ", "ファ", "ソ", "ラ", "シ"];

/// Modifier prefixes of the default vocabulary (sharp, flat).
pub const MODIFIERS: [&str; 2] = ["＃", "♭"];
