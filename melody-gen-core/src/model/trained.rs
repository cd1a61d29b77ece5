use crate::error::ModelError;

/// Result of a build: the model plus any warning-level conditions.
///
/// Builders never fail on sparse input, they degrade to smaller (or empty)
/// tables and report why here.
#[derive(Debug)]
pub struct Trained<M> {
	pub model: M,
	/// Number of training pairs that went into the model.
	pub pairs: usize,
	/// Warning-level conditions such as [`ModelError::MalformedInput`].
	pub warnings: Vec<ModelError>,
}
