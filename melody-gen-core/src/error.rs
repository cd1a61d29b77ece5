use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors (and warning-level conditions) reported by model building,
/// generation and persistence.
#[derive(Debug, Error)]
pub enum ModelError {
	/// Generation was requested on a model without a single recorded state.
	#[error("the transition model is empty")]
	EmptyModel,

	/// The start-state predicate rejected every recorded state.
	#[error("no recorded state is a valid start state")]
	NoValidStartState,

	/// Training produced no usable pairs.
	///
	/// Builders report this as a warning next to the (empty) model,
	/// it is never returned as a hard failure.
	#[error("malformed input: {reason}")]
	MalformedInput {
		/// What made the input unusable.
		reason: String,
	},

	/// The n-gram window must hold at least one note.
	#[error("invalid n-gram order {order}: must be >= 1")]
	InvalidOrder {
		/// Requested window length.
		order: usize,
	},

	/// A length or measure count of zero was requested.
	#[error("invalid length for '{name}': must be >= 1")]
	InvalidLength {
		/// Name of the offending parameter.
		name: &'static str,
	},

	/// A custom start state does not match the model order.
	#[error("start state has {found} notes, model order is {expected}")]
	StartStateOrder {
		/// Model order.
		expected: usize,
		/// Width of the provided state.
		found: usize,
	},

	/// A stored model holds a state whose width differs from its order.
	#[error("model state has {found} notes, model order is {expected}")]
	StateWidth {
		/// Model order.
		expected: usize,
		/// Width of the offending state.
		found: usize,
	},

	/// The weighted sampler refused a distribution.
	#[error("sampling failed: {0}")]
	Sampling(String),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("binary model error: {0}")]
	Postcard(#[from] postcard::Error),
}
