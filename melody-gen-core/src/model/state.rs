use crate::vocabulary::Token;

use super::table::{Distribution, Outcome};

/// Raw transition counts observed from one source state.
///
/// Conceptually, this is a node of the Markov chain being accumulated:
/// every outgoing edge is weighted by the number of times it was seen.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during training
/// - Track the total number of outgoing observations
/// - Produce the normalized [`Distribution`] once training is over
///
/// ## Invariants
/// - Each transition occurrence count is strictly positive
/// - `total` equals the sum of all transition counts
/// - Transitions keep the order in which they were first observed
#[derive(Clone, Debug, Default)]
pub(crate) struct TransitionCounts {
	/// Outgoing transitions with their occurrence count.
	/// Example: [("ミ", 42), ("ド", 3)]
	transitions: Vec<(Token, usize)>,
	/// Number of times the source state was observed.
	total: usize,
}

impl TransitionCounts {
	/// Records an occurrence of a transition toward `next`.
	///
	/// - If the transition already exists, its occurrence count is increased.
	/// - Otherwise, a new transition is appended with an initial count of 1.
	pub(crate) fn add_transition(&mut self, next: &Token) {
		match self.transitions.iter_mut().find(|(note, _)| note == next) {
			Some((_, occurrence)) => *occurrence += 1,
			None => self.transitions.push((next.clone(), 1)),
		}
		self.total += 1;
	}

	/// Number of times the source state was observed.
	pub(crate) fn total(&self) -> usize {
		self.total
	}

	/// Turns counts into probabilities: `count / total` for each outcome.
	///
	/// `total` is never zero here, a source only exists once a transition
	/// has been recorded from it.
	pub(crate) fn normalize(&self) -> Distribution {
		debug_assert_eq!(self.total, self.transitions.iter().map(|(_, c)| c).sum::<usize>());

		let total = self.total as f64;
		Distribution::new(
			self.transitions
				.iter()
				.map(|(note, count)| Outcome {
					note: note.clone(),
					probability: *count as f64 / total,
				})
				.collect(),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counts_keep_first_seen_order() {
		let mut counts = TransitionCounts::default();
		counts.add_transition(&Token::from("ミ"));
		counts.add_transition(&Token::from("ド"));
		counts.add_transition(&Token::from("ミ"));

		assert_eq!(counts.total(), 3);
		let distribution = counts.normalize();
		let notes: Vec<&str> = distribution.outcomes().iter().map(|o| o.note.as_str()).collect();
		assert_eq!(notes, vec!["ミ", "ド"]);
		assert!((distribution.probability(&Token::from("ミ")).unwrap_or(0.0) - 2.0 / 3.0).abs() < 1e-12);
	}
}
