use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

use rand::Rng;
use rand::distr::Distribution as _;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::vocabulary::Token;

use super::state::TransitionCounts;

/// One possible next note and its probability.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Outcome {
	pub note: Token,
	pub probability: f64,
}

/// Normalized mapping from next note to probability.
///
/// # Invariants
/// - Probabilities are positive and sum to 1.0 (within float tolerance)
/// - Outcomes keep the order in which they were first observed, so that
///   a given random draw always maps to the same note
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(transparent)]
pub struct Distribution {
	outcomes: Vec<Outcome>,
}

impl Distribution {
	pub(crate) fn new(outcomes: Vec<Outcome>) -> Self {
		Self { outcomes }
	}

	pub fn outcomes(&self) -> &[Outcome] {
		&self.outcomes
	}

	pub fn len(&self) -> usize {
		self.outcomes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.outcomes.is_empty()
	}

	/// Probability of moving to `note`, if that transition was ever observed.
	pub fn probability(&self, note: &Token) -> Option<f64> {
		self.outcomes
			.iter()
			.find(|outcome| &outcome.note == note)
			.map(|outcome| outcome.probability)
	}

	/// Sum of all probabilities (1.0 for any trained distribution).
	pub fn total(&self) -> f64 {
		self.outcomes.iter().map(|outcome| outcome.probability).sum()
	}

	/// Picks the next note by weighted random choice.
	///
	/// # Errors
	/// Returns [`ModelError::Sampling`] if the distribution is empty or
	/// holds invalid weights (only possible for hand-edited model files).
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Token> {
		let weights = WeightedIndex::<f64>::new(self.outcomes.iter().map(|outcome| outcome.probability))
			.map_err(|e| ModelError::Sampling(e.to_string()))?;
		Ok(&self.outcomes[weights.sample(rng)].note)
	}
}

/// Everything recorded about one source state.
#[derive(Clone, Debug, PartialEq)]
pub struct StateStats {
	/// How many times the state was observed as a transition source.
	/// Reporting only, never used as a sampling weight.
	pub occurrences: usize,
	pub distribution: Distribution,
}

/// Immutable mapping from a state to its outgoing distribution.
///
/// States are kept in key order, which makes uniform choices among
/// states reproducible under a seeded random source.
///
/// Serialized as a list of typed records:
/// `{ "state": ..., "occurrences": 3, "transitions": [{ "note": "ミ", "probability": 1.0 }] }`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(bound(
	serialize = "K: Serialize",
	deserialize = "K: Deserialize<'de> + Ord"
))]
pub struct TransitionTable<K: Ord> {
	#[serde(with = "records")]
	entries: BTreeMap<K, StateStats>,
}

impl<K: Ord> Default for TransitionTable<K> {
	fn default() -> Self {
		Self { entries: BTreeMap::new() }
	}
}

impl<K: Ord> TransitionTable<K> {
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, state: &K) -> Option<&StateStats> {
		self.entries.get(state)
	}

	pub fn distribution(&self, state: &K) -> Option<&Distribution> {
		self.entries.get(state).map(|stats| &stats.distribution)
	}

	/// Number of times `state` was observed, 0 if never.
	pub fn occurrences(&self, state: &K) -> usize {
		self.entries.get(state).map_or(0, |stats| stats.occurrences)
	}

	/// Recorded states, in key order.
	pub fn states(&self) -> impl Iterator<Item = &K> + '_ {
		self.entries.keys()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&K, &StateStats)> + '_ {
		self.entries.iter()
	}

	/// States sorted by decreasing occurrence count, ties in key order.
	pub fn by_frequency(&self) -> Vec<(&K, &StateStats)> {
		let mut rows: Vec<(&K, &StateStats)> = self.entries.iter().collect();
		rows.sort_by(|a, b| b.1.occurrences.cmp(&a.1.occurrences));
		rows
	}

	/// Every note appearing as an outcome somewhere in the table.
	pub fn outcome_notes(&self) -> BTreeSet<&Token> {
		self.entries
			.values()
			.flat_map(|stats| stats.distribution.outcomes().iter().map(|outcome| &outcome.note))
			.collect()
	}
}

/// Accumulation phase of a transition table.
///
/// Owns raw counts while training is in progress; [`TransitionCounter::normalize`]
/// consumes it and produces the immutable [`TransitionTable`].
#[derive(Clone, Debug)]
pub(crate) struct TransitionCounter<K> {
	counts: HashMap<K, TransitionCounts>,
	pairs: usize,
}

impl<K> Default for TransitionCounter<K> {
	fn default() -> Self {
		Self { counts: HashMap::new(), pairs: 0 }
	}
}

impl<K: Eq + Hash + Ord> TransitionCounter<K> {
	/// Records one `state -> next` observation.
	pub(crate) fn record(&mut self, state: K, next: &Token) {
		self.counts.entry(state).or_default().add_transition(next);
		self.pairs += 1;
	}

	/// Number of pairs recorded so far.
	pub(crate) fn pairs(&self) -> usize {
		self.pairs
	}

	pub(crate) fn normalize(self) -> TransitionTable<K> {
		let entries = self
			.counts
			.into_iter()
			.map(|(state, counts)| {
				let stats = StateStats {
					occurrences: counts.total(),
					distribution: counts.normalize(),
				};
				(state, stats)
			})
			.collect();

		TransitionTable { entries }
	}
}

/// Serde adapter storing a `BTreeMap<K, StateStats>` as a list of records,
/// so that composite keys never have to be encoded as strings.
mod records {
	use std::collections::BTreeMap;

	use std::collections::btree_map::Entry;

	use serde::de::Error as _;
	use serde::{Deserialize, Deserializer, Serialize, Serializer};

	use super::{Distribution, StateStats};

	#[derive(Serialize)]
	struct RecordRef<'a, K> {
		state: &'a K,
		occurrences: usize,
		transitions: &'a Distribution,
	}

	#[derive(Deserialize)]
	struct Record<K> {
		state: K,
		occurrences: usize,
		transitions: Distribution,
	}

	pub(super) fn serialize<K, S>(entries: &BTreeMap<K, StateStats>, serializer: S) -> Result<S::Ok, S::Error>
	where
		K: Serialize,
		S: Serializer,
	{
		serializer.collect_seq(entries.iter().map(|(state, stats)| RecordRef {
			state,
			occurrences: stats.occurrences,
			transitions: &stats.distribution,
		}))
	}

	pub(super) fn deserialize<'de, K, D>(deserializer: D) -> Result<BTreeMap<K, StateStats>, D::Error>
	where
		K: Deserialize<'de> + Ord,
		D: Deserializer<'de>,
	{
		let records: Vec<Record<K>> = Vec::deserialize(deserializer)?;
		let mut entries = BTreeMap::new();
		for (index, record) in records.into_iter().enumerate() {
			let stats = StateStats {
				occurrences: record.occurrences,
				distribution: record.transitions,
			};
			match entries.entry(record.state) {
				Entry::Vacant(slot) => {
					slot.insert(stats);
				}
				Entry::Occupied(_) => {
					return Err(D::Error::custom(format!("duplicate state in record {index}")));
				}
			}
		}
		Ok(entries)
	}
}
