//! Text dump of transition tables.
//!
//! Rows are states sorted by how often they were observed, columns are next
//! notes sorted in scale order. Nothing here writes to the model.

use std::fmt::{Display, Write};

use crate::model::positional_model::Position;
use crate::model::table::{Outcome, TransitionTable};
use crate::persist::SavedModel;
use crate::vocabulary::Vocabulary;

/// Renders one table.
///
/// ```text
/// ド,レ (12)
///   ミ: 0.50
///   ソ: 0.50
/// ```
///
/// `limit` caps the number of states shown (most frequent first).
pub fn render_table<K: Ord + Display>(
	table: &TransitionTable<K>,
	vocabulary: &Vocabulary,
	limit: Option<usize>,
) -> String {
	let mut text = String::new();
	let rows = table.by_frequency();
	let shown = limit.unwrap_or(rows.len()).min(rows.len());

	for (state, stats) in rows.into_iter().take(shown) {
		let _ = writeln!(text, "{state} ({})", stats.occurrences);

		let mut outcomes: Vec<&Outcome> = stats.distribution.outcomes().iter().collect();
		outcomes.sort_by_key(|outcome| vocabulary.rank(&outcome.note));
		for outcome in outcomes {
			let _ = writeln!(text, "  {}: {:.2}", outcome.note, outcome.probability);
		}
	}

	if shown < table.len() {
		let _ = writeln!(text, "... {} more state(s)", table.len() - shown);
	}
	text
}

/// Renders a whole saved model with a summary header.
pub fn render_model(model: &SavedModel, vocabulary: &Vocabulary, limit: Option<usize>) -> String {
	match model {
		SavedModel::Ngram(model) => {
			let mut text = format!("{}-gram model, {} state(s)\n", model.order(), model.table().len());
			text.push_str(&render_table(model.table(), vocabulary, limit));
			text
		}
		SavedModel::Positional(model) => {
			let mut text = String::from("positional model\n");
			for position in Position::ALL {
				let table = model.table(position);
				let _ = writeln!(text, "[{position}] {} state(s)", table.len());
				text.push_str(&render_table(table, vocabulary, limit));
			}
			text
		}
	}
}
