//! Validates random walks, start selection and dead-end handling

use melody_gen_core::ModelError;
use melody_gen_core::model::generation_input::{DeadEndPolicy, GenerationInput, Opening, StartFilter, StartState};
use melody_gen_core::model::generator::{NgramGenerator, PositionalGenerator};
use melody_gen_core::model::ngram_model::{NgramBuilder, NgramModel, NgramState};
use melody_gen_core::model::positional_model::{PositionalBuilder, PositionalModel};
use melody_gen_core::vocabulary::{Token, Vocabulary};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Random source replaying fixed values, then zeros.
///
/// A zero draw always selects the first listed outcome, `u64::MAX` the last.
struct ScriptedRng {
	values: Vec<u64>,
	next: usize,
}

impl ScriptedRng {
	fn new(values: &[u64]) -> Self {
		Self { values: values.to_vec(), next: 0 }
	}

	fn zeros() -> Self {
		Self::new(&[])
	}
}

impl RngCore for ScriptedRng {
	fn next_u32(&mut self) -> u32 {
		(self.next_u64() >> 32) as u32
	}

	fn next_u64(&mut self) -> u64 {
		let value = self.values.get(self.next).copied().unwrap_or(0);
		self.next += 1;
		value
	}

	fn fill_bytes(&mut self, dst: &mut [u8]) {
		dst.fill(0);
	}
}

fn ngram(order: usize, sequences: &[&str]) -> NgramModel {
	let vocabulary = Vocabulary::default();
	let mut builder = NgramBuilder::new(order).unwrap();
	for sequence in sequences {
		builder.add_sequence(&vocabulary.tokenize(sequence));
	}
	builder.build().model
}

fn positional(measures: &[&str]) -> PositionalModel {
	let vocabulary = Vocabulary::default();
	let mut builder = PositionalBuilder::new();
	for measure in measures {
		builder.add_measure(&vocabulary.tokenize(measure));
	}
	builder.build().model
}

fn notes(tokens: &[Token]) -> Vec<&str> {
	tokens.iter().map(Token::as_str).collect()
}

#[test]
fn test_forced_start_walk_with_dead_end_restart() {
	let model = ngram(1, &["ドドミ", "ドミソ"]);
	let input = GenerationInput {
		start: StartState::Custom(NgramState::from_notes(&["ド"])),
		..GenerationInput::default()
	};
	let generator = NgramGenerator::new(&model, &input);

	// ド -> ド (first), ド -> ミ (last), ミ -> ソ, then ソ is a dead end and
	// the restart picks the first base-note state
	let mut rng = ScriptedRng::new(&[0, u64::MAX, 0, 0]);
	let melody = generator.generate(5, &mut rng).unwrap();
	assert_eq!(notes(melody.notes()), vec!["ド", "ド", "ミ", "ソ", "ド"]);
}

#[test]
fn test_always_first_outcome() {
	let model = ngram(1, &["ドドミ", "ドミソ"]);
	let input = GenerationInput {
		start: StartState::Custom(NgramState::from_notes(&["ド"])),
		..GenerationInput::default()
	};
	let melody = NgramGenerator::new(&model, &input).generate(4, &mut ScriptedRng::zeros()).unwrap();
	assert_eq!(notes(melody.notes()), vec!["ド", "ド", "ド", "ド"]);
}

#[test]
fn test_exact_length_and_membership() {
	let model = ngram(2, &["ドレミファソラシド", "ドシラソファミレド", "ミミファソソファミレ"]);
	let input = GenerationInput::default();
	let generator = NgramGenerator::new(&model, &input);
	let vocabulary = Vocabulary::default();

	let mut rng = StdRng::seed_from_u64(11);
	for length in [1, 2, 3, 17, 64] {
		let melody = generator.generate(length, &mut rng).unwrap();
		assert_eq!(melody.len(), length);
		assert!(melody.notes().iter().all(|note| vocabulary.is_base(note)));
	}
}

#[test]
fn test_same_seed_same_melody() {
	let model = ngram(2, &["ドレミドレミソミレドレミレ", "ソソラソミソドドレミ"]);
	let input = GenerationInput::default();
	let generator = NgramGenerator::new(&model, &input);

	let first = generator.generate(40, &mut StdRng::seed_from_u64(2024)).unwrap();
	let second = generator.generate(40, &mut StdRng::seed_from_u64(2024)).unwrap();
	assert_eq!(first, second);

	let positional = positional(&["ドレミファ", "ミレドレ", "ソミレド"]);
	let generator = PositionalGenerator::new(&positional, &input);
	let first = generator.generate(8, 4, &mut StdRng::seed_from_u64(5)).unwrap();
	let second = generator.generate(8, 4, &mut StdRng::seed_from_u64(5)).unwrap();
	assert_eq!(first, second);
}

#[test]
fn test_restart_overshoot_is_truncated() {
	// Only (ド,レ) has a transition: the walk dead-ends on (レ,ミ) and
	// appends a full two-note state
	let model = ngram(2, &["ドレミ"]);
	let input = GenerationInput::default();
	let melody = NgramGenerator::new(&model, &input).generate(4, &mut StdRng::seed_from_u64(0)).unwrap();
	assert_eq!(notes(melody.notes()), vec!["ド", "レ", "ミ", "ド"]);
}

#[test]
fn test_stop_policy_ends_early() {
	let model = ngram(1, &["ドレミ"]);
	let input = GenerationInput {
		start: StartState::Custom(NgramState::from_notes(&["ド"])),
		dead_end: DeadEndPolicy::Stop,
		..GenerationInput::default()
	};
	let melody = NgramGenerator::new(&model, &input).generate(10, &mut StdRng::seed_from_u64(0)).unwrap();
	assert_eq!(notes(melody.notes()), vec!["ド", "レ", "ミ"]);
}

#[test]
fn test_no_valid_start_state() {
	let model = ngram(1, &["＃ド＃レ＃ミ"]);
	let input = GenerationInput::default();
	let result = NgramGenerator::new(&model, &input).generate(5, &mut StdRng::seed_from_u64(0));
	assert!(matches!(result, Err(ModelError::NoValidStartState)));

	let input = GenerationInput { start_filter: StartFilter::Any, ..GenerationInput::default() };
	let melody = NgramGenerator::new(&model, &input).generate(5, &mut StdRng::seed_from_u64(0)).unwrap();
	assert_eq!(melody.len(), 5);
}

#[test]
fn test_empty_model_is_reported() {
	let model = ngram(3, &["ドレ"]);
	let input = GenerationInput::default();
	let result = NgramGenerator::new(&model, &input).generate(5, &mut StdRng::seed_from_u64(0));
	assert!(matches!(result, Err(ModelError::EmptyModel)));

	let model = positional(&["ド"]);
	let result = PositionalGenerator::new(&model, &input).generate(2, 4, &mut StdRng::seed_from_u64(0));
	assert!(matches!(result, Err(ModelError::EmptyModel)));
}

#[test]
fn test_invalid_requests() {
	let model = ngram(2, &["ドレミファ"]);
	let input = GenerationInput {
		start: StartState::Custom(NgramState::from_notes(&["ド"])),
		..GenerationInput::default()
	};
	let generator = NgramGenerator::new(&model, &input);
	let mut rng = StdRng::seed_from_u64(0);

	assert!(matches!(generator.generate(0, &mut rng), Err(ModelError::InvalidLength { .. })));
	assert!(matches!(
		generator.generate(4, &mut rng),
		Err(ModelError::StartStateOrder { expected: 2, found: 1 })
	));
	assert!(matches!(generator.generate_measures(0, 4, &mut rng), Err(ModelError::InvalidLength { name: "measures" })));
}

#[test]
fn test_ngram_measures() {
	let model = ngram(1, &["ドレミファソラシド"]);
	let input = GenerationInput::default();
	let measures = NgramGenerator::new(&model, &input)
		.generate_measures(3, 4, &mut StdRng::seed_from_u64(9))
		.unwrap();
	assert_eq!(measures.len(), 3);
	assert!(measures.iter().all(|measure| measure.len() == 4));
}

#[test]
fn test_positional_walk_with_fallbacks() {
	let model = positional(&["ドレミファ"]);
	let input = GenerationInput::default();
	let generator = PositionalGenerator::new(&model, &input);

	// Opens on レ (only middle source), レ -> ミ, ミ has no middle transition
	// and ド has no end transition: both fall back to the first known note
	let measures = generator.generate(2, 4, &mut ScriptedRng::zeros()).unwrap();
	assert_eq!(measures.len(), 2);
	for measure in &measures {
		assert_eq!(notes(measure.notes()), vec!["レ", "ミ", "ド", "ド"]);
	}
}

#[test]
fn test_positional_fixed_opening_and_short_measures() {
	let model = positional(&["ドレミファ"]);
	let input = GenerationInput { opening: Opening::Fixed(Token::from("ミ")), ..GenerationInput::default() };
	let generator = PositionalGenerator::new(&model, &input);
	let mut rng = StdRng::seed_from_u64(1);

	let measures = generator.generate(1, 2, &mut rng).unwrap();
	assert_eq!(notes(measures[0].notes()), vec!["ミ", "ファ"]);

	let measures = generator.generate(3, 1, &mut rng).unwrap();
	assert!(measures.iter().all(|measure| notes(measure.notes()) == vec!["ミ"]));
}

#[test]
fn test_positional_without_middle_table() {
	// Two-note measures never feed the middle table
	let model = positional(&["ドレ", "ミファ"]);
	let input = GenerationInput::default();
	let measures = PositionalGenerator::new(&model, &input)
		.generate(4, 3, &mut StdRng::seed_from_u64(3))
		.unwrap();
	assert!(measures.iter().all(|measure| measure.len() == 3));
}
