use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::warn;
use rand::SeedableRng;
use rand::rngs::StdRng;

use melody_gen_core::config::{DEFAULT_LENGTH, DEFAULT_MEASURES, DEFAULT_NOTES_PER_MEASURE, DEFAULT_ORDER};
use melody_gen_core::corpus::Corpus;
use melody_gen_core::model::generation_input::{DeadEndPolicy, GenerationInput, Opening, StartFilter, StartState};
use melody_gen_core::model::generator::{NgramGenerator, PositionalGenerator};
use melody_gen_core::model::melody::render_measures;
use melody_gen_core::model::ngram_model::{NgramBuilder, NgramState};
use melody_gen_core::model::positional_model::PositionalBuilder;
use melody_gen_core::persist::{SavedModel, default_model_path, load_model, save_melody, save_model};
use melody_gen_core::report::render_model;
use melody_gen_core::vocabulary::{Token, Vocabulary};

#[derive(Parser)]
#[command(name = "melody-gen", version, about = "Learn note transitions from melodies and generate new ones")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a transition model from a corpus file or directory of .txt files
    Train(TrainArgs),
    /// Generate a melody from a saved model
    Generate(GenerateArgs),
    /// Print the transition table of a saved model
    Inspect(InspectArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Corpus file, or directory whose .txt files are one melody each
    corpus: PathBuf,

    /// Number of notes in an n-gram state
    #[arg(short = 'n', long, default_value_t = DEFAULT_ORDER)]
    order: usize,

    /// Build the start/middle/end model instead of an n-gram model
    #[arg(long, conflicts_with = "by_measure")]
    positional: bool,

    /// Train the n-gram model line by line instead of on whole files
    #[arg(long)]
    by_measure: bool,

    /// Output model (.json, anything else is binary). Defaults to <corpus>.json
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct GenerateArgs {
    /// Model written by `train`
    model: PathBuf,

    /// Number of notes (n-gram models)
    #[arg(short, long, default_value_t = DEFAULT_LENGTH)]
    length: usize,

    /// Number of measures (positional models)
    #[arg(short, long, default_value_t = DEFAULT_MEASURES)]
    measures: usize,

    /// Notes per measure, also the line width of the output
    #[arg(short = 'p', long, default_value_t = DEFAULT_NOTES_PER_MEASURE)]
    notes_per_measure: usize,

    /// Seed for reproducible output
    #[arg(short, long)]
    seed: Option<u64>,

    /// Start state for n-gram models, e.g. "ドレミ"
    #[arg(long)]
    start: Option<String>,

    /// Allow states with sharps or flats as start states
    #[arg(long)]
    any_start: bool,

    /// What to do when the walk reaches a state without transitions
    #[arg(long, value_enum, default_value_t = DeadEnd::Restart)]
    dead_end: DeadEnd,

    /// Fixed first note of every measure (positional models)
    #[arg(long)]
    opening: Option<String>,

    /// Write the melody to this file as well
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct InspectArgs {
    /// Model written by `train`
    model: PathBuf,

    /// Show only the most frequent states
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum DeadEnd {
    Restart,
    Stop,
}

impl From<DeadEnd> for DeadEndPolicy {
    fn from(value: DeadEnd) -> Self {
        match value {
            DeadEnd::Restart => DeadEndPolicy::Restart,
            DeadEnd::Stop => DeadEndPolicy::Stop,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let vocabulary = Vocabulary::default();
    match Cli::parse().command {
        Command::Train(args) => train(args, &vocabulary),
        Command::Generate(args) => generate(args, vocabulary),
        Command::Inspect(args) => inspect(args, &vocabulary),
    }
}

fn train(args: TrainArgs, vocabulary: &Vocabulary) -> anyhow::Result<()> {
    let corpus = Corpus::load(&args.corpus, vocabulary)
        .with_context(|| format!("failed to read corpus {}", args.corpus.display()))?;
    if corpus.is_empty() {
        warn!("No .txt file found in {}", args.corpus.display());
    }

    let (model, pairs): (SavedModel, usize) = if args.positional {
        let mut builder = PositionalBuilder::new();
        builder.add_corpus(&corpus);
        let trained = builder.build();
        (trained.model.into(), trained.pairs)
    } else {
        let mut builder = NgramBuilder::new(args.order)?;
        if args.by_measure {
            builder.add_measures(&corpus);
        } else {
            builder.add_corpus(&corpus);
        }
        let trained = builder.build();
        (trained.model.into(), trained.pairs)
    };

    let out = match args.out {
        Some(path) => path,
        None => default_model_path(&args.corpus)?,
    };
    save_model(&model, &out).with_context(|| format!("failed to write model {}", out.display()))?;
    println!("{} training pairs, model written to {}", pairs, out.display());

    Ok(())
}

fn generate(args: GenerateArgs, vocabulary: Vocabulary) -> anyhow::Result<()> {
    let model = load_model(&args.model).with_context(|| format!("failed to load model {}", args.model.display()))?;

    let mut input = GenerationInput::with_vocabulary(vocabulary);
    input.dead_end = args.dead_end.into();
    if args.any_start {
        input.start_filter = StartFilter::Any;
    }
    if let Some(start) = &args.start {
        input.start = StartState::Custom(NgramState::new(input.vocabulary.tokenize(start)));
    }
    if let Some(opening) = &args.opening {
        match input.vocabulary.tokenize(opening).as_slice() {
            [note] => input.opening = Opening::Fixed(Token::clone(note)),
            _ => bail!("--opening must be exactly one note, got '{opening}'"),
        }
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let measures = match &model {
        SavedModel::Ngram(model) => {
            let melody = NgramGenerator::new(model, &input).generate(args.length, &mut rng)?;
            melody.measures(args.notes_per_measure)
        }
        SavedModel::Positional(model) => {
            PositionalGenerator::new(model, &input).generate(args.measures, args.notes_per_measure, &mut rng)?
        }
    };

    print!("{}", render_measures(&measures));
    if let Some(out) = &args.out {
        save_melody(&measures, out).with_context(|| format!("failed to write melody {}", out.display()))?;
    }

    Ok(())
}

fn inspect(args: InspectArgs, vocabulary: &Vocabulary) -> anyhow::Result<()> {
    let model = load_model(&args.model).with_context(|| format!("failed to load model {}", args.model.display()))?;
    print!("{}", render_model(&model, vocabulary, args.limit));
    Ok(())
}
