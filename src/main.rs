use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};
use mtg_commander::build::{DeckBuilder, PowerLevel};
use mtg_commander::card::CardDatabase;
use mtg_commander::config::{DeckConfig, DEFAULT_MAX_CANDIDATES};
use mtg_commander::eval::DeckEvaluator;
use mtg_commander::output::{
    write_build_report, write_card_roles, write_category_cards, write_deck_json,
    write_deck_list, write_eval_json, write_eval_report,
};
use mtg_commander::rng::DEFAULT_SEED;
use mtg_commander::simulation::{
    parse_commander_and_mainboard, parse_deck_file, DeckError, ParsedDeck, DEFAULT_TRIALS,
};
use std::io::Read;
use std::path::Path;
use std::process;
use std::time::Duration;

/// Runtime failure: unreadable files, bad card data
const EXIT_FAILURE: i32 = 1;
/// Bad input from the user
const EXIT_USAGE: i32 = 2;

#[derive(Parser)]
#[command(name = "mtg-commander")]
#[command(about = "Commander deck builder and evaluator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Options shared by both subcommands
#[derive(Args)]
struct CommonArgs {
    /// Card data file (JSON array of Scryfall-style records)
    #[arg(long, default_value = "cards.json")]
    cards: String,

    /// Comma-separated themes, e.g. "lifegain,tokens"
    #[arg(long, default_value = "")]
    theme: String,

    /// Power band: precon, upgraded, optimized, cedh-adjacent
    #[arg(long, default_value = "upgraded")]
    power: String,

    /// Seed for reproducibility (0 means the default)
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Write the text result to this file
    #[arg(long)]
    output: Option<String>,

    /// Write the JSON result to this file
    #[arg(long)]
    output_json: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a 99-card deck around a commander
    Build {
        /// Commander card name
        #[arg(long)]
        commander: String,

        /// Budget in USD; also enables price estimates
        #[arg(long)]
        budget: Option<f64>,

        /// Exclude cards with stax-like text
        #[arg(long)]
        no_stax: bool,

        /// Exclude known two-card infinite combo pieces
        #[arg(long)]
        no_infinite: bool,

        /// Do not trim tutors to the power band's soft cap
        #[arg(long)]
        allow_tutors: bool,

        /// Candidate pool size (200-2500)
        #[arg(long, default_value_t = DEFAULT_MAX_CANDIDATES)]
        max_candidates: usize,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Evaluate an existing deck list
    #[command(alias = "evaluate")]
    Eval {
        /// Deck list file; read from stdin when omitted
        #[arg(long)]
        deck: Option<String>,

        /// Commander card name; required unless the list has exactly 100 cards
        #[arg(long)]
        commander: Option<String>,

        /// Number of simulated shuffles
        #[arg(long, default_value_t = DEFAULT_TRIALS)]
        trials: usize,

        /// List the cards behind each category count
        #[arg(long)]
        show_cards: bool,

        /// Like --show-cards, limited to these buckets (e.g. "draw_engines,wincons")
        #[arg(long)]
        show_cards_for: Option<String>,

        /// List the roles tagged on each card
        #[arg(long)]
        show_card_roles: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    simple_logging::log_to_stderr(level);
}

fn load_database(path: &str) -> CardDatabase {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Loading card data from {}", path));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let loaded = CardDatabase::from_file(path).and_then(|db| db.validate().map(|_| db));
    spinner.finish_and_clear();

    match loaded {
        Ok(db) => {
            eprintln!("✓ Loaded {} cards from {}", db.card_count(), path);
            db
        }
        Err(e) => {
            eprintln!("✗ Failed to load cards: {}", e);
            process::exit(EXIT_FAILURE);
        }
    }
}

fn base_config(common: &CommonArgs) -> DeckConfig {
    DeckConfig {
        power: PowerLevel::parse(&common.power),
        seed: common.seed,
        ..DeckConfig::default()
    }
    .with_themes_csv(&common.theme)
}

fn write_file(path: &str, contents: &str) {
    if let Err(e) = std::fs::write(Path::new(path), contents) {
        eprintln!("✗ Failed to write {}: {}", path, e);
        process::exit(EXIT_FAILURE);
    }
    eprintln!("✓ Wrote {}", path);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build {
            commander,
            budget,
            no_stax,
            no_infinite,
            allow_tutors,
            max_candidates,
            common,
        } => {
            let config = DeckConfig {
                budget_usd: budget,
                no_stax,
                no_infinite,
                allow_tutors,
                max_candidates,
                ..base_config(&common)
            }
            .normalized();
            run_build(&commander, config, &common);
        }
        Commands::Eval {
            deck,
            commander,
            trials,
            show_cards,
            show_cards_for,
            show_card_roles,
            common,
        } => {
            let config = base_config(&common).normalized();
            let sections = EvalSections {
                show_cards: show_cards || show_cards_for.is_some(),
                buckets: show_cards_for
                    .map(|csv| csv.split(',').map(str::to_string).collect())
                    .unwrap_or_default(),
                show_card_roles,
            };
            run_eval(deck.as_deref(), commander.as_deref(), trials, config, &common, &sections);
        }
    }
}

fn run_build(commander: &str, config: DeckConfig, common: &CommonArgs) {
    let commander = commander.trim();
    if commander.is_empty() {
        eprintln!("✗ --commander must not be empty");
        process::exit(EXIT_USAGE);
    }

    let db = load_database(&common.cards);
    let start = std::time::Instant::now();
    let result = match DeckBuilder::new(&db, config).build(commander) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("✗ Failed to build deck for '{}': {}", commander, e);
            process::exit(EXIT_USAGE);
        }
    };
    info!("Build finished in {:.2?}", start.elapsed());

    let now = Utc::now();
    println!("{}", write_build_report(&result));

    let list = write_deck_list(&result, now);
    match &common.output {
        Some(path) => write_file(path, &list),
        None => {
            println!();
            print!("{}", list);
        }
    }

    if let Some(path) = &common.output_json {
        match write_deck_json(&result, now) {
            Ok(json) => write_file(path, &json),
            Err(e) => {
                eprintln!("✗ Failed to serialize deck: {}", e);
                process::exit(EXIT_FAILURE);
            }
        }
    }
}

struct EvalSections {
    show_cards: bool,
    buckets: Vec<String>,
    show_card_roles: bool,
}

/// Parse the deck list from `path`, or from `input` when no path was given
fn read_deck_list<R: Read>(
    path: Option<&str>,
    mut input: R,
    commander: Option<&str>,
) -> Result<ParsedDeck, DeckError> {
    match path {
        Some(path) => parse_deck_file(path, commander),
        None => {
            let mut text = String::new();
            input.read_to_string(&mut text)?;
            parse_commander_and_mainboard(&text, commander)
        }
    }
}

fn run_eval(
    deck_file: Option<&str>,
    commander: Option<&str>,
    trials: usize,
    config: DeckConfig,
    common: &CommonArgs,
    sections: &EvalSections,
) {
    let source = deck_file.unwrap_or("<stdin>");
    let parsed = match read_deck_list(deck_file, std::io::stdin().lock(), commander) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("✗ Failed to parse deck list '{}': {}", source, e);
            process::exit(EXIT_FAILURE);
        }
    };
    if parsed.commander.is_empty() {
        eprintln!(
            "✗ Could not tell which card is the commander ({} cards listed). Pass --commander.",
            parsed.mainboard.len()
        );
        process::exit(EXIT_USAGE);
    }

    let db = load_database(&common.cards);
    if let Err(e) = db.get_record(&parsed.commander) {
        eprintln!("✗ Unknown commander: {}", e);
        process::exit(EXIT_USAGE);
    }

    let evaluator = DeckEvaluator::new(config).with_trials(trials);
    let evaluation = match evaluator.evaluate_parsed(&db, &parsed) {
        Ok(evaluation) => evaluation,
        Err(e) => {
            eprintln!("✗ Failed to evaluate deck: {}", e);
            process::exit(EXIT_FAILURE);
        }
    };

    let mut text = write_eval_report(&evaluation);
    if sections.show_cards {
        text.push_str("\n\n");
        text.push_str(&write_category_cards(&evaluation, &sections.buckets));
    }
    if sections.show_card_roles {
        text.push_str("\n\n");
        text.push_str(&write_card_roles(&evaluation));
    }
    println!("{}", text);

    if let Some(path) = &common.output {
        write_file(path, &(text + "\n"));
    }
    if let Some(path) = &common.output_json {
        match write_eval_json(&evaluation, Utc::now()) {
            Ok(json) => write_file(path, &json),
            Err(e) => {
                eprintln!("✗ Failed to serialize evaluation: {}", e);
                process::exit(EXIT_FAILURE);
            }
        }
    }
}
