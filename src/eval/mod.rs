pub mod evaluator;
pub mod mana;
pub mod report;

pub use evaluator::{DeckEvaluation, DeckEvaluator, DeckSuggestion, Severity};
pub use mana::ManaColorStats;
pub use report::DeckReport;
