pub mod deck;
pub mod simulator;

pub use deck::{parse_commander_and_mainboard, parse_deck_file, parse_names, DeckError, ParsedDeck};
pub use simulator::{simulate, SimulationStats, DEFAULT_TRIALS};
