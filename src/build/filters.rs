use crate::card::{Card, ManaColor};
use crate::config::DeckConfig;

const STAX_PHRASES: [&str; 8] = [
    "players can't",
    "can't cast",
    "can't search",
    "skip your",
    "skip their",
    "doesn't untap",
    "can't untap",
    "each player can't",
];

/// Pieces of well-known two-card infinite combos
const INFINITE_DENY_LIST: [&str; 6] = [
    "Isochron Scepter",
    "Dramatic Reversal",
    "Food Chain",
    "Thassa's Oracle",
    "Demonic Consultation",
    "Tainted Pact",
];

const STAPLE_ROCKS: [&str; 4] = ["Sol Ring", "Arcane Signet", "Fellwar Stone", "Mind Stone"];

const SIGNETS: [(ManaColor, ManaColor, &str); 10] = [
    (ManaColor::White, ManaColor::Blue, "Azorius Signet"),
    (ManaColor::Blue, ManaColor::Black, "Dimir Signet"),
    (ManaColor::Black, ManaColor::Red, "Rakdos Signet"),
    (ManaColor::Red, ManaColor::Green, "Gruul Signet"),
    (ManaColor::Green, ManaColor::White, "Selesnya Signet"),
    (ManaColor::White, ManaColor::Black, "Orzhov Signet"),
    (ManaColor::Blue, ManaColor::Red, "Izzet Signet"),
    (ManaColor::Black, ManaColor::Green, "Golgari Signet"),
    (ManaColor::Red, ManaColor::White, "Boros Signet"),
    (ManaColor::Green, ManaColor::Blue, "Simic Signet"),
];

fn contains_any(text: &str, needles: &[&str]) -> bool {
    let lower = text.to_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

pub fn is_stax(card: &Card) -> bool {
    contains_any(&card.oracle_text, &STAX_PHRASES)
}

pub fn is_infinite_piece(card: &Card) -> bool {
    INFINITE_DENY_LIST
        .iter()
        .any(|name| name.eq_ignore_ascii_case(&card.name))
}

/// Color identity containment plus the opt-in stax and combo exclusions
pub fn passes_filters(config: &DeckConfig, card: &Card, commander_identity: &[ManaColor]) -> bool {
    if !card.fits_identity(commander_identity) {
        return false;
    }
    if config.no_stax && is_stax(card) {
        return false;
    }
    if config.no_infinite && is_infinite_piece(card) {
        return false;
    }
    true
}

/// Same card as the commander, by case-insensitive name
pub fn is_commander_card(commander: &Card, candidate: &Card) -> bool {
    commander.same_name(candidate)
}

/// Mana rocks looked up by exact name for every build: the generic four plus
/// each Signet whose two colors are both in the identity.
pub fn staple_names(identity: &[ManaColor]) -> Vec<&'static str> {
    let mut names = STAPLE_ROCKS.to_vec();
    names.extend(
        SIGNETS
            .iter()
            .filter(|(a, b, _)| identity.contains(a) && identity.contains(b))
            .map(|(_, _, name)| *name),
    );
    names
}
