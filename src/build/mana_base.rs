use crate::build::filters::passes_filters;
use crate::card::Card;
use crate::config::DeckConfig;
use crate::rng::DeckRng;
use log::debug;
use std::collections::HashSet;

/// Generically useful lands tried for every deck, in order
pub const UTILITY_LANDS: [&str; 6] = [
    "Command Tower",
    "Path of Ancestry",
    "Exotic Orchard",
    "Terramorphic Expanse",
    "Evolving Wilds",
    "Myriad Landscape",
];

/// A basic land matching one of the commander's colors, chosen uniformly.
/// Colorless commanders get Wastes.
pub fn basic_land_for(commander: &Card, rng: &mut DeckRng) -> Card {
    match rng.choose(&commander.color_identity) {
        Some(color) => Card::basic_land(color.basic_land_name()),
        None => Card::basic_land("Wastes"),
    }
}

/// Exactly `land_count` lands: eligible utility lands first, then basics.
///
/// `utility_lands` is whatever the caller could resolve from [`UTILITY_LANDS`];
/// non-lands, duplicates and off-identity cards are dropped here.
pub fn build_mana_base(
    config: &DeckConfig,
    commander: &Card,
    land_count: usize,
    utility_lands: &[Card],
    rng: &mut DeckRng,
) -> Vec<Card> {
    let mut seen = HashSet::new();
    let mut lands: Vec<Card> = utility_lands
        .iter()
        .filter(|c| c.is_land())
        .filter(|c| passes_filters(config, c, &commander.color_identity))
        .filter(|c| seen.insert(c.key()))
        .take(land_count)
        .cloned()
        .collect();
    debug!("Mana base: {} utility lands", lands.len());

    while lands.len() < land_count {
        lands.push(basic_land_for(commander, rng));
    }

    debug_assert_eq!(lands.len(), land_count, "basic land supply is unlimited");
    lands
}
