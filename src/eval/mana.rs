use crate::card::{Card, ManaColor};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static COLORED_SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([WUBRG])\}").expect("valid regex"));

/// Sources below this count trigger a mana suggestion for a color with demand
pub const MIN_SOURCES_PER_COLOR: usize = 10;

/// Per-color mana sources and demand, approximated from oracle text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaColorStats {
    pub sources: BTreeMap<ManaColor, usize>,
    pub demand: BTreeMap<ManaColor, usize>,
}

impl ManaColorStats {
    /// Demand counts every colored `{C}` symbol in a card's text. A card is a
    /// source of each color whose symbol appears in text that says "add".
    pub fn analyze(cards: &[Card]) -> Self {
        let mut sources: BTreeMap<ManaColor, usize> =
            ManaColor::ALL.iter().map(|c| (*c, 0)).collect();
        let mut demand = sources.clone();

        for card in cards {
            let text = &card.oracle_text;
            for caps in COLORED_SYMBOL.captures_iter(text) {
                if let Some(color) = ManaColor::from_symbol(&caps[1]) {
                    *demand.entry(color).or_insert(0) += 1;
                }
            }

            if !text.to_lowercase().contains("add") {
                continue;
            }
            for color in ManaColor::ALL {
                if text.contains(&format!("{{{}}}", color.to_char())) {
                    *sources.entry(color).or_insert(0) += 1;
                }
            }
        }

        ManaColorStats { sources, demand }
    }

    pub fn sources_of(&self, color: ManaColor) -> usize {
        self.sources.get(&color).copied().unwrap_or(0)
    }

    pub fn demand_for(&self, color: ManaColor) -> usize {
        self.demand.get(&color).copied().unwrap_or(0)
    }

    /// Colors with some demand but fewer than [`MIN_SOURCES_PER_COLOR`] sources
    pub fn underserved(&self) -> Vec<ManaColor> {
        ManaColor::ALL
            .into_iter()
            .filter(|c| self.demand_for(*c) > 0 && self.sources_of(*c) < MIN_SOURCES_PER_COLOR)
            .collect()
    }
}

pub fn color_name(color: ManaColor) -> &'static str {
    match color {
        ManaColor::White => "White",
        ManaColor::Blue => "Blue",
        ManaColor::Black => "Black",
        ManaColor::Red => "Red",
        ManaColor::Green => "Green",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str, type_line: &str, text: &str) -> Card {
        let mut c = Card::basic_land(name);
        c.type_line = type_line.to_string();
        c.oracle_text = text.to_string();
        c
    }

    #[test]
    fn test_sources_and_demand() {
        let cards = vec![
            card("Forest", "Basic Land — Forest", "({T}: Add {G}.)"),
            card("Forest", "Basic Land — Forest", "({T}: Add {G}.)"),
            card("Birds", "Creature — Bird", "Flying\n{T}: Add {W}, {U}, {B}, {R}, or {G}."),
            card("Pump", "Instant", "{G}{G}: Target creature gets +2/+2."),
        ];
        let stats = ManaColorStats::analyze(&cards);

        assert_eq!(stats.sources_of(ManaColor::Green), 3);
        assert_eq!(stats.sources_of(ManaColor::White), 1);
        // Symbols in "Add" text count as demand too
        assert_eq!(stats.demand_for(ManaColor::Green), 5);
        assert_eq!(stats.demand_for(ManaColor::Red), 1);
    }

    #[test]
    fn test_underserved_colors() {
        let cards = vec![card("Bolt", "Instant", "{R}: deal 1 damage.")];
        let stats = ManaColorStats::analyze(&cards);
        assert_eq!(stats.underserved(), vec![ManaColor::Red]);

        let empty = ManaColorStats::analyze(&[]);
        assert!(empty.underserved().is_empty());
        assert_eq!(empty.sources.len(), 5);
    }
}
