use crate::card::types::{parse_color_identity, Card};
use crate::tags::{classify, classify_themes};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One face of a multi-faced card
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardFace {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardPrices {
    #[serde(default)]
    pub usd: Option<String>,
}

/// Card record as delivered by the card-data provider (Scryfall field names)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub cmc: f64,
    #[serde(default)]
    pub color_identity: Vec<String>,
    #[serde(default)]
    pub legalities: HashMap<String, String>,
    #[serde(default)]
    pub prices: Option<CardPrices>,
    #[serde(default)]
    pub card_faces: Option<Vec<CardFace>>,
}

impl CardRecord {
    /// Oracle text, falling back to the faces' texts joined in face order
    pub fn oracle(&self) -> String {
        if let Some(text) = self.oracle_text.as_deref().filter(|t| !t.trim().is_empty()) {
            return text.to_string();
        }
        self.card_faces
            .iter()
            .flatten()
            .filter_map(|f| f.oracle_text.as_deref())
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn type_line(&self) -> String {
        if let Some(t) = self.type_line.as_deref().filter(|t| !t.trim().is_empty()) {
            return t.to_string();
        }
        self.card_faces
            .iter()
            .flatten()
            .filter_map(|f| f.type_line.as_deref())
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" // ")
    }

    /// Market price in USD; missing or unparseable prices are None
    pub fn price_usd(&self) -> Option<f64> {
        self.prices
            .as_ref()
            .and_then(|p| p.usd.as_deref())
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|p| p.is_finite() && *p >= 0.0)
    }

    /// Legal in `format`. Records without an entry for the format are allowed.
    pub fn is_legal_in(&self, format: &str) -> bool {
        match self.legalities.get(format) {
            Some(status) => status.eq_ignore_ascii_case("legal"),
            None => true,
        }
    }

    pub fn is_land(&self) -> bool {
        self.type_line().to_lowercase().contains("land")
    }

    /// Commander-legal legendary creature, or text that says it can be a commander
    pub fn is_probably_commander(&self) -> bool {
        let type_line = self.type_line().to_lowercase();
        let type_ok = type_line.contains("legendary") && type_line.contains("creature");
        let text_ok = self.oracle().to_lowercase().contains("can be your commander");
        self.is_legal_in("commander") && (type_ok || text_ok)
    }

    /// Normalize into a classified [`Card`]. Both deck building and deck
    /// evaluation construct cards here, so role tagging is identical on both paths.
    pub fn to_card<S: AsRef<str>>(&self, themes: &[S]) -> Card {
        let oracle_text = self.oracle();
        let type_line = self.type_line();
        let roles = classify(&oracle_text, &type_line, &self.name);
        let theme_tags = classify_themes(&oracle_text, themes);

        Card {
            id: self.id.clone(),
            name: self.name.clone(),
            color_identity: parse_color_identity(&self.color_identity),
            commander_eligible: self.is_probably_commander(),
            price_usd: self.price_usd(),
            mana_value: if self.cmc.is_finite() { self.cmc.max(0.0) } else { 0.0 },
            roles,
            themes: theme_tags,
            oracle_text,
            type_line,
        }
    }
}
