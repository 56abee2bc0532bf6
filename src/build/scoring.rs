use crate::card::{Card, CardRole};
use crate::config::DeckConfig;
use std::cmp::Ordering;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a, 64 bit, over the UTF-8 bytes of `s`
pub fn fnv1a64(s: &str) -> u64 {
    s.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}

/// Deterministic tie-break term in [0, 0.016], a pure function of the name
pub fn name_jitter(name: &str) -> f64 {
    (fnv1a64(&name.to_lowercase()) % 17) as f64 * 0.001
}

/// Ordering score for a candidate. Only meaningful relative to other
/// candidates scored with the same config and commander.
pub fn score(config: &DeckConfig, _commander: &Card, card: &Card) -> f64 {
    let mut score = (6.0 - card.mana_value).max(0.0) * 0.35;

    if card.has_role(CardRole::Ramp) {
        score += 2.2;
    }
    if card.has_role(CardRole::Draw) {
        score += if card.has_role(CardRole::Cantrip) { 0.35 } else { 2.0 };
    }
    if card.has_role(CardRole::Removal) {
        score += 1.8;
    }
    if card.has_role(CardRole::Wipe) {
        score += 1.2;
    }
    if card.has_role(CardRole::Protection) {
        score += 1.0;
    }

    score += card.themes.len() as f64 * 1.4;

    if card.has_role(CardRole::Tutor) && !config.allow_tutors {
        score -= 1.0;
    }

    if config.budget_usd.is_some() {
        if let Some(price) = card.price_usd {
            score -= (price / 20.0).min(2.0);
        }
    }

    score + name_jitter(&card.name)
}

/// A candidate paired with its score
#[derive(Debug, Clone)]
pub struct ScoredCard {
    pub card: Card,
    pub score: f64,
}

/// Rank order: score descending, then lower-cased name ascending
pub fn compare_ranked(a: &ScoredCard, b: &ScoredCard) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.card.key().cmp(&b.card.key()))
}

/// Score every card and sort: score descending, then name ascending
pub fn rank_candidates(config: &DeckConfig, commander: &Card, pool: Vec<Card>) -> Vec<ScoredCard> {
    let mut scored: Vec<ScoredCard> = pool
        .into_iter()
        .map(|card| {
            let score = score(config, commander, &card);
            ScoredCard { card, score }
        })
        .collect();
    scored.sort_by(compare_ranked);
    scored
}
