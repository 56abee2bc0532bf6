use crate::card::{Card, CardRole};
use crate::tags::{is_draw_engine, is_draw_spell};
use serde::{Deserialize, Serialize};

/// Role counts over a finished card list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckReport {
    pub lands: usize,
    pub ramp: usize,

    pub draw_total: usize,
    /// Draw that is neither group draw nor a cantrip; what deck building selects for
    pub draw_personal: usize,
    pub draw_engines: usize,
    pub draw_spells: usize,
    pub cantrips: usize,
    pub draw_group: usize,

    pub removal: usize,
    pub wipes: usize,
    pub protection: usize,
    pub tutors: usize,
    pub payoffs: usize,
    pub wincons: usize,

    pub estimated_usd: Option<f64>,
    pub avg_mana_value: f64,
}

impl DeckReport {
    /// Count roles over `cards`. Missing prices count as zero and the total is
    /// only computed when `include_price` is set.
    pub fn tally(cards: &[Card], include_price: bool) -> Self {
        let with = |role: CardRole| cards.iter().filter(|c| c.has_role(role)).count();

        let nonlands: Vec<f64> = cards
            .iter()
            .filter(|c| !c.is_land())
            .map(|c| c.mana_value)
            .collect();
        let avg_mana_value = if nonlands.is_empty() {
            0.0
        } else {
            nonlands.iter().sum::<f64>() / nonlands.len() as f64
        };

        DeckReport {
            lands: cards.iter().filter(|c| c.is_land()).count(),
            ramp: with(CardRole::Ramp),
            draw_total: with(CardRole::Draw),
            draw_personal: cards.iter().filter(|c| c.is_personal_draw()).count(),
            draw_engines: cards.iter().filter(|c| is_draw_engine(c)).count(),
            draw_spells: cards.iter().filter(|c| is_draw_spell(c)).count(),
            cantrips: with(CardRole::Cantrip),
            draw_group: with(CardRole::GroupDraw),
            removal: with(CardRole::Removal),
            wipes: with(CardRole::Wipe),
            protection: with(CardRole::Protection),
            tutors: with(CardRole::Tutor),
            payoffs: with(CardRole::Payoff),
            wincons: with(CardRole::WinCon),
            estimated_usd: include_price
                .then(|| cards.iter().map(|c| c.price_usd.unwrap_or(0.0)).sum()),
            avg_mana_value,
        }
    }
}
