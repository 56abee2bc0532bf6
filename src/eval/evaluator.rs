use crate::build::presets::{Quotas, DECK_SIZE};
use crate::card::{Card, CardDatabase};
use crate::config::DeckConfig;
use crate::eval::mana::{color_name, ManaColorStats, MIN_SOURCES_PER_COLOR};
use crate::eval::report::DeckReport;
use crate::simulation::deck::{resolve_cards, DeckError, ParsedDeck};
use crate::simulation::simulator::{simulate, SimulationStats, DEFAULT_TRIALS};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opening sevens with 2+ lands below this rate cost points and get a suggestion
pub const MIN_TWO_LANDS_IN_7_PCT: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckSuggestion {
    pub category: String,
    pub message: String,
    pub severity: Severity,
}

impl DeckSuggestion {
    fn new(category: &str, severity: Severity, message: String) -> Self {
        DeckSuggestion {
            category: category.to_string(),
            message,
            severity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckEvaluation {
    pub commander: Card,
    pub mainboard: Vec<Card>,
    pub report: DeckReport,
    pub mana: ManaColorStats,
    pub simulation: SimulationStats,
    pub suggestions: Vec<DeckSuggestion>,
    pub score: u8,
}

/// Structural review of an existing deck
pub struct DeckEvaluator {
    config: DeckConfig,
    quotas: Quotas,
    trials: usize,
}

impl DeckEvaluator {
    pub fn new(config: DeckConfig) -> Self {
        let quotas = Quotas::for_power(config.power);
        DeckEvaluator {
            config,
            quotas,
            trials: DEFAULT_TRIALS,
        }
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Resolve a parsed list against the card data and evaluate it
    pub fn evaluate_parsed(
        &self,
        db: &CardDatabase,
        parsed: &ParsedDeck,
    ) -> Result<DeckEvaluation, DeckError> {
        let commander = db.get_record(&parsed.commander)?.to_card(&self.config.themes);
        let mainboard = resolve_cards(&parsed.mainboard, db, &self.config.themes)?;
        Ok(self.evaluate(commander, mainboard))
    }

    pub fn evaluate(&self, commander: Card, mainboard: Vec<Card>) -> DeckEvaluation {
        let report = DeckReport::tally(&mainboard, self.config.budget_usd.is_some());
        let mana = ManaColorStats::analyze(&mainboard);
        let simulation = simulate(&mainboard, self.trials, self.config.seed);
        info!(
            "Evaluated {} cards for {} ({} trials)",
            mainboard.len(),
            commander.name,
            self.trials
        );

        let suggestions = self.suggestions(mainboard.len(), &report, &mana, &simulation);
        let score = self.score(&report, &simulation);

        DeckEvaluation {
            commander,
            mainboard,
            report,
            mana,
            simulation,
            suggestions,
            score,
        }
    }

    fn suggestions(
        &self,
        deck_size: usize,
        r: &DeckReport,
        mana: &ManaColorStats,
        sim: &SimulationStats,
    ) -> Vec<DeckSuggestion> {
        let q = &self.quotas;
        let mut s = Vec::new();

        if deck_size != DECK_SIZE {
            s.push(DeckSuggestion::new(
                "DeckSize",
                Severity::High,
                format!("Mainboard is {} cards; expected {} for Commander.", deck_size, DECK_SIZE),
            ));
        }

        if r.ramp > q.ramp_soft_cap {
            s.push(DeckSuggestion::new(
                "Ramp",
                Severity::Low,
                format!(
                    "Ramp is high ({}). Consider trimming toward ~{}-{} unless this is intentionally turbo.",
                    r.ramp, q.ramp, q.ramp_soft_cap
                ),
            ));
        }
        if r.draw_engines < q.draw_engines {
            s.push(DeckSuggestion::new(
                "Draw",
                Severity::Medium,
                format!(
                    "Draw engines are low ({}). Target ~{}+ engines for your power band.",
                    r.draw_engines, q.draw_engines
                ),
            ));
        }
        if r.draw_group < q.group_draw {
            s.push(DeckSuggestion::new(
                "GroupHug",
                Severity::Low,
                format!(
                    "Group draw is low ({}). For group hug, aim ~{}+ symmetrical draw effects.",
                    r.draw_group, q.group_draw
                ),
            ));
        }
        if r.removal < q.removal {
            s.push(DeckSuggestion::new(
                "Interaction",
                Severity::Medium,
                format!("Removal is low ({}). Target ~{}+.", r.removal, q.removal),
            ));
        }
        if r.wipes < q.wipes {
            s.push(DeckSuggestion::new(
                "Interaction",
                Severity::Low,
                format!("Board wipes are low ({}). Target ~{}.", r.wipes, q.wipes),
            ));
        }

        if r.wincons < q.wincons_min {
            s.push(DeckSuggestion::new(
                "WinCons",
                Severity::Medium,
                format!(
                    "Only {} wincon-tagged cards detected. Consider adding {}+ clear finishers.",
                    r.wincons,
                    q.wincons_min - r.wincons
                ),
            ));
        }

        for color in mana.underserved() {
            s.push(DeckSuggestion::new(
                "Mana",
                Severity::Medium,
                format!(
                    "{} demand exists but {} sources look low (<{}).",
                    color_name(color),
                    color_name(color).to_lowercase(),
                    MIN_SOURCES_PER_COLOR
                ),
            ));
        }

        if sim.at_least_2_lands_in_7_pct < MIN_TWO_LANDS_IN_7_PCT {
            s.push(DeckSuggestion::new(
                "Lands",
                Severity::High,
                format!(
                    "Opening 7 has <80% chance of 2+ lands ({:.1}%). Consider +1-2 lands.",
                    sim.at_least_2_lands_in_7_pct
                ),
            ));
        }

        // Stable, so equal severities keep the order they were raised in
        s.sort_by_key(|x| x.severity);
        s
    }

    /// 0..=100, starting from 100 and losing points for structural gaps
    fn score(&self, r: &DeckReport, sim: &SimulationStats) -> u8 {
        let q = &self.quotas;
        let mut score: i64 = 100;

        if sim.at_least_2_lands_in_7_pct < MIN_TWO_LANDS_IN_7_PCT {
            score -= 15;
        }
        if r.draw_engines < q.draw_engines {
            score -= (2 * (q.draw_engines - r.draw_engines) as i64).min(10);
        }
        if r.removal < q.removal {
            score -= (2 * (q.removal - r.removal) as i64).min(10);
        }
        if r.ramp > q.ramp_soft_cap {
            score -= (2 * (r.ramp - q.ramp_soft_cap) as i64).min(12);
        }

        score.clamp(0, 100) as u8
    }
}
