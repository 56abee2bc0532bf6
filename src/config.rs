use crate::build::presets::PowerLevel;
use crate::rng::DEFAULT_SEED;
use crate::tags::themes::{known_themes, theme_keywords};
use log::warn;
use serde::{Deserialize, Serialize};

pub const MIN_CANDIDATES: usize = 200;
pub const MAX_CANDIDATES: usize = 2500;
pub const DEFAULT_MAX_CANDIDATES: usize = 800;

/// Run configuration for one build or evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckConfig {
    pub power: PowerLevel,
    pub budget_usd: Option<f64>,
    pub allow_tutors: bool,
    pub no_stax: bool,
    pub no_infinite: bool,
    pub themes: Vec<String>,
    pub seed: u64,
    pub max_candidates: usize,
}

impl Default for DeckConfig {
    fn default() -> Self {
        DeckConfig {
            power: PowerLevel::Upgraded,
            budget_usd: None,
            allow_tutors: false,
            no_stax: false,
            no_infinite: false,
            themes: Vec::new(),
            seed: DEFAULT_SEED,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

impl DeckConfig {
    /// Apply the same clean-up the CLI applies: theme CSV parsing,
    /// candidate cap clamping and the zero-seed default.
    pub fn normalized(mut self) -> Self {
        self.themes = normalize_themes(&self.themes.join(","));
        self.max_candidates = self.max_candidates.clamp(MIN_CANDIDATES, MAX_CANDIDATES);
        if self.seed == 0 {
            self.seed = DEFAULT_SEED;
        }
        if let Some(budget) = self.budget_usd {
            if !budget.is_finite() || budget < 0.0 {
                warn!("Ignoring invalid budget {}", budget);
                self.budget_usd = None;
            }
        }
        for theme in &self.themes {
            if theme_keywords(theme).is_none() {
                warn!(
                    "Unknown theme '{}' will not tag any cards (known: {})",
                    theme,
                    known_themes().collect::<Vec<_>>().join(", ")
                );
            }
        }
        self
    }

    pub fn with_themes_csv(mut self, csv: &str) -> Self {
        self.themes = normalize_themes(csv);
        self
    }
}

/// Split a comma separated theme list into trimmed, lower-cased, unique names
pub fn normalize_themes(csv: &str) -> Vec<String> {
    let mut themes: Vec<String> = Vec::new();
    for theme in csv.split(',').map(|t| t.trim().to_lowercase()) {
        if !theme.is_empty() && !themes.contains(&theme) {
            themes.push(theme);
        }
    }
    themes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_themes() {
        assert_eq!(
            normalize_themes(" Lifegain, tokens,,LIFEGAIN , group_hug"),
            vec!["lifegain", "tokens", "group_hug"]
        );
        assert!(normalize_themes("").is_empty());
    }

    #[test]
    fn test_normalized_clamps_and_defaults() {
        let cfg = DeckConfig {
            max_candidates: 10,
            seed: 0,
            budget_usd: Some(-5.0),
            ..DeckConfig::default()
        }
        .normalized();
        assert_eq!(cfg.max_candidates, MIN_CANDIDATES);
        assert_eq!(cfg.seed, DEFAULT_SEED);
        assert_eq!(cfg.budget_usd, None);

        let big = DeckConfig {
            max_candidates: 100_000,
            ..DeckConfig::default()
        }
        .normalized();
        assert_eq!(big.max_candidates, MAX_CANDIDATES);
    }

    #[test]
    fn test_default_is_upgraded() {
        let cfg = DeckConfig::default();
        assert_eq!(cfg.power, PowerLevel::Upgraded);
        assert!(!cfg.allow_tutors);
        assert_eq!(cfg.max_candidates, DEFAULT_MAX_CANDIDATES);
    }
}
