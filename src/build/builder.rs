use crate::build::allocator::select_nonlands;
use crate::build::filters::{is_commander_card, passes_filters, staple_names};
use crate::build::mana_base::{basic_land_for, build_mana_base, UTILITY_LANDS};
use crate::build::presets::{Quotas, DECK_SIZE};
use crate::build::scoring::rank_candidates;
use crate::card::{Card, CardDatabase, CardDatabaseError, CardRecord, ManaColor};
use crate::config::DeckConfig;
use crate::eval::report::DeckReport;
use crate::rng::DeckRng;
use crate::tags::theme_keywords;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const FORMAT: &str = "commander";

/// A finished 99 plus its commander, summary and warnings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckResult {
    pub commander: Card,
    pub mainboard: Vec<Card>,
    pub report: DeckReport,
    pub warnings: Vec<String>,
    pub config: DeckConfig,
}

/// One targeted candidate search over the card data
struct Search {
    label: String,
    limit: usize,
    matches: Box<dyn Fn(&str) -> bool>,
}

fn has_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

fn role_searches(max_candidates: usize) -> Vec<Search> {
    let big = max_candidates / 6;
    let small = max_candidates / 10;
    vec![
        Search {
            label: "ramp".to_string(),
            limit: big,
            matches: Box::new(|o| has_any(o, &["add {", "search your library for a land"])),
        },
        Search {
            label: "draw".to_string(),
            limit: big,
            matches: Box::new(|o| {
                o.contains("draw a card") || (o.contains("exile the top") && o.contains("you may play"))
            }),
        },
        Search {
            label: "removal".to_string(),
            limit: big,
            matches: Box::new(|o| has_any(o, &["destroy target", "exile target", "counter target"])),
        },
        Search {
            label: "wipes".to_string(),
            limit: small,
            matches: Box::new(|o| has_any(o, &["destroy all", "exile all"])),
        },
        Search {
            label: "protection".to_string(),
            limit: small,
            matches: Box::new(|o| {
                has_any(o, &["hexproof", "indestructible", "phase out"])
                    || (o.contains("return") && o.contains("from your graveyard"))
            }),
        },
    ]
}

fn theme_searches(config: &DeckConfig) -> Vec<Search> {
    config
        .themes
        .iter()
        .filter_map(|theme| {
            let keywords = theme_keywords(theme)?;
            Some(Search {
                label: format!("theme:{}", theme),
                limit: config.max_candidates / 6,
                matches: Box::new(move |o| keywords.iter().any(|k| o.contains(k))),
            })
        })
        .collect()
}

fn within_identity(record: &CardRecord, identity: &[ManaColor]) -> bool {
    record
        .color_identity
        .iter()
        .all(|s| ManaColor::from_symbol(s).is_some_and(|c| identity.contains(&c)))
}

/// Builds a Commander deck from the local card data
pub struct DeckBuilder<'a> {
    db: &'a CardDatabase,
    config: DeckConfig,
    quotas: Quotas,
}

impl<'a> DeckBuilder<'a> {
    pub fn new(db: &'a CardDatabase, config: DeckConfig) -> Self {
        let quotas = Quotas::for_power(config.power);
        DeckBuilder { db, config, quotas }
    }

    pub fn quotas(&self) -> &Quotas {
        &self.quotas
    }

    pub fn build(&self, commander_name: &str) -> Result<DeckResult, CardDatabaseError> {
        let mut warnings = Vec::new();

        let commander = self
            .db
            .get_record(commander_name)?
            .to_card(&self.config.themes);
        if !commander.commander_eligible {
            warnings.push(format!(
                "Commander may not be a legal commander (heuristic). You chose: {}",
                commander.name
            ));
        }
        info!(
            "Building {} deck for {} (identity {:?})",
            self.config.power, commander.name, commander.color_identity
        );

        let pool = self.gather_candidates(&commander);
        let ranked = rank_candidates(&self.config, &commander, pool);

        let allocation = select_nonlands(&self.config, &self.quotas, &commander, &ranked);
        warnings.extend(allocation.warnings);

        let mut rng = DeckRng::new(Some(self.config.seed));
        let utility = self.utility_lands();
        let lands = build_mana_base(
            &self.config,
            &commander,
            self.quotas.lands,
            &utility,
            &mut rng,
        );

        let mut mainboard = allocation.selected;
        mainboard.extend(lands);
        mainboard.truncate(DECK_SIZE);
        while mainboard.len() < DECK_SIZE {
            mainboard.push(basic_land_for(&commander, &mut rng));
        }

        let report = DeckReport::tally(&mainboard, self.config.budget_usd.is_some());
        info!(
            "Deck complete: {} lands, {} warnings",
            report.lands,
            warnings.len()
        );

        Ok(DeckResult {
            commander,
            mainboard,
            report,
            warnings,
            config: self.config.clone(),
        })
    }

    /// Every targeted search plus the staple rocks, filtered and de-duplicated
    /// by name (first occurrence wins).
    pub fn gather_candidates(&self, commander: &Card) -> Vec<Card> {
        let identity = &commander.color_identity;
        let mut pool = Vec::new();

        let searches = role_searches(self.config.max_candidates)
            .into_iter()
            .chain(theme_searches(&self.config));
        for search in searches {
            let records = self.db.search(search.limit, |r| {
                r.is_legal_in(FORMAT)
                    && !r.is_land()
                    && within_identity(r, identity)
                    && !r.name.eq_ignore_ascii_case(&commander.name)
                    && (search.matches)(&r.oracle().to_lowercase())
            });
            debug!("Search {} found {} candidates", search.label, records.len());
            self.push_candidates(commander, records, &mut pool);
        }

        for name in staple_names(identity) {
            match self.db.get_record(name) {
                Ok(record) if !record.is_land() => {
                    self.push_candidates(commander, vec![record], &mut pool)
                }
                Ok(_) => {}
                Err(_) => debug!("Staple {} not in card data", name),
            }
        }

        let mut seen = HashSet::new();
        pool.retain(|c: &Card| seen.insert(c.key()));
        info!("Candidate pool: {} cards", pool.len());
        pool
    }

    fn push_candidates(&self, commander: &Card, records: Vec<&CardRecord>, pool: &mut Vec<Card>) {
        for record in records {
            let card = record.to_card(&self.config.themes);
            if is_commander_card(commander, &card) {
                continue;
            }
            if passes_filters(&self.config, &card, &commander.color_identity) {
                pool.push(card);
            }
        }
    }

    fn utility_lands(&self) -> Vec<Card> {
        UTILITY_LANDS
            .iter()
            .filter_map(|name| match self.db.get_record(name) {
                Ok(record) if record.is_legal_in(FORMAT) => Some(record.to_card(&self.config.themes)),
                Ok(_) => None,
                Err(_) => {
                    debug!("Utility land {} not in card data, skipping", name);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> CardDatabase {
        CardDatabase::from_file("cards.json").expect("Failed to load cards")
    }

    #[test]
    fn test_build_from_fixture_is_exactly_99() {
        let db = db();
        let builder = DeckBuilder::new(&db, DeckConfig::default());
        let result = builder
            .build("Atraxa, Praetors' Voice")
            .expect("commander exists");

        assert_eq!(result.mainboard.len(), DECK_SIZE);
        assert!(!result.mainboard.iter().any(|c| c.same_name(&result.commander)));

        let nonbasic: Vec<String> = result
            .mainboard
            .iter()
            .filter(|c| !c.is_basic_land())
            .map(Card::key)
            .collect();
        let unique: HashSet<&String> = nonbasic.iter().collect();
        assert_eq!(unique.len(), nonbasic.len());

        // The fixture is far too small for 62 non-lands
        assert!(result.warnings.iter().any(|w| w.starts_with("Nonland pool was too small")));
        assert!(result.report.lands >= builder.quotas().lands);
    }

    #[test]
    fn test_candidates_respect_identity_and_commander() {
        let db = db();
        let builder = DeckBuilder::new(&db, DeckConfig::default());
        let commander = db.get_record("Atraxa, Praetors' Voice").unwrap().to_card::<&str>(&[]);
        let pool = builder.gather_candidates(&commander);

        assert!(!pool.is_empty());
        assert!(pool.iter().all(|c| c.fits_identity(&commander.color_identity)));
        assert!(pool.iter().all(|c| !c.is_land()));
        assert!(!pool.iter().any(|c| c.same_name(&commander)));
        // Red card is outside the identity
        assert!(!pool.iter().any(|c| c.name == "Lightning Bolt"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let db = db();
        let names = |r: &DeckResult| r.mainboard.iter().map(|c| c.name.clone()).collect::<Vec<_>>();
        let a = DeckBuilder::new(&db, DeckConfig::default())
            .build("Atraxa, Praetors' Voice")
            .unwrap();
        let b = DeckBuilder::new(&db, DeckConfig::default())
            .build("Atraxa, Praetors' Voice")
            .unwrap();
        assert_eq!(names(&a), names(&b));
        assert_eq!(a.warnings, b.warnings);
    }

    #[test]
    fn test_unknown_commander_is_an_error() {
        let db = db();
        let result = DeckBuilder::new(&db, DeckConfig::default()).build("Nobody In Particular");
        assert!(matches!(result, Err(CardDatabaseError::CardNotFound(_))));
    }

    #[test]
    fn test_non_commander_warns() {
        let db = db();
        let result = DeckBuilder::new(&db, DeckConfig::default())
            .build("Sol Ring")
            .unwrap();
        assert!(result.warnings[0].starts_with("Commander may not be a legal commander"));
        // Colorless identity means Wastes
        assert!(result.mainboard.iter().any(|c| c.name == "Wastes"));
    }
}
