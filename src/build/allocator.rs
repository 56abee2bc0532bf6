use crate::build::presets::{PowerLevel, Quotas};
use crate::build::scoring::{compare_ranked, ScoredCard};
use crate::card::{Card, CardRole};
use crate::config::DeckConfig;
use log::{debug, info, warn};
use std::collections::HashSet;

/// Cards above this price are skipped by the quota passes of a budget precon build
pub const PRECON_PRICE_CEILING_USD: f64 = 25.0;

/// Quota categories, in the order the allocator fills them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Ramp,
    DrawEngines,
    GroupDraw,
    Removal,
    Wipes,
    Protection,
    PayoffsOrTheme,
}

impl Category {
    pub const QUOTA_ORDER: [Category; 7] = [
        Category::Ramp,
        Category::DrawEngines,
        Category::GroupDraw,
        Category::Removal,
        Category::Wipes,
        Category::Protection,
        Category::PayoffsOrTheme,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Ramp => "Ramp",
            Category::DrawEngines => "Draw (engines)",
            Category::GroupDraw => "Draw (group)",
            Category::Removal => "Removal",
            Category::Wipes => "Wipes",
            Category::Protection => "Protection",
            Category::PayoffsOrTheme => "Payoffs/Theme",
        }
    }

    pub fn matches(&self, card: &Card) -> bool {
        match self {
            Category::Ramp => card.has_role(CardRole::Ramp),
            Category::DrawEngines => card.is_personal_draw(),
            Category::GroupDraw => card.has_role(CardRole::GroupDraw),
            Category::Removal => card.has_role(CardRole::Removal),
            Category::Wipes => card.has_role(CardRole::Wipe),
            Category::Protection => card.has_role(CardRole::Protection),
            Category::PayoffsOrTheme => card.has_role(CardRole::Payoff) || card.has_themes(),
        }
    }

    pub fn target(&self, quotas: &Quotas) -> usize {
        match self {
            Category::Ramp => quotas.ramp,
            Category::DrawEngines => quotas.draw_engines,
            Category::GroupDraw => quotas.group_draw,
            Category::Removal => quotas.removal,
            Category::Wipes => quotas.wipes,
            Category::Protection => quotas.protection,
            Category::PayoffsOrTheme => quotas.payoffs,
        }
    }
}

/// Running per-category counts of the chosen cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub ramp: usize,
    pub draw_engines: usize,
    pub group_draw: usize,
    pub cantrips: usize,
    pub removal: usize,
    pub wipes: usize,
    pub protection: usize,
    pub tutors: usize,
    pub payoffs: usize,
}

impl CategoryCounts {
    fn record(&mut self, card: &Card, added: bool) {
        let flags = [
            (&mut self.ramp, card.has_role(CardRole::Ramp)),
            (&mut self.draw_engines, card.is_personal_draw()),
            (&mut self.group_draw, card.has_role(CardRole::GroupDraw)),
            (&mut self.cantrips, card.has_role(CardRole::Cantrip)),
            (&mut self.removal, card.has_role(CardRole::Removal)),
            (&mut self.wipes, card.has_role(CardRole::Wipe)),
            (&mut self.protection, card.has_role(CardRole::Protection)),
            (&mut self.tutors, card.has_role(CardRole::Tutor)),
            (&mut self.payoffs, card.has_role(CardRole::Payoff)),
        ];
        for (counter, hit) in flags {
            if hit {
                if added {
                    *counter += 1;
                } else {
                    *counter = counter.saturating_sub(1);
                }
            }
        }
    }
}

/// Working state while non-land cards are chosen
#[derive(Debug, Clone)]
pub struct DeckAssembly {
    target: usize,
    chosen: Vec<Card>,
    names: HashSet<String>,
    counts: CategoryCounts,
}

impl DeckAssembly {
    pub fn new(target: usize) -> Self {
        DeckAssembly {
            target,
            chosen: Vec::with_capacity(target),
            names: HashSet::with_capacity(target),
            counts: CategoryCounts::default(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.chosen.len() >= self.target
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.names.contains(&card.key())
    }

    /// Add a card unless the budget is spent or the name is already taken
    pub fn push(&mut self, card: Card) -> bool {
        if self.is_full() || !self.names.insert(card.key()) {
            return false;
        }
        self.counts.record(&card, true);
        self.chosen.push(card);
        true
    }

    fn remove_at(&mut self, idx: usize) -> Card {
        let card = self.chosen.remove(idx);
        self.names.remove(&card.key());
        self.counts.record(&card, false);
        card
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    pub fn counts(&self) -> &CategoryCounts {
        &self.counts
    }

    pub fn cards(&self) -> &[Card] {
        &self.chosen
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.chosen
    }
}

/// Chosen non-land cards plus the non-fatal shortfall notes
#[derive(Debug, Clone)]
pub struct Allocation {
    pub selected: Vec<Card>,
    pub warnings: Vec<String>,
}

fn over_price_ceiling(config: &DeckConfig, card: &Card) -> bool {
    config.budget_usd.is_some()
        && config.power == PowerLevel::Precon
        && card.price_usd.unwrap_or(0.0) > PRECON_PRICE_CEILING_USD
}

fn take_quota(
    config: &DeckConfig,
    quotas: &Quotas,
    category: Category,
    ranked: &[&ScoredCard],
    deck: &mut DeckAssembly,
    warnings: &mut Vec<String>,
) {
    let target = category.target(quotas);
    let mut remaining = target;

    for candidate in ranked {
        if deck.is_full() || remaining == 0 {
            break;
        }
        let card = &candidate.card;
        if card.is_land() || deck.contains(card) || !category.matches(card) {
            continue;
        }
        if over_price_ceiling(config, card) {
            continue;
        }
        if deck.push(card.clone()) {
            remaining -= 1;
        }
    }

    debug!(
        "{} quota: took {} of {}",
        category.label(),
        target - remaining,
        target
    );
    if remaining > 0 {
        warnings.push(format!(
            "Could not fully satisfy {} quota; short by {}.",
            category.label(),
            remaining
        ));
    }
}

fn trim_tutors(quotas: &Quotas, deck: &mut DeckAssembly, warnings: &mut Vec<String>) {
    let cap = quotas.tutors_soft_cap;
    if deck.counts().tutors <= cap {
        return;
    }

    let mut tutors: Vec<usize> = deck
        .cards()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.has_role(CardRole::Tutor))
        .map(|(i, _)| i)
        .collect();
    // Highest mana value goes first; among equals the later (lower scored) pick goes first
    tutors.sort_by(|&a, &b| {
        let (ca, cb) = (&deck.cards()[a], &deck.cards()[b]);
        cb.mana_value.total_cmp(&ca.mana_value).then(b.cmp(&a))
    });

    let excess = tutors.len() - cap;
    let mut doomed: Vec<usize> = tutors.into_iter().take(excess).collect();
    doomed.sort_unstable_by(|a, b| b.cmp(a));
    for idx in doomed {
        let removed = deck.remove_at(idx);
        debug!("Trimmed tutor {}", removed.name);
    }

    info!("Trimmed {} tutors down to soft cap {}", excess, cap);
    warnings.push(format!(
        "Trimmed tutors to soft cap ({}). Use --allow-tutors to permit more.",
        cap
    ));
}

/// Soft caps checked by the fill pass. Payoff or themed cards bypass them,
/// except the tutor cap, which is a policy limit.
fn blocked_by_soft_cap(config: &DeckConfig, quotas: &Quotas, counts: &CategoryCounts, card: &Card) -> bool {
    if !config.allow_tutors && card.has_role(CardRole::Tutor) && counts.tutors >= quotas.tutors_soft_cap {
        return true;
    }
    if card.has_role(CardRole::Payoff) || card.has_themes() {
        return false;
    }

    (card.has_role(CardRole::Cantrip) && counts.cantrips >= quotas.cantrips_soft_cap)
        || (card.is_personal_draw() && counts.draw_engines >= quotas.draw_engines_soft_cap)
        || (card.has_role(CardRole::Ramp) && counts.ramp >= quotas.ramp_soft_cap)
        || (card.has_role(CardRole::Removal) && counts.removal >= quotas.removal_soft_cap)
        || (card.has_role(CardRole::Wipe) && counts.wipes >= quotas.wipes_soft_cap)
        || (card.has_role(CardRole::Protection) && counts.protection >= quotas.protection_soft_cap)
}

fn fill_remaining(config: &DeckConfig, quotas: &Quotas, ranked: &[&ScoredCard], deck: &mut DeckAssembly) {
    for candidate in ranked {
        if deck.is_full() {
            break;
        }
        let card = &candidate.card;
        if card.is_land() || deck.contains(card) {
            continue;
        }
        if blocked_by_soft_cap(config, quotas, deck.counts(), card) {
            continue;
        }
        deck.push(card.clone());
    }
}

/// Greedy quota allocation over a scored pool.
///
/// Returns at most `99 - quotas.lands` cards, never two with the same name.
/// The result depends only on the pool, config and quotas.
pub fn allocate(config: &DeckConfig, quotas: &Quotas, pool: &[ScoredCard]) -> Allocation {
    let mut ranked: Vec<&ScoredCard> = pool.iter().collect();
    ranked.sort_by(|a, b| compare_ranked(a, b));

    let target = quotas.nonland_target();
    let mut deck = DeckAssembly::new(target);
    let mut warnings = Vec::new();

    for category in Category::QUOTA_ORDER {
        take_quota(config, quotas, category, &ranked, &mut deck, &mut warnings);
    }

    if !config.allow_tutors {
        trim_tutors(quotas, &mut deck, &mut warnings);
    }

    fill_remaining(config, quotas, &ranked, &mut deck);

    if deck.len() < target {
        warn!("Non-land pool exhausted at {} of {}", deck.len(), target);
        warnings.push(format!(
            "Nonland pool was too small; only selected {} nonlands. Consider raising --max-candidates.",
            deck.len()
        ));
    }

    Allocation {
        selected: deck.into_cards(),
        warnings,
    }
}

/// Remove any card sharing the commander's name and refill from the pool in
/// rank order until `target` is met again (or the pool runs dry).
pub fn exclude_commander(
    commander: &Card,
    selected: Vec<Card>,
    pool: &[ScoredCard],
    target: usize,
    warnings: &mut Vec<String>,
) -> Vec<Card> {
    let before = selected.len();
    let mut kept: Vec<Card> = selected
        .into_iter()
        .filter(|c| !c.same_name(commander))
        .collect();
    if kept.len() == before {
        return kept;
    }

    warn!("Commander {} was selected for the mainboard; removing it", commander.name);
    warnings.push(format!(
        "Commander was found in mainboard and removed: {}",
        commander.name
    ));

    let mut names: HashSet<String> = kept.iter().map(Card::key).collect();
    let mut ranked: Vec<&ScoredCard> = pool.iter().collect();
    ranked.sort_by(|a, b| compare_ranked(a, b));

    for candidate in ranked {
        if kept.len() >= target {
            break;
        }
        let card = &candidate.card;
        if card.is_land() || card.same_name(commander) || names.contains(&card.key()) {
            continue;
        }
        names.insert(card.key());
        kept.push(card.clone());
    }
    kept
}

/// Allocation followed by the commander self-inclusion correction
pub fn select_nonlands(
    config: &DeckConfig,
    quotas: &Quotas,
    commander: &Card,
    pool: &[ScoredCard],
) -> Allocation {
    let Allocation {
        selected,
        mut warnings,
    } = allocate(config, quotas, pool);
    let selected = exclude_commander(
        commander,
        selected,
        pool,
        quotas.nonland_target(),
        &mut warnings,
    );
    Allocation { selected, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::scoring::rank_candidates;
    use crate::card::RoleSet;

    fn card(name: &str, mv: f64, roles: &[CardRole]) -> Card {
        let mut c = Card::basic_land(name);
        c.id = format!("test:{}", name);
        c.type_line = "Artifact".to_string();
        c.mana_value = mv;
        c.price_usd = None;
        c.roles = roles.iter().copied().collect::<RoleSet>();
        c
    }

    fn themed(name: &str, mv: f64) -> Card {
        let mut c = card(name, mv, &[]);
        c.themes = vec!["tokens".to_string()];
        c
    }

    fn upgraded() -> (DeckConfig, Quotas) {
        let cfg = DeckConfig::default();
        let q = Quotas::for_power(cfg.power);
        (cfg, q)
    }

    fn names(cards: &[Card]) -> Vec<String> {
        cards.iter().map(|c| c.name.clone()).collect()
    }

    fn count(cards: &[Card], role: CardRole) -> usize {
        cards.iter().filter(|c| c.has_role(role)).count()
    }

    /// 12 ramp, 8 draw engines, 15 removal and 64 themed fillers
    fn scenario_pool() -> Vec<Card> {
        let mut pool = Vec::new();
        for i in 0..12 {
            pool.push(card(&format!("Ramp {:02}", i), i as f64 * 0.5, &[CardRole::Ramp]));
        }
        for i in 0..8 {
            pool.push(card(&format!("Engine {:02}", i), i as f64 * 0.5, &[CardRole::Draw]));
        }
        for i in 0..15 {
            pool.push(card(&format!("Removal {:02}", i), i as f64 * 0.5, &[CardRole::Removal]));
        }
        for i in 0..64 {
            pool.push(themed(&format!("Token Maker {:02}", i), 0.0));
        }
        pool
    }

    #[test]
    fn test_scenario_quota_targets() {
        let (cfg, q) = upgraded();
        let commander = card("Leader", 4.0, &[]);
        let ranked = rank_candidates(&cfg, &commander, scenario_pool());
        let result = allocate(&cfg, &q, &ranked);
        let chosen = &result.selected;

        assert_eq!(chosen.len(), q.nonland_target());
        assert_eq!(count(chosen, CardRole::Ramp), 11);
        assert_eq!(count(chosen, CardRole::Draw), 7);
        assert!(count(chosen, CardRole::Removal) <= q.removal_soft_cap);
        assert_eq!(count(chosen, CardRole::Removal), 10);

        // The 11 ramp cards are the highest scored ones
        let top_ramp: Vec<String> = ranked
            .iter()
            .filter(|s| s.card.has_role(CardRole::Ramp))
            .take(11)
            .map(|s| s.card.name.clone())
            .collect();
        for name in &top_ramp {
            assert!(chosen.iter().any(|c| &c.name == name), "missing {}", name);
        }
        assert!(!chosen.iter().any(|c| c.name == "Ramp 11"));

        assert!(result
            .warnings
            .contains(&"Could not fully satisfy Draw (group) quota; short by 6.".to_string()));
        assert!(!result.warnings.iter().any(|w| w.contains("Ramp quota")));
        assert!(!result.warnings.iter().any(|w| w.contains("Draw (engines)")));
    }

    #[test]
    fn test_allocation_is_deterministic_and_singleton() {
        let (cfg, q) = upgraded();
        let commander = card("Leader", 4.0, &[]);
        let mut pool = scenario_pool();
        // Duplicate printing under a different case
        pool.push(card("RAMP 00", 1.0, &[CardRole::Ramp]));
        let ranked = rank_candidates(&cfg, &commander, pool);

        let first = allocate(&cfg, &q, &ranked);
        let second = allocate(&cfg, &q, &ranked);
        assert_eq!(names(&first.selected), names(&second.selected));
        assert_eq!(first.warnings, second.warnings);

        let unique: HashSet<String> = first.selected.iter().map(Card::key).collect();
        assert_eq!(unique.len(), first.selected.len());
        assert!(first.selected.len() <= q.nonland_target());
    }

    #[test]
    fn test_fill_pass_respects_soft_caps() {
        let (cfg, q) = upgraded();
        let commander = card("Leader", 4.0, &[]);
        let pool: Vec<Card> = (0..30)
            .map(|i| card(&format!("Rock {:02}", i), 2.0, &[CardRole::Ramp]))
            .collect();
        let ranked = rank_candidates(&cfg, &commander, pool);
        let result = allocate(&cfg, &q, &ranked);

        assert_eq!(result.selected.len(), q.ramp_soft_cap);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.starts_with("Nonland pool was too small; only selected 15 nonlands")));
    }

    #[test]
    fn test_payoffs_bypass_soft_caps() {
        let (cfg, q) = upgraded();
        let commander = card("Leader", 4.0, &[]);
        let pool: Vec<Card> = (0..40)
            .map(|i| card(&format!("Payoff Rock {:02}", i), 2.0, &[CardRole::Ramp, CardRole::Payoff]))
            .collect();
        let ranked = rank_candidates(&cfg, &commander, pool);
        let result = allocate(&cfg, &q, &ranked);
        assert_eq!(count(&result.selected, CardRole::Ramp), 40);
    }

    #[test]
    fn test_themed_cards_bypass_soft_caps() {
        let (cfg, q) = upgraded();
        let commander = card("Leader", 4.0, &[]);
        // More than the ramp and theme quotas together, so the fill pass has to take the rest
        let pool: Vec<Card> = (0..45)
            .map(|i| {
                let mut c = themed(&format!("Treasure Maker {:02}", i), 2.0);
                c.roles = [CardRole::Ramp].into_iter().collect();
                c
            })
            .collect();
        let ranked = rank_candidates(&cfg, &commander, pool);
        let result = allocate(&cfg, &q, &ranked);

        assert!(!result.selected.iter().any(|c| c.has_role(CardRole::Payoff)));
        assert!(count(&result.selected, CardRole::Ramp) > q.ramp_soft_cap);
        assert_eq!(q.ramp + q.payoffs, 31);
        assert_eq!(count(&result.selected, CardRole::Ramp), 45);
    }

    #[test]
    fn test_removal_stops_at_soft_cap_without_fillers() {
        let (cfg, q) = upgraded();
        let commander = card("Leader", 4.0, &[]);
        // Same shape as the scenario pool minus the themed fillers
        let pool: Vec<Card> = scenario_pool().into_iter().filter(|c| !c.has_themes()).collect();
        assert_eq!(count(&pool, CardRole::Removal), 15);

        let ranked = rank_candidates(&cfg, &commander, pool);
        let result = allocate(&cfg, &q, &ranked);
        let chosen = &result.selected;

        assert_eq!(count(chosen, CardRole::Removal), q.removal_soft_cap);
        assert_eq!(count(chosen, CardRole::Removal), 13);
        assert_eq!(count(chosen, CardRole::Ramp), 12);
        assert_eq!(count(chosen, CardRole::Draw), 8);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.starts_with("Nonland pool was too small; only selected 33 nonlands")));
    }

    #[test]
    fn test_tutor_trim_drops_highest_mana_value() {
        let (cfg, q) = upgraded();
        let commander = card("Leader", 4.0, &[]);
        let pool: Vec<Card> = (1..=6)
            .map(|mv| card(&format!("Tutor {}", mv), mv as f64, &[CardRole::Removal, CardRole::Tutor]))
            .collect();
        let ranked = rank_candidates(&cfg, &commander, pool.clone());
        let result = allocate(&cfg, &q, &ranked);

        assert_eq!(count(&result.selected, CardRole::Tutor), q.tutors_soft_cap);
        let kept = names(&result.selected);
        assert!(!kept.contains(&"Tutor 6".to_string()));
        assert!(!kept.contains(&"Tutor 5".to_string()));
        assert!(result.warnings.contains(
            &"Trimmed tutors to soft cap (4). Use --allow-tutors to permit more.".to_string()
        ));

        let permissive = DeckConfig {
            allow_tutors: true,
            ..DeckConfig::default()
        };
        let ranked = rank_candidates(&permissive, &commander, pool);
        let result = allocate(&permissive, &q, &ranked);
        assert_eq!(count(&result.selected, CardRole::Tutor), 6);
        assert!(!result.warnings.iter().any(|w| w.starts_with("Trimmed tutors")));
    }

    #[test]
    fn test_precon_budget_skips_expensive_cards_in_quota_passes() {
        let cfg = DeckConfig {
            power: PowerLevel::Precon,
            budget_usd: Some(100.0),
            ..DeckConfig::default()
        };
        let q = Quotas::for_power(cfg.power);
        let commander = card("Leader", 4.0, &[]);
        let mut pricey = card("Mana Crypt", 0.0, &[CardRole::Ramp]);
        pricey.price_usd = Some(150.0);
        let cheap = card("Mind Stone", 2.0, &[CardRole::Ramp]);

        let ranked = rank_candidates(&cfg, &commander, vec![pricey, cheap]);
        let mut deck = DeckAssembly::new(q.nonland_target());
        let mut warnings = Vec::new();
        let refs: Vec<&ScoredCard> = ranked.iter().collect();
        assert!(deck.is_empty());
        take_quota(&cfg, &q, Category::Ramp, &refs, &mut deck, &mut warnings);

        assert_eq!(names(deck.cards()), vec!["Mind Stone".to_string()]);
        assert_eq!(warnings, vec!["Could not fully satisfy Ramp quota; short by 9.".to_string()]);
    }

    #[test]
    fn test_commander_is_excluded_and_refilled() {
        let (cfg, q) = upgraded();
        let commander = card("Leader", 4.0, &[CardRole::Ramp]);
        let mut pool: Vec<Card> = (0..70)
            .map(|i| card(&format!("Filler {:02}", i), 3.0, &[]))
            .collect();
        pool.push(card("leader", 0.0, &[CardRole::Ramp]));
        let ranked = rank_candidates(&cfg, &commander, pool);

        let raw = allocate(&cfg, &q, &ranked);
        assert!(raw.selected.iter().any(|c| c.same_name(&commander)));

        let result = select_nonlands(&cfg, &q, &commander, &ranked);
        assert!(!result.selected.iter().any(|c| c.same_name(&commander)));
        assert_eq!(result.selected.len(), q.nonland_target());
        assert!(result
            .warnings
            .contains(&"Commander was found in mainboard and removed: Leader".to_string()));
    }

    #[test]
    fn test_lands_are_never_allocated() {
        let (cfg, q) = upgraded();
        let commander = card("Leader", 4.0, &[]);
        let mut land = themed("Gavony Township", 0.0);
        land.type_line = "Land".to_string();
        let ranked = rank_candidates(&cfg, &commander, vec![land, themed("Anthem", 3.0)]);
        let result = allocate(&cfg, &q, &ranked);
        assert_eq!(names(&result.selected), vec!["Anthem".to_string()]);
    }
}
