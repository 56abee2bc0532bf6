//! Text and JSON renderers for build and evaluation results.

use crate::build::DeckResult;
use crate::card::{Card, CardRole};
use crate::eval::DeckEvaluation;
use crate::tags::{is_draw_engine, is_draw_spell};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

struct Bucket {
    key: &'static str,
    title: &'static str,
    matches: fn(&Card) -> bool,
}

const BUCKETS: [Bucket; 12] = [
    Bucket { key: "lands", title: "Lands", matches: |c| c.is_land() },
    Bucket { key: "ramp", title: "Ramp", matches: |c| c.has_role(CardRole::Ramp) },
    Bucket { key: "draw_engines", title: "Draw Engines", matches: is_draw_engine },
    Bucket { key: "draw_spells", title: "Draw Spells", matches: is_draw_spell },
    Bucket { key: "cantrips", title: "Cantrips", matches: |c| c.has_role(CardRole::Cantrip) },
    Bucket { key: "group_draw", title: "Group Draw", matches: |c| c.has_role(CardRole::GroupDraw) },
    Bucket { key: "removal", title: "Removal", matches: |c| c.has_role(CardRole::Removal) },
    Bucket { key: "wipes", title: "Board Wipes", matches: |c| c.has_role(CardRole::Wipe) },
    Bucket { key: "protection", title: "Protection", matches: |c| c.has_role(CardRole::Protection) },
    Bucket { key: "tutors", title: "Tutors", matches: |c| c.has_role(CardRole::Tutor) },
    Bucket { key: "payoffs", title: "Payoffs", matches: |c| c.has_role(CardRole::Payoff) },
    Bucket { key: "wincons", title: "Wincons", matches: |c| c.has_role(CardRole::WinCon) },
];

/// (display name, copies, first copy), ordered by lower-cased name
fn group_by_name<'a, I>(cards: I) -> Vec<(&'a str, usize, &'a Card)>
where
    I: IntoIterator<Item = &'a Card>,
{
    let mut groups: BTreeMap<String, (&'a str, usize, &'a Card)> = BTreeMap::new();
    for card in cards {
        groups
            .entry(card.key())
            .and_modify(|g| g.1 += 1)
            .or_insert((card.name.as_str(), 1, card));
    }
    groups.into_values().collect()
}

fn copies_suffix(count: usize) -> String {
    if count > 1 {
        format!(" x{}", count)
    } else {
        String::new()
    }
}

pub fn normalize_bucket_key(s: &str) -> String {
    s.trim().to_lowercase().replace(['-', ' '], "_")
}

pub fn write_build_report(deck: &DeckResult) -> String {
    let r = &deck.report;
    let mut lines = vec![
        format!("Commander: {}", deck.commander.name),
        "Cards: 100 (Commander + 99)".to_string(),
        format!("Power: {}", deck.config.power),
        String::new(),
        "Breakdown:".to_string(),
        format!("  Lands:         {}", r.lands),
        format!("  Ramp:          {}", r.ramp),
        format!("  Draw (total):  {}", r.draw_total),
        format!("    - Engines:   {}", r.draw_personal),
        format!("    - Cantrips:  {}", r.cantrips),
        format!("    - Group:     {}", r.draw_group),
        format!("  Removal:       {}", r.removal),
        format!("  Wipes:         {}", r.wipes),
        format!("  Protection:    {}", r.protection),
        format!("  Tutors:        {}", r.tutors),
        format!("  Payoffs:       {}", r.payoffs),
        format!("  Avg MV:        {:.2}", r.avg_mana_value),
    ];
    if let Some(usd) = r.estimated_usd {
        lines.push(format!("  Est. USD:      {:.2}", usd));
    }

    if !deck.warnings.is_empty() {
        lines.push(String::new());
        lines.push("Warnings:".to_string());
        lines.extend(deck.warnings.iter().map(|w| format!("  - {}", w)));
    }

    lines.join("\n")
}

pub fn write_eval_report(eval: &DeckEvaluation) -> String {
    let r = &eval.report;
    let sim = &eval.simulation;
    let mut lines = vec![
        format!("Commander: {}", eval.commander.name),
        format!("Score: {}/100", eval.score),
        format!("Avg MV (nonlands): {:.2}", r.avg_mana_value),
        String::new(),
        "Breakdown:".to_string(),
        format!("  Lands:         {}", r.lands),
        format!("  Ramp:          {}", r.ramp),
        format!("  Draw (total):  {}", r.draw_total),
        format!("    - Engines:   {}", r.draw_engines),
        format!("    - Spells:    {}", r.draw_spells),
        format!("    - Cantrips:  {}", r.cantrips),
        format!("    - Group:     {}", r.draw_group),
        format!("  Removal:       {}", r.removal),
        format!("  Wipes:         {}", r.wipes),
        format!("  Protection:    {}", r.protection),
        format!("  Tutors:        {}", r.tutors),
        format!("  Payoffs:       {}", r.payoffs),
        format!("  Wincons:       {}", r.wincons),
        String::new(),
        format!("Opening Hand / Land Drops ({} simulated shuffles):", sim.trials),
        format!("  Keepable 7:               {:.1}%", sim.keepable_7_pct),
        format!("  Keepable 6:               {:.1}%", sim.keepable_6_pct),
        format!("  2+ lands in opening 7:    {:.1}%", sim.at_least_2_lands_in_7_pct),
        format!("  Hit 3rd land by T3 (OTP): {:.1}%", sim.hit_3rd_land_by_turn_3_on_play_pct),
        String::new(),
        "Suggestions:".to_string(),
    ];

    if eval.suggestions.is_empty() {
        lines.push("  (none) Looks structurally sound.".to_string());
    } else {
        lines.extend(
            eval.suggestions
                .iter()
                .map(|s| format!("  - [{}] ({}) {}", s.category, s.severity, s.message)),
        );
    }

    lines.join("\n")
}

/// Cards behind each category count, optionally limited to some bucket keys
/// (`lands`, `draw_engines`, `wincons`, ...). Unknown keys are reported and ignored.
pub fn write_category_cards(eval: &DeckEvaluation, filter: &[String]) -> String {
    let wanted: BTreeSet<String> = filter
        .iter()
        .map(|s| normalize_bucket_key(s))
        .filter(|s| !s.is_empty())
        .collect();
    let known: BTreeSet<&str> = BUCKETS.iter().map(|b| b.key).collect();
    let include_all = wanted.is_empty();

    let mut header = "Cards counted per category:".to_string();
    if !include_all {
        let shown: Vec<&str> = wanted
            .iter()
            .map(String::as_str)
            .filter(|k| known.contains(k))
            .collect();
        header.push_str(&format!(" (filtered: {})", shown.join(", ")));
    }
    let mut lines = vec![header];

    let unknown: Vec<&str> = wanted
        .iter()
        .map(String::as_str)
        .filter(|k| !known.contains(k))
        .collect();
    if !unknown.is_empty() {
        lines.push(format!("(ignored unknown buckets: {})", unknown.join(", ")));
    }

    for bucket in BUCKETS.iter() {
        if !include_all && !wanted.contains(bucket.key) {
            continue;
        }
        let matches: Vec<&Card> = eval.mainboard.iter().filter(|c| (bucket.matches)(c)).collect();
        lines.push(String::new());
        lines.push(format!("{} ({}):", bucket.title, matches.len()));
        if matches.is_empty() {
            lines.push("  (none)".to_string());
            continue;
        }
        for (name, count, _) in group_by_name(matches) {
            lines.push(format!("  - {}{}", name, copies_suffix(count)));
        }
    }

    lines.join("\n")
}

/// Every distinct card with the roles it was tagged with
pub fn write_card_roles(eval: &DeckEvaluation) -> String {
    let mut lines = vec!["Per-card roles (grouped):".to_string()];

    for (name, count, card) in group_by_name(&eval.mainboard) {
        let mut parts: Vec<String> = Vec::new();
        if card.is_land() {
            parts.push("Land".to_string());
        }
        parts.extend(card.roles.iter().map(|r| r.to_string()));
        if is_draw_engine(card) {
            parts.push("DrawEngine".to_string());
        } else if is_draw_spell(card) {
            parts.push("DrawSpell".to_string());
        }

        let roles = if parts.is_empty() {
            "(no roles)".to_string()
        } else {
            parts.join(", ")
        };
        lines.push(format!("- {}{}: {}", name, copies_suffix(count), roles));
    }

    lines.join("\n")
}

/// Importable deck list: a comment header, `1 Commander`, then `N Name`
/// lines in alphabetical order.
pub fn write_deck_list(deck: &DeckResult, generated_at: DateTime<Utc>) -> String {
    let mut lines = vec![
        format!(
            "# {} deck for {}, generated {}",
            deck.config.power,
            deck.commander.name,
            generated_at.to_rfc3339()
        ),
        format!("1 {}", deck.commander.name),
    ];
    let mainboard = deck.mainboard.iter().filter(|c| !c.same_name(&deck.commander));
    for (name, count, _) in group_by_name(mainboard) {
        lines.push(format!("{} {}", count, name));
    }
    lines.join("\n") + "\n"
}

#[derive(Serialize)]
struct Artifact<'a, T: Serialize> {
    generated_at: String,
    #[serde(flatten)]
    body: &'a T,
}

fn to_json<T: Serialize>(body: &T, generated_at: DateTime<Utc>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Artifact {
        generated_at: generated_at.to_rfc3339(),
        body,
    })
}

pub fn write_deck_json(deck: &DeckResult, generated_at: DateTime<Utc>) -> serde_json::Result<String> {
    to_json(deck, generated_at)
}

pub fn write_eval_json(
    eval: &DeckEvaluation,
    generated_at: DateTime<Utc>,
) -> serde_json::Result<String> {
    to_json(eval, generated_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::presets::DECK_SIZE;
    use crate::card::RoleSet;
    use crate::config::DeckConfig;
    use crate::eval::{DeckEvaluator, DeckReport};
    use crate::simulation::parse_commander_and_mainboard;
    use chrono::TimeZone;

    fn card(name: &str, type_line: &str, roles: &[CardRole]) -> Card {
        let mut c = Card::basic_land(name);
        c.type_line = type_line.to_string();
        c.roles = roles.iter().copied().collect::<RoleSet>();
        c
    }

    fn sample_deck() -> DeckResult {
        let mut mainboard = vec![
            card("Sol Ring", "Artifact", &[CardRole::Ramp]),
            card("Swords to Plowshares", "Instant", &[CardRole::Removal]),
        ];
        while mainboard.len() < DECK_SIZE {
            mainboard.push(Card::basic_land("Forest"));
        }
        let report = DeckReport::tally(&mainboard, false);
        DeckResult {
            commander: card("Leader", "Legendary Creature — Elf", &[]),
            mainboard,
            report,
            warnings: vec!["Could not fully satisfy Wipes quota; short by 3.".to_string()],
            config: DeckConfig::default(),
        }
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_build_report_lines() {
        let text = write_build_report(&sample_deck());
        assert!(text.starts_with("Commander: Leader"));
        assert!(text.contains("  Ramp:          1"));
        assert!(text.contains("Warnings:\n  - Could not fully satisfy Wipes quota; short by 3."));
        assert!(!text.contains("Est. USD"));
    }

    #[test]
    fn test_deck_list_round_trips_through_parser() {
        let text = write_deck_list(&sample_deck(), stamp());
        assert!(text.starts_with("# upgraded deck for Leader, generated 2026-01-02T03:04:05+00:00\n1 Leader\n"));
        assert!(text.contains("\n97 Forest\n"));

        let parsed = parse_commander_and_mainboard(&text, None).unwrap();
        assert_eq!(parsed.commander, "Leader");
        assert_eq!(parsed.mainboard.len(), DECK_SIZE);
    }

    #[test]
    fn test_deck_json_has_timestamp_and_fields() {
        let json = write_deck_json(&sample_deck(), stamp()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["generated_at"], "2026-01-02T03:04:05+00:00");
        assert_eq!(value["commander"]["name"], "Leader");
        assert_eq!(value["mainboard"].as_array().unwrap().len(), DECK_SIZE);
        assert_eq!(value["config"]["power"], "upgraded");
        assert_eq!(value["mainboard"][0]["roles"][0], "Ramp");
    }

    fn sample_eval() -> DeckEvaluation {
        let deck = sample_deck();
        DeckEvaluator::new(DeckConfig::default())
            .with_trials(500)
            .evaluate(deck.commander, deck.mainboard)
    }

    #[test]
    fn test_eval_report_and_json() {
        let eval = sample_eval();
        let text = write_eval_report(&eval);
        assert!(text.contains(&format!("Score: {}/100", eval.score)));
        assert!(text.contains("Opening Hand / Land Drops (500 simulated shuffles):"));
        assert!(text.contains("[Draw] (medium)"));

        let json = write_eval_json(&eval, stamp()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["score"], eval.score);
        assert!(value["suggestions"].as_array().unwrap().len() >= 1);
    }

    #[test]
    fn test_category_cards_filter() {
        let eval = sample_eval();
        let text = write_category_cards(&eval, &["Ramp".to_string(), "bogus".to_string()]);
        assert!(text.starts_with("Cards counted per category: (filtered: ramp)"));
        assert!(text.contains("(ignored unknown buckets: bogus)"));
        assert!(text.contains("Ramp (1):\n  - Sol Ring"));
        assert!(!text.contains("Lands ("));

        let all = write_category_cards(&eval, &[]);
        assert!(all.contains("Lands (97):\n  - Forest x97"));
        assert!(all.contains("Tutors (0):\n  (none)"));
    }

    #[test]
    fn test_card_roles_lines() {
        let text = write_card_roles(&sample_eval());
        assert!(text.contains("- Forest x97: Land"));
        assert!(text.contains("- Sol Ring: Ramp"));
        assert!(text.contains("- Swords to Plowshares: Removal"));
        assert!(!text.contains("- Leader"));
    }
}
