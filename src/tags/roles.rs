//! Role classification from oracle text.
//!
//! Classification runs as a two-stage pipeline. Stage one masks every
//! "when/whenever you draw ..." clause: those are payoff triggers, not sources
//! of cards. Stage two pattern-matches the masked text. Keeping the stages
//! apart is what makes the payoff-before-draw precedence auditable.

use crate::card::types::{is_instant_or_sorcery, Card, CardRole, RoleSet};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static DRAW_PAYOFF_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(when|whenever)\s+you\s+draw\b[^.\n]*[.\n]?").expect("valid regex")
});

static DRAW_INSTRUCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdraw\b[^.\n]{0,60}\bcards?\b").expect("valid regex"));

static REPLACEMENT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bif\s+you\s+would\s*$").expect("valid regex"));

static TAP_FOR_MANA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{T\}:\s*Add\b").expect("valid regex"));

static LIBRARY_SEARCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)search your library for").expect("valid regex"));

// Applied to the lower-cased remainder of a "search your library for" clause.
static LAND_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:a|an|one|two|three|four|x|\d+|up to (?:one|two|three|four|x|\d+))?\s*(?:basic\s+)?(?:land|forest|plains|island|swamp|mountain)",
    )
    .expect("valid regex")
});

static BIG_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)create (?:a|an) (\d+)/(\d+)").expect("valid regex"));

static TEAM_ANTHEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)creatures you control get \+(\d+)/\+(\d+)").expect("valid regex")
});

static SACRIFICE_TO_DRAW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsacrifice\b[^.\n]*\bdraw\b").expect("valid regex"));

static ZONE_CHANGE_DRAW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(enters|dies|leaves the battlefield)\b[^.\n]*\bdraw\b").expect("valid regex")
});

static ACTIVATED_DRAW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i):\s*Draw\b").expect("valid regex"));

static TRIGGER_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(when|whenever)\b").expect("valid regex"));

static YOU_DRAW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\byou\s+draw\b").expect("valid regex"));

static DRAW_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdraw\b").expect("valid regex"));

// "Draw a card for each creature you control" scales, so it is never a cantrip
static VARIABLE_DRAW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bdraw\b[^.\n]*\bcards?\s+for\s+(?:each|every)\b").expect("valid regex")
});

static TURN_CYCLE_DRAW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bat the beginning\b[^.\n]{0,120}\bdraw\b").expect("valid regex")
});

/// Finishers that rarely say "win the game" in their own text
const NAMED_WINCONS: &[&str] = &[
    "Approach of the Second Sun",
    "Thassa's Oracle",
    "Laboratory Maniac",
    "Jace, Wielder of Mysteries",
    "Revel in Riches",
    "Felidar Sovereign",
    "Test of Endurance",
];

const WIN_LOSS_PHRASES: &[&str] = &[
    "you win the game",
    "target player loses the game",
    "each opponent loses the game",
];

const TEAM_EVASION_PHRASES: &[&str] = &[
    "can't be blocked",
    "have flying",
    "have trample",
    "have menace",
    "double strike",
];

// Quantity words that make a draw more than a single card
const MULTI_DRAW_PHRASES: &[&str] = &[
    "draw two",
    "draw three",
    "draw four",
    "draw five",
    "draw six",
    "draw seven",
    "draw x",
    "draw that many",
    "draw cards equal",
    "each player draws",
];

/// Lower-cased substring test
fn contains_ci(haystack_lower: &str, needle: &str) -> bool {
    haystack_lower.contains(&needle.to_lowercase())
}

fn contains_any(haystack_lower: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| contains_ci(haystack_lower, n))
}

/// Stage one: drop "when/whenever you draw ..." clauses up to the end of their sentence.
/// Returns the masked text and whether any clause was found.
pub fn mask_draw_payoffs(text: &str) -> (Cow<'_, str>, bool) {
    if !DRAW_PAYOFF_CLAUSE.is_match(text) {
        return (Cow::Borrowed(text), false);
    }
    (DRAW_PAYOFF_CLAUSE.replace_all(text, ""), true)
}

/// Stage two draw scan. Expects already-masked text.
pub fn has_draw_instruction(masked: &str) -> bool {
    if masked.trim().is_empty() {
        return false;
    }
    let lower = masked.to_lowercase();

    // Impulse draw
    if lower.contains("exile the top") && lower.contains("you may play") {
        return true;
    }

    DRAW_INSTRUCTION.find_iter(masked).any(|m| {
        let prefix = &masked[..m.start()];
        // "If you would draw a card, draw two instead" only amplifies other draws
        !REPLACEMENT_PREFIX.is_match(prefix)
    })
}

/// True when the masked text tells every player (or every opponent) to draw
pub fn has_group_draw(masked: &str) -> bool {
    let lower = masked.to_lowercase();
    lower.contains("each player draws") || lower.contains("each opponent draws")
}

fn is_land_search(rest_of_clause: &str) -> bool {
    LAND_TARGET.is_match(&rest_of_clause.to_lowercase())
}

/// Returns (searches for lands, searches for anything else)
fn library_searches(text: &str) -> (bool, bool) {
    let mut land = false;
    let mut other = false;
    for m in LIBRARY_SEARCH.find_iter(text) {
        if is_land_search(&text[m.end()..]) {
            land = true;
        } else {
            other = true;
        }
    }
    (land, other)
}

fn is_wincon_text(lower: &str, name: &str) -> bool {
    if contains_any(lower, WIN_LOSS_PHRASES) {
        return true;
    }
    if NAMED_WINCONS.iter().any(|n| n.eq_ignore_ascii_case(name.trim())) {
        return true;
    }
    if let Some(caps) = BIG_TOKEN.captures(lower) {
        let power: u32 = caps[1].parse().unwrap_or(0);
        let toughness: u32 = caps[2].parse().unwrap_or(0);
        if power.max(toughness) >= 5 {
            return true;
        }
    }
    if lower.contains("creatures you control") {
        if contains_any(lower, TEAM_EVASION_PHRASES) {
            return true;
        }
        if let Some(caps) = TEAM_ANTHEM.captures(lower) {
            let power: u32 = caps[1].parse().unwrap_or(0);
            let toughness: u32 = caps[2].parse().unwrap_or(0);
            if power >= 2 && toughness >= 2 {
                return true;
            }
        }
    }
    lower.contains("extra turn")
}

/// Classify a card's functional roles from its text. Pure and total.
pub fn classify(oracle_text: &str, type_line: &str, name: &str) -> RoleSet {
    let mut roles = RoleSet::empty();

    // Mana sources are evaluated separately
    if type_line.to_lowercase().contains("land") {
        return roles;
    }

    let lower = oracle_text.to_lowercase();
    let (land_search, other_search) = library_searches(oracle_text);

    if TAP_FOR_MANA.is_match(oracle_text) || land_search {
        roles.insert(CardRole::Ramp);
    }

    let (masked, had_payoff) = mask_draw_payoffs(oracle_text);
    if had_payoff {
        roles.insert(CardRole::Payoff);
    }
    if has_draw_instruction(&masked) {
        roles.insert(CardRole::Draw);
    }
    if has_group_draw(&masked) {
        roles.insert(CardRole::Draw);
        roles.insert(CardRole::GroupDraw);
    }

    if contains_any(&lower, &["destroy target", "exile target", "counter target"]) {
        roles.insert(CardRole::Removal);
    }

    if contains_any(&lower, &["destroy all", "exile all"]) {
        roles.insert(CardRole::Wipe);
    }

    // Graveyard recursion counts as protection. Coarse on purpose.
    if contains_any(&lower, &["hexproof", "indestructible", "phase out"])
        || (lower.contains("return") && lower.contains("from your graveyard"))
    {
        roles.insert(CardRole::Protection);
    }

    if other_search {
        roles.insert(CardRole::Tutor);
    }

    if is_wincon_text(&lower, name) {
        roles.insert(CardRole::WinCon);
    }

    apply_cantrip_rule(roles, &masked, type_line)
}

/// Post-pass: a single plain draw on an instant or sorcery is a cantrip.
pub fn apply_cantrip_rule(mut roles: RoleSet, oracle_text: &str, type_line: &str) -> RoleSet {
    if !roles.contains(CardRole::Draw)
        || roles.contains(CardRole::Cantrip)
        || roles.contains(CardRole::GroupDraw)
    {
        return roles;
    }
    if !is_instant_or_sorcery(type_line) {
        return roles;
    }

    let lower = oracle_text.to_lowercase();
    if lower.contains("draw a card")
        && !contains_any(&lower, MULTI_DRAW_PHRASES)
        && !VARIABLE_DRAW.is_match(&lower)
    {
        roles.insert(CardRole::Cantrip);
    }
    roles
}

/// Repeatable or ongoing personal draw on a permanent.
/// Used by deck evaluation only; selection uses [`Card::is_personal_draw`].
pub fn is_draw_engine(card: &Card) -> bool {
    if !card.is_personal_draw() || card.is_land() || card.is_instant_or_sorcery() {
        return false;
    }

    let o = card.oracle_text.as_str();

    // One-shot draws: sacrifice outlets and enters/dies/leaves triggers
    if SACRIFICE_TO_DRAW.is_match(o) || ZONE_CHANGE_DRAW.is_match(o) {
        return false;
    }

    if ACTIVATED_DRAW.is_match(o) {
        return true;
    }

    if o.to_lowercase().contains("if you would draw") {
        return true;
    }

    if has_non_payoff_draw_trigger(o) {
        return true;
    }

    TURN_CYCLE_DRAW.is_match(o)
}

/// Everything with personal draw that is not an engine
pub fn is_draw_spell(card: &Card) -> bool {
    card.is_personal_draw() && !is_draw_engine(card)
}

/// A "when/whenever" trigger that draws within 160 characters of the same
/// sentence, where the trigger itself is not keyed to you drawing.
fn has_non_payoff_draw_trigger(text: &str) -> bool {
    TRIGGER_WORD.find_iter(text).any(|m| {
        let rest = &text[m.end()..];
        let sentence_end = rest.find(['.', '\n']).unwrap_or(rest.len());
        let sentence = &rest[..sentence_end];
        if YOU_DRAW.is_match(sentence) {
            return false;
        }
        let window = truncate_on_char_boundary(sentence, 160 + "draw".len());
        DRAW_WORD.is_match(window)
    })
}

fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
