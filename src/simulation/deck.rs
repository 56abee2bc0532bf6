use crate::card::{Card, CardDatabase, CardDatabaseError};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid deck format at line {line}: {reason}")]
    InvalidFormat { line: usize, reason: String },
    #[error("Card database error: {0}")]
    DatabaseError(#[from] CardDatabaseError),
}

static COUNT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)x?\s+(.+?)$").expect("valid regex"));

/// Upper bound on a single line's copy count
const MAX_COPIES: usize = 100;

/// A deck list split into its commander and mainboard names.
/// An empty commander name means the list did not say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDeck {
    pub commander: String,
    pub mainboard: Vec<String>,
}

fn starts_with_ci(line: &str, prefix: &str) -> bool {
    line.len() >= prefix.len()
        && line.is_char_boundary(prefix.len())
        && line[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Expand a deck list into card names, one entry per copy.
///
/// Format: "N Card Name" or a bare "Card Name" per line. Blank lines, `#` and
/// `//` comments, and `Commander:` / `Mainboard` headers are skipped; a
/// `Sideboard` line ends the list.
pub fn parse_names(text: &str) -> Result<Vec<String>, DeckError> {
    let mut names = Vec::new();

    for (line_num, raw) in text.lines().enumerate() {
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }
        if starts_with_ci(line, "sideboard") {
            break;
        }
        if starts_with_ci(line, "commander:") || starts_with_ci(line, "mainboard") {
            continue;
        }

        match COUNT_LINE.captures(line) {
            Some(caps) => {
                let count: usize = caps[1].parse().map_err(|_| DeckError::InvalidFormat {
                    line: line_num + 1,
                    reason: format!("'{}' is not a valid number", &caps[1]),
                })?;
                if count > MAX_COPIES {
                    return Err(DeckError::InvalidFormat {
                        line: line_num + 1,
                        reason: format!("{} copies is more than a deck can hold", count),
                    });
                }
                let name = caps[2].trim();
                names.extend(std::iter::repeat(name.to_string()).take(count));
            }
            None => names.push(line.to_string()),
        }
    }

    Ok(names)
}

/// Split a deck list into commander and mainboard.
///
/// An explicit commander wins and one matching copy is dropped from the list.
/// Otherwise a 100 card list is read as commander first; any other size leaves
/// the commander empty for the caller to resolve.
pub fn parse_commander_and_mainboard(
    text: &str,
    commander_override: Option<&str>,
) -> Result<ParsedDeck, DeckError> {
    let mut names = parse_names(text)?;

    if let Some(commander) = commander_override.map(str::trim).filter(|c| !c.is_empty()) {
        if let Some(idx) = names.iter().position(|n| n.eq_ignore_ascii_case(commander)) {
            names.remove(idx);
        }
        return Ok(ParsedDeck {
            commander: commander.to_string(),
            mainboard: names,
        });
    }

    if names.len() == 100 {
        let commander = names.remove(0);
        return Ok(ParsedDeck {
            commander,
            mainboard: names,
        });
    }

    Ok(ParsedDeck {
        commander: String::new(),
        mainboard: names,
    })
}

pub fn parse_deck_file<P: AsRef<Path>>(
    path: P,
    commander_override: Option<&str>,
) -> Result<ParsedDeck, DeckError> {
    let content = std::fs::read_to_string(path)?;
    parse_commander_and_mainboard(&content, commander_override)
}

/// Look every name up in the card data, tagging themes along the way
pub fn resolve_cards<S: AsRef<str>>(
    names: &[String],
    database: &CardDatabase,
    themes: &[S],
) -> Result<Vec<Card>, DeckError> {
    names
        .iter()
        .map(|name| {
            database
                .get_record(name)
                .map(|record| record.to_card(themes))
                .map_err(DeckError::from)
        })
        .collect()
}
