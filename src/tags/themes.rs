/// Keyword table for requested themes. A theme matches when any keyword appears.
const THEME_KEYWORDS: &[(&str, &[&str])] = &[
    ("lifegain", &["gain life"]),
    (
        "punish_lifegain",
        &["whenever an opponent gains life", "if an opponent would gain life"],
    ),
    (
        "group_hug",
        &["each player draws", "each player may", "each opponent may", "for each player"],
    ),
    ("tokens", &["create", "token"]),
    ("graveyard", &["from your graveyard", "return target", "mill"]),
    ("spellslinger", &["instant or sorcery", "whenever you cast"]),
];

/// Keywords for a theme, None when the theme is unknown
pub fn theme_keywords(theme: &str) -> Option<&'static [&'static str]> {
    let theme = theme.trim();
    THEME_KEYWORDS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(theme))
        .map(|(_, keywords)| *keywords)
}

/// Names of every theme with a keyword table
pub fn known_themes() -> impl Iterator<Item = &'static str> {
    THEME_KEYWORDS.iter().map(|(name, _)| *name)
}

/// Tag the requested themes whose keywords appear in the oracle text.
/// Unknown theme names are skipped.
pub fn classify_themes<S: AsRef<str>>(oracle_text: &str, requested: &[S]) -> Vec<String> {
    let lower = oracle_text.to_lowercase();
    let mut tags: Vec<String> = Vec::new();

    for theme in requested {
        let theme = theme.as_ref().trim().to_lowercase();
        let Some(keywords) = theme_keywords(&theme) else {
            continue;
        };
        if keywords.iter().any(|k| lower.contains(k)) && !tags.contains(&theme) {
            tags.push(theme);
        }
    }

    tags
}
