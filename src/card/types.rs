use serde::{Deserialize, Serialize};
use std::fmt;

/// The five colors a color identity is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ManaColor {
    #[serde(rename = "W")]
    White,
    #[serde(rename = "U")]
    Blue,
    #[serde(rename = "B")]
    Black,
    #[serde(rename = "R")]
    Red,
    #[serde(rename = "G")]
    Green,
}

impl ManaColor {
    pub const ALL: [ManaColor; 5] = [
        ManaColor::White,
        ManaColor::Blue,
        ManaColor::Black,
        ManaColor::Red,
        ManaColor::Green,
    ];

    /// Parse a single-letter symbol ("W", "u", ...). Anything else is None.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim().to_ascii_uppercase().as_str() {
            "W" => Some(ManaColor::White),
            "U" => Some(ManaColor::Blue),
            "B" => Some(ManaColor::Black),
            "R" => Some(ManaColor::Red),
            "G" => Some(ManaColor::Green),
            _ => None,
        }
    }

    /// Convert to the single character representation
    pub fn to_char(&self) -> char {
        match self {
            ManaColor::White => 'W',
            ManaColor::Blue => 'U',
            ManaColor::Black => 'B',
            ManaColor::Red => 'R',
            ManaColor::Green => 'G',
        }
    }

    pub fn basic_land_name(&self) -> &'static str {
        match self {
            ManaColor::White => "Plains",
            ManaColor::Blue => "Island",
            ManaColor::Black => "Swamp",
            ManaColor::Red => "Mountain",
            ManaColor::Green => "Forest",
        }
    }
}

/// Normalize a list of symbols into WUBRG order without duplicates.
/// Unknown symbols are dropped.
pub fn parse_color_identity<S: AsRef<str>>(symbols: &[S]) -> Vec<ManaColor> {
    let mut colors: Vec<ManaColor> = symbols
        .iter()
        .filter_map(|s| ManaColor::from_symbol(s.as_ref()))
        .collect();
    colors.sort();
    colors.dedup();
    colors
}

/// Functional role tags derived from card text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardRole {
    Ramp,
    Draw,
    GroupDraw,
    Cantrip,
    Removal,
    Wipe,
    Protection,
    Tutor,
    Payoff,
    WinCon,
    NarrowHate,
}

impl CardRole {
    pub const ALL: [CardRole; 11] = [
        CardRole::Ramp,
        CardRole::Draw,
        CardRole::GroupDraw,
        CardRole::Cantrip,
        CardRole::Removal,
        CardRole::Wipe,
        CardRole::Protection,
        CardRole::Tutor,
        CardRole::Payoff,
        CardRole::WinCon,
        CardRole::NarrowHate,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for CardRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Set of roles held by one card. Roles are not exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<CardRole>", into = "Vec<CardRole>")]
pub struct RoleSet(u16);

impl RoleSet {
    pub const fn empty() -> Self {
        RoleSet(0)
    }

    pub fn insert(&mut self, role: CardRole) {
        self.0 |= role.bit();
    }

    pub fn remove(&mut self, role: CardRole) {
        self.0 &= !role.bit();
    }

    pub fn contains(&self, role: CardRole) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Roles in vocabulary order
    pub fn iter(&self) -> impl Iterator<Item = CardRole> + '_ {
        CardRole::ALL.into_iter().filter(|r| self.contains(*r))
    }
}

impl FromIterator<CardRole> for RoleSet {
    fn from_iter<I: IntoIterator<Item = CardRole>>(iter: I) -> Self {
        let mut set = RoleSet::empty();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

impl From<Vec<CardRole>> for RoleSet {
    fn from(roles: Vec<CardRole>) -> Self {
        roles.into_iter().collect()
    }
}

impl From<RoleSet> for Vec<CardRole> {
    fn from(set: RoleSet) -> Self {
        set.iter().collect()
    }
}

/// A normalized, classified card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub oracle_text: String,
    pub type_line: String,
    pub mana_value: f64,
    pub color_identity: Vec<ManaColor>,
    pub commander_eligible: bool,
    pub price_usd: Option<f64>,
    pub roles: RoleSet,
    pub themes: Vec<String>,
}

impl Card {
    /// Stub for a basic land. Basics are never looked up, so supply is unlimited.
    pub fn basic_land(name: &str) -> Self {
        Card {
            id: format!("basic:{}", name.to_lowercase()),
            name: name.to_string(),
            oracle_text: String::new(),
            type_line: "Basic Land".to_string(),
            mana_value: 0.0,
            color_identity: Vec::new(),
            commander_eligible: false,
            price_usd: Some(0.0),
            roles: RoleSet::empty(),
            themes: Vec::new(),
        }
    }

    /// Case-insensitive identity used for singleton checks
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn is_land(&self) -> bool {
        self.type_line.to_lowercase().contains("land")
    }

    pub fn is_basic_land(&self) -> bool {
        let t = self.type_line.to_lowercase();
        t.contains("basic") && t.contains("land")
    }

    pub fn is_instant_or_sorcery(&self) -> bool {
        is_instant_or_sorcery(&self.type_line)
    }

    pub fn has_role(&self, role: CardRole) -> bool {
        self.roles.contains(role)
    }

    pub fn has_themes(&self) -> bool {
        !self.themes.is_empty()
    }

    /// The selection-side notion of a draw engine: personal, repeatable-looking draw
    pub fn is_personal_draw(&self) -> bool {
        self.has_role(CardRole::Draw)
            && !self.has_role(CardRole::GroupDraw)
            && !self.has_role(CardRole::Cantrip)
    }

    /// Every symbol of this card's identity also appears in `identity`
    pub fn fits_identity(&self, identity: &[ManaColor]) -> bool {
        self.color_identity.iter().all(|c| identity.contains(c))
    }

    pub fn same_name(&self, other: &Card) -> bool {
        self.key() == other.key()
    }
}

pub fn is_instant_or_sorcery(type_line: &str) -> bool {
    let t = type_line.to_lowercase();
    t.contains("instant") || t.contains("sorcery")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_set_is_multi_valued() {
        let mut roles = RoleSet::empty();
        roles.insert(CardRole::Draw);
        roles.insert(CardRole::Cantrip);
        roles.insert(CardRole::Removal);

        assert!(roles.contains(CardRole::Draw));
        assert!(roles.contains(CardRole::Cantrip));
        assert!(!roles.contains(CardRole::Ramp));
        assert_eq!(roles.len(), 3);

        roles.remove(CardRole::Cantrip);
        assert!(!roles.contains(CardRole::Cantrip));
        assert_eq!(
            roles.iter().collect::<Vec<_>>(),
            vec![CardRole::Draw, CardRole::Removal]
        );
    }

    #[test]
    fn test_role_set_serializes_as_names() {
        let roles: RoleSet = [CardRole::Ramp, CardRole::WinCon].into_iter().collect();
        let json = serde_json::to_string(&roles).unwrap();
        assert_eq!(json, r#"["Ramp","WinCon"]"#);

        let back: RoleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, roles);
    }

    #[test]
    fn test_parse_color_identity_orders_and_filters() {
        let ci = parse_color_identity(&["G", "w", "X", "G", "U"]);
        assert_eq!(ci, vec![ManaColor::White, ManaColor::Blue, ManaColor::Green]);
    }

    #[test]
    fn test_land_detection() {
        let forest = Card::basic_land("Forest");
        assert!(forest.is_land());
        assert!(forest.is_basic_land());

        let mut tower = Card::basic_land("Command Tower");
        tower.type_line = "Land".to_string();
        assert!(tower.is_land());
        assert!(!tower.is_basic_land());
    }

    #[test]
    fn test_fits_identity() {
        let mut card = Card::basic_land("Signet");
        card.type_line = "Artifact".to_string();
        card.color_identity = vec![ManaColor::Blue, ManaColor::Black];

        assert!(card.fits_identity(&[ManaColor::Blue, ManaColor::Black, ManaColor::Green]));
        assert!(!card.fits_identity(&[ManaColor::Blue]));
    }
}
