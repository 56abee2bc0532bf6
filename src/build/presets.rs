use serde::{Deserialize, Serialize};
use std::fmt;

pub const DECK_SIZE: usize = 99;

/// Power band the quotas are tuned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerLevel {
    Precon,
    Upgraded,
    Optimized,
    CedhAdjacent,
}

impl PowerLevel {
    /// Parse a preset name. Unknown or empty input falls back to `Upgraded`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "precon" => PowerLevel::Precon,
            "optimized" => PowerLevel::Optimized,
            "cedh_adjacent" => PowerLevel::CedhAdjacent,
            _ => PowerLevel::Upgraded,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerLevel::Precon => "precon",
            PowerLevel::Upgraded => "upgraded",
            PowerLevel::Optimized => "optimized",
            PowerLevel::CedhAdjacent => "cedh_adjacent",
        }
    }
}

impl fmt::Display for PowerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composition targets and soft caps for one power band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quotas {
    pub lands: usize,

    pub ramp: usize,
    pub draw_engines: usize,
    pub group_draw: usize,
    pub removal: usize,
    pub wipes: usize,
    pub protection: usize,
    pub payoffs: usize,

    pub tutors_soft_cap: usize,

    // Soft caps keep the fill pass from drowning the deck in one category
    pub ramp_soft_cap: usize,
    pub draw_engines_soft_cap: usize,
    pub group_draw_soft_cap: usize,
    pub cantrips_soft_cap: usize,
    pub removal_soft_cap: usize,
    pub wipes_soft_cap: usize,
    pub protection_soft_cap: usize,

    pub wincons_min: usize,
}

impl Quotas {
    pub fn for_power(power: PowerLevel) -> Self {
        match power {
            PowerLevel::Precon => Quotas {
                lands: 38,
                ramp: 10,
                draw_engines: 6,
                group_draw: 6,
                removal: 8,
                wipes: 3,
                protection: 3,
                payoffs: 18,
                tutors_soft_cap: 2,
                ramp_soft_cap: 14,
                draw_engines_soft_cap: 10,
                group_draw_soft_cap: 10,
                cantrips_soft_cap: 10,
                removal_soft_cap: 11,
                wipes_soft_cap: 4,
                protection_soft_cap: 5,
                wincons_min: 2,
            },
            PowerLevel::Optimized => Quotas {
                lands: 36,
                ramp: 12,
                draw_engines: 8,
                group_draw: 6,
                removal: 12,
                wipes: 3,
                protection: 5,
                payoffs: 22,
                tutors_soft_cap: 6,
                ramp_soft_cap: 16,
                draw_engines_soft_cap: 12,
                group_draw_soft_cap: 10,
                cantrips_soft_cap: 12,
                removal_soft_cap: 15,
                wipes_soft_cap: 4,
                protection_soft_cap: 7,
                wincons_min: 2,
            },
            // cedh_adjacent has no table of its own yet
            PowerLevel::Upgraded | PowerLevel::CedhAdjacent => Quotas {
                lands: 37,
                ramp: 11,
                draw_engines: 7,
                group_draw: 6,
                removal: 10,
                wipes: 3,
                protection: 4,
                payoffs: 20,
                tutors_soft_cap: 4,
                ramp_soft_cap: 15,
                draw_engines_soft_cap: 11,
                group_draw_soft_cap: 10,
                cantrips_soft_cap: 12,
                removal_soft_cap: 13,
                wipes_soft_cap: 4,
                protection_soft_cap: 6,
                wincons_min: 2,
            },
        }
    }

    /// Non-land slots in the 99
    pub fn nonland_target(&self) -> usize {
        DECK_SIZE.saturating_sub(self.lands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_falls_back_to_upgraded() {
        assert_eq!(PowerLevel::parse("precon"), PowerLevel::Precon);
        assert_eq!(PowerLevel::parse(" Optimized "), PowerLevel::Optimized);
        assert_eq!(PowerLevel::parse("cedh-adjacent"), PowerLevel::CedhAdjacent);
        assert_eq!(PowerLevel::parse("casual"), PowerLevel::Upgraded);
        assert_eq!(PowerLevel::parse(""), PowerLevel::Upgraded);
    }

    #[test]
    fn test_presets_are_consistent() {
        for power in [
            PowerLevel::Precon,
            PowerLevel::Upgraded,
            PowerLevel::Optimized,
            PowerLevel::CedhAdjacent,
        ] {
            let q = Quotas::for_power(power);
            assert!(q.ramp <= q.ramp_soft_cap, "{power}: ramp target above cap");
            assert!(q.draw_engines <= q.draw_engines_soft_cap);
            assert!(q.removal <= q.removal_soft_cap);
            assert!(q.wipes <= q.wipes_soft_cap);
            assert!(q.protection <= q.protection_soft_cap);
            assert_eq!(q.lands + q.nonland_target(), DECK_SIZE);
        }
    }

    #[test]
    fn test_upgraded_table() {
        let q = Quotas::for_power(PowerLevel::Upgraded);
        assert_eq!(q.lands, 37);
        assert_eq!(q.nonland_target(), 62);
        assert_eq!((q.ramp, q.ramp_soft_cap), (11, 15));
        assert_eq!((q.removal, q.removal_soft_cap), (10, 13));
        assert_eq!(Quotas::for_power(PowerLevel::CedhAdjacent), q);
    }
}
