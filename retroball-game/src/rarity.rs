//! Rarity tiers shared by cards, packs and drafted players.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::player::ParseError;

/// Ordered card/player tier. Declaration order is rank order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "camelCase")]
pub enum Rarity {
    #[default]
    Common,
    Bronze,
    Silver,
    Gold,
    Diamond,
    BlackDiamond,
}

impl Rarity {
    pub const ALL: [Self; 6] = [
        Self::Common,
        Self::Bronze,
        Self::Silver,
        Self::Gold,
        Self::Diamond,
        Self::BlackDiamond,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Diamond => "diamond",
            Self::BlackDiamond => "blackDiamond",
        }
    }

    /// Zero-based rank, `common == 0`.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Rank lookup that saturates at the top tier.
    #[must_use]
    pub const fn from_index_saturating(index: usize) -> Self {
        if index >= Self::ALL.len() {
            Self::BlackDiamond
        } else {
            Self::ALL[index]
        }
    }

    /// Move `steps` ranks up, capped at `blackDiamond`.
    #[must_use]
    pub const fn step_up(self, steps: usize) -> Self {
        Self::from_index_saturating(self.index().saturating_add(steps))
    }

    /// Every rank at or below `self`, lowest first.
    #[must_use]
    pub fn at_or_below(self) -> &'static [Self] {
        static ORDER: [Rarity; 6] = Rarity::ALL;
        &ORDER[..=self.index()]
    }

    /// Stat boost carried by perk and upgrade cards of this rarity.
    #[must_use]
    pub const fn boost_amount(self) -> i32 {
        match self {
            Self::Common => 1,
            Self::Bronze => 2,
            Self::Silver => 3,
            Self::Gold => 4,
            Self::Diamond => 5,
            Self::BlackDiamond => 6,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|rarity| rarity.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::Rarity(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_strictly_ordered() {
        for pair in Rarity::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(Rarity::Gold.index(), 3);
    }

    #[test]
    fn step_up_saturates_at_black_diamond() {
        assert_eq!(Rarity::Silver.step_up(1), Rarity::Gold);
        assert_eq!(Rarity::Diamond.step_up(2), Rarity::BlackDiamond);
        assert_eq!(Rarity::BlackDiamond.step_up(3), Rarity::BlackDiamond);
    }

    #[test]
    fn at_or_below_includes_self() {
        assert_eq!(
            Rarity::Bronze.at_or_below(),
            &[Rarity::Common, Rarity::Bronze]
        );
        assert_eq!(Rarity::BlackDiamond.at_or_below().len(), 6);
    }

    #[test]
    fn parses_camel_case_tokens() {
        assert_eq!("blackDiamond".parse::<Rarity>(), Ok(Rarity::BlackDiamond));
        assert_eq!(" GOLD ".parse::<Rarity>(), Ok(Rarity::Gold));
        assert!("mythic".parse::<Rarity>().is_err());
    }

    #[test]
    fn serde_uses_camel_case() {
        let json = serde_json::to_string(&Rarity::BlackDiamond).unwrap();
        assert_eq!(json, "\"blackDiamond\"");
    }
}
