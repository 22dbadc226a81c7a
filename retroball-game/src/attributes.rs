//! Attribute model: base ratings, perk overlays, effective values and overall.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{FALLBACK_PITCH_RATING, NEUTRAL_RATING, RATING_MAX};
use crate::numbers::{clamp_rating, floor_f64_to_i32, usize_to_f64};
use crate::player::{ParseError, PitchType, PlayerRecord, Position};

/// One of the nine numeric player capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Velocity,
    Movement,
    Control,
    Stamina,
    Contact,
    Power,
    Eye,
    Speed,
    Fielding,
}

impl Attribute {
    pub const ALL: [Self; 9] = [
        Self::Velocity,
        Self::Movement,
        Self::Control,
        Self::Stamina,
        Self::Contact,
        Self::Power,
        Self::Eye,
        Self::Speed,
        Self::Fielding,
    ];

    pub const PITCHING: [Self; 4] = [Self::Velocity, Self::Movement, Self::Control, Self::Stamina];

    pub const HITTING: [Self; 5] = [
        Self::Contact,
        Self::Power,
        Self::Eye,
        Self::Speed,
        Self::Fielding,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Velocity => "velocity",
            Self::Movement => "movement",
            Self::Control => "control",
            Self::Stamina => "stamina",
            Self::Contact => "contact",
            Self::Power => "power",
            Self::Eye => "eye",
            Self::Speed => "speed",
            Self::Fielding => "fielding",
        }
    }

    /// Attribute subset that feeds the overall rating for `position`.
    #[must_use]
    pub const fn rated_for(position: Position) -> &'static [Self] {
        if position.is_pitcher() {
            &Self::PITCHING
        } else {
            &Self::HITTING
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|attr| attr.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::Attribute(s.to_string()))
    }
}

const fn neutral_rating() -> i32 {
    NEUTRAL_RATING
}

/// Base attribute values. Fields missing from serialized records load as the
/// neutral rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default = "neutral_rating")]
    pub velocity: i32,
    #[serde(default = "neutral_rating")]
    pub movement: i32,
    #[serde(default = "neutral_rating")]
    pub control: i32,
    #[serde(default = "neutral_rating")]
    pub stamina: i32,
    #[serde(default = "neutral_rating")]
    pub contact: i32,
    #[serde(default = "neutral_rating")]
    pub power: i32,
    #[serde(default = "neutral_rating")]
    pub eye: i32,
    #[serde(default = "neutral_rating")]
    pub speed: i32,
    #[serde(default = "neutral_rating")]
    pub fielding: i32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self::uniform(NEUTRAL_RATING)
    }
}

impl Attributes {
    /// Every attribute set to the same (clamped) value.
    #[must_use]
    pub const fn uniform(value: i32) -> Self {
        let v = clamp_rating(value);
        Self {
            velocity: v,
            movement: v,
            control: v,
            stamina: v,
            contact: v,
            power: v,
            eye: v,
            speed: v,
            fielding: v,
        }
    }

    #[must_use]
    pub const fn get(&self, attr: Attribute) -> i32 {
        match attr {
            Attribute::Velocity => self.velocity,
            Attribute::Movement => self.movement,
            Attribute::Control => self.control,
            Attribute::Stamina => self.stamina,
            Attribute::Contact => self.contact,
            Attribute::Power => self.power,
            Attribute::Eye => self.eye,
            Attribute::Speed => self.speed,
            Attribute::Fielding => self.fielding,
        }
    }

    /// Store a value, clamped to the rating window.
    pub const fn set(&mut self, attr: Attribute, value: i32) {
        *self.slot_mut(attr) = clamp_rating(value);
    }

    const fn slot_mut(&mut self, attr: Attribute) -> &mut i32 {
        match attr {
            Attribute::Velocity => &mut self.velocity,
            Attribute::Movement => &mut self.movement,
            Attribute::Control => &mut self.control,
            Attribute::Stamina => &mut self.stamina,
            Attribute::Contact => &mut self.contact,
            Attribute::Power => &mut self.power,
            Attribute::Eye => &mut self.eye,
            Attribute::Speed => &mut self.speed,
            Attribute::Fielding => &mut self.fielding,
        }
    }

    pub fn clamp_all(&mut self) {
        for attr in Attribute::ALL {
            let value = self.get(attr);
            self.set(attr, value);
        }
    }

    #[must_use]
    pub fn sum(&self, attrs: &[Attribute]) -> i32 {
        attrs.iter().map(|attr| self.get(*attr)).sum()
    }
}

/// Additive perk bonuses keyed by attribute. Bonuses are never negative and
/// never push base + bonus past the rating ceiling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerkOverlay(BTreeMap<Attribute, i32>);

impl PerkOverlay {
    /// Overlay with an explicit zero entry for every attribute.
    #[must_use]
    pub fn zeroed() -> Self {
        Self(Attribute::ALL.iter().map(|attr| (*attr, 0)).collect())
    }

    #[must_use]
    pub fn bonus(&self, attr: Attribute) -> i32 {
        self.0.get(&attr).copied().unwrap_or(0)
    }

    fn add(&mut self, attr: Attribute, amount: i32) {
        *self.0.entry(attr).or_insert(0) += amount;
    }

    /// Re-establish the overlay invariants against the given base values.
    pub fn cap_against(&mut self, base: &Attributes) {
        for (attr, bonus) in &mut self.0 {
            let room = (RATING_MAX - base.get(*attr)).max(0);
            *bonus = (*bonus).clamp(0, room);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, i32)> + '_ {
        self.0.iter().map(|(attr, bonus)| (*attr, *bonus))
    }
}

/// Room left before base + overlay reaches the ceiling.
#[must_use]
pub fn headroom(player: &PlayerRecord, attr: Attribute) -> i32 {
    (RATING_MAX - player.attributes.get(attr) - player.perks_applied.bonus(attr)).max(0)
}

/// Base plus perk overlay, clamped to `[1, 99]`.
#[must_use]
pub fn effective_attribute(player: &PlayerRecord, attr: Attribute) -> i32 {
    clamp_rating(player.attributes.get(attr) + player.perks_applied.bonus(attr))
}

/// Rating of `pitch` in the pitcher's arsenal. Pitches the arsenal does not
/// carry rate as neutral; an empty arsenal throws its implicit fastball.
#[must_use]
pub fn effective_pitch_rating(pitcher: &PlayerRecord, pitch: PitchType) -> i32 {
    if pitcher.pitches.is_empty() {
        return if pitch == PitchType::Fastball {
            FALLBACK_PITCH_RATING
        } else {
            NEUTRAL_RATING
        };
    }
    clamp_rating(pitcher.pitches.rating(pitch).unwrap_or(NEUTRAL_RATING))
}

/// Overall for a position from base values alone, floored.
#[must_use]
pub fn overall_for(position: Position, attributes: &Attributes) -> i32 {
    let rated = Attribute::rated_for(position);
    let total = f64::from(attributes.sum(rated));
    floor_f64_to_i32(total / usize_to_f64(rated.len()))
}

#[must_use]
pub fn compute_overall(player: &PlayerRecord) -> i32 {
    overall_for(player.position, &player.attributes)
}

/// Grant a team-wide perk. Each player's overlay grows by at most its
/// remaining headroom; the excess is dropped.
pub fn apply_perk_to_team(players: &mut [PlayerRecord], stat: Attribute, amount: i32) {
    if amount <= 0 {
        return;
    }
    for player in players.iter_mut() {
        let granted = amount.min(headroom(player, stat));
        if granted > 0 {
            player.perks_applied.add(stat, granted);
        }
        player.refresh_overall();
    }
}

/// Permanently raise one player's base attribute, leaving room for the
/// overlay already in place.
pub fn apply_upgrade_to_custom(player: &mut PlayerRecord, stat: Attribute, amount: i32) {
    if amount <= 0 {
        return;
    }
    let granted = amount.min(headroom(player, stat));
    if granted > 0 {
        let base = player.attributes.get(stat);
        player.attributes.set(stat, base + granted);
    }
    player.refresh_overall();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batter(base: i32) -> PlayerRecord {
        let mut player = PlayerRecord::new("pl_test", "Tester", Position::CenterField);
        player.attributes = Attributes::uniform(base);
        player.refresh_overall();
        player
    }

    #[test]
    fn effective_attribute_adds_overlay_and_clamps() {
        let mut player = batter(60);
        apply_perk_to_team(std::slice::from_mut(&mut player), Attribute::Contact, 7);
        assert_eq!(effective_attribute(&player, Attribute::Contact), 67);
        assert_eq!(effective_attribute(&player, Attribute::Power), 60);
    }

    #[test]
    fn overall_uses_position_subset_and_floors() {
        let mut player = batter(50);
        player.attributes.contact = 81;
        player.attributes.velocity = 99;
        // (81 + 50 + 50 + 50 + 50) / 5 = 56.2
        assert_eq!(compute_overall(&player), 56);

        player.position = Position::Pitcher;
        // (99 + 50 + 50 + 50) / 4 = 62.25
        assert_eq!(compute_overall(&player), 62);
    }

    #[test]
    fn perk_truncates_at_ceiling_for_every_player() {
        let mut team = vec![batter(95), batter(40)];
        apply_perk_to_team(&mut team, Attribute::Eye, 6);
        assert_eq!(team[0].perks_applied.bonus(Attribute::Eye), 4);
        assert_eq!(team[1].perks_applied.bonus(Attribute::Eye), 6);

        apply_perk_to_team(&mut team, Attribute::Eye, 6);
        assert_eq!(team[0].perks_applied.bonus(Attribute::Eye), 4);
        assert_eq!(team[1].perks_applied.bonus(Attribute::Eye), 12);
        for player in &team {
            assert!(player.attributes.eye + player.perks_applied.bonus(Attribute::Eye) <= 99);
        }
    }

    #[test]
    fn perk_ignores_non_positive_amounts() {
        let mut team = vec![batter(70)];
        apply_perk_to_team(&mut team, Attribute::Speed, -3);
        assert_eq!(team[0].perks_applied.bonus(Attribute::Speed), 0);
    }

    #[test]
    fn upgrade_raises_base_and_respects_overlay() {
        let mut player = batter(90);
        apply_perk_to_team(std::slice::from_mut(&mut player), Attribute::Power, 5);
        apply_upgrade_to_custom(&mut player, Attribute::Power, 6);
        assert_eq!(player.attributes.power, 94);
        assert_eq!(player.attributes.power + player.perks_applied.bonus(Attribute::Power), 99);
    }

    #[test]
    fn upgrade_recomputes_overall() {
        let mut player = batter(50);
        assert_eq!(player.overall, 50);
        apply_upgrade_to_custom(&mut player, Attribute::Contact, 5);
        apply_upgrade_to_custom(&mut player, Attribute::Power, 5);
        assert_eq!(player.overall, 52);
    }

    #[test]
    fn empty_arsenal_throws_implicit_fastball() {
        let player = batter(50);
        assert!(player.pitches.is_empty());
        assert_eq!(effective_pitch_rating(&player, PitchType::Fastball), 60);
        assert_eq!(effective_pitch_rating(&player, PitchType::Slider), 50);
    }

    #[test]
    fn overlay_cap_against_trims_stale_bonuses() {
        let mut overlay = PerkOverlay::zeroed();
        overlay.add(Attribute::Control, 20);
        overlay.add(Attribute::Speed, -4);
        overlay.cap_against(&Attributes::uniform(90));
        assert_eq!(overlay.bonus(Attribute::Control), 9);
        assert_eq!(overlay.bonus(Attribute::Speed), 0);
    }
}
