//! Player records shared by the custom player, drafted teammates and the
//! transient per-role clones the field scene spawns.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::attributes::{Attributes, PerkOverlay, compute_overall};
use crate::constants::{PITCH_HISTORY_LEN, STARTING_XP_TO_NEXT_LEVEL};
use crate::numbers::clamp_rating;
use crate::rarity::Rarity;
use crate::shop::Card;

/// Errors raised when text identifiers do not name a known token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown rarity '{0}'")]
    Rarity(String),
    #[error("unknown position '{0}'")]
    Position(String),
    #[error("unknown hand '{0}'")]
    Hand(String),
    #[error("unknown attribute '{0}'")]
    Attribute(String),
    #[error("unknown pitch type '{0}'")]
    Pitch(String),
}

/// Fielding position, plus the transient placeholder roles used by clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Position {
    #[serde(rename = "P")]
    Pitcher,
    #[serde(rename = "C")]
    Catcher,
    #[serde(rename = "1B")]
    FirstBase,
    #[serde(rename = "2B")]
    SecondBase,
    #[serde(rename = "3B")]
    ThirdBase,
    #[serde(rename = "SS")]
    Shortstop,
    #[serde(rename = "LF")]
    LeftField,
    #[default]
    #[serde(rename = "CF")]
    CenterField,
    #[serde(rename = "RF")]
    RightField,
    #[serde(rename = "DH")]
    DesignatedHitter,
    #[serde(rename = "F")]
    Fielder,
    #[serde(rename = "B")]
    Batter,
    #[serde(rename = "R")]
    Runner,
}

impl Position {
    /// Lineup positions a draft can offer.
    pub const ROSTER: [Self; 10] = [
        Self::Pitcher,
        Self::Catcher,
        Self::FirstBase,
        Self::SecondBase,
        Self::ThirdBase,
        Self::Shortstop,
        Self::LeftField,
        Self::CenterField,
        Self::RightField,
        Self::DesignatedHitter,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pitcher => "P",
            Self::Catcher => "C",
            Self::FirstBase => "1B",
            Self::SecondBase => "2B",
            Self::ThirdBase => "3B",
            Self::Shortstop => "SS",
            Self::LeftField => "LF",
            Self::CenterField => "CF",
            Self::RightField => "RF",
            Self::DesignatedHitter => "DH",
            Self::Fielder => "F",
            Self::Batter => "B",
            Self::Runner => "R",
        }
    }

    #[must_use]
    pub const fn is_pitcher(self) -> bool {
        matches!(self, Self::Pitcher)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Self::ROSTER
            .iter()
            .chain([Self::Fielder, Self::Batter, Self::Runner].iter())
            .copied()
            .find(|position| position.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| ParseError::Position(s.to_string()))
    }
}

/// Role a record is currently playing on the field or in the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Pitcher,
    Batter,
    Fielder,
    Runner,
    Draftee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Hand {
    #[default]
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "L")]
    Left,
}

impl FromStr for Hand {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "R" | "r" => Ok(Self::Right),
            "L" | "l" => Ok(Self::Left),
            _ => Err(ParseError::Hand(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BatHand {
    #[default]
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "S")]
    Switch,
}

impl From<Hand> for BatHand {
    fn from(hand: Hand) -> Self {
        match hand {
            Hand::Right => Self::Right,
            Hand::Left => Self::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchType {
    Fastball,
    Curveball,
    Slider,
    Changeup,
}

impl PitchType {
    pub const ALL: [Self; 4] = [Self::Fastball, Self::Curveball, Self::Slider, Self::Changeup];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fastball => "fastball",
            Self::Curveball => "curveball",
            Self::Slider => "slider",
            Self::Changeup => "changeup",
        }
    }
}

impl fmt::Display for PitchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PitchType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|pitch| pitch.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::Pitch(s.to_string()))
    }
}

/// Pitch ratings keyed by pitch type, iterated in pitch declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PitchArsenal(BTreeMap<PitchType, i32>);

impl PitchArsenal {
    #[must_use]
    pub fn from_ratings(ratings: impl IntoIterator<Item = (PitchType, i32)>) -> Self {
        Self(
            ratings
                .into_iter()
                .map(|(pitch, rating)| (pitch, clamp_rating(rating)))
                .collect(),
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn rating(&self, pitch: PitchType) -> Option<i32> {
        self.0.get(&pitch).copied()
    }

    pub fn set(&mut self, pitch: PitchType, rating: i32) {
        self.0.insert(pitch, clamp_rating(rating));
    }

    pub fn pitches(&self) -> impl Iterator<Item = PitchType> + '_ {
        self.0.keys().copied()
    }

    fn clamp_all(&mut self) {
        for rating in self.0.values_mut() {
            *rating = clamp_rating(*rating);
        }
    }
}

/// The last few pitch types a batter has seen, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PitchHistory(SmallVec<[PitchType; PITCH_HISTORY_LEN]>);

impl PitchHistory {
    /// Record a pitch, evicting the oldest entry once the window is full.
    pub fn record(&mut self, pitch: PitchType) {
        if self.0.len() == PITCH_HISTORY_LEN {
            self.0.remove(0);
        }
        self.0.push(pitch);
    }

    #[must_use]
    pub fn occurrences(&self, pitch: PitchType) -> usize {
        self.0.iter().filter(|seen| **seen == pitch).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[PitchType] {
        &self.0
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Presentation-only fields carried so the scene layer can draw the sprite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cosmetics {
    #[serde(default = "Cosmetics::default_hair")]
    pub hair: String,
    #[serde(default = "Cosmetics::default_facial")]
    pub facial: String,
    #[serde(default = "Cosmetics::default_skin")]
    pub skin: String,
    #[serde(default = "Cosmetics::default_team_color")]
    pub team_color: String,
}

impl Cosmetics {
    fn default_hair() -> String {
        String::from("short")
    }

    fn default_facial() -> String {
        String::from("none")
    }

    fn default_skin() -> String {
        String::from("#f1c27d")
    }

    fn default_team_color() -> String {
        String::from("#2a6dd6")
    }
}

impl Default for Cosmetics {
    fn default() -> Self {
        Self {
            hair: Self::default_hair(),
            facial: Self::default_facial(),
            skin: Self::default_skin(),
            team_color: Self::default_team_color(),
        }
    }
}

const fn default_level() -> u32 {
    1
}

const fn default_xp_to_next_level() -> u32 {
    STARTING_XP_TO_NEXT_LEVEL
}

const fn default_unlocked_max_rarity() -> Rarity {
    Rarity::Bronze
}

/// Central player entity.
///
/// Serialized field names follow the save format the browser build writes.
/// Missing ratings load as neutral; [`PlayerRecord::normalize`] re-clamps
/// everything and recomputes `overall` after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub throw_hand: Hand,
    #[serde(default)]
    pub bat_hand: BatHand,
    /// Legacy single-hand field, kept in sync by [`PlayerRecord::sync_handedness`].
    #[serde(default)]
    pub handedness: Hand,
    #[serde(flatten)]
    pub attributes: Attributes,
    #[serde(default)]
    pub pitches: PitchArsenal,
    #[serde(default)]
    pub perks_applied: PerkOverlay,
    #[serde(default, alias = "collection")]
    pub perks_owned: Vec<Card>,
    #[serde(flatten)]
    pub cosmetics: Cosmetics,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub xp: u32,
    #[serde(default = "default_xp_to_next_level")]
    pub xp_to_next_level: u32,
    #[serde(default)]
    pub currency: i64,
    #[serde(default = "default_unlocked_max_rarity")]
    pub unlocked_max_rarity: Rarity,
    #[serde(default)]
    pub boss_count: u32,
    #[serde(default)]
    pub overall: i32,
    #[serde(skip)]
    pub pitch_history: PitchHistory,
}

impl PlayerRecord {
    /// Neutral record: every rating 50, empty arsenal, zeroed overlay.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: Position) -> Self {
        let mut player = Self {
            id: id.into(),
            name: name.into(),
            position,
            role: None,
            rarity: Rarity::Common,
            throw_hand: Hand::Right,
            bat_hand: BatHand::Right,
            handedness: Hand::Right,
            attributes: Attributes::default(),
            pitches: PitchArsenal::default(),
            perks_applied: PerkOverlay::zeroed(),
            perks_owned: Vec::new(),
            cosmetics: Cosmetics::default(),
            level: default_level(),
            xp: 0,
            xp_to_next_level: default_xp_to_next_level(),
            currency: 0,
            unlocked_max_rarity: default_unlocked_max_rarity(),
            boss_count: 0,
            overall: 0,
            pitch_history: PitchHistory::default(),
        };
        player.refresh_overall();
        player
    }

    /// Recompute the derived overall from base attributes.
    pub fn refresh_overall(&mut self) {
        self.overall = compute_overall(self);
    }

    /// Point the legacy `handedness` field at the hand that matters for the
    /// current position.
    pub fn sync_handedness(&mut self) {
        self.handedness = if self.position.is_pitcher() {
            self.throw_hand
        } else {
            match self.bat_hand {
                BatHand::Right => Hand::Right,
                BatHand::Left => Hand::Left,
                BatHand::Switch => self.throw_hand,
            }
        };
    }

    /// Restore every record invariant: ratings in range, overlay capped,
    /// non-negative currency, derived fields recomputed.
    pub fn normalize(&mut self) {
        self.attributes.clamp_all();
        self.pitches.clamp_all();
        self.perks_applied.cap_against(&self.attributes);
        self.currency = self.currency.max(0);
        self.level = self.level.max(1);
        self.xp_to_next_level = self.xp_to_next_level.max(1);
        self.sync_handedness();
        self.refresh_overall();
    }

    /// Parse a stored record and normalize it.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a JSON player object.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        let mut player: Self = serde_json::from_str(payload)?;
        player.normalize();
        Ok(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attribute;

    #[test]
    fn pitch_history_keeps_last_three() {
        let mut history = PitchHistory::default();
        for pitch in [
            PitchType::Fastball,
            PitchType::Slider,
            PitchType::Fastball,
            PitchType::Changeup,
        ] {
            history.record(pitch);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(
            history.as_slice(),
            &[PitchType::Slider, PitchType::Fastball, PitchType::Changeup]
        );
        assert_eq!(history.occurrences(PitchType::Fastball), 1);
    }

    #[test]
    fn new_record_is_neutral_and_consistent() {
        let player = PlayerRecord::new("pl_1", "Neutral", Position::Pitcher);
        assert_eq!(player.overall, 50);
        assert_eq!(player.perks_applied.bonus(Attribute::Stamina), 0);
        assert_eq!(player.perks_applied.iter().count(), 9);
        assert!(player.pitch_history.is_empty());
    }

    #[test]
    fn handedness_tracks_position() {
        let mut player = PlayerRecord::new("pl_2", "Lefty", Position::Pitcher);
        player.throw_hand = Hand::Left;
        player.bat_hand = BatHand::Right;
        player.sync_handedness();
        assert_eq!(player.handedness, Hand::Left);

        player.position = Position::Shortstop;
        player.sync_handedness();
        assert_eq!(player.handedness, Hand::Right);

        player.bat_hand = BatHand::Switch;
        player.sync_handedness();
        assert_eq!(player.handedness, Hand::Left);
    }

    #[test]
    fn position_tokens_roundtrip() {
        for position in Position::ROSTER {
            assert_eq!(position.as_str().parse::<Position>(), Ok(position));
        }
        assert_eq!("r".parse::<Position>(), Ok(Position::Runner));
        assert!("XX".parse::<Position>().is_err());
    }

    #[test]
    fn normalize_repairs_out_of_range_record() {
        let mut player = PlayerRecord::new("pl_3", "Broken", Position::Catcher);
        player.attributes.contact = 140;
        player.attributes.eye = -3;
        player.currency = -20;
        player.overall = 12;
        player.normalize();
        assert_eq!(player.attributes.contact, 99);
        assert_eq!(player.attributes.eye, 1);
        assert_eq!(player.currency, 0);
        assert_eq!(player.overall, crate::attributes::compute_overall(&player));
    }

    #[test]
    fn serialized_shape_uses_save_format_keys() {
        let mut player = PlayerRecord::new("pl_4", "Saved", Position::FirstBase);
        player.pitches.set(PitchType::Fastball, 70);
        let value = serde_json::to_value(&player).unwrap();
        assert_eq!(value["position"], "1B");
        assert_eq!(value["contact"], 50);
        assert_eq!(value["pitches"]["fastball"], 70);
        assert!(value.get("perksApplied").is_some());
        assert!(value.get("xpToNextLevel").is_some());
        assert!(value.get("pitchHistory").is_none());
    }

    #[test]
    fn legacy_collection_entries_load_as_player_cards() {
        use crate::rarity::Rarity;
        use crate::shop::{Card, CardPayload};

        let payload = r#"{
            "id": "pl_old",
            "name": "Old Save",
            "position": "SS",
            "collection": [
                { "displayName": "gold player", "kind": "player", "rarity": "gold" },
                { "kind": "playerCard", "rarity": "bronze" }
            ]
        }"#;
        let player = PlayerRecord::from_json(payload).unwrap();
        assert_eq!(
            player.perks_owned,
            vec![
                Card {
                    rarity: Rarity::Gold,
                    payload: CardPayload::PlayerCard,
                },
                Card {
                    rarity: Rarity::Bronze,
                    payload: CardPayload::PlayerCard,
                },
            ]
        );

        let saved = serde_json::to_value(&player).unwrap();
        assert_eq!(saved["perksOwned"][0]["kind"], "playerCard");
    }
}
