//! At-bat resolution: one probabilistic roll per plate appearance.
//!
//! A plate appearance runs a fixed pipeline: walk check, pitch selection,
//! swing selection, hit-chance computation, outcome roll and finally the
//! state update on the batter's pitch memory and the pitcher's stamina.
//! Draw order is part of the contract, so a scripted roll source replays
//! identical results.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::attributes::{Attribute, effective_attribute, effective_pitch_rating};
use crate::config::AtBatTuning;
use crate::constants::{
    LOG_AT_BAT_BUNT_HIT, LOG_AT_BAT_BUNT_OUT, LOG_AT_BAT_EXTRA_BASE, LOG_AT_BAT_SINGLE,
    LOG_AT_BAT_STRIKE, LOG_AT_BAT_WALK,
};
use crate::player::{PitchType, PlayerRecord};
use crate::rng::RollSource;

/// Count context the plate appearance starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AtBatCount {
    pub balls: u8,
    pub strikes: u8,
}

impl AtBatCount {
    #[must_use]
    pub const fn new(balls: u8, strikes: u8) -> Self {
        Self { balls, strikes }
    }

    /// Exactly two strikes: the count that triggers off-speed preference
    /// and protective contact swings.
    #[must_use]
    pub const fn two_strikes(self) -> bool {
        self.strikes == 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwingType {
    Contact,
    Power,
    Bunt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AtBatOutcome {
    Walk,
    Strike,
    Single,
    ExtraBaseHit,
    BuntHit,
    BuntOut,
}

impl AtBatOutcome {
    pub const ALL: [Self; 6] = [
        Self::Walk,
        Self::Strike,
        Self::Single,
        Self::ExtraBaseHit,
        Self::BuntHit,
        Self::BuntOut,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Strike => "strike",
            Self::Single => "single",
            Self::ExtraBaseHit => "extraBaseHit",
            Self::BuntHit => "buntHit",
            Self::BuntOut => "buntOut",
        }
    }

    #[must_use]
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::Single | Self::ExtraBaseHit | Self::BuntHit)
    }

    #[must_use]
    pub const fn is_out(self) -> bool {
        matches!(self, Self::Strike | Self::BuntOut)
    }

    #[must_use]
    pub(crate) const fn log_key(self) -> &'static str {
        match self {
            Self::Walk => LOG_AT_BAT_WALK,
            Self::Strike => LOG_AT_BAT_STRIKE,
            Self::Single => LOG_AT_BAT_SINGLE,
            Self::ExtraBaseHit => LOG_AT_BAT_EXTRA_BASE,
            Self::BuntHit => LOG_AT_BAT_BUNT_HIT,
            Self::BuntOut => LOG_AT_BAT_BUNT_OUT,
        }
    }
}

/// Result of one plate appearance. Pitch and swing are `None` exactly when
/// the outcome is a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtBatResult {
    pub outcome: AtBatOutcome,
    pub pitch_type: Option<PitchType>,
    pub swing_type: Option<SwingType>,
}

impl AtBatResult {
    const fn walk() -> Self {
        Self {
            outcome: AtBatOutcome::Walk,
            pitch_type: None,
            swing_type: None,
        }
    }
}

/// Every roll and derived probability behind a result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtBatTrace {
    pub walk_chance: f64,
    pub walk_roll: i32,
    pub pitch_roll: Option<i32>,
    pub hit_chance: Option<f64>,
    pub repeat_count: usize,
    pub outcome_roll: Option<i32>,
    pub extra_base_roll: Option<i32>,
}

/// Resolve a full plate appearance, mutating the batter's pitch memory and
/// the pitcher's stamina.
pub fn resolve_at_bat<R: RollSource + ?Sized>(
    pitcher: &mut PlayerRecord,
    batter: &mut PlayerRecord,
    count: AtBatCount,
    runners_on: u8,
    cfg: &AtBatTuning,
    rng: &mut R,
) -> AtBatResult {
    let (result, _) = resolve_at_bat_with_trace(pitcher, batter, count, runners_on, cfg, rng);
    result
}

pub fn resolve_at_bat_with_trace<R: RollSource + ?Sized>(
    pitcher: &mut PlayerRecord,
    batter: &mut PlayerRecord,
    count: AtBatCount,
    runners_on: u8,
    cfg: &AtBatTuning,
    rng: &mut R,
) -> (AtBatResult, AtBatTrace) {
    let mut trace = AtBatTrace {
        walk_chance: walk_chance(pitcher, cfg),
        ..AtBatTrace::default()
    };
    trace.walk_roll = rng.between(1, 100);
    if f64::from(trace.walk_roll) <= trace.walk_chance {
        log::debug!(
            "at-bat | {} walks {} (roll {} <= {:.1})",
            pitcher.name,
            batter.name,
            trace.walk_roll,
            trace.walk_chance
        );
        return (AtBatResult::walk(), trace);
    }

    let (pitch, pitch_roll) = select_pitch_with_roll(pitcher, count, cfg, rng);
    trace.pitch_roll = Some(pitch_roll);
    log::trace!(
        "at-bat | walk roll {} missed {:.1}, pitch roll {pitch_roll} -> {pitch}",
        trace.walk_roll,
        trace.walk_chance
    );
    let swing = choose_swing(batter, count, runners_on, cfg, rng);
    let hit_chance = calculate_hit_chance(pitcher, batter, pitch, swing, cfg);
    trace.hit_chance = Some(hit_chance);
    trace.repeat_count = batter.pitch_history.occurrences(pitch);

    let roll = rng.between(1, 100);
    trace.outcome_roll = Some(roll);
    let roll = f64::from(roll);
    let outcome = match swing {
        SwingType::Bunt => {
            if roll <= cfg.bunt_hit_factor * hit_chance {
                AtBatOutcome::BuntHit
            } else {
                AtBatOutcome::BuntOut
            }
        }
        SwingType::Contact | SwingType::Power => {
            if roll > hit_chance {
                AtBatOutcome::Strike
            } else if swing == SwingType::Power {
                let extra_roll = rng.between(1, 100);
                trace.extra_base_roll = Some(extra_roll);
                log::trace!("at-bat | extra-base roll {extra_roll}");
                let power = f64::from(effective_attribute(batter, Attribute::Power));
                if f64::from(extra_roll) <= cfg.extra_base_power_weight * power {
                    AtBatOutcome::ExtraBaseHit
                } else {
                    AtBatOutcome::Single
                }
            } else {
                AtBatOutcome::Single
            }
        }
    };

    batter.pitch_history.record(pitch);
    let stamina = pitcher.attributes.stamina;
    pitcher
        .attributes
        .set(Attribute::Stamina, (stamina - cfg.stamina_cost).max(cfg.stamina_floor));

    log::debug!(
        "at-bat | {} {} vs {} {:?}: hit {:.1}% roll {} -> {}",
        pitcher.name,
        pitch,
        batter.name,
        swing,
        hit_chance,
        roll,
        outcome.as_str()
    );

    let result = AtBatResult {
        outcome,
        pitch_type: Some(pitch),
        swing_type: Some(swing),
    };
    (result, trace)
}

/// Walk probability in percent: falls as control rises, never below the floor.
#[must_use]
pub fn walk_chance(pitcher: &PlayerRecord, cfg: &AtBatTuning) -> f64 {
    let control = effective_attribute(pitcher, Attribute::Control);
    let delta = f64::from(control - cfg.walk_control_pivot);
    cfg.walk_control_weight
        .mul_add(-delta, cfg.walk_base_pct)
        .max(cfg.walk_floor_pct)
}

/// Roll the walk check on its own.
pub fn check_walk<R: RollSource + ?Sized>(
    pitcher: &PlayerRecord,
    cfg: &AtBatTuning,
    rng: &mut R,
) -> bool {
    f64::from(rng.between(1, 100)) <= walk_chance(pitcher, cfg)
}

/// Pitch types the pitcher can throw; an empty arsenal throws a fastball.
fn arsenal(pitcher: &PlayerRecord) -> SmallVec<[PitchType; 4]> {
    let pitches: SmallVec<[PitchType; 4]> = pitcher.pitches.pitches().collect();
    if pitches.is_empty() {
        smallvec::smallvec![PitchType::Fastball]
    } else {
        pitches
    }
}

/// Highest-rated pitch in the arsenal. Ties go to the later pitch.
#[must_use]
pub fn primary_pitch(pitcher: &PlayerRecord) -> PitchType {
    arsenal(pitcher)
        .into_iter()
        .reduce(|best, candidate| {
            if effective_pitch_rating(pitcher, best) > effective_pitch_rating(pitcher, candidate) {
                best
            } else {
                candidate
            }
        })
        .unwrap_or(PitchType::Fastball)
}

pub fn select_pitch<R: RollSource + ?Sized>(
    pitcher: &PlayerRecord,
    count: AtBatCount,
    cfg: &AtBatTuning,
    rng: &mut R,
) -> PitchType {
    select_pitch_with_roll(pitcher, count, cfg, rng).0
}

fn select_pitch_with_roll<R: RollSource + ?Sized>(
    pitcher: &PlayerRecord,
    count: AtBatCount,
    cfg: &AtBatTuning,
    rng: &mut R,
) -> (PitchType, i32) {
    let pitches = arsenal(pitcher);
    let roll = rng.between(1, 100);

    if count.two_strikes() && roll <= cfg.two_strike_offspeed_pct {
        let offspeed: SmallVec<[PitchType; 4]> = pitches
            .iter()
            .copied()
            .filter(|pitch| *pitch != PitchType::Fastball)
            .collect();
        if !offspeed.is_empty() {
            return (offspeed[rng.pick_index(offspeed.len())], roll);
        }
    }

    if roll <= cfg.primary_pitch_pct {
        (primary_pitch(pitcher), roll)
    } else {
        (pitches[rng.pick_index(pitches.len())], roll)
    }
}

pub fn choose_swing<R: RollSource + ?Sized>(
    batter: &PlayerRecord,
    count: AtBatCount,
    runners_on: u8,
    cfg: &AtBatTuning,
    rng: &mut R,
) -> SwingType {
    if runners_on > 0 && count.strikes < 2 && rng.between(1, 100) <= cfg.bunt_pct {
        return SwingType::Bunt;
    }
    if count.two_strikes() {
        return SwingType::Contact;
    }
    let power = f64::from(effective_attribute(batter, Attribute::Power));
    if f64::from(rng.between(1, 100)) <= cfg.power_swing_weight * power {
        SwingType::Power
    } else {
        SwingType::Contact
    }
}

/// Hit probability in percent, clamped to the configured window.
#[must_use]
pub fn calculate_hit_chance(
    pitcher: &PlayerRecord,
    batter: &PlayerRecord,
    pitch: PitchType,
    swing: SwingType,
    cfg: &AtBatTuning,
) -> f64 {
    let pitch_rating = f64::from(effective_pitch_rating(pitcher, pitch));
    let movement = f64::from(effective_attribute(pitcher, Attribute::Movement) - 50);
    let mut chance = cfg.hit_chance_base;
    chance -= cfg.pitch_rating_weight * pitch_rating;
    chance -= cfg.movement_weight * movement;
    match swing {
        SwingType::Contact => {
            let contact = f64::from(effective_attribute(batter, Attribute::Contact) - 50);
            chance += cfg.contact_weight * contact;
        }
        SwingType::Power => {
            let power = f64::from(effective_attribute(batter, Attribute::Power) - 50);
            chance += cfg.power_weight * power;
        }
        SwingType::Bunt => {}
    }
    let repeats = f64::from(u32::try_from(batter.pitch_history.occurrences(pitch)).unwrap_or(0));
    let eye = f64::from(effective_attribute(batter, Attribute::Eye) - 50);
    chance += cfg.eye_weight * repeats * eye;
    chance.clamp(cfg.hit_chance_min, cfg.hit_chance_max)
}
