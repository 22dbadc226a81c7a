//! Tuning configuration for the at-bat engine, draft generator and shop.
//!
//! Every section deserializes with defaults, so a partial JSON override only
//! needs the fields it changes.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    BIG_SPIKE_MIN, BIG_TANK_RANGE, BUNT_HIT_FACTOR, BUNT_PCT, CARD_BASE_PRICE, CARD_PRICE_STEP,
    DOUBLE_SPIKE_RANGE, DRAFT_SECONDARY_OFFSET, DRAFT_SEED_SPREAD, EXTRA_BASE_POWER_WEIGHT,
    EXTRA_BASE_REWARD, HIT_CHANCE_BASE, HIT_CHANCE_MAX, HIT_CHANCE_MIN, HIT_CONTACT_WEIGHT,
    HIT_EYE_WEIGHT, HIT_MOVEMENT_WEIGHT, HIT_PITCH_RATING_WEIGHT, HIT_POWER_WEIGHT,
    OUTS_PER_HALF_INNING, PACK_BASE_PRICE, PACK_BUMP_ONE_PROB, PACK_BUMP_TWO_PROB,
    PACK_PRICE_STEP, PERK_KIND_MAX_ROLL, POWER_SWING_WEIGHT, PRIMARY_PITCH_PCT, RARITY_BANDS,
    RATING_MAX, RATING_MIN, REBALANCE_MAX_ITERATIONS, RIGHT_HANDED_BAT_PROB, SHOP_CARD_SLOTS,
    SHOP_PACK_SLOTS, SINGLE_REWARD, SINGLE_SPIKE_RANGE, STAMINA_COST_PER_PA, STAMINA_FLOOR,
    SWITCH_HITTER_PROB, TWO_STRIKE_OFFSPEED_PCT, UPGRADE_KIND_MAX_ROLL, VARIANCE_BIG_PROB,
    VARIANCE_DOUBLE_PROB, VARIANCE_SINGLE_PROB, WALK_BASE_PCT, WALK_CONTROL_PIVOT,
    WALK_CONTROL_WEIGHT, WALK_FLOOR_PCT, WALK_REWARD, XP_PER_PLATE_APPEARANCE,
    XP_THRESHOLD_GROWTH,
};
use crate::rarity::Rarity;

const DEFAULT_TUNING_DATA: &str = include_str!("../assets/tuning.json");

/// Errors raised when tuning invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("expected {expected} rarity bands (got {got})")]
    BandCount { expected: usize, got: usize },
    #[error("{rarity} band [{min}, {max}] is outside the rating scale")]
    BandOutOfRange { rarity: Rarity, min: i32, max: i32 },
    #[error("{upper} band must start right after {lower} band ends")]
    BandsNotContiguous { lower: Rarity, upper: Rarity },
    #[error("blackDiamond band must end at the rating ceiling (got {max})")]
    TopBandNotPinned { max: i32 },
    #[error("{field} must be between 0 and 1 (got {value:.4})")]
    Probability { field: &'static str, value: f64 },
    #[error("card kind thresholds invalid: perk {perk} must be below upgrade {upgrade} within 1..=100")]
    KindThresholds { perk: i32, upgrade: i32 },
    #[error("hit chance window invalid (min {min:.1} > max {max:.1})")]
    HitWindow { min: f64, max: f64 },
    #[error("{field} range invalid (min {min} > max {max})")]
    Range {
        field: &'static str,
        min: i32,
        max: i32,
    },
}

/// Coefficients of the single-roll plate appearance model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtBatTuning {
    pub walk_base_pct: f64,
    pub walk_control_pivot: i32,
    pub walk_control_weight: f64,
    pub walk_floor_pct: f64,
    pub primary_pitch_pct: i32,
    pub two_strike_offspeed_pct: i32,
    pub bunt_pct: i32,
    pub power_swing_weight: f64,
    pub hit_chance_base: f64,
    pub pitch_rating_weight: f64,
    pub movement_weight: f64,
    pub contact_weight: f64,
    pub power_weight: f64,
    pub eye_weight: f64,
    pub hit_chance_min: f64,
    pub hit_chance_max: f64,
    pub bunt_hit_factor: f64,
    pub extra_base_power_weight: f64,
    pub stamina_cost: i32,
    pub stamina_floor: i32,
}

impl Default for AtBatTuning {
    fn default() -> Self {
        Self {
            walk_base_pct: WALK_BASE_PCT,
            walk_control_pivot: WALK_CONTROL_PIVOT,
            walk_control_weight: WALK_CONTROL_WEIGHT,
            walk_floor_pct: WALK_FLOOR_PCT,
            primary_pitch_pct: PRIMARY_PITCH_PCT,
            two_strike_offspeed_pct: TWO_STRIKE_OFFSPEED_PCT,
            bunt_pct: BUNT_PCT,
            power_swing_weight: POWER_SWING_WEIGHT,
            hit_chance_base: HIT_CHANCE_BASE,
            pitch_rating_weight: HIT_PITCH_RATING_WEIGHT,
            movement_weight: HIT_MOVEMENT_WEIGHT,
            contact_weight: HIT_CONTACT_WEIGHT,
            power_weight: HIT_POWER_WEIGHT,
            eye_weight: HIT_EYE_WEIGHT,
            hit_chance_min: HIT_CHANCE_MIN,
            hit_chance_max: HIT_CHANCE_MAX,
            bunt_hit_factor: BUNT_HIT_FACTOR,
            extra_base_power_weight: EXTRA_BASE_POWER_WEIGHT,
            stamina_cost: STAMINA_COST_PER_PA,
            stamina_floor: STAMINA_FLOOR,
        }
    }
}

/// Inclusive overall range a rarity draws its target from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityBand {
    pub min: i32,
    pub max: i32,
}

impl RarityBand {
    #[must_use]
    pub const fn contains(self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Draft generation knobs: rarity bands, rebalancing and variance odds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftTuning {
    /// One band per rarity, lowest rank first.
    pub bands: Vec<RarityBand>,
    pub seed_spread: i32,
    pub secondary_offset: i32,
    pub rebalance_max_iterations: u32,
    pub variance_big_prob: f64,
    pub variance_double_prob: f64,
    pub variance_single_prob: f64,
    pub big_spike_min: i32,
    pub big_tank_min: i32,
    pub big_tank_max: i32,
    pub double_spike_min: i32,
    pub double_spike_max: i32,
    pub single_spike_min: i32,
    pub single_spike_max: i32,
    pub switch_hitter_prob: f64,
    pub right_handed_bat_prob: f64,
}

impl Default for DraftTuning {
    fn default() -> Self {
        Self {
            bands: RARITY_BANDS
                .iter()
                .map(|(min, max)| RarityBand {
                    min: *min,
                    max: *max,
                })
                .collect(),
            seed_spread: DRAFT_SEED_SPREAD,
            secondary_offset: DRAFT_SECONDARY_OFFSET,
            rebalance_max_iterations: REBALANCE_MAX_ITERATIONS,
            variance_big_prob: VARIANCE_BIG_PROB,
            variance_double_prob: VARIANCE_DOUBLE_PROB,
            variance_single_prob: VARIANCE_SINGLE_PROB,
            big_spike_min: BIG_SPIKE_MIN,
            big_tank_min: BIG_TANK_RANGE.0,
            big_tank_max: BIG_TANK_RANGE.1,
            double_spike_min: DOUBLE_SPIKE_RANGE.0,
            double_spike_max: DOUBLE_SPIKE_RANGE.1,
            single_spike_min: SINGLE_SPIKE_RANGE.0,
            single_spike_max: SINGLE_SPIKE_RANGE.1,
            switch_hitter_prob: SWITCH_HITTER_PROB,
            right_handed_bat_prob: RIGHT_HANDED_BAT_PROB,
        }
    }
}

impl DraftTuning {
    /// Band for `rarity`, falling back to the built-in table when the
    /// configured list is short.
    #[must_use]
    pub fn band(&self, rarity: Rarity) -> RarityBand {
        self.bands.get(rarity.index()).copied().unwrap_or_else(|| {
            let (min, max) = RARITY_BANDS[rarity.index()];
            RarityBand { min, max }
        })
    }
}

/// Shop pricing and card/pack roll odds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopTuning {
    pub card_base_price: i64,
    pub card_price_step: i64,
    pub pack_base_price: f64,
    pub pack_price_step: f64,
    pub standard_multiplier: f64,
    pub jumbo_multiplier: f64,
    pub ultra_multiplier: f64,
    pub perk_kind_max_roll: i32,
    pub upgrade_kind_max_roll: i32,
    pub pack_bump_one_prob: f64,
    pub pack_bump_two_prob: f64,
    pub card_slots: usize,
    pub pack_slots: usize,
}

impl Default for ShopTuning {
    fn default() -> Self {
        Self {
            card_base_price: CARD_BASE_PRICE,
            card_price_step: CARD_PRICE_STEP,
            pack_base_price: PACK_BASE_PRICE,
            pack_price_step: PACK_PRICE_STEP,
            standard_multiplier: 1.0,
            jumbo_multiplier: 1.8,
            ultra_multiplier: 2.3,
            perk_kind_max_roll: PERK_KIND_MAX_ROLL,
            upgrade_kind_max_roll: UPGRADE_KIND_MAX_ROLL,
            pack_bump_one_prob: PACK_BUMP_ONE_PROB,
            pack_bump_two_prob: PACK_BUMP_TWO_PROB,
            card_slots: SHOP_CARD_SLOTS,
            pack_slots: SHOP_PACK_SLOTS,
        }
    }
}

/// Rewards and bookkeeping the session applies after each plate appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    pub walk_reward: i64,
    pub single_reward: i64,
    pub extra_base_reward: i64,
    pub outs_per_half_inning: u8,
    pub xp_per_plate_appearance: u32,
    pub xp_threshold_growth: u32,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            walk_reward: WALK_REWARD,
            single_reward: SINGLE_REWARD,
            extra_base_reward: EXTRA_BASE_REWARD,
            outs_per_half_inning: OUTS_PER_HALF_INNING,
            xp_per_plate_appearance: XP_PER_PLATE_APPEARANCE,
            xp_threshold_growth: XP_THRESHOLD_GROWTH,
        }
    }
}

/// Complete tuning bundle handed to a game session.
///
/// Missing sections fall back to the in-code tables, never to the asset,
/// since `Default` itself parses the asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningConfig {
    #[serde(default)]
    pub at_bat: AtBatTuning,
    #[serde(default)]
    pub draft: DraftTuning,
    #[serde(default)]
    pub shop: ShopTuning,
    #[serde(default)]
    pub economy: EconomyTuning,
}

impl Default for TuningConfig {
    fn default() -> Self {
        serde_json::from_str(DEFAULT_TUNING_DATA).unwrap_or_else(|_| Self::builtin())
    }
}

impl TuningConfig {
    /// Tuning assembled from the in-code constants, bypassing the asset.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            at_bat: AtBatTuning::default(),
            draft: DraftTuning::default(),
            shop: ShopTuning::default(),
            economy: EconomyTuning::default(),
        }
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::default()
    }

    /// Check the invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), TuningError> {
        self.validate_bands()?;
        let draft = &self.draft;
        let at_bat = &self.at_bat;
        let shop = &self.shop;
        for (field, value) in [
            ("draft.variance_big_prob", draft.variance_big_prob),
            ("draft.variance_double_prob", draft.variance_double_prob),
            ("draft.variance_single_prob", draft.variance_single_prob),
            ("draft.switch_hitter_prob", draft.switch_hitter_prob),
            ("draft.right_handed_bat_prob", draft.right_handed_bat_prob),
            ("shop.pack_bump_one_prob", shop.pack_bump_one_prob),
            ("shop.pack_bump_two_prob", shop.pack_bump_two_prob),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::Probability { field, value });
            }
        }
        let variance_total =
            draft.variance_big_prob + draft.variance_double_prob + draft.variance_single_prob;
        if variance_total > 1.0 {
            return Err(TuningError::Probability {
                field: "draft.variance_total",
                value: variance_total,
            });
        }
        let hand_total = draft.switch_hitter_prob + draft.right_handed_bat_prob;
        if hand_total > 1.0 {
            return Err(TuningError::Probability {
                field: "draft.bat_hand_total",
                value: hand_total,
            });
        }
        for (field, min, max) in [
            ("draft.big_tank", draft.big_tank_min, draft.big_tank_max),
            ("draft.double_spike", draft.double_spike_min, draft.double_spike_max),
            ("draft.single_spike", draft.single_spike_min, draft.single_spike_max),
        ] {
            if min > max {
                return Err(TuningError::Range { field, min, max });
            }
        }
        if !(1..=100).contains(&shop.perk_kind_max_roll)
            || !(1..=100).contains(&shop.upgrade_kind_max_roll)
            || shop.perk_kind_max_roll > shop.upgrade_kind_max_roll
        {
            return Err(TuningError::KindThresholds {
                perk: shop.perk_kind_max_roll,
                upgrade: shop.upgrade_kind_max_roll,
            });
        }
        if at_bat.hit_chance_min > at_bat.hit_chance_max {
            return Err(TuningError::HitWindow {
                min: at_bat.hit_chance_min,
                max: at_bat.hit_chance_max,
            });
        }
        Ok(())
    }

    fn validate_bands(&self) -> Result<(), TuningError> {
        let bands = &self.draft.bands;
        if bands.len() != Rarity::ALL.len() {
            return Err(TuningError::BandCount {
                expected: Rarity::ALL.len(),
                got: bands.len(),
            });
        }
        for (rarity, band) in Rarity::ALL.iter().zip(bands) {
            if band.min < RATING_MIN || band.max > RATING_MAX || band.min > band.max {
                return Err(TuningError::BandOutOfRange {
                    rarity: *rarity,
                    min: band.min,
                    max: band.max,
                });
            }
        }
        for (pair, ranks) in bands.windows(2).zip(Rarity::ALL.windows(2)) {
            if pair[1].min != pair[0].max + 1 {
                return Err(TuningError::BandsNotContiguous {
                    lower: ranks[0],
                    upper: ranks[1],
                });
            }
        }
        let top = bands[bands.len() - 1];
        if top.max != RATING_MAX {
            return Err(TuningError::TopBandNotPinned { max: top.max });
        }
        Ok(())
    }
}
