//! Centralized balance and tuning constants for Retroball game logic.
//!
//! These values define the deterministic math for the at-bat engine, the
//! draft generator and the shop economy. `config::TuningConfig` defaults to
//! them; the embedded tuning asset mirrors them so overrides stay reviewable.

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_AT_BAT_WALK: &str = "log.at-bat.walk";
pub(crate) const LOG_AT_BAT_STRIKE: &str = "log.at-bat.strike";
pub(crate) const LOG_AT_BAT_SINGLE: &str = "log.at-bat.single";
pub(crate) const LOG_AT_BAT_EXTRA_BASE: &str = "log.at-bat.extra-base";
pub(crate) const LOG_AT_BAT_BUNT_HIT: &str = "log.at-bat.bunt-hit";
pub(crate) const LOG_AT_BAT_BUNT_OUT: &str = "log.at-bat.bunt-out";
pub(crate) const LOG_RUN_SCORED: &str = "log.run.scored";
pub(crate) const LOG_HALF_INNING_END: &str = "log.half-inning.end";
pub(crate) const LOG_LEVEL_UP: &str = "log.level-up";
pub(crate) const LOG_SHOP_PURCHASE: &str = "log.shop.purchase";
pub(crate) const LOG_SHOP_PACK_OPENED: &str = "log.shop.pack-opened";
pub(crate) const LOG_PERK_APPLIED: &str = "log.perk.applied";
pub(crate) const LOG_UPGRADE_APPLIED: &str = "log.upgrade.applied";
pub(crate) const LOG_CARD_COLLECTED: &str = "log.card.collected";
pub(crate) const LOG_DRAFT_SIGNED: &str = "log.draft.signed";

// Rating scale -------------------------------------------------------------
pub const RATING_MIN: i32 = 1;
pub const RATING_MAX: i32 = 99;
/// Substituted for any attribute or pitch rating a record does not carry.
pub const NEUTRAL_RATING: i32 = 50;
/// Rating of the implicit fastball used when an arsenal is empty.
pub const FALLBACK_PITCH_RATING: i32 = 60;
pub const PITCH_HISTORY_LEN: usize = 3;

// At-bat tuning ------------------------------------------------------------
pub(crate) const WALK_BASE_PCT: f64 = 20.0;
pub(crate) const WALK_CONTROL_PIVOT: i32 = 50;
pub(crate) const WALK_CONTROL_WEIGHT: f64 = 0.4;
pub(crate) const WALK_FLOOR_PCT: f64 = 2.0;
pub(crate) const PRIMARY_PITCH_PCT: i32 = 70;
pub(crate) const TWO_STRIKE_OFFSPEED_PCT: i32 = 60;
pub(crate) const BUNT_PCT: i32 = 20;
pub(crate) const POWER_SWING_WEIGHT: f64 = 0.7;
pub(crate) const HIT_CHANCE_BASE: f64 = 50.0;
pub(crate) const HIT_PITCH_RATING_WEIGHT: f64 = 0.35;
pub(crate) const HIT_MOVEMENT_WEIGHT: f64 = 0.25;
pub(crate) const HIT_CONTACT_WEIGHT: f64 = 0.45;
pub(crate) const HIT_POWER_WEIGHT: f64 = 0.30;
pub(crate) const HIT_EYE_WEIGHT: f64 = 0.20;
pub(crate) const HIT_CHANCE_MIN: f64 = 5.0;
pub(crate) const HIT_CHANCE_MAX: f64 = 95.0;
pub(crate) const BUNT_HIT_FACTOR: f64 = 0.8;
pub(crate) const EXTRA_BASE_POWER_WEIGHT: f64 = 0.15;
pub(crate) const STAMINA_COST_PER_PA: i32 = 1;
pub(crate) const STAMINA_FLOOR: i32 = 1;

// Draft tuning -------------------------------------------------------------
/// Inclusive overall bands, indexed by rarity rank.
pub(crate) const RARITY_BANDS: [(i32, i32); 6] =
    [(50, 59), (60, 69), (70, 79), (80, 89), (90, 98), (99, 99)];
pub(crate) const DRAFT_SEED_SPREAD: i32 = 5;
pub(crate) const DRAFT_SECONDARY_OFFSET: i32 = 15;
pub(crate) const REBALANCE_MAX_ITERATIONS: u32 = 5_000;
pub(crate) const VARIANCE_BIG_PROB: f64 = 0.01;
pub(crate) const VARIANCE_DOUBLE_PROB: f64 = 0.05;
pub(crate) const VARIANCE_SINGLE_PROB: f64 = 0.10;
pub(crate) const BIG_SPIKE_MIN: i32 = 95;
pub(crate) const BIG_TANK_RANGE: (i32, i32) = (15, 35);
pub(crate) const DOUBLE_SPIKE_RANGE: (i32, i32) = (8, 15);
pub(crate) const SINGLE_SPIKE_RANGE: (i32, i32) = (10, 20);
pub(crate) const SWITCH_HITTER_PROB: f64 = 0.10;
pub(crate) const RIGHT_HANDED_BAT_PROB: f64 = 0.45;
/// Chance a drafted pitcher carries each off-speed pitch besides the fastball.
pub(crate) const DRAFT_OFFSPEED_PROB: f64 = 0.5;

// Shop tuning --------------------------------------------------------------
pub(crate) const CARD_BASE_PRICE: i64 = 10;
pub(crate) const CARD_PRICE_STEP: i64 = 10;
pub(crate) const PACK_BASE_PRICE: f64 = 15.0;
pub(crate) const PACK_PRICE_STEP: f64 = 12.0;
pub(crate) const PERK_KIND_MAX_ROLL: i32 = 50;
pub(crate) const UPGRADE_KIND_MAX_ROLL: i32 = 80;
pub(crate) const PACK_BUMP_ONE_PROB: f64 = 0.05;
pub(crate) const PACK_BUMP_TWO_PROB: f64 = 0.001;
pub(crate) const SHOP_CARD_SLOTS: usize = 3;
pub(crate) const SHOP_PACK_SLOTS: usize = 2;

// Economy tuning -----------------------------------------------------------
pub(crate) const WALK_REWARD: i64 = 2;
pub(crate) const SINGLE_REWARD: i64 = 3;
pub(crate) const EXTRA_BASE_REWARD: i64 = 6;
pub(crate) const OUTS_PER_HALF_INNING: u8 = 3;
pub(crate) const XP_PER_PLATE_APPEARANCE: u32 = 1;
pub(crate) const XP_THRESHOLD_GROWTH: u32 = 5;

// Character creation -------------------------------------------------------
pub(crate) const STARTING_CURRENCY: i64 = 50;
pub(crate) const STARTING_XP_TO_NEXT_LEVEL: u32 = 10;
pub(crate) const TEAMMATE_JITTER: i32 = 6;
pub(crate) const TEAMMATE_FLOOR: i32 = 40;
