//! Draft candidate generation: rarity bands, rebalancing and stat variance.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::hash::Hasher;
use twox_hash::XxHash64;

use crate::attributes::{Attribute, Attributes};
use crate::config::DraftTuning;
use crate::constants::{DRAFT_OFFSPEED_PROB, RATING_MAX, RATING_MIN};
use crate::numbers::clamp_rating;
use crate::player::{BatHand, Cosmetics, Hand, PitchArsenal, PitchType, PlayerRecord, Position, Role};
use crate::rarity::Rarity;
use crate::rng::RollSource;

const HAIR_STYLES: &[&str] = &["short", "buzz", "mohawk", "long", "curly", "bald"];
const FACIAL_HAIR: &[&str] = &["none", "mustache", "beard", "goatee", "stubble"];
const SKIN_TONES: &[&str] = &["#ffdbac", "#f1c27d", "#e0ac69", "#c68642", "#8d5524"];
const TEAM_COLORS: &[&str] = &["#2a6dd6", "#d62a2a", "#2ad65b", "#d6b82a", "#7a2ad6", "#e07b1f"];
const FIRST_NAMES: &[&str] = &[
    "Ace", "Buck", "Chip", "Dusty", "Eddie", "Flash", "Gus", "Hank", "Izzy", "Jett", "Kit",
    "Lefty", "Moose", "Nate", "Ozzie", "Pep", "Rusty", "Sal", "Tito", "Vic",
];
const LAST_NAMES: &[&str] = &[
    "Baker", "Castillo", "Diaz", "Fletcher", "Griffin", "Hayes", "Ito", "Jensen", "Kowalski",
    "Lopez", "Moreno", "Nakamura", "Ortiz", "Park", "Quinn", "Reyes", "Sato", "Tucker",
];

/// Outlier shape applied after the initial rebalance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VarianceKind {
    None,
    /// One attribute near the ceiling, two tanked.
    BigSpike,
    /// Two attributes boosted.
    DoubleSpike,
    /// One attribute boosted, another lowered by the same amount.
    SpikeTank,
}

fn pick<'a, R: RollSource + ?Sized>(options: &[&'a str], rng: &mut R) -> &'a str {
    options.get(rng.pick_index(options.len())).copied().unwrap_or_default()
}

/// `n` distinct attributes drawn from `pool` via a partial shuffle.
fn pick_distinct<R: RollSource + ?Sized>(
    pool: &[Attribute],
    n: usize,
    rng: &mut R,
) -> SmallVec<[Attribute; 5]> {
    let mut remaining: SmallVec<[Attribute; 5]> = pool.iter().copied().collect();
    let mut chosen = SmallVec::new();
    while chosen.len() < n && !remaining.is_empty() {
        let idx = rng.pick_index(remaining.len());
        chosen.push(remaining.swap_remove(idx));
    }
    chosen
}

/// Nudge random attributes by one until the rated subset sums to
/// `target * rated.len()`. Attributes pinned at the scale edges are skipped.
///
/// Returns whether the exact sum was reached before the iteration cap.
pub fn rebalance<R: RollSource + ?Sized>(
    attributes: &mut Attributes,
    rated: &[Attribute],
    target: i32,
    max_iterations: u32,
    rng: &mut R,
) -> bool {
    if rated.is_empty() {
        return true;
    }
    let count = i32::try_from(rated.len()).unwrap_or(i32::MAX);
    let goal = target.saturating_mul(count);
    for _ in 0..max_iterations {
        let sum = attributes.sum(rated);
        if sum == goal {
            return true;
        }
        let attr = rated[rng.pick_index(rated.len())];
        let value = attributes.get(attr);
        if sum < goal && value < RATING_MAX {
            attributes.set(attr, value + 1);
        } else if sum > goal && value > RATING_MIN {
            attributes.set(attr, value - 1);
        }
    }
    let reached = attributes.sum(rated) == goal;
    if !reached {
        log::warn!(
            "draft | rebalance gave up after {max_iterations} iterations: sum {} vs goal {goal}",
            attributes.sum(rated)
        );
    }
    reached
}

/// Roll which variance transform applies, using cumulative thresholds.
pub fn roll_variance<R: RollSource + ?Sized>(cfg: &DraftTuning, rng: &mut R) -> VarianceKind {
    let roll = rng.next_unit();
    let big = cfg.variance_big_prob;
    let double = big + cfg.variance_double_prob;
    let single = double + cfg.variance_single_prob;
    if roll < big {
        VarianceKind::BigSpike
    } else if roll < double {
        VarianceKind::DoubleSpike
    } else if roll < single {
        VarianceKind::SpikeTank
    } else {
        VarianceKind::None
    }
}

/// Apply a variance transform to the rated subset. Values stay clamped.
pub fn apply_variance<R: RollSource + ?Sized>(
    kind: VarianceKind,
    attributes: &mut Attributes,
    rated: &[Attribute],
    target: i32,
    cfg: &DraftTuning,
    rng: &mut R,
) {
    match kind {
        VarianceKind::None => {}
        VarianceKind::BigSpike => {
            let picks = pick_distinct(rated, 3, rng);
            let mut picks = picks.into_iter();
            if let Some(spike) = picks.next() {
                let floor = cfg.big_spike_min.max(target).min(RATING_MAX);
                attributes.set(spike, rng.between(floor, RATING_MAX));
            }
            for tank in picks {
                attributes.set(tank, rng.between(cfg.big_tank_min, cfg.big_tank_max));
            }
        }
        VarianceKind::DoubleSpike => {
            for attr in pick_distinct(rated, 2, rng) {
                let boost = rng.between(cfg.double_spike_min, cfg.double_spike_max);
                attributes.set(attr, attributes.get(attr) + boost);
            }
        }
        VarianceKind::SpikeTank => {
            let picks = pick_distinct(rated, 2, rng);
            if let [spike, tank] = picks.as_slice() {
                let delta = rng.between(cfg.single_spike_min, cfg.single_spike_max);
                attributes.set(*spike, attributes.get(*spike) + delta);
                attributes.set(*tank, attributes.get(*tank) - delta);
            }
        }
    }
}

fn seed_attributes<R: RollSource + ?Sized>(
    rated: &[Attribute],
    target: i32,
    cfg: &DraftTuning,
    rng: &mut R,
) -> Attributes {
    let mut attributes = Attributes::default();
    for attr in Attribute::ALL {
        let center = if rated.contains(&attr) {
            target
        } else {
            target - cfg.secondary_offset
        };
        let jitter = rng.between(-cfg.seed_spread, cfg.seed_spread);
        attributes.set(attr, center + jitter);
    }
    attributes
}

fn draft_arsenal<R: RollSource + ?Sized>(target: i32, cfg: &DraftTuning, rng: &mut R) -> PitchArsenal {
    let mut arsenal = PitchArsenal::default();
    for pitch in PitchType::ALL {
        if pitch == PitchType::Fastball || rng.chance(DRAFT_OFFSPEED_PROB) {
            let jitter = rng.between(-cfg.seed_spread, cfg.seed_spread);
            arsenal.set(pitch, clamp_rating(target + jitter));
        }
    }
    arsenal
}

/// Bat hand for a position player: switch, right or left on a partition of
/// `[0, 1)`.
pub fn roll_bat_hand<R: RollSource + ?Sized>(cfg: &DraftTuning, rng: &mut R) -> BatHand {
    let roll = rng.next_unit();
    if roll < cfg.switch_hitter_prob {
        BatHand::Switch
    } else if roll < cfg.switch_hitter_prob + cfg.right_handed_bat_prob {
        BatHand::Right
    } else {
        BatHand::Left
    }
}

fn draft_id<R: RollSource + ?Sized>(position: Position, rarity: Rarity, rng: &mut R) -> String {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(position.as_str().as_bytes());
    hasher.write(rarity.as_str().as_bytes());
    hasher.write_u64(rng.next_unit().to_bits());
    hasher.write_u64(rng.next_unit().to_bits());
    format!("dr_{:016x}", hasher.finish())
}

/// Generate one fully populated draft candidate.
///
/// The target overall is drawn uniformly from the rarity's band and the
/// rated attributes are rebalanced to hit it exactly, so `overall` lands in
/// the band unless every attribute is pinned.
pub fn generate_random_draft_player<R: RollSource + ?Sized>(
    position: Position,
    rarity: Rarity,
    team_color_hint: Option<&str>,
    cfg: &DraftTuning,
    rng: &mut R,
) -> PlayerRecord {
    let band = cfg.band(rarity);
    let target = rng.between(band.min, band.max);
    let rated = Attribute::rated_for(position);

    let mut attributes = seed_attributes(rated, target, cfg, rng);
    rebalance(&mut attributes, rated, target, cfg.rebalance_max_iterations, rng);

    let variance = roll_variance(cfg, rng);
    if variance != VarianceKind::None {
        apply_variance(variance, &mut attributes, rated, target, cfg, rng);
        rebalance(&mut attributes, rated, target, cfg.rebalance_max_iterations, rng);
    }

    let pitches = if position.is_pitcher() {
        draft_arsenal(target, cfg, rng)
    } else {
        PitchArsenal::default()
    };

    let throw_hand = if rng.chance(0.5) { Hand::Left } else { Hand::Right };
    let bat_hand = if position.is_pitcher() {
        BatHand::from(throw_hand)
    } else {
        roll_bat_hand(cfg, rng)
    };

    let cosmetics = Cosmetics {
        hair: pick(HAIR_STYLES, rng).to_string(),
        facial: pick(FACIAL_HAIR, rng).to_string(),
        skin: pick(SKIN_TONES, rng).to_string(),
        team_color: team_color_hint.map_or_else(|| pick(TEAM_COLORS, rng).to_string(), str::to_string),
    };
    let name = format!("{} {}", pick(FIRST_NAMES, rng), pick(LAST_NAMES, rng));
    let id = draft_id(position, rarity, rng);

    let mut player = PlayerRecord::new(id, name, position);
    player.role = Some(Role::Draftee);
    player.rarity = rarity;
    player.attributes = attributes;
    player.pitches = pitches;
    player.throw_hand = throw_hand;
    player.bat_hand = bat_hand;
    player.cosmetics = cosmetics;
    player.sync_handedness();
    player.refresh_overall();

    log::debug!(
        "draft | {} {} {} target {target} overall {} variance {variance:?}",
        rarity,
        position,
        player.name,
        player.overall
    );
    player
}

/// A slate of candidates at random roster positions and rarities up to
/// `unlocked`.
pub fn generate_draft_class<R: RollSource + ?Sized>(
    count: usize,
    unlocked: Rarity,
    team_color_hint: Option<&str>,
    cfg: &DraftTuning,
    rng: &mut R,
) -> Vec<PlayerRecord> {
    (0..count)
        .map(|_| {
            let position = Position::ROSTER[rng.pick_index(Position::ROSTER.len())];
            let rarity = crate::shop::roll_unlocked_rarity(unlocked, rng);
            generate_random_draft_player(position, rarity, team_color_hint, cfg, rng)
        })
        .collect()
}
