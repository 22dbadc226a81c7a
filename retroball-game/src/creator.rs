//! Custom player creation and the per-role clones the field scene spawns.
use crate::attributes::Attribute;
use crate::constants::{STARTING_CURRENCY, TEAMMATE_FLOOR, TEAMMATE_JITTER};
use crate::player::{BatHand, Cosmetics, Hand, PitchType, PlayerRecord, Position, Role};
use crate::rarity::Rarity;
use crate::rng::RollSource;

/// Half-open base rating ranges rolled for a fresh custom player.
const BASE_RANGES: [(Attribute, i32, i32); 9] = [
    (Attribute::Velocity, 55, 75),
    (Attribute::Movement, 50, 70),
    (Attribute::Control, 50, 70),
    (Attribute::Stamina, 70, 95),
    (Attribute::Contact, 45, 70),
    (Attribute::Power, 40, 70),
    (Attribute::Eye, 45, 70),
    (Attribute::Speed, 45, 70),
    (Attribute::Fielding, 45, 70),
];

const FASTBALL_RANGE: (i32, i32) = (60, 85);
const OFFSPEED_RANGE: (i32, i32) = (50, 75);

/// Choices made in the creator screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorChoices {
    pub name: String,
    pub position: Position,
    pub hand: Hand,
    pub cosmetics: Cosmetics,
}

impl CreatorChoices {
    #[must_use]
    pub fn new(name: impl Into<String>, position: Position, hand: Hand) -> Self {
        Self {
            name: name.into(),
            position,
            hand,
            cosmetics: Cosmetics::default(),
        }
    }
}

/// Roll within `[lo, hi)`.
fn roll_half_open<R: RollSource + ?Sized>(lo: i32, hi: i32, rng: &mut R) -> i32 {
    rng.between(lo, hi - 1)
}

/// Build the run's custom player: common rarity, starting purse, bronze
/// unlocked, rolled ratings and a full four-pitch arsenal.
pub fn make_new_player<R: RollSource + ?Sized>(
    id: impl Into<String>,
    choices: &CreatorChoices,
    rng: &mut R,
) -> PlayerRecord {
    let mut player = PlayerRecord::new(id, choices.name.clone(), choices.position);
    for (attr, lo, hi) in BASE_RANGES {
        player.attributes.set(attr, roll_half_open(lo, hi, rng));
    }
    for pitch in PitchType::ALL {
        let (lo, hi) = if pitch == PitchType::Fastball {
            FASTBALL_RANGE
        } else {
            OFFSPEED_RANGE
        };
        player.pitches.set(pitch, roll_half_open(lo, hi, rng));
    }
    player.rarity = Rarity::Common;
    player.throw_hand = choices.hand;
    player.bat_hand = BatHand::from(choices.hand);
    player.cosmetics = choices.cosmetics.clone();
    player.currency = STARTING_CURRENCY;
    player.unlocked_max_rarity = Rarity::Bronze;
    player.sync_handedness();
    player.refresh_overall();
    log::debug!(
        "creator | {} ({}) overall {}",
        player.name,
        player.position,
        player.overall
    );
    player
}

/// Transient copy of `source` playing `role` on the field. Fielder clones
/// get their contact and power jittered so the defence is not uniform.
pub fn clone_for_role<R: RollSource + ?Sized>(
    source: &PlayerRecord,
    role: Role,
    rng: &mut R,
) -> PlayerRecord {
    let mut clone = source.clone();
    let (suffix, position) = match role {
        Role::Pitcher => ("pitcher", Position::Pitcher),
        Role::Batter => ("batter", Position::Batter),
        Role::Fielder => ("fielder", Position::Fielder),
        Role::Runner => ("runner", Position::Runner),
        Role::Draftee => ("draftee", source.position),
    };
    clone.id = format!("{}_{suffix}", source.id);
    clone.position = position;
    clone.role = Some(role);
    clone.pitch_history.clear();
    if role == Role::Fielder {
        for attr in [Attribute::Contact, Attribute::Power] {
            let jitter = rng.between(-TEAMMATE_JITTER, TEAMMATE_JITTER);
            let value = (clone.attributes.get(attr) + jitter).clamp(TEAMMATE_FLOOR, 99);
            clone.attributes.set(attr, value);
        }
        clone.perks_applied.cap_against(&clone.attributes);
    }
    clone.sync_handedness();
    clone.refresh_overall();
    clone
}
