//! Shop offers: rarity-priced cards and packs, pack opening and purchase effects.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::attributes::{Attribute, apply_perk_to_team, apply_upgrade_to_custom};
use crate::config::ShopTuning;
use crate::numbers::round_f64_to_i64;
use crate::player::PlayerRecord;
use crate::rarity::Rarity;
use crate::rng::RollSource;

/// What a card does once bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardKind {
    PerkTeam,
    UpgradeCustom,
    PlayerCard,
}

impl CardKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerkTeam => "perkTeam",
            Self::UpgradeCustom => "upgradeCustom",
            Self::PlayerCard => "playerCard",
        }
    }
}

/// Kind-specific card contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CardPayload {
    PerkTeam { stat: Attribute, amount: i32 },
    UpgradeCustom { stat: Attribute, amount: i32 },
    /// Older saves tag collected players as `"player"`.
    #[serde(alias = "player")]
    PlayerCard,
}

/// A card offered in the shop or revealed from a pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub rarity: Rarity,
    #[serde(flatten)]
    pub payload: CardPayload,
}

impl Card {
    #[must_use]
    pub const fn kind(&self) -> CardKind {
        match self.payload {
            CardPayload::PerkTeam { .. } => CardKind::PerkTeam,
            CardPayload::UpgradeCustom { .. } => CardKind::UpgradeCustom,
            CardPayload::PlayerCard => CardKind::PlayerCard,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        match self.payload {
            CardPayload::PerkTeam { stat, amount } => {
                format!("{} perk: team {stat} +{amount}", self.rarity)
            }
            CardPayload::UpgradeCustom { stat, amount } => {
                format!("{} upgrade: {stat} +{amount}", self.rarity)
            }
            CardPayload::PlayerCard => format!("{} player", self.rarity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopCardSlot {
    pub card: Card,
    pub price: i64,
    #[serde(default)]
    pub purchased: bool,
}

/// Pack flavours: how many cards a pack reveals and how many the player keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackType {
    Standard,
    Jumbo,
    Ultra,
}

impl PackType {
    pub const ALL: [Self; 3] = [Self::Standard, Self::Jumbo, Self::Ultra];

    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Standard => 3,
            Self::Jumbo | Self::Ultra => 5,
        }
    }

    #[must_use]
    pub const fn pick(self) -> usize {
        match self {
            Self::Standard | Self::Jumbo => 1,
            Self::Ultra => 2,
        }
    }

    #[must_use]
    pub const fn price_multiplier(self, cfg: &ShopTuning) -> f64 {
        match self {
            Self::Standard => cfg.standard_multiplier,
            Self::Jumbo => cfg.jumbo_multiplier,
            Self::Ultra => cfg.ultra_multiplier,
        }
    }
}

impl fmt::Display for PackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standard => "standard",
            Self::Jumbo => "jumbo",
            Self::Ultra => "ultra",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackSlot {
    pub pack_type: PackType,
    #[serde(rename = "packRarity")]
    pub rarity: Rarity,
    pub price: i64,
    #[serde(default)]
    pub purchased: bool,
}

/// Everything on the shelves for one shop visit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopRound {
    pub card_slots: Vec<ShopCardSlot>,
    pub pack_slots: Vec<PackSlot>,
}

/// Uniform draw among every rank the player has unlocked.
pub fn roll_unlocked_rarity<R: RollSource + ?Sized>(unlocked: Rarity, rng: &mut R) -> Rarity {
    let options = unlocked.at_or_below();
    options[rng.pick_index(options.len())]
}

/// Kind roll on `[1, 100]`: perk, then upgrade, then player card.
pub fn roll_card_kind<R: RollSource + ?Sized>(cfg: &ShopTuning, rng: &mut R) -> CardKind {
    let roll = rng.between(1, 100);
    if roll <= cfg.perk_kind_max_roll {
        CardKind::PerkTeam
    } else if roll <= cfg.upgrade_kind_max_roll {
        CardKind::UpgradeCustom
    } else {
        CardKind::PlayerCard
    }
}

fn roll_stat<R: RollSource + ?Sized>(rng: &mut R) -> Attribute {
    Attribute::ALL[rng.pick_index(Attribute::ALL.len())]
}

pub fn generate_perk_card<R: RollSource + ?Sized>(rarity: Rarity, rng: &mut R) -> Card {
    Card {
        rarity,
        payload: CardPayload::PerkTeam {
            stat: roll_stat(rng),
            amount: rarity.boost_amount(),
        },
    }
}

pub fn generate_upgrade_card<R: RollSource + ?Sized>(rarity: Rarity, rng: &mut R) -> Card {
    Card {
        rarity,
        payload: CardPayload::UpgradeCustom {
            stat: roll_stat(rng),
            amount: rarity.boost_amount(),
        },
    }
}

fn generate_card<R: RollSource + ?Sized>(kind: CardKind, rarity: Rarity, rng: &mut R) -> Card {
    match kind {
        CardKind::PerkTeam => generate_perk_card(rarity, rng),
        CardKind::UpgradeCustom => generate_upgrade_card(rarity, rng),
        CardKind::PlayerCard => Card {
            rarity,
            payload: CardPayload::PlayerCard,
        },
    }
}

#[must_use]
pub fn card_price(rarity: Rarity, cfg: &ShopTuning) -> i64 {
    let rank = i64::try_from(rarity.index()).unwrap_or(0);
    cfg.card_base_price + cfg.card_price_step * rank
}

#[must_use]
pub fn pack_price(pack_type: PackType, rarity: Rarity, cfg: &ShopTuning) -> i64 {
    let rank = crate::numbers::usize_to_f64(rarity.index());
    let base = cfg.pack_price_step.mul_add(rank, cfg.pack_base_price);
    round_f64_to_i64(base * pack_type.price_multiplier(cfg))
}

pub fn generate_shop_card_slot<R: RollSource + ?Sized>(
    unlocked: Rarity,
    cfg: &ShopTuning,
    rng: &mut R,
) -> ShopCardSlot {
    let rarity = roll_unlocked_rarity(unlocked, rng);
    let kind = roll_card_kind(cfg, rng);
    let card = generate_card(kind, rarity, rng);
    ShopCardSlot {
        price: card_price(rarity, cfg),
        card,
        purchased: false,
    }
}

pub fn generate_shop_pack_slot<R: RollSource + ?Sized>(
    unlocked: Rarity,
    cfg: &ShopTuning,
    rng: &mut R,
) -> PackSlot {
    let rarity = roll_unlocked_rarity(unlocked, rng);
    let pack_type = PackType::ALL[rng.pick_index(PackType::ALL.len())];
    PackSlot {
        pack_type,
        rarity,
        price: pack_price(pack_type, rarity, cfg),
        purchased: false,
    }
}

pub fn generate_shop_round<R: RollSource + ?Sized>(
    unlocked: Rarity,
    cfg: &ShopTuning,
    rng: &mut R,
) -> ShopRound {
    let card_slots = (0..cfg.card_slots)
        .map(|_| generate_shop_card_slot(unlocked, cfg, rng))
        .collect();
    let pack_slots = (0..cfg.pack_slots)
        .map(|_| generate_shop_pack_slot(unlocked, cfg, rng))
        .collect();
    ShopRound {
        card_slots,
        pack_slots,
    }
}

/// Rarity of one pack card: the pack's own rank, bumped by one and/or two
/// ranks on independent rolls, capped at the top rank.
pub fn roll_pack_card_rarity<R: RollSource + ?Sized>(
    base: Rarity,
    cfg: &ShopTuning,
    rng: &mut R,
) -> Rarity {
    let mut steps = 0;
    if rng.chance(cfg.pack_bump_one_prob) {
        steps += 1;
    }
    if rng.chance(cfg.pack_bump_two_prob) {
        steps += 2;
    }
    base.step_up(steps)
}

/// Reveal every card in a pack.
pub fn open_pack<R: RollSource + ?Sized>(
    pack: &PackSlot,
    cfg: &ShopTuning,
    rng: &mut R,
) -> Vec<Card> {
    let cards: Vec<Card> = (0..pack.pack_type.size())
        .map(|_| {
            let rarity = roll_pack_card_rarity(pack.rarity, cfg, rng);
            let kind = roll_card_kind(cfg, rng);
            generate_card(kind, rarity, rng)
        })
        .collect();
    log::debug!(
        "shop | opened {} {} pack: {}",
        pack.rarity,
        pack.pack_type,
        cards
            .iter()
            .map(Card::display_name)
            .collect::<Vec<_>>()
            .join(", ")
    );
    cards
}

/// Apply a bought card. Perks hit the whole team including the custom
/// player; upgrades raise the custom player's base rating; every card lands
/// in the custom player's collection.
pub fn apply_card(card: &Card, custom: &mut PlayerRecord, team: &mut [PlayerRecord]) {
    match card.payload {
        CardPayload::PerkTeam { stat, amount } => {
            apply_perk_to_team(std::slice::from_mut(custom), stat, amount);
            apply_perk_to_team(team, stat, amount);
        }
        CardPayload::UpgradeCustom { stat, amount } => {
            apply_upgrade_to_custom(custom, stat, amount);
        }
        CardPayload::PlayerCard => {}
    }
    custom.perks_owned.push(card.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Position;
    use crate::rng::{ScriptedRoll, ScriptedRolls};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn card_prices_step_with_rarity() {
        let cfg = ShopTuning::default();
        assert_eq!(card_price(Rarity::Common, &cfg), 10);
        assert_eq!(card_price(Rarity::Gold, &cfg), 40);
        assert_eq!(card_price(Rarity::BlackDiamond, &cfg), 60);
    }

    #[test]
    fn pack_prices_round_after_multiplier() {
        let cfg = ShopTuning::default();
        assert_eq!(pack_price(PackType::Standard, Rarity::Common, &cfg), 15);
        // (15 + 12) * 1.8 = 48.6
        assert_eq!(pack_price(PackType::Jumbo, Rarity::Bronze, &cfg), 49);
        // (15 + 36) * 2.3 = 117.3
        assert_eq!(pack_price(PackType::Ultra, Rarity::Gold, &cfg), 117);
    }

    #[test]
    fn kind_roll_thresholds() {
        let cfg = ShopTuning::default();
        let kinds: Vec<CardKind> = [1, 50, 51, 80, 81, 100]
            .into_iter()
            .map(|roll| roll_card_kind(&cfg, &mut ScriptedRolls::ints([roll])))
            .collect();
        assert_eq!(
            kinds,
            vec![
                CardKind::PerkTeam,
                CardKind::PerkTeam,
                CardKind::UpgradeCustom,
                CardKind::UpgradeCustom,
                CardKind::PlayerCard,
                CardKind::PlayerCard,
            ]
        );
    }

    #[test]
    fn card_slots_stay_within_unlocked_rarity() {
        let cfg = ShopTuning::default();
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..500 {
            let slot = generate_shop_card_slot(Rarity::Silver, &cfg, &mut rng);
            assert!(slot.card.rarity <= Rarity::Silver);
            assert_eq!(slot.price, card_price(slot.card.rarity, &cfg));
            if let CardPayload::PerkTeam { amount, .. } | CardPayload::UpgradeCustom { amount, .. } =
                slot.card.payload
            {
                assert_eq!(amount, slot.card.rarity.boost_amount());
            }
        }
    }

    #[test]
    fn pack_bumps_are_independent_and_capped() {
        let cfg = ShopTuning::default();
        let mut both = ScriptedRolls::new([ScriptedRoll::Unit(0.0), ScriptedRoll::Unit(0.0)]);
        assert_eq!(roll_pack_card_rarity(Rarity::Silver, &cfg, &mut both), Rarity::BlackDiamond);

        let mut both = ScriptedRolls::new([ScriptedRoll::Unit(0.0), ScriptedRoll::Unit(0.0)]);
        assert_eq!(roll_pack_card_rarity(Rarity::Common, &cfg, &mut both), Rarity::Gold);

        let mut none = ScriptedRolls::new([ScriptedRoll::Unit(0.9)]);
        assert_eq!(roll_pack_card_rarity(Rarity::Gold, &cfg, &mut none), Rarity::Gold);
    }

    #[test]
    fn pack_reveals_its_size() {
        let cfg = ShopTuning::default();
        let mut rng = SmallRng::seed_from_u64(17);
        for pack_type in PackType::ALL {
            let pack = PackSlot {
                pack_type,
                rarity: Rarity::Bronze,
                price: pack_price(pack_type, Rarity::Bronze, &cfg),
                purchased: false,
            };
            let cards = open_pack(&pack, &cfg, &mut rng);
            assert_eq!(cards.len(), pack_type.size());
            assert!(cards.iter().all(|card| card.rarity >= Rarity::Bronze));
        }
    }

    #[test]
    fn shop_round_fills_every_slot() {
        let cfg = ShopTuning::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let round = generate_shop_round(Rarity::Bronze, &cfg, &mut rng);
        assert_eq!(round.card_slots.len(), 3);
        assert_eq!(round.pack_slots.len(), 2);
        assert!(round.pack_slots.iter().all(|pack| pack.rarity <= Rarity::Bronze));
    }

    #[test]
    fn applying_cards_routes_effects() {
        let mut custom = PlayerRecord::new("pl_me", "Me", Position::CenterField);
        let mut team = vec![
            PlayerRecord::new("pl_a", "A", Position::Catcher),
            PlayerRecord::new("pl_b", "B", Position::Pitcher),
        ];

        let perk = Card {
            rarity: Rarity::Gold,
            payload: CardPayload::PerkTeam {
                stat: Attribute::Eye,
                amount: 4,
            },
        };
        apply_card(&perk, &mut custom, &mut team);
        assert_eq!(custom.perks_applied.bonus(Attribute::Eye), 4);
        assert!(team.iter().all(|p| p.perks_applied.bonus(Attribute::Eye) == 4));

        let upgrade = Card {
            rarity: Rarity::Silver,
            payload: CardPayload::UpgradeCustom {
                stat: Attribute::Contact,
                amount: 3,
            },
        };
        apply_card(&upgrade, &mut custom, &mut team);
        assert_eq!(custom.attributes.contact, 53);
        assert!(team.iter().all(|p| p.attributes.contact == 50));

        let player_card = Card {
            rarity: Rarity::Common,
            payload: CardPayload::PlayerCard,
        };
        let before = custom.attributes;
        apply_card(&player_card, &mut custom, &mut team);
        assert_eq!(custom.attributes, before);
        assert_eq!(custom.perks_owned.len(), 3);
        assert_eq!(custom.perks_owned[2].kind(), CardKind::PlayerCard);
    }

    #[test]
    fn card_serializes_with_kind_tag() {
        let card = Card {
            rarity: Rarity::Diamond,
            payload: CardPayload::UpgradeCustom {
                stat: Attribute::Power,
                amount: 5,
            },
        };
        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["kind"], "upgradeCustom");
        assert_eq!(value["rarity"], "diamond");
        assert_eq!(value["stat"], "power");
        let back: Card = serde_json::from_value(value).unwrap();
        assert_eq!(back, card);
    }
}
