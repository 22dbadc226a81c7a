//! Game session: the explicit context that owns the run's mutable state.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::at_bat::{AtBatCount, AtBatOutcome, AtBatResult, resolve_at_bat};
use crate::config::TuningConfig;
use crate::constants::{
    LOG_CARD_COLLECTED, LOG_DRAFT_SIGNED, LOG_HALF_INNING_END, LOG_LEVEL_UP, LOG_PERK_APPLIED,
    LOG_RUN_SCORED, LOG_SHOP_PACK_OPENED, LOG_SHOP_PURCHASE, LOG_UPGRADE_APPLIED,
};
use crate::draft::{generate_draft_class, generate_random_draft_player};
use crate::player::{PlayerRecord, Position};
use crate::rng::RngBundle;
use crate::shop::{Card, CardKind, ShopRound, apply_card, generate_shop_round, open_pack};

/// Reasons a purchase or signing is refused. The session is left untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("the shop is closed")]
    ShopClosed,
    #[error("no offer in slot {0}")]
    UnknownSlot(usize),
    #[error("slot {0} was already purchased")]
    AlreadyPurchased(usize),
    #[error("costs {price} but only {available} available")]
    InsufficientFunds { price: i64, available: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Half {
    #[default]
    Top,
    Bottom,
}

/// Inning, outs, occupied bases and the running score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scoreboard {
    pub inning: u32,
    pub half: Half,
    pub outs: u8,
    /// Occupied bases, `0..=3`.
    pub runners: u8,
    pub visiting: u32,
    pub home: u32,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self {
            inning: 1,
            half: Half::Top,
            outs: 0,
            runners: 0,
            visiting: 0,
            home: 0,
        }
    }
}

impl Scoreboard {
    fn credit_runs(&mut self, runs: u32) {
        match self.half {
            Half::Top => self.visiting += runs,
            Half::Bottom => self.home += runs,
        }
    }

    /// Move runners for a batter reaching base. Returns runs scored.
    fn advance(&mut self, outcome: AtBatOutcome) -> u32 {
        match outcome {
            AtBatOutcome::Walk | AtBatOutcome::Single | AtBatOutcome::BuntHit => {
                if self.runners >= 3 {
                    1
                } else {
                    self.runners += 1;
                    0
                }
            }
            AtBatOutcome::ExtraBaseHit => {
                let runs = u32::from(self.runners);
                self.runners = 1;
                runs
            }
            AtBatOutcome::Strike | AtBatOutcome::BuntOut => 0,
        }
    }

    fn end_half(&mut self) {
        self.outs = 0;
        self.runners = 0;
        self.half = match self.half {
            Half::Top => Half::Bottom,
            Half::Bottom => {
                self.inning += 1;
                Half::Top
            }
        };
    }
}

/// Everything one call to [`GameSession::play_at_bat`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateAppearance {
    pub result: AtBatResult,
    pub runs_scored: u32,
    pub currency_earned: i64,
    pub half_inning_ended: bool,
    pub leveled_up: bool,
}

/// Owns the custom player, the roster, the scoreboard, the current shop and
/// the per-domain RNG streams. Nothing in the engine reaches for ambient state.
#[derive(Debug, Clone)]
pub struct GameSession {
    seed: u64,
    tuning: TuningConfig,
    player: PlayerRecord,
    team: Vec<PlayerRecord>,
    pitcher: PlayerRecord,
    scoreboard: Scoreboard,
    shop: Option<ShopRound>,
    offers: Vec<PlayerRecord>,
    logs: Vec<String>,
    rng: RngBundle,
    plate_appearances: u32,
}

impl GameSession {
    /// Start a run for `player`. The opposing pitcher is drafted at the
    /// player's unlocked rarity from the draft stream.
    #[must_use]
    pub fn new(player: PlayerRecord, tuning: TuningConfig, seed: u64) -> Self {
        let mut rng = RngBundle::from_user_seed(seed);
        let pitcher = generate_random_draft_player(
            Position::Pitcher,
            player.unlocked_max_rarity,
            None,
            &tuning.draft,
            rng.draft(),
        );
        Self {
            seed,
            tuning,
            player,
            team: Vec::new(),
            pitcher,
            scoreboard: Scoreboard::default(),
            shop: None,
            offers: Vec::new(),
            logs: Vec::new(),
            rng,
            plate_appearances: 0,
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn tuning(&self) -> &TuningConfig {
        &self.tuning
    }

    #[must_use]
    pub const fn player(&self) -> &PlayerRecord {
        &self.player
    }

    pub const fn player_mut(&mut self) -> &mut PlayerRecord {
        &mut self.player
    }

    /// Hand the custom player back, e.g. for saving.
    #[must_use]
    pub fn into_player(self) -> PlayerRecord {
        self.player
    }

    #[must_use]
    pub fn team(&self) -> &[PlayerRecord] {
        &self.team
    }

    #[must_use]
    pub const fn pitcher(&self) -> &PlayerRecord {
        &self.pitcher
    }

    /// Replace the opposing pitcher.
    pub fn set_pitcher(&mut self, mut pitcher: PlayerRecord) {
        pitcher.normalize();
        self.pitcher = pitcher;
    }

    #[must_use]
    pub const fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    #[must_use]
    pub const fn shop(&self) -> Option<&ShopRound> {
        self.shop.as_ref()
    }

    #[must_use]
    pub fn offers(&self) -> &[PlayerRecord] {
        &self.offers
    }

    /// Player-facing log keys in the order they happened.
    #[must_use]
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    #[must_use]
    pub const fn plate_appearances(&self) -> u32 {
        self.plate_appearances
    }

    #[must_use]
    pub const fn rng(&self) -> &RngBundle {
        &self.rng
    }

    fn log(&mut self, key: &str) {
        self.logs.push(key.to_string());
    }

    /// Resolve one plate appearance: the custom player bats against the
    /// session's pitcher with the current base state, then rewards, outs,
    /// runs and experience are applied.
    pub fn play_at_bat(&mut self, count: AtBatCount) -> PlateAppearance {
        let result = resolve_at_bat(
            &mut self.pitcher,
            &mut self.player,
            count,
            self.scoreboard.runners,
            &self.tuning.at_bat,
            self.rng.at_bat(),
        );
        self.plate_appearances = self.plate_appearances.saturating_add(1);
        self.log(result.outcome.log_key());

        let economy = &self.tuning.economy;
        let currency_earned = match result.outcome {
            AtBatOutcome::Walk => economy.walk_reward,
            AtBatOutcome::Single | AtBatOutcome::BuntHit => economy.single_reward,
            AtBatOutcome::ExtraBaseHit => economy.extra_base_reward,
            AtBatOutcome::Strike | AtBatOutcome::BuntOut => 0,
        };
        self.player.currency = self.player.currency.saturating_add(currency_earned);

        let runs_scored = self.scoreboard.advance(result.outcome);
        if runs_scored > 0 {
            self.scoreboard.credit_runs(runs_scored);
            for _ in 0..runs_scored {
                self.log(LOG_RUN_SCORED);
            }
        }

        let mut half_inning_ended = false;
        if result.outcome.is_out() {
            self.scoreboard.outs = self.scoreboard.outs.saturating_add(1);
            if self.scoreboard.outs >= self.tuning.economy.outs_per_half_inning {
                let finished = self.scoreboard;
                self.scoreboard.end_half();
                half_inning_ended = true;
                self.log(LOG_HALF_INNING_END);
                log::info!(
                    "session | end of {:?} {} ({}-{})",
                    finished.half,
                    finished.inning,
                    finished.visiting,
                    finished.home
                );
            }
        }

        let leveled_up = self.grant_xp(self.tuning.economy.xp_per_plate_appearance);

        PlateAppearance {
            result,
            runs_scored,
            currency_earned,
            half_inning_ended,
            leveled_up,
        }
    }

    /// Add experience, levelling up as many times as the total allows.
    /// Leftover xp carries into the next level.
    pub fn grant_xp(&mut self, amount: u32) -> bool {
        let growth = self.tuning.economy.xp_threshold_growth;
        self.player.xp = self.player.xp.saturating_add(amount);
        let mut leveled = false;
        while self.player.xp >= self.player.xp_to_next_level.max(1) {
            self.player.xp -= self.player.xp_to_next_level.max(1);
            self.player.level = self.player.level.saturating_add(1);
            self.player.xp_to_next_level = self.player.xp_to_next_level.saturating_add(growth).max(1);
            leveled = true;
            self.log(LOG_LEVEL_UP);
            log::debug!(
                "session | {} reached level {}",
                self.player.name,
                self.player.level
            );
        }
        leveled
    }

    /// Roll a fresh shop round at the player's unlocked rarity.
    pub fn visit_shop(&mut self) -> &ShopRound {
        let round = generate_shop_round(
            self.player.unlocked_max_rarity,
            &self.tuning.shop,
            self.rng.shop(),
        );
        self.shop.insert(round)
    }

    /// Close the shop, discarding unsold offers.
    pub fn leave_shop(&mut self) {
        self.shop = None;
    }

    fn charge(&mut self, price: i64) -> Result<(), PurchaseError> {
        if self.player.currency < price {
            return Err(PurchaseError::InsufficientFunds {
                price,
                available: self.player.currency,
            });
        }
        self.player.currency -= price;
        Ok(())
    }

    fn apply_bought(&mut self, card: &Card) {
        apply_card(card, &mut self.player, &mut self.team);
        self.log(match card.kind() {
            CardKind::PerkTeam => LOG_PERK_APPLIED,
            CardKind::UpgradeCustom => LOG_UPGRADE_APPLIED,
            CardKind::PlayerCard => LOG_CARD_COLLECTED,
        });
    }

    /// Buy the card in `index` and apply its effect.
    ///
    /// # Errors
    ///
    /// Fails without side effects if the shop is closed, the slot is
    /// missing or sold, or the player cannot afford it.
    pub fn buy_card(&mut self, index: usize) -> Result<Card, PurchaseError> {
        let shop = self.shop.as_ref().ok_or(PurchaseError::ShopClosed)?;
        let slot = shop
            .card_slots
            .get(index)
            .ok_or(PurchaseError::UnknownSlot(index))?;
        if slot.purchased {
            return Err(PurchaseError::AlreadyPurchased(index));
        }
        let (card, price) = (slot.card.clone(), slot.price);
        self.charge(price)?;
        if let Some(slot) = self
            .shop
            .as_mut()
            .and_then(|shop| shop.card_slots.get_mut(index))
        {
            slot.purchased = true;
        }
        self.log(LOG_SHOP_PURCHASE);
        self.apply_bought(&card);
        log::debug!("shop | bought {} for {price}", card.display_name());
        Ok(card)
    }

    /// Buy the pack in `index`, open it and apply every revealed card.
    ///
    /// # Errors
    ///
    /// Same conditions as [`GameSession::buy_card`].
    pub fn buy_pack(&mut self, index: usize) -> Result<Vec<Card>, PurchaseError> {
        let shop = self.shop.as_ref().ok_or(PurchaseError::ShopClosed)?;
        let pack = *shop
            .pack_slots
            .get(index)
            .ok_or(PurchaseError::UnknownSlot(index))?;
        if pack.purchased {
            return Err(PurchaseError::AlreadyPurchased(index));
        }
        self.charge(pack.price)?;
        if let Some(slot) = self
            .shop
            .as_mut()
            .and_then(|shop| shop.pack_slots.get_mut(index))
        {
            slot.purchased = true;
        }
        self.log(LOG_SHOP_PURCHASE);
        let cards = open_pack(&pack, &self.tuning.shop, self.rng.shop());
        self.log(LOG_SHOP_PACK_OPENED);
        for card in &cards {
            self.apply_bought(card);
        }
        Ok(cards)
    }

    /// Roll `count` draft candidates up to the player's unlocked rarity,
    /// replacing any previous offers.
    pub fn draft_offers(&mut self, count: usize) -> &[PlayerRecord] {
        self.offers = generate_draft_class(
            count,
            self.player.unlocked_max_rarity,
            Some(self.player.cosmetics.team_color.as_str()),
            &self.tuning.draft,
            self.rng.draft(),
        );
        &self.offers
    }

    /// Move the offer at `index` onto the roster.
    ///
    /// # Errors
    ///
    /// Returns [`PurchaseError::UnknownSlot`] if there is no such offer.
    pub fn sign_draftee(&mut self, index: usize) -> Result<&PlayerRecord, PurchaseError> {
        if index >= self.offers.len() {
            return Err(PurchaseError::UnknownSlot(index));
        }
        let mut signed = self.offers.remove(index);
        signed.role = None;
        log::debug!("draft | signed {} ({})", signed.name, signed.position);
        self.team.push(signed);
        self.log(LOG_DRAFT_SIGNED);
        self.team
            .last()
            .ok_or(PurchaseError::UnknownSlot(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rarity::Rarity;

    fn session() -> GameSession {
        let mut player = PlayerRecord::new("pl_me", "Me", Position::CenterField);
        player.currency = 50;
        GameSession::new(player, TuningConfig::default(), 0xBA5E)
    }

    #[test]
    fn bases_force_runs_when_loaded() {
        let mut board = Scoreboard::default();
        assert_eq!(board.advance(AtBatOutcome::Walk), 0);
        assert_eq!(board.advance(AtBatOutcome::Single), 0);
        assert_eq!(board.advance(AtBatOutcome::BuntHit), 0);
        assert_eq!(board.runners, 3);
        assert_eq!(board.advance(AtBatOutcome::Walk), 1);
        assert_eq!(board.runners, 3);
        assert_eq!(board.advance(AtBatOutcome::ExtraBaseHit), 3);
        assert_eq!(board.runners, 1);
    }

    #[test]
    fn half_innings_alternate_and_advance_inning() {
        let mut board = Scoreboard {
            runners: 2,
            outs: 2,
            ..Scoreboard::default()
        };
        board.end_half();
        assert_eq!((board.inning, board.half, board.outs, board.runners), (1, Half::Bottom, 0, 0));
        board.end_half();
        assert_eq!((board.inning, board.half), (2, Half::Top));
    }

    #[test]
    fn xp_levels_carry_over() {
        let mut session = session();
        assert!(!session.grant_xp(9));
        assert!(session.grant_xp(3));
        assert_eq!(session.player().level, 2);
        assert_eq!(session.player().xp, 2);
        assert_eq!(session.player().xp_to_next_level, 15);
        assert!(session.grant_xp(40));
        assert_eq!(session.player().level, 4);
        assert_eq!(session.player().xp, 2 + 40 - 15 - 20);
    }

    #[test]
    fn purchases_require_open_shop_and_funds() {
        let mut session = session();
        assert_eq!(session.buy_card(0), Err(PurchaseError::ShopClosed));
        session.visit_shop();
        assert_eq!(session.buy_card(9), Err(PurchaseError::UnknownSlot(9)));

        session.player_mut().currency = 0;
        let price = session.shop().map(|s| s.card_slots[0].price).unwrap_or_default();
        assert_eq!(
            session.buy_card(0),
            Err(PurchaseError::InsufficientFunds {
                price,
                available: 0
            })
        );

        session.player_mut().currency = 500;
        let card = session.buy_card(0).unwrap();
        assert_eq!(session.player().currency, 500 - price);
        assert_eq!(session.player().perks_owned.last(), Some(&card));
        assert_eq!(session.buy_card(0), Err(PurchaseError::AlreadyPurchased(0)));
    }

    #[test]
    fn pack_purchase_applies_every_card() {
        let mut session = session();
        session.player_mut().currency = 1_000;
        session.visit_shop();
        let cards = session.buy_pack(1).unwrap();
        assert!(!cards.is_empty());
        assert_eq!(session.player().perks_owned.len(), cards.len());
        assert!(session.logs().iter().any(|key| key == LOG_SHOP_PACK_OPENED));
    }

    #[test]
    fn signing_moves_offer_to_team() {
        let mut session = session();
        session.player_mut().unlocked_max_rarity = Rarity::Gold;
        assert_eq!(session.draft_offers(4).len(), 4);
        assert!(session.offers().iter().all(|p| p.rarity <= Rarity::Gold));
        let signed_id = session.offers()[2].id.clone();
        let signed = session.sign_draftee(2).unwrap();
        assert_eq!(signed.id, signed_id);
        assert_eq!(signed.role, None);
        assert_eq!(session.team().len(), 1);
        assert_eq!(session.offers().len(), 3);
        assert!(session.sign_draftee(7).is_err());
    }

    #[test]
    fn plate_appearances_feed_economy_and_xp() {
        let mut session = session();
        let start = session.player().currency;
        let mut earned = 0;
        for _ in 0..30 {
            let pa = session.play_at_bat(AtBatCount::default());
            earned += pa.currency_earned;
            assert!(session.scoreboard().outs < 3);
            assert!(session.scoreboard().runners <= 3);
            assert!(session.player().pitch_history.len() <= 3);
        }
        assert_eq!(session.player().currency, start + earned);
        assert_eq!(session.plate_appearances(), 30);
        // 30 xp: 10 to reach level 2, 15 to reach level 3, 5 left over
        assert_eq!(session.player().level, 3);
        assert_eq!(session.player().xp, 5);
    }
}
