//! Retroball Game Engine
//!
//! Platform-agnostic core for the Retroball pixel-art baseball roguelike:
//! the at-bat resolution model, the attribute model, the draft generator and
//! the shop economy. Rendering, input and persistence backends live outside
//! this crate and plug in through [`DataLoader`] and [`PlayerStore`].

pub mod at_bat;
pub mod attributes;
pub mod config;
pub mod constants;
pub mod creator;
pub mod draft;
pub mod numbers;
pub mod player;
pub mod rarity;
pub mod rng;
pub mod seed;
pub mod session;
pub mod shop;

// Re-export commonly used types
pub use at_bat::{
    AtBatCount, AtBatOutcome, AtBatResult, AtBatTrace, SwingType, calculate_hit_chance,
    check_walk, choose_swing, primary_pitch, resolve_at_bat, resolve_at_bat_with_trace,
    select_pitch, walk_chance,
};
pub use attributes::{
    Attribute, Attributes, PerkOverlay, apply_perk_to_team, apply_upgrade_to_custom,
    compute_overall, effective_attribute, effective_pitch_rating,
};
pub use config::{AtBatTuning, DraftTuning, EconomyTuning, ShopTuning, TuningConfig, TuningError};
pub use creator::{CreatorChoices, clone_for_role, make_new_player};
pub use draft::{VarianceKind, generate_draft_class, generate_random_draft_player, rebalance};
pub use player::{
    BatHand, Cosmetics, Hand, ParseError, PitchArsenal, PitchHistory, PitchType, PlayerRecord,
    Position, Role,
};
pub use rarity::Rarity;
pub use rng::{CountingRng, RngBundle, RngDomain, RollSource, ScriptedRoll, ScriptedRolls};
pub use seed::{decode_share_code, encode_share_code, share_code_from_entropy};
pub use session::{GameSession, Half, PlateAppearance, PurchaseError, Scoreboard};
pub use shop::{
    Card, CardKind, CardPayload, PackSlot, PackType, ShopCardSlot, ShopRound, generate_perk_card,
    generate_shop_card_slot, generate_shop_pack_slot, generate_shop_round, generate_upgrade_card,
    open_pack,
};

/// Name under which the tuning override is requested from a [`DataLoader`].
pub const TUNING_CONFIG_NAME: &str = "tuning";

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load configuration data for a specific system
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Opaque string-keyed store for serialized player records.
/// Platform-specific implementations should provide this
pub trait PlayerStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store `payload` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn set(&self, key: &str, payload: &str) -> Result<(), Self::Error>;

    /// Fetch the payload stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Remove the payload stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be removed.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

/// Main game engine for creating players and sessions
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: PlayerStore,
{
    data_loader: L,
    store: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: PlayerStore,
{
    /// Create a new game engine with the provided data loader and store
    pub const fn new(data_loader: L, store: S) -> Self {
        Self { data_loader, store }
    }

    /// Load tuning through the data loader. Overrides that break a tuning
    /// invariant are discarded in favour of the built-in tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn load_tuning(&self) -> Result<TuningConfig, L::Error> {
        let tuning: TuningConfig = self.data_loader.load_config(TUNING_CONFIG_NAME)?;
        if let Err(err) = tuning.validate() {
            log::warn!("engine | rejecting tuning override: {err}");
            return Ok(TuningConfig::default());
        }
        Ok(tuning)
    }

    /// Roll a fresh custom player from the creation stream of `seed`.
    #[must_use]
    pub fn create_player(&self, id: &str, choices: &CreatorChoices, seed: u64) -> PlayerRecord {
        let mut rng = RngBundle::from_user_seed(seed);
        make_new_player(id, choices, rng.creation())
    }

    /// Start a run for `player`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tuning configuration cannot be loaded.
    pub fn create_session(&self, player: PlayerRecord, seed: u64) -> Result<GameSession, L::Error> {
        let tuning = self.load_tuning()?;
        Ok(GameSession::new(player, tuning, seed))
    }

    /// Save a player record
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or stored.
    pub fn save_player(&self, key: &str, player: &PlayerRecord) -> Result<(), anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let payload = serde_json::to_string(player)?;
        self.store.set(key, &payload).map_err(Into::into)
    }

    /// Load a player record, re-normalizing it so stored derived values are
    /// never trusted.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the payload is not a player.
    pub fn load_player(&self, key: &str) -> Result<Option<PlayerRecord>, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let Some(payload) = self.store.get(key).map_err(Into::into)? else {
            return Ok(None);
        };
        let player = PlayerRecord::from_json(&payload)?;
        Ok(Some(player))
    }

    /// Delete a saved player
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be removed.
    pub fn delete_player(&self, key: &str) -> Result<(), S::Error> {
        self.store.remove(key)
    }
}
