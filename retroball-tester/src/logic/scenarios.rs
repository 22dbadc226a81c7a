//! Named logic scenarios. Each one drives the engine from a single seed and
//! fails with a readable message when an invariant or an observed rate is off.

use anyhow::{Context, Result, ensure};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use retroball_game::{
    AtBatCount, AtBatOutcome, Attribute, CreatorChoices, DraftTuning, GameSession, Hand,
    PackSlot, PackType, PitchArsenal, PitchType, PlayerRecord, Position, PurchaseError, Rarity,
    RngBundle, ShopTuning, TuningConfig, decode_share_code, encode_share_code,
    generate_random_draft_player, make_new_player, open_pack, resolve_at_bat, walk_chance,
};

/// Innings in a regulation game.
const REGULATION_INNINGS: u32 = 9;
/// Guard against a run that never records outs.
const MAX_PLATE_APPEARANCES: u32 = 2_000;
const RATE_SAMPLES: u32 = 2_000;
const RATE_TOLERANCE: f64 = 0.04;
const PACK_SAMPLES: u32 = 500;

pub struct Scenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    run: fn(u64) -> Result<()>,
}

impl Scenario {
    /// Run the scenario once for `seed`.
    ///
    /// # Errors
    ///
    /// Returns the first violated expectation.
    pub fn run(&self, seed: u64) -> Result<()> {
        (self.run)(seed).with_context(|| format!("{} (seed {seed})", self.name))
    }
}

static SCENARIOS: [Scenario; 8] = [
    Scenario {
        key: "smoke",
        name: "Smoke",
        description: "Create a player, start a session and play a few plate appearances",
        run: smoke,
    },
    Scenario {
        key: "full-run",
        name: "Full Run",
        description: "Play nine innings with a shop visit after every half-inning",
        run: full_run,
    },
    Scenario {
        key: "deterministic-replay",
        name: "Deterministic Replay",
        description: "The same seed replays the same plate appearances, shop and draft",
        run: deterministic_replay,
    },
    Scenario {
        key: "share-code-consistency",
        name: "Share Code Consistency",
        description: "Share codes decode to seeds that encode back to the same code",
        run: share_code_consistency,
    },
    Scenario {
        key: "walk-rate",
        name: "Walk Rate",
        description: "Observed walk rate tracks the pitcher's control",
        run: walk_rate,
    },
    Scenario {
        key: "draft-bands",
        name: "Draft Bands",
        description: "Drafted players land in their rarity band with an exact overall",
        run: draft_bands,
    },
    Scenario {
        key: "pack-odds",
        name: "Pack Odds",
        description: "Pack cards never drop below the pack rarity and bump at the tuned rate",
        run: pack_odds,
    },
    Scenario {
        key: "shop-economy",
        name: "Shop Economy",
        description: "Purchases charge exactly, refuse when broke and respect the overlay cap",
        run: shop_economy,
    },
];

/// Every registered scenario key with its description.
pub fn list_scenarios() -> impl Iterator<Item = (&'static str, &'static str)> {
    SCENARIOS.iter().map(|s| (s.key, s.description))
}

/// Keys accepted by `--scenarios all`.
pub fn scenario_keys() -> impl Iterator<Item = &'static str> {
    SCENARIOS.iter().map(|s| s.key)
}

#[must_use]
pub fn get_scenario(key: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.key.eq_ignore_ascii_case(key))
}

fn new_session(seed: u64) -> GameSession {
    let mut bundle = RngBundle::from_user_seed(seed);
    let choices = CreatorChoices::new("Tester", Position::Shortstop, Hand::Right);
    let player = make_new_player("pl_tester", &choices, bundle.creation());
    GameSession::new(player, TuningConfig::default(), seed)
}

fn count_for(pa: u32) -> AtBatCount {
    AtBatCount::new(0, u8::try_from(pa % 3).unwrap_or(0))
}

fn check_overlay(player: &PlayerRecord) -> Result<()> {
    for (attr, bonus) in player.perks_applied.iter() {
        let total = player.attributes.get(attr) + bonus;
        ensure!(
            total <= 99,
            "{} has {attr} {total} with overlay applied",
            player.id
        );
    }
    Ok(())
}

fn smoke(seed: u64) -> Result<()> {
    let mut session = new_session(seed);
    ensure!(session.player().currency == 50, "new players start with 50 currency");
    ensure!(
        session.pitcher().rarity <= session.player().unlocked_max_rarity,
        "opposing pitcher above the unlocked rarity"
    );
    for pa in 0..30 {
        let before = session.player().currency;
        let outcome = session.play_at_bat(count_for(pa));
        ensure!(
            session.player().currency == before + outcome.currency_earned,
            "currency moved by something other than the reward"
        );
        let board = session.scoreboard();
        ensure!(board.outs < 3, "{} outs on the board", board.outs);
        ensure!(board.runners <= 3, "{} runners on base", board.runners);
    }
    ensure!(session.plate_appearances() == 30, "plate appearances not counted");
    Ok(())
}

fn full_run(seed: u64) -> Result<()> {
    let mut session = new_session(seed);
    let mut runs = 0u32;

    while session.scoreboard().inning <= REGULATION_INNINGS {
        let pa = session.plate_appearances();
        ensure!(
            pa < MAX_PLATE_APPEARANCES,
            "no result after {pa} plate appearances"
        );
        let outcome = session.play_at_bat(count_for(pa));
        runs += outcome.runs_scored;
        ensure!(
            session.player().pitch_history.len() <= 3,
            "pitch history grew past three"
        );
        ensure!(
            session.pitcher().attributes.stamina >= 1,
            "pitcher stamina fell below the floor"
        );

        if outcome.half_inning_ended {
            let prices: Vec<i64> = session
                .visit_shop()
                .card_slots
                .iter()
                .map(|slot| slot.price)
                .collect();
            if let Some(index) = prices
                .iter()
                .position(|&price| price <= session.player().currency)
            {
                session.buy_card(index)?;
            }
            session.leave_shop();
            ensure!(session.player().currency >= 0, "currency went negative");
            check_overlay(session.player())?;
        }
    }

    let board = session.scoreboard();
    ensure!(
        board.visiting + board.home == runs,
        "scoreboard {}-{} disagrees with {runs} runs scored",
        board.visiting,
        board.home
    );
    log::debug!(
        "full-run | seed {seed}: {} plate appearances, {}-{}, level {}",
        session.plate_appearances(),
        board.visiting,
        board.home,
        session.player().level
    );
    Ok(())
}

fn deterministic_replay(seed: u64) -> Result<()> {
    let play = |seed| {
        let mut session = new_session(seed);
        let outcomes: Vec<_> = (0..40).map(|pa| session.play_at_bat(count_for(pa))).collect();
        let shop = session.visit_shop().clone();
        let offers = session.draft_offers(3).to_vec();
        let draws = session.rng().draw_counts();
        (outcomes, shop, offers, *session.scoreboard(), draws)
    };
    let first = play(seed);
    let second = play(seed);
    ensure!(first.0 == second.0, "plate appearances diverged on replay");
    ensure!(first.1 == second.1, "shop round diverged on replay");
    ensure!(first.2 == second.2, "draft offers diverged on replay");
    ensure!(first.3 == second.3, "scoreboard diverged on replay");
    ensure!(
        first.4 == second.4,
        "stream draw counts diverged on replay: {:?} vs {:?}",
        first.4,
        second.4
    );
    Ok(())
}

fn share_code_consistency(seed: u64) -> Result<()> {
    let code = encode_share_code(seed);
    let decoded = decode_share_code(&code).with_context(|| format!("{code} did not decode"))?;
    ensure!(
        encode_share_code(decoded) == code,
        "{code} decoded to a seed with a different code"
    );
    ensure!(
        decode_share_code(&code.to_lowercase()) == Some(decoded),
        "{code} is case sensitive"
    );
    Ok(())
}

fn observed_walk_rate(control: i32, rng: &mut SmallRng) -> f64 {
    let cfg = TuningConfig::default().at_bat;
    let mut pitcher = PlayerRecord::new("pl_p", "Rate Pitcher", Position::Pitcher);
    pitcher.attributes.control = control;
    pitcher.pitches = PitchArsenal::from_ratings([(PitchType::Fastball, 70)]);
    let mut batter = PlayerRecord::new("pl_b", "Rate Batter", Position::CenterField);
    let mut walks = 0u32;
    for _ in 0..RATE_SAMPLES {
        let result = resolve_at_bat(
            &mut pitcher,
            &mut batter,
            AtBatCount::default(),
            0,
            &cfg,
            rng,
        );
        if result.outcome == AtBatOutcome::Walk {
            walks += 1;
        }
    }
    f64::from(walks) / f64::from(RATE_SAMPLES)
}

fn walk_rate(seed: u64) -> Result<()> {
    let cfg = TuningConfig::default().at_bat;
    let mut rng = SmallRng::seed_from_u64(seed);
    for control in [10, 50, 90] {
        let mut reference = PlayerRecord::new("pl_ref", "Reference", Position::Pitcher);
        reference.attributes.control = control;
        let expected = walk_chance(&reference, &cfg) / 100.0;
        let observed = observed_walk_rate(control, &mut rng);
        ensure!(
            (observed - expected).abs() <= RATE_TOLERANCE,
            "control {control} walked {observed:.3}, expected {expected:.3}"
        );
    }
    Ok(())
}

fn draft_bands(seed: u64) -> Result<()> {
    let cfg = DraftTuning::default();
    let mut rng = SmallRng::seed_from_u64(seed);
    for rarity in Rarity::ALL {
        let band = cfg.band(rarity);
        for position in Position::ROSTER {
            for _ in 0..5 {
                let player = generate_random_draft_player(position, rarity, None, &cfg, &mut rng);
                ensure!(
                    band.contains(player.overall),
                    "{rarity} {position} drafted at {}",
                    player.overall
                );
                let rated = Attribute::rated_for(position);
                let count = i32::try_from(rated.len()).unwrap_or(1);
                ensure!(
                    player.attributes.sum(rated) == player.overall * count,
                    "{rarity} {position} rated attributes do not sum to overall"
                );
                ensure!(
                    player.pitches.rating(PitchType::Fastball).is_some() == position.is_pitcher(),
                    "{position} arsenal mismatch"
                );
            }
        }
    }
    Ok(())
}

fn pack_odds(seed: u64) -> Result<()> {
    let cfg = ShopTuning::default();
    let mut rng = SmallRng::seed_from_u64(seed);
    let pack = PackSlot {
        pack_type: PackType::Standard,
        rarity: Rarity::Gold,
        price: 0,
        purchased: false,
    };
    let mut cards = 0u32;
    let mut bumped = 0u32;
    for _ in 0..PACK_SAMPLES {
        for card in open_pack(&pack, &cfg, &mut rng) {
            ensure!(card.rarity >= Rarity::Gold, "{} card in a gold pack", card.rarity);
            cards += 1;
            if card.rarity > Rarity::Gold {
                bumped += 1;
            }
        }
    }
    ensure!(cards == PACK_SAMPLES * 3, "standard packs hold three cards");
    let expected = cfg.pack_bump_one_prob + cfg.pack_bump_two_prob;
    let observed = f64::from(bumped) / f64::from(cards);
    ensure!(
        (observed - expected).abs() <= RATE_TOLERANCE,
        "bump rate {observed:.3}, expected {expected:.3}"
    );
    Ok(())
}

fn shop_economy(seed: u64) -> Result<()> {
    let mut session = new_session(seed);
    session.player_mut().currency = 500;
    let round = session.visit_shop().clone();

    let mut spent = 0i64;
    for (index, slot) in round.card_slots.iter().enumerate() {
        session.buy_card(index)?;
        spent += slot.price;
    }
    for (index, slot) in round.pack_slots.iter().enumerate() {
        if slot.price > session.player().currency {
            continue;
        }
        let cards = session.buy_pack(index)?;
        ensure!(
            cards.len() == slot.pack_type.size(),
            "{} opened {} cards",
            slot.pack_type,
            cards.len()
        );
        spent += slot.price;
    }
    ensure!(
        session.player().currency == 500 - spent,
        "charged {} for {spent} worth of goods",
        500 - session.player().currency
    );
    ensure!(
        session.buy_card(0) == Err(PurchaseError::AlreadyPurchased(0)),
        "sold slot could be bought twice"
    );
    check_overlay(session.player())?;

    session.player_mut().currency = 0;
    session.visit_shop();
    let before = session.player().perks_owned.len();
    ensure!(
        matches!(
            session.buy_card(0),
            Err(PurchaseError::InsufficientFunds { .. })
        ),
        "broke player bought a card"
    );
    ensure!(
        session.player().perks_owned.len() == before && session.player().currency == 0,
        "refused purchase left side effects"
    );
    Ok(())
}
