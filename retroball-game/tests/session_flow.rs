use retroball_game::{
    AtBatCount, AtBatOutcome, CreatorChoices, GameSession, Half, Hand, Position, PurchaseError,
    Rarity, RngBundle, TuningConfig, make_new_player,
};

fn new_session(seed: u64) -> GameSession {
    let mut bundle = RngBundle::from_user_seed(seed);
    let choices = CreatorChoices::new("Flow", Position::Shortstop, Hand::Right);
    let player = make_new_player("pl_flow", &choices, bundle.creation());
    GameSession::new(player, TuningConfig::default(), seed)
}

#[test]
fn a_full_run_keeps_every_invariant() {
    let mut session = new_session(0x00C0_FFEE);
    let mut outs_recorded = 0u32;
    let mut halves_ended = 0u32;
    let mut runs = 0u32;

    for pa in 0..120_u32 {
        let strikes = u8::try_from(pa % 3).unwrap_or(0);
        let before = session.player().currency;
        let outcome = session.play_at_bat(AtBatCount::new(0, strikes));
        let reward = match outcome.result.outcome {
            AtBatOutcome::Walk => 2,
            AtBatOutcome::Single | AtBatOutcome::BuntHit => 3,
            AtBatOutcome::ExtraBaseHit => 6,
            AtBatOutcome::Strike | AtBatOutcome::BuntOut => 0,
        };
        assert_eq!(session.player().currency, before + reward);
        if outcome.result.outcome.is_out() {
            outs_recorded += 1;
        }
        if outcome.half_inning_ended {
            halves_ended += 1;
            assert_eq!(session.scoreboard().outs, 0);
            assert_eq!(session.scoreboard().runners, 0);
        }
        runs += outcome.runs_scored;

        let board = session.scoreboard();
        assert!(board.outs < 3);
        assert!(board.runners <= 3);
        assert!(session.player().pitch_history.len() <= 3);
        assert!(session.pitcher().attributes.stamina >= 1);
    }

    assert_eq!(halves_ended, outs_recorded / 3);
    let board = session.scoreboard();
    assert_eq!(board.visiting + board.home, runs);
    let expected_inning = 1 + halves_ended / 2;
    assert_eq!(board.inning, expected_inning);
    let expected_half = if halves_ended % 2 == 0 { Half::Top } else { Half::Bottom };
    assert_eq!(board.half, expected_half);
    assert!(session.player().level > 1);
}

#[test]
fn same_seed_replays_the_same_run() {
    let play = |seed| {
        let mut session = new_session(seed);
        let outcomes: Vec<_> = (0..60)
            .map(|_| session.play_at_bat(AtBatCount::default()))
            .collect();
        session.visit_shop();
        (outcomes, session.shop().cloned(), *session.scoreboard())
    };
    assert_eq!(play(77), play(77));
    assert_ne!(play(77).0, play(78).0);
}

#[test]
fn shopping_and_drafting_between_innings() {
    let mut session = new_session(0x5409);
    session.player_mut().currency = 400;
    session.player_mut().unlocked_max_rarity = Rarity::Silver;

    let offers = session.draft_offers(3).to_vec();
    assert_eq!(offers.len(), 3);
    assert!(offers.iter().all(|p| p.rarity <= Rarity::Silver));
    assert!(offers.iter().all(|p| p.cosmetics.team_color == session.player().cosmetics.team_color));
    session.sign_draftee(0).unwrap();
    session.sign_draftee(0).unwrap();
    assert_eq!(session.team().len(), 2);

    let round = session.visit_shop().clone();
    assert_eq!(round.card_slots.len(), 3);
    assert_eq!(round.pack_slots.len(), 2);
    assert!(round.card_slots.iter().all(|slot| slot.card.rarity <= Rarity::Silver));

    let mut spent = 0;
    for index in 0..round.card_slots.len() {
        session.buy_card(index).unwrap();
        spent += round.card_slots[index].price;
    }
    let cards = session.buy_pack(0).unwrap();
    spent += round.pack_slots[0].price;
    assert_eq!(cards.len(), round.pack_slots[0].pack_type.size());
    assert_eq!(session.player().currency, 400 - spent);
    assert_eq!(session.player().perks_owned.len(), 3 + cards.len());
    assert_eq!(session.buy_pack(0), Err(PurchaseError::AlreadyPurchased(0)));

    // every roster member respects the overlay ceiling
    for mate in session.team().iter().chain(std::iter::once(session.player())) {
        for (attr, bonus) in mate.perks_applied.iter() {
            assert!(mate.attributes.get(attr) + bonus <= 99);
        }
    }

    session.leave_shop();
    assert_eq!(session.buy_card(0), Err(PurchaseError::ShopClosed));
}

#[test]
fn broke_players_cannot_buy() {
    let mut session = new_session(3);
    session.player_mut().currency = 0;
    session.visit_shop();
    assert!(matches!(
        session.buy_pack(0),
        Err(PurchaseError::InsufficientFunds { available: 0, .. })
    ));
    assert_eq!(session.player().currency, 0);
    assert!(session.player().perks_owned.is_empty());
}
