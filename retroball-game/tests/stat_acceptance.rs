use rand::SeedableRng;
use rand::rngs::SmallRng;
use retroball_game::shop::{PackSlot, PackType, roll_card_kind};
use retroball_game::{
    AtBatCount, AtBatOutcome, AtBatTuning, BatHand, CardKind, DraftTuning, PitchArsenal,
    PitchType, PlayerRecord, Position, Rarity, ShopTuning, generate_random_draft_player,
    open_pack, resolve_at_bat,
};
use std::convert::TryFrom;

const SAMPLE_SIZE: usize = 5000;
const TOLERANCE: f64 = 0.025;

fn rate(count: usize, total: usize) -> f64 {
    f64::from(u32::try_from(count).expect("count fits")) / f64::from(u32::try_from(total).expect("total fits"))
}

fn pitcher(control: i32) -> PlayerRecord {
    let mut pitcher = PlayerRecord::new("pl_p", "Pitcher", Position::Pitcher);
    pitcher.attributes.control = control;
    pitcher.pitches = PitchArsenal::from_ratings([(PitchType::Fastball, 70)]);
    pitcher
}

fn walk_rate(control: i32, seed: u64) -> f64 {
    let cfg = AtBatTuning::default();
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut pitcher = pitcher(control);
    let mut walks = 0usize;
    for _ in 0..SAMPLE_SIZE {
        let mut batter = PlayerRecord::new("pl_b", "Batter", Position::CenterField);
        let result = resolve_at_bat(
            &mut pitcher,
            &mut batter,
            AtBatCount::default(),
            0,
            &cfg,
            &mut rng,
        );
        if result.outcome == AtBatOutcome::Walk {
            walks += 1;
        }
    }
    rate(walks, SAMPLE_SIZE)
}

#[test]
fn walk_rate_tracks_control() {
    let average = walk_rate(50, 0x5EED);
    assert!((average - 0.20).abs() <= TOLERANCE, "control 50 walked {average:.4}");
    let sharp = walk_rate(90, 0xC0DE);
    assert!((sharp - 0.04).abs() <= TOLERANCE, "control 90 walked {sharp:.4}");
    let wild = walk_rate(10, 0xFEED);
    assert!((wild - 0.36).abs() <= TOLERANCE, "control 10 walked {wild:.4}");
}

#[test]
fn forced_contact_hit_rate_matches_hit_chance() {
    let cfg = AtBatTuning::default();
    let mut rng = SmallRng::seed_from_u64(0xBA77);
    let mut pitcher = pitcher(50);
    let mut swings = 0usize;
    let mut singles = 0usize;
    for _ in 0..SAMPLE_SIZE * 2 {
        let mut batter = PlayerRecord::new("pl_b", "Contact", Position::CenterField);
        batter.attributes.contact = 80;
        let result = resolve_at_bat(
            &mut pitcher,
            &mut batter,
            AtBatCount::new(0, 2),
            0,
            &cfg,
            &mut rng,
        );
        match result.outcome {
            AtBatOutcome::Walk => {}
            AtBatOutcome::Single => {
                swings += 1;
                singles += 1;
            }
            AtBatOutcome::Strike => swings += 1,
            other => panic!("unexpected outcome {other:?} on a forced contact swing"),
        }
    }
    let observed = rate(singles, swings);
    assert!((observed - 0.39).abs() <= TOLERANCE, "hit rate drifted: {observed:.4}");
}

#[test]
fn card_kind_split_is_fifty_thirty_twenty() {
    let cfg = ShopTuning::default();
    let mut rng = SmallRng::seed_from_u64(0xCA4D);
    let mut perks = 0usize;
    let mut upgrades = 0usize;
    let mut players = 0usize;
    for _ in 0..SAMPLE_SIZE {
        match roll_card_kind(&cfg, &mut rng) {
            CardKind::PerkTeam => perks += 1,
            CardKind::UpgradeCustom => upgrades += 1,
            CardKind::PlayerCard => players += 1,
        }
    }
    assert!((rate(perks, SAMPLE_SIZE) - 0.50).abs() <= TOLERANCE);
    assert!((rate(upgrades, SAMPLE_SIZE) - 0.30).abs() <= TOLERANCE);
    assert!((rate(players, SAMPLE_SIZE) - 0.20).abs() <= TOLERANCE);
}

#[test]
fn gold_standard_pack_upgrade_odds() {
    let cfg = ShopTuning::default();
    let pack = PackSlot {
        pack_type: PackType::Standard,
        rarity: Rarity::Gold,
        price: 51,
        purchased: false,
    };
    let mut rng = SmallRng::seed_from_u64(0x9ACC);
    let mut cards = 0usize;
    let mut bumped = 0usize;
    for _ in 0..SAMPLE_SIZE {
        let opened = open_pack(&pack, &cfg, &mut rng);
        assert_eq!(opened.len(), 3);
        for card in opened {
            assert!(card.rarity >= Rarity::Gold);
            cards += 1;
            if card.rarity > Rarity::Gold {
                bumped += 1;
            }
        }
    }
    // one-rank bump at 5%, two-rank bump at 0.1%, rolled independently
    let observed = rate(bumped, cards);
    assert!((observed - 0.051).abs() <= 0.01, "bump rate drifted: {observed:.4}");
}

#[test]
fn drafted_bat_hands_follow_partition() {
    let cfg = DraftTuning::default();
    let mut rng = SmallRng::seed_from_u64(0x4A4D);
    let total = SAMPLE_SIZE / 2;
    let mut switch = 0usize;
    let mut right = 0usize;
    for _ in 0..total {
        let player =
            generate_random_draft_player(Position::Catcher, Rarity::Silver, None, &cfg, &mut rng);
        match player.bat_hand {
            BatHand::Switch => switch += 1,
            BatHand::Right => right += 1,
            BatHand::Left => {}
        }
    }
    assert!((rate(switch, total) - 0.10).abs() <= TOLERANCE);
    assert!((rate(right, total) - 0.45).abs() <= TOLERANCE * 1.5);
}
