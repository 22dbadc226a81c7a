//! Injectable randomness for every probabilistic decision in the engine.
use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::convert::TryFrom;

/// Source of uniform draws consumed by the engine.
///
/// Implemented for every [`RngCore`], so seeded `SmallRng`s and the bundle's
/// counting streams plug in directly. [`ScriptedRolls`] replays a fixed
/// sequence for deterministic tests.
pub trait RollSource {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform integer in `[lo, hi]`. Collapses to `lo` when `hi <= lo`.
    fn between(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let span = f64::from(hi - lo) + 1.0;
        let offset = crate::numbers::floor_f64_to_i32(self.next_unit() * span);
        lo + offset.clamp(0, hi - lo)
    }

    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }

    /// Uniform index into a collection of `len` items; 0 for empty ones.
    fn pick_index(&mut self, len: usize) -> usize {
        let Some(last) = len.checked_sub(1).and_then(|l| i32::try_from(l).ok()) else {
            return 0;
        };
        usize::try_from(self.between(0, last)).unwrap_or(0)
    }
}

impl<R: RngCore> RollSource for R {
    fn next_unit(&mut self) -> f64 {
        self.r#gen::<f64>()
    }

    fn between(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.gen_range(lo..=hi)
    }
}

/// One scripted draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptedRoll {
    /// Answers an integer request directly (clamped to the requested range).
    /// Unit requests read it as a percentage.
    Int(i32),
    /// Answers a unit request directly; integer requests scale it.
    Unit(f64),
}

/// Replays a fixed sequence of draws, cycling once it runs out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls {
    script: Vec<ScriptedRoll>,
    cursor: usize,
    draws: u64,
}

impl ScriptedRolls {
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = ScriptedRoll>) -> Self {
        Self {
            script: script.into_iter().collect(),
            cursor: 0,
            draws: 0,
        }
    }

    /// Script made only of integer answers.
    #[must_use]
    pub fn ints(values: impl IntoIterator<Item = i32>) -> Self {
        Self::new(values.into_iter().map(ScriptedRoll::Int))
    }

    /// Number of draws served so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    fn advance(&mut self) -> Option<ScriptedRoll> {
        if self.script.is_empty() {
            return None;
        }
        let roll = self.script[self.cursor % self.script.len()];
        self.cursor = (self.cursor + 1) % self.script.len();
        self.draws = self.draws.saturating_add(1);
        Some(roll)
    }
}

impl RollSource for ScriptedRolls {
    fn next_unit(&mut self) -> f64 {
        match self.advance() {
            Some(ScriptedRoll::Unit(value)) => value.clamp(0.0, 1.0 - f64::EPSILON),
            Some(ScriptedRoll::Int(value)) => (f64::from(value) / 100.0).clamp(0.0, 1.0 - f64::EPSILON),
            None => 0.0,
        }
    }

    fn between(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        match self.advance() {
            Some(ScriptedRoll::Int(value)) => value.clamp(lo, hi),
            Some(ScriptedRoll::Unit(value)) => {
                let span = f64::from(hi - lo) + 1.0;
                let offset = crate::numbers::floor_f64_to_i32(value.clamp(0.0, 1.0) * span);
                lo + offset.clamp(0, hi - lo)
            }
            None => lo,
        }
    }
}

/// Game systems that draw from their own stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RngDomain {
    AtBat,
    Draft,
    Shop,
    Creation,
}

impl RngDomain {
    pub const ALL: [Self; 4] = [Self::AtBat, Self::Draft, Self::Shop, Self::Creation];

    const fn index(self) -> usize {
        match self {
            Self::AtBat => 0,
            Self::Draft => 1,
            Self::Shop => 2,
            Self::Creation => 3,
        }
    }

    const fn key(self) -> &'static [u8] {
        match self {
            Self::AtBat => b"at-bat",
            Self::Draft => b"draft",
            Self::Shop => b"shop",
            Self::Creation => b"creation",
        }
    }
}

/// One `SmallRng` per [`RngDomain`], all keyed off the run seed. Opening an
/// extra shop never shifts the pitches that follow it.
#[derive(Debug, Clone)]
pub struct RngBundle {
    streams: [CountingRng<SmallRng>; 4],
}

impl RngBundle {
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            streams: RngDomain::ALL.map(|domain| CountingRng::new(stream_seed(seed, domain))),
        }
    }

    pub const fn stream(&mut self, domain: RngDomain) -> &mut CountingRng<SmallRng> {
        &mut self.streams[domain.index()]
    }

    pub const fn at_bat(&mut self) -> &mut CountingRng<SmallRng> {
        self.stream(RngDomain::AtBat)
    }

    pub const fn draft(&mut self) -> &mut CountingRng<SmallRng> {
        self.stream(RngDomain::Draft)
    }

    pub const fn shop(&mut self) -> &mut CountingRng<SmallRng> {
        self.stream(RngDomain::Shop)
    }

    pub const fn creation(&mut self) -> &mut CountingRng<SmallRng> {
        self.stream(RngDomain::Creation)
    }

    /// Draws consumed so far, per domain. Two runs that agree here made the
    /// same number of decisions in every system.
    #[must_use]
    pub fn draw_counts(&self) -> [(RngDomain, u64); 4] {
        RngDomain::ALL.map(|domain| (domain, self.streams[domain.index()].draws))
    }
}

/// An RNG that tallies how many raw draws it has served.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: RngCore> CountingRng<R> {
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    fn tick(&mut self) -> &mut R {
        self.draws = self.draws.saturating_add(1);
        &mut self.rng
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.tick().next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.tick().next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.tick().fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.tick().try_fill_bytes(dest)
    }
}

/// HMAC-SHA256 of the domain key under the run seed, first eight bytes.
fn stream_seed(seed: u64, domain: RngDomain) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&seed.to_le_bytes()) else {
        return seed ^ domain.index() as u64;
    };
    mac.update(domain.key());
    let digest = mac.finalize().into_bytes();
    digest[..8]
        .iter()
        .rev()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streams_are_domain_separated_and_reproducible() {
        let mut first = RngBundle::from_user_seed(2024);
        let mut second = RngBundle::from_user_seed(2024);
        let a: Vec<i32> = (0..8).map(|_| first.at_bat().between(1, 100)).collect();
        let b: Vec<i32> = (0..8).map(|_| second.at_bat().between(1, 100)).collect();
        assert_eq!(a, b);

        let draft: Vec<i32> = (0..8).map(|_| first.draft().between(1, 100)).collect();
        assert_ne!(a, draft);
        assert_eq!(first.at_bat().draws(), 8);
        assert_eq!(first.shop().draws(), 0);
        assert_eq!(
            first.draw_counts(),
            [
                (RngDomain::AtBat, 8),
                (RngDomain::Draft, 8),
                (RngDomain::Shop, 0),
                (RngDomain::Creation, 0),
            ]
        );
    }

    #[test]
    fn stream_seeds_match_little_endian_digest() {
        let mut mac = Hmac::<Sha256>::new_from_slice(&77u64.to_le_bytes()).unwrap();
        mac.update(b"shop");
        let digest = mac.finalize().into_bytes();
        let expected = u64::from_le_bytes(digest[..8].try_into().unwrap());
        assert_eq!(stream_seed(77, RngDomain::Shop), expected);
        assert_ne!(stream_seed(77, RngDomain::Shop), stream_seed(77, RngDomain::Draft));
    }

    #[test]
    fn rng_between_stays_in_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let roll = rng.between(1, 100);
            assert!((1..=100).contains(&roll));
        }
        assert_eq!(rng.between(5, 5), 5);
        assert_eq!(rng.between(9, 3), 9);
    }

    #[test]
    fn scripted_rolls_replay_and_cycle() {
        let mut rolls = ScriptedRolls::new([
            ScriptedRoll::Int(3),
            ScriptedRoll::Unit(0.5),
            ScriptedRoll::Int(250),
        ]);
        assert_eq!(rolls.between(1, 100), 3);
        assert_eq!(rolls.between(1, 100), 51);
        assert_eq!(rolls.between(1, 100), 100);
        assert_eq!(rolls.between(1, 100), 3);
        assert_eq!(rolls.draws(), 4);
    }

    #[test]
    fn scripted_units_read_ints_as_percent() {
        let mut rolls = ScriptedRolls::ints([5]);
        assert!((rolls.next_unit() - 0.05).abs() < 1e-12);
        assert!(rolls.chance(0.06));
        assert!(!ScriptedRolls::default().chance(0.0));
    }

    #[test]
    fn pick_index_handles_empty_and_single() {
        let mut rng = SmallRng::seed_from_u64(11);
        assert_eq!(rng.pick_index(0), 0);
        assert_eq!(rng.pick_index(1), 0);
        assert!(rng.pick_index(4) < 4);
    }
}
