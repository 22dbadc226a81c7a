//! Shareable run codes of the form `RB-<WORD><NN>`, e.g. `RB-DINGER42`.
//!
//! The low 16 bits of a seed carry the word index and the two-digit number;
//! the rest is a hash of those, so decoding a code reproduces its seed.
use std::hash::Hasher;
use twox_hash::XxHash64;

const CODE_PREFIX: &str = "RB";
const WORD_MASK: u16 = 0x003F;
const NUMBER_SHIFT: u16 = 6;
const NUMBER_MASK: u16 = 0x7F;

pub const WORD_LIST: [&str; 64] = [
    "DINGER", "BUNT", "SLIDER", "HEATER", "CHANGEUP", "CURVE", "KNUCKLE", "SINKER", "BULLPEN",
    "DUGOUT", "INFIELD", "OUTFIELD", "MOUND", "PLATE", "SLUGGER", "ACE", "CLOSER", "ROOKIE",
    "VETERAN", "CATCHER", "SHORTSTOP", "PINCH", "HOMER", "TRIPLE", "DOUBLE", "SINGLE", "WALK",
    "STRIKE", "FOUL", "FLYBALL", "GROUNDER", "LINER", "BLOOPER", "CHOPPER", "DIAMOND", "PENNANT",
    "SERIES", "INNING", "STRETCH", "SEVENTH", "BATBOY", "GLOVE", "MITT", "CLEATS", "HELMET",
    "ROSIN", "CHALK", "BLEACHER", "SCORECARD", "SACRIFICE", "STEAL", "PICKOFF", "BALK", "CYCLE",
    "GRANDSLAM", "SHUTOUT", "NOHITTER", "PERFECT", "ROUNDER", "SANDLOT", "PIXEL", "RETRO",
    "ARCADE", "CARTRIDGE",
];

fn normalize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

const fn pack(word_index: u16, number: u8) -> u16 {
    (word_index & WORD_MASK) | ((number as u16 & NUMBER_MASK) << NUMBER_SHIFT)
}

const fn unpack(packed: u16) -> (u16, u8) {
    (packed & WORD_MASK, ((packed >> NUMBER_SHIFT) & NUMBER_MASK) as u8)
}

fn compose_seed(word_index: u16, number: u8) -> u64 {
    let packed = pack(word_index, number);
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(b"RETROBALL-");
    hasher.write_u16(packed);
    (hasher.finish() & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
}

/// Render the share code for `seed`. Seeds that did not come from a code
/// still map to a valid, if lossy, code.
#[must_use]
pub fn encode_share_code(seed: u64) -> String {
    let (word_index, number) = unpack((seed & 0xFFFF) as u16);
    let word = WORD_LIST
        .get(usize::from(word_index))
        .copied()
        .unwrap_or(WORD_LIST[0]);
    format!("{CODE_PREFIX}-{word}{:02}", number % 100)
}

/// Seed encoded by `code`, or `None` if it is not a share code.
#[must_use]
pub fn decode_share_code(code: &str) -> Option<u64> {
    let (prefix, rest) = code.trim().split_once('-')?;
    if !prefix.eq_ignore_ascii_case(CODE_PREFIX) || rest.len() < 3 || !rest.is_ascii() {
        return None;
    }
    let (word_part, number_part) = rest.split_at(rest.len() - 2);
    let number: u8 = number_part.parse().ok()?;
    let word = normalize_word(word_part);
    let index = WORD_LIST.iter().position(|candidate| *candidate == word)?;
    Some(compose_seed(u16::try_from(index).ok()?, number))
}

/// Fresh code derived from arbitrary entropy (clock, OS RNG, ...).
#[must_use]
pub fn share_code_from_entropy(entropy: u64) -> String {
    let word_index = u16::try_from(entropy % WORD_LIST.len() as u64).unwrap_or(0);
    let number = u8::try_from((entropy >> 17) % 100).unwrap_or(0);
    encode_share_code(compose_seed(word_index, number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_roundtrip_through_seeds() {
        let seed = decode_share_code("RB-DINGER42").unwrap();
        assert_eq!(encode_share_code(seed), "RB-DINGER42");
        assert_eq!(decode_share_code("rb-dinger42"), Some(seed));
    }

    #[test]
    fn entropy_codes_decode() {
        for entropy in [0_u64, 7, 0xDEAD_BEEF, u64::MAX] {
            let code = share_code_from_entropy(entropy);
            let seed = decode_share_code(&code).unwrap();
            assert_eq!(encode_share_code(seed), code);
        }
    }

    #[test]
    fn malformed_codes_are_rejected() {
        assert_eq!(decode_share_code("CL-ORANGE42"), None);
        assert_eq!(decode_share_code("RB-NOTAWORD11"), None);
        assert_eq!(decode_share_code("RB-BUNTxx"), None);
        assert_eq!(decode_share_code("RB"), None);
    }

    #[test]
    fn words_are_already_normalized() {
        assert!(WORD_LIST.iter().all(|word| normalize_word(word) == *word));
    }
}
