//! SimHash fingerprints for near-duplicate detection.
//!
//! Similar documents produce fingerprints that differ in few bits. The
//! per-token hash is BLAKE3 truncated to its first 8 bytes (little endian),
//! so fingerprints stay comparable across runs, machines and releases.

use crate::tokenizer::{compute_word_frequencies, tokenize};
use std::collections::{HashMap, HashSet};

pub const BITS: u32 = 64;

/// Stable 64-bit hash of a token.
pub fn hash_token(token: &str) -> u64 {
    let hash = blake3::hash(token.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Build a fingerprint from a document's tokens and their frequencies.
///
/// Each distinct token votes on every bit: `+frequency` where its hash has a
/// 1, `-frequency` where it has a 0. Bit `i` of the result is set when the
/// vote on bit `i` is strictly positive. Tokens absent from `frequencies`
/// carry no weight.
pub fn fingerprint<S: AsRef<str>>(tokens: &[S], frequencies: &HashMap<String, u32>) -> u64 {
    let distinct: HashSet<&str> = tokens.iter().map(|t| t.as_ref()).collect();
    let mut votes = [0i64; BITS as usize];
    for token in distinct {
        let weight = i64::from(frequencies.get(token).copied().unwrap_or(0));
        let h = hash_token(token);
        for (i, vote) in votes.iter_mut().enumerate() {
            if (h >> i) & 1 == 1 {
                *vote += weight;
            } else {
                *vote -= weight;
            }
        }
    }

    votes
        .iter()
        .enumerate()
        .filter(|(_, v)| **v > 0)
        .fold(0u64, |acc, (i, _)| acc | (1 << i))
}

/// Tokenize `text` and fingerprint it by raw token frequency.
pub fn fingerprint_text(text: &str) -> u64 {
    let tokens = tokenize(text);
    let frequencies = compute_word_frequencies(&tokens);
    fingerprint(&tokens, &frequencies)
}

pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Fraction of bit positions on which `a` and `b` agree, in `[0.0, 1.0]`.
pub fn similarity(a: u64, b: u64) -> f64 {
    1.0 - f64::from(hamming_distance(a, b)) / f64::from(BITS)
}

pub fn is_near_duplicate(a: u64, b: u64, threshold: f64) -> bool {
    similarity(a, b) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [u64; 6] = [0, u64::MAX, 1, 0xDEAD_BEEF_0BAD_F00D, 0x8000_0000_0000_0000, 0x5555_5555_5555_5555];

    #[test]
    fn identical_fingerprints_are_fully_similar() {
        for x in SAMPLES {
            assert_eq!(similarity(x, x), 1.0);
        }
    }

    #[test]
    fn inverted_fingerprints_share_nothing() {
        for x in SAMPLES {
            assert_eq!(similarity(x, !x), 0.0);
        }
    }

    #[test]
    fn similarity_is_symmetric() {
        for a in SAMPLES {
            for b in SAMPLES {
                assert_eq!(similarity(a, b), similarity(b, a));
            }
        }
        assert_eq!(similarity(0, 0b1111), 1.0 - 4.0 / 64.0);
    }

    #[test]
    fn token_hash_is_pinned() {
        // fingerprints written by the indexer must stay comparable
        assert_eq!(hash_token("cat"), hash_token("cat"));
        assert_ne!(hash_token("cat"), hash_token("cats"));
        let expected = u64::from_le_bytes(blake3::hash(b"cat").as_bytes()[..8].try_into().unwrap());
        assert_eq!(hash_token("cat"), expected);
    }

    #[test]
    fn single_token_fingerprint_is_its_hash() {
        let tokens = ["solo"];
        let freq = compute_word_frequencies(&tokens);
        assert_eq!(fingerprint(&tokens, &freq), hash_token("solo"));
    }

    #[test]
    fn empty_document_has_zero_fingerprint() {
        assert_eq!(fingerprint::<&str>(&[], &HashMap::new()), 0);
        assert_eq!(fingerprint_text(""), 0);
    }

    #[test]
    fn repeated_tokens_vote_once_with_their_frequency() {
        let once = ["a", "b", "b"];
        let freq = compute_word_frequencies(&once);
        let deduped = ["a", "b"];
        assert_eq!(fingerprint(&once, &freq), fingerprint(&deduped, &freq));
    }

    #[test]
    fn near_duplicates_score_higher_than_unrelated_text() {
        let base = "the quick brown fox jumps over the lazy dog near the river bank today";
        let edited = "the quick brown fox jumps over the lazy dog near the river bank tonight";
        let other = "quarterly revenue grew while operating costs fell across all regions";
        let a = fingerprint_text(base);
        let b = fingerprint_text(edited);
        let c = fingerprint_text(other);
        assert!(similarity(a, b) > similarity(a, c));
        assert!(is_near_duplicate(a, a, 1.0));
    }
}
