use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashMap;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"\w+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Split text into maximal runs of word characters (letters, digits, underscore).
pub fn tokenize(text: &str) -> Vec<String> {
    WORD.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Reduce a token to its canonical term with the Snowball English stemmer.
pub fn stem(token: &str) -> String {
    STEMMER.stem(&token.to_lowercase()).into_owned()
}

/// Tokenize and stem, keeping order and repeats.
pub fn stem_all(text: &str) -> Vec<String> {
    WORD.find_iter(text).map(|m| stem(m.as_str())).collect()
}

pub fn compute_word_frequencies<S: AsRef<str>>(tokens: &[S]) -> HashMap<String, u32> {
    let mut freq = HashMap::new();
    for tok in tokens {
        *freq.entry(tok.as_ref().to_string()).or_insert(0) += 1;
    }
    freq
}
