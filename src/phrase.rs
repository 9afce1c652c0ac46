// src/phrase.rs
//! Word normalization and consecutive-phrase matching.
//!
//! Phrases and story text go through the same `normalize_words`, so a phrase
//! can never disagree with the text about what a "word" is.

/// Lower-case `input`, turn every ASCII punctuation character into whitespace,
/// and split into non-empty words.
pub fn normalize_words(input: &str) -> Vec<String> {
    let cleaned: String = input
        .chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect::<String>()
        .to_lowercase();
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// A pre-tokenized phrase. Matching is whole-word, in order, with no gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    words: Vec<String>,
}

impl Phrase {
    pub fn new(raw: &str) -> Self {
        Self {
            words: normalize_words(raw),
        }
    }

    /// A phrase with no words after normalization never matches anything.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// True if the phrase occurs as a contiguous run of whole words in `text`.
    pub fn is_in(&self, text: &str) -> bool {
        if self.words.is_empty() {
            return false;
        }
        let text_words = normalize_words(text);
        if text_words.len() < self.words.len() {
            return false;
        }
        text_words
            .windows(self.words.len())
            .any(|w| w == self.words.as_slice())
    }
}

/// Convenience form of [`Phrase::is_in`] for one-off checks.
pub fn is_phrase_in(text: &str, phrase: &str) -> bool {
    Phrase::new(phrase).is_in(text)
}
