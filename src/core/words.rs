//! Word dictionary used to pick target words.

use std::path::Path;

use anyhow::{Context, Result};
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

use crate::error::EngineError;

const BUILTIN_WORDS: &str = include_str!("../../assets/words.txt");

/// Immutable, ordered list of lowercase words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordDictionary {
    words: Vec<String>,
}

impl WordDictionary {
    /// Entries with anything but letters (`don't`, `a$b`) are skipped: those
    /// positions could never be revealed.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .filter(|w| {
                    let playable = w.chars().all(char::is_alphabetic);
                    if !playable {
                        debug!(word = %w, "skipping word with non-letter characters");
                    }
                    playable
                })
                .collect(),
        }
    }

    /// One word per line; blank lines and `#` comments are skipped.
    pub fn from_text(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read word list {}", path.display()))?;
        Ok(Self::from_text(&text))
    }

    /// The dictionary shipped with the crate.
    pub fn builtin() -> Self {
        Self::from_text(BUILTIN_WORDS)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Words whose length (in characters) lies in `[min, max]`.
    pub fn pool(&self, min: usize, max: usize) -> Vec<&str> {
        self.words
            .iter()
            .filter(|w| {
                let len = w.chars().count();
                len >= min && len <= max
            })
            .map(String::as_str)
            .collect()
    }

    /// Uniform pick from `pool(min, max)`.
    pub fn choose<R: Rng + ?Sized>(&self, min: usize, max: usize, rng: &mut R) -> Result<String, EngineError> {
        self.pool(min, max)
            .choose(rng)
            .map(|w| w.to_string())
            .ok_or(EngineError::NoWordsAvailable { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_skips_words_with_non_letters() {
        let dict = WordDictionary::from_text("don't\na$b\nice-cream\nmy word\ncafé\nOwl\n");
        assert_eq!(dict.words(), &["café", "owl"]);

        let dict = WordDictionary::new(["don't", "a$b"]);
        assert!(dict.is_empty());
        assert_eq!(
            dict.choose(1, 10, &mut StdRng::seed_from_u64(1)),
            Err(EngineError::NoWordsAvailable { min: 1, max: 10 })
        );
    }

    #[test]
    fn test_from_text_skips_blanks_and_comments() {
        let dict = WordDictionary::from_text("# header\nApple\n\n  pear  \n#skip\nFig\n");
        assert_eq!(dict.words(), &["apple", "pear", "fig"]);
    }

    #[test]
    fn test_pool_is_inclusive() {
        let dict = WordDictionary::new(["ox", "cat", "lamp", "acorn"]);
        assert_eq!(dict.pool(3, 4), vec!["cat", "lamp"]);
        assert_eq!(dict.pool(2, 2), vec!["ox"]);
        assert!(dict.pool(6, 9).is_empty());
    }

    #[test]
    fn test_choose_stays_in_range() {
        let dict = WordDictionary::builtin();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let word = dict.choose(4, 6, &mut rng).unwrap();
            let len = word.chars().count();
            assert!((4..=6).contains(&len), "{word} out of range");
        }
    }

    #[test]
    fn test_choose_empty_pool() {
        let dict = WordDictionary::new(["cat"]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            dict.choose(5, 9, &mut rng),
            Err(EngineError::NoWordsAvailable { min: 5, max: 9 })
        );
    }

    #[test]
    fn test_builtin_is_lowercase() {
        let dict = WordDictionary::builtin();
        assert!(!dict.is_empty());
        assert!(dict.words().iter().all(|w| w.chars().all(|c| c.is_lowercase())));
    }

    #[test]
    fn test_load_missing_file() {
        let err = WordDictionary::load("/definitely/not/here/words.txt").unwrap_err();
        assert!(err.to_string().contains("failed to read word list"));
    }
}
