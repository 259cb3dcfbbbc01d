//! Fortune corpus: an immutable list of fortunes with uniform random pick.

use rand::Rng;

use crate::error::CorpusError;

/// Corpus compiled into the binary.
const BUNDLED_CORPUS: &str = include_str!("../assets/fortunes.json");

/// Ordered, read-only list of fortunes. Never empty.
#[derive(Debug, Clone)]
pub struct FortuneStore {
    entries: Vec<String>,
}

impl FortuneStore {
    /// Validate and wrap a corpus. Emptiness is rejected here so that
    /// [`pick`](Self::pick) can never fail at runtime.
    pub fn new(entries: Vec<String>) -> Result<Self, CorpusError> {
        if entries.is_empty() {
            return Err(CorpusError::Empty);
        }
        if let Some(index) = entries.iter().position(|e| e.trim().is_empty()) {
            return Err(CorpusError::BlankEntry { index });
        }
        Ok(Self { entries })
    }

    /// Parse a JSON array of strings.
    pub fn from_json(json: &str) -> Result<Self, CorpusError> {
        let entries: Vec<String> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    pub fn bundled() -> Result<Self, CorpusError> {
        Self::from_json(BUNDLED_CORPUS)
    }

    /// Uniformly random fortune. Repeats across calls are allowed.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> &str {
        let idx = rng.random_range(0..self.entries.len());
        &self.entries[idx]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
