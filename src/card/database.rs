use crate::card::record::CardRecord;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardDatabaseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Card not found: {0}")]
    CardNotFound(String),
    #[error("Invalid card data: {0}")]
    InvalidCard(String),
}

/// Pre-fetched card data: a JSON array of provider records (a Scryfall bulk
/// file or a hand-written subset). Records are kept sorted by name so searches
/// return candidates in a stable order.
pub struct CardDatabase {
    records: Vec<CardRecord>,
    by_name: HashMap<String, usize>,
}

impl CardDatabase {
    /// Load cards from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CardDatabaseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, CardDatabaseError> {
        let records: Vec<CardRecord> = serde_json::from_str(content)?;
        Self::from_records(records)
    }

    pub fn from_records(mut records: Vec<CardRecord>) -> Result<Self, CardDatabaseError> {
        if let Some(bad) = records.iter().find(|r| r.name.trim().is_empty()) {
            return Err(CardDatabaseError::InvalidCard(format!(
                "record '{}' has no name",
                bad.id
            )));
        }

        records.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });

        // First printing of a name wins
        let mut by_name = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            by_name.entry(record.name.to_lowercase()).or_insert(idx);
        }

        Ok(CardDatabase { records, by_name })
    }

    /// Exact (case-insensitive) name lookup
    pub fn get_record(&self, name: &str) -> Result<&CardRecord, CardDatabaseError> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&idx| &self.records[idx])
            .ok_or_else(|| CardDatabaseError::CardNotFound(name.to_string()))
    }

    /// Records matching `predicate`, in name order, at most `limit` of them
    pub fn search<F>(&self, limit: usize, mut predicate: F) -> Vec<&CardRecord>
    where
        F: FnMut(&CardRecord) -> bool,
    {
        self.records
            .iter()
            .filter(|r| predicate(r))
            .take(limit)
            .collect()
    }

    /// Get all card names
    pub fn card_names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }

    /// Get total number of cards
    pub fn card_count(&self) -> usize {
        self.records.len()
    }

    pub fn validate(&self) -> Result<(), CardDatabaseError> {
        if self.records.is_empty() {
            return Err(CardDatabaseError::InvalidCard(
                "No cards loaded".to_string(),
            ));
        }
        Ok(())
    }
}
