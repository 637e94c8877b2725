use std::collections::HashSet;
use std::sync::OnceLock;

use thiserror::Error;

use crate::model::ids::WordId;
use crate::model::vocabulary::VocabularyItem;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DictionaryError {
    #[error("dictionary name cannot be empty")]
    EmptyName,

    #[error("dictionary must contain at least one word")]
    Empty,

    #[error("duplicate word id: {0}")]
    DuplicateId(WordId),

    #[error("dictionary JSON is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

//
// ─── DICTIONARY ────────────────────────────────────────────────────────────────
//

/// Immutable, ordered reference dictionary for one language.
///
/// Word ids are unique within a dictionary. The entry order is meaningful:
/// the reconciler preserves it when computing the unknown-word set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    language: String,
    items: Vec<VocabularyItem>,
}

impl Dictionary {
    /// Creates a dictionary, enforcing non-emptiness and id uniqueness.
    ///
    /// # Errors
    ///
    /// Returns `DictionaryError` on an empty name, an empty word list, or a
    /// repeated word id.
    pub fn new(
        language: impl Into<String>,
        items: Vec<VocabularyItem>,
    ) -> Result<Self, DictionaryError> {
        let language = language.into();
        if language.trim().is_empty() {
            return Err(DictionaryError::EmptyName);
        }
        if items.is_empty() {
            return Err(DictionaryError::Empty);
        }

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(DictionaryError::DuplicateId(item.id));
            }
        }

        Ok(Self {
            language: language.trim().to_owned(),
            items,
        })
    }

    /// Parses a dictionary from its JSON array form.
    ///
    /// # Errors
    ///
    /// Returns `DictionaryError::Malformed` for invalid JSON, plus the same
    /// validation errors as [`Dictionary::new`].
    pub fn from_json(language: impl Into<String>, json: &str) -> Result<Self, DictionaryError> {
        let items: Vec<VocabularyItem> = serde_json::from_str(json)?;
        Self::new(language, items)
    }

    /// Human-readable language name, e.g. "Spanish".
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn items(&self) -> &[VocabularyItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: WordId) -> Option<&VocabularyItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// The embedded Spanish starter dictionary.
///
/// # Panics
///
/// Panics if the embedded asset fails validation, which a unit test rules out.
#[must_use]
pub fn spanish() -> &'static Dictionary {
    static SPANISH: OnceLock<Dictionary> = OnceLock::new();
    SPANISH.get_or_init(|| {
        Dictionary::from_json("Spanish", include_str!("../../dictionaries/spanish.json"))
            .expect("embedded Spanish dictionary should be valid")
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
