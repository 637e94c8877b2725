use serde::{Deserialize, Serialize};

use crate::model::ids::WordId;

/// One dictionary entry: a word in the target language and its English gloss.
///
/// This is also the payload shape of a progress record: a persisted
/// `VocabularyItem` means "the user answered this word correctly once".
/// Duplicate records for the same id may exist; consumers treat a word as
/// known when any matching record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub word: String,
    pub english: String,
    pub id: WordId,
    pub lang: String,
}

impl VocabularyItem {
    #[must_use]
    pub fn new(
        id: WordId,
        word: impl Into<String>,
        english: impl Into<String>,
        lang: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            english: english.into(),
            id,
            lang: lang.into(),
        }
    }
}
