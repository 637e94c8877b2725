use std::collections::HashSet;

use parrotly_core::model::{Dictionary, WordId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VocabularyRowVm {
    pub id: WordId,
    pub word: String,
    pub english: String,
    pub known: bool,
}

/// Rows for the vocabulary list, in dictionary order, with words carrying a
/// progress record marked known.
#[must_use]
pub fn map_vocabulary_rows(dictionary: &Dictionary, known: &HashSet<WordId>) -> Vec<VocabularyRowVm> {
    dictionary
        .items()
        .iter()
        .map(|item| VocabularyRowVm {
            id: item.id,
            word: item.word.clone(),
            english: item.english.clone(),
            known: known.contains(&item.id),
        })
        .collect()
}
