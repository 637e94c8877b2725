//! Progress reconciliation: which dictionary words have no progress record.

use std::collections::HashSet;

use crate::model::{Dictionary, VocabularyItem, WordId};

/// Ids that have at least one progress record.
#[must_use]
pub fn known_ids(progress: &[VocabularyItem]) -> HashSet<WordId> {
    progress.iter().map(|item| item.id).collect()
}

/// Dictionary entries with no matching progress record, in dictionary order.
///
/// When `progress` is `None` (fetch pending or failed) the full dictionary is
/// returned, so a store outage never blocks practicing.
#[must_use]
pub fn unknown_words(
    dictionary: &Dictionary,
    progress: Option<&[VocabularyItem]>,
) -> Vec<VocabularyItem> {
    let Some(progress) = progress else {
        return dictionary.items().to_vec();
    };

    let known = known_ids(progress);
    dictionary
        .items()
        .iter()
        .filter(|item| !known.contains(&item.id))
        .cloned()
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
