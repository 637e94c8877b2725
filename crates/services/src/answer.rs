//! Answer evaluation and progress-record writes.

use std::sync::Arc;

use parrotly_core::model::{VOCABULARY_PATH, VocabularyItem};
use storage::{DataStore, StoreError, WriteMessage};

use crate::error::AnswerError;
use crate::quiz::QuizRound;

/// Outcome of one answer submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
}

/// Writes progress records for correctly answered words.
///
/// The writer never mutates local progress state itself; after a correct
/// answer the caller refreshes, so the store stays the single source of
/// truth.
pub struct AnswerService {
    store: Arc<dyn DataStore>,
    message: WriteMessage,
}

impl std::fmt::Debug for AnswerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerService")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl AnswerService {
    /// Builds a writer for the vocabulary record type of `definition`.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::MisconfiguredProtocol` when the definition does
    /// not declare the vocabulary record type.
    pub fn new(
        store: Arc<dyn DataStore>,
        definition: &parrotly_core::model::ProtocolDefinition,
    ) -> Result<Self, AnswerError> {
        let record_type = definition
            .record_type(VOCABULARY_PATH)
            .ok_or(AnswerError::MisconfiguredProtocol)?;
        Ok(Self {
            store,
            message: WriteMessage {
                protocol: definition.protocol().clone(),
                protocol_path: record_type.path().to_owned(),
                schema: record_type.schema().clone(),
                published: definition.published(),
            },
        })
    }

    /// Evaluate `selected` against the round and persist progress when it is
    /// correct.
    ///
    /// An incorrect selection reaches no store call at all; the round stays
    /// answerable. A correct selection writes one record carrying the
    /// question word.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::Rejected` when the store refuses the write,
    /// `AnswerError::MissingRecord` when a success reply carries no record,
    /// or `AnswerError::Store` on transport failure.
    pub async fn submit(
        &self,
        round: &QuizRound,
        selected: &VocabularyItem,
    ) -> Result<AnswerOutcome, AnswerError> {
        if !round.is_correct(selected) {
            return Ok(AnswerOutcome::Incorrect);
        }

        let payload = serde_json::to_value(round.question())
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let reply = self.store.create_record(&payload, &self.message).await?;
        if !reply.status.is_success() {
            return Err(AnswerError::Rejected {
                status: reply.status,
            });
        }
        let Some(record) = reply.record else {
            return Err(AnswerError::MissingRecord);
        };

        tracing::debug!(
            record_id = record.record_id(),
            word = %round.question().word,
            "progress record written"
        );
        Ok(AnswerOutcome::Correct)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
