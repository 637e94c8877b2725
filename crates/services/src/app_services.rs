//! Application-level facade wiring negotiation, fetching, quizzing and
//! answer writes into one handle the UI can clone around.

use std::collections::HashSet;
use std::sync::Arc;

use parrotly_core::model::{Dictionary, Did, ProtocolDefinition, VocabularyItem, WordId};
use parrotly_core::reconcile;
use storage::Connection;

use crate::answer::{AnswerOutcome, AnswerService};
use crate::error::{AnswerError, AppServicesError};
use crate::fetch::{FetchState, ProgressFetcher};
use crate::quiz::{self, QuizRound};

/// Everything the application needs after startup, behind cheap clones.
#[derive(Clone)]
pub struct AppServices {
    did: Did,
    dictionary: Arc<Dictionary>,
    fetcher: Arc<ProgressFetcher>,
    answers: Arc<AnswerService>,
}

impl AppServices {
    /// Bring up the services against an open session: negotiate the protocol,
    /// build the fetcher and writer, and run the initial progress fetch.
    ///
    /// The initial fetch outcome lands in the fetch state rather than in this
    /// result; a failed fetch leaves the app usable and fail-open.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` when protocol negotiation fails or the
    /// definition lacks the vocabulary record type. Those are startup-fatal;
    /// nothing can be read or written without them.
    pub async fn bootstrap(
        connection: Connection,
        dictionary: Dictionary,
        definition: ProtocolDefinition,
    ) -> Result<Self, AppServicesError> {
        crate::protocol::ensure_protocol(connection.store.as_ref(), &connection.did, &definition)
            .await?;

        let fetcher = Arc::new(ProgressFetcher::new(
            Arc::clone(&connection.store),
            definition.protocol().clone(),
        ));
        let answers = Arc::new(AnswerService::new(
            Arc::clone(&connection.store),
            &definition,
        )?);

        let services = Self {
            did: connection.did,
            dictionary: Arc::new(dictionary),
            fetcher,
            answers,
        };
        services.fetcher.refresh_and_run().await;
        Ok(services)
    }

    #[must_use]
    pub fn did(&self) -> &Did {
        &self.did
    }

    #[must_use]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    #[must_use]
    pub fn fetcher(&self) -> &ProgressFetcher {
        &self.fetcher
    }

    /// Snapshot of the progress fetch state.
    #[must_use]
    pub fn progress(&self) -> FetchState {
        self.fetcher.state()
    }

    /// Words not yet answered correctly, in dictionary order.
    ///
    /// Until a fetch has succeeded this is the full dictionary: with no
    /// trustworthy progress the quiz assumes nothing is known rather than
    /// hiding words.
    #[must_use]
    pub fn unknown_words(&self) -> Vec<VocabularyItem> {
        match self.progress() {
            FetchState::Success(progress) => {
                reconcile::unknown_words(&self.dictionary, Some(progress.as_slice()))
            }
            _ => reconcile::unknown_words(&self.dictionary, None),
        }
    }

    /// Ids of words with at least one progress record.
    #[must_use]
    pub fn known_ids(&self) -> HashSet<WordId> {
        match self.progress() {
            FetchState::Success(progress) => reconcile::known_ids(&progress),
            _ => HashSet::new(),
        }
    }

    /// Build the next quiz round, or `None` once every word is known.
    #[must_use]
    pub fn next_round(&self) -> Option<QuizRound> {
        let unknown = self.unknown_words();
        quiz::next_round(&self.dictionary, &unknown, &mut rand::rng())
    }

    /// Submit an answer; a correct one persists progress and refreshes,
    /// making the written record observable before the next round is built.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError` when the progress write fails. Fetch failures
    /// during the follow-up refresh surface through the fetch state instead.
    pub async fn submit_answer(
        &self,
        round: &QuizRound,
        selected: &VocabularyItem,
    ) -> Result<AnswerOutcome, AnswerError> {
        let outcome = self.answers.submit(round, selected).await?;
        if outcome == AnswerOutcome::Correct {
            self.fetcher.refresh_and_run().await;
        }
        Ok(outcome)
    }

    /// Tear down: in-flight fetch outcomes are dropped from here on.
    pub fn close(&self) {
        self.fetcher.close();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
