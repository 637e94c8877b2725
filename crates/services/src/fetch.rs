//! Cancellable, request-numbered progress fetching.
//!
//! Every fetch attempt is one *cycle*, identified by a monotonically
//! increasing token. Only the newest cycle may commit its outcome; older
//! in-flight cycles and cycles resolving after teardown are dropped on
//! arrival. All progress mutation flows through a fresh cycle, so the most
//! recent committed outcome is the single source of truth.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::join_all;

use parrotly_core::model::{ProtocolUri, VocabularyItem};
use storage::{DataStore, RecordFilter};

use crate::error::FetchError;

//
// ─── STATE MACHINE ─────────────────────────────────────────────────────────────
//

/// State of the most recent fetch cycle.
///
/// At most one data-bearing variant is live at a time; entering `Fetching`
/// clears both data and error (the previous outcome is superseded).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Fetching,
    Success(Vec<VocabularyItem>),
    Error(FetchError),
}

impl FetchState {
    /// Committed progress records, if the latest cycle succeeded.
    #[must_use]
    pub fn progress(&self) -> Option<&[VocabularyItem]> {
        match self {
            FetchState::Success(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_fetching(&self) -> bool {
        matches!(self, FetchState::Fetching)
    }

    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchState::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Transition function; states are replaced, never edited in place.
    #[must_use]
    pub fn apply(self, event: FetchEvent) -> FetchState {
        match event {
            FetchEvent::Started => FetchState::Fetching,
            FetchEvent::Resolved(data) => FetchState::Success(data),
            FetchEvent::Failed(err) => FetchState::Error(err),
            FetchEvent::Reset => FetchState::Idle,
        }
    }
}

/// Events driving [`FetchState`] transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    Started,
    Resolved(Vec<VocabularyItem>),
    Failed(FetchError),
    Reset,
}

//
// ─── CANCELLATION ──────────────────────────────────────────────────────────────
//

/// Shared flag marking in-flight cycles stale once the owning context is
/// torn down. The underlying store call cannot be aborted; its result is
/// ignored instead.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle for one fetch cycle: its token plus the cancellation token that
/// was current when the cycle started.
#[derive(Debug, Clone)]
pub struct FetchCycle {
    token: u64,
    cancel: CancelToken,
}

impl FetchCycle {
    #[must_use]
    pub fn token(&self) -> u64 {
        self.token
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

//
// ─── FETCHER ───────────────────────────────────────────────────────────────────
//

struct FetchSlot {
    token: u64,
    state: FetchState,
}

/// Fetches all progress records under one protocol, one cycle at a time.
///
/// `refresh` starts a new cycle (token strictly increases, never decreases)
/// and `run` executes it. Commit rules, checked under one lock:
/// the cycle's cancellation token must be clear and its token must still be
/// the newest issued. Anything else is dropped silently; superseded or
/// stale outcomes are never merged into fresher state.
pub struct ProgressFetcher {
    store: Arc<dyn DataStore>,
    protocol: ProtocolUri,
    cancel: CancelToken,
    slot: Mutex<FetchSlot>,
}

impl ProgressFetcher {
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>, protocol: ProtocolUri) -> Self {
        Self {
            store,
            protocol,
            cancel: CancelToken::new(),
            slot: Mutex::new(FetchSlot {
                token: 0,
                state: FetchState::Idle,
            }),
        }
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, FetchSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current fetch state.
    #[must_use]
    pub fn state(&self) -> FetchState {
        self.lock_slot().state.clone()
    }

    /// Token of the most recently issued cycle (0 before the first refresh).
    #[must_use]
    pub fn current_token(&self) -> u64 {
        self.lock_slot().token
    }

    /// Start a new fetch cycle: bump the token and enter `Fetching`,
    /// superseding whatever cycle was in flight.
    #[must_use]
    pub fn refresh(&self) -> FetchCycle {
        let mut slot = self.lock_slot();
        slot.token += 1;
        slot.state = std::mem::take(&mut slot.state).apply(FetchEvent::Started);
        FetchCycle {
            token: slot.token,
            cancel: self.cancel.clone(),
        }
    }

    /// Execute a cycle to completion and commit its outcome if still live.
    pub async fn run(&self, cycle: FetchCycle) {
        let event = match self.query(&cycle).await {
            Ok(data) => FetchEvent::Resolved(data),
            Err(err) => FetchEvent::Failed(err),
        };
        self.commit(&cycle, event);
    }

    /// Start and run one cycle.
    pub async fn refresh_and_run(&self) {
        let cycle = self.refresh();
        self.run(cycle).await;
    }

    /// Mark the fetcher's context torn down. In-flight cycles resolve but
    /// their outcomes are discarded on arrival.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    async fn query(&self, cycle: &FetchCycle) -> Result<Vec<VocabularyItem>, FetchError> {
        let reply = self
            .store
            .query_records(&RecordFilter {
                protocol: self.protocol.clone(),
            })
            .await?;

        if !reply.status.is_success() {
            return Err(FetchError::Status {
                status: reply.status,
            });
        }

        // A success reply with no record list means zero records.
        let Some(records) = reply.records else {
            return Ok(Vec::new());
        };

        tracing::debug!(token = cycle.token(), count = records.len(), "resolving record payloads");
        let payloads = join_all(records.iter().map(|record| record.json::<VocabularyItem>())).await;
        payloads
            .into_iter()
            .collect::<Result<Vec<VocabularyItem>, _>>()
            .map_err(FetchError::from)
    }

    fn commit(&self, cycle: &FetchCycle, event: FetchEvent) {
        let mut slot = self.lock_slot();
        if cycle.is_cancelled() {
            tracing::debug!(token = cycle.token(), "dropping fetch outcome after teardown");
            return;
        }
        if slot.token != cycle.token {
            tracing::debug!(
                token = cycle.token(),
                newest = slot.token,
                "dropping superseded fetch outcome"
            );
            return;
        }
        slot.state = std::mem::take(&mut slot.state).apply(event);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use parrotly_core::model::{Did, ProtocolDefinition, VOCABULARY_PATH};
    use parrotly_core::time::fixed_now;
    use storage::{
        ConfigureReply, CreateReply, ProtocolFilter, ProtocolsReply, RecordEnvelope, RecordsReply,
        Status, StoreError, WriteMessage,
    };

    fn quiz_protocol() -> ProtocolUri {
        ProtocolDefinition::vocabulary_quiz().protocol().clone()
    }

    fn record(id: u64, word: &str) -> RecordEnvelope {
        let definition = ProtocolDefinition::vocabulary_quiz();
        let record_type = definition.record_type(VOCABULARY_PATH).unwrap();
        let payload = format!(r#"{{"word":"{word}","english":"x","id":{id},"lang":"ES"}}"#);
        RecordEnvelope::new(
            format!("rec-{id}"),
            Did::new("did:key:test").unwrap(),
            definition.protocol().clone(),
            VOCABULARY_PATH.into(),
            record_type.schema().clone(),
            record_type.data_format().to_owned(),
            true,
            fixed_now(),
            payload.into_bytes(),
        )
    }

    /// Store whose record queries pop scripted replies in order.
    struct ScriptedStore {
        replies: Mutex<VecDeque<Result<RecordsReply, StoreError>>>,
    }

    impl ScriptedStore {
        fn new(replies: Vec<Result<RecordsReply, StoreError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
            }
        }
    }

    #[async_trait]
    impl DataStore for ScriptedStore {
        async fn query_protocols(
            &self,
            _filter: &ProtocolFilter,
        ) -> Result<ProtocolsReply, StoreError> {
            Ok(ProtocolsReply {
                status: Status::ok(),
                protocols: Vec::new(),
            })
        }

        async fn configure_protocol(
            &self,
            _definition: &ProtocolDefinition,
        ) -> Result<ConfigureReply, StoreError> {
            Ok(ConfigureReply {
                status: Status::ok(),
                protocol: None,
            })
        }

        async fn query_records(&self, _filter: &RecordFilter) -> Result<RecordsReply, StoreError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(StoreError::Connection("script exhausted".into())))
        }

        async fn create_record(
            &self,
            _data: &serde_json::Value,
            _message: &WriteMessage,
        ) -> Result<CreateReply, StoreError> {
            Ok(CreateReply {
                status: Status::rejected("read only"),
                record: None,
            })
        }
    }

    fn ok_reply(records: Vec<RecordEnvelope>) -> Result<RecordsReply, StoreError> {
        Ok(RecordsReply {
            status: Status::ok(),
            records: if records.is_empty() {
                None
            } else {
                Some(records)
            },
        })
    }

    fn fetcher(replies: Vec<Result<RecordsReply, StoreError>>) -> ProgressFetcher {
        ProgressFetcher::new(Arc::new(ScriptedStore::new(replies)), quiz_protocol())
    }

    #[test]
    fn transition_function_covers_all_events() {
        assert_eq!(
            FetchState::Idle.apply(FetchEvent::Started),
            FetchState::Fetching
        );
        assert_eq!(
            FetchState::Fetching.apply(FetchEvent::Resolved(Vec::new())),
            FetchState::Success(Vec::new())
        );
        let err = FetchError::Store(StoreError::Connection("x".into()));
        assert_eq!(
            FetchState::Fetching.apply(FetchEvent::Failed(err.clone())),
            FetchState::Error(err)
        );
        assert_eq!(
            FetchState::Success(Vec::new()).apply(FetchEvent::Reset),
            FetchState::Idle
        );
        // Entering Fetching clears a previous outcome.
        assert_eq!(
            FetchState::Success(Vec::new()).apply(FetchEvent::Started),
            FetchState::Fetching
        );
    }

    #[test]
    fn refresh_tokens_are_monotonic() {
        let fetcher = fetcher(Vec::new());
        let first = fetcher.refresh();
        let second = fetcher.refresh();
        assert_eq!(first.token(), 1);
        assert_eq!(second.token(), 2);
        assert_eq!(fetcher.current_token(), 2);
        assert!(fetcher.state().is_fetching());
    }

    #[tokio::test]
    async fn successful_cycle_commits_payloads_in_reply_order() {
        let fetcher = fetcher(vec![ok_reply(vec![record(2, "perro"), record(1, "como")])]);
        fetcher.refresh_and_run().await;

        let FetchState::Success(data) = fetcher.state() else {
            panic!("expected success, got {:?}", fetcher.state());
        };
        let ids: Vec<u64> = data.iter().map(|item| item.id.value()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn zero_records_commit_as_empty_success() {
        let fetcher = fetcher(vec![ok_reply(Vec::new())]);
        fetcher.refresh_and_run().await;
        assert_eq!(fetcher.state(), FetchState::Success(Vec::new()));
    }

    #[tokio::test]
    async fn non_success_status_commits_as_error() {
        let fetcher = fetcher(vec![Ok(RecordsReply {
            status: Status::new(500, Some("boom".into())),
            records: None,
        })]);
        fetcher.refresh_and_run().await;

        let FetchState::Error(FetchError::Status { status }) = fetcher.state() else {
            panic!("expected status error, got {:?}", fetcher.state());
        };
        assert_eq!(status.code, 500);
    }

    #[tokio::test]
    async fn transport_failure_commits_as_error() {
        let fetcher = fetcher(vec![Err(StoreError::Connection("down".into()))]);
        fetcher.refresh_and_run().await;
        assert!(matches!(
            fetcher.state(),
            FetchState::Error(FetchError::Store(_))
        ));
    }

    #[tokio::test]
    async fn undecodable_payload_commits_as_error() {
        let definition = ProtocolDefinition::vocabulary_quiz();
        let record_type = definition.record_type(VOCABULARY_PATH).unwrap();
        let bad = RecordEnvelope::new(
            "rec-bad".into(),
            Did::new("did:key:test").unwrap(),
            definition.protocol().clone(),
            VOCABULARY_PATH.into(),
            record_type.schema().clone(),
            record_type.data_format().to_owned(),
            true,
            fixed_now(),
            b"not json".to_vec(),
        );
        let fetcher = fetcher(vec![ok_reply(vec![bad])]);
        fetcher.refresh_and_run().await;
        assert!(matches!(
            fetcher.state(),
            FetchState::Error(FetchError::Store(StoreError::Serialization(_)))
        ));
    }

    #[tokio::test]
    async fn slow_older_cycle_cannot_clobber_newer_outcome() {
        // First scripted reply goes to whichever cycle queries first; run the
        // newer cycle first so the older one resolves late.
        let fetcher = fetcher(vec![
            ok_reply(vec![record(2, "perro")]),
            ok_reply(vec![record(1, "como")]),
        ]);

        let older = fetcher.refresh();
        let newer = fetcher.refresh();

        fetcher.run(newer).await;
        let after_newer = fetcher.state();

        fetcher.run(older).await;
        assert_eq!(fetcher.state(), after_newer);
        let ids: Vec<u64> = fetcher
            .state()
            .progress()
            .unwrap()
            .iter()
            .map(|item| item.id.value())
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[tokio::test]
    async fn superseded_error_outcome_is_also_dropped() {
        let fetcher = fetcher(vec![
            ok_reply(vec![record(1, "como")]),
            Err(StoreError::Connection("late failure".into())),
        ]);

        let newer_data = {
            let older = fetcher.refresh();
            let newer = fetcher.refresh();
            fetcher.run(newer).await;
            // The older cycle now resolves to a transport error; it must not
            // replace the committed success.
            fetcher.run(older).await;
            fetcher.state()
        };
        assert!(matches!(newer_data, FetchState::Success(_)));
    }

    #[tokio::test]
    async fn outcome_after_teardown_is_dropped() {
        let fetcher = fetcher(vec![ok_reply(vec![record(1, "como")])]);
        let cycle = fetcher.refresh();
        fetcher.close();
        fetcher.run(cycle).await;

        // Still Fetching: the resolved outcome was discarded, nothing else
        // observable changed.
        assert!(fetcher.state().is_fetching());
        assert!(fetcher.is_closed());
    }
}
