//! Shared error types for the services crate.

use thiserror::Error;

use parrotly_core::model::DictionaryError;
use storage::{Status, StoreError};

/// Errors emitted by protocol negotiation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProtocolError {
    #[error("protocol failed to install locally")]
    InstallFailed,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure of one fetch cycle, carried inside `FetchState::Error`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FetchError {
    #[error("record query returned status {status}")]
    Status { status: Status },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors emitted by `AnswerService`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("protocol does not declare the vocabulary record type")]
    MisconfiguredProtocol,
    #[error("record creation rejected with status {status}")]
    Rejected { status: Status },
    #[error("store returned no record handle")]
    MissingRecord,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Answer(#[from] AnswerError),
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
}
