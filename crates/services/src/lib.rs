#![forbid(unsafe_code)]

pub mod answer;
pub mod app_services;
pub mod error;
pub mod fetch;
pub mod protocol;
pub mod quiz;

pub use parrotly_core::Clock;

pub use answer::{AnswerOutcome, AnswerService};
pub use app_services::AppServices;
pub use error::{AnswerError, AppServicesError, FetchError, ProtocolError};
pub use fetch::{CancelToken, FetchCycle, FetchEvent, FetchState, ProgressFetcher};
pub use protocol::ensure_protocol;
pub use quiz::{OPTION_COUNT, QuizRound};
