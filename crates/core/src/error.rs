use thiserror::Error;

use crate::model::{DictionaryError, ProtocolDefinitionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
    #[error(transparent)]
    ProtocolDefinition(#[from] ProtocolDefinitionError),
}
