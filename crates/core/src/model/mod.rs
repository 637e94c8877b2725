mod dictionary;
mod ids;
mod protocol;
mod vocabulary;

pub use dictionary::{Dictionary, DictionaryError, spanish};
pub use ids::{Did, ParseDidError, ParseWordIdError, WordId};
pub use protocol::{
    Action, ActionRule, Actor, JSON_DATA_FORMAT, ProtocolDefinition, ProtocolDefinitionError,
    ProtocolUri, QUIZ_PROTOCOL_URI, RecordTypeDef, SchemaUri, VOCABULARY_PATH,
    VOCABULARY_SCHEMA_URI,
};
pub use vocabulary::VocabularyItem;
