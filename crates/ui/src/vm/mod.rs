mod quiz_vm;
mod vocabulary_vm;

pub use quiz_vm::{QuizOptionVm, QuizVm, map_quiz_round};
pub use vocabulary_vm::{VocabularyRowVm, map_vocabulary_rows};
