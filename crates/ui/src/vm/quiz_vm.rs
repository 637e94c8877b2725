use parrotly_core::model::VocabularyItem;
use services::QuizRound;

#[derive(Clone, Debug, PartialEq)]
pub struct QuizOptionVm {
    pub index: usize,
    pub label: String,
    pub item: VocabularyItem,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuizVm {
    pub prompt: String,
    pub options: Vec<QuizOptionVm>,
}

/// Map a round for rendering. Options show the English gloss; the word being
/// asked about only ever appears in the prompt.
#[must_use]
pub fn map_quiz_round(round: &QuizRound) -> QuizVm {
    QuizVm {
        prompt: round.prompt().to_owned(),
        options: round
            .options()
            .iter()
            .enumerate()
            .map(|(index, item)| QuizOptionVm {
                index,
                label: item.english.clone(),
                item: item.clone(),
            })
            .collect(),
    }
}
