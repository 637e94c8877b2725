//! Question selection and round assembly.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use parrotly_core::model::{Dictionary, VocabularyItem};

/// Number of answer options presented per round.
pub const OPTION_COUNT: usize = 4;

//
// ─── ROUND ─────────────────────────────────────────────────────────────────────
//

/// One quiz round: a question word, the shuffled options, and the prompt
/// shown to the learner.
///
/// Options hold the question word exactly once plus three draws taken
/// independently from the full dictionary. Draws are not deduplicated, so a
/// small dictionary can repeat an option (or the question word itself); a
/// repeated correct word makes the round easier, never unanswerable.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizRound {
    question: VocabularyItem,
    options: Vec<VocabularyItem>,
    prompt: String,
}

impl QuizRound {
    #[must_use]
    pub fn question(&self) -> &VocabularyItem {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[VocabularyItem] {
        &self.options
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Whether `selected` answers the round correctly. Compared by word id,
    /// so picking a duplicate draw of the question word counts as correct.
    #[must_use]
    pub fn is_correct(&self, selected: &VocabularyItem) -> bool {
        selected.id == self.question.id
    }
}

//
// ─── SELECTION ─────────────────────────────────────────────────────────────────
//

/// Pick the next question uniformly from the not-yet-known words.
#[must_use]
pub fn pick_question(unknown: &[VocabularyItem], rng: &mut impl Rng) -> Option<VocabularyItem> {
    unknown.choose(rng).cloned()
}

/// Assemble a round for `question`: draw three options from the full
/// dictionary, add the question word, shuffle, and phrase the prompt.
#[must_use]
pub fn build_round(
    dictionary: &Dictionary,
    question: VocabularyItem,
    rng: &mut impl Rng,
) -> QuizRound {
    let mut options: Vec<VocabularyItem> = (0..OPTION_COUNT - 1)
        .filter_map(|_| dictionary.items().choose(rng).cloned())
        .collect();
    options.push(question.clone());
    options.shuffle(rng);

    let prompt = question_prompt(&question.word, dictionary.language(), rng);
    QuizRound {
        question,
        options,
        prompt,
    }
}

/// Pick a question from `unknown` and build its round, or `None` when every
/// dictionary word is already known.
#[must_use]
pub fn next_round(
    dictionary: &Dictionary,
    unknown: &[VocabularyItem],
    rng: &mut impl Rng,
) -> Option<QuizRound> {
    let question = pick_question(unknown, rng)?;
    Some(build_round(dictionary, question, rng))
}

/// One of three prompt phrasings, chosen at random so repeated rounds do not
/// read identically.
fn question_prompt(word: &str, language: &str, rng: &mut impl Rng) -> String {
    match rng.random_range(0..3u8) {
        1 => format!("What does '{word}' mean?"),
        2 => format!("Which one of these means '{word}'?"),
        _ => format!("In {language}, what does the word '{word}' mean?"),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use parrotly_core::model::{WordId, spanish};

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn one_word_dictionary() -> Dictionary {
        Dictionary::new(
            "Spanish",
            vec![VocabularyItem::new(WordId::new(1), "sol", "sun", "ES")],
        )
        .unwrap()
    }

    #[test]
    fn round_has_four_options_including_the_question() {
        let dictionary = spanish();
        let unknown = dictionary.items().to_vec();

        for seed in 0..32 {
            let round = next_round(dictionary, &unknown, &mut rng(seed)).unwrap();
            assert_eq!(round.options().len(), OPTION_COUNT);
            assert!(
                round
                    .options()
                    .iter()
                    .any(|option| option.id == round.question().id),
                "question missing from options for seed {seed}"
            );
        }
    }

    #[test]
    fn question_comes_from_the_unknown_set() {
        let dictionary = spanish();
        let unknown: Vec<VocabularyItem> = dictionary.items().iter().take(3).cloned().collect();

        for seed in 0..32 {
            let round = next_round(dictionary, &unknown, &mut rng(seed)).unwrap();
            assert!(unknown.iter().any(|item| item.id == round.question().id));
        }
    }

    #[test]
    fn exhausted_unknown_set_ends_the_quiz() {
        assert_eq!(next_round(spanish(), &[], &mut rng(7)), None);
    }

    #[test]
    fn single_word_dictionary_repeats_the_word_across_options() {
        let dictionary = one_word_dictionary();
        let unknown = dictionary.items().to_vec();
        let round = next_round(&dictionary, &unknown, &mut rng(3)).unwrap();

        assert_eq!(round.options().len(), OPTION_COUNT);
        assert!(
            round
                .options()
                .iter()
                .all(|option| option.id == round.question().id)
        );
        // Any duplicate of the question word still answers correctly.
        assert!(round.is_correct(&round.options()[0].clone()));
    }

    #[test]
    fn correctness_is_judged_by_id_not_spelling() {
        let dictionary = spanish();
        let unknown = dictionary.items().to_vec();
        let round = next_round(dictionary, &unknown, &mut rng(11)).unwrap();

        let mut renamed = round.question().clone();
        renamed.english = "anything".into();
        assert!(round.is_correct(&renamed));

        let wrong = dictionary
            .items()
            .iter()
            .find(|item| item.id != round.question().id)
            .unwrap();
        assert!(!round.is_correct(wrong));
    }

    #[test]
    fn prompt_mentions_the_question_word() {
        let dictionary = spanish();
        let unknown = dictionary.items().to_vec();

        for seed in 0..16 {
            let round = next_round(dictionary, &unknown, &mut rng(seed)).unwrap();
            assert!(round.prompt().contains(&round.question().word));
        }
    }

    #[test]
    fn all_three_phrasings_occur() {
        let mut starts = std::collections::HashSet::new();
        for seed in 0..64 {
            let prompt = question_prompt("sol", "ES", &mut rng(seed));
            let start: String = prompt.chars().take(4).collect();
            starts.insert(start);
        }
        assert_eq!(starts.len(), 3, "expected all phrasings across 64 seeds");
    }
}
