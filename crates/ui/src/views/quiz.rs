use dioxus::prelude::*;

use services::{AnswerOutcome, FetchState};

use crate::context::AppContext;
use crate::vm::map_quiz_round;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Feedback {
    None,
    Correct,
    Incorrect,
    WriteFailed,
}

#[component]
pub fn QuizView() -> Element {
    let ctx = use_context::<AppContext>();
    let services = ctx.services();
    let round = use_signal({
        let services = services.clone();
        move || services.next_round()
    });
    let mut selected = use_signal(|| None::<usize>);
    let feedback = use_signal(|| Feedback::None);
    let submitting = use_signal(|| false);

    // Questions keep coming even when progress could not be fetched; the
    // quiz then treats every word as unpracticed rather than going dark.
    let fetch_failed = matches!(services.progress(), FetchState::Error(_));
    let vm = round().as_ref().map(map_quiz_round);

    let on_submit = {
        let services = services.clone();
        let mut round = round;
        let mut selected = selected;
        let mut feedback = feedback;
        let mut submitting = submitting;
        move |_| {
            let Some(current) = round() else {
                return;
            };
            let Some(index) = selected() else {
                return;
            };
            let Some(choice) = current.options().get(index).cloned() else {
                return;
            };
            let services = services.clone();
            submitting.set(true);
            feedback.set(Feedback::None);
            spawn(async move {
                match services.submit_answer(&current, &choice).await {
                    Ok(AnswerOutcome::Correct) => {
                        feedback.set(Feedback::Correct);
                        selected.set(None);
                        round.set(services.next_round());
                    }
                    Ok(AnswerOutcome::Incorrect) => feedback.set(Feedback::Incorrect),
                    Err(_) => feedback.set(Feedback::WriteFailed),
                }
                submitting.set(false);
            });
        }
    };

    rsx! {
        div { class: "page quiz-page",
            h2 { "Quiz" }

            if fetch_failed {
                p { class: "banner banner-error",
                    "Progress could not be loaded; questions are drawn from the full word list."
                }
            }

            match vm {
                None => rsx! {
                    p { class: "banner banner-info",
                        "You know every word in this dictionary. Well done!"
                    }
                },
                Some(vm) => rsx! {
                    p { class: "quiz-prompt", "{vm.prompt}" }
                    div { class: "quiz-options",
                        for option in vm.options {
                            label { class: "quiz-option", key: "{option.index}",
                                input {
                                    r#type: "radio",
                                    name: "quiz-answer",
                                    checked: selected() == Some(option.index),
                                    onchange: move |_| selected.set(Some(option.index)),
                                }
                                "{option.label}"
                            }
                        }
                    }
                    button {
                        class: "btn",
                        disabled: submitting() || selected().is_none(),
                        onclick: on_submit,
                        "Submit"
                    }
                    match feedback() {
                        Feedback::None => rsx! {},
                        Feedback::Correct => rsx! {
                            p { class: "feedback-correct", "Correct!" }
                        },
                        Feedback::Incorrect => rsx! {
                            p { class: "feedback-incorrect", "Not quite. Try again." }
                        },
                        Feedback::WriteFailed => rsx! {
                            p { class: "banner banner-error",
                                "Your answer could not be saved. Try again."
                            }
                        },
                    }
                },
            }
        }
    }
}
