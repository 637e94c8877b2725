use super::test_harness::{ViewKind, fetch_failing_services, healthy_services, setup_view_harness};
use services::{AnswerOutcome, OPTION_COUNT};

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_lists_the_dictionary() {
    let services = healthy_services().await;
    let mut harness = setup_view_harness(ViewKind::Home, services.clone());
    harness.rebuild();

    let html = harness.render();
    let expected = format!("0 of {} known", services.dictionary().len());
    assert!(html.contains(&expected), "missing {expected} in {html}");
    for item in services.dictionary().items().iter().take(3) {
        assert!(html.contains(&item.word), "missing {} in {html}", item.word);
    }
    assert!(
        !html.contains("word-known"),
        "no word should be marked known yet: {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_marks_answered_words_known() {
    let services = healthy_services().await;
    let round = services.next_round().expect("fresh session has rounds");
    let outcome = services
        .submit_answer(&round, &round.question().clone())
        .await
        .expect("answer write");
    assert_eq!(outcome, AnswerOutcome::Correct);

    let mut harness = setup_view_harness(ViewKind::Home, services.clone());
    harness.rebuild();

    let html = harness.render();
    let expected = format!("1 of {} known", services.dictionary().len());
    assert!(html.contains(&expected), "missing {expected} in {html}");
    assert!(html.contains("word-known"), "missing known marker in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_renders_prompt_and_options() {
    let services = healthy_services().await;
    let mut harness = setup_view_harness(ViewKind::Quiz, services);
    harness.rebuild();

    let html = harness.render();
    assert!(
        html.matches("quiz-option").count() >= OPTION_COUNT,
        "expected {OPTION_COUNT} option buttons in {html}"
    );
    assert!(
        html.contains("mean"),
        "every prompt phrasing asks for a meaning: {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_stays_playable_when_fetch_fails() {
    let services = fetch_failing_services().await;
    let mut harness = setup_view_harness(ViewKind::Quiz, services);
    harness.rebuild();

    let html = harness.render();
    assert!(
        html.contains("Progress could not be loaded"),
        "missing error banner in {html}"
    );
    // Fail-open: the question and options render despite the fetch error.
    assert!(
        html.matches("quiz-option").count() >= OPTION_COUNT,
        "quiz should stay playable in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_fails_open_on_fetch_error() {
    let services = fetch_failing_services().await;
    let mut harness = setup_view_harness(ViewKind::Home, services.clone());
    harness.rebuild();

    let html = harness.render();
    assert!(
        html.contains("Progress could not be loaded"),
        "missing error banner in {html}"
    );
    let expected = format!("0 of {} known", services.dictionary().len());
    assert!(html.contains(&expected), "missing {expected} in {html}");
}
