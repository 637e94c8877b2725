use dioxus::prelude::*;

use services::FetchState;

use crate::context::AppContext;
use crate::vm::map_vocabulary_rows;

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let services = ctx.services();
    let mut version = use_signal(|| 0u32);

    // Read the signal so a completed refresh re-renders the snapshot below.
    let _ = version();
    let progress = services.progress();
    let rows = map_vocabulary_rows(services.dictionary(), &services.known_ids());
    let known_count = rows.iter().filter(|row| row.known).count();

    let refresh_services = ctx.services();
    let on_refresh = move |_| {
        let services = refresh_services.clone();
        spawn(async move {
            services.fetcher().refresh_and_run().await;
            version.set(version() + 1);
        });
    };

    rsx! {
        div { class: "page home-page",
            h2 { "Vocabulary" }
            p { class: "view-subtitle",
                "{services.dictionary().language()} words: {known_count} of {rows.len()} known"
            }

            match progress {
                FetchState::Fetching => rsx! {
                    p { class: "banner banner-info", "Syncing progress..." }
                },
                FetchState::Error(_) => rsx! {
                    p { class: "banner banner-error",
                        "Progress could not be loaded; showing every word as unpracticed."
                    }
                },
                FetchState::Idle | FetchState::Success(_) => rsx! {},
            }

            button { class: "btn", onclick: on_refresh, "Refresh" }

            ul { class: "word-list",
                for row in rows {
                    li { class: "word-row", key: "{row.id}",
                        span { "{row.word} ({row.english})" }
                        if row.known {
                            span { class: "word-known", "Known" }
                        }
                    }
                }
            }
        }
    }
}
