use crate::activity::Activity;
use dioxus::prelude::*;

// confirmed transactions of this session as a vertical card list
#[component]
pub fn ActivityList(entries: Vec<Activity>) -> Element {
    if entries.is_empty() {
        return rsx! {};
    }

    rsx! {
        div { id: "activity",
            h2 { "Recent transactions" }
            ul { class: "transactions-list",
                for entry in entries {
                    ActivityCard { key: "{entry.hash}", entry }
                }
            }
        }
    }
}

#[component]
fn ActivityCard(entry: Activity) -> Element {
    let kind = entry.kind.to_string();
    let hash = entry.short_hash();
    let time = entry.time();

    rsx! {
        li { class: "transaction-card",
            p {
                strong { "{kind}:" }
                " {entry.summary}"
            }
            p {
                strong { "Hash:" }
                " {hash}"
            }
            if let Some(block) = entry.block {
                p {
                    strong { "Block:" }
                    " {block}"
                }
            }
            p {
                strong { "Time:" }
                " {time}"
            }
        }
    }
}
