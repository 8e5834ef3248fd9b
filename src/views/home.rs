use crate::browser::BrowserWallet;
use crate::contract::DEFAULT_ATM_ADDRESS;
use crate::page::{CONNECT_PROMPT, INSTALL_PROMPT, Page, View};
use crate::views::AccountPanel;
use dioxus::prelude::*;
use std::time::Duration;

/// Delay between two receipt polls while a transaction is pending
const POLL_INTERVAL: Duration = Duration::from_millis(1000);

#[component]
pub fn Home() -> Element {
    let mut page = use_signal(|| Page::<BrowserWallet>::new(DEFAULT_ATM_ADDRESS, POLL_INTERVAL));

    // look for an injected wallet once, on mount
    use_future(move || async move {
        let detected = BrowserWallet::detect().await;
        let mut next = page.peek().snapshot();
        if let Err(e) = next.acquire_wallet(detected).await {
            log::error!("Failed to list wallet accounts: {}", e);
        }
        page.write().merge(next);
    });

    let view = page.read().view();

    rsx! {
        document::Title { "Metacrafters ATM" }
        document::Meta {
            name: "viewport",
            content: "width=device-width, initial-scale=1.0",
        }
        main { class: "container", style: "text-align: center;",
            header {
                h1 { "Welcome to the Metacrafters ATM!" }
            }
            match view {
                View::InstallPrompt => rsx! {
                    p { "{INSTALL_PROMPT}" }
                },
                View::ConnectButton => rsx! {
                    button {
                        id: "connect-button",
                        onclick: move |_| async move {
                            let mut next = page.peek().snapshot();
                            if let Err(e) = next.connect_account().await {
                                log::error!("Wallet connection failed: {}", e);
                            }
                            page.write().merge(next);
                        },
                        "{CONNECT_PROMPT}"
                    }
                },
                View::Account => rsx! {
                    AccountPanel { page }
                },
            }
        }
    }
}
