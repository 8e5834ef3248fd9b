use crate::browser::BrowserWallet;
use crate::page::Page;
use crate::views::{ActivityList, OwnerCard};
use dioxus::prelude::*;

// Handlers run on a snapshot of the page and merge back only what they
// changed. Two reads of the same value in flight at once: last one wins.
#[component]
pub fn AccountPanel(page: Signal<Page<BrowserWallet>>) -> Element {
    let mut page = page;

    // first balance read after connecting
    let needs_balance = use_memo(move || {
        let current = page.read();
        current.balance().is_none() && current.contract().is_some()
    });
    use_effect(move || {
        if !needs_balance() {
            return;
        }
        if let Some(atm) = page.peek().contract() {
            spawn(async move {
                let mut page = page;
                match atm.get_balance().await {
                    Ok(wei) => page.write().record_balance(wei),
                    Err(e) => log::error!("Failed to read balance: {}", e),
                }
            });
        }
    });

    let current = page.read().clone();
    let account = current
        .account()
        .map(|a| a.to_string())
        .unwrap_or_default();
    let balance = current
        .balance()
        .map_or_else(|| "Loading...".to_string(), |b| b.to_string());
    let owner = current.owner_info().cloned();
    let error = current.error().to_string();
    let entries = current.activity().entries().to_vec();
    let deposit_amount = current.deposit_amount.clone();
    let withdrawal_amount = current.withdrawal_amount.clone();
    let min_deposit = current.min_deposit();
    let min_withdrawal = current.min_withdrawal();

    rsx! {
        div { id: "account-panel",
            p { "Your Account: {account}" }
            p { "Your Balance: {balance}" }

            div {
                label { r#for: "deposit-amount", "Deposit Amount (ETH):" }
                input {
                    r#type: "number",
                    id: "deposit-amount",
                    value: "{deposit_amount}",
                    placeholder: "Enter deposit amount",
                    oninput: move |event| page.write().deposit_amount = event.value(),
                }
            }
            button {
                id: "deposit-button",
                onclick: move |_| async move {
                    let mut next = page.peek().snapshot();
                    if let Err(e) = next.deposit().await {
                        log::error!("Deposit failed: {}", e);
                    }
                    page.write().merge(next);
                },
                "Deposit"
            }

            div {
                label { r#for: "withdrawal-amount", "Withdrawal Amount (ETH):" }
                input {
                    r#type: "number",
                    id: "withdrawal-amount",
                    value: "{withdrawal_amount}",
                    placeholder: "Enter withdrawal amount",
                    oninput: move |event| page.write().withdrawal_amount = event.value(),
                }
            }
            button {
                id: "withdraw-button",
                onclick: move |_| async move {
                    let mut next = page.peek().snapshot();
                    if let Err(e) = next.withdraw().await {
                        log::error!("Withdrawal failed: {}", e);
                    }
                    page.write().merge(next);
                },
                "Withdraw"
            }

            button {
                id: "owner-button",
                onclick: move |_| async move {
                    let mut next = page.peek().snapshot();
                    if let Err(e) = next.fetch_owner_info().await {
                        log::error!("Failed to fetch owner info: {}", e);
                    }
                    page.write().merge(next);
                },
                "Account Owner Info"
            }

            div {
                label { r#for: "min-deposit", "Minimum Deposit (ETH):" }
                input {
                    r#type: "number",
                    id: "min-deposit",
                    value: "{min_deposit}",
                    oninput: move |event| page.write().set_min_deposit(&event.value()),
                }
            }
            div {
                label { r#for: "min-withdrawal", "Minimum Withdrawal (ETH):" }
                input {
                    r#type: "number",
                    id: "min-withdrawal",
                    value: "{min_withdrawal}",
                    oninput: move |event| page.write().set_min_withdrawal(&event.value()),
                }
            }
            button {
                id: "limits-button",
                onclick: move |_| async move {
                    let mut next = page.peek().snapshot();
                    if let Err(e) = next.set_limits().await {
                        log::error!("Setting limits failed: {}", e);
                    }
                    page.write().merge(next);
                },
                "Set Limits"
            }

            if let Some(info) = owner {
                OwnerCard { info }
            }
            if !error.is_empty() {
                p { class: "error-message", style: "color: red;", "{error}" }
            }
            ActivityList { entries }
        }
    }
}
