use crate::contract::OwnerInfo;
use dioxus::prelude::*;

#[component]
pub fn OwnerCard(info: OwnerInfo) -> Element {
    rsx! {
        div { id: "owner-info",
            p { "Owner Name: {info.name}" }
            p { "Age: {info.age}" }
            p { "Gender: {info.gender}" }
            p { "Loans: {info.loans}" }
        }
    }
}
