//! qsync demo - Catalog page whose filters live in the URL
//!
//! Search, sort, tag filters and paging are all query string state: reload,
//! share or press back and the page comes back the same.

mod catalog;
mod pages;

use dioxus::prelude::*;
use pages::Catalog;

pub const MAIN_CSS: Asset = asset!("/assets/main.css");

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[route("/?:..query")]
    Catalog { query: String },
}

#[component]
pub fn App() -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        div { class: "min-h-screen", Router::<Route> {} }
    }
}

fn main() {
    dioxus::launch(App);
}
