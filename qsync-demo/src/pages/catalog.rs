//! Catalog page

use crate::catalog::{
    all_tags, catalog_config, filter_products, page_count, page_of, CatalogQuery, SortOrder,
};
use crate::Route;
use dioxus::prelude::*;
use qsync_ui::{
    use_query_string_context, use_query_string_provider, QueryString, SetQueryStringOptions,
};
use tracing::debug;

type CatalogState = QueryString<Route, CatalogQuery>;

/// Write `next` to the query string. Failures are logged by the handle.
fn apply(handle: CatalogState, next: CatalogQuery, options: Option<SetQueryStringOptions>) {
    let _ = handle.set_query_string(next, options);
}

/// One-based label for a zero-based page, clamped to the last page.
fn page_label(page: u32, pages: usize) -> String {
    let shown = u64::from(page).saturating_add(1).min(pages.max(1) as u64);
    format!("Page {shown} of {pages}")
}

fn format_price(cents: u32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

#[component]
pub fn Catalog(query: String) -> Element {
    debug!("Rendering catalog for query {query:?}");
    let handle = use_query_string_provider::<Route, CatalogQuery>(catalog_config)?;
    let state = handle.state();

    let matching = filter_products(&state);
    let pages = page_count(matching.len());
    let visible = page_of(&matching, state.page);

    rsx! {
        div { class: "catalog",
            h1 { "Catalog" }
            SearchBar {}
            TagFilter {}
            SortToggle {}
            if visible.is_empty() {
                p { "Nothing matches these filters." }
            }
            for product in visible.iter() {
                div { key: "{product.name}", class: "product",
                    span { "{product.name}" }
                    span { {format_price(product.price_cents)} }
                }
            }
            Pager { pages }
        }
    }
}

/// Typing only updates state; the URL catches up on "Search".
#[component]
fn SearchBar() -> Element {
    let handle: CatalogState = use_query_string_context();
    let state = handle.state();

    rsx! {
        div { class: "toolbar",
            input {
                r#type: "search",
                placeholder: "Search products",
                value: "{state.q}",
                oninput: move |evt: FormEvent| {
                    let current = handle.state();
                    let next = CatalogQuery {
                        q: evt.value(),
                        page: 0,
                        ..(*current).clone()
                    };
                    apply(handle, next, Some(SetQueryStringOptions::state_only()));
                },
            }
            button {
                onclick: move |_| {
                    // Logged by the handle
                    let _ = handle.sync_state_with_query_string(None);
                },
                "Search"
            }
        }
    }
}

#[component]
fn TagFilter() -> Element {
    let handle: CatalogState = use_query_string_context();
    let state = handle.state();

    rsx! {
        div { class: "toolbar",
            for tag in all_tags() {
                button {
                    key: "{tag}",
                    class: if state.tags.iter().any(|t| t == tag) { "tag active" } else { "tag" },
                    onclick: move |_| apply(handle, handle.state().with_tag_toggled(tag), None),
                    "{tag}"
                }
            }
        }
    }
}

#[component]
fn SortToggle() -> Element {
    let handle: CatalogState = use_query_string_context();
    let sort = handle.state().sort;
    let (label, next_sort) = match sort {
        SortOrder::Name => ("Sorted by name", SortOrder::Price),
        SortOrder::Price => ("Sorted by price", SortOrder::Name),
    };

    rsx! {
        div { class: "toolbar",
            button {
                onclick: move |_| {
                    let next = CatalogQuery {
                        sort: next_sort,
                        page: 0,
                        ..(*handle.state()).clone()
                    };
                    apply(handle, next, None);
                },
                "{label}"
            }
        }
    }
}

#[component]
fn Pager(pages: usize) -> Element {
    let handle: CatalogState = use_query_string_context();
    let last = u32::try_from(pages.saturating_sub(1)).unwrap_or(u32::MAX);
    // Out of range pages from a hand-edited URL count as the last one
    let page = handle.state().page.min(last);

    let go_to = move |page: u32| {
        let next = CatalogQuery {
            page,
            ..(*handle.state()).clone()
        };
        apply(handle, next, None);
    };

    rsx! {
        div { class: "pager",
            button {
                disabled: page == 0,
                onclick: move |_| go_to(page.saturating_sub(1)),
                "Previous"
            }
            span { {page_label(page, pages)} }
            button {
                disabled: page >= last,
                onclick: move |_| go_to(page.saturating_add(1)),
                "Next"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(3900), "$39.00");
        assert_eq!(format_price(1905), "$19.05");
        assert_eq!(format_price(0), "$0.00");
    }

    #[test]
    fn test_page_label() {
        assert_eq!(page_label(0, 3), "Page 1 of 3");
        assert_eq!(page_label(2, 3), "Page 3 of 3");
    }

    #[test]
    fn test_page_label_clamps_huge_page() {
        assert_eq!(page_label(u32::MAX, 3), "Page 3 of 3");
        assert_eq!(page_label(u32::MAX, 1), "Page 1 of 1");
    }
}
