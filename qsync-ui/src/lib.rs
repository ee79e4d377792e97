//! qsync-ui - Dioxus binding for query string state
//!
//! Exposes the sync controller to components as a hook-produced handle,
//! optionally shared with descendants through context.

pub mod history;
pub mod hooks;

pub use history::{route_location, RouterHistory};
pub use hooks::{
    use_query_string, use_query_string_context, use_query_string_provider, QueryString,
};
pub use qsync_core::{
    ArrayFormat, ParseOptions, QueryAdapter, QueryData, QueryStringConfig, QueryStringOptions,
    SetQueryStringOptions, StringifyOptions, SyncError,
};
