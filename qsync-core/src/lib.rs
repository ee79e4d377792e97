//! qsync-core - Keeps one slice of component state in agreement with the URL query string
//!
//! Framework-free pieces: query normalization, the codec adapter, the sync
//! controller and the history collaborator it navigates through. The Dioxus
//! binding lives in `qsync-ui`.

pub mod codec;
pub mod controller;
pub mod error;
pub mod history;
pub mod normalize;
pub mod options;

pub use codec::{QueryAdapter, QueryCodec, QueryData, QueryStringConfig, UrlEncodedCodec};
pub use controller::{LocationChange, SyncController};
pub use error::{CodecError, NavigationError, SyncError};
pub use history::{History, HistoryEntry, Location, MemoryHistory};
pub use normalize::{normalize, CanonicalQuery};
pub use options::{
    ArrayFormat, ParseOptions, QueryStringOptions, SetQueryStringOptions, StringifyOptions,
};
