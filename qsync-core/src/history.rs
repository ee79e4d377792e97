//! Routing collaborators: the current location and a navigation sink

use crate::error::NavigationError;
use serde_json::Value;
use tracing::trace;

/// Path and search of the current URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub pathname: String,
    /// Query string including its leading `?`, or empty
    pub search: String,
}

impl Location {
    pub fn new(pathname: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            search: search.into(),
        }
    }

    /// Split `/path?query#hash` into pathname and search. The fragment is dropped.
    pub fn parse(path: &str) -> Self {
        let path = path.split_once('#').map_or(path, |(before, _)| before);
        match path.find('?') {
            Some(at) => Self::new(&path[..at], &path[at..]),
            None => Self::new(path, ""),
        }
    }

    pub fn href(&self) -> String {
        format!("{}{}", self.pathname, self.search)
    }
}

/// Navigation primitive offered by the routing layer.
pub trait History {
    /// Navigate to `path`, attaching `state` as the entry's opaque payload.
    fn push(&mut self, path: &str, state: Option<Value>) -> Result<(), NavigationError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub location: Location,
    pub state: Option<Value>,
}

/// In-memory history stack for headless hosts and tests.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl MemoryHistory {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![HistoryEntry {
                location: Location::parse(initial),
                state: None,
            }],
            index: 0,
        }
    }

    pub fn location(&self) -> &Location {
        &self.entries[self.index].location
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Step back one entry. Returns the new location, or `None` at the start.
    pub fn back(&mut self) -> Option<Location> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.location().clone())
    }

    /// Step forward one entry. Returns the new location, or `None` at the end.
    pub fn forward(&mut self) -> Option<Location> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.location().clone())
    }
}

impl History for MemoryHistory {
    fn push(&mut self, path: &str, state: Option<Value>) -> Result<(), NavigationError> {
        if !path.starts_with('/') {
            return Err(NavigationError::new(path, "path must be absolute"));
        }

        trace!("Memory history push: {path}");
        // Pushing drops any forward entries, like a browser does
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry {
            location: Location::parse(path),
            state,
        });
        self.index = self.entries.len() - 1;
        Ok(())
    }
}
