//! Sync controller: keeps held state and the URL query string in agreement
//!
//! Inbound, a location change re-derives state from the URL only when its
//! parameters differ from the last query this controller knows about. Outbound,
//! an explicit set records the new canonical query *before* navigating, so the
//! location change caused by that navigation is recognized as an echo.

use crate::codec::{QueryAdapter, QueryCodec, QueryStringConfig, UrlEncodedCodec};
use crate::error::SyncError;
use crate::history::{History, Location};
use crate::normalize::{normalize, CanonicalQuery};
use crate::options::SetQueryStringOptions;
use serde::Serialize;
use std::rc::Rc;
use tracing::{debug, trace};

/// What a location change did to the held state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationChange {
    /// Raw search text identical to the previous location
    Unchanged,
    /// Same parameters as the last known query (reordered, or our own navigation)
    Echo,
    /// State was re-derived from the new query string
    Updated,
}

pub struct SyncController<T, C = UrlEncodedCodec> {
    adapter: QueryAdapter<T, C>,
    location: Location,
    last_query: CanonicalQuery,
    state: Rc<T>,
}

impl<T> SyncController<T> {
    pub fn mount(location: Location, config: QueryStringConfig<T>) -> Result<Self, SyncError> {
        Self::mount_with_codec(location, QueryAdapter::new(config))
    }
}

impl<T, C: QueryCodec> SyncController<T, C> {
    pub fn mount_with_codec(
        location: Location,
        adapter: QueryAdapter<T, C>,
    ) -> Result<Self, SyncError> {
        let last_query = normalize(&location.search);
        let state = Rc::new(adapter.parse(&location.search)?);
        debug!("Query string controller mounted at {}", location.href());

        Ok(Self {
            adapter,
            location,
            last_query,
            state,
        })
    }

    pub fn state(&self) -> Rc<T> {
        Rc::clone(&self.state)
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn last_query(&self) -> &CanonicalQuery {
        &self.last_query
    }

    pub fn adapter(&self) -> &QueryAdapter<T, C> {
        &self.adapter
    }

    /// React to the routing layer reporting a (possibly) new location.
    pub fn location_changed(&mut self, location: Location) -> Result<LocationChange, SyncError> {
        let previous = std::mem::replace(&mut self.location, location);
        if previous.search == self.location.search {
            return Ok(LocationChange::Unchanged);
        }

        let current = normalize(&self.location.search);
        if current == self.last_query {
            trace!("Ignoring query string echo: {current}");
            return Ok(LocationChange::Echo);
        }

        let state = self.adapter.parse(&self.location.search)?;
        debug!("Query string changed to {current}, state re-derived");
        self.last_query = current;
        self.state = Rc::new(state);
        Ok(LocationChange::Updated)
    }

    /// Replace the held state and write it to the URL.
    ///
    /// With `state_only` the URL is left untouched; the next location change
    /// is still compared against the query this state would produce.
    pub fn set_query_string<H: History + ?Sized>(
        &mut self,
        history: &mut H,
        state: T,
        options: Option<&SetQueryStringOptions>,
    ) -> Result<(), SyncError>
    where
        T: Serialize,
    {
        let stringify = options.and_then(|o| o.stringify.as_ref());
        let body = self.adapter.stringify(&state, stringify)?;

        self.last_query = normalize(&format!("?{body}"));
        self.state = Rc::new(state);

        if options.is_some_and(|o| o.state_only) {
            debug!("Query string state set without navigation: {}", self.last_query);
            return Ok(());
        }

        self.sync_state_with_query_string(history, None)
    }

    /// Navigate to the current pathname plus the last known query.
    ///
    /// Carries `state` (or the held state) as the navigation payload. Does not
    /// re-stringify.
    pub fn sync_state_with_query_string<H: History + ?Sized>(
        &mut self,
        history: &mut H,
        state: Option<&T>,
    ) -> Result<(), SyncError>
    where
        T: Serialize,
    {
        let payload = serde_json::to_value(state.unwrap_or(&*self.state))?;
        let path = format!("{}{}", self.location.pathname, self.last_query.to_search());
        debug!("Syncing query string: {path}");
        history.push(&path, Some(payload))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::QueryData;
    use crate::history::MemoryHistory;
    use crate::options::StringifyOptions;
    use serde_json::{json, Value};
    use std::cell::Cell;

    fn data(value: Value) -> QueryData {
        match value {
            Value::Object(map) => map,
            _ => panic!("Expected object"),
        }
    }

    fn mount(path: &str) -> (SyncController<QueryData>, MemoryHistory) {
        let history = MemoryHistory::new(path);
        let controller =
            SyncController::mount(history.location().clone(), QueryStringConfig::raw()).unwrap();
        (controller, history)
    }

    #[test]
    fn test_mount_parses_initial_location() {
        let (controller, _) = mount("/items?b=2&a=1");
        assert_eq!(*controller.state(), data(json!({ "a": "1", "b": "2" })));
        assert_eq!(controller.last_query().as_str(), "?a=1&b=2");
    }

    #[test]
    fn test_mount_runs_transform_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let config = QueryStringConfig::with_transform(move |data: QueryData| {
            counter.set(counter.get() + 1);
            data.len()
        });
        let controller = SyncController::mount(Location::parse("/?a=1&b=2"), config).unwrap();
        assert_eq!(*controller.state(), 2);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_identical_search_is_unchanged() {
        let (mut controller, _) = mount("/items?a=1");
        let before = controller.state();
        let change = controller
            .location_changed(Location::parse("/items?a=1"))
            .unwrap();
        assert_eq!(change, LocationChange::Unchanged);
        assert!(Rc::ptr_eq(&before, &controller.state()));
    }

    #[test]
    fn test_reordered_search_is_echo() {
        let (mut controller, _) = mount("/items?a=1&b=2");
        let before = controller.state();
        let change = controller
            .location_changed(Location::parse("/items?b=2&a=1"))
            .unwrap();
        assert_eq!(change, LocationChange::Echo);
        assert!(Rc::ptr_eq(&before, &controller.state()));
    }

    #[test]
    fn test_external_navigation_updates_state() {
        let (mut controller, _) = mount("/items?a=1");
        let change = controller
            .location_changed(Location::parse("/items?a=1&b=2"))
            .unwrap();
        assert_eq!(change, LocationChange::Updated);
        assert_eq!(*controller.state(), data(json!({ "a": "1", "b": "2" })));
        assert_eq!(controller.last_query().as_str(), "?a=1&b=2");
    }

    #[test]
    fn test_path_change_is_recorded_even_when_unchanged() {
        let (mut controller, mut history) = mount("/items?a=1");
        controller
            .location_changed(Location::parse("/other?a=1"))
            .unwrap();
        controller
            .sync_state_with_query_string(&mut history, None)
            .unwrap();
        assert_eq!(history.location().href(), "/other?a=1");
    }

    #[test]
    fn test_set_query_string_navigates_and_updates_state() {
        let (mut controller, mut history) = mount("/items");
        controller
            .set_query_string(&mut history, data(json!({ "b": "2", "a": "1" })), None)
            .unwrap();

        assert_eq!(*controller.state(), data(json!({ "a": "1", "b": "2" })));
        assert_eq!(history.location().href(), "/items?a=1&b=2");
        assert_eq!(history.current().state, Some(json!({ "a": "1", "b": "2" })));
    }

    #[test]
    fn test_set_query_string_echo_is_suppressed() {
        let (mut controller, mut history) = mount("/items");
        controller
            .set_query_string(&mut history, data(json!({ "a": "1" })), None)
            .unwrap();
        let held = controller.state();

        let change = controller
            .location_changed(history.location().clone())
            .unwrap();
        assert_eq!(change, LocationChange::Echo);
        assert!(Rc::ptr_eq(&held, &controller.state()));
    }

    #[test]
    fn test_state_only_skips_navigation() {
        let (mut controller, mut history) = mount("/items");
        controller
            .set_query_string(
                &mut history,
                data(json!({ "a": "1" })),
                Some(&SetQueryStringOptions::state_only()),
            )
            .unwrap();

        assert_eq!(*controller.state(), data(json!({ "a": "1" })));
        assert_eq!(history.len(), 1);
        assert_eq!(controller.last_query().as_str(), "?a=1");
    }

    #[test]
    fn test_call_site_stringify_options() {
        let (mut controller, mut history) = mount("/items");
        let options = SetQueryStringOptions::with_stringify(StringifyOptions {
            array_format: crate::options::ArrayFormat::Bracket,
            ..Default::default()
        });
        controller
            .set_query_string(&mut history, data(json!({ "t": ["x"] })), Some(&options))
            .unwrap();
        assert_eq!(history.location().search, "?t%5B%5D=x");
    }

    #[test]
    fn test_empty_state_navigates_to_bare_path() {
        let (mut controller, mut history) = mount("/items?a=1");
        controller
            .set_query_string(&mut history, QueryData::new(), None)
            .unwrap();
        assert_eq!(history.location().href(), "/items");

        let change = controller
            .location_changed(history.location().clone())
            .unwrap();
        assert_eq!(change, LocationChange::Echo);
    }

    #[test]
    fn test_sync_uses_given_state_as_payload() {
        let (mut controller, mut history) = mount("/items?a=1");
        let other = data(json!({ "z": "9" }));
        controller
            .sync_state_with_query_string(&mut history, Some(&other))
            .unwrap();
        assert_eq!(history.location().href(), "/items?a=1");
        assert_eq!(history.current().state, Some(json!({ "z": "9" })));
        assert_eq!(*controller.state(), data(json!({ "a": "1" })));
    }

    #[test]
    fn test_set_error_leaves_state_untouched() {
        let (mut controller, mut history) = mount("/items?a=1");
        let err = controller
            .set_query_string(&mut history, data(json!({ "x": { "y": 1 } })), None)
            .unwrap_err();
        assert!(matches!(err, SyncError::Codec(_)));
        assert_eq!(*controller.state(), data(json!({ "a": "1" })));
        assert_eq!(controller.last_query().as_str(), "?a=1");
        assert_eq!(history.len(), 1);
    }
}
