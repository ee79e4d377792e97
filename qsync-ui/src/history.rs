//! Router-backed history

use dioxus::prelude::*;
use qsync_core::{History, Location, NavigationError};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Pushes query string navigations through the Dioxus router.
///
/// Paths are parsed back into the app's route type, so the router stays the
/// single owner of the URL. The router keeps no per-entry payload; the state
/// handed to `push` is dropped.
///
/// A route's `Display` form is not the URL it was parsed from: the router
/// decodes the query and re-encodes only part of it, so `%26` comes back as a
/// bare `&`. The exact text of the last push is kept so the location reported
/// for that route is the one that was pushed.
pub struct RouterHistory<R> {
    last_push: Option<String>,
    navigate: fn(R),
}

fn push_route<R: Routable>(route: R) {
    navigator().push(route);
}

impl<R> RouterHistory<R>
where
    R: Routable,
    <R as FromStr>::Err: fmt::Display,
{
    pub fn new() -> Self {
        Self::with_navigate(push_route::<R>)
    }

    /// History that hands parsed routes to `navigate` instead of the navigator.
    pub fn with_navigate(navigate: fn(R)) -> Self {
        Self {
            last_push: None,
            navigate,
        }
    }

    /// Exact path of the last push, as passed to `push`.
    pub fn last_push(&self) -> Option<&str> {
        self.last_push.as_deref()
    }

    /// Parse `path` into a route and remember it as the last push.
    pub fn route_for(&mut self, path: &str) -> Result<R, NavigationError> {
        let route = R::from_str(path).map_err(|err| NavigationError::new(path, err.to_string()))?;
        self.last_push = Some(path.to_string());
        Ok(route)
    }

    /// Location of the rendered `route`.
    ///
    /// Prefers the last pushed path, then the browser URL, as long as either
    /// decodes to `route`. The router writes the `Display` form to the browser,
    /// so the browser URL is only exact for links that did not come through
    /// the router, such as the first page load. Falls back to the `Display` form.
    pub fn location_of(&self, route: &R) -> Location {
        let rendered = route.to_string();
        let decodes_to_route = |raw: &String| {
            R::from_str(raw).is_ok_and(|parsed| parsed.to_string() == rendered)
        };

        let raw = self
            .last_push
            .clone()
            .filter(decodes_to_route)
            .or_else(|| browser_path().filter(decodes_to_route));
        match raw {
            Some(raw) => Location::parse(&raw),
            None => {
                trace!("No raw URL for {rendered}, using the route text");
                route_location(route)
            }
        }
    }
}

impl<R> Default for RouterHistory<R>
where
    R: Routable,
    <R as FromStr>::Err: fmt::Display,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R> History for RouterHistory<R>
where
    R: Routable,
    <R as FromStr>::Err: fmt::Display,
{
    fn push(&mut self, path: &str, state: Option<Value>) -> Result<(), NavigationError> {
        let route = self.route_for(path)?;
        if state.is_some() {
            trace!("Router history carries no entry state, dropping payload for {path}");
        }
        (self.navigate)(route);
        Ok(())
    }
}

/// Path and query of the browser's current URL, undecoded.
#[cfg(target_arch = "wasm32")]
fn browser_path() -> Option<String> {
    let location = web_sys::window()?.location();
    let pathname = location.pathname().ok()?;
    let search = location.search().ok()?;
    Some(format!("{pathname}{search}"))
}

#[cfg(not(target_arch = "wasm32"))]
fn browser_path() -> Option<String> {
    None
}

/// Location of a rendered route (its `Display` form is the full path).
pub fn route_location(route: &impl fmt::Display) -> Location {
    Location::parse(&route.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Routable)]
    #[rustfmt::skip]
    pub(crate) enum TestRoute {
        #[route("/?:..query")]
        Home { query: String },
        #[route("/items?:..query")]
        Items { query: String },
    }

    #[component]
    fn Home(query: String) -> Element {
        rsx! { "{query}" }
    }

    #[component]
    fn Items(query: String) -> Element {
        rsx! { "{query}" }
    }

    struct Path(&'static str);

    impl fmt::Display for Path {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    pub(crate) fn test_history() -> RouterHistory<TestRoute> {
        RouterHistory::with_navigate(drop)
    }

    #[test]
    fn test_route_location_splits_query() {
        assert_eq!(
            route_location(&Path("/catalog?sort=price&q=lamp")),
            Location::new("/catalog", "?sort=price&q=lamp")
        );
    }

    #[test]
    fn test_route_location_without_query() {
        assert_eq!(route_location(&Path("/catalog")), Location::new("/catalog", ""));
    }

    #[test]
    fn test_pushed_path_survives_route_round_trip() {
        let mut history = test_history();
        let pushed = "/?q=a%26b&tags%5B%5D=x";
        history.push(pushed, None).unwrap();
        assert_eq!(history.last_push(), Some(pushed));

        let route = TestRoute::from_str(pushed).unwrap();
        assert_eq!(history.location_of(&route), Location::parse(pushed));
    }

    #[test]
    fn test_other_route_uses_route_text() {
        let mut history = test_history();
        history.push("/?a=1", None).unwrap();

        let route = TestRoute::from_str("/items?b=2").unwrap();
        assert_eq!(history.location_of(&route), Location::new("/items", "?b=2"));
    }

    #[test]
    fn test_location_without_push_uses_route_text() {
        let history = test_history();
        let route = TestRoute::from_str("/?a=1").unwrap();
        assert_eq!(history.location_of(&route), Location::new("/", "?a=1"));
    }

    #[test]
    fn test_unroutable_path_is_rejected() {
        let mut history = test_history();
        let err = history.push("/nowhere", None).unwrap_err();
        assert_eq!(err.path, "/nowhere");
        assert!(history.last_push().is_none());
    }
}
