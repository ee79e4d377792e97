//! Hooks that bind a component's state to the URL query string

use crate::history::RouterHistory;
use dioxus::prelude::*;
use qsync_core::{
    Location, LocationChange, QueryStringConfig, SetQueryStringOptions, SyncController, SyncError,
};
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::str::FromStr;
use tracing::error;

/// Per-component sync state, shared by the hook, its effect and its handle.
struct Slot<R, T> {
    controller: Option<SyncController<T>>,
    history: RouterHistory<R>,
    /// Failure from the post-render location effect, returned on the next render
    error: Option<SyncError>,
}

impl<R, T> Slot<R, T>
where
    R: Routable,
    <R as FromStr>::Err: fmt::Display,
{
    fn new(history: RouterHistory<R>) -> Self {
        Self {
            controller: None,
            history,
            error: None,
        }
    }

    /// Mount on first call and surface effect failures.
    fn attach(&mut self, location: Location, config: QueryStringConfig<T>) -> Result<(), SyncError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        if self.controller.is_none() {
            self.controller = Some(SyncController::mount(location, config)?);
        }
        Ok(())
    }

    /// Feed a rendered location to the controller. Returns whether the
    /// component has to render again.
    fn location_changed(&mut self, location: Location) -> bool {
        let Some(controller) = self.controller.as_mut() else {
            return false;
        };
        match controller.location_changed(location) {
            Ok(LocationChange::Updated) => true,
            Ok(LocationChange::Unchanged | LocationChange::Echo) => false,
            Err(err) => {
                error!("Failed to derive state from the query string: {err}");
                self.error = Some(err);
                true
            }
        }
    }

    fn set_query_string(
        &mut self,
        state: T,
        options: Option<&SetQueryStringOptions>,
    ) -> Result<(), SyncError>
    where
        T: Serialize,
    {
        let controller = self.controller.as_mut().ok_or(SyncError::NotMounted)?;
        controller.set_query_string(&mut self.history, state, options)
    }

    fn sync_state_with_query_string(&mut self, state: Option<&T>) -> Result<(), SyncError>
    where
        T: Serialize,
    {
        let controller = self.controller.as_mut().ok_or(SyncError::NotMounted)?;
        controller.sync_state_with_query_string(&mut self.history, state)
    }
}

/// Handle to the query string state of one mounted component.
///
/// Reading `state()` subscribes the reading component, so it re-renders after
/// `set_query_string` or a genuine URL change.
pub struct QueryString<R: 'static, T: 'static> {
    slot: CopyValue<Slot<R, T>>,
    revision: Signal<u64>,
    _route: PhantomData<fn() -> R>,
}

impl<R: 'static, T: 'static> Clone for QueryString<R, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: 'static, T: 'static> Copy for QueryString<R, T> {}

impl<R: 'static, T: 'static> PartialEq for QueryString<R, T> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot && self.revision == other.revision
    }
}

impl<R: 'static, T: 'static> fmt::Debug for QueryString<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.read();
        f.debug_struct("QueryString")
            .field("mounted", &slot.controller.is_some())
            .field(
                "location",
                &slot.controller.as_ref().map(|c| c.location().href()),
            )
            .finish()
    }
}

impl<R, T> QueryString<R, T>
where
    R: Routable,
    <R as FromStr>::Err: fmt::Display,
    T: 'static,
{
    /// Current state, or `None` before the first successful mount.
    pub fn try_state(&self) -> Option<Rc<T>> {
        let _ = self.revision.read();
        self.slot
            .read()
            .controller
            .as_ref()
            .map(SyncController::state)
    }

    /// Current state.
    ///
    /// Handles are only returned once the controller is mounted.
    pub fn state(&self) -> Rc<T> {
        self.try_state()
            .expect("query string handle is only handed out after mount")
    }

    pub fn location(&self) -> Option<Location> {
        self.slot
            .read()
            .controller
            .as_ref()
            .map(|c| c.location().clone())
    }

    /// Replace the state and, unless `state_only`, navigate to its query string.
    pub fn set_query_string(
        &self,
        state: T,
        options: Option<SetQueryStringOptions>,
    ) -> Result<(), SyncError>
    where
        T: Serialize,
    {
        let mut slot = self.slot;
        let result = slot.write().set_query_string(state, options.as_ref());
        if let Err(err) = &result {
            error!("Failed to write state to the query string: {err}");
        }
        self.bump();
        result
    }

    /// Push the last known query string again, carrying `state` or the held state.
    pub fn sync_state_with_query_string(&self, state: Option<&T>) -> Result<(), SyncError>
    where
        T: Serialize,
    {
        let mut slot = self.slot;
        let result = slot.write().sync_state_with_query_string(state);
        if let Err(err) = &result {
            error!("Failed to sync the query string: {err}");
        }
        result
    }

    fn bump(&self) {
        let mut revision = self.revision;
        *revision.write() += 1;
    }
}

/// Every hook used by the public entry points, in a fixed order.
fn use_query_string_handle<R, T>(
    init: impl FnOnce() -> QueryStringConfig<T>,
) -> (QueryString<R, T>, Location, QueryStringConfig<T>)
where
    R: Routable,
    <R as FromStr>::Err: fmt::Display,
    T: 'static,
{
    let route = use_route::<R>();
    let config = use_hook(init);
    let slot = use_hook(|| CopyValue::new(Slot::<R, T>::new(RouterHistory::new())));
    let revision = use_signal(|| 0_u64);
    let location = slot.read().history.location_of(&route);

    // Location changes are handled after render, then re-render with the new state
    use_effect(use_reactive((&location,), move |(location,)| {
        let mut slot = slot;
        let changed = slot.write().location_changed(location);
        if changed {
            let mut revision = revision;
            *revision.write() += 1;
        }
    }));

    let _ = revision.read();

    let handle = QueryString {
        slot,
        revision,
        _route: PhantomData,
    };
    (handle, location, config)
}

/// Bind state of type `T` to the query string of the current route `R`.
///
/// `init` runs once, on first render. Codec failures are returned so the
/// component can pass them to its error boundary with `?`.
///
/// ```ignore
/// let filters = use_query_string::<Route, _>(QueryStringConfig::raw)?;
/// let page = filters.state().get("page").cloned();
/// ```
pub fn use_query_string<R, T>(
    init: impl FnOnce() -> QueryStringConfig<T>,
) -> Result<QueryString<R, T>, SyncError>
where
    R: Routable,
    <R as FromStr>::Err: fmt::Display,
    T: 'static,
{
    let (handle, location, config) = use_query_string_handle(init);
    let mut slot = handle.slot;
    slot.write().attach(location, config)?;
    Ok(handle)
}

/// Like [`use_query_string`], and also provides the handle to descendants.
pub fn use_query_string_provider<R, T>(
    init: impl FnOnce() -> QueryStringConfig<T>,
) -> Result<QueryString<R, T>, SyncError>
where
    R: Routable,
    <R as FromStr>::Err: fmt::Display,
    T: 'static,
{
    let (handle, location, config) = use_query_string_handle(init);
    use_context_provider(move || handle);
    let mut slot = handle.slot;
    slot.write().attach(location, config)?;
    Ok(handle)
}

/// Handle provided by an ancestor's [`use_query_string_provider`].
pub fn use_query_string_context<R, T>() -> QueryString<R, T>
where
    R: 'static,
    T: 'static,
{
    use_context::<QueryString<R, T>>()
}
