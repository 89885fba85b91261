//! Application State Store
//!
//! The single canonical copy of application state, with merge-based updates
//! and synchronous, ordered, fault-isolated listener notification. External
//! events (a location fix, a heading change, a fetch completing, a filter
//! toggle) call [`StateStore::update`]; the store merges the partial into
//! the current state and fans the new snapshot out to every subscriber in
//! registration order before returning to the caller.
//!
//! The core runs on a single logical thread, so the store uses `Rc` and
//! `RefCell` rather than locks. The one hazard of synchronous fan-out is
//! re-entrancy: a listener that calls `update()` while a notification is in
//! flight. Those updates are queued and drained after the current pass, each
//! with its own full notification, so listeners never observe interleaved
//! partial states.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use log::error;
use serde::Serialize;

use crate::classifier::ClassifierParams;
use crate::config::LocomotionMode;
use crate::geo::Position;
use crate::poi::Poi;

/// Canonical application state. Owned exclusively by the [`StateStore`];
/// readers get cloned snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Last known user position, if a fix has been acquired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_location: Option<Position>,
    /// Travel heading in degrees (0-360), if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_heading: Option<f64>,
    pub locomotion_mode: LocomotionMode,
    /// Selected category filter slugs; empty = no filtering
    pub selected_categories: BTreeSet<String>,
    /// POIs in source order
    pub pois: Vec<Poi>,
    pub pois_loaded: bool,
}

impl AppState {
    /// Whether the data needed for navigation has arrived.
    pub fn is_ready(&self) -> bool {
        self.pois_loaded && !self.pois.is_empty()
    }

    /// Classifier inputs for this state, with the given visibility radius.
    ///
    /// An unknown heading defaults to 0 (due north).
    pub fn classifier_params(&self, max_radius_miles: f64) -> ClassifierParams {
        ClassifierParams {
            user_location: self.user_location,
            heading: self.user_heading.unwrap_or(0.0),
            mode: self.locomotion_mode,
            max_radius_miles,
            category_filter: self.selected_categories.clone(),
        }
    }
}

/// A shallow-merge partial update of [`AppState`].
///
/// Every setter replaces its top-level field wholesale; fields that were
/// never set are left untouched by the merge. Optional fields have explicit
/// `clear_*` setters for when a value goes away (e.g. the GPS fix is lost).
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    user_location: Option<Option<Position>>,
    user_heading: Option<Option<f64>>,
    locomotion_mode: Option<LocomotionMode>,
    selected_categories: Option<BTreeSet<String>>,
    pois: Option<Vec<Poi>>,
    pois_loaded: Option<bool>,
}

impl StateUpdate {
    pub fn new() -> Self {
        StateUpdate::default()
    }

    pub fn user_location(mut self, location: Position) -> Self {
        self.user_location = Some(Some(location));
        self
    }

    pub fn clear_user_location(mut self) -> Self {
        self.user_location = Some(None);
        self
    }

    pub fn user_heading(mut self, heading: f64) -> Self {
        self.user_heading = Some(Some(heading));
        self
    }

    pub fn clear_user_heading(mut self) -> Self {
        self.user_heading = Some(None);
        self
    }

    pub fn locomotion_mode(mut self, mode: LocomotionMode) -> Self {
        self.locomotion_mode = Some(mode);
        self
    }

    pub fn selected_categories(mut self, slugs: BTreeSet<String>) -> Self {
        self.selected_categories = Some(slugs);
        self
    }

    pub fn pois(mut self, pois: Vec<Poi>) -> Self {
        self.pois = Some(pois);
        self
    }

    pub fn pois_loaded(mut self, loaded: bool) -> Self {
        self.pois_loaded = Some(loaded);
        self
    }

    fn apply(self, state: &mut AppState) {
        if let Some(v) = self.user_location {
            state.user_location = v;
        }
        if let Some(v) = self.user_heading {
            state.user_heading = v;
        }
        if let Some(v) = self.locomotion_mode {
            state.locomotion_mode = v;
        }
        if let Some(v) = self.selected_categories {
            state.selected_categories = v;
        }
        if let Some(v) = self.pois {
            state.pois = v;
        }
        if let Some(v) = self.pois_loaded {
            state.pois_loaded = v;
        }
    }
}

/// Handle returned by [`StateStore::subscribe`], used to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Rc<RefCell<dyn FnMut(&AppState)>>;

struct Registry {
    listeners: Vec<(u64, Listener)>,
    next_id: u64,
}

/// The observable state container.
pub struct StateStore {
    state: RefCell<AppState>,
    registry: RefCell<Registry>,
    /// True while a notification pass is running on this call stack
    notifying: Cell<bool>,
    /// Updates issued by listeners during a notification pass
    queued: RefCell<VecDeque<StateUpdate>>,
}

impl Default for StateStore {
    fn default() -> Self {
        StateStore::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        StateStore::with_state(AppState::default())
    }

    pub fn with_state(state: AppState) -> Self {
        StateStore {
            state: RefCell::new(state),
            registry: RefCell::new(Registry {
                listeners: Vec::new(),
                next_id: 1,
            }),
            notifying: Cell::new(false),
            queued: RefCell::new(VecDeque::new()),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Register a listener invoked with the full state snapshot after every
    /// update, in registration order. Returns the handle for [`unsubscribe`].
    ///
    /// [`unsubscribe`]: StateStore::unsubscribe
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: FnMut(&AppState) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Rc::new(RefCell::new(listener))));
        SubscriptionId(id)
    }

    /// Deregister a listener. Returns false if the handle was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.borrow_mut();
        let before = registry.listeners.len();
        registry.listeners.retain(|(lid, _)| *lid != id.0);
        registry.listeners.len() != before
    }

    /// Merge `update` into the state, then synchronously notify every
    /// listener with the new snapshot before returning.
    ///
    /// Re-entrant calls made from inside a listener are queued and drained
    /// after the current notification pass completes.
    pub fn update(&self, update: StateUpdate) {
        if self.notifying.get() {
            self.queued.borrow_mut().push_back(update);
            return;
        }

        self.notifying.set(true);
        update.apply(&mut self.state.borrow_mut());
        self.notify_all();

        // Drain updates queued by listeners, each with its own fan-out
        loop {
            let next = self.queued.borrow_mut().pop_front();
            match next {
                Some(queued) => {
                    queued.apply(&mut self.state.borrow_mut());
                    self.notify_all();
                }
                None => break,
            }
        }
        self.notifying.set(false);
    }

    fn notify_all(&self) {
        let snapshot = self.state.borrow().clone();
        // Clone the handles so listener bodies run without the registry
        // borrow held; listeners may subscribe or unsubscribe freely.
        let targets: Vec<(u64, Listener)> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .map(|(id, l)| (*id, Rc::clone(l)))
            .collect();

        for (id, listener) in targets {
            let still_registered = self
                .registry
                .borrow()
                .listeners
                .iter()
                .any(|(lid, _)| *lid == id);
            if !still_registered {
                continue;
            }

            let outcome = catch_unwind(AssertUnwindSafe(|| {
                (&mut *listener.borrow_mut())(&snapshot);
            }));
            if outcome.is_err() {
                error!("state listener {} panicked during notification, continuing with remaining listeners", id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location_fix() -> Position {
        Position::new(34.848406, -82.404906)
    }

    #[test]
    fn test_update_merges_instead_of_replacing() {
        let store = StateStore::new();
        store.update(StateUpdate::new().user_location(location_fix()));
        store.update(StateUpdate::new().user_heading(90.0));

        let state = store.state();
        assert_eq!(state.user_location, Some(location_fix()));
        assert_eq!(state.user_heading, Some(90.0));
        // Untouched fields keep their defaults
        assert_eq!(state.locomotion_mode, LocomotionMode::Walking);
        assert!(!state.pois_loaded);
    }

    #[test]
    fn test_optional_fields_can_be_cleared() {
        let store = StateStore::new();
        store.update(StateUpdate::new().user_location(location_fix()).user_heading(45.0));
        store.update(StateUpdate::new().clear_user_location().clear_user_heading());

        let state = store.state();
        assert!(state.user_location.is_none());
        assert!(state.user_heading.is_none());
    }

    #[test]
    fn test_listeners_notified_in_registration_order() {
        let store = StateStore::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o1 = Rc::clone(&order);
        store.subscribe(move |_| o1.borrow_mut().push(1));
        let o2 = Rc::clone(&order);
        store.subscribe(move |_| o2.borrow_mut().push(2));

        store.update(StateUpdate::new().pois_loaded(true));
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_listener_receives_new_snapshot() {
        let store = StateStore::new();
        let seen = Rc::new(RefCell::new(None));

        let s = Rc::clone(&seen);
        store.subscribe(move |state: &AppState| {
            *s.borrow_mut() = state.user_heading;
        });

        store.update(StateUpdate::new().user_heading(270.0));
        assert_eq!(*seen.borrow(), Some(270.0));
    }

    #[test]
    fn test_panicking_listener_does_not_block_later_listeners() {
        // Silence the default panic hook for the intentional panic below
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let store = StateStore::new();
        let reached = Rc::new(Cell::new(false));

        store.subscribe(|_| panic!("listener fault"));
        let r = Rc::clone(&reached);
        store.subscribe(move |_| r.set(true));

        store.update(StateUpdate::new().pois_loaded(true));

        std::panic::set_hook(previous);
        assert!(reached.get());
        // The update itself completed despite the fault
        assert!(store.state().pois_loaded);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = StateStore::new();
        let count = Rc::new(Cell::new(0));

        let c = Rc::clone(&count);
        let id = store.subscribe(move |_| c.set(c.get() + 1));

        store.update(StateUpdate::new().pois_loaded(true));
        assert!(store.unsubscribe(id));
        store.update(StateUpdate::new().pois_loaded(false));

        assert_eq!(count.get(), 1);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn test_reentrant_update_is_queued_and_drained() {
        let store = Rc::new(StateStore::new());
        let headings = Rc::new(RefCell::new(Vec::new()));

        let inner = Rc::clone(&store);
        let h = Rc::clone(&headings);
        store.subscribe(move |state: &AppState| {
            h.borrow_mut().push(state.user_heading);
            // Issue a follow-up update from inside the notification exactly once
            if state.user_heading == Some(10.0) {
                inner.update(StateUpdate::new().user_heading(20.0));
            }
        });

        store.update(StateUpdate::new().user_heading(10.0));

        // Two complete notification passes, never an interleaved partial one
        assert_eq!(*headings.borrow(), vec![Some(10.0), Some(20.0)]);
        assert_eq!(store.state().user_heading, Some(20.0));
    }

    #[test]
    fn test_is_ready() {
        let mut state = AppState::default();
        assert!(!state.is_ready());
        state.pois_loaded = true;
        assert!(!state.is_ready());
        state.pois = vec![Poi {
            id: 1,
            name: "Cafe".to_string(),
            coords: None,
            description: String::new(),
            tags: Vec::new(),
            categories: Vec::new(),
        }];
        assert!(state.is_ready());
    }

    #[test]
    fn test_classifier_params_defaults_heading_to_north() {
        let state = AppState {
            user_location: Some(location_fix()),
            ..AppState::default()
        };
        let params = state.classifier_params(15.0);
        assert_eq!(params.heading, 0.0);
        assert_eq!(params.user_location, Some(location_fix()));
    }
}
