//! # Trailside Core
//!
//! Directional point-of-interest classification core for trail companion
//! apps: given a user's live position and heading on a linear trail, sort
//! the surrounding POIs into grouped, distance-ordered "ahead" and "behind"
//! lists that track every change of location, heading, locomotion mode, and
//! category filter.
//!
//! This crate contains pure state and classification logic with **zero I/O
//! in the hot path** - no network, no DOM, no tiles. Rendering, data fetch,
//! geolocation, and map work all live in the host application and talk to
//! this core through the [`StateStore`] and the [`Classifier`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  trailside-core (platform-independent)                      │
//! │  ├── store/       (observable app state, merge updates)     │
//! │  ├── classifier/  (ahead/behind grouping and sorting)       │
//! │  ├── geo/         (haversine distance, bearings)            │
//! │  ├── disclosure/  (progressive view-distance widening)      │
//! │  ├── prefs/       (preference persistence bridge)           │
//! │  └── config/      (speed/category/spur tables)              │
//! └─────────────────────────────────────────────────────────────┘
//!          ▲                  ▲                   ▲
//!   ┌──────┴─────┐     ┌──────┴──────┐     ┌──────┴──────┐
//!   │ geolocation│     │ POI fetcher │     │ renderer    │
//!   │ (fixes in) │     │ (update())  │     │ (reads out) │
//!   └────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Control flow
//!
//! External events - a location fix, a heading change, a fetch completing,
//! a filter toggle - call [`StateStore::update`]. The store merges the
//! partial update and synchronously notifies subscribers with the new
//! snapshot. A view controller reacts by running the [`Classifier`] over
//! the latest state and handing the [`Classification`] to its renderer.
//!
//! ## Example
//!
//! ```rust
//! use trailside_core::{
//!     Classifier, DisclosureController, Position, StateStore, StateUpdate, TrailConfig,
//! };
//!
//! let config = TrailConfig::default();
//! let store = StateStore::new();
//! let classifier = Classifier::new(&config);
//! let mut disclosure = DisclosureController::new(&config);
//!
//! // A location fix and compass reading arrive from the host
//! store.update(
//!     StateUpdate::new()
//!         .user_location(Position::new(34.8480, -82.4049))
//!         .user_heading(90.0),
//! );
//!
//! // The user taps "show more" once, then the view re-classifies
//! disclosure.expand();
//! let state = store.state();
//! let radius = disclosure.effective_radius(config.max_visibility_miles);
//! let lists = classifier.classify(&state.pois, &state.classifier_params(radius));
//! assert!(lists.ahead.is_empty()); // no POIs loaded yet
//! ```

pub mod classifier;
pub mod config;
pub mod disclosure;
pub mod error;
pub mod geo;
pub mod poi;
pub mod prefs;
pub mod store;

// Re-export commonly used types
pub use classifier::{Classification, ClassifiedPoi, Classifier, ClassifierParams, Direction, DirectionList};
pub use config::{CategoryInfo, LocomotionMode, LocomotionSpeeds, TrailConfig};
pub use disclosure::DisclosureController;
pub use error::StorageError;
pub use geo::Position;
pub use poi::{Category, Poi, Tag};
pub use prefs::{FileStore, KeyValueStore, MemoryStore, PreferenceBridge, Preferences};
pub use store::{AppState, StateStore, StateUpdate, SubscriptionId};
