//! Progressive Disclosure of the Visibility Radius
//!
//! Users start with a short view distance and widen it step by step with a
//! "show more" action. The controller's view distance is the primary radius
//! knob handed to the classifier; the classifier's own hard cap stays the
//! absolute ceiling, so the effective radius is the smaller of the two.

use serde::{Deserialize, Serialize};

use crate::config::TrailConfig;

/// Tracks the user-controlled view distance window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosureController {
    /// Current view distance in miles
    view_distance: f64,
    /// How much each expansion widens the window, in miles
    increment: f64,
    /// Upper bound on the view distance, in miles
    max_distance: f64,
}

impl Default for DisclosureController {
    fn default() -> Self {
        DisclosureController::new(&TrailConfig::default())
    }
}

impl DisclosureController {
    pub fn new(config: &TrailConfig) -> Self {
        DisclosureController {
            view_distance: config.initial_view_distance_miles,
            increment: config.view_distance_increment_miles,
            max_distance: config.max_visibility_miles,
        }
    }

    /// Current view distance in miles.
    pub fn view_distance(&self) -> f64 {
        self.view_distance
    }

    /// Whether the window is already as wide as it can get.
    pub fn at_max(&self) -> bool {
        self.view_distance >= self.max_distance
    }

    /// Widen the window by one increment, capped at the maximum.
    ///
    /// Has no effect once at the cap. Returns the new view distance.
    pub fn expand(&mut self) -> f64 {
        self.view_distance = (self.view_distance + self.increment).min(self.max_distance);
        self.view_distance
    }

    /// Shrink the window back to the configured starting distance.
    pub fn reset(&mut self, config: &TrailConfig) {
        self.view_distance = config.initial_view_distance_miles;
    }

    /// The radius to pass to the classifier: the view distance, never
    /// exceeding the classifier's own hard cap.
    pub fn effective_radius(&self, hard_cap_miles: f64) -> f64 {
        self.view_distance.min(hard_cap_miles)
    }
}
