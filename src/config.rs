//! Trail Configuration Tables
//!
//! Static domain tables - locomotion speeds, POI categories, spur colors,
//! disclosure radii - injected into the classifier and controllers instead
//! of being hard-coded in the logic. The defaults describe the Swamp Rabbit
//! Trail deployment; a host application can deserialize its own table set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How the user is moving along the trail.
///
/// Serializes to the uppercase form used in the preference persistence
/// record (`"WALKING"`, `"RUNNING"`, `"BIKING"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LocomotionMode {
    Walking,
    Running,
    Biking,
}

impl Default for LocomotionMode {
    fn default() -> Self {
        LocomotionMode::Walking
    }
}

impl std::fmt::Display for LocomotionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocomotionMode::Walking => write!(f, "Walking"),
            LocomotionMode::Running => write!(f, "Running"),
            LocomotionMode::Biking => write!(f, "Biking"),
        }
    }
}

/// Assumed travel speeds per locomotion mode, in miles per hour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocomotionSpeeds {
    pub walking_mph: f64,
    pub running_mph: f64,
    pub biking_mph: f64,
}

impl Default for LocomotionSpeeds {
    fn default() -> Self {
        LocomotionSpeeds {
            walking_mph: 3.0,
            running_mph: 7.0,
            biking_mph: 10.0,
        }
    }
}

impl LocomotionSpeeds {
    /// Speed for the given mode in miles per hour.
    pub fn speed_mph(&self, mode: LocomotionMode) -> f64 {
        match mode {
            LocomotionMode::Walking => self.walking_mph,
            LocomotionMode::Running => self.running_mph,
            LocomotionMode::Biking => self.biking_mph,
        }
    }
}

/// A filterable POI category with its presentation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
    /// Stable category slug used in filters and persistence
    pub slug: String,
    /// Human-readable title
    pub title: String,
    /// Icon class for the presentation layer
    pub icon_class: String,
}

impl CategoryInfo {
    fn new(slug: &str, title: &str, icon_class: &str) -> Self {
        CategoryInfo {
            slug: slug.to_string(),
            title: title.to_string(),
            icon_class: icon_class.to_string(),
        }
    }
}

/// Complete configuration for the trail companion core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrailConfig {
    /// Travel speed table
    pub speeds: LocomotionSpeeds,

    /// Hard cap on how far away a POI may be and still be classified, in miles
    pub max_visibility_miles: f64,

    /// Starting radius of the progressive-disclosure window, in miles
    pub initial_view_distance_miles: f64,

    /// How much each "show more" step widens the window, in miles
    pub view_distance_increment_miles: f64,

    /// Categories offered as filters
    pub categories: Vec<CategoryInfo>,

    /// Spur name to line color, lowercase keys
    pub spur_colors: HashMap<String, String>,

    /// Trail endpoint shown as "heading toward" when moving up-trail
    pub trail_start: String,

    /// Trail endpoint shown as "heading toward" when moving down-trail
    pub trail_end: String,
}

impl Default for TrailConfig {
    fn default() -> Self {
        TrailConfig {
            speeds: LocomotionSpeeds::default(),
            max_visibility_miles: 15.0,
            initial_view_distance_miles: 2.0,
            view_distance_increment_miles: 2.0,
            categories: vec![
                CategoryInfo::new("food", "Food", "fas fa-utensils"),
                CategoryInfo::new("drink", "Drink", "fas fa-beer-mug-empty"),
                CategoryInfo::new("ice-cream", "Ice Cream", "fas fa-ice-cream"),
                CategoryInfo::new("landmark", "Landmark", "fas fa-map-pin"),
                CategoryInfo::new("playground", "Playground", "fas fa-child-reaching"),
            ],
            spur_colors: HashMap::from([
                ("main".to_string(), "#FFA500".to_string()),
                ("green".to_string(), "#00C853".to_string()),
                ("blue".to_string(), "#2979FF".to_string()),
                ("purple".to_string(), "#9C27B0".to_string()),
            ]),
            trail_start: "Travelers Rest".to_string(),
            trail_end: "Conestee Park".to_string(),
        }
    }
}

impl TrailConfig {
    /// Line color for the named spur, falling back to the main trail color.
    ///
    /// Lookup is case-insensitive; an empty or unknown name maps to `main`.
    pub fn spur_color(&self, spur: &str) -> &str {
        let key = spur.to_lowercase();
        self.spur_colors
            .get(&key)
            .or_else(|| self.spur_colors.get("main"))
            .map(String::as_str)
            .unwrap_or("#FFA500")
    }

    /// Presentation metadata for a category slug, if configured.
    pub fn category(&self, slug: &str) -> Option<&CategoryInfo> {
        self.categories.iter().find(|c| c.slug == slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_speeds() {
        let speeds = LocomotionSpeeds::default();
        assert_eq!(speeds.speed_mph(LocomotionMode::Walking), 3.0);
        assert_eq!(speeds.speed_mph(LocomotionMode::Running), 7.0);
        assert_eq!(speeds.speed_mph(LocomotionMode::Biking), 10.0);
    }

    #[test]
    fn test_locomotion_mode_persistence_format() {
        assert_eq!(
            serde_json::to_string(&LocomotionMode::Walking).unwrap(),
            "\"WALKING\""
        );
        let mode: LocomotionMode = serde_json::from_str("\"BIKING\"").unwrap();
        assert_eq!(mode, LocomotionMode::Biking);
    }

    #[test]
    fn test_spur_color_lookup() {
        let config = TrailConfig::default();
        assert_eq!(config.spur_color("green"), "#00C853");
        assert_eq!(config.spur_color("GREEN"), "#00C853");
        // Unknown and empty names fall back to the main trail color
        assert_eq!(config.spur_color("unknown"), "#FFA500");
        assert_eq!(config.spur_color(""), "#FFA500");
    }

    #[test]
    fn test_category_lookup() {
        let config = TrailConfig::default();
        let cat = config.category("ice-cream").unwrap();
        assert_eq!(cat.title, "Ice Cream");
        assert!(config.category("business").is_none());
    }

    #[test]
    fn test_config_deserializes_with_partial_overrides() {
        let config: TrailConfig =
            serde_json::from_str(r#"{"maxVisibilityMiles": 10.0}"#).unwrap();
        assert_eq!(config.max_visibility_miles, 10.0);
        // Unspecified fields keep their defaults
        assert_eq!(config.initial_view_distance_miles, 2.0);
        assert_eq!(config.categories.len(), 5);
    }
}
