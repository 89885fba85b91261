//! Directional POI Classification
//!
//! Turns the raw POI collection plus the user's position and heading into
//! two ordered, filtered, grouped lists: destinations ahead and destinations
//! behind. This is a pure derivation - POIs are never mutated, and every
//! classification pass builds its result from scratch so derived fields can
//! never go stale.
//!
//! ```text
//! POIs ──► coordinate check ──► category filter ──► radius cap
//!                                                      │
//!                        relative angle vs. heading ◄──┘
//!                         │
//!            ┌────────────┴────────────┐
//!            ▼                         ▼
//!          AHEAD                    BEHIND
//!    (≤ 90° or ≥ 270°)          (90° .. 270°)
//!            │                         │
//!     group by primary tag      group by primary tag
//!     sort by distance          sort by distance
//! ```

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{LocomotionMode, LocomotionSpeeds, TrailConfig};
use crate::geo::{self, Position};
use crate::poi::Poi;

/// Which half of the user's field of travel a POI falls in.
///
/// The forward-facing 180 degree arc is ahead; boundary angles of exactly
/// 90 and 270 degrees count as ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ahead,
    Behind,
}

/// A POI with the per-pass derived navigation fields.
///
/// The numeric fields are present iff a user location was supplied to the
/// classifier; their absence tells the presentation layer to show the POI
/// without a distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedPoi {
    #[serde(flatten)]
    pub poi: Poi,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearing_degrees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_angle_degrees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_time_minutes: Option<u32>,
    pub direction: Direction,
}

/// One direction's worth of classified POIs.
///
/// `groups` maps a primary tag *name* to its members; `ungrouped` holds
/// POIs with no tags. Group iteration order is the sorted tag name order,
/// so identical inputs always produce identical output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectionList {
    pub groups: BTreeMap<String, Vec<ClassifiedPoi>>,
    pub ungrouped: Vec<ClassifiedPoi>,
}

impl DirectionList {
    /// Total POIs across groups and the ungrouped bucket.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum::<usize>() + self.ungrouped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.ungrouped.is_empty()
    }

    /// All members in presentation order: groups first (sorted by tag
    /// name), then the ungrouped bucket.
    pub fn iter(&self) -> impl Iterator<Item = &ClassifiedPoi> {
        self.groups
            .values()
            .flat_map(|v| v.iter())
            .chain(self.ungrouped.iter())
    }

    fn file(&mut self, poi: ClassifiedPoi) {
        match poi.poi.primary_tag() {
            Some(tag) => self
                .groups
                .entry(tag.name.clone())
                .or_default()
                .push(poi),
            None => self.ungrouped.push(poi),
        }
    }

    fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&ClassifiedPoi, &ClassifiedPoi) -> std::cmp::Ordering,
    {
        for members in self.groups.values_mut() {
            members.sort_by(&mut compare);
        }
        self.ungrouped.sort_by(&mut compare);
    }
}

/// Result of a classification pass: ahead and behind lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub ahead: DirectionList,
    pub behind: DirectionList,
}

impl Classification {
    fn list_mut(&mut self, direction: Direction) -> &mut DirectionList {
        match direction {
            Direction::Ahead => &mut self.ahead,
            Direction::Behind => &mut self.behind,
        }
    }
}

/// Inputs that vary per classification pass.
#[derive(Debug, Clone)]
pub struct ClassifierParams {
    /// User position; without it everything lands in the ahead list,
    /// name-sorted, with no distance fields
    pub user_location: Option<Position>,
    /// Travel heading in degrees, 0 = north
    pub heading: f64,
    pub mode: LocomotionMode,
    /// Maximum distance at which a POI is still considered, in miles
    pub max_radius_miles: f64,
    /// Selected category slugs; empty means no filtering
    pub category_filter: BTreeSet<String>,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        ClassifierParams {
            user_location: None,
            heading: 0.0,
            mode: LocomotionMode::default(),
            max_radius_miles: TrailConfig::default().max_visibility_miles,
            category_filter: BTreeSet::new(),
        }
    }
}

/// The directional classifier, configured with the locomotion speed table.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    speeds: LocomotionSpeeds,
}

impl Classifier {
    pub fn new(config: &TrailConfig) -> Self {
        Classifier {
            speeds: config.speeds,
        }
    }

    /// Classify `pois` into ahead/behind lists.
    ///
    /// POIs are visited in source order; ones without coordinates, outside
    /// the category filter, or beyond the radius are skipped before any
    /// grouping happens, so a group can never contain an out-of-range POI.
    pub fn classify(&self, pois: &[Poi], params: &ClassifierParams) -> Classification {
        let mut result = Classification::default();

        for poi in pois {
            let coords = match poi.coords {
                Some(c) => c,
                None => {
                    debug!("skipping POI {} ({}): no usable coordinates", poi.id, poi.name);
                    continue;
                }
            };

            if !params.category_filter.is_empty()
                && !poi
                    .categories
                    .iter()
                    .any(|c| params.category_filter.contains(&c.slug))
            {
                continue;
            }

            let classified = match params.user_location {
                Some(user) => {
                    let distance = geo::distance_miles(user, coords);
                    if distance > params.max_radius_miles {
                        debug!(
                            "skipping POI {} ({}): {:.1} mi beyond the {:.1} mi window",
                            poi.id, poi.name, distance, params.max_radius_miles
                        );
                        continue;
                    }

                    let bearing = geo::bearing_degrees(user, coords);
                    let relative = geo::relative_angle(bearing, params.heading);
                    let direction = if relative <= 90.0 || relative >= 270.0 {
                        Direction::Ahead
                    } else {
                        Direction::Behind
                    };

                    ClassifiedPoi {
                        poi: poi.clone(),
                        distance_miles: Some(distance),
                        bearing_degrees: Some(bearing),
                        relative_angle_degrees: Some(relative),
                        travel_time_minutes: Some(geo::travel_time_minutes(
                            distance,
                            self.speeds.speed_mph(params.mode),
                        )),
                        direction,
                    }
                }
                None => ClassifiedPoi {
                    poi: poi.clone(),
                    distance_miles: None,
                    bearing_degrees: None,
                    relative_angle_degrees: None,
                    travel_time_minutes: None,
                    direction: Direction::Ahead,
                },
            };

            result.list_mut(classified.direction).file(classified);
        }

        if params.user_location.is_some() {
            // Nearest first, in every group and both ungrouped buckets
            let by_distance = |a: &ClassifiedPoi, b: &ClassifiedPoi| {
                a.distance_miles
                    .partial_cmp(&b.distance_miles)
                    .unwrap_or(std::cmp::Ordering::Equal)
            };
            result.ahead.sort_by(by_distance);
            result.behind.sort_by(by_distance);
        } else {
            result.ahead.sort_by(|a, b| {
                a.poi.name.to_lowercase().cmp(&b.poi.name.to_lowercase())
            });
        }

        result
    }
}
