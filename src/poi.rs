//! POI Data Model
//!
//! Points of interest along the trail, plus decoding of the raw
//! GeoDirectory "place" payload the data fetcher hands us. POIs are created
//! once per load and never mutated afterwards; the classifier only derives
//! new values from them.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::geo::Position;

/// A POI tag. The first tag on a POI is its "primary tag" and acts as the
/// grouping key in the directional lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub slug: String,
    pub name: String,
}

/// A POI category, used for filter matching by slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
}

/// A point of interest along the trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    /// Unique, stable identifier from the source system
    pub id: u64,
    pub name: String,
    /// Missing when the source record had no usable coordinates;
    /// such POIs are skipped by the classifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coords: Option<Position>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Poi {
    /// The first tag, used as the grouping key.
    pub fn primary_tag(&self) -> Option<&Tag> {
        self.tags.first()
    }

    /// Whether this POI carries the given category slug.
    pub fn has_category(&self, slug: &str) -> bool {
        self.categories.iter().any(|c| c.slug == slug)
    }
}

/// Find a POI by its identifier.
pub fn find_by_id(pois: &[Poi], id: u64) -> Option<&Poi> {
    pois.iter().find(|p| p.id == id)
}

/// All POIs carrying the given category slug, in source order.
pub fn filter_by_category<'a>(pois: &'a [Poi], slug: &str) -> Vec<&'a Poi> {
    pois.iter().filter(|p| p.has_category(slug)).collect()
}

/// All POIs carrying the given tag slug, in source order.
pub fn filter_by_tag<'a>(pois: &'a [Poi], slug: &str) -> Vec<&'a Poi> {
    pois.iter()
        .filter(|p| p.tags.iter().any(|t| t.slug == slug))
        .collect()
}

// =============================================================================
// Raw GeoDirectory payload
// =============================================================================

/// A raw "place" record as returned by the GeoDirectory REST API.
///
/// Coordinates arrive as strings and category slugs carry a numeric
/// `NN-` prefix; [`RawPlace::into_poi`] normalizes both.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlace {
    pub id: u64,
    pub title: RenderedText,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
    #[serde(default)]
    pub content: RawContent,
    #[serde(default)]
    pub post_tags: Vec<Tag>,
    #[serde(default)]
    pub post_category: Vec<RawCategory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderedText {
    #[serde(default)]
    pub rendered: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContent {
    #[serde(default)]
    pub raw: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCategory {
    pub name: String,
    pub slug: String,
}

impl RawPlace {
    /// Convert a raw place into the internal POI model.
    ///
    /// Unparseable coordinates yield `coords: None` with a logged
    /// data-quality note; the record itself is kept so the presentation
    /// layer can still list it by name.
    pub fn into_poi(self) -> Poi {
        let coords = match (self.latitude.parse::<f64>(), self.longitude.parse::<f64>()) {
            (Ok(lat), Ok(lng)) => Some(Position::new(lat, lng)),
            _ => {
                warn!(
                    "POI {} ({:?}) has unusable coordinates: lat={:?} lng={:?}",
                    self.id, self.title.rendered, self.latitude, self.longitude
                );
                None
            }
        };

        let categories = self
            .post_category
            .into_iter()
            .map(|c| Category {
                slug: strip_slug_prefix(&c.slug).to_string(),
                name: c.name,
            })
            // The catch-all "business" category carries no filter meaning
            .filter(|c| c.slug != "business")
            .collect();

        Poi {
            id: self.id,
            name: self.title.rendered,
            coords,
            description: self.content.raw,
            tags: self.post_tags,
            categories,
        }
    }
}

/// Decode a full GeoDirectory response body into POIs, preserving source order.
pub fn decode_places(json: &str) -> Result<Vec<Poi>, serde_json::Error> {
    let places: Vec<RawPlace> = serde_json::from_str(json)?;
    Ok(places.into_iter().map(RawPlace::into_poi).collect())
}

/// Strip the numeric `NN-` prefix GeoDirectory puts on category slugs.
fn strip_slug_prefix(slug: &str) -> &str {
    match slug.find('-') {
        Some(pos) if pos > 0 && slug[..pos].bytes().all(|b| b.is_ascii_digit()) => {
            &slug[pos + 1..]
        }
        _ => slug,
    }
}
