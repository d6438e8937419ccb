//! Catalogue of places anchored to registry locations.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};

use crate::dataset::GeoRegistry;
use crate::error::{Error, Result};
use crate::geo::GeoPoint;

const BUILTIN_PLACES: &str = include_str!("../data/places.csv");

pub const MAX_RATING: f64 = 5.0;

/// A place near one of the registered locations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub name: String,
    pub category: String,
    pub rating: f64,
    pub position: GeoPoint,
    /// Registry location this place is listed under.
    pub anchor: String,
}

#[derive(Debug, Deserialize)]
struct PlaceRecord {
    anchor: String,
    name: String,
    category: String,
    rating: f64,
    latitude: f64,
    longitude: f64,
}

impl PlaceRecord {
    fn into_place(self) -> Result<Place> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::PlaceDataValidation {
                message: format!("place anchored to {} has no name", self.anchor),
            });
        }
        if self.category.trim().is_empty() {
            return Err(Error::PlaceDataValidation {
                message: format!("place {name} has no category"),
            });
        }
        if !self.rating.is_finite() || !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(Error::PlaceDataValidation {
                message: format!("place {name} has rating {} outside 0-5", self.rating),
            });
        }
        let position = GeoPoint::new(self.latitude, self.longitude);
        if !position.is_valid() {
            return Err(Error::InvalidCoordinates {
                name,
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }

        Ok(Place {
            name,
            category: self.category.trim().to_lowercase(),
            rating: self.rating,
            position,
            anchor: self.anchor.trim().to_string(),
        })
    }
}

/// Places grouped by their anchor location.
#[derive(Debug, Clone, Default)]
pub struct PlaceCatalog {
    by_anchor: BTreeMap<String, Vec<Place>>,
}

impl PlaceCatalog {
    /// The catalogue shipped with the library, checked against `registry`.
    pub fn builtin(registry: &GeoRegistry) -> Result<Self> {
        Self::from_reader(BUILTIN_PLACES.as_bytes(), registry)
    }

    pub fn from_path(path: &Path, registry: &GeoRegistry) -> Result<Self> {
        let file = fs::File::open(path)?;
        Self::from_reader(file, registry)
    }

    /// Parse CSV with columns `anchor,name,category,rating,latitude,longitude`.
    ///
    /// Every anchor must be a registered location.
    pub fn from_reader<R: Read>(reader: R, registry: &GeoRegistry) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::Fields).from_reader(reader);
        let mut by_anchor: BTreeMap<String, Vec<Place>> = BTreeMap::new();

        for record in csv_reader.deserialize::<PlaceRecord>() {
            let place = record?.into_place()?;
            if !registry.contains(&place.anchor) {
                return Err(Error::UnknownPlaceAnchor {
                    place: place.name,
                    anchor: place.anchor,
                });
            }
            by_anchor.entry(place.anchor.clone()).or_default().push(place);
        }

        Ok(Self { by_anchor })
    }

    /// Places listed under `location`, best rated first.
    ///
    /// `category` matches case-insensitively. A registered location without
    /// places yields an empty list; an unregistered one is an error.
    pub fn nearby(
        &self,
        registry: &GeoRegistry,
        location: &str,
        category: Option<&str>,
    ) -> Result<Vec<Place>> {
        registry.resolve(location)?;
        let category = category
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty());

        let mut places: Vec<Place> = self
            .by_anchor
            .get(location)
            .into_iter()
            .flatten()
            .filter(|place| category.as_deref().map_or(true, |c| place.category == c))
            .cloned()
            .collect();

        places.sort_by(|a, b| {
            b.rating
                .total_cmp(&a.rating)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(places)
    }

    /// Distinct categories in lexical order.
    pub fn categories(&self) -> Vec<String> {
        self.by_anchor
            .values()
            .flatten()
            .map(|place| place.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_anchor.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_anchor.is_empty()
    }
}

/// Load the catalogue at `path`.
///
/// Without a path the built-in catalogue is used for the built-in dataset,
/// and a custom dataset gets an empty catalogue since the built-in anchors
/// would not resolve against it.
pub fn load_places(
    path: Option<&Path>,
    custom_dataset: bool,
    registry: &GeoRegistry,
) -> Result<PlaceCatalog> {
    let catalog = match path {
        Some(path) => PlaceCatalog::from_path(path, registry)?,
        None if custom_dataset => PlaceCatalog::default(),
        None => PlaceCatalog::builtin(registry)?,
    };
    tracing::info!(places = catalog.len(), "places catalogue loaded");
    Ok(catalog)
}
