//! Geo registry and connectivity table.
//!
//! A [`Dataset`] is the read-only configuration the rest of the library is
//! built from: the [`GeoRegistry`] of named points of interest and the
//! hand-authored connectivity table declaring which locations are directly
//! reachable from each other. Both are fixed at startup; the built-in
//! Dehradun dataset is embedded in the binary and alternative datasets can be
//! loaded from JSON files with the same shape.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geo::GeoPoint;

const BUILTIN_DATASET: &str = include_str!("../data/dehradun.json");

/// Minimum similarity score for a name to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.5;

/// A named point of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub position: GeoPoint,
}

/// Static mapping of location names to coordinates.
#[derive(Debug, Clone, Default)]
pub struct GeoRegistry {
    locations: BTreeMap<String, Location>,
}

impl GeoRegistry {
    /// Build a registry, rejecting duplicate names and invalid coordinates.
    pub fn new(locations: impl IntoIterator<Item = Location>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for location in locations {
            if !location.position.is_valid() {
                return Err(Error::InvalidCoordinates {
                    name: location.name,
                    latitude: location.position.latitude,
                    longitude: location.position.longitude,
                });
            }
            if map.contains_key(&location.name) {
                return Err(Error::DuplicateLocation {
                    name: location.name,
                });
            }
            map.insert(location.name.clone(), location);
        }
        Ok(Self { locations: map })
    }

    /// Lookup a location by its case-sensitive name.
    pub fn get(&self, name: &str) -> Option<&Location> {
        self.locations.get(name)
    }

    /// Coordinates for `name`, if registered.
    pub fn position(&self, name: &str) -> Option<GeoPoint> {
        self.get(name).map(|location| location.position)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }

    /// Registered names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.locations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Resolve a name, producing a client error with suggestions and the full
    /// list of valid names when it is not registered.
    pub fn resolve(&self, name: &str) -> Result<&Location> {
        self.get(name).ok_or_else(|| Error::UnknownLocation {
            name: name.to_string(),
            suggestions: self.fuzzy_matches(name, 3),
            valid: self.names().map(str::to_string).collect(),
        })
    }

    /// Registered names that look like `query`, best match first.
    pub fn fuzzy_matches(&self, query: &str, limit: usize) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f64, &str)> = self
            .names()
            .filter_map(|name| {
                let candidate = name.to_lowercase();
                let mut score = strsim::normalized_levenshtein(&needle, &candidate);
                if candidate.contains(&needle) || needle.contains(&candidate) {
                    score = score.max(0.8);
                }
                (score >= SUGGESTION_THRESHOLD).then_some((score, name))
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.to_string())
            .collect()
    }
}

/// Registry plus connectivity table.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    registry: GeoRegistry,
    connections: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Debug, Deserialize)]
struct RawDataset {
    locations: Vec<RawLocation>,
    #[serde(default)]
    connections: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    name: String,
    latitude: f64,
    longitude: f64,
}

impl Dataset {
    /// Combine a registry and a connectivity table.
    ///
    /// Every name on either side of a connection must be registered.
    pub fn new(
        registry: GeoRegistry,
        connections: BTreeMap<String, BTreeSet<String>>,
    ) -> Result<Self> {
        for (from, targets) in &connections {
            for to in targets {
                let missing = if !registry.contains(from) {
                    from
                } else if !registry.contains(to) {
                    to
                } else {
                    continue;
                };
                return Err(Error::UnknownConnectivityLocation {
                    from: from.clone(),
                    to: to.clone(),
                    missing: missing.clone(),
                });
            }
        }

        Ok(Self {
            registry,
            connections,
        })
    }

    /// The Dehradun dataset shipped with the library.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_DATASET)
    }

    /// Parse a dataset from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawDataset = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Parse a dataset from a reader yielding JSON.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: RawDataset = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    /// Load a dataset from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = fs::File::open(path).map_err(|err| Error::DatasetLoad {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let dataset = Self::from_reader(file)?;
        debug!(
            path = %path.display(),
            locations = dataset.registry.len(),
            "loaded dataset from file"
        );
        Ok(dataset)
    }

    fn from_raw(raw: RawDataset) -> Result<Self> {
        let registry = GeoRegistry::new(raw.locations.into_iter().map(|loc| Location {
            name: loc.name,
            position: GeoPoint::new(loc.latitude, loc.longitude),
        }))?;

        let connections = raw
            .connections
            .into_iter()
            .map(|(from, targets)| (from, targets.into_iter().collect()))
            .collect();

        Self::new(registry, connections)
    }

    pub fn registry(&self) -> &GeoRegistry {
        &self.registry
    }

    /// Declared connectivity, keyed by source name.
    pub fn connections(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.connections
    }

    /// Names declared reachable from `name`.
    pub fn neighbours(&self, name: &str) -> impl Iterator<Item = &str> {
        self.connections
            .get(name)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Connections declared in only one direction, as `(from, to)` pairs.
    ///
    /// The engine treats these as directed edges; they are usually an
    /// authoring mistake in the connectivity table.
    pub fn one_way_connections(&self) -> Vec<(String, String)> {
        let mut one_way = Vec::new();
        for (from, targets) in &self.connections {
            for to in targets {
                let reverse = self
                    .connections
                    .get(to)
                    .is_some_and(|back| back.contains(from));
                if !reverse {
                    one_way.push((from.clone(), to.clone()));
                }
            }
        }
        one_way
    }
}

/// Load the dataset at `path`, or the built-in dataset when `path` is `None`.
pub fn load_dataset(path: Option<&Path>) -> Result<Dataset> {
    let dataset = match path {
        Some(path) => Dataset::from_path(path)?,
        None => Dataset::builtin()?,
    };
    info!(
        locations = dataset.registry().len(),
        connections = dataset.connections().values().map(BTreeSet::len).sum::<usize>(),
        "dataset loaded"
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(name: &str, lat: f64, lon: f64) -> Location {
        Location {
            name: name.to_string(),
            position: GeoPoint::new(lat, lon),
        }
    }

    #[test]
    fn builtin_dataset_is_consistent() {
        let dataset = Dataset::builtin().expect("builtin dataset parses");
        assert_eq!(dataset.registry().len(), 16);
        assert!(dataset.registry().contains("Clock Tower"));
        assert!(
            dataset.one_way_connections().is_empty(),
            "builtin connectivity should be symmetric: {:?}",
            dataset.one_way_connections()
        );
    }

    #[test]
    fn registry_rejects_duplicates() {
        let err = GeoRegistry::new([location("A", 0.0, 0.0), location("A", 1.0, 1.0)])
            .expect_err("duplicate");
        assert!(matches!(err, Error::DuplicateLocation { name } if name == "A"));
    }

    #[test]
    fn registry_rejects_invalid_coordinates() {
        let err = GeoRegistry::new([location("A", 120.0, 0.0)]).expect_err("invalid");
        assert!(matches!(err, Error::InvalidCoordinates { .. }));
    }

    #[test]
    fn connection_to_unregistered_location_is_a_configuration_error() {
        let registry = GeoRegistry::new([location("A", 0.0, 0.0)]).unwrap();
        let connections = BTreeMap::from([("A".to_string(), BTreeSet::from(["B".to_string()]))]);
        let err = Dataset::new(registry, connections).expect_err("missing B");
        match err {
            Error::UnknownConnectivityLocation { missing, .. } => assert_eq!(missing, "B"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn one_way_connections_are_reported() {
        let dataset = Dataset::from_json_str(
            r#"{
                "locations": [
                    {"name": "A", "latitude": 0.0, "longitude": 0.0},
                    {"name": "B", "latitude": 0.0, "longitude": 1.0}
                ],
                "connections": {"A": ["B"]}
            }"#,
        )
        .unwrap();
        assert_eq!(
            dataset.one_way_connections(),
            vec![("A".to_string(), "B".to_string())]
        );
    }

    #[test]
    fn resolve_unknown_name_lists_suggestions_and_valid_names() {
        let dataset = Dataset::builtin().unwrap();
        let err = dataset.registry().resolve("Clok Tower").expect_err("unknown");
        match err {
            Error::UnknownLocation {
                suggestions, valid, ..
            } => {
                assert_eq!(suggestions.first().map(String::as_str), Some("Clock Tower"));
                assert_eq!(valid.len(), 16);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fuzzy_matches_substrings() {
        let dataset = Dataset::builtin().unwrap();
        let matches = dataset.registry().fuzzy_matches("isbt", 3);
        assert!(matches.contains(&"ISBT Dehradun".to_string()));
    }

    #[test]
    fn load_dataset_without_path_uses_builtin() {
        let dataset = load_dataset(None).unwrap();
        assert!(dataset.registry().contains("Sahastradhara"));
    }
}
