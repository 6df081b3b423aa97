//! Feature perturbation types

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;

/// One feature perturbation in the wire form the analysis service expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureChangeEntry {
    pub feature: String,
    /// Signed fractional change, e.g. `0.2` for +20%
    #[serde(rename = "percentChange", default)]
    pub percent_change: f64,
}

/// Proposed per-feature changes, in the order they were configured
///
/// Deserializes from either a `{feature: change}` object or a
/// `[{feature, percentChange}]` list. Setting an existing feature replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureChanges {
    entries: Vec<(String, f64)>,
}

impl FeatureChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the change for a feature
    pub fn set(&mut self, feature: impl Into<String>, change: f64) {
        let feature = feature.into();
        match self.entries.iter_mut().find(|(name, _)| *name == feature) {
            Some(entry) => entry.1 = change,
            None => self.entries.push((feature, change)),
        }
    }

    /// Builder form of [`set`](Self::set)
    pub fn with(mut self, feature: impl Into<String>, change: f64) -> Self {
        self.set(feature, change);
        self
    }

    /// Change for a feature; unknown features and NaN read as 0
    pub fn get(&self, feature: &str) -> f64 {
        self.entries
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, change)| *change)
            .filter(|change| !change.is_nan())
            .unwrap_or(0.0)
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == feature)
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, change)| (name.as_str(), *change))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest absolute change, ignoring NaN
    pub fn max_abs_change(&self) -> Option<f64> {
        self.entries
            .iter()
            .map(|(_, change)| change.abs())
            .filter(|change| !change.is_nan())
            .fold(None, |max, change| Some(max.map_or(change, |m: f64| m.max(change))))
    }

    /// Features to report on: the explicit selection when given, else every
    /// configured feature
    pub fn features_or(&self, selected: &[String]) -> Vec<String> {
        if selected.is_empty() {
            self.features().map(str::to_string).collect()
        } else {
            selected.to_vec()
        }
    }

    /// List form sent to the analysis service
    pub fn to_entries(&self) -> Vec<FeatureChangeEntry> {
        self.entries
            .iter()
            .map(|(feature, change)| FeatureChangeEntry {
                feature: feature.clone(),
                percent_change: *change,
            })
            .collect()
    }
}

impl FromIterator<(String, f64)> for FeatureChanges {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut changes = Self::new();
        for (feature, change) in iter {
            changes.set(feature, change);
        }
        changes
    }
}

impl Serialize for FeatureChanges {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (feature, change) in &self.entries {
            map.serialize_entry(feature, change)?;
        }
        map.end()
    }
}

struct FeatureChangesVisitor;

impl<'de> Visitor<'de> for FeatureChangesVisitor {
    type Value = FeatureChanges;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of feature to change or a list of {feature, percentChange}")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut changes = FeatureChanges::new();
        while let Some((feature, change)) = access.next_entry::<String, Option<f64>>()? {
            changes.set(feature, change.unwrap_or(0.0));
        }
        Ok(changes)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut changes = FeatureChanges::new();
        while let Some(entry) = access.next_element::<FeatureChangeEntry>()? {
            changes.set(entry.feature, entry.percent_change);
        }
        Ok(changes)
    }
}

impl<'de> Deserialize<'de> for FeatureChanges {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FeatureChangesVisitor)
    }
}

/// Map keyed by feature name that keeps the order entries arrived in
///
/// Analysis services list features in their configured order; heatmap axes
/// and sensitivity ties follow that order rather than sorting by name.
/// Inserting an existing feature replaces its value in place.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for FeatureMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> FeatureMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: impl Into<String>, value: V) {
        let feature = feature.into();
        match self.entries.iter_mut().find(|(name, _)| *name == feature) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((feature, value)),
        }
    }

    pub fn get(&self, feature: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, feature: &str) -> bool {
        self.get(feature).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().map(|(name, _)| name)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.entries.iter().map(|(name, value)| (name, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Index<&str> for FeatureMap<V> {
    type Output = V;

    fn index(&self, feature: &str) -> &V {
        match self.get(feature) {
            Some(value) => value,
            None => panic!("no entry for feature {feature}"),
        }
    }
}

impl<V> FromIterator<(String, V)> for FeatureMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (feature, value) in iter {
            map.insert(feature, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for FeatureMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (feature, value) in &self.entries {
            map.serialize_entry(feature, value)?;
        }
        map.end()
    }
}

struct FeatureMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for FeatureMapVisitor<V> {
    type Value = FeatureMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map keyed by feature name")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = FeatureMap::new();
        while let Some((feature, value)) = access.next_entry::<String, V>()? {
            map.insert(feature, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for FeatureMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FeatureMapVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_and_list_forms() {
        let from_map: FeatureChanges =
            serde_json::from_str(r#"{"water_access": 0.2, "road_density": -0.1}"#).unwrap();
        let from_list: FeatureChanges = serde_json::from_str(
            r#"[{"feature": "water_access", "percentChange": 0.2},
                {"feature": "road_density", "percentChange": -0.1}]"#,
        )
        .unwrap();

        assert_eq!(from_map, from_list);
        assert_eq!(
            from_map.features().collect::<Vec<_>>(),
            vec!["water_access", "road_density"]
        );
    }

    #[test]
    fn test_set_replaces_in_place() {
        let changes = FeatureChanges::new()
            .with("a", 0.1)
            .with("b", 0.2)
            .with("a", -0.3);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes.get("a"), -0.3);
        assert_eq!(changes.get("missing"), 0.0);
        assert_eq!(changes.features().next(), Some("a"));
    }

    #[test]
    fn test_max_abs_change() {
        let changes = FeatureChanges::new().with("a", 0.1).with("b", -0.4).with("c", f64::NAN);
        assert_eq!(changes.max_abs_change(), Some(0.4));
        assert_eq!(FeatureChanges::new().max_abs_change(), None);
    }

    #[test]
    fn test_features_or_prefers_selection() {
        let changes = FeatureChanges::new().with("a", 0.1).with("b", 0.2);
        assert_eq!(changes.features_or(&[]), vec!["a", "b"]);
        assert_eq!(changes.features_or(&["c".to_string()]), vec!["c"]);
    }

    #[test]
    fn test_feature_map_keeps_arrival_order() {
        let map: FeatureMap<f64> =
            serde_json::from_str(r#"{"zeta": 1.0, "alpha": 2.0, "mid": 3.0, "zeta": 4.0}"#)
                .unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(map["zeta"], 4.0);
        assert_eq!(map.get("missing"), None);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"zeta":4.0,"alpha":2.0,"mid":3.0}"#);
    }

    #[test]
    fn test_entries_wire_form() {
        let changes = FeatureChanges::new().with("a", 0.25);
        let value = serde_json::to_value(changes.to_entries()).unwrap();
        assert_eq!(value[0]["percentChange"], 0.25);
    }
}
