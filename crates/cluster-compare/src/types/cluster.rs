//! Cluster summary types with normalized identity

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::lenient::{coerced_number, lenient_count};

/// Cluster identity as emitted by a clustering run
///
/// Producers send identities as integers, floats or strings (`"5"`,
/// `"5_1712345678901"` after de-duplication). Numeric strings and integral
/// floats collapse into `Number` so comparisons are numeric, not textual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum ClusterId {
    /// Numeric identity
    Number(i64),
    /// Free-form identity
    Text(String),
}

impl ClusterId {
    /// Parse a textual identity, preferring a numeric reading
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Self::Number(n);
        }
        match trimmed.parse::<f64>() {
            Ok(f) => Self::from_float(f).unwrap_or_else(|| Self::Text(trimmed.to_string())),
            Err(_) => Self::Text(trimmed.to_string()),
        }
    }

    fn from_float(value: f64) -> Option<Self> {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Some(Self::Number(value as i64))
        } else {
            None
        }
    }

    /// Numeric value, if this identity is a number
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl From<i64> for ClusterId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ClusterId {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawClusterId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for ClusterId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawClusterId::deserialize(deserializer)? {
            RawClusterId::Int(n) => Self::Number(n),
            RawClusterId::Float(f) => {
                Self::from_float(f).unwrap_or_else(|| Self::Text(f.to_string()))
            }
            RawClusterId::Text(s) => Self::parse(&s),
        })
    }
}

/// Representative `[longitude, latitude]` point of a cluster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Centroid(pub [f64; 2]);

impl Centroid {
    /// Create a centroid from longitude and latitude
    pub fn new(lon: f64, lat: f64) -> Self {
        Self([lon, lat])
    }

    pub fn lon(&self) -> f64 {
        self.0[0]
    }

    pub fn lat(&self) -> f64 {
        self.0[1]
    }

    /// Euclidean distance in raw degree space
    ///
    /// Only good for ranking candidates against each other; it is not a
    /// geodesic distance.
    pub fn planar_distance(&self, other: &Centroid) -> f64 {
        ((self.lon() - other.lon()).powi(2) + (self.lat() - other.lat()).powi(2)).sqrt()
    }
}

/// Aggregate record for one spatial cluster, as produced by a clustering run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    /// Label used on member polygons
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterId>,
    /// Sequential identity assigned by the producer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<ClusterId>,
    /// Display number of the cluster (preferred identity)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_number: Option<ClusterId>,
    /// Number of member polygons
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: u64,
    #[serde(default, deserialize_with = "coerced_number", skip_serializing_if = "Option::is_none")]
    pub avg_suitability_score: Option<f64>,
    #[serde(default, deserialize_with = "coerced_number", skip_serializing_if = "Option::is_none")]
    pub median_suitability_score: Option<f64>,
    #[serde(default, deserialize_with = "coerced_number", skip_serializing_if = "Option::is_none")]
    pub min_suitability_score: Option<f64>,
    #[serde(default, deserialize_with = "coerced_number", skip_serializing_if = "Option::is_none")]
    pub max_suitability_score: Option<f64>,
    #[serde(default, deserialize_with = "coerced_number", skip_serializing_if = "Option::is_none")]
    pub std_suitability_score: Option<f64>,
    /// Cluster centroid; absent clusters cannot be matched geometrically
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centroid: Option<Centroid>,
    /// Any other producer fields (polygon ids, labels), carried through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ClusterSummary {
    /// Summary carrying only a `cluster_number`
    pub fn numbered(number: i64) -> Self {
        Self {
            cluster_number: Some(ClusterId::Number(number)),
            ..Default::default()
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.avg_suitability_score = Some(score);
        self
    }

    pub fn with_centroid(mut self, lon: f64, lat: f64) -> Self {
        self.centroid = Some(Centroid::new(lon, lat));
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    /// Average suitability score, with missing or NaN treated as 0
    pub fn avg_score(&self) -> f64 {
        match self.avg_suitability_score {
            Some(v) if !v.is_nan() => v,
            _ => 0.0,
        }
    }

    /// Identity by `cluster_number`, then `cluster_id`, then `cluster`
    pub fn declared_identity(&self) -> Option<&ClusterId> {
        self.cluster_number
            .as_ref()
            .or(self.cluster_id.as_ref())
            .or(self.cluster.as_ref())
    }
}

/// A cluster summary with its identity resolved once at the boundary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Resolved identity (`cluster_number ?? cluster_id ?? cluster ?? index`)
    pub identity: ClusterId,
    #[serde(flatten)]
    pub summary: ClusterSummary,
}

impl Cluster {
    /// Resolve identity for a summary found at `index` in its run
    pub fn normalize(summary: ClusterSummary, index: usize) -> Self {
        let identity = summary
            .declared_identity()
            .cloned()
            .unwrap_or(ClusterId::Number(index as i64));
        Self { identity, summary }
    }

    /// Normalize a whole run, using positions as the last-resort identity
    pub fn normalize_all(summaries: Vec<ClusterSummary>) -> Vec<Self> {
        summaries
            .into_iter()
            .enumerate()
            .map(|(index, summary)| Self::normalize(summary, index))
            .collect()
    }

    pub fn avg_score(&self) -> f64 {
        self.summary.avg_score()
    }

    pub fn centroid(&self) -> Option<&Centroid> {
        self.summary.centroid.as_ref()
    }

    pub fn cluster_number(&self) -> Option<&ClusterId> {
        self.summary.cluster_number.as_ref()
    }

    /// Copy of this cluster carrying `other`'s identity fields
    ///
    /// Scores, count, centroid and extra fields stay this cluster's own.
    pub fn with_identity_of(&self, other: &Cluster) -> Self {
        let mut adopted = self.clone();
        adopted.summary.cluster = other.summary.cluster.clone();
        adopted.summary.cluster_id = other.summary.cluster_id.clone();
        adopted.summary.cluster_number = other.summary.cluster_number.clone();
        adopted.identity = other.identity.clone();
        adopted
    }
}
