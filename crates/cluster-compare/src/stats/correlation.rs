//! Correlation views over the analysis result
//!
//! Correlation values come from the analysis provider; nothing here computes
//! a correlation, it only lays the matrix out for display.

use serde::{Deserialize, Serialize};

use crate::types::{FeatureAnalysis, FeatureCorrelationRow, HeatmapCell};

const NO_CORRELATION: &str = "No Correlation";
const NO_STRENGTH: &str = "None";

/// Full feature x feature heatmap, row-major over the matrix's features
///
/// Diagonal cells are fixed at 100 / Positive / Strong. Missing or
/// non-numeric entries become 0 / No Correlation / None. Empty without an
/// analysis result.
pub fn correlation_heatmap(analysis: Option<&FeatureAnalysis>) -> Vec<HeatmapCell> {
    let Some(matrix) = analysis.and_then(|a| a.correlation_analysis.as_ref()) else {
        return Vec::new();
    };

    let features: Vec<&String> = matrix.keys().collect();
    let mut cells = Vec::with_capacity(features.len() * features.len());

    for x in &features {
        for y in &features {
            if x == y {
                cells.push(HeatmapCell {
                    x: x.to_string(),
                    y: y.to_string(),
                    value: 100.0,
                    correlation: 100.0,
                    direction: "Positive".to_string(),
                    strength: "Strong".to_string(),
                });
                continue;
            }

            let entry = matrix
                .get(*x)
                .and_then(|row| row.get(*y))
                .filter(|entry| entry.correlation.is_some_and(|c| !c.is_nan()));

            let cell = match entry {
                Some(entry) => {
                    let correlation = entry.correlation.unwrap_or(0.0);
                    HeatmapCell {
                        x: x.to_string(),
                        y: y.to_string(),
                        value: correlation,
                        correlation,
                        direction: entry
                            .direction
                            .clone()
                            .unwrap_or_else(|| NO_CORRELATION.to_string()),
                        strength: entry
                            .strength
                            .clone()
                            .unwrap_or_else(|| NO_STRENGTH.to_string()),
                    }
                }
                None => HeatmapCell {
                    x: x.to_string(),
                    y: y.to_string(),
                    value: 0.0,
                    correlation: 0.0,
                    direction: NO_CORRELATION.to_string(),
                    strength: NO_STRENGTH.to_string(),
                },
            };
            cells.push(cell);
        }
    }

    cells
}

/// Correlations of every feature against `feature`, strongest first
pub fn feature_correlations(
    analysis: Option<&FeatureAnalysis>,
    feature: &str,
) -> Vec<FeatureCorrelationRow> {
    let Some(row) = analysis
        .and_then(|a| a.correlation_analysis.as_ref())
        .and_then(|matrix| matrix.get(feature))
    else {
        return Vec::new();
    };

    let mut rows: Vec<FeatureCorrelationRow> = row
        .iter()
        .map(|(other, entry)| FeatureCorrelationRow {
            feature: other.clone(),
            correlation: entry.correlation.filter(|c| !c.is_nan()).unwrap_or(0.0),
            direction: entry
                .direction
                .clone()
                .unwrap_or_else(|| NO_CORRELATION.to_string()),
            strength: entry.strength.clone().unwrap_or_else(|| NO_STRENGTH.to_string()),
            change: entry.change.filter(|c| !c.is_nan()).unwrap_or(0.0),
        })
        .collect();

    rows.sort_by(|a, b| b.correlation.total_cmp(&a.correlation));
    rows
}

/// Display shade of a heatmap cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationShade {
    None,
    StrongPositive,
    ModeratePositive,
    WeakPositive,
    StrongNegative,
    ModerateNegative,
    WeakNegative,
}

impl CorrelationShade {
    /// Shade for a correlation percentage; anything not "Positive" shades negative
    pub fn for_cell(value: f64, direction: &str) -> Self {
        if value == 0.0 {
            return Self::None;
        }
        let positive = direction == "Positive";
        match (value >= 70.0, value >= 40.0, positive) {
            (true, _, true) => Self::StrongPositive,
            (false, true, true) => Self::ModeratePositive,
            (false, false, true) => Self::WeakPositive,
            (true, _, false) => Self::StrongNegative,
            (false, true, false) => Self::ModerateNegative,
            (false, false, false) => Self::WeakNegative,
        }
    }

    /// Hex color used by the dashboard
    pub fn color(&self) -> &'static str {
        match self {
            Self::None => "#f3f4f6",
            Self::StrongPositive => "#059669",
            Self::ModeratePositive => "#10b981",
            Self::WeakPositive => "#34d399",
            Self::StrongNegative => "#dc2626",
            Self::ModerateNegative => "#ef4444",
            Self::WeakNegative => "#f87171",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CorrelationEntry, FeatureMap};

    fn analysis() -> FeatureAnalysis {
        let mut a_row = FeatureMap::new();
        a_row.insert(
            "b".to_string(),
            CorrelationEntry {
                correlation: Some(30.0),
                direction: Some("Positive".to_string()),
                strength: Some("Weak".to_string()),
                change: Some(0.1),
            },
        );
        a_row.insert(
            "c".to_string(),
            CorrelationEntry {
                correlation: Some(75.0),
                direction: Some("Negative".to_string()),
                strength: Some("Strong".to_string()),
                change: None,
            },
        );
        let mut b_row = FeatureMap::new();
        b_row.insert("a".to_string(), CorrelationEntry::default());

        let mut matrix = FeatureMap::new();
        matrix.insert("a".to_string(), a_row);
        matrix.insert("b".to_string(), b_row);
        FeatureAnalysis {
            correlation_analysis: Some(matrix),
            ..Default::default()
        }
    }

    #[test]
    fn test_heatmap_layout() {
        let cells = correlation_heatmap(Some(&analysis()));
        // features come from the matrix keys: a, b
        assert_eq!(cells.len(), 4);

        assert_eq!((cells[0].x.as_str(), cells[0].y.as_str()), ("a", "a"));
        assert_eq!(cells[0].value, 100.0);
        assert_eq!(cells[0].strength, "Strong");

        assert_eq!(cells[1].correlation, 30.0);
        assert_eq!(cells[1].direction, "Positive");

        // b -> a has no numeric correlation
        assert_eq!(cells[2].correlation, 0.0);
        assert_eq!(cells[2].direction, "No Correlation");
        assert_eq!(cells[2].strength, "None");

        assert_eq!(cells[3].value, 100.0);
    }

    #[test]
    fn test_heatmap_axes_follow_service_order() {
        let analysis: FeatureAnalysis = serde_json::from_str(
            r#"{"correlation_analysis": {
                "water_access": {"road_density": {"correlation": 20.0}},
                "road_density": {"water_access": {"correlation": 20.0}},
                "literacy": {}
            }}"#,
        )
        .unwrap();

        let cells = correlation_heatmap(Some(&analysis));
        let axis: Vec<&str> = cells.iter().take(3).map(|cell| cell.y.as_str()).collect();
        assert_eq!(axis, vec!["water_access", "road_density", "literacy"]);
        assert_eq!(cells[1].correlation, 20.0);
    }

    #[test]
    fn test_heatmap_empty_without_analysis() {
        assert!(correlation_heatmap(None).is_empty());
        assert!(correlation_heatmap(Some(&FeatureAnalysis::default())).is_empty());
    }

    #[test]
    fn test_feature_correlations_sorted() {
        let rows = feature_correlations(Some(&analysis()), "a");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].feature, "c");
        assert_eq!(rows[0].change, 0.0);
        assert_eq!(rows[1].feature, "b");
        assert!(feature_correlations(Some(&analysis()), "zzz").is_empty());
        assert!(feature_correlations(None, "a").is_empty());
    }

    #[test]
    fn test_shades() {
        assert_eq!(CorrelationShade::for_cell(0.0, "Positive"), CorrelationShade::None);
        assert_eq!(CorrelationShade::for_cell(70.0, "Positive").color(), "#059669");
        assert_eq!(
            CorrelationShade::for_cell(45.0, "Negative"),
            CorrelationShade::ModerateNegative
        );
        assert_eq!(
            CorrelationShade::for_cell(10.0, "No Correlation"),
            CorrelationShade::WeakNegative
        );
    }
}
