//! Feature sensitivity ranking and impact breakdown

use crate::types::{
    ChangeDirection, FeatureAnalysis, FeatureChangeSummaryRow, FeatureChanges, ImpactRow,
    SensitivityRow,
};

fn finite_or_zero(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Magnitude label for a configured change
pub fn magnitude_label(abs_change: f64) -> &'static str {
    if abs_change > 0.3 {
        "High"
    } else if abs_change > 0.1 {
        "Medium"
    } else if abs_change > 0.0 {
        "Low"
    } else {
        "No Change"
    }
}

/// Features ranked by sensitivity, most sensitive first
///
/// Uses the analysis result when it carries a sensitivity section; otherwise
/// estimates sensitivity from the configured changes alone, relative to the
/// largest change.
pub fn sensitivity_ranking(
    analysis: Option<&FeatureAnalysis>,
    changes: &FeatureChanges,
    selected: &[String],
) -> Vec<SensitivityRow> {
    let mut rows = match analysis.and_then(|a| a.sensitivity_analysis.as_ref()) {
        Some(sensitivity) => sensitivity
            .iter()
            .filter(|(_, entry)| entry.sensitivity_ratio.is_some() || entry.sensitivity.is_some())
            .map(|(feature, entry)| {
                let sensitivity = match (entry.sensitivity_ratio, entry.sensitivity) {
                    (Some(ratio), _) => ratio * 100.0,
                    (None, Some(raw)) => raw,
                    (None, None) => 0.0,
                };
                let avg_score_change = finite_or_zero(entry.avg_score_change.unwrap_or(0.0));
                let feature_change = entry
                    .percent_change
                    .map(|c| c.abs() * 100.0)
                    .unwrap_or(0.0);

                SensitivityRow {
                    feature: feature.clone(),
                    sensitivity: finite_or_zero(sensitivity),
                    direction: ChangeDirection::from_sign(avg_score_change),
                    magnitude: entry
                        .sensitivity_level
                        .clone()
                        .unwrap_or_else(|| "Medium".to_string()),
                    feature_change: finite_or_zero(feature_change),
                }
            })
            .collect::<Vec<_>>(),
        None => {
            tracing::debug!("No sensitivity analysis available, estimating from configured changes");
            let max_change = changes.max_abs_change().unwrap_or(1.0);

            changes
                .features_or(selected)
                .into_iter()
                .map(|feature| {
                    let change = changes.get(&feature);
                    let impact = change.abs();
                    let normalized = if max_change > 0.0 {
                        impact / max_change * 100.0
                    } else {
                        0.0
                    };

                    SensitivityRow {
                        sensitivity: finite_or_zero(normalized),
                        direction: ChangeDirection::from_sign(change),
                        magnitude: magnitude_label(impact).to_string(),
                        feature_change: finite_or_zero(impact * 100.0),
                        feature,
                    }
                })
                .collect()
        }
    };

    rows.sort_by(|a, b| b.sensitivity.total_cmp(&a.sensitivity));
    rows
}

/// Positive/negative impact split per feature
///
/// Service entries with a non-numeric total are dropped. Without a service
/// breakdown each configured change is split by its sign.
pub fn impact_breakdown(
    analysis: Option<&FeatureAnalysis>,
    changes: &FeatureChanges,
    selected: &[String],
) -> Vec<ImpactRow> {
    if let Some(breakdown) = analysis.and_then(|a| a.impact_breakdown.as_ref()) {
        let coerce = |v: Option<f64>| finite_or_zero(v.unwrap_or(0.0));
        return breakdown
            .values()
            .map(|entry| ImpactRow {
                feature: entry.feature.clone().unwrap_or_else(|| "Unknown".to_string()),
                positive_impact: coerce(entry.positive_impact),
                negative_impact: coerce(entry.negative_impact),
                no_change: coerce(entry.no_change),
                total_impact: coerce(entry.total_impact),
            })
            .filter(|row| row.total_impact.is_finite())
            .collect();
    }

    changes
        .features_or(selected)
        .into_iter()
        .map(|feature| {
            let change = changes.get(&feature);
            let impact = change.abs() * 100.0;
            ImpactRow {
                positive_impact: if change > 0.0 { impact } else { 0.0 },
                negative_impact: if change < 0.0 { impact } else { 0.0 },
                no_change: if change == 0.0 { 100.0 } else { 0.0 },
                total_impact: impact,
                feature,
            }
        })
        .collect()
}

/// How each configured change reads, in percent
pub fn feature_change_summary(
    changes: &FeatureChanges,
    selected: &[String],
) -> Vec<FeatureChangeSummaryRow> {
    changes
        .features_or(selected)
        .into_iter()
        .map(|feature| {
            let change = changes.get(&feature);
            let change_type = match ChangeDirection::from_sign(change) {
                ChangeDirection::Positive => "Increased",
                ChangeDirection::Negative => "Decreased",
                ChangeDirection::NoChange => "No Change",
            };
            FeatureChangeSummaryRow {
                change: change * 100.0,
                change_type: change_type.to_string(),
                magnitude: change.abs() * 100.0,
                feature,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeatureMap, ImpactEntry, SensitivityEntry};

    fn changes() -> FeatureChanges {
        FeatureChanges::new()
            .with("water_access", 0.4)
            .with("road_density", -0.2)
            .with("literacy", 0.0)
    }

    #[test]
    fn test_fallback_sensitivity() {
        let rows = sensitivity_ranking(None, &changes(), &[]);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].feature, "water_access");
        assert_eq!(rows[0].sensitivity, 100.0);
        assert_eq!(rows[0].magnitude, "High");
        assert_eq!(rows[0].direction, ChangeDirection::Positive);
        assert!((rows[0].feature_change - 40.0).abs() < 1e-9);

        assert_eq!(rows[1].feature, "road_density");
        assert_eq!(rows[1].sensitivity, 50.0);
        assert_eq!(rows[1].magnitude, "Medium");
        assert_eq!(rows[1].direction, ChangeDirection::Negative);

        assert_eq!(rows[2].sensitivity, 0.0);
        assert_eq!(rows[2].magnitude, "No Change");
        assert_eq!(rows[2].direction, ChangeDirection::NoChange);
    }

    #[test]
    fn test_fallback_with_selection_and_all_zero_changes() {
        let zero = FeatureChanges::new().with("a", 0.0);
        let rows = sensitivity_ranking(None, &zero, &["a".to_string(), "b".to_string()]);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.sensitivity == 0.0));
        assert_eq!(magnitude_label(0.05), "Low");
    }

    #[test]
    fn test_service_sensitivity() {
        let mut sensitivity = FeatureMap::new();
        sensitivity.insert(
            "a".to_string(),
            SensitivityEntry {
                sensitivity_ratio: Some(0.25),
                avg_score_change: Some(-1.0),
                percent_change: Some(-0.2),
                sensitivity_level: Some("Medium".to_string()),
                ..Default::default()
            },
        );
        sensitivity.insert(
            "b".to_string(),
            SensitivityEntry {
                sensitivity: Some(80.0),
                avg_score_change: Some(2.0),
                ..Default::default()
            },
        );
        // neither ratio nor raw sensitivity: skipped
        sensitivity.insert("c".to_string(), SensitivityEntry::default());

        let analysis = FeatureAnalysis {
            sensitivity_analysis: Some(sensitivity),
            ..Default::default()
        };
        let rows = sensitivity_ranking(Some(&analysis), &changes(), &[]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].feature, "b");
        assert_eq!(rows[0].sensitivity, 80.0);
        assert_eq!(rows[0].magnitude, "Medium");
        assert_eq!(rows[0].direction, ChangeDirection::Positive);
        assert_eq!(rows[1].sensitivity, 25.0);
        assert_eq!(rows[1].direction, ChangeDirection::Negative);
        assert!((rows[1].feature_change - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_numeric_service_sensitivity_reads_as_zero() {
        let mut sensitivity = FeatureMap::new();
        sensitivity.insert(
            "a".to_string(),
            SensitivityEntry {
                sensitivity: Some(f64::NAN),
                ..Default::default()
            },
        );
        sensitivity.insert(
            "b".to_string(),
            SensitivityEntry {
                sensitivity_ratio: Some(f64::NAN),
                avg_score_change: Some(0.5),
                ..Default::default()
            },
        );
        let analysis = FeatureAnalysis {
            sensitivity_analysis: Some(sensitivity),
            ..Default::default()
        };
        let rows = sensitivity_ranking(Some(&analysis), &changes(), &[]);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.sensitivity == 0.0));
        assert_eq!(rows[1].direction, ChangeDirection::Positive);
    }

    #[test]
    fn test_service_ties_keep_service_order() {
        let sensitivity: FeatureMap<SensitivityEntry> = ["zeta", "alpha"]
            .into_iter()
            .map(|name| {
                let entry = SensitivityEntry {
                    sensitivity_ratio: Some(0.1),
                    ..Default::default()
                };
                (name.to_string(), entry)
            })
            .collect();
        let analysis = FeatureAnalysis {
            sensitivity_analysis: Some(sensitivity),
            ..Default::default()
        };
        let rows = sensitivity_ranking(Some(&analysis), &changes(), &[]);
        assert_eq!(rows[0].feature, "zeta");
        assert_eq!(rows[1].feature, "alpha");
    }

    #[test]
    fn test_analysis_without_sensitivity_section_falls_back() {
        let analysis = FeatureAnalysis::default();
        let rows = sensitivity_ranking(Some(&analysis), &changes(), &[]);
        assert_eq!(rows[0].sensitivity, 100.0);
    }

    #[test]
    fn test_impact_breakdown_fallback() {
        let rows = impact_breakdown(None, &changes(), &[]);
        assert!((rows[0].positive_impact - 40.0).abs() < 1e-9);
        assert_eq!(rows[0].negative_impact, 0.0);
        assert!((rows[1].negative_impact - 20.0).abs() < 1e-9);
        assert_eq!(rows[2].no_change, 100.0);
        assert_eq!(rows[2].total_impact, 0.0);
    }

    #[test]
    fn test_impact_breakdown_from_service() {
        let mut breakdown = FeatureMap::new();
        breakdown.insert(
            "0".to_string(),
            ImpactEntry {
                feature: None,
                positive_impact: Some(12.0),
                negative_impact: Some(f64::NAN),
                no_change: None,
                total_impact: Some(12.0),
            },
        );
        let analysis = FeatureAnalysis {
            impact_breakdown: Some(breakdown),
            ..Default::default()
        };

        let rows = impact_breakdown(Some(&analysis), &changes(), &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].feature, "Unknown");
        assert_eq!(rows[0].negative_impact, 0.0);
    }

    #[test]
    fn test_feature_change_summary() {
        let rows = feature_change_summary(&changes(), &[]);
        assert_eq!(rows[0].change_type, "Increased");
        assert_eq!(rows[1].change_type, "Decreased");
        assert!((rows[1].change + 20.0).abs() < 1e-9);
        assert!((rows[1].magnitude - 20.0).abs() < 1e-9);
        assert_eq!(rows[2].change_type, "No Change");
    }
}
