//! Scorecard aggregation.
//!
//! Scoring model: within one layer, each dimension (completeness,
//! traceability, alignment) is
//!
//! ```text
//! score = 1 − min(1, Σ severity_weight(issue) / element_count)
//! ```
//!
//! over that layer's unsuppressed findings whose rule belongs to the
//! dimension. Severity weights: low 0.25, medium 0.5, high 0.75,
//! critical 1.0. `overall_score` is the unweighted mean of the three
//! dimensions; a layer with no elements scores 1.0 everywhere. The
//! cycle's maturity score is the mean of the layer overalls, so an
//! empty tenant's cycle lands at 1.0.

use rustc_hash::FxHashMap;

use lintel_core::model::{Layer, RuleType, Severity};
use lintel_storage::queries::elements::ElementRow;

/// One finding as the aggregator sees it: which layer it degrades,
/// which dimension, and how badly.
#[derive(Debug, Clone, Copy)]
pub struct ScoredFinding {
    pub layer: Layer,
    pub rule_type: RuleType,
    pub severity: Severity,
}

/// Computed scores for one layer.
#[derive(Debug, Clone)]
pub struct LayerScorecard {
    pub layer: Layer,
    pub completeness_score: f64,
    pub traceability_score: f64,
    pub alignment_score: f64,
    pub overall_score: f64,
    pub low_issues: u32,
    pub medium_issues: u32,
    pub high_issues: u32,
    pub critical_issues: u32,
}

/// Compute scorecards for all five layers.
///
/// Deterministic: the same elements and findings always produce the
/// same scores, independent of input order.
pub fn compute_scorecards(
    elements: &[ElementRow],
    findings: &[ScoredFinding],
) -> Vec<LayerScorecard> {
    let mut element_counts: FxHashMap<Layer, u32> = FxHashMap::default();
    for e in elements {
        if let Some(layer) = Layer::parse(&e.layer) {
            *element_counts.entry(layer).or_insert(0) += 1;
        }
    }

    Layer::ALL
        .iter()
        .map(|&layer| {
            let element_count = element_counts.get(&layer).copied().unwrap_or(0);
            let layer_findings: Vec<&ScoredFinding> =
                findings.iter().filter(|f| f.layer == layer).collect();

            let dimension = |rule_type: RuleType| -> f64 {
                if element_count == 0 {
                    return 1.0;
                }
                let weighted: f64 = layer_findings
                    .iter()
                    .filter(|f| f.rule_type == rule_type)
                    .map(|f| f.severity.weight())
                    .sum();
                1.0 - (weighted / element_count as f64).min(1.0)
            };

            let completeness_score = dimension(RuleType::Completeness);
            let traceability_score = dimension(RuleType::Traceability);
            let alignment_score = dimension(RuleType::Alignment);

            let mut counts = [0u32; 4];
            for f in &layer_findings {
                match f.severity {
                    Severity::Low => counts[0] += 1,
                    Severity::Medium => counts[1] += 1,
                    Severity::High => counts[2] += 1,
                    Severity::Critical => counts[3] += 1,
                }
            }

            LayerScorecard {
                layer,
                completeness_score,
                traceability_score,
                alignment_score,
                overall_score: overall_score(
                    completeness_score,
                    traceability_score,
                    alignment_score,
                ),
                low_issues: counts[0],
                medium_issues: counts[1],
                high_issues: counts[2],
                critical_issues: counts[3],
            }
        })
        .collect()
}

/// Unweighted mean of the three dimension scores.
pub fn overall_score(completeness: f64, traceability: f64, alignment: f64) -> f64 {
    (completeness + traceability + alignment) / 3.0
}

/// Mean of the layer overalls; 1.0 when there are no layers to judge.
pub fn maturity_score(cards: &[LayerScorecard]) -> f64 {
    if cards.is_empty() {
        return 1.0;
    }
    cards.iter().map(|c| c.overall_score).sum::<f64>() / cards.len() as f64
}
