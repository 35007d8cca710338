//! The rule evaluator.
//!
//! Rules fan out across worker threads; each rule walks the elements in
//! its scope layer against a prebuilt relationship index. A rule with
//! unparseable logic fails alone and is reported as a non-fatal error;
//! cancellation and deadline overrun abort the whole pass.

use std::collections::VecDeque;
use std::time::Instant;

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use lintel_core::errors::{EvaluationError, EvaluationReport};
use lintel_core::model::{IssueType, Layer, Severity};
use lintel_core::time::SECS_PER_DAY;
use lintel_core::traits::{Cancellable, CancellationToken};
use lintel_storage::queries::elements::ElementRow;
use lintel_storage::queries::relationships::RelationshipRow;
use lintel_storage::queries::rules::RuleRow;

use crate::rules::RuleLogic;

/// An issue the evaluator wants to raise, before the exception overlay
/// and persistence have their say.
#[derive(Debug, Clone)]
pub struct IssueCandidate {
    pub entity_type: String,
    pub entity_id: String,
    pub rule_id: String,
    pub issue_type: IssueType,
    pub severity: Severity,
    pub description: String,
    pub recommended_fix: Option<String>,
    pub metadata: serde_json::Value,
}

/// Element and relationship lookups shared by all rules in a pass.
struct ElementIndex<'a> {
    by_id: FxHashMap<&'a str, &'a ElementRow>,
    outgoing: FxHashMap<&'a str, Vec<&'a RelationshipRow>>,
    incoming_ids: FxHashSet<&'a str>,
}

impl<'a> ElementIndex<'a> {
    fn build(elements: &'a [ElementRow], relationships: &'a [RelationshipRow]) -> Self {
        let mut by_id = FxHashMap::default();
        for e in elements {
            by_id.insert(e.id.as_str(), e);
        }

        let mut outgoing: FxHashMap<&str, Vec<&RelationshipRow>> = FxHashMap::default();
        let mut incoming_ids = FxHashSet::default();
        for r in relationships {
            outgoing.entry(r.source_id.as_str()).or_default().push(r);
            incoming_ids.insert(r.target_id.as_str());
        }

        Self {
            by_id,
            outgoing,
            incoming_ids,
        }
    }

    fn outgoing(&self, id: &str) -> &[&'a RelationshipRow] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn is_connected(&self, id: &str) -> bool {
        !self.outgoing(id).is_empty() || self.incoming_ids.contains(id)
    }

    /// Breadth-first walk over outgoing relationships, bounded by
    /// `max_hops`. Returns true if any reachable element sits in `layer`.
    fn reaches_layer(&self, start: &str, layer: Layer, max_hops: u32) -> bool {
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut queue: VecDeque<(&str, u32)> = VecDeque::new();
        visited.insert(start);
        queue.push_back((start, 0));

        while let Some((id, hops)) = queue.pop_front() {
            if hops >= max_hops {
                continue;
            }
            for rel in self.outgoing(id) {
                let target = rel.target_id.as_str();
                if !visited.insert(target) {
                    continue;
                }
                if let Some(element) = self.by_id.get(target) {
                    if element.layer == layer.as_str() {
                        return true;
                    }
                }
                queue.push_back((target, hops + 1));
            }
        }
        false
    }
}

/// Evaluate the active rule set against a tenant's elements.
///
/// Returns all issue candidates plus non-fatal per-rule errors.
/// `Err` is reserved for cancellation and deadline overrun.
pub fn evaluate_rules(
    rules: &[RuleRow],
    elements: &[ElementRow],
    relationships: &[RelationshipRow],
    now: i64,
    token: &CancellationToken,
    deadline: Instant,
) -> Result<EvaluationReport<Vec<IssueCandidate>>, EvaluationError> {
    let index = ElementIndex::build(elements, relationships);

    let per_rule: Vec<Result<Vec<IssueCandidate>, EvaluationError>> = rules
        .par_iter()
        .map(|rule| {
            if token.is_cancelled() {
                return Err(EvaluationError::Cancelled);
            }
            if Instant::now() >= deadline {
                // The runner reports the configured budget in its message.
                return Err(EvaluationError::Timeout { timeout_secs: 0 });
            }
            evaluate_one_rule(rule, elements, &index, now)
        })
        .collect();

    let mut report = EvaluationReport::new(Vec::new());
    for result in per_rule {
        match result {
            Ok(mut candidates) => report.data.append(&mut candidates),
            Err(fatal @ (EvaluationError::Cancelled | EvaluationError::Timeout { .. })) => {
                return Err(fatal);
            }
            Err(non_fatal) => report.add_error(non_fatal),
        }
    }
    Ok(report)
}

fn evaluate_one_rule(
    rule: &RuleRow,
    elements: &[ElementRow],
    index: &ElementIndex<'_>,
    now: i64,
) -> Result<Vec<IssueCandidate>, EvaluationError> {
    let logic =
        RuleLogic::parse(&rule.rule_logic).map_err(|e| EvaluationError::InvalidRuleLogic {
            rule_id: rule.id.clone(),
            message: e.to_string(),
        })?;
    let scope = Layer::parse(&rule.scope).ok_or_else(|| EvaluationError::InvalidRuleLogic {
        rule_id: rule.id.clone(),
        message: format!("unknown scope layer: {}", rule.scope),
    })?;
    let severity =
        Severity::parse(&rule.severity).ok_or_else(|| EvaluationError::InvalidRuleLogic {
            rule_id: rule.id.clone(),
            message: format!("unknown severity: {}", rule.severity),
        })?;

    let mut candidates = Vec::new();
    for element in elements.iter().filter(|e| e.layer == scope.as_str()) {
        if let Some(description) = violation(&logic, element, index, now) {
            candidates.push(IssueCandidate {
                entity_type: element.entity_type.clone(),
                entity_id: element.id.clone(),
                rule_id: rule.id.clone(),
                issue_type: logic.issue_type(),
                severity,
                description,
                recommended_fix: recommended_fix(&logic, element),
                metadata: serde_json::json!({
                    "rule_name": rule.name,
                    "layer": element.layer,
                    "element_name": element.name,
                }),
            });
        }
    }
    Ok(candidates)
}

/// Returns a violation description if the element fails the predicate.
fn violation(
    logic: &RuleLogic,
    element: &ElementRow,
    index: &ElementIndex<'_>,
    now: i64,
) -> Option<String> {
    match logic {
        RuleLogic::RequireRelationship {
            relationship_type,
            target_layer,
        } => {
            let satisfied = index.outgoing(&element.id).iter().any(|rel| {
                rel.relationship_type == *relationship_type
                    && match target_layer {
                        None => true,
                        Some(layer) => index
                            .by_id
                            .get(rel.target_id.as_str())
                            .is_some_and(|t| t.layer == layer.as_str()),
                    }
            });
            (!satisfied).then(|| match target_layer {
                Some(layer) => format!(
                    "'{}' has no '{relationship_type}' relationship into the {layer} layer",
                    element.name
                ),
                None => format!("'{}' has no '{relationship_type}' relationship", element.name),
            })
        }

        RuleLogic::RequireAnyRelationship => (!index.is_connected(&element.id))
            .then(|| format!("'{}' is not connected to any other element", element.name)),

        RuleLogic::RequireAttribute { attribute } => {
            (!has_attribute(element, attribute)).then(|| {
                format!("'{}' is missing required attribute '{attribute}'", element.name)
            })
        }

        RuleLogic::MaxAgeDays { days } => {
            let age_secs = now.saturating_sub(element.updated_at);
            (age_secs > *days as i64 * SECS_PER_DAY).then(|| {
                format!(
                    "'{}' was last updated {} days ago (limit {days})",
                    element.name,
                    age_secs / SECS_PER_DAY
                )
            })
        }

        RuleLogic::AttributeIn { attribute, allowed } => {
            let value = attribute_value(element, attribute)?;
            (!allowed.contains(&value)).then(|| {
                format!(
                    "'{}' has {attribute} = '{value}', expected one of [{}]",
                    element.name,
                    allowed.join(", ")
                )
            })
        }

        RuleLogic::RequireTraceToLayer {
            target_layer,
            max_hops,
        } => (!index.reaches_layer(&element.id, *target_layer, *max_hops)).then(|| {
            format!(
                "'{}' has no trace to the {target_layer} layer within {max_hops} hops",
                element.name
            )
        }),
    }
}

fn recommended_fix(logic: &RuleLogic, element: &ElementRow) -> Option<String> {
    match logic {
        RuleLogic::RequireRelationship {
            relationship_type, ..
        } => Some(format!(
            "add a '{relationship_type}' relationship from '{}'",
            element.name
        )),
        RuleLogic::RequireAnyRelationship => Some(format!(
            "connect '{}' to the rest of the model, or remove it",
            element.name
        )),
        RuleLogic::RequireAttribute { attribute } => {
            Some(format!("set the '{attribute}' attribute on '{}'", element.name))
        }
        RuleLogic::MaxAgeDays { .. } => {
            Some(format!("review and update '{}'", element.name))
        }
        RuleLogic::AttributeIn { attribute, .. } => {
            Some(format!("correct the '{attribute}' value on '{}'", element.name))
        }
        RuleLogic::RequireTraceToLayer { target_layer, .. } => Some(format!(
            "link '{}' toward the {target_layer} layer",
            element.name
        )),
    }
}

/// Attribute present with a non-empty, non-null value.
fn has_attribute(element: &ElementRow, attribute: &str) -> bool {
    attribute_value(element, attribute).is_some_and(|v| !v.is_empty())
}

/// String form of an attribute value, if present and not null.
fn attribute_value(element: &ElementRow, attribute: &str) -> Option<String> {
    let attrs: serde_json::Value = serde_json::from_str(&element.attributes).ok()?;
    match attrs.get(attribute)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
