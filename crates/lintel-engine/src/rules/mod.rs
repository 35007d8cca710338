//! Structured rule logic.
//!
//! `rule_logic` is stored as a serde-tagged JSON predicate rather than
//! opaque text, so the evaluator interprets rules instead of guessing at
//! them. Each variant maps to exactly one issue type.

use serde::{Deserialize, Serialize};

use lintel_core::model::{IssueType, Layer};

/// The predicate a rule applies to every element in its scope layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleLogic {
    /// The element must have an outgoing relationship of the given type,
    /// optionally landing in a specific layer.
    RequireRelationship {
        relationship_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_layer: Option<Layer>,
    },

    /// The element must participate in at least one relationship,
    /// in either direction.
    RequireAnyRelationship,

    /// The element's attributes must contain a non-empty value under
    /// the given key.
    RequireAttribute { attribute: String },

    /// The element must have been updated within the last `days` days.
    MaxAgeDays { days: u32 },

    /// If the attribute is present, its value must be one of `allowed`.
    /// An absent attribute is a completeness concern, not an enum one,
    /// and is not flagged here.
    AttributeIn {
        attribute: String,
        allowed: Vec<String>,
    },

    /// Some chain of outgoing relationships, at most `max_hops` long,
    /// must reach an element in `target_layer`.
    RequireTraceToLayer {
        target_layer: Layer,
        #[serde(default = "default_max_hops")]
        max_hops: u32,
    },
}

fn default_max_hops() -> u32 {
    3
}

impl RuleLogic {
    /// Parse the stored JSON form.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// The issue type this predicate produces when violated.
    pub fn issue_type(&self) -> IssueType {
        match self {
            RuleLogic::RequireRelationship { .. } => IssueType::MissingLink,
            RuleLogic::RequireAnyRelationship => IssueType::Orphaned,
            RuleLogic::RequireAttribute { .. } => IssueType::MissingLink,
            RuleLogic::MaxAgeDays { .. } => IssueType::Stale,
            RuleLogic::AttributeIn { .. } => IssueType::InvalidEnum,
            RuleLogic::RequireTraceToLayer { .. } => IssueType::BrokenTraceability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_variant() {
        let cases = [
            (
                r#"{"kind":"require_relationship","relationship_type":"realizes","target_layer":"Motivation"}"#,
                IssueType::MissingLink,
            ),
            (r#"{"kind":"require_any_relationship"}"#, IssueType::Orphaned),
            (
                r#"{"kind":"require_attribute","attribute":"owner"}"#,
                IssueType::MissingLink,
            ),
            (r#"{"kind":"max_age_days","days":365}"#, IssueType::Stale),
            (
                r#"{"kind":"attribute_in","attribute":"status","allowed":["active"]}"#,
                IssueType::InvalidEnum,
            ),
            (
                r#"{"kind":"require_trace_to_layer","target_layer":"Technology"}"#,
                IssueType::BrokenTraceability,
            ),
        ];
        for (raw, expected) in cases {
            let logic = RuleLogic::parse(raw).unwrap();
            assert_eq!(logic.issue_type(), expected, "for {raw}");
        }
    }

    #[test]
    fn max_hops_defaults() {
        let logic =
            RuleLogic::parse(r#"{"kind":"require_trace_to_layer","target_layer":"Business"}"#)
                .unwrap();
        assert_eq!(
            logic,
            RuleLogic::RequireTraceToLayer {
                target_layer: Layer::Business,
                max_hops: 3
            }
        );
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(RuleLogic::parse(r#"{"kind":"frobnicate"}"#).is_err());
        assert!(RuleLogic::parse("not json").is_err());
    }
}
