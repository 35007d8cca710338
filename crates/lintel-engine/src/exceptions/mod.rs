//! Exception overlay — approved suppressions applied to evaluator output.

use rustc_hash::FxHashMap;

use lintel_storage::queries::exceptions::ExceptionRow;

use crate::evaluator::IssueCandidate;

/// Effective exceptions for one tenant, indexed for suppression checks.
///
/// An issue is suppressed iff an exception matches its
/// (entity_type, entity_id) and the exception either names no rule or
/// names the issue's originating rule. Expiry is resolved at
/// construction: rows past `expires_at` never enter the overlay, no
/// matter what their stored `is_active` flag says.
pub struct ExceptionOverlay {
    by_entity: FxHashMap<(String, String), Vec<Option<String>>>,
}

impl ExceptionOverlay {
    /// Build the overlay from stored rows, dropping lapsed ones.
    pub fn from_rows(rows: &[ExceptionRow], now: i64) -> Self {
        let mut by_entity: FxHashMap<(String, String), Vec<Option<String>>> =
            FxHashMap::default();
        for row in rows {
            if !row.is_active {
                continue;
            }
            if let Some(expires_at) = row.expires_at {
                if expires_at <= now {
                    continue;
                }
            }
            by_entity
                .entry((row.entity_type.clone(), row.entity_id.clone()))
                .or_default()
                .push(row.rule_id.clone());
        }
        Self { by_entity }
    }

    /// Check whether an issue on this entity (from this rule) is suppressed.
    pub fn is_suppressed(&self, entity_type: &str, entity_id: &str, rule_id: Option<&str>) -> bool {
        let key = (entity_type.to_string(), entity_id.to_string());
        let Some(scopes) = self.by_entity.get(&key) else {
            return false;
        };
        scopes.iter().any(|scope| match scope {
            None => true,
            Some(scoped_rule) => rule_id == Some(scoped_rule.as_str()),
        })
    }

    /// Drop suppressed candidates, returning the survivors and how many
    /// were suppressed.
    pub fn apply(&self, candidates: Vec<IssueCandidate>) -> (Vec<IssueCandidate>, usize) {
        let before = candidates.len();
        let survivors: Vec<IssueCandidate> = candidates
            .into_iter()
            .filter(|c| !self.is_suppressed(&c.entity_type, &c.entity_id, Some(&c.rule_id)))
            .collect();
        let suppressed = before - survivors.len();
        (survivors, suppressed)
    }

    /// Number of effective (unexpired, active) exceptions.
    pub fn len(&self) -> usize {
        self.by_entity.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_entity.is_empty()
    }
}
