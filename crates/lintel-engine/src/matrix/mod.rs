//! Traceability matrix builder.
//!
//! Summarizes cross-layer connectivity per (source_layer, target_layer,
//! source_entity_type, target_entity_type, relationship_type) group:
//! how many source elements of that shape are connected, how many lack
//! the relationship, and the resulting strength ratio.

use rustc_hash::{FxHashMap, FxHashSet};

use lintel_storage::queries::elements::ElementRow;
use lintel_storage::queries::matrix::MatrixRow;
use lintel_storage::queries::relationships::RelationshipRow;

/// Build a tenant's matrix rows from its elements and relationships.
///
/// `connection_count` counts distinct connected source elements;
/// `missing_connections` counts source elements of the same
/// (layer, entity_type) with no such relationship. Strength is
/// `connected / (connected + missing)`, 1.0 when the group is empty.
pub fn build_matrix(
    tenant_id: &str,
    elements: &[ElementRow],
    relationships: &[RelationshipRow],
    computed_at: i64,
) -> Vec<MatrixRow> {
    let by_id: FxHashMap<&str, &ElementRow> =
        elements.iter().map(|e| (e.id.as_str(), e)).collect();

    // Group key: (source_layer, target_layer, source_type, target_type, rel_type).
    type GroupKey<'a> = (&'a str, &'a str, &'a str, &'a str, &'a str);
    let mut connected: FxHashMap<GroupKey<'_>, FxHashSet<&str>> = FxHashMap::default();

    for rel in relationships {
        let (Some(source), Some(target)) = (
            by_id.get(rel.source_id.as_str()),
            by_id.get(rel.target_id.as_str()),
        ) else {
            continue; // dangling endpoints contribute nothing
        };
        let key = (
            source.layer.as_str(),
            target.layer.as_str(),
            source.entity_type.as_str(),
            target.entity_type.as_str(),
            rel.relationship_type.as_str(),
        );
        connected
            .entry(key)
            .or_default()
            .insert(source.id.as_str());
    }

    // Source population per (layer, entity_type).
    let mut population: FxHashMap<(&str, &str), u32> = FxHashMap::default();
    for e in elements {
        *population
            .entry((e.layer.as_str(), e.entity_type.as_str()))
            .or_insert(0) += 1;
    }

    let mut rows: Vec<MatrixRow> = connected
        .into_iter()
        .map(|(key, sources)| {
            let (source_layer, target_layer, source_type, target_type, rel_type) = key;
            let connection_count = sources.len() as u32;
            let total = population
                .get(&(source_layer, source_type))
                .copied()
                .unwrap_or(connection_count);
            let missing_connections = total.saturating_sub(connection_count);
            let denominator = connection_count + missing_connections;
            let strength_score = if denominator == 0 {
                1.0
            } else {
                connection_count as f64 / denominator as f64
            };

            MatrixRow {
                tenant_id: tenant_id.to_string(),
                source_layer: source_layer.to_string(),
                target_layer: target_layer.to_string(),
                source_entity_type: source_type.to_string(),
                target_entity_type: target_type.to_string(),
                relationship_type: rel_type.to_string(),
                connection_count,
                missing_connections,
                strength_score,
                computed_at,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        (
            &a.source_layer,
            &a.target_layer,
            &a.source_entity_type,
            &a.target_entity_type,
            &a.relationship_type,
        )
            .cmp(&(
                &b.source_layer,
                &b.target_layer,
                &b.source_entity_type,
                &b.target_entity_type,
                &b.relationship_type,
            ))
    });
    rows
}
