//! V002: Seed the built-in rule set.
//!
//! One rule per issue type so a fresh deployment validates out of the
//! box. `INSERT OR IGNORE` keeps re-runs and operator-renamed rules safe.

pub const MIGRATION_SQL: &str = r#"
INSERT OR IGNORE INTO validation_rules
    (id, name, rule_type, scope, rule_logic, severity, is_active, created_at, updated_at)
VALUES
    ('builtin-business-realizes-motivation',
     'business-realizes-motivation',
     'traceability', 'Business',
     '{"kind":"require_relationship","relationship_type":"realizes","target_layer":"Motivation"}',
     'high', 1, unixepoch(), unixepoch()),

    ('builtin-application-connected',
     'application-connected',
     'completeness', 'Application',
     '{"kind":"require_any_relationship"}',
     'medium', 1, unixepoch(), unixepoch()),

    ('builtin-business-owner-assigned',
     'business-owner-assigned',
     'completeness', 'Business',
     '{"kind":"require_attribute","attribute":"owner"}',
     'medium', 1, unixepoch(), unixepoch()),

    ('builtin-technology-reviewed-within-year',
     'technology-reviewed-within-year',
     'alignment', 'Technology',
     '{"kind":"max_age_days","days":365}',
     'low', 1, unixepoch(), unixepoch()),

    ('builtin-application-lifecycle-status',
     'application-lifecycle-status',
     'alignment', 'Application',
     '{"kind":"attribute_in","attribute":"status","allowed":["planned","active","deprecated","retired"]}',
     'medium', 1, unixepoch(), unixepoch()),

    ('builtin-application-traces-to-technology',
     'application-traces-to-technology',
     'traceability', 'Application',
     '{"kind":"require_trace_to_layer","target_layer":"Technology","max_hops":3}',
     'high', 1, unixepoch(), unixepoch());
"#;
