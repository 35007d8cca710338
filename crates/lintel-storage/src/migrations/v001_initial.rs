//! V001: Initial schema.
//! architecture_elements, element_relationships, validation_cycles,
//! validation_issues, validation_rules, validation_exceptions,
//! validation_scorecards, traceability_matrix.

pub const MIGRATION_SQL: &str = r#"
-- Modeled architecture elements: the material the rule evaluator scans.
-- Attributes are an opaque JSON object interpreted by rule predicates.
CREATE TABLE IF NOT EXISTS architecture_elements (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL,
    layer TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    name TEXT NOT NULL,
    attributes TEXT NOT NULL DEFAULT '{}',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_elements_tenant_layer
    ON architecture_elements(tenant_id, layer);
CREATE INDEX IF NOT EXISTS idx_elements_tenant_type
    ON architecture_elements(tenant_id, entity_type);

-- Directed relationships between elements of the same tenant.
CREATE TABLE IF NOT EXISTS element_relationships (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL,
    source_id TEXT NOT NULL,
    target_id TEXT NOT NULL,
    relationship_type TEXT NOT NULL,
    created_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_relationships_tenant_source
    ON element_relationships(tenant_id, source_id);
CREATE INDEX IF NOT EXISTS idx_relationships_tenant_target
    ON element_relationships(tenant_id, target_id);

-- Validation cycles: append-only history of scan runs.
-- running -> completed | failed | cancelled, all right-hand terminal.
CREATE TABLE IF NOT EXISTS validation_cycles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_id TEXT NOT NULL,
    started_at INTEGER NOT NULL,
    completed_at INTEGER,
    triggered_by TEXT NOT NULL,
    rule_set_id TEXT,
    total_issues_found INTEGER,
    execution_status TEXT NOT NULL DEFAULT 'running',
    maturity_score REAL,
    error TEXT
) STRICT;

CREATE INDEX IF NOT EXISTS idx_cycles_tenant_time
    ON validation_cycles(tenant_id, started_at DESC);

-- Issues found by the evaluator; mutated only to mark resolution.
CREATE TABLE IF NOT EXISTS validation_issues (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL,
    cycle_id INTEGER,
    entity_type TEXT NOT NULL,
    entity_id TEXT NOT NULL,
    rule_id TEXT,
    issue_type TEXT NOT NULL,
    severity TEXT NOT NULL,
    description TEXT NOT NULL,
    recommended_fix TEXT,
    metadata TEXT NOT NULL DEFAULT '{}',
    is_resolved INTEGER NOT NULL DEFAULT 0,
    resolved_at INTEGER,
    resolved_by TEXT,
    created_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_issues_tenant_time
    ON validation_issues(tenant_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_issues_tenant_entity
    ON validation_issues(tenant_id, entity_id);
CREATE INDEX IF NOT EXISTS idx_issues_cycle
    ON validation_issues(cycle_id);

-- Rules are global (not tenant-scoped); toggled, never deleted.
CREATE TABLE IF NOT EXISTS validation_rules (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    rule_type TEXT NOT NULL,
    scope TEXT NOT NULL,
    rule_logic TEXT NOT NULL,
    severity TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_rules_active
    ON validation_rules(is_active);

-- Administrator-approved suppressions, optionally time-bound.
CREATE TABLE IF NOT EXISTS validation_exceptions (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    entity_id TEXT NOT NULL,
    rule_id TEXT,
    reason TEXT NOT NULL,
    created_by TEXT NOT NULL,
    expires_at INTEGER,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_exceptions_tenant_entity
    ON validation_exceptions(tenant_id, entity_id);

-- Per (cycle, layer) score snapshot; immutable after creation.
CREATE TABLE IF NOT EXISTS validation_scorecards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_id TEXT NOT NULL,
    cycle_id INTEGER NOT NULL,
    layer TEXT NOT NULL,
    completeness_score REAL NOT NULL,
    traceability_score REAL NOT NULL,
    alignment_score REAL NOT NULL,
    overall_score REAL NOT NULL,
    low_issues INTEGER NOT NULL DEFAULT 0,
    medium_issues INTEGER NOT NULL DEFAULT 0,
    high_issues INTEGER NOT NULL DEFAULT 0,
    critical_issues INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    UNIQUE(cycle_id, layer)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_scorecards_tenant_cycle
    ON validation_scorecards(tenant_id, cycle_id);

-- Cross-layer connection summary; overwritten per cycle, not versioned.
CREATE TABLE IF NOT EXISTS traceability_matrix (
    tenant_id TEXT NOT NULL,
    source_layer TEXT NOT NULL,
    target_layer TEXT NOT NULL,
    source_entity_type TEXT NOT NULL,
    target_entity_type TEXT NOT NULL,
    relationship_type TEXT NOT NULL,
    connection_count INTEGER NOT NULL,
    missing_connections INTEGER NOT NULL,
    strength_score REAL NOT NULL,
    computed_at INTEGER NOT NULL,
    PRIMARY KEY (tenant_id, source_layer, target_layer,
                 source_entity_type, target_entity_type, relationship_type)
) STRICT;
"#;
