//! Shared domain vocabulary.
//!
//! Enums are persisted as their lowercase string form (layers keep their
//! canonical capitalized names). Parsing is strict: unknown strings are
//! rejected at the storage boundary rather than silently coerced.

use serde::{Deserialize, Serialize};

/// Architecture layers a rule or element can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    Motivation,
    Business,
    Application,
    Technology,
    Implementation,
}

impl Layer {
    /// All layers in canonical order.
    pub const ALL: [Layer; 5] = [
        Layer::Motivation,
        Layer::Business,
        Layer::Application,
        Layer::Technology,
        Layer::Implementation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Motivation => "Motivation",
            Layer::Business => "Business",
            Layer::Application => "Application",
            Layer::Technology => "Technology",
            Layer::Implementation => "Implementation",
        }
    }

    pub fn parse(s: &str) -> Option<Layer> {
        match s {
            "Motivation" => Some(Layer::Motivation),
            "Business" => Some(Layer::Business),
            "Application" => Some(Layer::Application),
            "Technology" => Some(Layer::Technology),
            "Implementation" => Some(Layer::Implementation),
            _ => None,
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Severity> {
        match s {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }

    /// Weight used by the scorecard aggregator.
    pub fn weight(&self) -> f64 {
        match self {
            Severity::Low => 0.25,
            Severity::Medium => 0.5,
            Severity::High => 0.75,
            Severity::Critical => 1.0,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of gap an issue describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    MissingLink,
    Orphaned,
    Stale,
    InvalidEnum,
    BrokenTraceability,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::MissingLink => "missing_link",
            IssueType::Orphaned => "orphaned",
            IssueType::Stale => "stale",
            IssueType::InvalidEnum => "invalid_enum",
            IssueType::BrokenTraceability => "broken_traceability",
        }
    }

    pub fn parse(s: &str) -> Option<IssueType> {
        match s {
            "missing_link" => Some(IssueType::MissingLink),
            "orphaned" => Some(IssueType::Orphaned),
            "stale" => Some(IssueType::Stale),
            "invalid_enum" => Some(IssueType::InvalidEnum),
            "broken_traceability" => Some(IssueType::BrokenTraceability),
            _ => None,
        }
    }
}

/// Which scorecard dimension a rule contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Traceability,
    Completeness,
    Alignment,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Traceability => "traceability",
            RuleType::Completeness => "completeness",
            RuleType::Alignment => "alignment",
        }
    }

    pub fn parse(s: &str) -> Option<RuleType> {
        match s {
            "traceability" => Some(RuleType::Traceability),
            "completeness" => Some(RuleType::Completeness),
            "alignment" => Some(RuleType::Alignment),
            _ => None,
        }
    }
}

/// Terminal and non-terminal states of a validation cycle.
///
/// `running → {completed, failed, cancelled}`; the three right-hand states
/// are terminal and a cycle never leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Running => "running",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<ExecutionStatus> {
        match s {
            "running" => Some(ExecutionStatus::Running),
            "completed" => Some(ExecutionStatus::Completed),
            "failed" => Some(ExecutionStatus::Failed),
            "cancelled" => Some(ExecutionStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Running)
    }
}

/// Caller roles carried in token claims. Ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Role {
    Viewer,
    Admin,
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "Viewer",
            Role::Admin => "Admin",
            Role::Owner => "Owner",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "Viewer" => Some(Role::Viewer),
            "Admin" => Some(Role::Admin),
            "Owner" => Some(Role::Owner),
            _ => None,
        }
    }

    /// Admin and Owner may mutate; Viewer is read-only.
    pub fn can_administer(&self) -> bool {
        matches!(self, Role::Admin | Role::Owner)
    }
}
