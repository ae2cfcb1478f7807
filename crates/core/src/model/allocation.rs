use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a rule's source amount is split across its targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DriverType {
    /// Split proportionally to each target's `ratio`, normalised over the
    /// rule's total weight.
    Ratio,
    /// Equal split across all targets; target ratios are ignored.
    Even,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationTarget {
    pub department: String,
    #[serde(default)]
    pub ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationRule {
    pub id: Uuid,
    pub name: String,
    /// Account whose ledger lines feed this rule.
    pub source_account: String,
    /// Restrict the source to one department; omit to draw from all.
    #[serde(default)]
    pub source_department: Option<String>,
    pub driver: DriverType,
    pub targets: Vec<AllocationTarget>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationRuleResult {
    pub rule_id: Uuid,
    pub rule_name: String,
    pub source_amount: f64,
    pub allocated_amount: f64,
    pub target_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationReport {
    pub accounting_period_id: Uuid,
    pub dry_run: bool,
    pub results: Vec<AllocationRuleResult>,
}
