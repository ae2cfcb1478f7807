use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::check::CheckResult;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CloseStatus {
    Open,
    SoftClosed,
    HardClosed,
}

impl CloseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseStatus::Open => "open",
            CloseStatus::SoftClosed => "soft_closed",
            CloseStatus::HardClosed => "hard_closed",
        }
    }
}

impl std::fmt::Display for CloseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Close state of one accounting period within a fiscal year.
///
/// The `can_*` flags and `check_results` are derived; they are recomputed by
/// the eligibility evaluator on every load and after every transition and are
/// never trusted from storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodCloseStatus {
    pub accounting_period_id: Uuid,
    pub company_id: String,
    pub fiscal_year: i32,
    pub period_no: i32,
    pub period_label: String,
    pub close_status: CloseStatus,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub operated_by: Option<String>,
    #[serde(default)]
    pub can_soft_close: bool,
    #[serde(default)]
    pub can_hard_close: bool,
    #[serde(default)]
    pub can_reopen: bool,
    #[serde(default)]
    pub check_results: Vec<CheckResult>,
}

impl PeriodCloseStatus {
    /// A freshly created period record, as seeded when a fiscal year is
    /// first queried. Derived fields are left for the evaluator.
    pub fn open(company_id: impl Into<String>, fiscal_year: i32, period_no: i32) -> Self {
        Self {
            accounting_period_id: Uuid::now_v7(),
            company_id: company_id.into(),
            fiscal_year,
            period_no,
            period_label: format!("{fiscal_year}-{period_no:02}"),
            close_status: CloseStatus::Open,
            closed_at: None,
            operated_by: None,
            can_soft_close: false,
            can_hard_close: false,
            can_reopen: false,
            check_results: vec![],
        }
    }
}
