use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckType {
    PreviousMonthClosed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckResult {
    pub check_type: CheckType,
    pub passed: bool,
    pub message: String,
}

impl CheckResult {
    pub fn previous_month_closed(passed: bool, message: impl Into<String>) -> Self {
        Self {
            check_type: CheckType::PreviousMonthClosed,
            passed,
            message: message.into(),
        }
    }
}
