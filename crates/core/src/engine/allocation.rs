//! Allocation batch execution
//!
//! Redistributes source amounts across target departments per rule. Every
//! rule result is computed before any line is written, so a batch either
//! reports all rules or fails as a whole.

use polars::prelude::{col, df, lit, DataFrame, LazyFrame};
use tracing::debug;

use crate::engine::error::AllocationError;
use crate::model::{AllocationRule, AllocationRuleResult, DriverType};

#[derive(Debug)]
pub struct AllocationBatch {
    pub results: Vec<AllocationRuleResult>,
    /// One row per (rule, target department): `rule_id`, `department`,
    /// `amount`.
    pub lines: DataFrame,
}

/// Run every rule against the period's ledger and build the combined
/// allocation lines frame. Pure with respect to storage; the caller decides
/// whether the lines are persisted.
pub fn execute_allocation(
    ledger: LazyFrame,
    rules: &[AllocationRule],
) -> Result<AllocationBatch, AllocationError> {
    let mut results = Vec::with_capacity(rules.len());
    let mut line_rule_ids: Vec<String> = Vec::new();
    let mut line_departments: Vec<String> = Vec::new();
    let mut line_amounts: Vec<f64> = Vec::new();

    for rule in rules {
        let source_amount = source_amount(ledger.clone(), rule)?;
        let shares = split_amount(rule, source_amount)?;
        let allocated_amount: f64 = shares.iter().map(|(_, amount)| amount).sum();

        debug!(
            rule = %rule.name,
            source_amount,
            allocated_amount,
            targets = rule.targets.len(),
            "allocation rule computed"
        );

        for (department, amount) in shares {
            line_rule_ids.push(rule.id.to_string());
            line_departments.push(department);
            line_amounts.push(amount);
        }

        results.push(AllocationRuleResult {
            rule_id: rule.id,
            rule_name: rule.name.clone(),
            source_amount,
            allocated_amount,
            target_count: rule.targets.len(),
        });
    }

    let lines = df! {
        "rule_id" => line_rule_ids,
        "department" => line_departments,
        "amount" => line_amounts,
    }
    .map_err(|error| AllocationError::Engine {
        message: error.to_string(),
    })?;

    Ok(AllocationBatch { results, lines })
}

fn source_amount(ledger: LazyFrame, rule: &AllocationRule) -> Result<f64, AllocationError> {
    let mut selector = col("account").eq(lit(rule.source_account.clone()));
    if let Some(department) = &rule.source_department {
        selector = selector.and(col("department").eq(lit(department.clone())));
    }

    let totals = ledger
        .filter(selector)
        .select([col("amount").sum().alias("total")])
        .collect()
        .map_err(|error| AllocationError::Engine {
            message: error.to_string(),
        })?;

    let total = totals
        .column("total")
        .and_then(|column| column.f64().map(|chunked| chunked.get(0)))
        .map_err(|error| AllocationError::Engine {
            message: error.to_string(),
        })?;

    // An empty source selection is a zero-amount rule, not an error.
    Ok(total.unwrap_or(0.0))
}

fn split_amount(
    rule: &AllocationRule,
    source_amount: f64,
) -> Result<Vec<(String, f64)>, AllocationError> {
    if rule.targets.is_empty() {
        return Err(AllocationError::RuleFailed {
            rule: rule.name.clone(),
            message: "rule has no targets".to_string(),
        });
    }

    match rule.driver {
        DriverType::Ratio => {
            let total_weight: f64 = rule.targets.iter().map(|target| target.ratio).sum();
            if total_weight <= 0.0 {
                return Err(AllocationError::RuleFailed {
                    rule: rule.name.clone(),
                    message: "ratio targets must have a positive total weight".to_string(),
                });
            }
            Ok(rule
                .targets
                .iter()
                .map(|target| {
                    (
                        target.department.clone(),
                        source_amount * target.ratio / total_weight,
                    )
                })
                .collect())
        }
        DriverType::Even => {
            let share = source_amount / rule.targets.len() as f64;
            Ok(rule
                .targets
                .iter()
                .map(|target| (target.department.clone(), share))
                .collect())
        }
    }
}
