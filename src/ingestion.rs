use crate::error::{Result, SelectionSheetError};
use crate::hierarchy::MasterDataHierarchy;
use crate::schema::{LedgerLine, StatementType};
use log::debug;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A trial-balance row as delivered by the spreadsheet importer, classified by head names
/// rather than ids.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TrialBalanceRow {
    pub ledger_name: String,
    pub opening_balance_cy: Decimal,
    pub debit_cy: Decimal,
    pub credit_cy: Decimal,
    pub closing_balance_cy: Decimal,
    pub closing_balance_py: Decimal,
    pub statement_type: StatementType,
    pub major_head: String,
    pub minor_head: String,
    pub grouping: String,
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Resolves head names to the company's active master-data ids.
pub fn resolve_rows(
    rows: &[TrialBalanceRow],
    hierarchy: &MasterDataHierarchy,
) -> Result<Vec<LedgerLine>> {
    let mut lines = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let invalid = |details: String| SelectionSheetError::ValidationError {
            line: row.ledger_name.clone(),
            details: format!("row #{}: {}", idx + 1, details),
        };

        let major = hierarchy
            .active_major_heads()
            .find(|h| same_name(&h.name, &row.major_head))
            .ok_or_else(|| invalid(format!("unknown major head '{}'", row.major_head)))?;

        let minor = hierarchy
            .minor_heads()
            .filter(|m| m.status.is_active() && m.major_head_id == major.id)
            .find(|m| same_name(&m.name, &row.minor_head))
            .ok_or_else(|| {
                invalid(format!(
                    "unknown minor head '{}' under '{}'",
                    row.minor_head, major.name
                ))
            })?;

        let grouping = hierarchy
            .groupings()
            .filter(|g| g.status.is_active() && g.minor_head_id == minor.id)
            .find(|g| same_name(&g.name, &row.grouping))
            .ok_or_else(|| {
                invalid(format!(
                    "unknown grouping '{}' under '{}'",
                    row.grouping, minor.name
                ))
            })?;

        lines.push(LedgerLine {
            ledger_name: row.ledger_name.clone(),
            opening_balance_cy: row.opening_balance_cy,
            debit_cy: row.debit_cy,
            credit_cy: row.credit_cy,
            closing_balance_cy: row.closing_balance_cy,
            closing_balance_py: row.closing_balance_py,
            statement_type: row.statement_type,
            major_head_id: major.id.clone(),
            minor_head_id: minor.id.clone(),
            grouping_id: grouping.id.clone(),
        });
    }

    debug!(
        "Resolved {} trial balance rows for company {}",
        lines.len(),
        hierarchy.company_id
    );

    Ok(lines)
}
