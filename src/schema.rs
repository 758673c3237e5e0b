use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Tenant identifier. Every hierarchy, ledger batch and selection sheet belongs to exactly one company.
    CompanyId
);
string_id!(MajorHeadId);
string_id!(MinorHeadId);
string_id!(GroupingId);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum StatementType {
    #[schemars(description = "Balance Sheet ledger (assets, liabilities, equity). Balances carry forward between periods.")]
    BalanceSheet,

    #[schemars(description = "Profit and Loss ledger (income and expenses). Balances reset every period.")]
    ProfitAndLoss,
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementType::BalanceSheet => f.write_str("Balance Sheet"),
            StatementType::ProfitAndLoss => f.write_str("Profit and Loss"),
        }
    }
}

/// Soft-delete state of a master-data node. Inactive nodes stay in the hierarchy so that
/// historical trial balances can still be read, but new ledger lines may not reference them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum NodeStatus {
    #[default]
    Active,
    Inactive,
}

impl NodeStatus {
    pub fn is_active(self) -> bool {
        self == NodeStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct MajorHead {
    pub id: MajorHeadId,
    pub name: String,
    pub statement_type: StatementType,
    #[serde(default)]
    pub status: NodeStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct MinorHead {
    pub id: MinorHeadId,
    pub name: String,
    pub major_head_id: MajorHeadId,
    #[serde(default)]
    pub status: NodeStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Grouping {
    pub id: GroupingId,
    pub name: String,
    pub minor_head_id: MinorHeadId,
    #[serde(default)]
    pub status: NodeStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct LedgerLine {
    #[schemars(description = "The ledger account name exactly as it appears in the trial balance (e.g., 'HDFC Bank Current A/c')")]
    pub ledger_name: String,

    #[schemars(description = "Opening balance for the current year. Debit balances positive, credit balances negative.")]
    pub opening_balance_cy: Decimal,

    #[schemars(description = "Total debits posted during the current year")]
    pub debit_cy: Decimal,

    #[schemars(description = "Total credits posted during the current year")]
    pub credit_cy: Decimal,

    #[schemars(description = "Closing balance for the current year. Expected to equal opening + debit - credit.")]
    pub closing_balance_cy: Decimal,

    #[schemars(description = "Closing balance for the previous year, used for comparatives")]
    pub closing_balance_py: Decimal,

    #[schemars(description = "Whether the ledger belongs to the Balance Sheet or the Profit and Loss statement")]
    pub statement_type: StatementType,

    #[schemars(description = "Identifier of the major head this ledger is classified under")]
    pub major_head_id: MajorHeadId,

    #[schemars(description = "Identifier of the minor head; must sit under the major head")]
    pub minor_head_id: MinorHeadId,

    #[schemars(description = "Identifier of the grouping; must sit under the minor head")]
    pub grouping_id: GroupingId,
}

impl LedgerLine {
    /// `opening + debit - credit - closing`. Zero when the accounting identity holds.
    pub fn identity_difference(&self) -> Decimal {
        self.opening_balance_cy + self.debit_cy - self.credit_cy - self.closing_balance_cy
    }

    /// True if any current-year amount exceeds the tolerance in absolute value.
    pub fn has_activity(&self, tolerance: Decimal) -> bool {
        [
            self.opening_balance_cy,
            self.debit_cy,
            self.credit_cy,
            self.closing_balance_cy,
        ]
        .iter()
        .any(|amount| amount.abs() > tolerance)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LedgerBatch {
    #[schemars(description = "The company the trial balance belongs to")]
    pub company_id: CompanyId,

    #[schemars(description = "Every ledger line of the trial balance for the reporting period")]
    pub lines: Vec<LedgerLine>,
}

impl LedgerBatch {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(LedgerBatch)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub enum EntryStatus {
    #[default]
    Active,
    /// The note no longer applies to the entity; kept for the preparer's audit trail.
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionSheetEntry {
    pub company_id: CompanyId,
    pub note_ref: String,
    pub description: String,
    pub category: String,
    pub system_recommendation: bool,
    pub final_selection: bool,
    /// Set once the preparer has chosen a value; untouched entries follow the recommendation.
    #[serde(default)]
    pub preparer_override: bool,
    #[serde(default)]
    pub status: EntryStatus,
}

impl SelectionSheetEntry {
    pub fn new(
        company_id: CompanyId,
        note_ref: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        system_recommendation: bool,
    ) -> Self {
        Self {
            company_id,
            note_ref: note_ref.into(),
            description: description.into(),
            category: category.into(),
            system_recommendation,
            final_selection: system_recommendation,
            preparer_override: false,
            status: EntryStatus::Active,
        }
    }

    pub fn override_selection(&mut self, include: bool) {
        self.final_selection = include;
        self.preparer_override = true;
    }

    pub fn reset_to_recommendation(&mut self) {
        self.final_selection = self.system_recommendation;
        self.preparer_override = false;
    }

    pub fn is_active(&self) -> bool {
        self.status == EntryStatus::Active
    }

    /// The preparer's choice differs from what the system recommends.
    pub fn diverges_from_recommendation(&self) -> bool {
        self.final_selection != self.system_recommendation
    }
}
