//! # Selection Sheet Builder
//!
//! A library for deciding which statutory disclosure notes belong in a company's financial
//! statements, starting from its trial balance.
//!
//! ## Core Concepts
//!
//! - **Trial Balance**: Ledger lines with opening, debit, credit and closing amounts, each
//!   classified under a major head, minor head and grouping
//! - **Master Data**: The company's major → minor → grouping hierarchy. Deleted nodes are
//!   kept as `Inactive` so old trial balances still resolve
//! - **Disclosure Notes**: Configured sections of the statements, each driven by one or more
//!   major heads. Some notes are mandatory regardless of balances
//! - **Selection Sheet**: One row per note with the system recommendation and the
//!   preparer's final selection. Preparer overrides survive re-imports
//!
//! ## Example
//!
//! ```rust,ignore
//! use selection_sheet_builder::*;
//! use rust_decimal::Decimal;
//!
//! let mut hierarchy = MasterDataHierarchy::new("ACME".into());
//! hierarchy.add_major_head("PPE", "Property, Plant & Equipment", StatementType::BalanceSheet)?;
//! hierarchy.add_minor_head("PPE-T", "Tangible Assets", "PPE")?;
//! hierarchy.add_grouping("PPE-T-B", "Buildings", "PPE-T")?;
//!
//! let config = SelectionConfig::from_path("notes.json")?;
//! let lines = vec![LedgerLine {
//!     ledger_name: "Office Building".to_string(),
//!     opening_balance_cy: Decimal::new(500_000, 0),
//!     debit_cy: Decimal::ZERO,
//!     credit_cy: Decimal::ZERO,
//!     closing_balance_cy: Decimal::new(500_000, 0),
//!     closing_balance_py: Decimal::new(500_000, 0),
//!     statement_type: StatementType::BalanceSheet,
//!     major_head_id: "PPE".into(),
//!     minor_head_id: "PPE-T".into(),
//!     grouping_id: "PPE-T-B".into(),
//! }];
//!
//! let outcome = compute_selection_sheet(&config, &"ACME".into(), &lines, &hierarchy, &[])?;
//! let sheet = SelectionSheet::from(outcome);
//! ```

pub mod balance_check;
pub mod classification;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod ingestion;
pub mod license;
pub mod overrides;
pub mod schema;
pub mod selection_sheet;
pub mod utils;

pub use balance_check::{verify_trial_balance, BalanceCheck};
pub use classification::{
    ClassificationEngine, MajorHeadSummary, SelectionOutcome, DERIVED_NOTE_PREFIX,
};
pub use config::{NoteDefinition, SelectionConfig};
pub use error::{Result, SelectionSheetError};
pub use hierarchy::MasterDataHierarchy;
pub use ingestion::{resolve_rows, TrialBalanceRow};
pub use license::LicensePolicy;
pub use overrides::{SelectionModification, SelectionOverrides};
pub use schema::*;
pub use selection_sheet::SelectionSheet;

use log::{debug, info};

pub struct SelectionSheetProcessor;

impl SelectionSheetProcessor {
    pub fn process(
        config: &SelectionConfig,
        company_id: &CompanyId,
        lines: &[LedgerLine],
        hierarchy: &MasterDataHierarchy,
        prior: &[SelectionSheetEntry],
    ) -> Result<SelectionOutcome> {
        config.validate()?;

        info!("Processing selection sheet for company: {}", company_id);
        debug!(
            "Configuration contains {} notes ({} mandatory); prior sheet has {} entries",
            config.notes.len(),
            config.mandatory_notes.len(),
            prior.len()
        );

        let engine = ClassificationEngine::new(config);
        let outcome = engine.compute_selection_sheet(company_id, lines, hierarchy, prior)?;

        if !outcome.balance_check.is_balanced {
            info!(
                "Trial balance for {} is out by {}; continuing with selection",
                company_id, outcome.balance_check.difference
            );
        }

        Ok(outcome)
    }

    /// Resolves importer rows by head name, then computes the sheet.
    pub fn process_rows(
        config: &SelectionConfig,
        rows: &[TrialBalanceRow],
        hierarchy: &MasterDataHierarchy,
        prior: &[SelectionSheetEntry],
    ) -> Result<SelectionOutcome> {
        config.validate()?;

        if rows.is_empty() {
            return Err(SelectionSheetError::EmptyInput(
                hierarchy.company_id.to_string(),
            ));
        }

        let lines = resolve_rows(rows, hierarchy)?;
        Self::process(config, &hierarchy.company_id, &lines, hierarchy, prior)
    }
}

pub fn compute_selection_sheet(
    config: &SelectionConfig,
    company_id: &CompanyId,
    lines: &[LedgerLine],
    hierarchy: &MasterDataHierarchy,
    prior: &[SelectionSheetEntry],
) -> Result<SelectionOutcome> {
    SelectionSheetProcessor::process(config, company_id, lines, hierarchy, prior)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn hierarchy() -> MasterDataHierarchy {
        let mut h = MasterDataHierarchy::new("ACME".into());
        h.add_major_head("CASH", "Cash and Cash Equivalents", StatementType::BalanceSheet)
            .unwrap();
        h.add_minor_head("CASH-B", "Balances with Banks", "CASH")
            .unwrap();
        h.add_grouping("CASH-B-C", "Current Accounts", "CASH-B")
            .unwrap();
        h
    }

    fn config() -> SelectionConfig {
        SelectionConfig {
            notes: vec![NoteDefinition {
                note_ref: "N11".to_string(),
                description: "Cash and Cash Equivalents".to_string(),
                category: "Current assets".to_string(),
                major_heads: vec!["CASH".into()],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_processing() {
        let lines = vec![LedgerLine {
            ledger_name: "Bank Current A/c".to_string(),
            opening_balance_cy: Decimal::new(10_000, 0),
            debit_cy: Decimal::new(4_000, 0),
            credit_cy: Decimal::new(1_000, 0),
            closing_balance_cy: Decimal::new(13_000, 0),
            closing_balance_py: Decimal::new(10_000, 0),
            statement_type: StatementType::BalanceSheet,
            major_head_id: "CASH".into(),
            minor_head_id: "CASH-B".into(),
            grouping_id: "CASH-B-C".into(),
        }];

        let outcome =
            compute_selection_sheet(&config(), &"ACME".into(), &lines, &hierarchy(), &[]).unwrap();

        let entry = outcome.entry("N11").unwrap();
        assert!(entry.system_recommendation);
        assert!(entry.final_selection);
        // Single-sided ledger, so debits and credits differ.
        assert!(!outcome.balance_check.is_balanced);
        assert_eq!(outcome.warnings().len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected_before_processing() {
        let mut config = config();
        config.notes.push(config.notes[0].clone());

        let result = SelectionSheetProcessor::process(
            &config,
            &"ACME".into(),
            &[],
            &hierarchy(),
            &[],
        );
        assert!(matches!(
            result,
            Err(SelectionSheetError::InvalidConfiguration(_))
        ));

        let from_rows = SelectionSheetProcessor::process_rows(&config, &[], &hierarchy(), &[]);
        assert!(matches!(
            from_rows,
            Err(SelectionSheetError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_process_rows_resolves_names() {
        let rows = vec![TrialBalanceRow {
            ledger_name: "Bank Current A/c".to_string(),
            opening_balance_cy: Decimal::ZERO,
            debit_cy: Decimal::new(500, 0),
            credit_cy: Decimal::new(500, 0),
            closing_balance_cy: Decimal::ZERO,
            closing_balance_py: Decimal::ZERO,
            statement_type: StatementType::BalanceSheet,
            major_head: "Cash and Cash Equivalents".to_string(),
            minor_head: "Balances with Banks".to_string(),
            grouping: "Current Accounts".to_string(),
        }];

        let outcome =
            SelectionSheetProcessor::process_rows(&config(), &rows, &hierarchy(), &[]).unwrap();
        assert!(outcome.entry("N11").unwrap().system_recommendation);
        assert!(outcome.balance_check.is_balanced);

        let empty = SelectionSheetProcessor::process_rows(&config(), &[], &hierarchy(), &[]);
        assert!(matches!(empty, Err(SelectionSheetError::EmptyInput(_))));
    }
}
