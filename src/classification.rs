use crate::balance_check::{verify_trial_balance, BalanceCheck};
use crate::config::SelectionConfig;
use crate::error::{Result, SelectionSheetError};
use crate::hierarchy::MasterDataHierarchy;
use crate::schema::{
    CompanyId, EntryStatus, LedgerLine, MajorHeadId, SelectionSheetEntry,
};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MajorHeadSummary {
    pub major_head_id: MajorHeadId,
    pub line_count: usize,
    pub is_nonzero: bool,
    pub closing_balance_cy: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionOutcome {
    pub company_id: CompanyId,
    pub entries: Vec<SelectionSheetEntry>,
    pub balance_check: BalanceCheck,
    pub major_head_summaries: Vec<MajorHeadSummary>,
}

impl SelectionOutcome {
    pub fn entry(&self, note_ref: &str) -> Option<&SelectionSheetEntry> {
        self.entries.iter().find(|e| e.note_ref == note_ref)
    }

    pub fn warnings(&self) -> &[String] {
        &self.balance_check.warnings
    }
}

/// Prefix of the note reference given to a non-zero major head that has no configured note.
pub const DERIVED_NOTE_PREFIX: &str = "MH-";

pub struct ClassificationEngine<'a> {
    config: &'a SelectionConfig,
}

impl<'a> ClassificationEngine<'a> {
    pub fn new(config: &'a SelectionConfig) -> Self {
        Self { config }
    }

    pub fn compute_selection_sheet(
        &self,
        company_id: &CompanyId,
        lines: &[LedgerLine],
        hierarchy: &MasterDataHierarchy,
        prior: &[SelectionSheetEntry],
    ) -> Result<SelectionOutcome> {
        self.config.validate()?;

        if lines.is_empty() {
            return Err(SelectionSheetError::EmptyInput(company_id.to_string()));
        }

        self.validate_scope(company_id, hierarchy, prior)?;
        for line in lines {
            hierarchy.validate_line(line)?;
        }

        info!(
            "Computing selection sheet for company {} from {} ledger lines",
            company_id,
            lines.len()
        );

        let summaries = self.summarize_major_heads(lines);
        let nonzero_heads: HashSet<&MajorHeadId> = summaries
            .values()
            .filter(|s| s.is_nonzero)
            .map(|s| &s.major_head_id)
            .collect();

        let mut fresh = self.recommend_configured_notes(company_id, &nonzero_heads);
        fresh.extend(self.derive_unmapped_notes(company_id, hierarchy, &summaries));

        let entries = merge_with_prior(fresh, prior);

        let balance_check = verify_trial_balance(lines, self.config.balance_tolerance);

        debug!(
            "Selection sheet for {}: {} entries, {} recommended, {} warnings",
            company_id,
            entries.len(),
            entries.iter().filter(|e| e.system_recommendation).count(),
            balance_check.warnings.len()
        );

        Ok(SelectionOutcome {
            company_id: company_id.clone(),
            entries,
            balance_check,
            major_head_summaries: summaries.into_values().collect(),
        })
    }

    fn validate_scope(
        &self,
        company_id: &CompanyId,
        hierarchy: &MasterDataHierarchy,
        prior: &[SelectionSheetEntry],
    ) -> Result<()> {
        if &hierarchy.company_id != company_id {
            return Err(SelectionSheetError::ValidationError {
                line: String::new(),
                details: format!(
                    "master data belongs to company {}, not {}",
                    hierarchy.company_id, company_id
                ),
            });
        }

        if let Some(foreign) = prior.iter().find(|e| &e.company_id != company_id) {
            return Err(SelectionSheetError::ValidationError {
                line: String::new(),
                details: format!(
                    "prior selection entry {} belongs to company {}, not {}",
                    foreign.note_ref, foreign.company_id, company_id
                ),
            });
        }

        Ok(())
    }

    fn summarize_major_heads(&self, lines: &[LedgerLine]) -> BTreeMap<MajorHeadId, MajorHeadSummary> {
        let tolerance = self.config.zero_balance_tolerance;
        let mut summaries: BTreeMap<MajorHeadId, MajorHeadSummary> = BTreeMap::new();

        for line in lines {
            let summary = summaries
                .entry(line.major_head_id.clone())
                .or_insert_with(|| MajorHeadSummary {
                    major_head_id: line.major_head_id.clone(),
                    line_count: 0,
                    is_nonzero: false,
                    closing_balance_cy: Decimal::ZERO,
                });

            summary.line_count += 1;
            summary.closing_balance_cy += line.closing_balance_cy;
            summary.is_nonzero |= line.has_activity(tolerance);
        }

        summaries
    }

    fn recommend_configured_notes(
        &self,
        company_id: &CompanyId,
        nonzero_heads: &HashSet<&MajorHeadId>,
    ) -> Vec<SelectionSheetEntry> {
        self.config
            .notes
            .iter()
            .map(|note| {
                let mandatory = self.config.is_mandatory(&note.note_ref);
                // Composite notes: any contributing head with a balance is enough.
                let has_balance = note.major_heads.iter().any(|h| nonzero_heads.contains(h));

                SelectionSheetEntry::new(
                    company_id.clone(),
                    note.note_ref.clone(),
                    note.description.clone(),
                    note.category.clone(),
                    mandatory || has_balance,
                )
            })
            .collect()
    }

    fn derive_unmapped_notes(
        &self,
        company_id: &CompanyId,
        hierarchy: &MasterDataHierarchy,
        summaries: &BTreeMap<MajorHeadId, MajorHeadSummary>,
    ) -> Vec<SelectionSheetEntry> {
        let mapped: HashSet<&MajorHeadId> = self
            .config
            .notes
            .iter()
            .flat_map(|n| n.major_heads.iter())
            .collect();

        summaries
            .values()
            .filter(|s| s.is_nonzero && !mapped.contains(&s.major_head_id))
            .filter_map(|s| hierarchy.major_head(&s.major_head_id))
            .map(|head| {
                warn!(
                    "Major head '{}' ({}) has balances but no disclosure note; deriving one",
                    head.id, head.name
                );
                SelectionSheetEntry::new(
                    company_id.clone(),
                    format!("{}{}", DERIVED_NOTE_PREFIX, head.id),
                    head.name.clone(),
                    head.statement_type.to_string(),
                    true,
                )
            })
            .collect()
    }
}

/// Carries the preparer's decisions from the previous sheet into freshly computed entries.
///
/// Overridden entries keep their `final_selection`; untouched ones follow the new
/// recommendation. Prior entries with no fresh counterpart are kept as inactive rows.
fn merge_with_prior(
    fresh: Vec<SelectionSheetEntry>,
    prior: &[SelectionSheetEntry],
) -> Vec<SelectionSheetEntry> {
    let prior_by_ref: HashMap<&str, &SelectionSheetEntry> =
        prior.iter().map(|e| (e.note_ref.as_str(), e)).collect();
    let fresh_refs: HashSet<String> = fresh.iter().map(|e| e.note_ref.clone()).collect();

    let mut entries: Vec<SelectionSheetEntry> = fresh
        .into_iter()
        .map(|mut entry| {
            if let Some(previous) = prior_by_ref.get(entry.note_ref.as_str()) {
                if previous.preparer_override {
                    entry.final_selection = previous.final_selection;
                    entry.preparer_override = true;
                }
            }
            entry
        })
        .collect();

    let mut retired = HashSet::new();
    for previous in prior {
        if fresh_refs.contains(&previous.note_ref) || !retired.insert(previous.note_ref.as_str()) {
            continue;
        }
        if previous.is_active() {
            debug!("Note {} no longer applies; marking inactive", previous.note_ref);
        }
        let mut inactive = previous.clone();
        inactive.system_recommendation = false;
        inactive.status = EntryStatus::Inactive;
        entries.push(inactive);
    }

    entries
}
