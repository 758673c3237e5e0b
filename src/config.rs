use crate::classification::DERIVED_NOTE_PREFIX;
use crate::error::{Result, SelectionSheetError};
use crate::license::LicensePolicy;
use crate::schema::MajorHeadId;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct NoteDefinition {
    #[schemars(description = "Stable note reference used as the selection-sheet key (e.g., 'N-03')")]
    pub note_ref: String,

    #[schemars(description = "Note title as printed in the financial statements")]
    pub description: String,

    #[schemars(description = "Grouping of the note on the selection sheet (e.g., 'Non-current assets')")]
    pub category: String,

    #[schemars(
        description = "Major heads whose balances drive this note. A note with more than one head is composite and is recommended when ANY of them is non-zero."
    )]
    pub major_heads: Vec<MajorHeadId>,
}

impl NoteDefinition {
    pub fn is_composite(&self) -> bool {
        self.major_heads.len() > 1
    }
}

fn default_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

fn default_aging_buckets() -> Vec<u32> {
    vec![30, 60, 90, 180, 365]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SelectionConfig {
    #[schemars(description = "Note-to-major-head mapping table, in presentation order")]
    #[serde(default)]
    pub notes: Vec<NoteDefinition>,

    #[schemars(description = "Note references that must always appear, even with nil balances")]
    #[serde(default)]
    pub mandatory_notes: BTreeSet<String>,

    #[schemars(description = "An amount counts as non-zero only when its absolute value exceeds this tolerance")]
    #[serde(default = "default_tolerance")]
    pub zero_balance_tolerance: Decimal,

    #[schemars(description = "Maximum accepted difference between total debits and total credits")]
    #[serde(default = "default_tolerance")]
    pub balance_tolerance: Decimal,

    #[schemars(description = "Receivable/payable aging boundaries in days, strictly ascending")]
    #[serde(default = "default_aging_buckets")]
    pub aging_buckets: Vec<u32>,

    #[serde(default)]
    pub license: LicensePolicy,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            notes: Vec::new(),
            mandatory_notes: BTreeSet::new(),
            zero_balance_tolerance: default_tolerance(),
            balance_tolerance: default_tolerance(),
            aging_buckets: default_aging_buckets(),
            license: LicensePolicy::Disabled,
        }
    }
}

impl SelectionConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SelectionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SelectionConfig)
    }

    pub fn note(&self, note_ref: &str) -> Option<&NoteDefinition> {
        self.notes.iter().find(|n| n.note_ref == note_ref)
    }

    pub fn is_mandatory(&self, note_ref: &str) -> bool {
        self.mandatory_notes.contains(note_ref)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for note in &self.notes {
            if note.note_ref.trim().is_empty() {
                return Err(SelectionSheetError::InvalidConfiguration(format!(
                    "Note '{}' has an empty note reference",
                    note.description
                )));
            }
            if note.note_ref.starts_with(DERIVED_NOTE_PREFIX) {
                return Err(SelectionSheetError::InvalidConfiguration(format!(
                    "Note reference '{}' uses the '{}' prefix reserved for derived notes",
                    note.note_ref, DERIVED_NOTE_PREFIX
                )));
            }
            if !seen.insert(note.note_ref.as_str()) {
                return Err(SelectionSheetError::InvalidConfiguration(format!(
                    "Duplicate note reference '{}'",
                    note.note_ref
                )));
            }
        }

        for note_ref in &self.mandatory_notes {
            if !seen.contains(note_ref.as_str()) {
                return Err(SelectionSheetError::InvalidConfiguration(format!(
                    "Mandatory note '{}' is not in the note mapping table",
                    note_ref
                )));
            }
        }

        if self.zero_balance_tolerance.is_sign_negative() {
            return Err(SelectionSheetError::InvalidConfiguration(format!(
                "Zero-balance tolerance {} must not be negative",
                self.zero_balance_tolerance
            )));
        }

        if self.balance_tolerance.is_sign_negative() {
            return Err(SelectionSheetError::InvalidConfiguration(format!(
                "Balance tolerance {} must not be negative",
                self.balance_tolerance
            )));
        }

        if self.aging_buckets.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(SelectionSheetError::InvalidConfiguration(format!(
                "Aging buckets {:?} must be strictly ascending",
                self.aging_buckets
            )));
        }

        Ok(())
    }
}
