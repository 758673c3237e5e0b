use crate::classification::SelectionOutcome;
use crate::schema::{CompanyId, EntryStatus, SelectionSheetEntry};
use crate::utils::csv_field;
use serde::{Deserialize, Serialize};

/// A company's selection sheet, ready to hand to the storage layer or a reviewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectionSheet {
    pub company_id: CompanyId,
    pub entries: Vec<SelectionSheetEntry>,
}

impl From<SelectionOutcome> for SelectionSheet {
    fn from(outcome: SelectionOutcome) -> Self {
        Self {
            company_id: outcome.company_id,
            entries: outcome.entries,
        }
    }
}

impl SelectionSheet {
    pub fn new(company_id: CompanyId, entries: Vec<SelectionSheetEntry>) -> Self {
        Self {
            company_id,
            entries,
        }
    }

    /// Active notes the preparer has chosen to include.
    pub fn included(&self) -> impl Iterator<Item = &SelectionSheetEntry> {
        self.entries
            .iter()
            .filter(|e| e.is_active() && e.final_selection)
    }

    pub fn overridden(&self) -> impl Iterator<Item = &SelectionSheetEntry> {
        self.entries.iter().filter(|e| e.preparer_override)
    }

    pub fn recommendation_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.is_active() && e.system_recommendation)
            .count()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str(
            "Company,Note Ref,Description,Category,System Recommendation,Final Selection,Overridden,Status\n",
        );

        for entry in &self.entries {
            output.push_str(&format!(
                "{},{},{},{},{},{},{},{:?}\n",
                csv_field(entry.company_id.as_str()),
                csv_field(&entry.note_ref),
                csv_field(&entry.description),
                csv_field(&entry.category),
                entry.system_recommendation,
                entry.final_selection,
                entry.preparer_override,
                entry.status
            ));
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Selection Sheet - {}\n\n", self.company_id));
        output.push_str("| Note | Description | Category | Recommended | Selected |\n");
        output.push_str("|---|---|---|---|---|\n");

        for entry in self.entries.iter().filter(|e| e.is_active()) {
            let marker = if entry.preparer_override {
                " **[OVERRIDE]**"
            } else {
                ""
            };
            output.push_str(&format!(
                "| {} | {} | {} | {} | {}{} |\n",
                entry.note_ref,
                entry.description,
                entry.category,
                yes_no(entry.system_recommendation),
                yes_no(entry.final_selection),
                marker
            ));
        }
        output.push('\n');

        let retired: Vec<&SelectionSheetEntry> = self
            .entries
            .iter()
            .filter(|e| e.status == EntryStatus::Inactive)
            .collect();
        if !retired.is_empty() {
            output.push_str("## No Longer Applicable\n\n");
            for entry in retired {
                output.push_str(&format!("- {} {}\n", entry.note_ref, entry.description));
            }
            output.push('\n');
        }

        output
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}
