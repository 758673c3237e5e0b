use crate::error::{Result, SelectionSheetError};
use crate::schema::SelectionSheetEntry;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Preparer decisions recorded against a selection sheet.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct SelectionOverrides {
    #[schemars(description = "Ordered list of decisions; later entries win over earlier ones for the same note.")]
    #[serde(default)]
    pub modifications: Vec<SelectionModification>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SelectionModification {
    /// Force the note into the financial statements.
    Include {
        #[schemars(description = "Reference of the disclosure note.")]
        note_ref: String,
    },

    /// Leave the note out even if the system recommends it.
    Exclude {
        #[schemars(description = "Reference of the disclosure note.")]
        note_ref: String,
    },

    /// Drop the preparer's choice and follow the recommendation again.
    Reset { note_ref: String },

    /// Reset every active note.
    ResetAll,
}

impl SelectionOverrides {
    pub fn new(modifications: Vec<SelectionModification>) -> Self {
        Self { modifications }
    }

    /// Applies the decisions to a copy of the sheet; the input sheet is left as it was.
    pub fn apply(&self, sheet: &[SelectionSheetEntry]) -> Result<Vec<SelectionSheetEntry>> {
        let mut entries = sheet.to_vec();

        for modification in &self.modifications {
            apply_single_modification(&mut entries, modification)?;
        }

        Ok(entries)
    }
}

fn apply_single_modification(
    entries: &mut [SelectionSheetEntry],
    modification: &SelectionModification,
) -> Result<()> {
    match modification {
        SelectionModification::Include { note_ref } => {
            find_active_mut(entries, note_ref)?.override_selection(true);
        }

        SelectionModification::Exclude { note_ref } => {
            find_active_mut(entries, note_ref)?.override_selection(false);
        }

        SelectionModification::Reset { note_ref } => {
            find_active_mut(entries, note_ref)?.reset_to_recommendation();
        }

        SelectionModification::ResetAll => {
            for entry in entries.iter_mut().filter(|e| e.is_active()) {
                entry.reset_to_recommendation();
            }
        }
    }

    debug!("Applied selection modification {:?}", modification);
    Ok(())
}

fn find_active_mut<'a>(
    entries: &'a mut [SelectionSheetEntry],
    note_ref: &str,
) -> Result<&'a mut SelectionSheetEntry> {
    let entry = entries
        .iter_mut()
        .find(|e| e.note_ref == note_ref)
        .ok_or_else(|| SelectionSheetError::UnknownNote(note_ref.to_string()))?;

    if !entry.is_active() {
        return Err(SelectionSheetError::InactiveNote(note_ref.to_string()));
    }

    Ok(entry)
}
