use std::collections::HashMap;

use sheetfuse_io::SourceFile;

use crate::error::MergeError;
use crate::model::SelectionMap;

/// What to do with one original header before merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderAction {
    /// Pass through unchanged.
    Keep,
    /// Alias to a new final name (typically another file's header).
    Rename(String),
    /// Drop the column from this file's contribution.
    Exclude,
}

/// Per-file header decisions. Absent file or header means `Keep`; the
/// empty plan is the identity. Setting an action overwrites any earlier
/// one for the same header, so exclusion always wins over a prior rename.
#[derive(Debug, Clone, Default)]
pub struct HeaderPlan {
    actions: HashMap<String, HashMap<String, HeaderAction>>,
}

impl HeaderPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.values().all(|m| m.is_empty())
    }

    pub fn rename(&mut self, file: &str, header: &str, target: &str) -> &mut Self {
        self.set(file, header, HeaderAction::Rename(target.to_string()))
    }

    pub fn exclude(&mut self, file: &str, header: &str) -> &mut Self {
        self.set(file, header, HeaderAction::Exclude)
    }

    pub fn keep(&mut self, file: &str, header: &str) -> &mut Self {
        self.set(file, header, HeaderAction::Keep)
    }

    fn set(&mut self, file: &str, header: &str, action: HeaderAction) -> &mut Self {
        self.actions
            .entry(file.to_string())
            .or_default()
            .insert(header.to_string(), action);
        self
    }

    pub fn action(&self, file: &str, header: &str) -> &HeaderAction {
        self.actions
            .get(file)
            .and_then(|m| m.get(header))
            .unwrap_or(&HeaderAction::Keep)
    }

    pub fn is_excluded(&self, file: &str, header: &str) -> bool {
        matches!(self.action(file, header), HeaderAction::Exclude)
    }

    /// Final output name for a header, `None` if excluded.
    pub fn final_name(&self, file: &str, header: &str) -> Option<String> {
        match self.action(file, header) {
            HeaderAction::Keep => Some(header.to_string()),
            HeaderAction::Rename(target) => Some(target.clone()),
            HeaderAction::Exclude => None,
        }
    }

    /// Reject a plan where two surviving headers of one included file end
    /// up with the same final name. The original design let the later
    /// column silently overwrite the earlier; here that is a hard error.
    pub fn validate(&self, files: &[SourceFile], selections: &SelectionMap) -> Result<(), MergeError> {
        for file in files {
            let selection = selections.for_file(file);
            if !selection.included {
                continue;
            }

            let table = file
                .sheet(&selection.sheet)
                .ok_or_else(|| MergeError::InvalidSheetReference {
                    file: file.name.clone(),
                    sheet: selection.sheet.clone(),
                })?;

            let mut finals: Vec<String> = Vec::new();
            for header in table.columns() {
                if let Some(final_name) = self.final_name(&file.name, header) {
                    if finals.contains(&final_name) {
                        return Err(MergeError::DuplicateRenameTarget {
                            file: file.name.clone(),
                            target: final_name,
                        });
                    }
                    finals.push(final_name);
                }
            }
        }

        Ok(())
    }
}
