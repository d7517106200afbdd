use std::collections::BTreeSet;

use sheetfuse_engine::Table;
use sheetfuse_io::SourceFile;

use crate::analyze::analyze_headers;
use crate::emptiness::{analyze_emptiness, apply_removal};
use crate::error::MergeError;
use crate::merge::merge_files;
use crate::model::{EmptinessReport, HeaderReport, MergedTable, SelectionMap};
use crate::plan::HeaderPlan;

/// One logical user session: the uploaded batch plus every derived
/// artifact, recomputed from current inputs and invalidated explicitly
/// when those inputs change. Nothing here is shared across sessions.
///
/// Invalidation rules:
/// - a new batch replaces everything;
/// - selection changes clear the header report and everything downstream;
/// - plan changes clear the merged table and everything downstream;
/// - the removal selection resets to the drop-recommended bucket whenever
///   the emptiness report is recomputed.
#[derive(Debug, Default)]
pub struct MergeSession {
    files: Vec<SourceFile>,
    selections: SelectionMap,
    plan: HeaderPlan,

    header_report: Option<HeaderReport>,
    merged: Option<MergedTable>,
    emptiness: Option<EmptinessReport>,
    removal: BTreeSet<String>,
}

impl MergeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole batch. All prior derived state is discarded, per
    /// the implicit-cancellation rule: a new upload invalidates in-flight
    /// results.
    pub fn load_batch(&mut self, files: Vec<SourceFile>) {
        self.selections = SelectionMap::defaults(&files);
        self.files = files;
        self.plan = HeaderPlan::new();
        self.invalidate_analysis();
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn selections(&self) -> &SelectionMap {
        &self.selections
    }

    pub fn plan(&self) -> &HeaderPlan {
        &self.plan
    }

    pub fn set_included(&mut self, file: &str, included: bool) -> Result<(), MergeError> {
        let selection = self
            .selections
            .get_mut(file)
            .ok_or_else(|| MergeError::UnknownFile(file.to_string()))?;
        selection.included = included;
        self.invalidate_analysis();
        Ok(())
    }

    /// Choose a sheet for a file. The sheet must be one the file actually
    /// has; selections built from the file's own sheet list can't violate
    /// this, but a caller that does gets a loud failure.
    pub fn set_sheet(&mut self, file: &str, sheet: &str) -> Result<(), MergeError> {
        let source = self
            .files
            .iter()
            .find(|f| f.name == file)
            .ok_or_else(|| MergeError::UnknownFile(file.to_string()))?;
        if source.sheet(sheet).is_none() {
            return Err(MergeError::InvalidSheetReference {
                file: file.to_string(),
                sheet: sheet.to_string(),
            });
        }
        if let Some(selection) = self.selections.get_mut(file) {
            selection.sheet = sheet.to_string();
        }
        self.invalidate_analysis();
        Ok(())
    }

    pub fn set_plan(&mut self, plan: HeaderPlan) {
        self.plan = plan;
        self.invalidate_merge();
    }

    /// Header union + mismatch analysis for the current selection.
    /// Computed on demand and cached until a selection changes.
    pub fn header_report(&mut self) -> Result<&HeaderReport, MergeError> {
        if self.header_report.is_none() {
            self.header_report = Some(analyze_headers(&self.files, &self.selections)?);
        }
        self.header_report
            .as_ref()
            .ok_or(MergeError::EmptySelection)
    }

    /// Run (or return the cached) merge. Unlike the free `merge_files`,
    /// the interactive path refuses an empty selection outright.
    pub fn merge(&mut self) -> Result<&MergedTable, MergeError> {
        self.ensure_merged()?;
        self.merged.as_ref().ok_or(MergeError::EmptySelection)
    }

    /// Emptiness report for the merged table, merging first if needed.
    /// Recomputation resets the removal selection to the drop-recommended
    /// bucket.
    pub fn emptiness_report(&mut self) -> Result<&EmptinessReport, MergeError> {
        self.ensure_merged()?;
        if self.emptiness.is_none() {
            if let Some(merged) = &self.merged {
                let report = analyze_emptiness(merged);
                self.removal = report.default_removal();
                self.emptiness = Some(report);
            }
        }
        self.emptiness.as_ref().ok_or(MergeError::EmptySelection)
    }

    pub fn removal(&self) -> &BTreeSet<String> {
        &self.removal
    }

    pub fn set_removal(&mut self, removal: BTreeSet<String>) {
        self.removal = removal;
    }

    /// Apply the current removal selection to the merged table. Pure: the
    /// merged table stays cached and can be pruned again under a different
    /// selection.
    pub fn pruned(&mut self) -> Result<Table, MergeError> {
        self.emptiness_report()?;
        match &self.merged {
            Some(merged) => Ok(apply_removal(&merged.table, &self.removal)),
            None => Err(MergeError::EmptySelection),
        }
    }

    fn ensure_merged(&mut self) -> Result<(), MergeError> {
        if !self.selections.any_included(&self.files) {
            return Err(MergeError::EmptySelection);
        }
        if self.merged.is_none() {
            self.merged = Some(merge_files(&self.files, &self.selections, &self.plan)?);
        }
        Ok(())
    }

    fn invalidate_analysis(&mut self) {
        self.header_report = None;
        self.invalidate_merge();
    }

    fn invalidate_merge(&mut self) {
        self.merged = None;
        self.emptiness = None;
        self.removal.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetfuse_io::ingest_bytes;

    fn session() -> MergeSession {
        let mut s = MergeSession::new();
        s.load_batch(vec![
            ingest_bytes("file1.csv", b"Name,Age,City\nJohn,25,Bangkok\nJane,30,Chiang Mai\n")
                .unwrap(),
            ingest_bytes("file2.csv", b"Name,Age,Country\nBob,35,Thailand\nAlice,28,Thailand\n")
                .unwrap(),
        ]);
        s
    }

    #[test]
    fn defaults_include_all_files_on_first_sheet() {
        let s = session();
        let sel = s.selections().get("file1.csv").unwrap();
        assert!(sel.included);
        assert_eq!(sel.sheet, "Sheet1");
    }

    #[test]
    fn merge_blocked_when_nothing_included() {
        let mut s = session();
        s.set_included("file1.csv", false).unwrap();
        s.set_included("file2.csv", false).unwrap();
        assert_eq!(s.merge().unwrap_err(), MergeError::EmptySelection);
    }

    #[test]
    fn selection_change_invalidates_cached_merge() {
        let mut s = session();
        assert_eq!(s.merge().unwrap().table.row_count(), 4);

        s.set_included("file2.csv", false).unwrap();
        assert_eq!(s.merge().unwrap().table.row_count(), 2);
    }

    #[test]
    fn repeated_merge_returns_cached_table() {
        let mut s = session();
        let first = s.merge().unwrap().clone();
        let second = s.merge().unwrap();
        assert_eq!(&first, second);
    }

    #[test]
    fn plan_change_invalidates_merge_but_not_headers() {
        let mut s = session();
        assert!(s.header_report().unwrap().has_mismatch);
        s.merge().unwrap();

        let mut plan = HeaderPlan::new();
        plan.rename("file2.csv", "Country", "City");
        s.set_plan(plan);

        let merged = s.merge().unwrap();
        assert!(!merged.table.columns().iter().any(|c| c == "Country"));
        // header report survives a plan change
        assert!(s.header_report().unwrap().has_mismatch);
    }

    #[test]
    fn set_sheet_rejects_unknown_sheet() {
        let mut s = session();
        let err = s.set_sheet("file1.csv", "Bogus").unwrap_err();
        assert_eq!(
            err,
            MergeError::InvalidSheetReference {
                file: "file1.csv".into(),
                sheet: "Bogus".into()
            }
        );
    }

    #[test]
    fn unknown_file_rejected() {
        let mut s = session();
        assert_eq!(
            s.set_included("nope.csv", true).unwrap_err(),
            MergeError::UnknownFile("nope.csv".into())
        );
    }

    #[test]
    fn removal_defaults_to_drop_bucket_and_prunes() {
        let mut s = MergeSession::new();
        // B is entirely empty across both files
        s.load_batch(vec![
            ingest_bytes("a.csv", b"A,B\n1,\n2,\n").unwrap(),
            ingest_bytes("b.csv", b"A,B\n3,\n4,\n").unwrap(),
        ]);

        s.emptiness_report().unwrap();
        assert_eq!(s.removal(), &BTreeSet::from(["B".to_string()]));

        let pruned = s.pruned().unwrap();
        assert_eq!(pruned.columns(), &["A", "_source_file"].map(String::from));
        assert_eq!(pruned.row_count(), 4);

        // adjust and re-prune without re-merging
        s.set_removal(BTreeSet::new());
        let repruned = s.pruned().unwrap();
        assert_eq!(repruned.column_count(), 3);
    }

    #[test]
    fn new_batch_discards_derived_state() {
        let mut s = session();
        s.merge().unwrap();

        s.load_batch(vec![ingest_bytes("solo.csv", b"X\n1\n").unwrap()]);
        let report = s.header_report().unwrap();
        assert_eq!(report.included_count, 1);
        assert!(!report.has_mismatch);
        assert_eq!(s.merge().unwrap().table.row_count(), 1);
    }
}
