use crate::cell::{CellValue, ScalarType};

/// A column-ordered table. Every row holds exactly one cell per declared
/// column; short rows are padded with `Missing` on insert, long rows are
/// truncated. Column names are unique within one table as produced by
/// ingestion — the table itself does not enforce or repair duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.columns.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row, normalizing its width to the declared columns.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        match row.len().cmp(&self.columns.len()) {
            std::cmp::Ordering::Less => row.resize(self.columns.len(), CellValue::Missing),
            std::cmp::Ordering::Greater => row.truncate(self.columns.len()),
            std::cmp::Ordering::Equal => {}
        }
        self.rows.push(row);
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Iterate one column's cells, top to bottom.
    pub fn column_values(&self, col: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().filter_map(move |r| r.get(col))
    }

    /// Inferred type of a column: the type of its first non-missing cell,
    /// `Unknown` when every cell is missing.
    pub fn column_type(&self, col: usize) -> ScalarType {
        self.column_values(col)
            .find(|c| !c.is_missing())
            .map(|c| c.scalar_type())
            .unwrap_or(ScalarType::Unknown)
    }

    /// Pure projection: a new table keeping only the named columns, in
    /// their current relative order. Rows are copied, never shared.
    pub fn select_columns<F>(&self, keep: F) -> Table
    where
        F: Fn(&str) -> bool,
    {
        let kept: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| keep(name))
            .map(|(i, _)| i)
            .collect();

        let columns = kept.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| kept.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Table { columns, rows }
    }
}
