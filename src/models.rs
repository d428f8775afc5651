use calamine::Data;

/// An uploaded workbook: an ordered mapping of sheet name to table.
/// Built once per upload and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub table: Table,
}

/// A rectangular block of data: a header row of column names followed by
/// data rows. Every row has exactly one cell per column.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Data>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One publisher's share of the upload: for every qualifying sheet with at
/// least one matching row, a filtered copy of that sheet.
#[derive(Debug, Clone)]
pub struct Report {
    pub publisher: Data,
    pub sheets: Vec<Sheet>,
}

/// Result of partitioning a workbook by publisher.
///
/// The two empty outcomes are expected conditions the caller must branch on,
/// not errors: the user can recover from both by re-uploading a fixed file.
#[derive(Debug)]
pub enum PartitionOutcome {
    /// No sheet contains the publisher column.
    NoQualifyingSheets,
    /// Qualifying sheets exist but the publisher column is entirely blank.
    NoPublishers,
    Partitioned(Partition),
}

#[derive(Debug)]
pub struct Partition {
    /// Names of the sheets that contain the publisher column, in workbook order.
    pub qualifying_sheets: Vec<String>,
    /// Distinct publisher values in first-appearance order (sheet order, then
    /// row order within a sheet).
    pub publishers: Vec<Data>,
    /// One report per publisher, in the same order as `publishers`.
    pub reports: Vec<Report>,
}
