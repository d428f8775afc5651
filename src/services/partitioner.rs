use calamine::Data;

use crate::models::{Partition, PartitionOutcome, Report, Sheet, Table, Workbook};

/// The identifier column a sheet must carry to take part in the split.
pub const PUBLISHER_COLUMN: &str = "Publisher";

/// Splits a workbook into one report per distinct publisher value.
///
/// Publisher comparison is exact raw-cell equality. Two values differing only
/// in case or whitespace are distinct publishers; blank cells never become a
/// publisher.
pub fn partition(workbook: &Workbook) -> PartitionOutcome {
    let mut qualifying: Vec<(&Sheet, usize)> = Vec::new();
    for sheet in &workbook.sheets {
        match sheet.table.column_index(PUBLISHER_COLUMN) {
            Some(idx) => {
                tracing::info!("Sheet '{}' qualifies ({} rows)", sheet.name, sheet.table.rows.len());
                qualifying.push((sheet, idx));
            }
            None => {
                tracing::info!(
                    "Sheet '{}' has no '{}' column, ignoring",
                    sheet.name,
                    PUBLISHER_COLUMN
                );
            }
        }
    }

    if qualifying.is_empty() {
        return PartitionOutcome::NoQualifyingSheets;
    }

    // Distinct publishers in first-appearance order: sheet order, then row
    // order within a sheet.
    let mut publishers: Vec<Data> = Vec::new();
    for (sheet, idx) in &qualifying {
        for row in &sheet.table.rows {
            let value = row.get(*idx).unwrap_or(&Data::Empty);
            if matches!(value, Data::Empty) {
                continue;
            }
            if !publishers.contains(value) {
                publishers.push(value.clone());
            }
        }
    }

    if publishers.is_empty() {
        return PartitionOutcome::NoPublishers;
    }

    let reports = publishers
        .iter()
        .map(|publisher| {
            let sheets = qualifying
                .iter()
                .filter_map(|(sheet, idx)| {
                    let rows: Vec<Vec<Data>> = sheet
                        .table
                        .rows
                        .iter()
                        .filter(|row| row.get(*idx).unwrap_or(&Data::Empty) == publisher)
                        .cloned()
                        .collect();
                    if rows.is_empty() {
                        // A sheet with nothing for this publisher contributes
                        // no sheet to the report at all.
                        return None;
                    }
                    Some(Sheet {
                        name: sheet.name.clone(),
                        table: Table {
                            columns: sheet.table.columns.clone(),
                            rows,
                        },
                    })
                })
                .collect();
            Report {
                publisher: publisher.clone(),
                sheets,
            }
        })
        .collect();

    PartitionOutcome::Partitioned(Partition {
        qualifying_sheets: qualifying.iter().map(|(s, _)| s.name.clone()).collect(),
        publishers,
        reports,
    })
}
