use bytes::Bytes;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use std::io::Cursor;

use crate::error::AppError;
use crate::models::{Sheet, Table, Workbook};

/// Parses uploaded XLSX bytes into a [`Workbook`].
///
/// Every sheet in the container is read; the publisher column may live in an
/// arbitrary subset of them, so none can be skipped up front. The first row
/// of each sheet is taken as the header, remaining rows as data.
pub fn load_workbook(file_data: Bytes) -> Result<Workbook, AppError> {
    let cursor = Cursor::new(file_data);

    let mut xlsx: Xlsx<_> = open_workbook_from_rs(cursor).map_err(|e| {
        tracing::error!("Failed to open Excel file: {}", e);
        AppError::Format(format!("Failed to open Excel file: {}", e))
    })?;

    let sheet_names = xlsx.sheet_names().to_vec();
    tracing::info!("Found {} sheets: {:?}", sheet_names.len(), sheet_names);

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = xlsx.worksheet_range(sheet_name).map_err(|e| {
            tracing::error!("Failed to read worksheet {}: {}", sheet_name, e);
            AppError::SheetRead {
                sheet: sheet_name.clone(),
                message: e.to_string(),
            }
        })?;

        let mut rows = range.rows();
        let columns: Vec<String> = rows
            .next()
            .map(|header| header.iter().map(|cell| cell.to_string()).collect())
            .unwrap_or_default();

        // Ranges are rectangular, but pad defensively so every row matches
        // the header width.
        let rows: Vec<Vec<Data>> = rows
            .map(|row| {
                (0..columns.len())
                    .map(|idx| row.get(idx).cloned().unwrap_or(Data::Empty))
                    .collect()
            })
            .collect();

        tracing::info!(
            "Sheet '{}': {} columns, {} rows",
            sheet_name,
            columns.len(),
            rows.len()
        );

        sheets.push(Sheet {
            name: sheet_name.clone(),
            table: Table { columns, rows },
        });
    }

    Ok(Workbook { sheets })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xlsx_bytes(build: impl FnOnce(&mut rust_xlsxwriter::Workbook)) -> Bytes {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        build(&mut workbook);
        workbook.save_to_buffer().unwrap().into()
    }

    #[test]
    fn loads_all_sheets_in_order() {
        let data = xlsx_bytes(|workbook| {
            let first = workbook.add_worksheet();
            first.set_name("Revenue").unwrap();
            first.write_string(0, 0, "Publisher").unwrap();
            first.write_string(0, 1, "Amount").unwrap();
            first.write_string(1, 0, "Acme").unwrap();
            first.write_number(1, 1, 12.5).unwrap();

            let second = workbook.add_worksheet();
            second.set_name("Empty").unwrap();
        });

        let workbook = load_workbook(data).unwrap();
        assert_eq!(workbook.sheets.len(), 2);
        assert_eq!(workbook.sheets[0].name, "Revenue");
        assert_eq!(
            workbook.sheets[0].table.columns,
            vec!["Publisher", "Amount"]
        );
        assert_eq!(
            workbook.sheets[0].table.rows,
            vec![vec![Data::String("Acme".into()), Data::Float(12.5)]]
        );
        assert_eq!(workbook.sheets[1].name, "Empty");
        assert!(workbook.sheets[1].table.columns.is_empty());
        assert!(workbook.sheets[1].table.is_empty());
    }

    #[test]
    fn rejects_bytes_that_are_not_a_workbook() {
        let err = load_workbook(Bytes::from_static(b"definitely not a zip")).unwrap_err();
        assert!(matches!(err, AppError::Format(_)));
    }
}
