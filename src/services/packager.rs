use calamine::Data;
use chrono::{DateTime, Utc};
use rust_xlsxwriter::Worksheet;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::NamingConvention;
use crate::error::AppError;
use crate::models::Report;

/// Fixed name of the downloadable bundle.
pub const ARCHIVE_FILENAME: &str = "All_Publisher_Reports.zip";

/// Serializes every report to XLSX and bundles them into one deflate zip.
///
/// Entry names follow the configured naming convention; when two publishers
/// sanitize to the same filename the later one gets a numeric suffix instead
/// of overwriting the earlier entry.
pub fn build_archive(
    reports: &[Report],
    source_stem: &str,
    generated_at: DateTime<Utc>,
    naming: NamingConvention,
) -> Result<Vec<u8>, AppError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut used_names = HashSet::new();
    for report in reports {
        let bytes = serialize_report(report)?;
        let stem = report_stem(&report.publisher, source_stem, generated_at, naming);
        let filename = unique_filename(&stem, &mut used_names);

        zip.start_file(filename.clone(), options)
            .map_err(|e| AppError::Internal(format!("Failed to add archive entry: {}", e)))?;
        zip.write_all(&bytes)?;

        tracing::info!(
            "Generated report for publisher '{}': {} ({} sheets, {} bytes)",
            report.publisher,
            filename,
            report.sheets.len(),
            bytes.len()
        );
    }

    let cursor = zip
        .finish()
        .map_err(|e| AppError::Internal(format!("Failed to finish archive: {}", e)))?;
    Ok(cursor.into_inner())
}

/// Serializes one publisher's report to a multi-sheet XLSX document.
///
/// Sheet names, column order and row order are carried over from the source
/// workbook unchanged.
pub fn serialize_report(report: &Report) -> Result<Vec<u8>, AppError> {
    let mut workbook = rust_xlsxwriter::Workbook::new();

    for sheet in &report.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .map_err(|e| AppError::Serialization(format!("Invalid sheet name '{}': {}", sheet.name, e)))?;

        for (col, name) in sheet.table.columns.iter().enumerate() {
            worksheet
                .write_string(0, col as u16, name)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
        }
        for (row_idx, row) in sheet.table.rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                write_cell(worksheet, (row_idx + 1) as u32, col as u16, value).map_err(|e| {
                    match e {
                        AppError::Serialization(msg) => AppError::Serialization(format!(
                            "Sheet '{}', row {}: {}",
                            sheet.name,
                            row_idx + 1,
                            msg
                        )),
                        other => other,
                    }
                })?;
            }
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| AppError::Serialization(format!("Failed to write workbook: {}", e)))
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Data,
) -> Result<(), AppError> {
    let written = match value {
        Data::Empty => return Ok(()),
        Data::String(s) => worksheet.write_string(row, col, s),
        Data::Float(f) => worksheet.write_number(row, col, *f),
        Data::Int(i) => worksheet.write_number(row, col, *i as f64),
        Data::Bool(b) => worksheet.write_boolean(row, col, *b),
        // Serial datetimes survive as their numeric value; the consumer can
        // re-apply a date format.
        Data::DateTime(dt) => worksheet.write_number(row, col, dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => worksheet.write_string(row, col, s),
        Data::Error(e) => {
            return Err(AppError::Serialization(format!(
                "unsupported cell value {:?}",
                e
            )))
        }
    };
    written.map_err(|e| AppError::Serialization(e.to_string()))?;
    Ok(())
}

fn report_stem(
    publisher: &Data,
    source_stem: &str,
    generated_at: DateTime<Utc>,
    naming: NamingConvention,
) -> String {
    let safe_name = sanitize_publisher(&publisher.to_string());
    match naming {
        NamingConvention::Simple => format!("{}_Report", safe_name),
        NamingConvention::Full => format!(
            "{}_{}_{}",
            safe_name,
            source_stem,
            generated_at.format("%Y%m%d_%H%M%S")
        ),
    }
}

/// Keeps alphanumerics, spaces, underscores and hyphens; everything else is
/// stripped, not replaced. Trailing whitespace is trimmed.
fn sanitize_publisher(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn unique_filename(stem: &str, used_names: &mut HashSet<String>) -> String {
    let mut candidate = format!("{}.xlsx", stem);
    let mut counter = 1;
    while !used_names.insert(candidate.clone()) {
        candidate = format!("{}_{}.xlsx", stem, counter);
        counter += 1;
    }
    candidate
}
