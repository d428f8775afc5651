pub mod loader;
pub mod packager;
pub mod partitioner;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamingConvention;
    use crate::models::PartitionOutcome;
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use chrono::TimeZone;
    use std::io::{Cursor, Read};

    /// Builds the CRM/Adjust fixture from the upload the pipeline was written
    /// for: two qualifying sheets plus one sheet without a Publisher column.
    fn fixture_bytes() -> bytes::Bytes {
        let mut workbook = rust_xlsxwriter::Workbook::new();

        let crm = workbook.add_worksheet();
        crm.set_name("CRM").unwrap();
        crm.write_string(0, 0, "Publisher").unwrap();
        crm.write_string(0, 1, "Amount").unwrap();
        for (i, (publisher, amount)) in [("A", 10.0), ("B", 20.0), ("A", 5.0)].iter().enumerate() {
            crm.write_string((i + 1) as u32, 0, *publisher).unwrap();
            crm.write_number((i + 1) as u32, 1, *amount).unwrap();
        }

        let adjust = workbook.add_worksheet();
        adjust.set_name("Adjust").unwrap();
        adjust.write_string(0, 0, "Publisher").unwrap();
        adjust.write_string(0, 1, "Clicks").unwrap();
        adjust.write_string(1, 0, "A").unwrap();
        adjust.write_number(1, 1, 100.0).unwrap();
        adjust.write_string(2, 0, "C").unwrap();
        adjust.write_number(2, 1, 7.0).unwrap();

        let notes = workbook.add_worksheet();
        notes.set_name("Notes").unwrap();
        notes.write_string(0, 0, "Comment").unwrap();
        notes.write_string(1, 0, "not per-publisher").unwrap();

        workbook.save_to_buffer().unwrap().into()
    }

    #[test]
    fn end_to_end_upload_to_archive() {
        let workbook = loader::load_workbook(fixture_bytes()).unwrap();
        let PartitionOutcome::Partitioned(partition) = partitioner::partition(&workbook) else {
            panic!("expected a partition");
        };

        assert_eq!(partition.qualifying_sheets, vec!["CRM", "Adjust"]);
        assert_eq!(
            partition.publishers,
            vec![
                Data::String("A".into()),
                Data::String("B".into()),
                Data::String("C".into())
            ]
        );

        let generated_at = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let archive = packager::build_archive(
            &partition.reports,
            "monthly",
            generated_at,
            NamingConvention::Full,
        )
        .unwrap();

        let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
        assert_eq!(zip.len(), 3);

        // Publisher A's report carries both sheets with only A's rows.
        let mut entry = zip
            .by_name("A_monthly_20240301_123000.xlsx")
            .unwrap();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        drop(entry);

        let mut report: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(report.sheet_names().to_vec(), vec!["CRM", "Adjust"]);
        let crm = report.worksheet_range("CRM").unwrap();
        let rows: Vec<Vec<Data>> = crm.rows().map(|r| r.to_vec()).collect();
        assert_eq!(rows.len(), 3); // header + two A rows
        assert_eq!(rows[1][0], Data::String("A".into()));
        assert_eq!(rows[2][0], Data::String("A".into()));

        // Publisher B never saw an Adjust row, so its report has no Adjust sheet.
        let mut entry = zip
            .by_name("B_monthly_20240301_123000.xlsx")
            .unwrap();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        drop(entry);
        let mut report: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(report.sheet_names().to_vec(), vec!["CRM"]);
    }
}
