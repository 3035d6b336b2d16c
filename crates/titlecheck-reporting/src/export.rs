//! XLSX export of grouped review record summaries.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};

use crate::ExportError;

/// One exported row: a title group with its accumulated, comma-joined
/// conference and comment sets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportRow {
    pub title: String,
    pub conference_names: String,
    pub decision_with_comments: String,
    pub precheck_comments: String,
    pub firstset_comments: String,
}

const SHEET_NAME: &str = "Response Data";

const HEADERS: [&str; 5] = [
    "Title",
    "Conference_Name",
    "Decision_With_Comments",
    "Precheck_Comments",
    "Firstset_Comments",
];

/// Write the export rows to `path` as a single-sheet workbook.
pub fn write_export(path: &Path, rows: &[ExportRow]) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_with_format(0, col as u16, *header, &header_format)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write(r, 0, &row.title)?;
        sheet.write(r, 1, &row.conference_names)?;
        sheet.write(r, 2, &row.decision_with_comments)?;
        sheet.write(r, 3, &row.precheck_comments)?;
        sheet.write(r, 4, &row.firstset_comments)?;
    }

    workbook.save(path)?;
    tracing::info!(rows = rows.len(), path = %path.display(), "wrote export workbook");
    Ok(())
}

/// Export file name: `Search_Results_` when a query was active, otherwise
/// `Response_Data_`, followed by the current UTC date.
pub fn export_file_name(search_was_active: bool) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let (year, month, day) = days_to_ymd(now / 86_400);
    let prefix = if search_was_active {
        "Search_Results_"
    } else {
        "Response_Data_"
    };
    format!("{prefix}{year:04}-{month:02}-{day:02}.xlsx")
}

/// Convert days since Unix epoch to (year, month, day).
fn days_to_ymd(days: u64) -> (u64, u64, u64) {
    // Civil calendar conversion
    let z = days + 719468;
    let era = z / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx};

    #[test]
    fn writes_headers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        let rows = vec![ExportRow {
            title: "Ethics in AI".into(),
            conference_names: "ICICI, ICTMIM".into(),
            decision_with_comments: "Accepted, Rejected".into(),
            precheck_comments: "Tighten the abstract".into(),
            firstset_comments: "".into(),
        }];
        write_export(&path, &rows).unwrap();

        let file = std::fs::File::open(&path).unwrap();
        let mut workbook: Xlsx<_> = Xlsx::new(std::io::BufReader::new(file)).unwrap();
        assert_eq!(workbook.sheet_names(), vec![SHEET_NAME.to_string()]);

        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        let mut cells = range.rows();
        let header: Vec<String> = cells
            .next()
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(header, HEADERS.to_vec());

        let first = cells.next().unwrap();
        assert_eq!(first[0], Data::String("Ethics in AI".into()));
        assert_eq!(first[1], Data::String("ICICI, ICTMIM".into()));
    }

    #[test]
    fn file_name_prefix_follows_query_state() {
        let search = export_file_name(true);
        let browse = export_file_name(false);
        assert!(search.starts_with("Search_Results_"));
        assert!(browse.starts_with("Response_Data_"));
        assert!(search.ends_with(".xlsx"));
        // ISO date stamp: prefix + YYYY-MM-DD + extension.
        let stamp = &search["Search_Results_".len()..search.len() - ".xlsx".len()];
        assert_eq!(stamp.len(), 10);
        assert_eq!(stamp.as_bytes()[4], b'-');
        assert_eq!(stamp.as_bytes()[7], b'-');
    }

    #[test]
    fn civil_calendar_conversion_known_dates() {
        assert_eq!(days_to_ymd(0), (1970, 1, 1));
        assert_eq!(days_to_ymd(19722), (2023, 12, 31));
        assert_eq!(days_to_ymd(19723), (2024, 1, 1));
    }
}
