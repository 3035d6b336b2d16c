//! XLSX parsing: first worksheet only, columns mapped by header name.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::SheetError;

/// One data row of an uploaded sheet, with cells resolved by header name.
/// Unknown columns are ignored; missing columns read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    pub title: String,
    pub author_mail: String,
    pub conference_name: String,
    pub decision_with_comments: String,
    pub precheck_comments: String,
    pub firstset_comments: String,
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // Whole floats render as integers, as spreadsheet UIs show them.
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Parse the first worksheet of an XLSX byte buffer into rows.
///
/// The first row is the header; each following row becomes one
/// [`SheetRow`]. Fully empty rows are skipped (they commonly trail real
/// data in hand-edited sheets) but rows with any content are kept so
/// validation can report their gaps.
pub fn parse_sheet(bytes: &[u8]) -> Result<Vec<SheetRow>, SheetError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook: Xlsx<_> = Xlsx::new(cursor).map_err(|e| SheetError::Open(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SheetError::NoWorksheet)?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| SheetError::Open(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or(SheetError::NoHeaderRow)?;

    let columns: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| {
            let name = cell_to_string(cell).trim().to_string();
            if name.is_empty() { None } else { Some((name, i)) }
        })
        .collect();

    fn cell(columns: &HashMap<String, usize>, row: &[Data], name: &str) -> String {
        columns
            .get(name)
            .and_then(|&i| row.get(i))
            .map(cell_to_string)
            .unwrap_or_default()
    }

    let mut parsed = Vec::new();
    for row in rows {
        let sheet_row = SheetRow {
            title: cell(&columns, row, "Title"),
            author_mail: cell(&columns, row, "Author_Mail"),
            conference_name: cell(&columns, row, "Conference_Name"),
            decision_with_comments: cell(&columns, row, "Decision_With_Comments"),
            precheck_comments: cell(&columns, row, "Precheck_Comments"),
            firstset_comments: cell(&columns, row, "Firstset_Comments"),
        };
        let all_blank = row.iter().all(|c| cell_to_string(c).trim().is_empty());
        if !all_blank {
            parsed.push(sheet_row);
        }
    }

    tracing::debug!(rows = parsed.len(), sheet = %sheet_name, "parsed upload sheet");
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workbook_bytes(rows: &[[&str; 6]]) -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        let header = [
            "Title",
            "Author_Mail",
            "Conference_Name",
            "Decision_With_Comments",
            "Precheck_Comments",
            "Firstset_Comments",
        ];
        for (col, name) in header.iter().enumerate() {
            sheet.write(0, col as u16, *name).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                sheet.write((r + 1) as u32, c as u16, *value).unwrap();
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn parses_rows_by_header_name() {
        let bytes = workbook_bytes(&[[
            "Ethics in AI",
            "author@example.com",
            "ICICI",
            "Accepted",
            "Tighten the abstract",
            "Expand the keywords",
        ]]);

        let rows = parse_sheet(&bytes).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Ethics in AI");
        assert_eq!(rows[0].conference_name, "ICICI");
        assert_eq!(rows[0].firstset_comments, "Expand the keywords");
    }

    #[test]
    fn keeps_partially_blank_rows_for_validation() {
        let bytes = workbook_bytes(&[
            ["Edge Computing", "", "ICDICI", "Registered", "", ""],
            ["", "", "", "", "", ""],
        ]);

        let rows = parse_sheet(&bytes).unwrap();
        // The fully blank trailing row is dropped, the gappy one kept.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].author_mail, "");
    }

    #[test]
    fn garbage_bytes_fail_to_open() {
        assert!(matches!(
            parse_sheet(b"not a zip archive"),
            Err(SheetError::Open(_))
        ));
    }
}
