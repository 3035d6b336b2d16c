//! Required-field validation and exclusion-set extraction.

use std::collections::BTreeSet;

use crate::sheet::SheetRow;

/// Offset from a 0-based data index to the spreadsheet row number the
/// operator sees: rows are 1-based and row 1 is the header.
const HEADER_OFFSET: usize = 2;

/// One offending row, with every required field it is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowViolation {
    /// Spreadsheet row number as displayed to the operator.
    pub row_number: usize,
    pub missing_fields: Vec<String>,
}

fn missing_fields(row: &SheetRow) -> Vec<String> {
    let required: [(&str, &str); 4] = [
        ("Title", &row.title),
        ("Author_Mail", &row.author_mail),
        ("Conference_Name", &row.conference_name),
        ("Decision_With_Comments", &row.decision_with_comments),
    ];
    required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| (*name).to_string())
        .collect()
}

/// Check every row and collect every violation, not just the first, so the
/// operator can fix the whole sheet in one pass. An empty result means the
/// sheet may be uploaded.
pub fn validate_rows(rows: &[SheetRow]) -> Vec<RowViolation> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let missing = missing_fields(row);
            if missing.is_empty() {
                None
            } else {
                Some(RowViolation {
                    row_number: index + HEADER_OFFSET,
                    missing_fields: missing,
                })
            }
        })
        .collect()
}

/// The distinct, case-normalized conference names present in a sheet.
///
/// These become the exclusion set: the table is meant to show *other*
/// conferences' data alongside the upload, not echo the upload's own rows.
pub fn excluded_conference_names(rows: &[SheetRow]) -> BTreeSet<String> {
    rows.iter()
        .map(|row| row.conference_name.trim().to_uppercase())
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(title: &str, mail: &str, conf: &str, decision: &str) -> SheetRow {
        SheetRow {
            title: title.into(),
            author_mail: mail.into(),
            conference_name: conf.into(),
            decision_with_comments: decision.into(),
            ..SheetRow::default()
        }
    }

    #[test]
    fn complete_rows_pass() {
        let rows = vec![row("Ethics in AI", "a@example.com", "ICICI", "Accepted")];
        assert!(validate_rows(&rows).is_empty());
    }

    #[test]
    fn collects_every_violation_with_sheet_row_numbers() {
        let rows = vec![
            row("Ethics in AI", "a@example.com", "ICICI", "Accepted"),
            row("", "b@example.com", "ICIMIA", "Rejected"),
            row("Edge Computing", "  ", "", "Registered"),
        ];

        let violations = validate_rows(&rows);
        assert_eq!(violations.len(), 2);

        // First data row is spreadsheet row 2.
        assert_eq!(violations[0].row_number, 3);
        assert_eq!(violations[0].missing_fields, vec!["Title".to_string()]);

        assert_eq!(violations[1].row_number, 4);
        assert_eq!(
            violations[1].missing_fields,
            vec!["Author_Mail".to_string(), "Conference_Name".to_string()]
        );
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let rows = vec![row("   ", "a@example.com", "ICICI", "Accepted")];
        let violations = validate_rows(&rows);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].missing_fields, vec!["Title".to_string()]);
    }

    #[test]
    fn exclusion_set_is_distinct_and_normalized() {
        let rows = vec![
            row("A", "a@example.com", " icici ", "Accepted"),
            row("B", "b@example.com", "ICICI", "Rejected"),
            row("C", "c@example.com", "IcTmIm", "Accepted"),
            row("D", "d@example.com", "", "Accepted"),
        ];

        let names = excluded_conference_names(&rows);
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["ICICI".to_string(), "ICTMIM".to_string()]
        );
    }
}
