//! Grouping/exclusion formatter: reduces a full page aggregate into
//! deduplicated export rows.

use std::collections::{BTreeSet, HashMap};

use titlecheck_api::{ConferenceEntry, FileRecord};
use titlecheck_reporting::ExportRow;

/// Conference field value for records that carry no conference data.
pub const NO_CONFERENCE_DATA: &str = "No Conference Data";

fn normalize_conference_name(name: &str) -> String {
    name.trim().to_uppercase()
}

fn is_excluded(entry: &ConferenceEntry, excluded: &BTreeSet<String>) -> bool {
    excluded.contains(&normalize_conference_name(&entry.conference_name))
}

/// Apply the exclusion set to a record list, as the table view does:
/// entries whose normalized conference name is excluded are removed, and
/// records left with no entries disappear entirely.
pub fn apply_exclusions(records: &[FileRecord], excluded: &BTreeSet<String>) -> Vec<FileRecord> {
    if excluded.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .map(|record| FileRecord {
            title: record.title.clone(),
            conferences: record
                .conferences
                .iter()
                .filter(|entry| !is_excluded(entry, excluded))
                .cloned()
                .collect(),
        })
        .filter(|record| !record.conferences.is_empty())
        .collect()
}

/// Accumulated comment sets for one title group: insertion-ordered,
/// value-deduplicated, blanks skipped.
#[derive(Debug, Default)]
struct TitleGroup {
    conference_names: Vec<String>,
    decisions: Vec<String>,
    prechecks: Vec<String>,
    firstsets: Vec<String>,
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if value.is_empty() {
        return;
    }
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

impl TitleGroup {
    fn absorb(&mut self, entry: &ConferenceEntry) {
        push_unique(&mut self.conference_names, &entry.conference_name);
        push_unique(&mut self.decisions, &entry.decision_with_comments);
        push_unique(&mut self.prechecks, &entry.precheck_comments);
        push_unique(&mut self.firstsets, &entry.firstset_comments);
    }

    fn is_empty(&self) -> bool {
        self.conference_names.is_empty()
            && self.decisions.is_empty()
            && self.prechecks.is_empty()
            && self.firstsets.is_empty()
    }
}

/// Reduce the aggregate into one export row per title.
///
/// Exclusion runs first: entries from conferences in the operator's own
/// uploaded sheet are removed, and a record emptied by that removal is
/// dropped. Surviving entries group by the exact title string (this
/// mirrors the server's own keying and must not become fuzzy matching).
/// A record that had no conference data to begin with keeps its row, with
/// the [`NO_CONFERENCE_DATA`] sentinel in the conference field.
pub fn format_export_rows(records: &[FileRecord], excluded: &BTreeSet<String>) -> Vec<ExportRow> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, TitleGroup> = HashMap::new();

    for record in records {
        let surviving: Vec<&ConferenceEntry> = record
            .conferences
            .iter()
            .filter(|entry| !is_excluded(entry, excluded))
            .collect();

        // A record emptied by exclusion is hidden; a record with no
        // conference data at all still gets a (sentinel) row.
        if surviving.is_empty() && !record.conferences.is_empty() {
            continue;
        }

        let group = groups.entry(record.title.clone()).or_insert_with(|| {
            order.push(record.title.clone());
            TitleGroup::default()
        });
        for entry in surviving {
            group.absorb(entry);
        }
    }

    order
        .into_iter()
        .map(|title| {
            let group = &groups[&title];
            let conference_names = if group.is_empty() {
                NO_CONFERENCE_DATA.to_string()
            } else {
                group.conference_names.join(", ")
            };
            ExportRow {
                title,
                conference_names,
                decision_with_comments: group.decisions.join(", "),
                precheck_comments: group.prechecks.join(", "),
                firstset_comments: group.firstsets.join(", "),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(conf: &str, decision: &str, precheck: &str, firstset: &str) -> ConferenceEntry {
        ConferenceEntry {
            conference_name: conf.into(),
            decision_with_comments: decision.into(),
            precheck_comments: precheck.into(),
            firstset_comments: firstset.into(),
        }
    }

    fn record(title: &str, conferences: Vec<ConferenceEntry>) -> FileRecord {
        FileRecord {
            title: title.into(),
            conferences,
        }
    }

    #[test]
    fn groups_by_exact_title_and_dedups_values() {
        // Two records share a title across pages with a duplicated
        // decision comment.
        let records = vec![
            record("Ethics in AI", vec![entry("ICICI", "Accepted", "P1", "F1")]),
            record(
                "Ethics in AI",
                vec![entry("ICTMIM", "Accepted", "P2", "F1")],
            ),
        ];

        let rows = format_export_rows(&records, &BTreeSet::new());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Ethics in AI");
        assert_eq!(rows[0].conference_names, "ICICI, ICTMIM");
        assert_eq!(rows[0].decision_with_comments, "Accepted");
        assert_eq!(rows[0].precheck_comments, "P1, P2");
        assert_eq!(rows[0].firstset_comments, "F1");
    }

    #[test]
    fn different_cased_titles_stay_distinct() {
        let records = vec![
            record("Ethics in AI", vec![entry("A", "x", "", "")]),
            record("ethics in ai", vec![entry("B", "y", "", "")]),
        ];
        let rows = format_export_rows(&records, &BTreeSet::new());
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn excluded_conferences_are_removed_and_emptied_records_dropped() {
        let excluded = BTreeSet::from(["ICML".to_string()]);
        let records = vec![
            record(
                "Kept",
                vec![
                    entry(" icml ", "Accepted", "", ""),
                    entry("NEURIPS", "Rejected", "", ""),
                ],
            ),
            record("Gone", vec![entry("ICML", "Accepted", "", "")]),
        ];

        let rows = format_export_rows(&records, &excluded);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Kept");
        assert_eq!(rows[0].conference_names, "NEURIPS");
        assert_eq!(rows[0].decision_with_comments, "Rejected");
    }

    #[test]
    fn record_without_conference_data_gets_sentinel_row() {
        let records = vec![record("Orphan", vec![])];
        let rows = format_export_rows(&records, &BTreeSet::new());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].conference_names, NO_CONFERENCE_DATA);
        assert_eq!(rows[0].decision_with_comments, "");
        assert_eq!(rows[0].precheck_comments, "");
        assert_eq!(rows[0].firstset_comments, "");
    }

    #[test]
    fn blank_values_are_skipped() {
        let records = vec![record(
            "Sparse",
            vec![entry("ICSSAS", "", "", ""), entry("ICDICI", "Rejected", "", "")],
        )];
        let rows = format_export_rows(&records, &BTreeSet::new());
        assert_eq!(rows[0].conference_names, "ICSSAS, ICDICI");
        assert_eq!(rows[0].decision_with_comments, "Rejected");
        assert_eq!(rows[0].precheck_comments, "");
    }

    #[test]
    fn output_keeps_first_seen_order() {
        let records = vec![
            record("B", vec![entry("X", "1", "", "")]),
            record("A", vec![entry("Y", "2", "", "")]),
            record("B", vec![entry("Z", "3", "", "")]),
        ];
        let rows = format_export_rows(&records, &BTreeSet::new());
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[test]
    fn formatter_is_idempotent_on_its_own_output() {
        let excluded = BTreeSet::from(["ICML".to_string()]);
        let records = vec![
            record(
                "Ethics in AI",
                vec![
                    entry("ICICI", "Accepted", "P1", "F1"),
                    entry("ICML", "Rejected", "P2", "F2"),
                ],
            ),
            record("Ethics in AI", vec![entry("ICTMIM", "Accepted", "", "")]),
            record("Orphan", vec![]),
        ];

        let first = format_export_rows(&records, &excluded);

        // Treat each export row as a one-entry record and re-run with no
        // exclusions (the first pass already applied them).
        let reinterpreted: Vec<FileRecord> = first
            .iter()
            .map(|row| {
                record(
                    &row.title,
                    vec![entry(
                        &row.conference_names,
                        &row.decision_with_comments,
                        &row.precheck_comments,
                        &row.firstset_comments,
                    )],
                )
            })
            .collect();
        let second = format_export_rows(&reinterpreted, &BTreeSet::new());

        assert_eq!(first, second);
    }

    #[test]
    fn apply_exclusions_filters_the_visible_table() {
        let excluded = BTreeSet::from(["ICML".to_string()]);
        let records = vec![
            record("Kept", vec![entry("NEURIPS", "", "", ""), entry("ICML", "", "", "")]),
            record("Gone", vec![entry("icml", "", "", "")]),
        ];

        let visible = apply_exclusions(&records, &excluded);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].conferences.len(), 1);
        assert_eq!(visible[0].conferences[0].conference_name, "NEURIPS");
    }
}
