//! Wire DTOs for the two service endpoints.
//!
//! The service grew two response shapes over time: `file-get` wraps records
//! in a `data` key, `file-upload` in a `response` key. Both use the same
//! record layout (`Title` plus a `Conference` array with snake-cased,
//! capitalized field names). Everything is normalized here into
//! [`PageResult`]; the inconsistent naming must not leak past this module.

use serde::Deserialize;

use crate::model::{ConferenceEntry, FileRecord, PageResult};

#[derive(Debug, Deserialize)]
pub(crate) struct WireConference {
    #[serde(rename = "Conference_Name", default)]
    conference_name: Option<String>,
    #[serde(rename = "Decision_With_Comments", default)]
    decision_with_comments: Option<String>,
    #[serde(rename = "Precheck_Comments", default)]
    precheck_comments: Option<String>,
    #[serde(rename = "Firstset_Comments", default)]
    firstset_comments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireRecord {
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Conference", default)]
    conference: Option<Vec<WireConference>>,
}

/// `GET file-get` response: `{ data: [...], total_page: n }`.
#[derive(Debug, Deserialize)]
pub(crate) struct FileGetResponse {
    #[serde(default)]
    data: Option<Vec<WireRecord>>,
    #[serde(default)]
    total_page: Option<u32>,
}

/// `POST file-upload` response: `{ response: [...], total_page: n }`.
#[derive(Debug, Deserialize)]
pub(crate) struct FileUploadResponse {
    #[serde(default)]
    response: Option<Vec<WireRecord>>,
    #[serde(default)]
    total_page: Option<u32>,
}

impl From<WireConference> for ConferenceEntry {
    fn from(w: WireConference) -> Self {
        ConferenceEntry {
            conference_name: w.conference_name.unwrap_or_default(),
            decision_with_comments: w.decision_with_comments.unwrap_or_default(),
            precheck_comments: w.precheck_comments.unwrap_or_default(),
            firstset_comments: w.firstset_comments.unwrap_or_default(),
        }
    }
}

impl From<WireRecord> for FileRecord {
    fn from(w: WireRecord) -> Self {
        FileRecord {
            title: w.title.unwrap_or_default(),
            conferences: w
                .conference
                .unwrap_or_default()
                .into_iter()
                .map(ConferenceEntry::from)
                .collect(),
        }
    }
}

/// Absent or zero `total_page` normalizes to 1, matching the service's
/// behavior of always reporting at least one page.
fn normalize_total(total_page: Option<u32>) -> u32 {
    total_page.filter(|&t| t > 0).unwrap_or(1)
}

impl FileGetResponse {
    pub(crate) fn into_page_result(self) -> PageResult {
        PageResult {
            records: self
                .data
                .unwrap_or_default()
                .into_iter()
                .map(FileRecord::from)
                .collect(),
            total_pages: normalize_total(self.total_page),
        }
    }
}

impl FileUploadResponse {
    pub(crate) fn into_page_result(self) -> PageResult {
        PageResult {
            records: self
                .response
                .unwrap_or_default()
                .into_iter()
                .map(FileRecord::from)
                .collect(),
            total_pages: normalize_total(self.total_page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_get_shape_normalizes() {
        let json = r#"{
            "data": [
                {
                    "Title": "Ethics in AI",
                    "Conference": [
                        {
                            "Conference_Name": "ICICI",
                            "Decision_With_Comments": "Accepted",
                            "Precheck_Comments": "",
                            "Firstset_Comments": null
                        }
                    ]
                }
            ],
            "total_page": 3
        }"#;

        let parsed: FileGetResponse = serde_json::from_str(json).unwrap();
        let page = parsed.into_page_result();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].title, "Ethics in AI");
        assert_eq!(page.records[0].conferences[0].conference_name, "ICICI");
        assert_eq!(page.records[0].conferences[0].firstset_comments, "");
    }

    #[test]
    fn file_upload_shape_uses_response_key() {
        let json = r#"{
            "response": [
                { "Title": "Blockchain Security", "Conference": [] }
            ],
            "total_page": 1
        }"#;

        let parsed: FileUploadResponse = serde_json::from_str(json).unwrap();
        let page = parsed.into_page_result();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].title, "Blockchain Security");
        assert!(page.records[0].conferences.is_empty());
    }

    #[test]
    fn missing_total_page_defaults_to_one() {
        let parsed: FileGetResponse = serde_json::from_str(r#"{ "data": [] }"#).unwrap();
        assert_eq!(parsed.into_page_result().total_pages, 1);

        let parsed: FileUploadResponse =
            serde_json::from_str(r#"{ "response": null, "total_page": 0 }"#).unwrap();
        let page = parsed.into_page_result();
        assert_eq!(page.total_pages, 1);
        assert!(page.records.is_empty());
    }

    #[test]
    fn missing_conference_array_becomes_empty() {
        let json = r#"{ "data": [ { "Title": "No Confs Yet" } ], "total_page": 1 }"#;
        let parsed: FileGetResponse = serde_json::from_str(json).unwrap();
        let page = parsed.into_page_result();
        assert!(page.records[0].conferences.is_empty());
    }
}
