use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Origin that `EventRecord::source_url` paths are relative to.
pub const SOURCE_ORIGIN: &str = "https://ra.co";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub name: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub artists: Vec<String>,
    pub venue: String,
    pub source_url: String, // path fragment, e.g. /events/123
    pub attending_count: u64,
}

impl EventRecord {
    pub fn absolute_url(&self) -> Option<String> {
        if self.source_url.is_empty() {
            None
        } else {
            Some(format!("{SOURCE_ORIGIN}{}", self.source_url))
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Clone, Debug, Default)]
pub struct ScrapeOptions {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub output_path: Option<PathBuf>,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArtistProfile {
    pub name: String,
    pub resident_advisor_url: String,
    pub appearances: usize,
    pub events: Vec<String>,
    pub venues: Vec<String>,
    pub latest_event: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let record = EventRecord {
            name: "Techno Night".to_string(),
            date: "2024-06-01".to_string(),
            start_time: "22:00".to_string(),
            end_time: "06:00".to_string(),
            artists: vec!["Artist A".to_string()],
            venue: "Berghain".to_string(),
            source_url: "/events/123".to_string(),
            attending_count: 450,
        };
        let value = serde_json::to_value(&record).expect("serialize record");
        let object = value.as_object().expect("record is an object");
        assert_eq!(object.len(), 8);
        assert_eq!(value["startTime"], "22:00");
        assert_eq!(value["sourceUrl"], "/events/123");
        assert_eq!(value["attendingCount"], 450);
        assert_eq!(
            record.absolute_url().as_deref(),
            Some("https://ra.co/events/123")
        );
    }
}
