use std::collections::HashMap;

use crate::models::{ArtistProfile, EventRecord};

/// Collapses the artist lists of `records` into one profile per name, in the
/// order the names first appear.
pub fn profiles(records: &[EventRecord]) -> Vec<ArtistProfile> {
    let mut out: Vec<ArtistProfile> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        for raw in &record.artists {
            let name = raw.trim();
            if name.is_empty() {
                continue;
            }
            let slot = *index.entry(name.to_string()).or_insert_with(|| {
                out.push(ArtistProfile {
                    name: name.to_string(),
                    resident_advisor_url: String::new(),
                    appearances: 0,
                    events: Vec::new(),
                    venues: Vec::new(),
                    latest_event: record.date.clone(),
                });
                out.len() - 1
            });

            let profile = &mut out[slot];
            profile.appearances += 1;
            profile.events.push(record.name.clone());
            if !record.venue.is_empty() && !profile.venues.contains(&record.venue) {
                profile.venues.push(record.venue.clone());
            }
            if profile.resident_advisor_url.is_empty() {
                if let Some(url) = record.absolute_url() {
                    profile.resident_advisor_url = url;
                }
            }
        }
    }

    out
}
