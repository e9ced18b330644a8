//! Turns the CSV written by the fetch script into [`EventRecord`]s.
//!
//! Only the artists column is ever quoted upstream, and only when it holds
//! commas. Lines that do not tokenize into the expected eight columns are
//! still turned into records, but are reported as [`Extracted::Degraded`].

pub mod tokenizer;

use crate::models::EventRecord;

pub const FIELD_COUNT: usize = 8;

/// Scalar columns in front of the artists column.
const LEADING_FIELDS: usize = 4;
const ARTIST_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    /// The line needed the fourth-comma recovery to find its trailing columns.
    PositionalRecovery,
    /// No quoted artists span could be found; columns were mapped naively.
    FastPathFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Parsed(EventRecord),
    Degraded {
        record: EventRecord,
        line: usize,
        reason: DegradeReason,
    },
}

impl Extracted {
    pub fn into_record(self) -> EventRecord {
        match self {
            Extracted::Parsed(record) => record,
            Extracted::Degraded { record, .. } => record,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Extracted::Degraded { .. })
    }
}

pub fn extract(raw: &str) -> Vec<EventRecord> {
    extract_detailed(raw)
        .into_iter()
        .map(Extracted::into_record)
        .collect()
}

/// Like [`extract`], but keeps track of which lines needed a fallback.
/// Line numbers are 1-based and count the header.
pub fn extract_detailed(raw: &str) -> Vec<Extracted> {
    raw.lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| extract_line(idx + 1, line))
        .collect()
}

fn extract_line(line_no: usize, line: &str) -> Extracted {
    let flat: Vec<&str> = line.split(',').collect();
    let degraded = |record, reason| Extracted::Degraded {
        record,
        line: line_no,
        reason,
    };

    match flat.len() {
        FIELD_COUNT => Extracted::Parsed(from_fields(&flat)),
        n if n < FIELD_COUNT => degraded(from_fields(&flat), DegradeReason::FastPathFallback),
        _ => {
            let tokens = tokenizer::tokenize(line);
            if tokens.balanced && tokens.fields.len() == FIELD_COUNT {
                let mut record = from_fields(&tokens.fields);
                keep_leading_fields(&mut record, &flat);
                return Extracted::Parsed(record);
            }
            match positional_recovery(line, &flat) {
                Some(record) => degraded(record, DegradeReason::PositionalRecovery),
                None => degraded(from_fields(&flat), DegradeReason::FastPathFallback),
            }
        }
    }
}

fn from_fields<S: AsRef<str>>(fields: &[S]) -> EventRecord {
    let field = |idx: usize| fields.get(idx).map(|f| f.as_ref()).unwrap_or_default();
    EventRecord {
        name: field(0).to_string(),
        date: field(1).to_string(),
        start_time: field(2).to_string(),
        end_time: field(3).to_string(),
        artists: split_artists(field(4)),
        venue: field(5).to_string(),
        source_url: field(6).to_string(),
        attending_count: parse_attending(field(7)),
    }
}

/// Name, date and times always come from the plain comma split.
fn keep_leading_fields(record: &mut EventRecord, flat: &[&str]) {
    let leading = from_fields(&flat[..LEADING_FIELDS.min(flat.len())]);
    record.name = leading.name;
    record.date = leading.date;
    record.start_time = leading.start_time;
    record.end_time = leading.end_time;
}

/// Finds the artists column by its position after the fourth unquoted comma
/// and takes the last three comma-separated values after its closing quote as
/// venue, url and attending count.
fn positional_recovery(line: &str, flat: &[&str]) -> Option<EventRecord> {
    let candidate = tokenizer::after_nth_unquoted_comma(line, LEADING_FIELDS)?;
    let close = tokenizer::first_quote_close(candidate)?;

    let artists_raw = candidate[..=close].replace('"', "");
    let trailing: Vec<&str> = candidate[close + 1..].split(',').collect();
    let from_end = |back: usize| {
        trailing
            .len()
            .checked_sub(back)
            .and_then(|idx| trailing.get(idx))
            .copied()
            .unwrap_or_default()
    };

    let mut record = EventRecord::default();
    keep_leading_fields(&mut record, flat);
    record.artists = split_artists(&artists_raw);
    record.venue = from_end(3).to_string();
    record.source_url = from_end(2).to_string();
    record.attending_count = parse_attending(from_end(1));
    Some(record)
}

fn split_artists(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(ARTIST_SEPARATOR).map(str::to_string).collect()
}

fn parse_attending(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(0)
}
