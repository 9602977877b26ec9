//! Poll snapshot parsing for the relay output endpoint.
//!
//! The output endpoint answers with either a single record or an array of
//! records; only the most recent record matters. Records are tolerated
//! with either field absent, since the relay omits them while a task is
//! still warming up.

use serde::Deserialize;

/// One record from the output endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollRecord {
    /// Text generated so far
    #[serde(default)]
    pub output: String,
    /// Whether generation has finished
    #[serde(default)]
    pub status: bool,
}

/// Raw body of one poll response
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PollSnapshot {
    /// A list of records; the last one is the current state
    Many(Vec<PollRecord>),
    /// A single record
    One(PollRecord),
}

impl PollSnapshot {
    /// Reduce the snapshot to its most recent record.
    ///
    /// An empty list means the relay has produced nothing yet and maps to
    /// a default (empty, unfinished) record.
    pub fn into_latest(self) -> PollRecord {
        match self {
            PollSnapshot::Many(records) => records.into_iter().next_back().unwrap_or_default(),
            PollSnapshot::One(record) => record,
        }
    }
}

/// Suffix of `current` beyond the text already emitted.
///
/// `seen` is the output observed on the previous poll. If the relay ever
/// reports less text than before, or the boundary lands inside a
/// multi-byte character, the delta is empty rather than a panic.
pub fn suffix_delta<'a>(seen: &str, current: &'a str) -> &'a str {
    current.get(seen.len()..).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_record_parses_with_defaults() {
        let record: PollSnapshot = serde_json::from_str("{}").unwrap();
        let record = record.into_latest();
        assert_eq!(record.output, "");
        assert!(!record.status);
    }

    #[test]
    fn single_record_parses_both_fields() {
        let snapshot: PollSnapshot =
            serde_json::from_str(r#"{"output":"Hello","status":true}"#).unwrap();
        let record = snapshot.into_latest();
        assert_eq!(record.output, "Hello");
        assert!(record.status);
    }

    #[test]
    fn array_reduces_to_last_element() {
        let snapshot: PollSnapshot = serde_json::from_str(
            r#"[{"output":"old","status":false},{"output":"middle"},{"output":"new","status":true}]"#,
        )
        .unwrap();
        let record = snapshot.into_latest();
        assert_eq!(record.output, "new");
        assert!(record.status);
    }

    #[test]
    fn empty_array_means_nothing_yet() {
        let snapshot: PollSnapshot = serde_json::from_str("[]").unwrap();
        let record = snapshot.into_latest();
        assert_eq!(record.output, "");
        assert!(!record.status);
    }

    #[test]
    fn scalar_bodies_are_rejected() {
        assert!(serde_json::from_str::<PollSnapshot>(r#""just a string""#).is_err());
        assert!(serde_json::from_str::<PollSnapshot>("42").is_err());
    }

    #[test]
    fn delta_is_the_newly_appeared_suffix() {
        assert_eq!(suffix_delta("", "He"), "He");
        assert_eq!(suffix_delta("He", "Hello"), "llo");
        assert_eq!(suffix_delta("Hello", "Hello"), "");
    }

    #[test]
    fn regressed_output_yields_empty_delta() {
        assert_eq!(suffix_delta("Hello world", "Hello"), "");
    }

    #[test]
    fn misaligned_multibyte_boundary_yields_empty_delta() {
        // "ab" is two bytes, so the delta would start in the middle of
        // the two-byte "é" if the relay rewrote its output.
        assert_eq!(suffix_delta("ab", "aéx"), "");
        assert_eq!(suffix_delta("h", "hé"), "é");
    }
}
