// src/process/medline.rs

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument, trace};

/// Line of dashes separating journals in `J_Medline.txt`.
pub const RECORD_SEPARATOR: &str = "--------------------------------------------------------\n";

static FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<key>[a-zA-Z0-9() ]+): (?P<val>.*)\n").expect("field regex"));

/// One journal from the MEDLINE list: field name -> value, in the order the
/// fields first appear in the block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalRecord {
    fields: Vec<(String, String)>,
}

impl JournalRecord {
    /// Set `key`. A repeated key keeps its original position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for JournalRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut rec = JournalRecord::default();
        for (k, v) in iter {
            rec.insert(k, v);
        }
        rec
    }
}

/// Parse a single block; `None` when no `key: value` line is found.
fn parse_block(block: &str) -> Option<JournalRecord> {
    let rec: JournalRecord = FIELD_RE
        .captures_iter(block)
        .map(|c| (c["key"].to_string(), c["val"].to_string()))
        .collect();
    if rec.is_empty() {
        None
    } else {
        Some(rec)
    }
}

/// Split the MEDLINE journal list into records.
///
/// Blocks without any `key: value` line (including the empty ones before the
/// first and after the last separator) are skipped. Lines that do not match
/// are ignored.
#[instrument(level = "debug", skip(text), fields(content_len = text.len()))]
pub fn parse_records(text: &str) -> Vec<JournalRecord> {
    let mut records = Vec::new();
    let mut skipped = 0usize;
    for block in text.split(RECORD_SEPARATOR) {
        match parse_block(block) {
            Some(rec) => records.push(rec),
            None => {
                skipped += 1;
                trace!(block_len = block.len(), "no fields in block");
            }
        }
    }
    debug!(records = records.len(), skipped, "parsed MEDLINE blocks");
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "--------------------------------------------------------\n\
        JrId: 1\n\
        JournalTitle: AADE editors' journal\n\
        MedAbbr: AADE Ed J\n\
        ISSN (Print): 0160-6999\n\
        ISSN (Online): \n\
        IsoAbbr: AADE Ed J\n\
        NlmId: 7708172\n\
        --------------------------------------------------------\n\
        JrId: 2\n\
        JournalTitle: AANA journal\n\
        MedAbbr: AANA J\n\
        ISSN (Print): 0094-6354\n\
        ISSN (Online): 2162-5239\n\
        IsoAbbr: AANA J\n\
        NlmId: 0431420\n\
        --------------------------------------------------------\n";

    #[test]
    fn single_block_round_trip() {
        let recs = parse_records("Title: Foo\nISSN (Print): 1234-5678\n");
        assert_eq!(recs.len(), 1);
        let expected: JournalRecord = [("Title", "Foo"), ("ISSN (Print)", "1234-5678")]
            .into_iter()
            .collect();
        assert_eq!(recs[0], expected);
    }

    #[test]
    fn parses_medline_sample() {
        let recs = parse_records(SAMPLE);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].get("JournalTitle"), Some("AADE editors' journal"));
        assert_eq!(recs[0].get("ISSN (Online)"), Some(""));
        assert_eq!(recs[1].get("ISSN (Online)"), Some("2162-5239"));
        assert_eq!(recs[1].len(), 7);
        assert_eq!(
            recs[1].keys().collect::<Vec<_>>(),
            vec!["JrId", "JournalTitle", "MedAbbr", "ISSN (Print)", "ISSN (Online)", "IsoAbbr", "NlmId"]
        );
    }

    #[test]
    fn only_blocks_with_fields_yield_records() {
        let text = format!(
            "{sep}A: 1\n{sep}no fields here\n{sep}\n{sep}B: 2\nC: 3\n{sep}",
            sep = RECORD_SEPARATOR
        );
        let blocks = text.split(RECORD_SEPARATOR).count();
        let recs = parse_records(&text);
        assert!(recs.len() <= blocks);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].get("A"), Some("1"));
        assert_eq!(recs[1].get("C"), Some("3"));
    }

    #[test]
    fn duplicate_key_keeps_last_value() {
        let recs = parse_records("Title: first\nOther: x\nTitle: second\n");
        assert_eq!(recs[0].get("Title"), Some("second"));
        assert_eq!(recs[0].keys().collect::<Vec<_>>(), vec!["Title", "Other"]);
    }

    #[test]
    fn malformed_lines_are_ignored() {
        let recs = parse_records("garbage line\n: no key\nGood: yes\nNoSpace:x\n");
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].len(), 1);
        assert_eq!(recs[0].get("Good"), Some("yes"));
    }

    #[test]
    fn final_line_without_newline_is_not_a_field() {
        let recs = parse_records("A: 1\nB: 2");
        assert_eq!(recs[0].len(), 1);
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(parse_records("").is_empty());
    }
}
