//! Source excerpts shown under an answer

use lymegpt_knowledge::Citation;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::HashSet;

/// Number of leading characters of a chunk used to recognise duplicates
pub const CHUNK_KEY_CHARS: usize = 50;

/// A de-duplicated excerpt, numbered from 1 within its turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChunk {
    pub index: usize,
    pub document: String,
    pub text: String,
}

impl SourceChunk {
    pub fn title(&self) -> String {
        format!("Chunk {} - {}", self.index, self.document)
    }
}

impl Serialize for SourceChunk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SourceChunk", 4)?;
        state.serialize_field("index", &self.index)?;
        state.serialize_field("title", &self.title())?;
        state.serialize_field("document", &self.document)?;
        state.serialize_field("text", &self.text)?;
        state.end()
    }
}

/// Final path segment of a storage URI
pub fn document_name(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// Dedup key: document name plus the first 50 characters of the text
pub fn chunk_id(document: &str, text: &str) -> String {
    let prefix: String = text.chars().take(CHUNK_KEY_CHARS).collect();
    format!("{}:{}", document, prefix)
}

/// Flatten the citation groups of one answer, in order, keeping only the
/// first occurrence of each chunk id.
pub fn collect_sources(citations: &[Citation]) -> Vec<SourceChunk> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for reference in citations.iter().flat_map(|c| &c.retrieved_references) {
        let document = document_name(reference.uri());
        if seen.insert(chunk_id(document, reference.text())) {
            sources.push(SourceChunk {
                index: sources.len() + 1,
                document: document.to_string(),
                text: reference.text().to_string(),
            });
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use lymegpt_knowledge::RetrievedReference;

    fn group(refs: &[(&str, &str)]) -> Citation {
        Citation {
            retrieved_references: refs
                .iter()
                .map(|(text, uri)| RetrievedReference::new(*text, *uri))
                .collect(),
        }
    }

    #[test]
    fn test_document_name() {
        assert_eq!(document_name("s3://bucket/guidelines.pdf"), "guidelines.pdf");
        assert_eq!(document_name("s3://bucket/a/b/idsa-2020.pdf"), "idsa-2020.pdf");
        assert_eq!(document_name("plain.txt"), "plain.txt");
        assert_eq!(document_name("s3://bucket/folder/"), "");
    }

    #[test]
    fn test_chunk_id_truncates_to_fifty_chars() {
        let long = "x".repeat(80);
        assert_eq!(chunk_id("d.pdf", &long), format!("d.pdf:{}", "x".repeat(50)));
        assert_eq!(chunk_id("d.pdf", "short"), "d.pdf:short");
        assert_eq!(chunk_id("d.pdf", ""), "d.pdf:");
    }

    #[test]
    fn test_chunk_id_counts_characters_not_bytes() {
        let text = "é".repeat(60);
        assert_eq!(chunk_id("d", &text).chars().count(), 2 + 50);
    }

    #[test]
    fn test_single_reference() {
        let sources = collect_sources(&[group(&[(
            "Doxycycline 100mg twice daily for 14-21 days...",
            "s3://bucket/guidelines.pdf",
        )])]);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title(), "Chunk 1 - guidelines.pdf");
        assert_eq!(sources[0].text, "Doxycycline 100mg twice daily for 14-21 days...");
    }

    #[test]
    fn test_duplicates_across_groups_render_once() {
        let shared = "Erythema migrans is the hallmark skin lesion of early Lyme disease, \
                      appearing in 70-80% of cases";
        let same_prefix = format!("{} and something else entirely", &shared[..50]);
        let sources = collect_sources(&[
            group(&[
                (shared, "s3://kb/cdc.pdf"),
                ("Amoxicillin is an alternative", "s3://kb/cdc.pdf"),
            ]),
            group(&[
                (same_prefix.as_str(), "s3://kb/cdc.pdf"),
                (shared, "s3://kb/nice.pdf"),
            ]),
        ]);

        let titles: Vec<String> = sources.iter().map(SourceChunk::title).collect();
        assert_eq!(
            titles,
            vec!["Chunk 1 - cdc.pdf", "Chunk 2 - cdc.pdf", "Chunk 3 - nice.pdf"]
        );
        // The first occurrence wins
        assert_eq!(sources[0].text, shared);
    }

    #[test]
    fn test_empty_inputs_contribute_nothing() {
        assert!(collect_sources(&[]).is_empty());
        assert!(collect_sources(&[group(&[]), group(&[])]).is_empty());

        let sources = collect_sources(&[group(&[]), group(&[("t", "s3://b/x.pdf")])]);
        assert_eq!(sources[0].index, 1);
    }

    #[test]
    fn test_serializes_with_title() {
        let chunk = SourceChunk {
            index: 2,
            document: "cdc.pdf".to_string(),
            text: "t".to_string(),
        };
        let value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(value["title"], "Chunk 2 - cdc.pdf");
        assert_eq!(value["index"], 2);
    }

    #[test]
    fn test_each_call_starts_fresh() {
        let citations = [group(&[("same text", "s3://b/x.pdf")])];
        assert_eq!(collect_sources(&citations).len(), 1);
        assert_eq!(collect_sources(&citations).len(), 1);
    }
}
