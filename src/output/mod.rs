use crate::sources::TranscriptDocument;

/// Join segment texts in order with a single space; no trimming or normalization
pub fn format_as_text(doc: &TranscriptDocument) -> String {
    doc.segments()
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
