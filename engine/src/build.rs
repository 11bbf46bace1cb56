use crate::console;
use crate::error::EngineError;
use crate::types::{Corpus, IndexedRecord, RecordType, SkipReason, SkippedRecord, SourceRecord};
use std::collections::HashMap;

/// Trim a string field, treating blank values as missing
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim a list field, dropping blank and repeated entries (first occurrence wins)
fn clean_list(values: Option<Vec<String>>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for value in values.unwrap_or_default() {
        let value = value.trim();
        if !value.is_empty() && !cleaned.iter().any(|v| v == value) {
            cleaned.push(value.to_string());
        }
    }
    cleaned
}

/// Map the harvester's type labels onto a record type
pub fn parse_record_type(label: &str) -> Option<RecordType> {
    match label.trim().to_lowercase().as_str() {
        "story" => Some(RecordType::Story),
        "docs" | "doc" | "documentation" | "mdx" => Some(RecordType::Docs),
        _ => None,
    }
}

/// Turn one raw record into an indexed record, or say why it cannot be indexed
pub fn index_record(source: SourceRecord) -> Result<IndexedRecord, SkipReason> {
    let id = clean(source.id).ok_or(SkipReason::MissingField("id"))?;
    let title = clean(source.title).ok_or(SkipReason::MissingField("title"))?;
    let label = clean(source.record_type).ok_or(SkipReason::MissingField("type"))?;
    let record_type = parse_record_type(&label).ok_or(SkipReason::UnknownType(label))?;
    let path = clean(source.path).ok_or(SkipReason::MissingField("path"))?;

    Ok(IndexedRecord::new(id, title, record_type, path)
        .with_tags(clean_list(source.tags))
        .with_component_name(clean(source.component_name))
        .with_description(clean(source.description))
        .with_headings(clean_list(source.headings)))
}

/// Build the corpus from records that may already have failed to decode.
/// Bad records are skipped; a duplicate id aborts the build.
fn build_from_results<I>(sources: I) -> Result<Corpus, EngineError>
where
    I: IntoIterator<Item = Result<SourceRecord, SkipReason>>,
{
    let mut records: Vec<IndexedRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut skipped: Vec<SkippedRecord> = Vec::new();

    for (position, source) in sources.into_iter().enumerate() {
        let source_id = source.as_ref().ok().and_then(|s| s.id.clone());
        match source.and_then(index_record) {
            Ok(record) => {
                if positions.contains_key(record.id()) {
                    return Err(EngineError::DuplicateId(record.id().to_string()));
                }
                positions.insert(record.id().to_string(), records.len());
                records.push(record);
            }
            Err(reason) => {
                console::warn(&format!(
                    "Skipping source record {} (id {:?}): {}",
                    position, source_id, reason
                ));
                skipped.push(SkippedRecord {
                    position,
                    id: source_id,
                    reason,
                });
            }
        }
    }

    tracing::debug!(
        indexed = records.len(),
        skipped = skipped.len(),
        "Built search corpus"
    );

    Ok(Corpus::from_parts(records, positions, skipped))
}

/// Build the corpus from raw source records, keeping their order
pub fn build_index(sources: Vec<SourceRecord>) -> Result<Corpus, EngineError> {
    build_from_results(sources.into_iter().map(Ok))
}

/// Build the corpus from a JSON array of source records.
/// Elements that do not fit the record shape are skipped like any other bad record.
pub fn build_index_from_json(docs_json: &str) -> Result<Corpus, EngineError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(docs_json).map_err(|source| EngineError::Json {
            what: "documents",
            source,
        })?;

    build_from_results(values.into_iter().map(|value| {
        serde_json::from_value::<SourceRecord>(value)
            .map_err(|e| SkipReason::Malformed(e.to_string()))
    }))
}
