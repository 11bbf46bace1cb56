use crate::parse::{normalize, tokenize};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Kind of searchable record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Story,
    Docs,
}

/// Raw record as handed over by the story/doc metadata harvester.
/// Every field may be missing; the index builder decides what survives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub path: Option<String>,
    pub tags: Option<Vec<String>>,
    pub component_name: Option<String>,
    pub description: Option<String>,
    pub headings: Option<Vec<String>>,
}

/// Lowercased shadow of a field, computed once when the record is indexed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedText {
    pub lower: String,
    pub tokens: Vec<String>,
}

impl NormalizedText {
    pub fn new(text: &str) -> Self {
        NormalizedText {
            lower: normalize(text),
            tokens: tokenize(text),
        }
    }
}

/// Shadow copies of every matchable field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedFields {
    pub title: NormalizedText,
    pub description: Option<NormalizedText>,
    pub component_name: Option<NormalizedText>,
    pub tags: Vec<NormalizedText>,
    pub headings: Vec<NormalizedText>,
}

/// One searchable unit of the corpus.
///
/// Fields are private so the normalized shadows can never drift from the
/// values they were derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedRecord {
    id: String,
    title: String,
    #[serde(rename = "type")]
    record_type: RecordType,
    path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    component_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    headings: Vec<String>,
    #[serde(skip)]
    normalized: NormalizedFields,
}

impl IndexedRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        record_type: RecordType,
        path: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let normalized = NormalizedFields {
            title: NormalizedText::new(&title),
            ..NormalizedFields::default()
        };
        IndexedRecord {
            id: id.into(),
            title,
            record_type,
            path: path.into(),
            tags: Vec::new(),
            component_name: None,
            description: None,
            headings: Vec::new(),
            normalized,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.normalized.tags = tags.iter().map(|t| NormalizedText::new(t)).collect();
        self.tags = tags;
        self
    }

    pub fn with_component_name(mut self, component_name: Option<String>) -> Self {
        self.normalized.component_name = component_name.as_deref().map(NormalizedText::new);
        self.component_name = component_name;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.normalized.description = description.as_deref().map(NormalizedText::new);
        self.description = description;
        self
    }

    pub fn with_headings(mut self, headings: Vec<String>) -> Self {
        self.normalized.headings = headings.iter().map(|h| NormalizedText::new(h)).collect();
        self.headings = headings;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn component_name(&self) -> Option<&str> {
        self.component_name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn headings(&self) -> &[String] {
        &self.headings
    }

    pub(crate) fn normalized(&self) -> &NormalizedFields {
        &self.normalized
    }
}

/// Why a source record was left out of the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum SkipReason {
    #[error("missing mandatory field `{0}`")]
    MissingField(&'static str),
    #[error("unknown record type `{0}`")]
    UnknownType(String),
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// A source record the index builder dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRecord {
    /// Position in the source sequence
    pub position: usize,
    pub id: Option<String>,
    pub reason: SkipReason,
}

/// Immutable snapshot of the indexed records.
/// Rebuilds produce a new corpus instead of mutating this one.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    records: Vec<IndexedRecord>,
    positions: HashMap<String, usize>,
    skipped: Vec<SkippedRecord>,
}

impl Corpus {
    pub(crate) fn from_parts(
        records: Vec<IndexedRecord>,
        positions: HashMap<String, usize>,
        skipped: Vec<SkippedRecord>,
    ) -> Self {
        Corpus {
            records,
            positions,
            skipped,
        }
    }

    pub fn records(&self) -> &[IndexedRecord] {
        &self.records
    }

    pub fn get(&self, position: usize) -> Option<&IndexedRecord> {
        self.records.get(position)
    }

    pub fn by_id(&self, id: &str) -> Option<&IndexedRecord> {
        self.positions.get(id).and_then(|&pos| self.records.get(pos))
    }

    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Matchable field of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Title,
    Description,
    Tags,
    ComponentName,
    Headings,
}

/// Fields that contributed a non-zero score, in a fixed order
pub type MatchedFields = BTreeSet<Field>;

/// Per-field score multipliers; unset means 1
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldBoosts {
    pub title: Option<f64>,
    pub component_name: Option<f64>,
    pub tags: Option<f64>,
    pub headings: Option<f64>,
}

/// Search options as produced by shortcuts or passed by callers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOptions {
    pub include_stories: Option<bool>,
    pub include_docs: Option<bool>,
    pub boost: FieldBoosts,
    /// Signed so that a negative limit can be clamped instead of rejected
    pub max_results: Option<i64>,
}

impl SearchOptions {
    pub fn include_stories(&self) -> bool {
        self.include_stories.unwrap_or(true)
    }

    pub fn include_docs(&self) -> bool {
        self.include_docs.unwrap_or(true)
    }

    /// Fill in defaults and clamp malformed values
    pub fn resolve(&self, default_max_results: usize) -> ResolvedOptions {
        let max_results = match self.max_results {
            None => default_max_results,
            Some(n) if n <= 0 => 0,
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
        };

        ResolvedOptions {
            include_stories: self.include_stories(),
            include_docs: self.include_docs(),
            boosts: ResolvedBoosts {
                title: resolve_boost(self.boost.title),
                description: 1.0,
                component_name: resolve_boost(self.boost.component_name),
                tags: resolve_boost(self.boost.tags),
                headings: resolve_boost(self.boost.headings),
            },
            max_results,
        }
    }
}

fn resolve_boost(boost: Option<f64>) -> f64 {
    match boost {
        Some(b) if b.is_finite() => b.max(0.0),
        _ => 1.0,
    }
}

/// Multipliers with every field filled in
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBoosts {
    pub title: f64,
    pub description: f64,
    pub component_name: f64,
    pub tags: f64,
    pub headings: f64,
}

impl ResolvedBoosts {
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Title => self.title,
            Field::Description => self.description,
            Field::Tags => self.tags,
            Field::ComponentName => self.component_name,
            Field::Headings => self.headings,
        }
    }
}

/// Options after defaults are applied. Serializes with a fixed field order,
/// which makes it usable as part of a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOptions {
    pub include_stories: bool,
    pub include_docs: bool,
    pub boosts: ResolvedBoosts,
    pub max_results: usize,
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        SearchOptions::default().resolve(crate::rank::DEFAULT_MAX_RESULTS)
    }
}

/// Ranking output that refers to records by corpus position
#[derive(Debug, Clone, PartialEq)]
pub struct RankedHit {
    pub position: usize,
    pub score: f64,
    pub matched_fields: MatchedFields,
}

/// A ranked record borrowed from the corpus
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredResult<'a> {
    pub record: &'a IndexedRecord,
    pub score: f64,
    pub matched_fields: MatchedFields,
}

/// Read-only split of a ranked list into stories and documentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedResults<'r, 'a> {
    pub stories: Vec<&'r ScoredResult<'a>>,
    pub docs: Vec<&'r ScoredResult<'a>>,
}

/// Selection history for one result id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub result_id: String,
    pub selection_count: u32,
    /// Milliseconds since the Unix epoch
    pub last_selected_at: f64,
}

/// History entries: result_id -> HistoryEntry
pub type HistoryMap = HashMap<String, HistoryEntry>;

/// Selection counts: result_id -> count
pub type FrequencySnapshot = HashMap<String, u32>;

/// Engine configuration passed from JavaScript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub cache_capacity: usize,
    pub default_max_results: usize,
    pub history_storage_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            cache_capacity: crate::cache::DEFAULT_CAPACITY,
            default_max_results: crate::rank::DEFAULT_MAX_RESULTS,
            history_storage_key: String::from("palette-search-history"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_scope_includes_everything() {
        let options = SearchOptions::default().resolve(50);
        assert!(options.include_stories);
        assert!(options.include_docs);
        assert_eq!(options.max_results, 50);
    }

    #[test]
    fn test_negative_max_results_clamps_to_zero() {
        let options = SearchOptions {
            max_results: Some(-5),
            ..SearchOptions::default()
        };
        assert_eq!(options.resolve(50).max_results, 0);
    }

    #[test]
    fn test_malformed_boosts_resolve() {
        let options = SearchOptions {
            boost: FieldBoosts {
                title: Some(f64::NAN),
                tags: Some(-2.0),
                component_name: Some(5.0),
                headings: None,
            },
            ..SearchOptions::default()
        };
        let boosts = options.resolve(50).boosts;
        assert_eq!(boosts.title, 1.0);
        assert_eq!(boosts.tags, 0.0);
        assert_eq!(boosts.component_name, 5.0);
        assert_eq!(boosts.headings, 1.0);
        assert_eq!(boosts.get(Field::Description), 1.0);
    }

    #[test]
    fn test_shadow_fields_follow_values() {
        let record = IndexedRecord::new("button--primary", "Primary Button", RecordType::Story, "/story/button")
            .with_tags(vec![String::from("Forms")])
            .with_component_name(Some(String::from("Button")));
        let normalized = record.normalized();
        assert_eq!(normalized.title.lower, "primary button");
        assert_eq!(normalized.title.tokens, vec!["primary", "button"]);
        assert_eq!(normalized.tags[0].lower, "forms");
        assert_eq!(normalized.component_name.as_ref().map(|c| c.lower.as_str()), Some("button"));
    }

    #[test]
    fn test_record_serializes_without_shadows() {
        let record = IndexedRecord::new("intro", "Intro", RecordType::Docs, "/docs/intro");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "docs");
        assert!(json.get("normalized").is_none());
        assert!(json.get("tags").is_none());
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: EngineConfig = serde_json::from_str(r#"{"cacheCapacity": 10}"#).unwrap();
        assert_eq!(config.cache_capacity, 10);
        assert_eq!(config.default_max_results, 50);
    }
}
