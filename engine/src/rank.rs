use crate::parse::{fuzzy_match, normalize, tokenize};
use crate::types::{
    Corpus, Field, FrequencySnapshot, GroupedResults, IndexedRecord, MatchedFields,
    NormalizedText, RankedHit, RecordType, ResolvedOptions, ScoredResult,
};
use std::cmp::Ordering;

/// Match tier scores: exact > prefix > substring > fuzzy
pub const EXACT_SCORE: f64 = 10.0;
pub const PREFIX_SCORE: f64 = 7.0;
pub const SUBSTRING_SCORE: f64 = 5.0;
pub const FUZZY_SCORE: f64 = 2.0;

/// History bonus: HISTORY_WEIGHT * ln(1 + count), capped below one exact match
pub const HISTORY_WEIGHT: f64 = 1.5;
pub const HISTORY_MAX_BONUS: f64 = 6.0;

pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Query prepared once per search
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    lower: String,
    tokens: Vec<String>,
}

impl Query {
    /// `None` for empty or whitespace-only input
    pub fn new(raw: &str) -> Option<Self> {
        let lower = normalize(raw);
        if lower.is_empty() {
            return None;
        }
        Some(Query {
            tokens: tokenize(&lower),
            lower,
        })
    }
}

/// Score one normalized field value against the query
pub fn text_score(query: &Query, text: &NormalizedText) -> f64 {
    if text.lower.is_empty() {
        0.0
    } else if text.lower == query.lower {
        EXACT_SCORE
    } else if text.lower.starts_with(&query.lower) {
        PREFIX_SCORE
    } else if text.lower.contains(&query.lower) {
        SUBSTRING_SCORE
    } else if fuzzy_match(&query.tokens, &text.tokens) {
        FUZZY_SCORE
    } else {
        0.0
    }
}

/// Multi-valued fields score by their best entry
fn best_score<'t>(query: &Query, texts: impl IntoIterator<Item = &'t NormalizedText>) -> f64 {
    texts
        .into_iter()
        .map(|text| text_score(query, text))
        .fold(0.0, f64::max)
}

/// Saturating bonus for previously selected records
pub fn history_bonus(selection_count: u32) -> f64 {
    (HISTORY_WEIGHT * (1.0 + f64::from(selection_count)).ln()).min(HISTORY_MAX_BONUS)
}

fn in_scope(record: &IndexedRecord, options: &ResolvedOptions) -> bool {
    match record.record_type() {
        RecordType::Story => options.include_stories,
        RecordType::Docs => options.include_docs,
    }
}

/// Total score and contributing fields for one record, `None` when nothing matched
pub fn score_record(
    query: &Query,
    record: &IndexedRecord,
    options: &ResolvedOptions,
    history: &FrequencySnapshot,
) -> Option<(f64, MatchedFields)> {
    let normalized = record.normalized();
    let field_scores = [
        (Field::Title, text_score(query, &normalized.title)),
        (
            Field::Description,
            best_score(query, normalized.description.as_ref()),
        ),
        (Field::Tags, best_score(query, &normalized.tags)),
        (
            Field::ComponentName,
            best_score(query, normalized.component_name.as_ref()),
        ),
        (Field::Headings, best_score(query, &normalized.headings)),
    ];

    let mut total = 0.0;
    let mut matched_fields = MatchedFields::new();
    for (field, raw) in field_scores {
        let weighted = raw * options.boosts.get(field);
        if weighted > 0.0 {
            total += weighted;
            matched_fields.insert(field);
        }
    }

    if total <= 0.0 {
        return None;
    }

    // Only relevant records get the bonus, so history never surfaces unrelated items
    if let Some(&count) = history.get(record.id()) {
        total += history_bonus(count);
    }

    Some((total, matched_fields))
}

fn score_at(
    position: usize,
    record: &IndexedRecord,
    query: &Query,
    options: &ResolvedOptions,
    history: &FrequencySnapshot,
) -> Option<RankedHit> {
    if !in_scope(record, options) {
        return None;
    }
    score_record(query, record, options, history).map(|(score, matched_fields)| RankedHit {
        position,
        score,
        matched_fields,
    })
}

#[cfg(feature = "native")]
fn score_corpus(
    query: &Query,
    options: &ResolvedOptions,
    corpus: &Corpus,
    history: &FrequencySnapshot,
) -> Vec<RankedHit> {
    use rayon::prelude::*;

    corpus
        .records()
        .par_iter()
        .enumerate()
        .filter_map(|(position, record)| score_at(position, record, query, options, history))
        .collect()
}

#[cfg(not(feature = "native"))]
fn score_corpus(
    query: &Query,
    options: &ResolvedOptions,
    corpus: &Corpus,
    history: &FrequencySnapshot,
) -> Vec<RankedHit> {
    score_sequential(query, options, corpus, history)
}

/// Single-threaded scoring, in corpus order
#[cfg(any(not(feature = "native"), test))]
fn score_sequential(
    query: &Query,
    options: &ResolvedOptions,
    corpus: &Corpus,
    history: &FrequencySnapshot,
) -> Vec<RankedHit> {
    corpus
        .records()
        .iter()
        .enumerate()
        .filter_map(|(position, record)| score_at(position, record, query, options, history))
        .collect()
}

/// Descending score, corpus order on ties
fn compare_hits(a: &RankedHit, b: &RankedHit) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then(a.position.cmp(&b.position))
}

/// Rank the corpus for a query, returning hits by corpus position
pub fn rank(
    query: &str,
    options: &ResolvedOptions,
    corpus: &Corpus,
    history: &FrequencySnapshot,
) -> Vec<RankedHit> {
    let Some(query) = Query::new(query) else {
        return Vec::new();
    };

    let mut hits = score_corpus(&query, options, corpus, history);
    hits.sort_by(compare_hits);
    hits.truncate(options.max_results);
    hits
}

/// Resolve hits against the corpus they were ranked on (filter out any missing records)
pub fn hydrate<'a>(hits: &[RankedHit], corpus: &'a Corpus) -> Vec<ScoredResult<'a>> {
    hits.iter()
        .filter_map(|hit| {
            let record = corpus.get(hit.position)?;
            Some(ScoredResult {
                record,
                score: hit.score,
                matched_fields: hit.matched_fields.clone(),
            })
        })
        .collect()
}

/// Rank and borrow the matching records
pub fn search<'a>(
    query: &str,
    options: &ResolvedOptions,
    corpus: &'a Corpus,
    history: &FrequencySnapshot,
) -> Vec<ScoredResult<'a>> {
    hydrate(&rank(query, options, corpus, history), corpus)
}

/// Split ranked results into stories and docs without reordering either group
pub fn group_results<'r, 'a>(results: &'r [ScoredResult<'a>]) -> GroupedResults<'r, 'a> {
    let (stories, docs): (Vec<_>, Vec<_>) = results
        .iter()
        .partition(|result| result.record.record_type() == RecordType::Story);
    GroupedResults { stories, docs }
}
