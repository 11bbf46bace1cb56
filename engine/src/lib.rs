use std::cell::RefCell;
use wasm_bindgen::prelude::*;

pub mod build;
pub mod cache;
pub mod clock;
pub mod console;
pub mod engine;
pub mod error;
pub mod history;
pub mod parse;
pub mod rank;
pub mod shortcuts;
pub mod storage;
pub mod types;

pub use crate::engine::{SearchEngine, SearchResponse};
pub use crate::error::{EngineError, StorageError};
pub use crate::storage::{HistoryStorage, MemoryStorage};
pub use crate::types::{
    Corpus, EngineConfig, Field, HistoryEntry, IndexedRecord, RecordType, ScoredResult,
    SearchOptions, SourceRecord,
};

const NOT_INITIALIZED: &str =
    "Engine not initialized. Call init_engine(docs_json, config_json) first.";

// Use thread_local with RefCell for lazy initialization from JS
thread_local! {
    static ENGINE: RefCell<Option<SearchEngine>> = const { RefCell::new(None) };
}

fn with_engine<T>(f: impl FnOnce(&mut SearchEngine) -> Result<T, JsError>) -> Result<T, JsError> {
    ENGINE.with(|engine| match engine.borrow_mut().as_mut() {
        Some(eng) => f(eng),
        None => Err(JsError::new(NOT_INITIALIZED)),
    })
}

#[cfg(target_arch = "wasm32")]
fn history_storage(config: &EngineConfig) -> Box<dyn HistoryStorage> {
    Box::new(storage::LocalStorage::new(config.history_storage_key.clone()))
}

#[cfg(not(target_arch = "wasm32"))]
fn history_storage(_config: &EngineConfig) -> Box<dyn HistoryStorage> {
    Box::new(MemoryStorage::new())
}

/// Initialize the search engine with documents and config from JavaScript
/// docs_json: JSON array of source records ({id, title, type, path, tags, componentName, description, headings})
/// config_json: JSON EngineConfig, every field optional ("" or "{}" for defaults)
#[wasm_bindgen]
pub fn init_engine(docs_json: &str, config_json: &str) -> Result<(), JsError> {
    let config: EngineConfig = if config_json.trim().is_empty() {
        EngineConfig::default()
    } else {
        serde_json::from_str(config_json)
            .map_err(|e| JsError::new(&format!("Failed to parse config: {}", e)))?
    };

    let corpus = build::build_index_from_json(docs_json)?;
    let storage = history_storage(&config);
    let engine = SearchEngine::from_corpus(corpus, config, storage)?;

    ENGINE.with(|slot| {
        *slot.borrow_mut() = Some(engine);
    });

    Ok(())
}

/// Check if the engine has been initialized
#[wasm_bindgen]
pub fn is_engine_ready() -> bool {
    ENGINE.with(|engine| engine.borrow().is_some())
}

/// Replace the corpus; every cached ranking is dropped. Returns the number of indexed records.
#[wasm_bindgen]
pub fn rebuild_index(docs_json: &str) -> Result<usize, JsError> {
    let corpus = build::build_index_from_json(docs_json)?;
    with_engine(|engine| Ok(engine.replace_corpus(corpus)))
}

/// Run a raw palette query (shortcuts allowed) and return {query, results, groups} as JSON
#[wasm_bindgen]
pub fn process_and_search(raw_query: &str) -> Result<String, JsError> {
    with_engine(|engine| {
        let start = clock::now_ms();
        let response = engine.process_and_search(raw_query);
        let json = serde_json::to_string(&response)
            .map_err(|e| JsError::new(&format!("Failed to serialize results: {}", e)))?;
        console::perf(raw_query, response.results.len(), clock::now_ms() - start);
        Ok(json)
    })
}

/// Record that the user picked a result
#[wasm_bindgen]
pub fn record_selection(result_id: &str) -> Result<(), JsError> {
    with_engine(|engine| {
        engine.record_selection(result_id);
        Ok(())
    })
}

/// Recently and frequently picked records as a JSON array
#[wasm_bindgen]
pub fn recent_suggestions(limit: usize) -> Result<String, JsError> {
    with_engine(|engine| {
        serde_json::to_string(&engine.recent_suggestions(limit))
            .map_err(|e| JsError::new(&format!("Failed to serialize suggestions: {}", e)))
    })
}

/// Whether the raw query starts with a shortcut prefix
#[wasm_bindgen]
pub fn has_shortcut(raw_query: &str) -> bool {
    shortcuts::has_shortcut(raw_query)
}

/// One formatted line per shortcut
#[wasm_bindgen]
pub fn shortcut_help_text() -> String {
    shortcuts::help_text()
}

/// Shortcuts matching a partially typed prefix or description, as JSON
#[wasm_bindgen]
pub fn shortcut_suggestions(partial: &str) -> Result<String, JsError> {
    serde_json::to_string(&shortcuts::shortcut_suggestions(partial))
        .map_err(|e| JsError::new(&format!("Failed to serialize shortcuts: {}", e)))
}

/// Get total number of indexed documents
#[wasm_bindgen]
pub fn get_doc_count() -> Result<usize, JsError> {
    with_engine(|engine| Ok(engine.corpus().len()))
}
