use crate::error::EngineError;
use crate::types::{FieldBoosts, SearchOptions};
use serde::Serialize;
use std::collections::HashSet;

/// Icon used when a catalog entry has none
pub const DEFAULT_ICON: &str = "🔍";

/// Result limit applied by `new:`
pub const NEW_MAX_RESULTS: i64 = 20;

/// What a catalog entry does to the search. Entries are plain data, so matching
/// a prefix never runs caller-supplied code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ShortcutKind {
    StoriesOnly,
    DocsOnly,
    ComponentName,
    Tags,
    Headings,
    TopMatches,
}

impl ShortcutKind {
    pub fn options(self) -> SearchOptions {
        match self {
            ShortcutKind::StoriesOnly => SearchOptions {
                include_stories: Some(true),
                include_docs: Some(false),
                ..SearchOptions::default()
            },
            ShortcutKind::DocsOnly => SearchOptions {
                include_stories: Some(false),
                include_docs: Some(true),
                ..SearchOptions::default()
            },
            ShortcutKind::ComponentName => SearchOptions {
                boost: FieldBoosts {
                    component_name: Some(5.0),
                    title: Some(3.0),
                    ..FieldBoosts::default()
                },
                ..SearchOptions::default()
            },
            ShortcutKind::Tags => SearchOptions {
                boost: FieldBoosts {
                    tags: Some(5.0),
                    title: Some(2.0),
                    ..FieldBoosts::default()
                },
                ..SearchOptions::default()
            },
            ShortcutKind::Headings => SearchOptions {
                include_stories: Some(false),
                include_docs: Some(true),
                boost: FieldBoosts {
                    headings: Some(5.0),
                    ..FieldBoosts::default()
                },
                ..SearchOptions::default()
            },
            ShortcutKind::TopMatches => SearchOptions {
                max_results: Some(NEW_MAX_RESULTS),
                ..SearchOptions::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shortcut {
    pub prefix: &'static str,
    pub description: &'static str,
    pub icon: Option<&'static str>,
    pub kind: ShortcutKind,
}

static SHORTCUTS: [Shortcut; 6] = [
    Shortcut {
        prefix: "s:",
        description: "Search stories only",
        icon: Some("📖"),
        kind: ShortcutKind::StoriesOnly,
    },
    Shortcut {
        prefix: "d:",
        description: "Search documentation only",
        icon: Some("📝"),
        kind: ShortcutKind::DocsOnly,
    },
    Shortcut {
        prefix: "c:",
        description: "Search by component name",
        icon: Some("🧩"),
        kind: ShortcutKind::ComponentName,
    },
    Shortcut {
        prefix: "t:",
        description: "Search by tags",
        icon: Some("🏷️"),
        kind: ShortcutKind::Tags,
    },
    Shortcut {
        prefix: "h:",
        description: "Search documentation headings",
        icon: Some("📑"),
        kind: ShortcutKind::Headings,
    },
    Shortcut {
        prefix: "new:",
        description: "Show the top 20 matches",
        icon: None,
        kind: ShortcutKind::TopMatches,
    },
];

/// Query with its shortcut prefix stripped
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedQuery {
    pub query: String,
    pub options: SearchOptions,
}

/// The shortcut whose prefix starts `raw` (case-insensitive, position 0 only)
fn match_prefix(raw: &str) -> Option<&'static Shortcut> {
    SHORTCUTS.iter().find(|shortcut| {
        raw.get(..shortcut.prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(shortcut.prefix))
    })
}

pub fn has_shortcut(raw: &str) -> bool {
    match_prefix(raw).is_some()
}

/// Strip a leading shortcut. `None` when `raw` does not start with one.
///
/// One space after the colon and all trailing whitespace are removed; the
/// rest of the payload, including its casing and any further colons, is kept.
pub fn process_query(raw: &str) -> Option<ProcessedQuery> {
    let shortcut = match_prefix(raw)?;
    let rest = raw.get(shortcut.prefix.len()..).unwrap_or_default();
    let rest = rest.strip_prefix(' ').unwrap_or(rest).trim_end();

    Some(ProcessedQuery {
        query: rest.to_string(),
        options: shortcut.kind.options(),
    })
}

pub fn shortcuts() -> &'static [Shortcut] {
    &SHORTCUTS
}

/// Catalog entries whose prefix starts with, or whose description contains, `partial`
pub fn shortcut_suggestions(partial: &str) -> Vec<&'static Shortcut> {
    let needle = partial.to_lowercase();
    SHORTCUTS
        .iter()
        .filter(|shortcut| {
            shortcut.prefix.starts_with(&needle)
                || shortcut.description.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn format_shortcut(shortcut: &Shortcut) -> String {
    format!(
        "{} {} {}",
        shortcut.icon.unwrap_or(DEFAULT_ICON),
        shortcut.prefix,
        shortcut.description
    )
}

/// One formatted line per catalog entry
pub fn help_text() -> String {
    SHORTCUTS
        .iter()
        .map(format_shortcut)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reject catalogs that could never match or would match ambiguously
pub fn validate_catalog(entries: &[Shortcut]) -> Result<(), EngineError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for entry in entries {
        let invalid = |reason: &'static str| EngineError::InvalidShortcut {
            prefix: entry.prefix.to_string(),
            reason,
        };
        if entry.prefix.len() < 2 || !entry.prefix.ends_with(':') {
            return Err(invalid("prefix must be a name followed by `:`"));
        }
        if entry.prefix.chars().any(char::is_whitespace) {
            return Err(invalid("prefix must not contain whitespace"));
        }
        if entry.prefix != entry.prefix.to_lowercase() {
            return Err(invalid("prefix must be lowercase"));
        }
        if entry.description.trim().is_empty() {
            return Err(invalid("description must not be empty"));
        }
        if !seen.insert(entry.prefix) {
            return Err(invalid("prefix is listed twice"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_shortcut() {
        assert!(has_shortcut("s: button"));
        assert!(has_shortcut("S:button"));
        assert!(has_shortcut("NEW: thing"));
        assert!(!has_shortcut(" s: button"));
        assert!(!has_shortcut("button s: x"));
        assert!(!has_shortcut("x: button"));
        assert!(!has_shortcut(""));
    }

    #[test]
    fn test_process_query_without_prefix() {
        assert_eq!(process_query("button"), None);
        assert_eq!(process_query("ne: w"), None);
    }

    #[test]
    fn test_stories_prefix() {
        let processed = process_query("s: Button").unwrap();
        assert_eq!(processed.query, "Button");
        assert_eq!(processed.options.include_stories, Some(true));
        assert_eq!(processed.options.include_docs, Some(false));
    }

    #[test]
    fn test_prefix_is_case_insensitive_payload_is_not() {
        let processed = process_query("D:Getting Started").unwrap();
        assert_eq!(processed.query, "Getting Started");
        assert_eq!(processed.options.include_docs, Some(true));
    }

    #[test]
    fn test_only_edges_are_trimmed() {
        let processed = process_query("t: lots   of   spaces   ").unwrap();
        assert_eq!(processed.query, "lots   of   spaces");
    }

    #[test]
    fn test_later_colons_stay_in_query() {
        let processed = process_query("s: test: with: colons").unwrap();
        assert_eq!(processed.query, "test: with: colons");
        assert_eq!(processed.options, ShortcutKind::StoriesOnly.options());
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(process_query("c:").unwrap().query, "");
        assert_eq!(process_query("c:   ").unwrap().query, "");
    }

    #[test]
    fn test_option_table() {
        let component = ShortcutKind::ComponentName.options();
        assert_eq!(component.boost.component_name, Some(5.0));
        assert_eq!(component.boost.title, Some(3.0));

        let tags = ShortcutKind::Tags.options();
        assert_eq!(tags.boost.tags, Some(5.0));
        assert_eq!(tags.boost.title, Some(2.0));

        let headings = ShortcutKind::Headings.options();
        assert_eq!(headings.include_docs, Some(true));
        assert_eq!(headings.include_stories, Some(false));
        assert_eq!(headings.boost.headings, Some(5.0));

        assert_eq!(process_query("new: x").unwrap().options.max_results, Some(20));
    }

    #[test]
    fn test_new_prefix_only_limits_top_matches() {
        let new = match_prefix("new: card").unwrap();
        assert_eq!(new.kind, ShortcutKind::TopMatches);
        assert_eq!(
            new.kind.options(),
            SearchOptions {
                max_results: Some(NEW_MAX_RESULTS),
                ..SearchOptions::default()
            }
        );
        assert_eq!(serde_json::to_value(new.kind).unwrap(), "topMatches");
    }

    #[test]
    fn test_suggestions_match_prefix_or_description() {
        let by_prefix: Vec<&str> = shortcut_suggestions("NEW").iter().map(|s| s.prefix).collect();
        assert_eq!(by_prefix, vec!["new:"]);

        let by_description: Vec<&str> = shortcut_suggestions("DOCUMENTATION")
            .iter()
            .map(|s| s.prefix)
            .collect();
        assert_eq!(by_description, vec!["d:", "h:"]);

        assert_eq!(shortcut_suggestions("").len(), shortcuts().len());
    }

    #[test]
    fn test_format_uses_default_icon() {
        let new = shortcuts().iter().find(|s| s.prefix == "new:").unwrap();
        assert_eq!(format_shortcut(new), "🔍 new: Show the top 20 matches");
        assert_eq!(format_shortcut(&shortcuts()[0]), "📖 s: Search stories only");
    }

    #[test]
    fn test_help_text_has_one_line_per_shortcut() {
        assert_eq!(help_text().lines().count(), shortcuts().len());
        assert_eq!(help_text().lines().count(), 6);
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        assert!(validate_catalog(shortcuts()).is_ok());
    }

    #[test]
    fn test_validate_catalog_rejects_bad_entries() {
        let entry = shortcuts()[0];
        let duplicated = [entry, entry];
        assert!(matches!(
            validate_catalog(&duplicated),
            Err(EngineError::InvalidShortcut { reason: "prefix is listed twice", .. })
        ));

        let no_colon = Shortcut { prefix: "s", ..entry };
        assert!(validate_catalog(&[no_colon]).is_err());

        let upper = Shortcut { prefix: "S:", ..entry };
        assert!(validate_catalog(&[upper]).is_err());
    }
}
