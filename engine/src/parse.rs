/// Trim and lowercase a field value or query for comparison
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Tokenize text into words for matching (lowercase, split on whitespace/punctuation)
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Number of typos tolerated for a query token of `len` characters.
/// Short tokens must match exactly or as a prefix.
pub fn fuzzy_budget(len: usize) -> usize {
    match len {
        0..=3 => 0,
        4..=7 => 1,
        _ => 2,
    }
}

/// Levenshtein distance between `a` and `b`, or `None` once it exceeds `max`
pub fn edit_distance_within(a: &str, b: &str, max: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > max {
        return None;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
            row_min = row_min.min(curr[j + 1]);
        }
        // Every path through this row already costs more than allowed
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let distance = prev[b.len()];
    (distance <= max).then_some(distance)
}

/// A query token hits a field token when it is a prefix of it or within its typo budget
fn token_matches(query_token: &str, field_token: &str) -> bool {
    if field_token.starts_with(query_token) {
        return true;
    }
    let budget = fuzzy_budget(query_token.chars().count());
    budget > 0 && edit_distance_within(query_token, field_token, budget).is_some()
}

/// Tolerant comparison: every query token must hit some field token
pub fn fuzzy_match(query_tokens: &[String], field_tokens: &[String]) -> bool {
    !query_tokens.is_empty()
        && query_tokens
            .iter()
            .all(|q| field_tokens.iter().any(|f| token_matches(q, f)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        tokenize(text)
    }

    #[test]
    fn test_tokenize() {
        let result = tokenize("Hello, World!");
        assert_eq!(result, vec!["hello", "world"]);
    }

    #[test]
    fn test_normalize_trims_edges_only() {
        assert_eq!(normalize("  Date  Picker "), "date  picker");
    }

    #[test]
    fn test_fuzzy_budget_thresholds() {
        assert_eq!(fuzzy_budget(3), 0);
        assert_eq!(fuzzy_budget(4), 1);
        assert_eq!(fuzzy_budget(7), 1);
        assert_eq!(fuzzy_budget(8), 2);
    }

    #[test]
    fn test_edit_distance_within() {
        assert_eq!(edit_distance_within("button", "button", 0), Some(0));
        assert_eq!(edit_distance_within("buton", "button", 1), Some(1));
        assert_eq!(edit_distance_within("tooltip", "toltip", 1), Some(1));
        assert_eq!(edit_distance_within("modal", "dialog", 2), None);
        assert_eq!(edit_distance_within("a", "abcd", 2), None);
    }

    #[test]
    fn test_fuzzy_match_tolerates_typos() {
        assert!(fuzzy_match(&words("buton"), &words("Button")));
        assert!(fuzzy_match(&words("navigaton bar"), &words("Navigation Bar")));
        assert!(fuzzy_match(&words("modl"), &words("Modal Dialog")));
    }

    #[test]
    fn test_fuzzy_match_short_tokens_need_prefix() {
        assert!(fuzzy_match(&words("nav"), &words("Navigation")));
        assert!(!fuzzy_match(&words("bxn"), &words("Button")));
    }

    #[test]
    fn test_fuzzy_match_requires_every_token() {
        assert!(!fuzzy_match(&words("button tooltip"), &words("Button")));
        assert!(!fuzzy_match(&[], &words("Button")));
    }
}
