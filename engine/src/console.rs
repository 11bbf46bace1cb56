// wasm32 has no tracing subscriber; the devtools console is the only sink there

/// Report a recoverable problem (bad source record, unusable history store)
#[cfg(target_arch = "wasm32")]
pub fn warn(message: &str) {
    web_sys::console::warn_1(&format!("[palette-search] {}", message).into());
}

/// Report a recoverable problem (bad source record, unusable history store)
#[cfg(not(target_arch = "wasm32"))]
pub fn warn(message: &str) {
    tracing::warn!("{}", message);
}

#[cfg(target_arch = "wasm32")]
pub fn perf(query: &str, results: usize, elapsed_ms: f64) {
    web_sys::console::log_1(
        &format!(
            "[perf] query='{}' results={} | total={:.1}ms",
            query, results, elapsed_ms
        )
        .into(),
    );
}

#[cfg(not(target_arch = "wasm32"))]
pub fn perf(query: &str, results: usize, elapsed_ms: f64) {
    tracing::debug!(query, results, elapsed_ms, "Search finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_warn_reaches_tracing_natively() {
        warn("Failed to save search history: quota exceeded");
        assert!(logs_contain("Failed to save search history: quota exceeded"));
    }

    #[test]
    #[traced_test]
    fn test_perf_line_is_logged_natively() {
        perf("button", 2, 0.5);
        assert!(logs_contain("Search finished"));
        assert!(logs_contain("results=2"));
    }
}
