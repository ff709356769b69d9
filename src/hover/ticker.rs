//! Cashtag extraction.
//!
//! A cashtag is `$` followed by a maximal run of ASCII word characters
//! (`[A-Za-z0-9_]`) that contains at least one letter. `$1` and `$__`
//! are prices or punctuation, not tickers.

use regex::Regex;
use std::sync::LazyLock;

static CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$[A-Za-z0-9_]+").expect("cashtag pattern is valid")
});

/// Return the first cashtag in `text`, in document order, including the `$`.
///
/// Candidates are maximal runs, so rejecting a letterless run never hides a
/// valid ticker that starts inside it.
pub fn extract_ticker(text: &str) -> Option<&str> {
    CANDIDATE
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|candidate| candidate[1..].bytes().any(|b| b.is_ascii_alphabetic()))
}

/// Whether `token` is exactly one cashtag, e.g. `$BTC`.
pub fn is_ticker(token: &str) -> bool {
    extract_ticker(token) == Some(token)
}

/// Normalise user input (`btc`, `BTC`, `$BTC`) to a cashtag, if it can be one.
pub fn normalize_ticker(input: &str) -> Option<String> {
    let trimmed = input.trim();
    let tagged = if trimmed.starts_with('$') {
        trimmed.to_string()
    } else {
        format!("${trimmed}")
    };
    is_ticker(&tagged).then_some(tagged)
}
