//! Profile page detection on x.com URLs.

use reqwest::Url;
use tracing::debug;

const PROFILE_HOST: &str = "x.com";

/// First path segments that are site navigation, not usernames.
const NAVIGATION_PAGES: &[&str] = &[
    "home",
    "explore",
    "notifications",
    "messages",
    "search",
    "settings",
    "i",
    "logout",
];

/// Profile sub-tabs that still belong to the profile page.
const PROFILE_TABS: &[&str] = &["with_replies", "highlights", "media", "superfollows"];

/// Username of the profile a URL points at, e.g. `https://x.com/aixbt_agent`.
///
/// `None` for other hosts, navigation pages, deep links such as
/// `/user/status/123`, and unparseable input.
pub fn extract_username_from_url(url: &str) -> Option<String> {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(e) => {
            debug!(url, error = %e, "Invalid URL");
            return None;
        }
    };

    if parsed.host_str() != Some(PROFILE_HOST) {
        return None;
    }

    let segments: Vec<&str> = parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .collect();

    if let Some(second) = segments.get(1) {
        if !PROFILE_TABS.contains(second) {
            return None;
        }
    }

    let first = segments.first()?;
    if NAVIGATION_PAGES.contains(first) {
        return None;
    }
    Some(first.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_url() {
        assert_eq!(
            extract_username_from_url("https://x.com/aixbt_agent").as_deref(),
            Some("aixbt_agent")
        );
        assert_eq!(
            extract_username_from_url("https://x.com/aixbt_agent/").as_deref(),
            Some("aixbt_agent")
        );
    }

    #[test]
    fn test_profile_tabs_allowed() {
        assert_eq!(
            extract_username_from_url("https://x.com/elonmusk/with_replies").as_deref(),
            Some("elonmusk")
        );
        assert_eq!(
            extract_username_from_url("https://x.com/elonmusk/media?lang=en").as_deref(),
            Some("elonmusk")
        );
    }

    #[test]
    fn test_deep_links_rejected() {
        assert_eq!(extract_username_from_url("https://x.com/elonmusk/status/123"), None);
        assert_eq!(extract_username_from_url("https://x.com/elonmusk/followers"), None);
    }

    #[test]
    fn test_navigation_pages_rejected() {
        for page in ["home", "explore", "notifications", "messages", "search", "settings", "i", "logout"] {
            assert_eq!(extract_username_from_url(&format!("https://x.com/{page}")), None, "{page}");
        }
    }

    #[test]
    fn test_other_hosts_and_garbage() {
        assert_eq!(extract_username_from_url("https://twitter.com/aixbt_agent"), None);
        assert_eq!(extract_username_from_url("https://www.x.com/aixbt_agent"), None);
        assert_eq!(extract_username_from_url("https://x.com/"), None);
        assert_eq!(extract_username_from_url("not a url"), None);
    }
}
