// src/checker/links.rs
// =============================================================================
// This module pulls literal URLs out of plain text.
//
// Unlike a markdown or HTML parser, we don't understand any document
// structure here. We simply scan the text with a regular expression and keep
// everything that looks like an absolute http:// or https:// URL.
//
// Rules:
// - A link starts with http:// or https://
// - It runs until whitespace, a quote, a closing parenthesis or an angle bracket
// - Any stray quote or angle bracket left in a match is stripped
// - Order of appearance is kept, duplicates are kept
//
// Rust concepts:
// - OnceLock: Compile the regex once, reuse it on every call
// - Iterators: find_iter() yields matches lazily
// =============================================================================

use regex::Regex;
use std::sync::OnceLock;

// Characters that never belong at the end of (or inside) an extracted URL
const STRIPPED: [char; 4] = ['"', '\'', '<', '>'];

fn url_regex() -> &'static Regex {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    URL_REGEX.get_or_init(|| Regex::new(r#"https?://[^\s"')<>]+"#).expect("URL pattern is valid"))
}

// Extracts all HTTP/HTTPS links from plain text
//
// Parameters:
//   content: the text to scan (borrowed as &str)
//
// Returns: Vec<String> with every URL in the order it appears
//
// Example input:
//   "Here are some links: https://example.com and http://test.com"
//
// Example output:
//   vec!["https://example.com", "http://test.com"]
pub fn extract_links(content: &str) -> Vec<String> {
    url_regex()
        .find_iter(content)
        .map(|m| m.as_str().replace(STRIPPED, ""))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_two_links_in_order() {
        let content = "Here are some links: https://example.com and http://test.com";
        let links = extract_links(content);
        assert_eq!(links, vec!["https://example.com", "http://test.com"]);
    }

    #[test]
    fn test_no_links_gives_empty_vec() {
        assert!(extract_links("nothing to see here, not even ftp://x.org").is_empty());
        assert!(extract_links("").is_empty());
    }

    #[test]
    fn test_stops_at_quotes_brackets_and_parens() {
        let content = r#"<a href="https://a.com/x">a</a> ('https://b.com') [c](https://c.com/y) <https://d.com>"#;
        let links = extract_links(content);
        assert_eq!(
            links,
            vec![
                "https://a.com/x",
                "https://b.com",
                "https://c.com/y",
                "https://d.com",
            ]
        );
    }

    #[test]
    fn test_keeps_duplicates() {
        let links = extract_links("http://x.io http://x.io");
        assert_eq!(links, vec!["http://x.io", "http://x.io"]);
    }

    #[test]
    fn test_keeps_paths_queries_and_fragments() {
        let links = extract_links("see https://example.com/a/b?c=1&d=2#top.");
        assert_eq!(links, vec!["https://example.com/a/b?c=1&d=2#top."]);
    }

    #[test]
    fn test_bare_scheme_is_not_a_link() {
        assert!(extract_links("https:// and http://\"").is_empty());
    }

    #[test]
    fn test_every_link_is_clean() {
        let content = "mixed 'https://one.org' \"http://two.org/p\" <http://three.org>\n\
                       https://four.org\thttp://five.org/q?x=<y>";
        let links = extract_links(content);
        assert_eq!(links.len(), 5);
        for link in &links {
            assert!(link.starts_with("http://") || link.starts_with("https://"));
            assert!(!link.contains(STRIPPED));
            assert!(!link.chars().any(char::is_whitespace));
        }
    }
}
