use skyfacet_types::Facet;

use crate::error::FacetResult;
use crate::patterns::{PatternKind, PatternSet};
use crate::scanner::scan;

/// Display strings longer than this many bytes are shortened in the post text
pub const DISPLAY_LENGTH_LIMIT: usize = 24;

const ELLIPSIS: &str = "..";
const HTTPS: &str = "https://";
const HTTP: &str = "http://";

/// A matched URL split into the address a facet points at and the text shown in the post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLink {
    pub uri: String,
    pub display: String,
}

impl NormalizedLink {
    pub fn from_match(matched: &str) -> Self {
        let (uri, display) = if let Some(rest) = matched.strip_prefix(HTTPS) {
            (matched.to_string(), rest)
        } else if let Some(rest) = matched.strip_prefix(HTTP) {
            (matched.to_string(), rest)
        } else {
            (format!("{}{}", HTTPS, matched), matched)
        };

        Self {
            uri,
            display: shorten_display(display),
        }
    }
}

/// Cut `display` to `DISPLAY_LENGTH_LIMIT - 2` bytes plus `..` when it is too long.
/// The cut moves back to the previous char boundary inside multi-byte characters.
pub fn shorten_display(display: &str) -> String {
    if display.len() <= DISPLAY_LENGTH_LIMIT {
        return display.to_string();
    }

    let mut cut = DISPLAY_LENGTH_LIMIT - ELLIPSIS.len();
    while !display.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}", &display[..cut], ELLIPSIS)
}

/// Detect links in `text`, rewrite each one to its display form in place and return the
/// rewritten text with one link facet per link.
///
/// Every occurrence is rewritten where it was matched, so repeated identical URLs are all
/// shortened and facet offsets account for text removed by earlier links.
pub fn normalize_links(patterns: &PatternSet, text: &str) -> FacetResult<(String, Vec<Facet>)> {
    let spans = scan(PatternKind::Link, patterns.get(PatternKind::Link), text)?;

    let mut rewritten = String::with_capacity(text.len());
    let mut facets = Vec::new();
    let mut cursor = 0;

    for span in spans {
        // Mentions and tags containing a dot look like hosts to the link pattern
        if span.matched.starts_with(['@', '#']) {
            continue;
        }

        let link = NormalizedLink::from_match(span.matched);

        rewritten.push_str(&text[cursor..span.start]);
        let byte_start = rewritten.len();
        rewritten.push_str(&link.display);
        facets.push(Facet::link(byte_start, rewritten.len(), link.uri));

        cursor = span.end;
    }
    rewritten.push_str(&text[cursor..]);

    tracing::debug!(
        "link normalization produced {} facets ({} -> {} bytes)",
        facets.len(),
        text.len(),
        rewritten.len()
    );

    Ok((rewritten, facets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyfacet_types::Feature;

    fn normalize(text: &str) -> (String, Vec<Facet>) {
        normalize_links(PatternSet::shared().unwrap(), text).unwrap()
    }

    fn uri(facet: &Facet) -> &str {
        match &facet.feature {
            Feature::Link { uri } => uri,
            other => panic!("expected link feature, got {:?}", other),
        }
    }

    #[test]
    fn test_normalized_link_schemes() {
        let https = NormalizedLink::from_match("https://cats.cool");
        assert_eq!(https.uri, "https://cats.cool");
        assert_eq!(https.display, "cats.cool");

        let http = NormalizedLink::from_match("http://scooby.doo");
        assert_eq!(http.uri, "http://scooby.doo");
        assert_eq!(http.display, "scooby.doo");

        let bare = NormalizedLink::from_match("jakeabed.dev");
        assert_eq!(bare.uri, "https://jakeabed.dev");
        assert_eq!(bare.display, "jakeabed.dev");
    }

    #[test]
    fn test_shorten_display() {
        assert_eq!(shorten_display("exactly-24-bytes-long.io"), "exactly-24-bytes-long.io");
        let long = "github.com/jake-abed/bsgortp";
        let short = shorten_display(long);
        assert_eq!(short, "github.com/jake-abed/b..");
        assert_eq!(short.len(), DISPLAY_LENGTH_LIMIT);
    }

    #[test]
    fn test_shorten_display_respects_char_boundaries() {
        // 21 ASCII bytes then a 3-byte char spanning the cut at byte 22
        let display = format!("{}{}", "a".repeat(21), "日本語");
        let short = shorten_display(&display);
        assert_eq!(short, format!("{}..", "a".repeat(21)));
    }

    #[test]
    fn test_link_with_scheme() {
        let (text, facets) = normalize("go visit https://cats.cool");
        assert_eq!(text, "go visit cats.cool");
        assert_eq!(facets, vec![Facet::link(9, 18, "https://cats.cool")]);
    }

    #[test]
    fn test_link_without_scheme() {
        let (text, facets) = normalize("my website is jakeabed.dev");
        assert_eq!(text, "my website is jakeabed.dev");
        assert_eq!(facets, vec![Facet::link(14, 26, "https://jakeabed.dev")]);
    }

    #[test]
    fn test_later_offsets_follow_rewritten_text() {
        let (text, facets) = normalize("https://lucky.me is a copy of dog.dev");
        assert_eq!(text, "lucky.me is a copy of dog.dev");
        assert_eq!(facets.len(), 2);
        assert_eq!(facets[0], Facet::link(0, 8, "https://lucky.me"));
        assert_eq!(uri(&facets[1]), "https://dog.dev");
        assert_eq!(facets[1].slice(&text), Some("dog.dev"));
    }

    #[test]
    fn test_long_link_is_truncated() {
        let (text, facets) = normalize("code: https://github.com/jake-abed/bsgortp ok");
        assert_eq!(text, "code: github.com/jake-abed/b.. ok");
        assert_eq!(facets.len(), 1);
        assert_eq!(uri(&facets[0]), "https://github.com/jake-abed/bsgortp");
        assert_eq!(facets[0].slice(&text), Some("github.com/jake-abed/b.."));
    }

    #[test]
    fn test_repeated_links_each_rewritten() {
        let url = "https://github.com/jake-abed/bsgortp";
        let (text, facets) = normalize(&format!("{url} and again {url}"));
        assert_eq!(
            text,
            "github.com/jake-abed/b.. and again github.com/jake-abed/b.."
        );
        assert_eq!(facets.len(), 2);
        for facet in &facets {
            assert_eq!(facet.slice(&text), Some("github.com/jake-abed/b.."));
            assert_eq!(uri(facet), url);
        }
    }

    #[test]
    fn test_mentions_are_not_links() {
        let (text, facets) = normalize("Hey @jakeabed.dev, jakeabed.dev is neat");
        assert_eq!(text, "Hey @jakeabed.dev, jakeabed.dev is neat");
        assert_eq!(facets, vec![Facet::link(19, 31, "https://jakeabed.dev")]);
    }

    #[test]
    fn test_text_without_links_is_unchanged() {
        let (text, facets) = normalize("I'm in that mode?");
        assert_eq!(text, "I'm in that mode?");
        assert!(facets.is_empty());
    }
}
