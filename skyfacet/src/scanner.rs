use regex::Regex;

use crate::error::{FacetError, FacetResult};
use crate::patterns::PatternKind;

/// One pattern match: the matched text and its half-open byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'t> {
    pub matched: &'t str,
    pub start: usize,
    pub end: usize,
}

/// Find every non-overlapping match of `pattern` in `text`, left to right.
///
/// Each span is checked against the text it came from: the offsets must slice back to
/// the matched substring and spans must be disjoint and ascending. Any divergence is an
/// [`FacetError::OffsetMismatch`] rather than a silently dropped entry.
pub fn scan<'t>(kind: PatternKind, pattern: &Regex, text: &'t str) -> FacetResult<Vec<Span<'t>>> {
    let mut spans = Vec::new();
    let mut previous_end = 0;

    for m in pattern.find_iter(text) {
        let span = Span {
            matched: m.as_str(),
            start: m.start(),
            end: m.end(),
        };

        if span.start < previous_end {
            return Err(FacetError::OffsetMismatch {
                kind,
                detail: format!(
                    "match={:?} at {}..{} overlaps previous match ending at {}",
                    span.matched, span.start, span.end, previous_end
                ),
            });
        }
        if text.get(span.start..span.end) != Some(span.matched) {
            return Err(FacetError::OffsetMismatch {
                kind,
                detail: format!(
                    "match={:?} does not correspond to byte positions {}..{}",
                    span.matched, span.start, span.end
                ),
            });
        }

        previous_end = span.end;
        spans.push(span);
    }

    tracing::trace!("{} scan found {} matches", kind, spans.len());
    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternSet;

    fn scan_kind(kind: PatternKind, text: &str) -> Vec<Span<'_>> {
        let patterns = PatternSet::shared().unwrap();
        scan(kind, patterns.get(kind), text).unwrap()
    }

    #[test]
    fn test_scan_returns_ordered_spans() {
        let spans = scan_kind(PatternKind::Tag, "#one then #two and #three");
        let found: Vec<_> = spans.iter().map(|s| (s.matched, s.start, s.end)).collect();
        assert_eq!(
            found,
            vec![("#one", 0, 4), ("#two", 10, 14), ("#three", 19, 25)]
        );
    }

    #[test]
    fn test_scan_counts_bytes_not_chars() {
        let text = "日本 #タグ";
        let spans = scan_kind(PatternKind::Tag, text);
        assert_eq!(spans.len(), 1);
        // "日本 " is 7 bytes, "#タグ" is 7 bytes
        assert_eq!((spans[0].start, spans[0].end), (7, 14));
        assert_eq!(&text[spans[0].start..spans[0].end], "#タグ");
    }

    #[test]
    fn test_scan_no_matches() {
        assert!(scan_kind(PatternKind::Mention, "nothing to see").is_empty());
        assert!(scan_kind(PatternKind::Link, "").is_empty());
    }

    #[test]
    fn test_scan_with_custom_pattern() {
        let pattern = Regex::new(r"\d+").unwrap();
        let spans = scan(PatternKind::Tag, &pattern, "a1b22c333").unwrap();
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[2].matched, "333");
        assert_eq!((spans[2].start, spans[2].end), (6, 9));
    }

    use proptest::prelude::*;

    // For any input, every span slices back to its own matched text on a char boundary,
    // and spans never overlap.
    proptest! {
        #[test]
        fn prop_spans_are_valid_slices(text in "\\PC{0,64}") {
            let patterns = PatternSet::shared().unwrap();
            for kind in [PatternKind::Link, PatternKind::Mention, PatternKind::Tag] {
                let spans = scan(kind, patterns.get(kind), &text).unwrap();
                let mut last_end = 0;
                for span in spans {
                    prop_assert!(span.start >= last_end);
                    prop_assert_eq!(text.get(span.start..span.end), Some(span.matched));
                    last_end = span.end;
                }
            }
        }
    }
}
