use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{FacetError, FacetResult};

/// Heuristic URL matcher: optional scheme, optional `www.`, a host-like token, a
/// 2-6 letter suffix and an optional path/query tail. Over-matches some strings and
/// does not understand internationalized domains.
pub const LINK_EXPRESSION: &str =
    r"(https?://.)?(www\.)?[-a-zA-Z0-9@:%._+~#=]{2,256}\.[a-z]{2,6}\b([-a-zA-Z0-9@:%_+.~#?&/=]*)";

/// Handle identifier syntax: dot-separated labels ending in a label that starts with a letter.
/// See https://atproto.com/specs/handle#handle-identifier-syntax
pub const MENTION_EXPRESSION: &str =
    r"@([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?";

/// `#` or fullwidth `＃` followed by Unicode letters, ASCII digits, `_` or `-`
pub const TAG_EXPRESSION: &str = r"[#＃][\p{L}0-9_-]+";

static SHARED: Lazy<Result<PatternSet, (PatternKind, regex::Error)>> = Lazy::new(PatternSet::build);

/// Which detection pattern a span, error or log line refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Link,
    Mention,
    Tag,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Link => "link",
            PatternKind::Mention => "mention",
            PatternKind::Tag => "tag",
        }
    }

    pub fn expression(&self) -> &'static str {
        match self {
            PatternKind::Link => LINK_EXPRESSION,
            PatternKind::Mention => MENTION_EXPRESSION,
            PatternKind::Tag => TAG_EXPRESSION,
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three compiled detection patterns. Immutable once built.
#[derive(Debug, Clone)]
pub struct PatternSet {
    link: Regex,
    mention: Regex,
    tag: Regex,
}

impl PatternSet {
    fn build() -> Result<Self, (PatternKind, regex::Error)> {
        let compile = |kind: PatternKind| Regex::new(kind.expression()).map_err(|e| (kind, e));
        Ok(Self {
            link: compile(PatternKind::Link)?,
            mention: compile(PatternKind::Mention)?,
            tag: compile(PatternKind::Tag)?,
        })
    }

    /// Compile a fresh, independently owned pattern set
    pub fn compile() -> FacetResult<Self> {
        Self::build().map_err(|(kind, source)| FacetError::PatternCompile { kind, source })
    }

    /// The process-wide pattern set, compiled on first use
    pub fn shared() -> FacetResult<&'static Self> {
        SHARED
            .as_ref()
            .map_err(|(kind, source)| FacetError::PatternCompile {
                kind: *kind,
                source: source.clone(),
            })
    }

    pub fn get(&self, kind: PatternKind) -> &Regex {
        match kind {
            PatternKind::Link => &self.link,
            PatternKind::Mention => &self.mention,
            PatternKind::Tag => &self.tag,
        }
    }
}
