use thiserror::Error;

use crate::patterns::PatternKind;
use crate::resolver::ResolveError;

/// Errors that abort post generation. No partial post is ever produced alongside one.
#[derive(Error, Debug)]
pub enum FacetError {
    #[error("cannot generate post with empty text")]
    EmptyInput,

    /// A detection pattern failed to compile; a programming fault, not user error
    #[error("could not compile {kind} detection regex: {source}")]
    PatternCompile {
        kind: PatternKind,
        #[source]
        source: regex::Error,
    },

    /// Matched substrings and byte offsets disagreed
    #[error("{kind} matches and byte positions not matched in facet generation: {detail}")]
    OffsetMismatch { kind: PatternKind, detail: String },

    #[error("could not resolve handle={handle}: {source}")]
    HandleResolution {
        handle: String,
        #[source]
        source: ResolveError,
    },

    #[error("could not set up identity resolver: {0}")]
    ResolverSetup(#[source] ResolveError),

    /// A concurrent scanning unit exited without reporting a result
    #[error("{unit} scanner exited without reporting a result")]
    UnitAborted { unit: &'static str },
}

pub type FacetResult<T> = Result<T, FacetError>;
