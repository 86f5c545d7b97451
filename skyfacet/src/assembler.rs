use std::fmt;
use std::sync::Arc;

use skyfacet_types::Facet;
use tokio::sync::mpsc;

use crate::error::{FacetError, FacetResult};
use crate::link::normalize_links;
use crate::patterns::{PatternKind, PatternSet};
use crate::resolver::HandleResolver;
use crate::scanner::scan;

/// Facets from one concurrent unit, or the error that stopped it
pub type ScanResult = FacetResult<Vec<Facet>>;

/// The concurrently scheduled scanning units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanUnit {
    Mention,
    Tag,
}

impl ScanUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanUnit::Mention => "mention",
            ScanUnit::Tag => "tag",
        }
    }
}

impl fmt::Display for ScanUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve every mention in `text` in order, stopping at the first handle that fails.
/// Facets cover the whole match including `@`.
pub async fn mention_facets(
    patterns: &PatternSet,
    text: &str,
    resolver: &dyn HandleResolver,
) -> ScanResult {
    let spans = scan(PatternKind::Mention, patterns.get(PatternKind::Mention), text)?;
    let mut facets = Vec::with_capacity(spans.len());

    for span in spans {
        let handle = strip_sigil(span.matched);
        let did = resolver
            .resolve_handle(handle)
            .await
            .map_err(|source| FacetError::HandleResolution {
                handle: handle.to_string(),
                source,
            })?;

        tracing::debug!("Resolved @{} to {}", handle, did);
        facets.push(Facet::mention(span.start, span.end, did));
    }

    Ok(facets)
}

/// Tag facets for every `#tag` in `text`; the tag value drops the sigil but the range keeps it
pub fn tag_facets(patterns: &PatternSet, text: &str) -> ScanResult {
    let spans = scan(PatternKind::Tag, patterns.get(PatternKind::Tag), text)?;

    Ok(spans
        .into_iter()
        .map(|span| Facet::tag(span.start, span.end, strip_sigil(span.matched)))
        .collect())
}

/// Drop the leading `@`, `#` or `＃`
fn strip_sigil(matched: &str) -> &str {
    let mut chars = matched.chars();
    chars.next();
    chars.as_str()
}

/// Runs link normalization, then the mention and tag units side by side, and merges
/// their facets.
#[derive(Clone)]
pub struct FacetAssembler {
    patterns: &'static PatternSet,
    resolver: Arc<dyn HandleResolver>,
}

impl FacetAssembler {
    pub fn new(patterns: &'static PatternSet, resolver: Arc<dyn HandleResolver>) -> Self {
        Self { patterns, resolver }
    }

    /// Produce the final text and its facets.
    ///
    /// Link facets come first. Mention and tag facets follow in the order their units
    /// finish, so the list is not sorted by offset and may differ between calls. Both
    /// units always run to completion; the first error observed is returned.
    pub async fn assemble(&self, text: &str) -> FacetResult<(String, Vec<Facet>)> {
        let (text, mut facets) = normalize_links(self.patterns, text)?;
        let snapshot: Arc<str> = Arc::from(text.as_str());

        let (tx, mut rx) = mpsc::channel::<(ScanUnit, ScanResult)>(2);

        {
            let tx = tx.clone();
            let patterns = self.patterns;
            let resolver = Arc::clone(&self.resolver);
            let snapshot = Arc::clone(&snapshot);
            tokio::spawn(async move {
                let result = mention_facets(patterns, &snapshot, resolver.as_ref()).await;
                let _ = tx.send((ScanUnit::Mention, result)).await;
            });
        }

        {
            let tx = tx.clone();
            let patterns = self.patterns;
            let snapshot = Arc::clone(&snapshot);
            tokio::spawn(async move {
                let result = tag_facets(patterns, &snapshot);
                let _ = tx.send((ScanUnit::Tag, result)).await;
            });
        }

        // Only the spawned units hold senders now; a closed channel means one died
        drop(tx);

        let mut first_error = None;
        let mut reported = Vec::with_capacity(2);

        while let Some((unit, result)) = rx.recv().await {
            reported.push(unit);
            match result {
                Ok(found) => {
                    tracing::debug!("{} unit finished with {} facets", unit, found.len());
                    facets.extend(found);
                }
                Err(e) => {
                    tracing::warn!("{} unit failed: {}", unit, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        for unit in [ScanUnit::Mention, ScanUnit::Tag] {
            if !reported.contains(&unit) {
                return Err(FacetError::UnitAborted {
                    unit: unit.as_str(),
                });
            }
        }

        Ok((text, facets))
    }
}
