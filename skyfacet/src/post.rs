use std::sync::Arc;

use skyfacet_types::Post;

use crate::assembler::FacetAssembler;
use crate::config::Settings;
use crate::error::{FacetError, FacetResult};
use crate::patterns::PatternSet;
use crate::resolver::{HandleResolver, XrpcResolver};

/// Builds posts with link, mention and tag facets.
///
/// Cheap to clone; the compiled patterns and the resolver are shared.
#[derive(Clone)]
pub struct FacetGenerator {
    assembler: FacetAssembler,
}

impl FacetGenerator {
    /// Create a generator that resolves mentions through `resolver`
    pub fn new(resolver: Arc<dyn HandleResolver>) -> FacetResult<Self> {
        let patterns = PatternSet::shared()?;
        Ok(Self {
            assembler: FacetAssembler::new(patterns, resolver),
        })
    }

    /// Create a generator backed by the configured identity service
    pub fn from_settings(settings: &Settings) -> FacetResult<Self> {
        let resolver =
            XrpcResolver::from_settings(&settings.resolver).map_err(FacetError::ResolverSetup)?;
        tracing::debug!("Using identity service {}", resolver.base_url());
        Self::new(Arc::new(resolver))
    }

    /// Generate a post from `text`.
    ///
    /// Fails with [`FacetError::EmptyInput`] before any scanning when `text` is empty.
    /// Any scanner or resolution failure fails the whole call. `langs` is passed through
    /// unvalidated.
    pub async fn generate_post(&self, text: &str, langs: Vec<String>) -> FacetResult<Post> {
        if text.is_empty() {
            return Err(FacetError::EmptyInput);
        }

        let (text, facets) = self.assembler.assemble(text).await?;
        tracing::info!("Generated post with {} facets", facets.len());

        Ok(Post::new(text, facets, langs))
    }
}

/// Generate a post, resolving mentions against the default public identity service
pub async fn gen_post(text: &str, langs: Vec<String>) -> FacetResult<Post> {
    FacetGenerator::new(Arc::new(XrpcResolver::default()))?
        .generate_post(text, langs)
        .await
}
