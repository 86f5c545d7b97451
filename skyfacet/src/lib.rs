// Library exports for skyfacet
// The binary in main.rs is a thin driver over these modules

pub mod assembler;
pub mod config;
pub mod error;
pub mod link;
pub mod patterns;
pub mod post;
pub mod resolver;
pub mod scanner;

pub use error::{FacetError, FacetResult};
pub use post::{gen_post, FacetGenerator};
pub use resolver::{HandleResolver, ResolveError, XrpcResolver};
pub use skyfacet_types::{ByteSlice, Facet, Feature, Post};
