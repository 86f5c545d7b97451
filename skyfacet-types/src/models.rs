use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lexicon record type of a feed post.
pub const POST_LEXICON_TYPE: &str = "app.bsky.feed.post";

// Custom serde module for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.to_rfc3339();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

// The lexicon stores features as an array; a generated facet always carries exactly one.
mod single_feature {
    use super::Feature;
    use serde::{self, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(feature: &Feature, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        std::slice::from_ref(feature).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Feature, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut features = Vec::<Feature>::deserialize(deserializer)?;
        if features.len() != 1 {
            return Err(serde::de::Error::custom(format!(
                "expected exactly one facet feature, got {}",
                features.len()
            )));
        }
        Ok(features.remove(0))
    }
}

/// Half-open byte range into the post text. Offsets count UTF-8 bytes, not characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteSlice {
    pub byte_start: usize,
    pub byte_end: usize,
}

impl ByteSlice {
    pub fn new(byte_start: usize, byte_end: usize) -> Self {
        Self {
            byte_start,
            byte_end,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.byte_start..self.byte_end
    }

    pub fn len(&self) -> usize {
        self.byte_end.saturating_sub(self.byte_start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The semantic meaning attached to a facet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum Feature {
    #[serde(rename = "app.bsky.richtext.facet#link")]
    Link { uri: String },
    #[serde(rename = "app.bsky.richtext.facet#mention")]
    Mention { did: String },
    #[serde(rename = "app.bsky.richtext.facet#tag")]
    Tag { tag: String },
}

impl Feature {
    pub fn kind(&self) -> &'static str {
        match self {
            Feature::Link { .. } => "link",
            Feature::Mention { .. } => "mention",
            Feature::Tag { .. } => "tag",
        }
    }
}

/// A rich-text annotation: one feature attached to a byte range of the post text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Facet {
    pub index: ByteSlice,
    #[serde(rename = "features", with = "single_feature")]
    pub feature: Feature,
}

impl Facet {
    pub fn new(byte_start: usize, byte_end: usize, feature: Feature) -> Self {
        Self {
            index: ByteSlice::new(byte_start, byte_end),
            feature,
        }
    }

    pub fn link(byte_start: usize, byte_end: usize, uri: impl Into<String>) -> Self {
        Self::new(byte_start, byte_end, Feature::Link { uri: uri.into() })
    }

    pub fn mention(byte_start: usize, byte_end: usize, did: impl Into<String>) -> Self {
        Self::new(byte_start, byte_end, Feature::Mention { did: did.into() })
    }

    pub fn tag(byte_start: usize, byte_end: usize, tag: impl Into<String>) -> Self {
        Self::new(byte_start, byte_end, Feature::Tag { tag: tag.into() })
    }

    /// The span of `text` this facet annotates, if the range is valid for it
    pub fn slice<'t>(&self, text: &'t str) -> Option<&'t str> {
        text.get(self.index.range())
    }
}

/// A feed post record ready to be published
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "$type", default = "default_lexicon_type")]
    pub lexicon_type: String,
    pub text: String,
    #[serde(default)]
    pub facets: Vec<Facet>,
    #[serde(default)]
    pub langs: Vec<String>,
    /// Auxiliary tags outside the text; always empty for generated posts
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

fn default_lexicon_type() -> String {
    POST_LEXICON_TYPE.to_string()
}

impl Post {
    /// Package generated text and facets into a post stamped with the current time
    pub fn new(text: impl Into<String>, facets: Vec<Facet>, langs: Vec<String>) -> Self {
        Self {
            lexicon_type: default_lexicon_type(),
            text: text.into(),
            facets,
            langs,
            tags: Vec::new(),
            created_at: Utc::now(),
        }
    }
}
