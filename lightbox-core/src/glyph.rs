//! Reference glyph path descriptions.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{LightboxError, LightboxResult};

/// An SVG path-data string describing the reference character.
///
/// The path says *what* is drawn, never *where*: placement comes from the
/// [`Transform`](crate::Transform). Its coordinates are in the glyph's native
/// space, roughly one unit wide at scale 1. Clones share the same buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct GlyphPath(Arc<str>);

impl GlyphPath {
    /// Wrap path data. Blank data is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`LightboxError::EmptyGlyph`] if `data` is empty or whitespace.
    pub fn new(data: impl Into<String>) -> LightboxResult<Self> {
        let data = data.into();
        if data.trim().is_empty() {
            return Err(LightboxError::EmptyGlyph);
        }
        Ok(Self(Arc::from(data)))
    }

    /// The raw path data.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GlyphPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GlyphPath {
    type Error = LightboxError;

    fn try_from(data: String) -> LightboxResult<Self> {
        Self::new(data)
    }
}

impl From<GlyphPath> for String {
    fn from(glyph: GlyphPath) -> Self {
        glyph.0.to_string()
    }
}

impl AsRef<str> for GlyphPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
