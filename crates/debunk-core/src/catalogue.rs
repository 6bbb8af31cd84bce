//! Post catalogue: the static pool of hostile posts, grouped by theme.
//!
//! Loaded once at startup from a JSON object mapping each theme name to a
//! list of [`PostTemplate`]s. The catalogue is immutable afterwards and is
//! shared between sessions behind an `Arc`.

use std::collections::BTreeMap;
use std::path::Path;

use debunk_types::PostTemplate;
use rand::Rng;
use rand::seq::IndexedRandom;

/// Errors that can occur while loading or querying the catalogue.
#[derive(Debug, thiserror::Error)]
pub enum CatalogueError {
    /// The catalogue file could not be read.
    #[error("failed to read catalogue: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The catalogue is not a JSON object of theme to post list.
    #[error("failed to parse catalogue JSON: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The catalogue contains no themes at all.
    #[error("catalogue contains no themes")]
    Empty,

    /// The requested theme is not in the catalogue.
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    /// The requested theme exists but lists no posts.
    #[error("theme has no posts: {0}")]
    EmptyTheme(String),
}

/// Theme name to ordered post templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCatalogue {
    themes: BTreeMap<String, Vec<PostTemplate>>,
}

impl PostCatalogue {
    /// Build a catalogue from an in-memory map.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Empty`] if the map has no themes.
    pub fn new(themes: BTreeMap<String, Vec<PostTemplate>>) -> Result<Self, CatalogueError> {
        if themes.is_empty() {
            return Err(CatalogueError::Empty);
        }
        Ok(Self { themes })
    }

    /// Parse a catalogue from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Json`] for malformed input and
    /// [`CatalogueError::Empty`] for an empty object.
    pub fn from_json(json: &str) -> Result<Self, CatalogueError> {
        let themes: BTreeMap<String, Vec<PostTemplate>> = serde_json::from_str(json)?;
        Self::new(themes)
    }

    /// Load a catalogue from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Io`] if the file cannot be read, otherwise
    /// as [`from_json`](Self::from_json).
    pub fn from_file(path: &Path) -> Result<Self, CatalogueError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Theme names in sorted order.
    pub fn themes(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    /// Posts listed under `theme`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::UnknownTheme`] if the theme is missing.
    pub fn posts(&self, theme: &str) -> Result<&[PostTemplate], CatalogueError> {
        self.themes
            .get(theme)
            .map(Vec::as_slice)
            .ok_or_else(|| CatalogueError::UnknownTheme(theme.to_owned()))
    }

    /// Check that `theme` can be drawn from.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::UnknownTheme`] or
    /// [`CatalogueError::EmptyTheme`].
    pub fn ensure_playable(&self, theme: &str) -> Result<(), CatalogueError> {
        if self.posts(theme)?.is_empty() {
            return Err(CatalogueError::EmptyTheme(theme.to_owned()));
        }
        Ok(())
    }

    /// Draw one template uniformly from `theme`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::UnknownTheme`] or
    /// [`CatalogueError::EmptyTheme`].
    pub fn pick<R: Rng + ?Sized>(
        &self,
        theme: &str,
        rng: &mut R,
    ) -> Result<&PostTemplate, CatalogueError> {
        self.posts(theme)?
            .choose(rng)
            .ok_or_else(|| CatalogueError::EmptyTheme(theme.to_owned()))
    }
}
