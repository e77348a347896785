use std::collections::BTreeSet;

use tracing::info;

use crate::build::{MovieCatalog, UserSelection};
use crate::error::{GraphError, Result};
use crate::records::parse_genres;

/// Resolves what the user wants against the ingested catalog.
///
/// Implementations own the favourite-genre set and the way the movie
/// is picked; the builder only ever sees the resolved
/// [`UserSelection`].
pub trait PreferenceProvider {
    /// Produces the selection, or an error when nothing matches.
    fn select(&self, catalog: MovieCatalog<'_>) -> Result<UserSelection>;
}

/// Picks a movie by its exact title, case-insensitively.
#[derive(Debug, Clone)]
pub struct FixedSelection {
    title: String,
    genres: BTreeSet<String>,
}

impl FixedSelection {
    /// Selection by title, favourite genres given as a raw field in
    /// the same shape the catalog uses ("Action & Sci-Fi").
    pub fn new(title: impl Into<String>, genre_field: &str) -> Self {
        Self {
            title: title.into(),
            genres: parse_genres(genre_field),
        }
    }

    /// Selection by title with an already-normalized genre set.
    pub fn with_genres(title: impl Into<String>, genres: BTreeSet<String>) -> Self {
        Self {
            title: title.into(),
            genres,
        }
    }
}

impl PreferenceProvider for FixedSelection {
    fn select(&self, catalog: MovieCatalog<'_>) -> Result<UserSelection> {
        let (id, title) = catalog
            .titles()
            .find(|(_, title)| title.eq_ignore_ascii_case(&self.title))
            .ok_or_else(|| GraphError::VertexNotFound(self.title.clone()))?;
        Ok(UserSelection::new(id, title, self.genres.clone()))
    }
}

/// Picks a movie by keyword search over the catalog titles.
///
/// An exact title match wins; otherwise the first substring match in
/// id order is taken.
#[derive(Debug, Clone)]
pub struct KeywordSelection {
    keyword: String,
    genres: BTreeSet<String>,
}

impl KeywordSelection {
    /// Selection by keyword, favourite genres given as a raw field.
    pub fn new(keyword: impl Into<String>, genre_field: &str) -> Self {
        Self {
            keyword: keyword.into(),
            genres: parse_genres(genre_field),
        }
    }
}

impl PreferenceProvider for KeywordSelection {
    fn select(&self, catalog: MovieCatalog<'_>) -> Result<UserSelection> {
        let needle = self.keyword.trim();
        if needle.is_empty() {
            return Err(GraphError::InvalidArgument(
                "search keyword must not be empty".into(),
            ));
        }
        let matches = search_titles(catalog, needle);
        let Some(first) = matches.first().copied() else {
            return Err(GraphError::VertexNotFound(needle.to_string()));
        };
        let (id, title) = matches
            .iter()
            .copied()
            .find(|(_, title)| title.eq_ignore_ascii_case(needle))
            .unwrap_or(first);
        info!(
            keyword = %needle,
            title = %title,
            candidates = matches.len(),
            "prefs.keyword.resolved"
        );
        Ok(UserSelection::new(id, title, self.genres.clone()))
    }
}

/// All catalog entries whose title contains the keyword,
/// case-insensitively, as (id, title) pairs in id order. An empty
/// keyword matches everything.
pub fn search_titles<'a>(catalog: MovieCatalog<'a>, keyword: &str) -> Vec<(&'a str, &'a str)> {
    let needle = keyword.to_lowercase();
    catalog
        .titles()
        .filter(|(_, title)| title.to_lowercase().contains(&needle))
        .collect()
}
