use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::model::{Item, VertexKind};
use crate::records::{
    genre_overlap, normalize_score, parse_genres, MovieRecord, ReviewRecord, ScoreError,
};

/// The user's resolved choice: a movie (by dataset id and title) and a
/// set of favourite genres, possibly empty.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSelection {
    /// Dataset id of the chosen movie.
    pub movie_id: String,
    /// Title of the chosen movie.
    pub movie_title: String,
    /// Favourite genres; review-edge weights are computed against
    /// these.
    pub genres: BTreeSet<String>,
}

impl UserSelection {
    /// Selection from plain parts.
    pub fn new(
        movie_id: impl Into<String>,
        movie_title: impl Into<String>,
        genres: BTreeSet<String>,
    ) -> Self {
        Self {
            movie_id: movie_id.into(),
            movie_title: movie_title.into(),
            genres,
        }
    }
}

/// Why a review record was dropped instead of becoming an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The raw score field did not parse into one or two numbers.
    MalformedScore,
    /// A fractional score divided by zero.
    ZeroDenominator,
    /// The review's movie id is missing from the ingested catalog.
    UnknownMovie,
    /// Favourite genres and movie genres were both empty.
    EmptyGenreUnion,
}

/// Outcome of ingesting one review record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The review became a vertex and an edge.
    Accepted,
    /// The record was dropped; construction continues.
    Skipped(SkipReason),
}

/// Counters describing one build run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildSummary {
    /// Movie records ingested.
    pub movies: usize,
    /// Review records that produced an edge.
    pub reviews_accepted: usize,
    /// Reviews dropped for an unparsable score.
    pub skipped_malformed_score: usize,
    /// Reviews dropped for a zero denominator.
    pub skipped_zero_denominator: usize,
    /// Reviews dropped because their movie id is unknown.
    pub skipped_unknown_movie: usize,
    /// Reviews dropped because the genre union was empty.
    pub skipped_empty_genre_union: usize,
    /// Distinct genres across the whole catalog.
    pub genre_vocabulary: usize,
    /// Vertices in the full graph.
    pub graph_vertices: usize,
    /// Edges in the full graph.
    pub graph_edges: usize,
    /// Vertices in the simplified graph.
    pub simplified_vertices: usize,
    /// Edges in the simplified graph.
    pub simplified_edges: usize,
}

impl BuildSummary {
    /// Total reviews dropped, across all reasons.
    pub fn reviews_skipped(&self) -> usize {
        self.skipped_malformed_score
            + self.skipped_zero_denominator
            + self.skipped_unknown_movie
            + self.skipped_empty_genre_union
    }

    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::MalformedScore => self.skipped_malformed_score += 1,
            SkipReason::ZeroDenominator => self.skipped_zero_denominator += 1,
            SkipReason::UnknownMovie => self.skipped_unknown_movie += 1,
            SkipReason::EmptyGenreUnion => self.skipped_empty_genre_union += 1,
        }
    }
}

/// Finished build: the full graph, the threshold-gated simplified
/// graph, and the run's counters.
#[derive(Debug)]
pub struct BuildOutput {
    /// Full graph: every movie, every accepted review.
    pub graph: Graph,
    /// Simplified graph for visualization, movies gated by the
    /// similarity threshold, no reviews.
    pub simplified: Graph,
    /// What happened during the build.
    pub summary: BuildSummary,
}

/// Read-only view of the ingested catalog, handed to preference
/// providers.
#[derive(Debug, Clone, Copy)]
pub struct MovieCatalog<'a> {
    titles: &'a BTreeMap<String, String>,
    vocabulary: &'a BTreeSet<String>,
}

impl<'a> MovieCatalog<'a> {
    /// (id, title) pairs in id order.
    pub fn titles(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.titles
            .iter()
            .map(|(id, title)| (id.as_str(), title.as_str()))
    }

    /// Title for a dataset id.
    pub fn title_of(&self, id: &str) -> Option<&'a str> {
        self.titles.get(id).map(String::as_str)
    }

    /// Every genre seen across the catalog, in order.
    pub fn genres(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.vocabulary.iter().map(String::as_str)
    }

    /// Number of catalog entries.
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    /// True when no movies were ingested.
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// Assembles the full and simplified graphs from movie and review
/// records.
///
/// The phases are ordered: movies first, then [`Self::choose`], then
/// reviews, then [`Self::finish`], which applies the user preferences
/// to both graphs as its last step. Review records referencing ids
/// outside the catalog are skipped, so feeding reviews before movies
/// only inflates the skip counters.
#[derive(Debug)]
pub struct GraphBuilder {
    config: EngineConfig,
    graph: Graph,
    simplified: Graph,
    titles: BTreeMap<String, String>,
    genres: FxHashMap<String, BTreeSet<String>>,
    vocabulary: BTreeSet<String>,
    selection: Option<UserSelection>,
    summary: BuildSummary,
}

impl GraphBuilder {
    /// Empty builder with the given tunables.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            graph: Graph::new(),
            simplified: Graph::new(),
            titles: BTreeMap::new(),
            genres: FxHashMap::default(),
            vocabulary: BTreeSet::new(),
            selection: None,
            summary: BuildSummary::default(),
        }
    }

    /// Ingests one movie record: a vertex in the full graph plus the
    /// id-to-title and id-to-genres maps the later passes join on.
    /// A repeated id overwrites the maps; the graph is untouched.
    pub fn add_movie(&mut self, record: &MovieRecord) {
        let genre_set = parse_genres(&record.genre_field);
        self.graph
            .add_vertex(Item::movie(record.title.as_str()), VertexKind::Movie);
        self.vocabulary.extend(genre_set.iter().cloned());
        self.titles
            .insert(record.id.clone(), record.title.clone());
        self.genres.insert(record.id.clone(), genre_set);
        self.summary.movies += 1;
    }

    /// Ingests a batch of movie records.
    pub fn add_movies<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = MovieRecord>,
    {
        for record in records {
            self.add_movie(&record);
        }
        info!(
            movies = self.summary.movies,
            genres = self.vocabulary.len(),
            "build.movies.loaded"
        );
    }

    /// View of the ingested catalog, for preference resolution.
    pub fn catalog(&self) -> MovieCatalog<'_> {
        MovieCatalog {
            titles: &self.titles,
            vocabulary: &self.vocabulary,
        }
    }

    /// Fixes the user's selection and runs the movie-similarity pass.
    ///
    /// Every catalog movie gets an edge to the chosen movie in the
    /// full graph, weighted by genre overlap (0 when the union is
    /// empty); the chosen movie itself is skipped rather than
    /// self-looped. The simplified graph receives only movies at or
    /// above the similarity threshold.
    ///
    /// Fails on an empty selection, an id missing from the catalog, or
    /// a title that disagrees with the catalog entry for that id.
    pub fn choose(&mut self, selection: UserSelection) -> Result<()> {
        if self.selection.is_some() {
            return Err(GraphError::InvalidArgument(
                "a movie has already been chosen for this build".into(),
            ));
        }
        if selection.movie_id.is_empty() || selection.movie_title.is_empty() {
            return Err(GraphError::InvalidArgument("no movie selected".into()));
        }
        let known_title = self
            .titles
            .get(&selection.movie_id)
            .ok_or_else(|| GraphError::VertexNotFound(selection.movie_title.clone()))?;
        if known_title != &selection.movie_title {
            return Err(GraphError::InvalidArgument(format!(
                "selected title {:?} does not match catalog entry {:?} for id {}",
                selection.movie_title, known_title, selection.movie_id
            )));
        }
        let chosen_genres = self
            .genres
            .get(&selection.movie_id)
            .cloned()
            .unwrap_or_default();

        for (id, title) in &self.titles {
            let Some(movie_genres) = self.genres.get(id) else {
                continue;
            };
            let weight = genre_overlap(movie_genres, &chosen_genres).unwrap_or(0.0);
            build_simplified_vertex(
                &selection.movie_title,
                title,
                weight,
                &mut self.simplified,
                self.config.similarity_threshold,
            )?;
            if title != &selection.movie_title {
                self.graph.add_edge(
                    &Item::movie(title.as_str()),
                    &Item::movie(selection.movie_title.as_str()),
                    weight,
                )?;
            }
        }

        info!(
            movie = %selection.movie_title,
            simplified_vertices = self.simplified.vertex_count(),
            "build.similarity.completed"
        );
        self.selection = Some(selection);
        Ok(())
    }

    /// Ingests one review record, reporting what happened to it.
    ///
    /// An accepted review becomes a Review vertex keyed by its
    /// normalized score, connected to its movie with a weight equal to
    /// the genre overlap between the user's favourite genres and the
    /// movie's genres. Skips are per-record outcomes, never errors.
    ///
    /// Fails only when called before [`Self::choose`].
    pub fn add_review(&mut self, record: &ReviewRecord) -> Result<ReviewOutcome> {
        let outcome = self.review_outcome(record)?;
        match outcome {
            ReviewOutcome::Accepted => self.summary.reviews_accepted += 1,
            ReviewOutcome::Skipped(reason) => {
                debug!(movie_id = %record.movie_id, ?reason, "build.review.skipped");
                self.summary.record_skip(reason);
            }
        }
        Ok(outcome)
    }

    /// Ingests a batch of review records.
    pub fn add_reviews<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = ReviewRecord>,
    {
        for record in records {
            self.add_review(&record)?;
        }
        info!(
            accepted = self.summary.reviews_accepted,
            skipped = self.summary.reviews_skipped(),
            unknown_movie = self.summary.skipped_unknown_movie,
            malformed_score = self.summary.skipped_malformed_score,
            "build.reviews.completed"
        );
        Ok(())
    }

    fn review_outcome(&mut self, record: &ReviewRecord) -> Result<ReviewOutcome> {
        let Some(selection) = self.selection.as_ref() else {
            return Err(GraphError::InvalidArgument(
                "reviews require a chosen movie".into(),
            ));
        };
        let (Some(title), Some(movie_genres)) = (
            self.titles.get(&record.movie_id),
            self.genres.get(&record.movie_id),
        ) else {
            return Ok(ReviewOutcome::Skipped(SkipReason::UnknownMovie));
        };
        let score = match normalize_score(&record.raw_score_field) {
            Ok(score) => score,
            Err(ScoreError::Malformed) => {
                return Ok(ReviewOutcome::Skipped(SkipReason::MalformedScore))
            }
            Err(ScoreError::ZeroDenominator) => {
                return Ok(ReviewOutcome::Skipped(SkipReason::ZeroDenominator))
            }
        };
        let Some(weight) = genre_overlap(&selection.genres, movie_genres) else {
            return Ok(ReviewOutcome::Skipped(SkipReason::EmptyGenreUnion));
        };

        self.graph
            .add_vertex(Item::review(score), VertexKind::Review);
        self.graph
            .add_vertex(Item::movie(title.as_str()), VertexKind::Movie);
        self.graph
            .add_edge(&Item::movie(title.as_str()), &Item::review(score), weight)?;
        Ok(ReviewOutcome::Accepted)
    }

    /// Applies the user preferences to both graphs and hands them
    /// back, preferences last so the graphs are fully populated when
    /// the chosen vertex is promoted.
    pub fn finish(mut self) -> Result<BuildOutput> {
        let selection = self.selection.take().ok_or_else(|| {
            GraphError::InvalidArgument("cannot finish a build without a chosen movie".into())
        })?;
        self.graph
            .set_user_preferences(&selection.movie_title, selection.genres.clone())?;
        self.simplified
            .set_user_preferences(&selection.movie_title, selection.genres)?;

        self.summary.genre_vocabulary = self.vocabulary.len();
        self.summary.graph_vertices = self.graph.vertex_count();
        self.summary.graph_edges = self.graph.edge_count();
        self.summary.simplified_vertices = self.simplified.vertex_count();
        self.summary.simplified_edges = self.simplified.edge_count();
        info!(
            graph_vertices = self.summary.graph_vertices,
            graph_edges = self.summary.graph_edges,
            simplified_vertices = self.summary.simplified_vertices,
            reviews_accepted = self.summary.reviews_accepted,
            reviews_skipped = self.summary.reviews_skipped(),
            "build.completed"
        );

        Ok(BuildOutput {
            graph: self.graph,
            simplified: self.simplified,
            summary: self.summary,
        })
    }
}

/// Threshold-gates one movie into the simplified graph.
///
/// The target movie is always ensured as a vertex. The other movie is
/// added, and connected to the target, only when `weight` reaches
/// `threshold` and the two titles differ. Titles are expected to be
/// non-empty and the threshold positive.
pub fn build_simplified_vertex(
    target_title: &str,
    movie_title: &str,
    weight: f64,
    graph: &mut Graph,
    threshold: f64,
) -> Result<()> {
    debug_assert!(!target_title.is_empty() && !movie_title.is_empty());
    debug_assert!(threshold > 0.0);
    graph.add_vertex(Item::movie(target_title), VertexKind::Movie);
    if weight >= threshold {
        graph.add_vertex(Item::movie(movie_title), VertexKind::Movie);
        if movie_title != target_title {
            graph.add_edge(
                &Item::movie(movie_title),
                &Item::movie(target_title),
                weight,
            )?;
        }
    }
    Ok(())
}
