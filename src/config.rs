use serde::{Deserialize, Serialize};

/// Blend between direct movie similarity and averaged genre similarity
/// in the overall similarity score. The two fractions must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
    /// Fraction applied to the direct movie-to-movie edge weight.
    pub movie: f64,
    /// Fraction applied to the averaged review-edge similarity.
    pub genre: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            movie: 0.5,
            genre: 0.5,
        }
    }
}

impl SimilarityWeights {
    /// Weights from the movie fraction, genre taking the remainder.
    pub fn from_movie_fraction(movie: f64) -> Self {
        Self {
            movie,
            genre: 1.0 - movie,
        }
    }
}

/// Tunables for graph construction and ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum genre similarity for a movie to enter the simplified
    /// (visualization) graph.
    pub similarity_threshold: f64,
    /// Distinct reviews required before the strict average counts.
    pub min_reviews: usize,
    /// Blend for the overall similarity score.
    pub weights: SimilarityWeights,
    /// Number of recommendations to return.
    pub limit: usize,
    /// Vertex cap for the view-graph projection.
    pub max_view_vertices: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.7,
            min_reviews: 3,
            weights: SimilarityWeights::default(),
            limit: 10,
            max_view_vertices: 5000,
        }
    }
}

impl EngineConfig {
    /// Tighter gates: fewer, better-reviewed matches.
    pub fn strict() -> Self {
        Self {
            similarity_threshold: 0.8,
            min_reviews: 5,
            ..Self::default()
        }
    }

    /// Looser gates for sparse datasets.
    pub fn lenient() -> Self {
        Self {
            similarity_threshold: 0.5,
            min_reviews: 2,
            limit: 20,
            ..Self::default()
        }
    }
}
