use serde::Serialize;
use tracing::info;

use crate::config::SimilarityWeights;
use crate::error::Result;
use crate::model::VertexKind;

use super::Graph;

/// One ranked movie, with the per-movie numbers presentation layers
/// ask for alongside the ranking key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Movie title.
    pub title: String,
    /// Ranking key: strict average score times overall similarity.
    pub score: f64,
    /// Overall similarity to the chosen movie.
    pub match_score: f64,
    /// Plain average review score.
    pub average_score: f64,
    /// Distinct reviews backing the average.
    pub review_count: usize,
}

impl Graph {
    /// Ranks the Movie-kind neighbours of the chosen movie.
    ///
    /// Each candidate is keyed by `average_score_strict(min_reviews) *
    /// overall_similarity_score(candidate, chosen)`, sorted descending.
    /// The sort is stable over candidates in ascending item order, so
    /// equal keys come out alphabetically by title. At most `limit`
    /// entries are returned.
    ///
    /// Fails when user preferences were never set.
    pub fn rank(
        &self,
        limit: usize,
        min_reviews: usize,
        weights: SimilarityWeights,
    ) -> Result<Vec<Recommendation>> {
        let chosen = self.chosen_vertex()?;
        let mut ranked = Vec::new();
        for item in chosen.neighbours.keys() {
            let Some(vertex) = self.vertices.get(item) else {
                continue;
            };
            if vertex.kind != VertexKind::Movie {
                continue;
            }
            let Some(title) = item.movie_title() else {
                continue;
            };
            let overall = self.overall_similarity_score(item, &chosen.item, weights)?;
            let strict = self.average_score_strict(item, min_reviews)?;
            ranked.push(Recommendation {
                title: title.to_string(),
                score: strict * overall,
                match_score: overall,
                average_score: self.average_score(item)?,
                review_count: self.number_of_reviews(item)?,
            });
        }

        let candidates = ranked.len();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(limit);
        info!(
            candidates,
            returned = ranked.len(),
            "rank.completed"
        );
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::Item;

    const EPS: f64 = 1e-9;

    fn add_movie_with_reviews(
        graph: &mut Graph,
        title: &str,
        chosen_edge: f64,
        reviews: &[(f64, f64)],
    ) {
        graph.add_vertex(Item::movie(title), VertexKind::Movie);
        graph
            .add_edge(&Item::movie(title), &Item::movie("Inception"), chosen_edge)
            .unwrap();
        for &(score, weight) in reviews {
            graph.add_vertex(Item::review(score), VertexKind::Review);
            graph
                .add_edge(&Item::movie(title), &Item::review(score), weight)
                .unwrap();
        }
    }

    fn ranked_fixture() -> Graph {
        let mut graph = Graph::new();
        graph.add_vertex(Item::movie("Inception"), VertexKind::Movie);
        add_movie_with_reviews(
            &mut graph,
            "Arrival",
            0.9,
            &[(0.85, 0.9), (0.9, 0.9), (0.95, 0.9)],
        );
        add_movie_with_reviews(
            &mut graph,
            "Tenet",
            0.8,
            &[(0.55, 0.8), (0.6, 0.8), (0.65, 0.8)],
        );
        add_movie_with_reviews(&mut graph, "Cube", 0.7, &[(0.98, 0.9), (0.99, 0.9)]);
        // A review filed against the chosen movie itself; never a candidate.
        graph.add_vertex(Item::review(0.4), VertexKind::Review);
        graph
            .add_edge(&Item::movie("Inception"), &Item::review(0.4), 0.6)
            .unwrap();
        graph
            .set_user_preferences("Inception", BTreeSet::new())
            .unwrap();
        graph
    }

    #[test]
    fn test_rank_orders_by_strict_score_times_similarity() {
        let graph = ranked_fixture();
        let ranked = graph.rank(10, 3, SimilarityWeights::default()).unwrap();

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].title, "Arrival");
        assert_eq!(ranked[1].title, "Tenet");
        assert_eq!(ranked[2].title, "Cube");
        assert!((ranked[0].score - 0.81).abs() < EPS);
        assert!((ranked[1].score - 0.48).abs() < EPS);
        // Below the strict gate, the key collapses to zero.
        assert_eq!(ranked[2].score, 0.0);
        assert_eq!(ranked[0].review_count, 3);
    }

    #[test]
    fn test_rank_respects_the_limit() {
        let graph = ranked_fixture();
        let ranked = graph.rank(2, 3, SimilarityWeights::default()).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].title, "Arrival");
        assert_eq!(ranked[1].title, "Tenet");
    }

    #[test]
    fn test_rank_excludes_review_neighbours() {
        let graph = ranked_fixture();
        let ranked = graph.rank(10, 3, SimilarityWeights::default()).unwrap();
        assert!(ranked.iter().all(|entry| !entry.title.is_empty()));
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn test_rank_breaks_ties_alphabetically() {
        let mut graph = Graph::new();
        graph.add_vertex(Item::movie("Inception"), VertexKind::Movie);
        for title in ["Zulu", "Alpha"] {
            graph.add_vertex(Item::movie(title), VertexKind::Movie);
            graph
                .add_edge(&Item::movie(title), &Item::movie("Inception"), 0.5)
                .unwrap();
        }
        graph
            .set_user_preferences("Inception", BTreeSet::new())
            .unwrap();

        let ranked = graph.rank(10, 3, SimilarityWeights::default()).unwrap();
        assert_eq!(ranked[0].title, "Alpha");
        assert_eq!(ranked[1].title, "Zulu");
        assert_eq!(ranked[0].score, ranked[1].score);
    }

    #[test]
    fn test_rank_requires_preferences() {
        let mut graph = Graph::new();
        graph.add_vertex(Item::movie("Inception"), VertexKind::Movie);
        assert!(graph.rank(10, 3, SimilarityWeights::default()).is_err());
    }
}
