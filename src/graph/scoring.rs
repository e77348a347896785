use std::collections::BTreeSet;

use ordered_float::OrderedFloat;

use crate::config::SimilarityWeights;
use crate::error::Result;
use crate::model::{Item, Vertex, VertexKind, Weight};

use super::Graph;

impl Graph {
    /// Number of distinct reviews filed against a movie.
    ///
    /// Returns 0 for Review-kind vertices and for vertices with at most
    /// one neighbour, even when that neighbour is a review.
    pub fn number_of_reviews(&self, item: &Item) -> Result<usize> {
        let vertex = self.get_vertex(item)?;
        if vertex.kind == VertexKind::Review || vertex.degree() <= 1 {
            return Ok(0);
        }
        Ok(self.review_neighbours(vertex).count())
    }

    /// Mean of the distinct review scores attached to a movie, 0 when
    /// the vertex has no neighbours, no reviews, or is itself a review.
    ///
    /// Reviews sharing a score value occupy one vertex, so duplicates
    /// contribute once.
    pub fn average_score(&self, item: &Item) -> Result<f64> {
        let vertex = self.get_vertex(item)?;
        Ok(self.mean_review_score(vertex, 1))
    }

    /// [`Self::average_score`] gated on a minimum distinct-review
    /// count: anything below `min_reviews` scores 0.
    pub fn average_score_strict(&self, item: &Item, min_reviews: usize) -> Result<f64> {
        debug_assert!(min_reviews > 0, "min_reviews must be positive");
        let vertex = self.get_vertex(item)?;
        Ok(self.mean_review_score(vertex, min_reviews))
    }

    /// Mean of the distinct review-edge weights on a movie, 0 under the
    /// same conditions as [`Self::average_score`].
    ///
    /// Weights collapse as a set: two review edges with the same weight
    /// contribute once.
    pub fn average_similarity(&self, item: &Item) -> Result<f64> {
        let vertex = self.get_vertex(item)?;
        if vertex.neighbours.is_empty() || vertex.kind == VertexKind::Review {
            return Ok(0.0);
        }
        let weights: BTreeSet<OrderedFloat<f64>> = self
            .review_neighbours(vertex)
            .map(|(_, weight)| OrderedFloat(weight))
            .collect();
        if weights.is_empty() {
            return Ok(0.0);
        }
        let total: f64 = weights.iter().map(|weight| weight.into_inner()).sum();
        Ok(total / weights.len() as f64)
    }

    /// Blended similarity between `item` and `other`: the direct edge
    /// weight and the averaged review-edge similarity of `item`, mixed
    /// per `weights`.
    ///
    /// Fails when the two items are not connected. Both endpoints are
    /// expected to be movies; a review endpoint simply contributes 0
    /// through its averaged similarity, which the view projection
    /// relies on.
    pub fn overall_similarity_score(
        &self,
        item: &Item,
        other: &Item,
        weights: SimilarityWeights,
    ) -> Result<f64> {
        debug_assert!(
            (weights.movie + weights.genre - 1.0).abs() < 1e-9,
            "similarity weights must sum to 1"
        );
        let edge = self.edge_weight(item, other)?;
        let genre = self.average_similarity(item)?;
        Ok(edge * weights.movie + genre * weights.genre)
    }

    /// Review-kind neighbours of a vertex as (score, edge weight)
    /// pairs. Distinct by score because review vertices are keyed by
    /// it.
    fn review_neighbours<'a>(
        &'a self,
        vertex: &'a Vertex,
    ) -> impl Iterator<Item = (f64, Weight)> + 'a {
        vertex.neighbours.iter().filter_map(|(item, weight)| {
            let neighbour = self.vertices.get(item)?;
            if neighbour.kind != VertexKind::Review {
                return None;
            }
            let score = neighbour.item.review_score()?;
            Some((score, *weight))
        })
    }

    fn mean_review_score(&self, vertex: &Vertex, min_reviews: usize) -> f64 {
        if vertex.neighbours.is_empty() || vertex.kind == VertexKind::Review {
            return 0.0;
        }
        let scores: Vec<f64> = self
            .review_neighbours(vertex)
            .map(|(score, _)| score)
            .collect();
        if scores.len() < min_reviews {
            return 0.0;
        }
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}
