use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::SimilarityWeights;
use crate::error::Result;
use crate::model::{Item, VertexKind, Weight};

use super::Graph;

/// One vertex of an [`AdjacencySnapshot`], neighbours in key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexSnapshot {
    /// Vertex key.
    pub item: Item,
    /// Vertex role.
    pub kind: VertexKind,
    /// Preferred flag, true only on the chosen vertex.
    pub preferred: bool,
    /// Adjacent items with their exact edge weights.
    pub neighbours: Vec<(Item, Weight)>,
}

/// Exact, serializable copy of a graph's adjacency and preference
/// state. Every edge appears once per direction with its original
/// weight, so a consumer can rebuild its own structures without
/// touching graph internals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencySnapshot {
    /// Chosen movie, if preferences were set.
    pub preferred_movie: Option<Item>,
    /// Genres the user selected.
    pub preferred_genres: BTreeSet<String>,
    /// All vertices in key order.
    pub vertices: Vec<VertexSnapshot>,
}

impl AdjacencySnapshot {
    /// Captures the full adjacency of a graph.
    pub fn capture(graph: &Graph) -> Self {
        let vertices = graph
            .vertices
            .values()
            .map(|vertex| VertexSnapshot {
                item: vertex.item.clone(),
                kind: vertex.kind,
                preferred: vertex.preferred,
                neighbours: vertex
                    .neighbours
                    .iter()
                    .map(|(item, weight)| (item.clone(), *weight))
                    .collect(),
            })
            .collect();
        Self {
            preferred_movie: graph.preferred_movie.clone(),
            preferred_genres: graph.preferred_genres.clone(),
            vertices,
        }
    }

    /// Rebuilds a graph equal to the one this snapshot was captured
    /// from.
    pub fn restore(&self) -> Result<Graph> {
        let mut graph = Graph::new();
        for vertex in &self.vertices {
            graph.add_vertex(vertex.item.clone(), vertex.kind);
            if vertex.preferred {
                if let Some(restored) = graph.vertices.get_mut(&vertex.item) {
                    restored.preferred = true;
                }
            }
        }
        for vertex in &self.vertices {
            for (neighbour, weight) in &vertex.neighbours {
                graph.add_edge(&vertex.item, neighbour, *weight)?;
            }
        }
        graph.preferred_movie = self.preferred_movie.clone();
        graph.preferred_genres = self.preferred_genres.clone();
        Ok(graph)
    }
}

/// Node of the display projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewNode {
    /// Vertex key.
    pub item: Item,
    /// Vertex role, for display styling.
    pub kind: VertexKind,
}

/// Edge of the display projection, carrying a derived display weight
/// rather than the stored similarity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewEdge {
    /// One endpoint (the smaller item).
    pub source: Item,
    /// The other endpoint.
    pub target: Item,
    /// Overall similarity plus average score of the endpoint that was
    /// visited last, the blend force-directed renderers size edges by.
    pub weight: f64,
}

/// Capped projection of a graph for visual consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewGraph {
    /// Nodes in key order.
    pub nodes: Vec<ViewNode>,
    /// Edges in normalized key order.
    pub edges: Vec<ViewEdge>,
}

impl ViewGraph {
    /// Projects a graph for display, visiting vertices in key order.
    ///
    /// The chosen vertex is skipped as a seed but still enters through
    /// its neighbours. A neighbour becomes a node only while the node
    /// count is below `max_vertices`; edges are emitted toward any
    /// neighbour already present, weighted from the neighbour's side.
    /// When an edge is revisited from its other endpoint the weight is
    /// recomputed, so the later seed wins. Once the cap is reached no
    /// further seeds are processed.
    ///
    /// Fails when user preferences were never set.
    pub fn project(graph: &Graph, max_vertices: usize, weights: SimilarityWeights) -> Result<Self> {
        let center = graph.chosen_vertex()?.item.clone();
        let mut nodes: BTreeMap<Item, VertexKind> = BTreeMap::new();
        let mut edges: BTreeMap<(Item, Item), f64> = BTreeMap::new();

        for vertex in graph.vertices.values() {
            if vertex.item == center {
                continue;
            }
            nodes.entry(vertex.item.clone()).or_insert(vertex.kind);

            for neighbour_item in vertex.neighbours.keys() {
                if nodes.len() < max_vertices {
                    if let Ok(neighbour) = graph.get_vertex(neighbour_item) {
                        nodes.entry(neighbour_item.clone()).or_insert(neighbour.kind);
                    }
                }
                if nodes.contains_key(neighbour_item) {
                    let weight = graph.overall_similarity_score(
                        neighbour_item,
                        &vertex.item,
                        weights,
                    )? + graph.average_score(neighbour_item)?;
                    edges.insert(edge_key(&vertex.item, neighbour_item), weight);
                }
            }

            if nodes.len() >= max_vertices {
                break;
            }
        }

        Ok(Self {
            nodes: nodes
                .into_iter()
                .map(|(item, kind)| ViewNode { item, kind })
                .collect(),
            edges: edges
                .into_iter()
                .map(|((source, target), weight)| ViewEdge {
                    source,
                    target,
                    weight,
                })
                .collect(),
        })
    }
}

fn edge_key(a: &Item, b: &Item) -> (Item, Item) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// One movie on the review-quality versus similarity plane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterRow {
    /// Movie title.
    pub title: String,
    /// Plain average review score.
    pub average_score: f64,
    /// Overall similarity to the chosen movie.
    pub similarity: f64,
    /// `average_score * similarity`, the colour axis.
    pub goodness: f64,
    /// Neighbour count minus the chosen-movie edge.
    pub review_count: usize,
}

/// Scatter-plot projection: the chosen movie's Movie-kind neighbours
/// with enough reviews to be worth plotting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterFrame {
    /// Rows in title order.
    pub rows: Vec<ScatterRow>,
}

impl ScatterFrame {
    /// Collects rows for every Movie-kind neighbour of the chosen
    /// movie, dropping those with fewer than `review_threshold`
    /// reviews. Fails when user preferences were never set.
    pub fn collect(
        graph: &Graph,
        review_threshold: usize,
        weights: SimilarityWeights,
    ) -> Result<Self> {
        let chosen = graph.chosen_vertex()?;
        let mut rows = Vec::new();
        for item in chosen.neighbours.keys() {
            let Ok(vertex) = graph.get_vertex(item) else {
                continue;
            };
            if vertex.kind != VertexKind::Movie {
                continue;
            }
            let Some(title) = item.movie_title() else {
                continue;
            };
            let review_count = vertex.degree().saturating_sub(1);
            if review_count < review_threshold {
                continue;
            }
            let average_score = graph.average_score(item)?;
            let similarity = graph.overall_similarity_score(item, &chosen.item, weights)?;
            rows.push(ScatterRow {
                title: title.to_string(),
                average_score,
                similarity,
                goodness: average_score * similarity,
                review_count,
            });
        }
        Ok(Self { rows })
    }
}
