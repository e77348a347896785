//! Weighted graph core and the operations layered on it.
//!
//! Holds the symmetric adjacency structure, the review-based scoring
//! functions, ranking, and the serializable export projections.

mod export;
mod rank;
mod scoring;

pub use export::{
    AdjacencySnapshot, ScatterFrame, ScatterRow, VertexSnapshot, ViewEdge, ViewGraph, ViewNode,
};
pub use rank::Recommendation;

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{GraphError, Result};
use crate::model::{Item, Vertex, VertexKind, Weight};

/// Weighted, undirected graph of movies, reviews and the user's chosen
/// movie.
///
/// Adjacency is stored symmetrically: inserting an edge writes the same
/// weight on both endpoints, and self-loops are rejected. All maps are
/// ordered, so iteration over vertices and neighbours is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    vertices: BTreeMap<Item, Vertex>,
    preferred_movie: Option<Item>,
    preferred_genres: BTreeSet<String>,
}

impl Graph {
    /// Empty graph with no preferences set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex. Does nothing if the item is already present, even
    /// when the existing vertex has a different kind.
    pub fn add_vertex(&mut self, item: Item, kind: VertexKind) {
        self.vertices
            .entry(item.clone())
            .or_insert_with(|| Vertex::new(item, kind));
    }

    /// Connects two existing vertices with the given weight, written on
    /// both sides. Re-adding an edge overwrites its weight.
    ///
    /// Fails without touching either vertex when one of the items is
    /// absent, and rejects self-loops.
    pub fn add_edge(&mut self, a: &Item, b: &Item, weight: Weight) -> Result<()> {
        if a == b {
            return Err(GraphError::InvalidArgument(format!(
                "self-loop on {a} is not allowed"
            )));
        }
        if !self.vertices.contains_key(a) {
            return Err(GraphError::VertexNotFound(a.to_string()));
        }
        if !self.vertices.contains_key(b) {
            return Err(GraphError::VertexNotFound(b.to_string()));
        }
        if let Some(vertex) = self.vertices.get_mut(a) {
            vertex.neighbours.insert(b.clone(), weight);
        }
        if let Some(vertex) = self.vertices.get_mut(b) {
            vertex.neighbours.insert(a.clone(), weight);
        }
        Ok(())
    }

    /// Whether a direct edge connects the two items. False when either
    /// item is absent.
    pub fn adjacent(&self, a: &Item, b: &Item) -> bool {
        match (self.vertices.get(a), self.vertices.get(b)) {
            (Some(vertex), Some(_)) => vertex.neighbours.contains_key(b),
            _ => false,
        }
    }

    /// Items adjacent to the given item, in key order.
    pub fn neighbours_of(&self, item: &Item) -> Result<Vec<Item>> {
        let vertex = self.get_vertex(item)?;
        Ok(vertex.neighbours.keys().cloned().collect())
    }

    /// All vertex items, optionally restricted to one kind, in key
    /// order.
    pub fn all_vertices(&self, kind: Option<VertexKind>) -> Vec<Item> {
        self.vertices
            .values()
            .filter(|vertex| kind.map_or(true, |wanted| vertex.kind == wanted))
            .map(|vertex| vertex.item.clone())
            .collect()
    }

    /// The vertex stored under the given item.
    pub fn get_vertex(&self, item: &Item) -> Result<&Vertex> {
        self.vertices
            .get(item)
            .ok_or_else(|| GraphError::VertexNotFound(item.to_string()))
    }

    /// Weight of the edge between two items.
    pub fn edge_weight(&self, a: &Item, b: &Item) -> Result<Weight> {
        let vertex = self.get_vertex(a)?;
        if !self.vertices.contains_key(b) {
            return Err(GraphError::VertexNotFound(b.to_string()));
        }
        vertex
            .neighbours
            .get(b)
            .copied()
            .ok_or_else(|| GraphError::EdgeNotFound(a.to_string(), b.to_string()))
    }

    /// Whether the item has a vertex in this graph.
    pub fn contains(&self, item: &Item) -> bool {
        self.vertices.contains_key(item)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        let degree_total: usize = self.vertices.values().map(Vertex::degree).sum();
        degree_total / 2
    }

    /// Marks the movie with the given title as the user's chosen movie
    /// and replaces the preferred genres.
    ///
    /// The vertex's kind flips to [`VertexKind::ChosenMovie`]. Choosing
    /// a different movie later demotes the previous chosen vertex back
    /// to an ordinary movie, so at most one vertex is ever preferred.
    pub fn set_user_preferences(&mut self, title: &str, genres: BTreeSet<String>) -> Result<()> {
        let item = Item::movie(title);
        if !self.vertices.contains_key(&item) {
            return Err(GraphError::VertexNotFound(item.to_string()));
        }
        if let Some(previous) = self.preferred_movie.take() {
            if previous != item {
                if let Some(vertex) = self.vertices.get_mut(&previous) {
                    vertex.kind = VertexKind::Movie;
                    vertex.preferred = false;
                }
            }
        }
        if let Some(vertex) = self.vertices.get_mut(&item) {
            vertex.kind = VertexKind::ChosenMovie;
            vertex.preferred = true;
        }
        self.preferred_movie = Some(item);
        self.preferred_genres = genres;
        Ok(())
    }

    /// Item of the chosen movie, if preferences were set.
    pub fn preferred_movie(&self) -> Option<&Item> {
        self.preferred_movie.as_ref()
    }

    /// Genres the user selected.
    pub fn preferred_genres(&self) -> &BTreeSet<String> {
        &self.preferred_genres
    }

    /// The chosen-movie vertex. Fails when preferences were never set.
    pub fn chosen_vertex(&self) -> Result<&Vertex> {
        let item = self.preferred_movie.as_ref().ok_or_else(|| {
            GraphError::InvalidArgument("user preferences have not been set".into())
        })?;
        self.get_vertex(item)
    }
}
