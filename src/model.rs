use std::collections::BTreeMap;
use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Edge weight. Typically a similarity in `[0, 1]`, but movie-to-movie
/// weights are not hard-clamped.
pub type Weight = f64;

/// Vertex key: a movie title or a normalized review score.
///
/// Review vertices are keyed by score *value*, so two reviews that
/// normalize to the same score share one vertex. Movies order before
/// reviews, which keeps map iteration stable and title-first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Item {
    /// A movie, keyed by title.
    Movie(String),
    /// A review, keyed by its normalized score in `[0.0, 1.0]`.
    Review(OrderedFloat<f64>),
}

impl Item {
    /// Movie key from any string-ish title.
    pub fn movie(title: impl Into<String>) -> Self {
        Item::Movie(title.into())
    }

    /// Review key from a normalized score.
    pub fn review(score: f64) -> Self {
        Item::Review(OrderedFloat(score))
    }

    /// Title when this is a movie key.
    pub fn movie_title(&self) -> Option<&str> {
        match self {
            Item::Movie(title) => Some(title),
            Item::Review(_) => None,
        }
    }

    /// Score when this is a review key.
    pub fn review_score(&self) -> Option<f64> {
        match self {
            Item::Movie(_) => None,
            Item::Review(score) => Some(score.into_inner()),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Movie(title) => write!(f, "{title}"),
            Item::Review(score) => write!(f, "review {score}"),
        }
    }
}

/// Vertex role. The only legal transition is `Movie` to `ChosenMovie`
/// (and back, when the user re-chooses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexKind {
    /// An ordinary movie.
    Movie,
    /// The movie the user anchored their preferences on.
    ChosenMovie,
    /// A user review.
    Review,
}

impl fmt::Display for VertexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VertexKind::Movie => "Movie",
            VertexKind::ChosenMovie => "Chosen Movie",
            VertexKind::Review => "Review",
        };
        f.write_str(name)
    }
}

/// A graph vertex with its weighted adjacency.
///
/// Invariants (maintained by [`crate::graph::Graph`]): no entry for the
/// vertex's own item, and every neighbour entry is mirrored on the other
/// side with the same weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Identifying payload, also the graph key.
    pub item: Item,
    /// Role of this vertex.
    pub kind: VertexKind,
    /// Adjacent items and their edge weights.
    pub neighbours: BTreeMap<Item, Weight>,
    /// True only for the chosen-movie vertex.
    pub preferred: bool,
}

impl Vertex {
    /// New isolated vertex.
    pub fn new(item: Item, kind: VertexKind) -> Self {
        Self {
            item,
            kind,
            neighbours: BTreeMap::new(),
            preferred: false,
        }
    }

    /// Number of adjacent vertices.
    pub fn degree(&self) -> usize {
        self.neighbours.len()
    }
}
