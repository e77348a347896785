//! Movie recommendation engine built on a weighted undirected graph.
//!
//! Movies and review scores are vertices; edges carry genre-similarity
//! weights. The graph is assembled from two CSV datasets (movies and
//! reviews), centered on a movie the user picks, and then ranked:
//! every movie adjacent to the chosen one gets a score blending its
//! review average with its similarity to the choice.
//!
//! [`GraphBuilder`] runs the assembly, [`Graph::rank`] produces
//! recommendations, and the export types in [`graph`] project the
//! result into serializable snapshots, bounded view graphs, and
//! scatter frames for plotting.

#![warn(missing_docs)]

pub mod build;
pub mod config;
pub mod datagen;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod prefs;
pub mod records;
pub mod report;

pub use build::{
    BuildOutput, BuildSummary, GraphBuilder, MovieCatalog, ReviewOutcome, SkipReason,
    UserSelection,
};
pub use config::{EngineConfig, SimilarityWeights};
pub use error::{GraphError, Result};
pub use graph::{AdjacencySnapshot, Graph, Recommendation, ScatterFrame, ScatterRow, ViewGraph};
pub use model::{Item, Vertex, VertexKind, Weight};
pub use prefs::PreferenceProvider;
pub use records::{MovieRecord, ReviewRecord};
pub use report::RecommendationReport;
