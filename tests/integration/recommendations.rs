#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use reelrank::graph::{AdjacencySnapshot, ScatterFrame, ViewGraph};
use reelrank::ingest::{read_movies, read_reviews, MovieCsvConfig, ReviewCsvConfig};
use reelrank::prefs::{FixedSelection, KeywordSelection, PreferenceProvider};
use reelrank::{
    BuildOutput, EngineConfig, GraphBuilder, Item, RecommendationReport, SimilarityWeights,
};
use tempfile::TempDir;

const EPS: f64 = 1e-9;

const MOVIES_CSV: &str = "\
rotten_tomatoes_link,movie_title,movie_info,genres,directors
m/arrival_2016,Arrival,A linguist meets visitors,Drama & Sci-Fi,Denis Villeneuve
m/heat_1995,Heat,Cops and robbers,Action & Crime,Michael Mann
m/inception,Inception,Dreams in dreams,Action & Sci-Fi & Thriller,Christopher Nolan
m/tenet,Tenet,Time runs backwards,Action & Sci-Fi & Thriller,Christopher Nolan
m/up,Up,Balloons lift a house,Animation & Comedy,Pete Docter
";

const REVIEWS_CSV: &str = "\
rotten_tomatoes_link,critic_name,review_score,review_content
m/tenet,A,3/4,good
m/tenet,B,4/5,solid
m/tenet,C,9/10,great
m/heat_1995,D,1/5,meh
m/heat_1995,E,2/5,ok
m/heat_1995,F,3/5,fine
m/arrival_2016,G,1/2,hmm
m/arrival_2016,H,4/5,yes
m/up,I,4/5,fun
m/unknown,J,3/4,lost
m/tenet,K,garbled,??
m/up,L,3/0,zero
";

fn write_fixture(dir: &Path) -> (PathBuf, PathBuf) {
    let movies = dir.join("movies.csv");
    let reviews = dir.join("reviews.csv");
    fs::write(&movies, MOVIES_CSV).expect("write movies csv");
    fs::write(&reviews, REVIEWS_CSV).expect("write reviews csv");
    (movies, reviews)
}

fn build_fixture(provider: &dyn PreferenceProvider) -> BuildOutput {
    let dir = TempDir::new().expect("tempdir");
    let (movies_path, reviews_path) = write_fixture(dir.path());

    let movies = read_movies(&MovieCsvConfig::new(&movies_path)).expect("read movies");
    let reviews = read_reviews(&ReviewCsvConfig::new(&reviews_path)).expect("read reviews");

    let mut builder = GraphBuilder::new(EngineConfig::default());
    builder.add_movies(movies);
    let selection = provider.select(builder.catalog()).expect("resolve selection");
    builder.choose(selection).expect("choose movie");
    builder.add_reviews(reviews).expect("add reviews");
    builder.finish().expect("finish build")
}

#[test]
fn full_pipeline_ranks_and_reports() {
    let provider = FixedSelection::new("Inception", "Action & Sci-Fi");
    let output = build_fixture(&provider);

    let summary = &output.summary;
    assert_eq!(summary.movies, 5);
    assert_eq!(summary.reviews_accepted, 9);
    assert_eq!(summary.skipped_unknown_movie, 1);
    assert_eq!(summary.skipped_malformed_score, 1);
    assert_eq!(summary.skipped_zero_denominator, 1);
    assert_eq!(summary.skipped_empty_genre_union, 0);
    // 5 movies plus 7 distinct review scores.
    assert_eq!(summary.graph_vertices, 12);
    // 4 similarity edges plus 9 review edges.
    assert_eq!(summary.graph_edges, 13);
    // Only Tenet clears the 0.7 threshold.
    assert_eq!(summary.simplified_vertices, 2);
    assert_eq!(summary.simplified_edges, 1);

    let engine = EngineConfig::default();
    let ranked = output
        .graph
        .rank(engine.limit, engine.min_reviews, engine.weights)
        .expect("rank");
    let titles: Vec<&str> = ranked.iter().map(|entry| entry.title.as_str()).collect();
    assert_eq!(titles, vec!["Tenet", "Heat", "Arrival", "Up"]);

    // Tenet: strict average 2.45/3, overall 0.5 * 1 + 0.5 * 2/3.
    assert!((ranked[0].score - (2.45 / 3.0) * (5.0 / 6.0)).abs() < EPS);
    assert_eq!(ranked[0].review_count, 3);
    // Arrival has two distinct scores, below the strict gate.
    assert_eq!(ranked[2].score, 0.0);
    assert_eq!(ranked[2].review_count, 2);

    let report = RecommendationReport::compose(&output.graph, ranked).expect("compose");
    let text = report.render(true);
    assert!(text.contains("    - Preferred Movie: Inception"));
    assert!(text.contains("    - Preferred Genre(s): Action, Sci-fi"));
    assert!(text.contains("Here are the top 4 movies matching your preferences:"));
    assert!(text.contains("#1 -> Tenet: 83.0 % match"));
    assert!(text.contains("       Avg Score: 82.0  Num of reviews: 3"));
    assert!(text.contains("#2 -> Heat: 29.0 % match"));
    assert!(text.contains("#3 -> Arrival: 29.0 % match"));
    assert!(text.contains("#4 -> Up: 0.0 % match"));
}

#[test]
fn keyword_selection_drives_the_same_pipeline() {
    // No exact title is "ten"; the first substring match is Tenet.
    let provider = KeywordSelection::new("ten", "Action");
    let output = build_fixture(&provider);

    let report = RecommendationReport::compose(&output.graph, Vec::new()).expect("compose");
    assert_eq!(report.preferred_movie, "Tenet");
    assert_eq!(report.preferred_genres, vec!["Action".to_string()]);
}

#[test]
fn snapshot_survives_json_round_trip() {
    let provider = FixedSelection::new("Inception", "Action & Sci-Fi");
    let output = build_fixture(&provider);

    let snapshot = AdjacencySnapshot::capture(&output.graph);
    let encoded = serde_json::to_string_pretty(&snapshot).expect("encode snapshot");
    let decoded: AdjacencySnapshot = serde_json::from_str(&encoded).expect("decode snapshot");
    let restored = decoded.restore().expect("restore graph");

    assert_eq!(restored, output.graph);
    assert_eq!(restored.preferred_movie(), Some(&Item::movie("Inception")));
    assert_eq!(restored.edge_count(), output.summary.graph_edges);
}

#[test]
fn scatter_rows_cover_well_reviewed_neighbours() {
    let provider = FixedSelection::new("Inception", "Action & Sci-Fi");
    let output = build_fixture(&provider);

    let frame = ScatterFrame::collect(&output.graph, 3, SimilarityWeights::default())
        .expect("collect scatter");
    let titles: Vec<&str> = frame.rows.iter().map(|row| row.title.as_str()).collect();
    assert_eq!(titles, vec!["Heat", "Tenet"]);

    let tenet = &frame.rows[1];
    assert!((tenet.average_score - 2.45 / 3.0).abs() < EPS);
    assert!((tenet.similarity - 5.0 / 6.0).abs() < EPS);
    assert!((tenet.goodness - tenet.average_score * tenet.similarity).abs() < EPS);
    assert_eq!(tenet.review_count, 3);
}

#[test]
fn view_projection_respects_the_cap() {
    let provider = FixedSelection::new("Inception", "Action & Sci-Fi");
    let output = build_fixture(&provider);

    let full = ViewGraph::project(&output.simplified, 5000, SimilarityWeights::default())
        .expect("project view");
    assert_eq!(full.nodes.len(), 2);
    assert_eq!(full.edges.len(), 1);

    let capped = ViewGraph::project(&output.simplified, 1, SimilarityWeights::default())
        .expect("project capped view");
    assert_eq!(capped.nodes.len(), 1);
    assert_eq!(capped.nodes[0].item, Item::movie("Tenet"));
    assert!(capped.edges.is_empty());
}

#[test]
fn generated_catalog_builds_end_to_end() {
    use reelrank::datagen::{self, DataGenerator};

    let dir = TempDir::new().expect("tempdir");
    let movies_path = dir.path().join("movies.csv");
    let reviews_path = dir.path().join("reviews.csv");

    let mut generator = DataGenerator::seeded(42);
    let (movies, reviews) = generator.generate_catalog(60, 400);
    datagen::write_movie_csv(&movies_path, &movies).expect("write movies");
    datagen::write_review_csv(&reviews_path, &reviews).expect("write reviews");

    let movie_records = read_movies(&MovieCsvConfig::new(&movies_path)).expect("read movies");
    let review_records = read_reviews(&ReviewCsvConfig::new(&reviews_path)).expect("read reviews");
    assert_eq!(movie_records.len(), 60);
    assert_eq!(review_records.len(), 400);

    let first_title = movie_records[0].title.clone();
    let engine = EngineConfig::lenient();
    let mut builder = GraphBuilder::new(engine.clone());
    builder.add_movies(movie_records);
    let provider = FixedSelection::new(first_title, "Action");
    let selection = provider.select(builder.catalog()).expect("resolve selection");
    builder.choose(selection).expect("choose movie");
    builder.add_reviews(review_records).expect("add reviews");
    let output = builder.finish().expect("finish build");

    let summary = &output.summary;
    assert_eq!(summary.movies, 60);
    assert_eq!(summary.reviews_accepted + summary.reviews_skipped(), 400);
    assert!(summary.reviews_accepted > 0);
    assert!(summary.graph_vertices >= 60);

    let ranked = output
        .graph
        .rank(engine.limit, engine.min_reviews, engine.weights)
        .expect("rank");
    assert!(ranked.len() <= engine.limit);
    assert!(ranked.iter().all(|entry| entry.score.is_finite()));
    let report = RecommendationReport::compose(&output.graph, ranked).expect("compose");
    assert!(!report.render(true).is_empty());
}
