#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

const MOVIES_CSV: &str = "\
rotten_tomatoes_link,movie_title,genres
m/arrival_2016,Arrival,Drama & Sci-Fi
m/heat_1995,Heat,Action & Crime
m/inception,Inception,Action & Sci-Fi & Thriller
m/tenet,Tenet,Action & Sci-Fi & Thriller
m/up,Up,Animation & Comedy
";

const REVIEWS_CSV: &str = "\
rotten_tomatoes_link,review_score
m/tenet,3/4
m/tenet,4/5
m/tenet,9/10
m/heat_1995,1/5
m/heat_1995,2/5
m/heat_1995,3/5
m/arrival_2016,1/2
m/arrival_2016,4/5
m/up,4/5
m/unknown,3/4
m/tenet,garbled
m/up,3/0
";

fn write_fixture(dir: &Path) -> (PathBuf, PathBuf) {
    let movies = dir.join("movies.csv");
    let reviews = dir.join("reviews.csv");
    fs::write(&movies, MOVIES_CSV).expect("write movies csv");
    fs::write(&reviews, REVIEWS_CSV).expect("write reviews csv");
    (movies, reviews)
}

#[test]
fn recommend_prints_a_text_report() {
    let dir = TempDir::new().expect("tempdir");
    let (movies, reviews) = write_fixture(dir.path());

    let output = cargo_bin_cmd!("reelrank")
        .arg("recommend")
        .arg("--movies")
        .arg(&movies)
        .arg("--reviews")
        .arg(&reviews)
        .args(["--movie", "Inception", "--genres", "Action & Sci-Fi"])
        .args(["--show-reviews", "--quiet"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).expect("utf8 stdout");

    assert!(text.contains("    - Preferred Movie: Inception"));
    assert!(text.contains("#1 -> Tenet: 83.0 % match"));
    assert!(text.contains("Avg Score: 82.0  Num of reviews: 3"));
    assert!(text.contains("#2 -> Heat: 29.0 % match"));
}

#[test]
fn recommend_emits_clean_json() {
    let dir = TempDir::new().expect("tempdir");
    let (movies, reviews) = write_fixture(dir.path());

    let output = cargo_bin_cmd!("reelrank")
        .args(["--format", "json"])
        .arg("recommend")
        .arg("--movies")
        .arg(&movies)
        .arg("--reviews")
        .arg(&reviews)
        .args(["--keyword", "ten", "--genres", "Action"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["preferred_movie"], "Tenet");
    assert_eq!(json["preferred_genres"][0], "Action");
    assert!(json["entries"].as_array().is_some());
}

#[test]
fn inspect_reports_build_counters() {
    let dir = TempDir::new().expect("tempdir");
    let (movies, reviews) = write_fixture(dir.path());

    let output = cargo_bin_cmd!("reelrank")
        .args(["--format", "json"])
        .arg("inspect")
        .arg("--movies")
        .arg(&movies)
        .arg("--reviews")
        .arg(&reviews)
        .args(["--movie", "Inception", "--genres", "Action & Sci-Fi"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["movies"], 5);
    assert_eq!(json["reviews_accepted"], 9);
    assert_eq!(json["skipped_unknown_movie"], 1);
    assert_eq!(json["graph_vertices"], 12);
    assert_eq!(json["simplified_vertices"], 2);
}

#[test]
fn inspect_title_reports_scoring_details() {
    let dir = TempDir::new().expect("tempdir");
    let (movies, reviews) = write_fixture(dir.path());

    let output = cargo_bin_cmd!("reelrank")
        .args(["--format", "json"])
        .arg("inspect")
        .arg("--movies")
        .arg(&movies)
        .arg("--reviews")
        .arg(&reviews)
        .args(["--movie", "Inception", "--genres", "Action & Sci-Fi"])
        .args(["--title", "tenet"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["title"], "Tenet");
    assert_eq!(json["review_count"], 3);
    let average = json["average_score"].as_f64().expect("average score");
    assert!((average - 2.45 / 3.0).abs() < 1e-9);
    let similarity = json["average_similarity"].as_f64().expect("similarity");
    assert!((similarity - 2.0 / 3.0).abs() < 1e-9);
    let overall = json["overall_similarity"].as_f64().expect("overall");
    assert!((overall - 5.0 / 6.0).abs() < 1e-9);
}

#[test]
fn search_finds_titles_by_keyword() {
    let dir = TempDir::new().expect("tempdir");
    let (movies, _reviews) = write_fixture(dir.path());

    let output = cargo_bin_cmd!("reelrank")
        .args(["--format", "json"])
        .arg("search")
        .arg("--movies")
        .arg(&movies)
        .arg("ten")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: Value = serde_json::from_slice(&output).expect("valid json");
    let entries = json.as_array().expect("array of matches");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], "m/tenet");
    assert_eq!(entries[0]["title"], "Tenet");
}

#[test]
fn export_writes_a_snapshot_file() {
    let dir = TempDir::new().expect("tempdir");
    let (movies, reviews) = write_fixture(dir.path());
    let out = dir.path().join("snapshot.json");

    cargo_bin_cmd!("reelrank")
        .arg("export")
        .arg("--movies")
        .arg(&movies)
        .arg("--reviews")
        .arg(&reviews)
        .args(["--movie", "Inception", "--genres", "Action"])
        .args(["--surface", "snapshot"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let json: Value =
        serde_json::from_str(&fs::read_to_string(&out).expect("read export")).expect("valid json");
    assert_eq!(json["preferred_movie"]["Movie"], "Inception");
    assert_eq!(json["vertices"].as_array().expect("vertices").len(), 12);
}

#[test]
fn export_scatter_to_stdout() {
    let dir = TempDir::new().expect("tempdir");
    let (movies, reviews) = write_fixture(dir.path());

    let output = cargo_bin_cmd!("reelrank")
        .args(["--format", "json"])
        .arg("export")
        .arg("--movies")
        .arg(&movies)
        .arg("--reviews")
        .arg(&reviews)
        .args(["--movie", "Inception", "--genres", "Action & Sci-Fi"])
        .args(["--surface", "scatter"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: Value = serde_json::from_slice(&output).expect("valid json");
    let rows = json["rows"].as_array().expect("rows");
    // Tenet and Heat carry three distinct scores each.
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row["review_count"] == 3));
}

#[test]
fn generate_round_trips_through_recommend() {
    let dir = TempDir::new().expect("tempdir");
    let movies = dir.path().join("gen_movies.csv");
    let reviews = dir.path().join("gen_reviews.csv");

    cargo_bin_cmd!("reelrank")
        .arg("generate")
        .arg("--movies-out")
        .arg(&movies)
        .arg("--reviews-out")
        .arg(&reviews)
        .args(["--movie-count", "40", "--review-count", "200", "--seed", "7"])
        .assert()
        .success();

    let records =
        reelrank::ingest::read_movies(&reelrank::ingest::MovieCsvConfig::new(&movies))
            .expect("read generated movies");
    assert_eq!(records.len(), 40);
    let title = records[0].title.clone();

    let output = cargo_bin_cmd!("reelrank")
        .args(["--format", "json"])
        .arg("recommend")
        .arg("--movies")
        .arg(&movies)
        .arg("--reviews")
        .arg(&reviews)
        .arg("--movie")
        .arg(&title)
        .args(["--genres", "Action", "--min-reviews", "1"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["preferred_movie"], title);
}

#[test]
fn profile_supplies_datasets_and_tunables() {
    let dir = TempDir::new().expect("tempdir");
    let (movies, reviews) = write_fixture(dir.path());
    let config_path = dir.path().join("cli.toml");
    fs::write(
        &config_path,
        format!(
            "[datasets]\nmovies = '{}'\nreviews = '{}'\n\n\
             [profiles.sparse]\nmin_reviews = 1\nlimit = 2\n",
            movies.display(),
            reviews.display()
        ),
    )
    .expect("write config");

    let output = cargo_bin_cmd!("reelrank")
        .args(["--format", "json"])
        .arg("--config")
        .arg(&config_path)
        .args(["--profile", "sparse"])
        .arg("recommend")
        .args(["--movie", "Inception", "--genres", "Action & Sci-Fi"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: Value = serde_json::from_slice(&output).expect("valid json");
    let entries = json["entries"].as_array().expect("entries");
    // With the strict gate at one review Arrival overtakes Heat, and
    // the profile limit trims the list to two.
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["title"], "Tenet");
    assert_eq!(entries[1]["title"], "Arrival");
}

#[test]
fn missing_selection_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let (movies, reviews) = write_fixture(dir.path());

    let output = cargo_bin_cmd!("reelrank")
        .arg("recommend")
        .arg("--movies")
        .arg(&movies)
        .arg("--reviews")
        .arg(&reviews)
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let text = String::from_utf8(output).expect("utf8 stderr");
    assert!(text.contains("error:"));
    assert!(text.contains("--movie or --keyword"));
}

#[test]
fn unknown_movie_title_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let (movies, reviews) = write_fixture(dir.path());

    cargo_bin_cmd!("reelrank")
        .arg("recommend")
        .arg("--movies")
        .arg(&movies)
        .arg("--reviews")
        .arg(&reviews)
        .args(["--movie", "Solaris", "--genres", "Sci-Fi"])
        .assert()
        .failure();
}

#[test]
fn out_of_range_weight_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let (movies, reviews) = write_fixture(dir.path());

    let output = cargo_bin_cmd!("reelrank")
        .arg("recommend")
        .arg("--movies")
        .arg(&movies)
        .arg("--reviews")
        .arg(&reviews)
        .args(["--movie", "Inception", "--genres", "Action"])
        .args(["--movie-weight", "1.5"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let text = String::from_utf8(output).expect("utf8 stderr");
    assert!(text.contains("--movie-weight"));
}
