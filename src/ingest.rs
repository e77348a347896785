use std::path::PathBuf;

use csv::{ReaderBuilder, StringRecord};
use tracing::{info, warn};

use crate::error::{GraphError, Result};
use crate::records::{MovieRecord, ReviewRecord};

/// Column holding the dataset id that joins movies to reviews.
pub const DEFAULT_ID_COLUMN: &str = "rotten_tomatoes_link";
/// Column holding the movie title.
pub const DEFAULT_TITLE_COLUMN: &str = "movie_title";
/// Column holding the raw genre field.
pub const DEFAULT_GENRE_COLUMN: &str = "genres";
/// Column holding the raw review score.
pub const DEFAULT_SCORE_COLUMN: &str = "review_score";

/// Configuration for reading movie rows from a CSV file.
///
/// Columns are resolved by header name, case-insensitively, so the
/// file may carry any number of extra columns in any order.
#[derive(Debug, Clone)]
pub struct MovieCsvConfig {
    /// Path to the CSV file containing movie data.
    pub path: PathBuf,
    /// Name of the column containing dataset ids.
    pub id_column: String,
    /// Name of the column containing titles.
    pub title_column: String,
    /// Name of the column containing the genre field.
    pub genre_column: String,
}

impl MovieCsvConfig {
    /// Configuration with the Rotten Tomatoes column names.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
            title_column: DEFAULT_TITLE_COLUMN.to_string(),
            genre_column: DEFAULT_GENRE_COLUMN.to_string(),
        }
    }
}

/// Configuration for reading review rows from a CSV file.
#[derive(Debug, Clone)]
pub struct ReviewCsvConfig {
    /// Path to the CSV file containing review data.
    pub path: PathBuf,
    /// Name of the column containing dataset ids.
    pub id_column: String,
    /// Name of the column containing raw scores.
    pub score_column: String,
}

impl ReviewCsvConfig {
    /// Configuration with the Rotten Tomatoes column names.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
            score_column: DEFAULT_SCORE_COLUMN.to_string(),
        }
    }
}

/// Reads movie records from a CSV file.
///
/// Rows missing the id or title are logged and skipped; an absent
/// genre field becomes the empty string. Fails when the file cannot
/// be read or a configured column is not in the header.
pub fn read_movies(cfg: &MovieCsvConfig) -> Result<Vec<MovieRecord>> {
    let mut reader = ReaderBuilder::new().flexible(true).from_path(&cfg.path)?;
    let headers = reader.headers()?.clone();
    let id_index = find_column(&headers, &cfg.id_column)?;
    let title_index = find_column(&headers, &cfg.title_column)?;
    let genre_index = find_column(&headers, &cfg.genre_column)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let (Some(id), Some(title)) = (
            present(&record, id_index),
            present(&record, title_index),
        ) else {
            warn!(line = record_line(&record), "ingest.row.short");
            continue;
        };
        let genre_field = record.get(genre_index).unwrap_or_default().to_string();
        records.push(MovieRecord {
            id: id.to_string(),
            title: title.to_string(),
            genre_field,
        });
    }
    info!(
        movies = records.len(),
        path = %cfg.path.display(),
        "ingest.movies.loaded"
    );
    Ok(records)
}

/// Reads review records from a CSV file.
///
/// Rows missing the id are logged and skipped. The score field is
/// carried raw, empty if absent; malformed scores are the builder's
/// concern, not the reader's.
pub fn read_reviews(cfg: &ReviewCsvConfig) -> Result<Vec<ReviewRecord>> {
    let mut reader = ReaderBuilder::new().flexible(true).from_path(&cfg.path)?;
    let headers = reader.headers()?.clone();
    let id_index = find_column(&headers, &cfg.id_column)?;
    let score_index = find_column(&headers, &cfg.score_column)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let Some(movie_id) = present(&record, id_index) else {
            warn!(line = record_line(&record), "ingest.row.short");
            continue;
        };
        let raw_score_field = record.get(score_index).unwrap_or_default().to_string();
        records.push(ReviewRecord {
            movie_id: movie_id.to_string(),
            raw_score_field,
        });
    }
    info!(
        reviews = records.len(),
        path = %cfg.path.display(),
        "ingest.reviews.loaded"
    );
    Ok(records)
}

fn find_column(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
        .ok_or_else(|| GraphError::InvalidArgument(format!("column '{}' not found", name)))
}

fn present<'a>(record: &'a StringRecord, index: usize) -> Option<&'a str> {
    record
        .get(index)
        .map(str::trim)
        .filter(|field| !field.is_empty())
}

fn record_line(record: &StringRecord) -> u64 {
    record.position().map_or(0, |position| position.line())
}
