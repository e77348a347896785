use std::path::Path;

use csv::WriterBuilder;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::ingest::{
    DEFAULT_GENRE_COLUMN, DEFAULT_ID_COLUMN, DEFAULT_SCORE_COLUMN, DEFAULT_TITLE_COLUMN,
};
use crate::records::{MovieRecord, ReviewRecord};

/// Produces synthetic movie and review datasets in the same CSV shape
/// the ingester reads, including a sprinkling of the malformed score
/// fields real review dumps contain.
pub struct DataGenerator {
    rng: StdRng,
}

impl DataGenerator {
    /// Generator with an OS-seeded rng.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Generator with a fixed seed, for reproducible datasets.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generates `count` movies with unique ids and titles.
    pub fn generate_movies(&mut self, count: usize) -> Vec<MovieRecord> {
        let mut movies = Vec::with_capacity(count);
        for index in 0..count {
            let adjective = ADJECTIVES[index % ADJECTIVES.len()];
            let noun = NOUNS[(index / ADJECTIVES.len()) % NOUNS.len()];
            let sequel = index / (ADJECTIVES.len() * NOUNS.len());
            let title = if sequel == 0 {
                format!("{adjective} {noun}")
            } else {
                format!("{adjective} {noun} {}", sequel + 1)
            };
            let id = format!(
                "m/{}",
                title.to_lowercase().replace(' ', "_")
            );
            movies.push(MovieRecord {
                id,
                title,
                genre_field: self.genre_field(),
            });
        }
        movies
    }

    /// Generates `count` reviews against the given movies.
    ///
    /// Most rows carry a well-formed fractional score; a few carry
    /// single-token scores, quote or star wrapping, malformed text,
    /// zero denominators, or ids no movie has.
    pub fn generate_reviews(&mut self, movies: &[MovieRecord], count: usize) -> Vec<ReviewRecord> {
        if movies.is_empty() {
            return Vec::new();
        }
        let mut reviews = Vec::with_capacity(count);
        for _ in 0..count {
            let movie_id = if self.rng.gen_bool(0.03) {
                format!("m/missing_{}", self.rng.gen_range(0..1000))
            } else {
                movies[self.rng.gen_range(0..movies.len())].id.clone()
            };
            reviews.push(ReviewRecord {
                movie_id,
                raw_score_field: self.raw_score(),
            });
        }
        reviews
    }

    /// A movie dataset and a review dataset sized together.
    pub fn generate_catalog(
        &mut self,
        movie_count: usize,
        review_count: usize,
    ) -> (Vec<MovieRecord>, Vec<ReviewRecord>) {
        let movies = self.generate_movies(movie_count);
        let reviews = self.generate_reviews(&movies, review_count);
        (movies, reviews)
    }

    fn genre_field(&mut self) -> String {
        let picks = self.rng.gen_range(1..=3);
        let mut chosen: Vec<&str> = Vec::with_capacity(picks);
        while chosen.len() < picks {
            let genre = GENRES[self.rng.gen_range(0..GENRES.len())];
            if !chosen.contains(&genre) {
                chosen.push(genre);
            }
        }
        // Real dumps mix "A & B" and "A, B" delimiters.
        if self.rng.gen_bool(0.2) {
            chosen.join(", ")
        } else {
            chosen.join(" & ")
        }
    }

    fn raw_score(&mut self) -> String {
        let shape = self.rng.gen_range(0..100);
        match shape {
            0..=69 => self.fraction(),
            70..=79 => format!("{:.1}", self.rng.gen_range(0.0..1.0)),
            80..=87 => format!("'{}'", self.fraction()),
            88..=93 => format!("*{}*", self.fraction()),
            94..=96 => MALFORMED[self.rng.gen_range(0..MALFORMED.len())].to_string(),
            97..=98 => format!("{}/0", self.rng.gen_range(1..6)),
            _ => "1/2/3".to_string(),
        }
    }

    fn fraction(&mut self) -> String {
        let denominator = [4u32, 5, 10][self.rng.gen_range(0..3)];
        // Occasionally above the denominator, to exercise the cap.
        let numerator = self.rng.gen_range(0..=denominator + 1);
        format!("{numerator}/{denominator}")
    }
}

impl Default for DataGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes movies as CSV with the default ingestion headers.
pub fn write_movie_csv(path: &Path, movies: &[MovieRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record([DEFAULT_ID_COLUMN, DEFAULT_TITLE_COLUMN, DEFAULT_GENRE_COLUMN])?;
    for movie in movies {
        writer.write_record([
            movie.id.as_str(),
            movie.title.as_str(),
            movie.genre_field.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes reviews as CSV with the default ingestion headers.
pub fn write_review_csv(path: &Path, reviews: &[ReviewRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record([DEFAULT_ID_COLUMN, DEFAULT_SCORE_COLUMN])?;
    for review in reviews {
        writer.write_record([review.movie_id.as_str(), review.raw_score_field.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

const ADJECTIVES: &[&str] = &[
    "Crimson", "Silent", "Golden", "Broken", "Electric", "Midnight", "Hollow", "Distant",
    "Savage", "Gentle", "Frozen", "Burning", "Lost", "Hidden", "Final",
];

const NOUNS: &[&str] = &[
    "Harbor", "Empire", "Garden", "Signal", "Horizon", "River", "Machine", "Kingdom", "Echo",
    "Voyage", "Shadow", "Orchard", "Archive", "Summit",
];

const GENRES: &[&str] = &[
    "Action", "Adventure", "Comedy", "Drama", "Horror", "Mystery", "Romance", "Sci-fi",
    "Thriller", "Documentary",
];

const MALFORMED: &[&str] = &["great!", "B+", "four stars", "", "recommended"];
