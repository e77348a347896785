use std::fmt::Write as _;

use serde::Serialize;

use crate::error::Result;
use crate::graph::{Graph, Recommendation};

/// A finished set of recommendations together with the preferences
/// that produced it, ready to print or serialize.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationReport {
    /// Title of the movie the ranking is centered on.
    pub preferred_movie: String,
    /// The user's favourite genres, in order.
    pub preferred_genres: Vec<String>,
    /// Ranked recommendations, best first.
    pub entries: Vec<Recommendation>,
}

impl RecommendationReport {
    /// Wraps ranked entries with the graph's recorded preferences.
    ///
    /// Fails when the graph has no chosen movie.
    pub fn compose(graph: &Graph, entries: Vec<Recommendation>) -> Result<Self> {
        let chosen = graph.chosen_vertex()?;
        Ok(Self {
            preferred_movie: chosen.item.to_string(),
            preferred_genres: graph.preferred_genres().iter().cloned().collect(),
            entries,
        })
    }

    /// Console rendering: the preference block, then one numbered
    /// entry per recommendation with its match percentage and average
    /// score.
    pub fn render(&self, show_review_counts: bool) -> String {
        let mut out = String::new();
        let genres = if self.preferred_genres.is_empty() {
            "(none)".to_string()
        } else {
            self.preferred_genres.join(", ")
        };
        let _ = writeln!(out, "Based on your preferences:");
        let _ = writeln!(out, "    - Preferred Movie: {}", self.preferred_movie);
        let _ = writeln!(out, "    - Preferred Genre(s): {}", genres);
        let _ = writeln!(out);

        if self.entries.is_empty() {
            let _ = writeln!(out, "No movies matched your preferences.");
            return out;
        }

        let _ = writeln!(
            out,
            "Here are the top {} movies matching your preferences:",
            self.entries.len()
        );
        let _ = writeln!(out);
        for (index, entry) in self.entries.iter().enumerate() {
            let _ = writeln!(
                out,
                "#{} -> {}: {:.1} % match",
                index + 1,
                entry.title,
                percent(entry.match_score)
            );
            if show_review_counts {
                let _ = writeln!(
                    out,
                    "       Avg Score: {:.1}  Num of reviews: {}",
                    percent(entry.average_score),
                    entry.review_count
                );
            } else {
                let _ = writeln!(out, "       Avg Score: {:.1}", percent(entry.average_score));
            }
        }
        out
    }
}

/// Fraction in [0, 1] as a whole percentage.
fn percent(value: f64) -> f64 {
    (value * 100.0).round()
}
