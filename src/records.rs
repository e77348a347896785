use std::collections::BTreeSet;

/// One row of the movie dataset, as handed to the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    /// Dataset identifier, the join key between movies and reviews.
    pub id: String,
    /// Display title; becomes the movie vertex key.
    pub title: String,
    /// Raw genre field, `&`/comma delimited.
    pub genre_field: String,
}

/// One row of the review dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    /// Identifier of the movie the review was filed against.
    pub movie_id: String,
    /// Raw score field, e.g. `3/4`, `0.8` or `'4/5'`.
    pub raw_score_field: String,
}

/// Why a raw score field could not be turned into a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreError {
    /// Non-numeric token, wrong token count, or a non-finite result.
    Malformed,
    /// Fractional score with a zero denominator.
    ZeroDenominator,
}

/// Parses a raw review score field into a normalized score.
///
/// The field is stripped of surrounding `'` and `*` characters, then of
/// spaces, then split on `/`. Two tokens give `min(t0 / t1, 1.0)`, one
/// token gives `min(t0, 1.0)`. There is no lower clamp.
pub fn normalize_score(raw: &str) -> Result<f64, ScoreError> {
    let cleaned = raw
        .trim_matches(|c| c == '\'' || c == '*')
        .trim_matches(' ');
    let tokens: Vec<&str> = cleaned.split('/').collect();
    let score = match tokens.as_slice() {
        [single] => parse_token(single)?,
        [numerator, denominator] => {
            let numerator = parse_token(numerator)?;
            let denominator = parse_token(denominator)?;
            if denominator == 0.0 {
                return Err(ScoreError::ZeroDenominator);
            }
            numerator / denominator
        }
        _ => return Err(ScoreError::Malformed),
    };
    if !score.is_finite() {
        return Err(ScoreError::Malformed);
    }
    Ok(score.min(1.0))
}

fn parse_token(token: &str) -> Result<f64, ScoreError> {
    let value: f64 = token.trim().parse().map_err(|_| ScoreError::Malformed)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ScoreError::Malformed)
    }
}

/// Normalizes a raw genre field into a set of genre names.
///
/// The field is split on `", "` and `&`, each token trimmed and
/// capitalized (first letter upper, rest lower). Empty tokens are
/// dropped, so an empty field yields an empty set.
pub fn parse_genres(field: &str) -> BTreeSet<String> {
    field
        .replace(", ", "&")
        .split('&')
        .map(|token| capitalize(token.trim()))
        .filter(|genre| !genre.is_empty())
        .collect()
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Jaccard similarity between two genre sets, `None` when the union is
/// empty.
pub fn genre_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Option<f64> {
    let union = a.union(b).count();
    if union == 0 {
        return None;
    }
    let intersection = a.intersection(b).count();
    Some(intersection as f64 / union as f64)
}
