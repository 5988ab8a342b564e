//! Ranking articles against a query article, and the never-failing query boundary
//! consumed by presentation layers.

use crate::config::DEFAULT_TOP_N;
use crate::error::{FailureKind, QueryError};
use crate::index::ArticleIndex;
use serde::Serialize;
use serde_json::Value;

pub const MSG_EMPTY_TITLE: &str = "Please enter an article title";
pub const MSG_NOT_STRING: &str = "Invalid input: title must be a string";
pub const MSG_BAD_TOP_N: &str = "Invalid input: top_n must be a positive integer";
pub const MSG_INTERNAL: &str = "Error generating recommendations";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub title: String,
    pub score: f32,
}

impl ArticleIndex {
    /// Titles of the `top_n` articles most similar to `query_title`, best first.
    pub fn recommend(&self, query_title: &str, top_n: usize) -> Result<Vec<String>, QueryError> {
        Ok(self.recommend_scored(query_title, top_n)?.into_iter().map(|r| r.title).collect())
    }

    /// Like [`recommend`](Self::recommend) but keeps the similarity scores.
    pub fn recommend_scored(&self, query_title: &str, top_n: usize) -> Result<Vec<Recommendation>, QueryError> {
        if query_title.trim().is_empty() {
            return Err(QueryError::InvalidInput(MSG_EMPTY_TITLE.into()));
        }
        if top_n == 0 {
            return Err(QueryError::InvalidInput(MSG_BAD_TOP_N.into()));
        }
        let pos = self
            .position(query_title)
            .ok_or_else(|| QueryError::NotFound(query_title.to_string()))?;

        let mut scored: Vec<(usize, f32)> = self
            .matrix()
            .row(pos)
            .iter()
            .copied()
            .enumerate()
            .filter(|&(i, _)| i != pos)
            .collect();
        // stable: equal scores keep corpus order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_n.min(self.len() - 1));

        tracing::debug!(query = query_title, top_n, returned = scored.len(), "ranked articles");
        Ok(scored
            .into_iter()
            .map(|(i, score)| Recommendation { title: self.title(i).to_string(), score })
            .collect())
    }
}

/// Title as supplied by an untyped host (JSON body, form field).
#[derive(Debug, Clone, PartialEq)]
pub enum QueryInput {
    Title(String),
    NotAString,
}

impl From<&Value> for QueryInput {
    fn from(v: &Value) -> Self {
        match v {
            Value::String(s) => QueryInput::Title(s.clone()),
            _ => QueryInput::NotAString,
        }
    }
}

impl From<&str> for QueryInput {
    fn from(s: &str) -> Self { QueryInput::Title(s.to_string()) }
}

/// Read a caller supplied result count. Absent or null means [`DEFAULT_TOP_N`]; integers
/// and decimal strings must be positive.
pub fn parse_top_n(value: Option<&Value>) -> Result<usize, QueryError> {
    let n = match value {
        None | Some(Value::Null) => return Ok(DEFAULT_TOP_N),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };
    match n {
        Some(n) if n > 0 => Ok(usize::try_from(n).unwrap_or(usize::MAX)),
        _ => Err(QueryError::InvalidInput(MSG_BAD_TOP_N.into())),
    }
}

/// Result of a query at the host boundary: either titles or a failure the host can show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Recommendations { titles: Vec<String> },
    Failure { kind: FailureKind, message: String },
}

impl Outcome {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Outcome::Failure { kind, message: message.into() }
    }

    pub fn is_success(&self) -> bool { matches!(self, Outcome::Recommendations { .. }) }

    /// Flatten to the list form: the titles, or a single message line.
    pub fn into_lines(self) -> Vec<String> {
        match self {
            Outcome::Recommendations { titles } => titles,
            Outcome::Failure { message, .. } => vec![message],
        }
    }
}

impl From<QueryError> for Outcome {
    fn from(e: QueryError) -> Self { Outcome::failure(e.kind(), e.to_string()) }
}

/// Query boundary: never panics, every failure becomes a descriptive [`Outcome::Failure`].
pub fn recommend_articles(index: &ArticleIndex, input: &QueryInput, top_n: usize) -> Outcome {
    let title = match input {
        QueryInput::Title(t) => t,
        QueryInput::NotAString => return Outcome::failure(FailureKind::InvalidInput, MSG_NOT_STRING),
    };
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| index.recommend(title, top_n)));
    match result {
        Ok(Ok(titles)) => Outcome::Recommendations { titles },
        Ok(Err(e)) => e.into(),
        Err(_) => {
            tracing::error!(query = %title, "recommendation panicked");
            Outcome::failure(FailureKind::Internal, MSG_INTERNAL)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use crate::index::build_index;
    use serde_json::json;

    fn sample() -> ArticleIndex {
        build_index(
            [("A", "cats and dogs"), ("B", "cats and birds"), ("C", "airplanes and rockets")],
            &IndexConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn shared_vocabulary_ranks_first() {
        assert_eq!(sample().recommend("A", 2).unwrap(), vec!["B", "C"]);
    }

    #[test]
    fn unknown_title_is_not_found() {
        let out = recommend_articles(&sample(), &"Z".into(), 5);
        assert_eq!(out.into_lines(), vec!["Article not found: 'Z'"]);
    }

    #[test]
    fn blank_title_asks_for_input() {
        let idx = sample();
        assert_eq!(recommend_articles(&idx, &"".into(), 5).into_lines(), vec![MSG_EMPTY_TITLE]);
        assert_eq!(recommend_articles(&idx, &"   ".into(), 5).into_lines(), vec![MSG_EMPTY_TITLE]);
    }

    #[test]
    fn non_string_title_is_invalid() {
        let out = recommend_articles(&sample(), &QueryInput::from(&json!(123)), 5);
        assert_eq!(out, Outcome::failure(FailureKind::InvalidInput, MSG_NOT_STRING));
    }

    #[test]
    fn top_n_is_clamped_to_corpus() {
        assert_eq!(sample().recommend("C", 50).unwrap().len(), 2);
    }

    #[test]
    fn zero_top_n_is_invalid() {
        assert_eq!(sample().recommend("A", 0).unwrap_err().kind(), FailureKind::InvalidInput);
    }

    #[test]
    fn zero_vector_query_keeps_corpus_order() {
        let idx = build_index(
            [("A", "cats"), ("B", "dogs"), ("Q", "the of and"), ("C", "birds")],
            &IndexConfig::default(),
        )
        .unwrap();
        assert_eq!(idx.recommend("Q", 5).unwrap(), vec!["A", "B", "C"]);
    }

    #[test]
    fn top_n_accepts_positive_integers_and_numeric_strings() {
        assert_eq!(parse_top_n(None), Ok(DEFAULT_TOP_N));
        assert_eq!(parse_top_n(Some(&Value::Null)), Ok(DEFAULT_TOP_N));
        assert_eq!(parse_top_n(Some(&json!(3))), Ok(3));
        assert_eq!(parse_top_n(Some(&json!(" 7 "))), Ok(7));
    }

    #[test]
    fn top_n_rejects_zero_negative_and_non_integers() {
        let bad = Err(QueryError::InvalidInput(MSG_BAD_TOP_N.into()));
        for v in [json!(0), json!(-1), json!(2.5), json!("-1"), json!("five"), json!([1]), json!(true)] {
            assert_eq!(parse_top_n(Some(&v)), bad, "{v}");
        }
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let v = serde_json::to_value(Outcome::Recommendations { titles: vec!["B".into()] }).unwrap();
        assert_eq!(v, json!({"status": "recommendations", "titles": ["B"]}));
    }
}
