//! Search API over a saved paper set (axum).

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::matcher::Matcher;
use crate::paper::{Paper, TextField};

pub struct Library {
    papers: Vec<Paper>,
    matcher: Matcher,
}

impl Library {
    pub fn new(papers: Vec<Paper>, matcher: Matcher) -> Self {
        Self { papers, matcher }
    }

    /// Papers whose `field` matches the keyword expression, in stored order.
    pub fn search(&self, keyword: &str, field: TextField) -> Vec<Paper> {
        let texts: Vec<_> = self.papers.iter().map(|p| p.text(field)).collect();
        let flags = self.matcher.flag_all(&texts, keyword);
        self.papers
            .iter()
            .zip(flags)
            .filter(|(_, flag)| *flag == 1)
            .map(|(paper, _)| paper.clone())
            .collect()
    }
}

/// Shared app state: the loaded papers and the matcher used to filter them.
pub type AppState = Arc<Library>;

/// Query params for GET /search?q=...&field=...
#[derive(serde::Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default)]
    pub field: TextField,
}

/// GET /search?q=privacy+and+federated -> JSON array of matching papers.
pub async fn search_handler(
    State(library): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<Paper>>, StatusCode> {
    tracing::info!(q = %params.q, field = ?params.field, "search");
    let hits = tokio::task::spawn_blocking(move || library.search(&params.q, params.field))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "search task failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok(Json(hits))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", get(search_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(id: &str, title: &str, abstract_text: &str) -> Paper {
        Paper {
            number: None,
            note_id: id.to_string(),
            title: title.to_string(),
            authors: vec![],
            abstract_text: abstract_text.to_string(),
            url: format!("https://openreview.net/pdf?id={id}"),
        }
    }

    fn library() -> AppState {
        Arc::new(Library::new(
            vec![
                paper("a", "Differential Privacy in Federated Learning", "We bound leakage."),
                paper("b", "Graph Neural Networks", "Robustness to adversarial edges."),
                paper("c", "Image Classifiers", "A zero-shot analysis."),
            ],
            Matcher::default(),
        ))
    }

    fn ids(papers: &[Paper]) -> Vec<&str> {
        papers.iter().map(|p| p.note_id.as_str()).collect()
    }

    #[test]
    fn test_library_search_fields() {
        let lib = library();
        assert_eq!(ids(&lib.search("robust or zero shot", TextField::Both)), ["b", "c"]);
        assert!(lib.search("robust", TextField::Title).is_empty());
        assert_eq!(ids(&lib.search("privacy and federated", TextField::Title)), ["a"]);
    }

    #[tokio::test]
    async fn test_search_handler() {
        let params = SearchQuery {
            q: "privacy or classifier".into(),
            field: TextField::Title,
        };
        let Json(hits) = search_handler(State(library()), Query(params)).await.unwrap();
        assert_eq!(ids(&hits), ["a", "c"]);
    }
}
