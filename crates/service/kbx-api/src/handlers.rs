//! Route handlers.
//!
//! Each route arity has its own thin handler; all of them bind their path
//! segments and delegate to [`query_tree`].

use axum::{
    extract::{Path, Query, State},
    Json,
};
use kbx_explorer::TreeQuery;
use kbx_types::{parse_date_time, StorageNode, TopicFilter};
use serde::Deserialize;
use tracing::debug;

use crate::{ApiError, AppState};

type TreeResponse = Result<Json<Vec<StorageNode>>, ApiError>;

/// Query string of the tree routes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub search_pattern: Option<String>,
}

pub async fn is_alive() -> Json<bool> {
    Json(true)
}

pub async fn tree_all(State(state): State<AppState>, Query(params): Query<SearchParams>) -> TreeResponse {
    query_tree(&state, None, None, None, params).await
}

pub async fn tree_by_topics(
    State(state): State<AppState>,
    Path(topics): Path<String>,
    Query(params): Query<SearchParams>,
) -> TreeResponse {
    query_tree(&state, Some(&topics), None, None, params).await
}

pub async fn tree_from(
    State(state): State<AppState>,
    Path((topics, from)): Path<(String, String)>,
    Query(params): Query<SearchParams>,
) -> TreeResponse {
    query_tree(&state, Some(&topics), Some(&from), None, params).await
}

pub async fn tree_between(
    State(state): State<AppState>,
    Path((topics, from, until)): Path<(String, String, String)>,
    Query(params): Query<SearchParams>,
) -> TreeResponse {
    query_tree(&state, Some(&topics), Some(&from), Some(&until), params).await
}

/// Validate the raw parameters and run the query.
///
/// An empty `searchPattern` is treated as absent.
async fn query_tree(
    state: &AppState,
    topics: Option<&str>,
    from: Option<&str>,
    until: Option<&str>,
    params: SearchParams,
) -> TreeResponse {
    let topics = topics.map(TopicFilter::parse).transpose()?.unwrap_or_default();
    let from = from.map(parse_date_time).transpose()?;
    let until = until.map(parse_date_time).transpose()?;

    let mut query = TreeQuery::new().with_topics(topics).with_bounds(from, until)?;
    if let Some(pattern) = params.search_pattern.filter(|p| !p.is_empty()) {
        query = query.with_search_pattern(pattern);
    }

    debug!(
        topics = %query.topics,
        window = %query.window,
        search = query.search_pattern.as_deref(),
        "Tree query received"
    );

    let nodes = state.explorer.query_tree(query).await?;
    Ok(Json(nodes))
}
