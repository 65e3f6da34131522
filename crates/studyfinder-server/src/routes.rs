//! HTTP routes.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use studyfinder_core::models::group::GroupDetails;
use studyfinder_db::repository::SurrealGroupRepository;
use studyfinder_service::SearchService;
use surrealdb::engine::remote::ws::Client;

pub type SharedSearch = Arc<SearchService<SurrealGroupRepository<Client>>>;

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
    /// Whether subject tags participate in matching (the union
    /// variant). Defaults to on.
    #[serde(default = "default_true", rename = "includeSubjects")]
    include_subjects: bool,
}

pub fn router(search: SharedSearch) -> Router {
    Router::new()
        .route("/api/search", get(search_handler))
        .with_state(search)
}

/// Free-text group search. Always answers 200 with a JSON array: blank
/// queries and degraded (store-failure) results both yield `[]`.
async fn search_handler(
    State(search): State<SharedSearch>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<GroupDetails>> {
    let feed = search
        .search_with(&params.q, params.include_subjects)
        .await;
    Json(feed.groups)
}
