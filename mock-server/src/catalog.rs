use axum::{
    extract::{Query, State},
    http::{header::HOST, HeaderMap},
    Json,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::store::{Db, CATALOG_PAGE_SIZE};
use crate::types::{CatalogInfo, CatalogPage};

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

/// `GET /api/character?page=N`, paginated like the public catalog with
/// absolute `next`/`prev` links.
pub async fn list_characters(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Json<CatalogPage>, AppError> {
    let store = db.read().await;
    let count = store.catalog.len();
    let pages = count.div_ceil(CATALOG_PAGE_SIZE).max(1);
    let page = query.page.unwrap_or(1);
    if page == 0 || page > pages {
        return Err(AppError::NotFound("There is nothing here"));
    }

    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let link = |n: usize| format!("http://{host}/api/character?page={n}");

    let results = store
        .catalog
        .iter()
        .skip((page - 1) * CATALOG_PAGE_SIZE)
        .take(CATALOG_PAGE_SIZE)
        .cloned()
        .collect();

    Ok(Json(CatalogPage {
        info: CatalogInfo {
            count,
            pages,
            next: (page < pages).then(|| link(page + 1)),
            prev: (page > 1).then(|| link(page - 1)),
        },
        results,
    }))
}
