//! Client for the public Rick and Morty character catalog.
//!
//! The catalog is paginated (`info.next` links to the following page). A
//! session normally reads only the first page; `catalog_max_pages` raises
//! that limit.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::parse_json;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::transport::Transport;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogInfo {
    pub count: u64,
    pub pages: u64,
    pub next: Option<String>,
    pub prev: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedLink {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// A character as served by the catalog. Fields the merge engine does not
/// display are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteCharacter {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub origin: Option<NamedLink>,
    #[serde(default)]
    pub location: Option<NamedLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogPage {
    pub info: CatalogInfo,
    pub results: Vec<RemoteCharacter>,
}

pub fn build_page_request(url: &str) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        url: url.to_string(),
        headers: Vec::new(),
        body: None,
    }
}

pub fn fetch_page(transport: &impl Transport, url: &str) -> Result<CatalogPage, ApiError> {
    let response = transport.execute(build_page_request(url))?;
    parse_json(response)
}

/// Read up to `max_pages` pages starting at `first_url`.
///
/// A failure on the first page is returned. A failure on a later page is
/// logged and the characters collected so far are kept.
pub fn fetch_catalog(
    transport: &impl Transport,
    first_url: &str,
    max_pages: usize,
) -> Result<Vec<RemoteCharacter>, ApiError> {
    let first = fetch_page(transport, first_url)?;
    let mut characters = first.results;
    let mut next = first.info.next;
    let mut pages = 1;

    while let Some(url) = next.take() {
        if pages >= max_pages {
            break;
        }
        match fetch_page(transport, &url) {
            Ok(page) => {
                characters.extend(page.results);
                next = page.info.next;
                pages += 1;
            }
            Err(e) => {
                warn!(url = %url, error = %e, "stopping catalog pagination");
                break;
            }
        }
    }

    debug!(pages, characters = characters.len(), "catalog fetched");
    Ok(characters)
}
