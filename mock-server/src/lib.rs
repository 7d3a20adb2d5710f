//! In-memory stand-in for the personajes backend plus a paginated copy of
//! the public character catalog. State lives for as long as the router.

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

mod auth;
mod catalog;
mod error;
mod personajes;
mod store;
mod types;
mod usuarios;

pub use error::AppError;
pub use store::{
    Db, Store, CATALOG_PAGE_SIZE, SEED_ADMIN_EMAIL, SEED_ADMIN_PASSWORD, SEED_USER_EMAIL,
    SEED_USER_PASSWORD,
};
pub use types::*;

/// Router over the seeded store.
pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/register/admin", post(auth::register_admin))
        .route("/auth/refresh", post(auth::refresh))
        .route("/personajes", post(personajes::create_mine))
        .route("/personajes/list", get(personajes::list_mine))
        .route("/personajes/only/{id}", get(personajes::get_mine))
        .route(
            "/personajes/{id}",
            put(personajes::update_mine).delete(personajes::delete_mine),
        )
        .route(
            "/personajes/admin",
            get(personajes::list_all).post(personajes::create_any),
        )
        .route(
            "/personajes/admin/{id}",
            get(personajes::get_any)
                .put(personajes::update_any)
                .delete(personajes::delete_any),
        )
        .route("/usuarios", get(usuarios::list))
        .route(
            "/usuarios/{id}",
            get(usuarios::get).put(usuarios::update).delete(usuarios::delete),
        )
        .route("/api/character", get(catalog::list_characters))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}
