//! Admin-only user management. Deletion deactivates the account.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use tracing::info;

use crate::error::{require_non_empty, AppError};
use crate::store::Db;
use crate::types::{Envelope, UpdateUsuario};

const NOT_FOUND: &str = "user not found";

pub async fn list(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Envelope>, AppError> {
    let store = db.read().await;
    store.authenticate_admin(&headers)?;
    let users = store.accounts.iter().map(|a| a.user.clone()).collect();
    Ok(Json(Envelope::usuarios(users)))
}

pub async fn get(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, AppError> {
    let store = db.read().await;
    store.authenticate_admin(&headers)?;
    let user = store.user(&id).cloned().ok_or(AppError::NotFound(NOT_FOUND))?;
    Ok(Json(Envelope::default().usuario(user)))
}

pub async fn update(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdateUsuario>,
) -> Result<Json<Envelope>, AppError> {
    let mut store = db.write().await;
    store.authenticate_admin(&headers)?;
    if store.user(&id).is_none() {
        return Err(AppError::NotFound(NOT_FOUND));
    }
    if let Some(name) = &input.name {
        require_non_empty("nombre", name)?;
    }
    if let Some(email) = &input.email {
        require_non_empty("correo", email)?;
        let taken = store
            .accounts
            .iter()
            .any(|a| a.user.id != id && a.user.email.eq_ignore_ascii_case(email));
        if taken {
            return Err(AppError::BadRequest("email already registered".to_string()));
        }
    }

    let user = store.user_mut(&id).ok_or(AppError::NotFound(NOT_FOUND))?;
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(email) = input.email {
        user.email = email;
    }
    if let Some(role) = input.role {
        user.role = role;
    }
    if let Some(is_active) = input.is_active {
        user.is_active = is_active;
    }
    let updated = user.clone();
    Ok(Json(Envelope::message("user updated").usuario(updated)))
}

pub async fn delete(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, AppError> {
    let mut store = db.write().await;
    let admin = store.authenticate_admin(&headers)?;
    if admin.id == id {
        return Err(AppError::BadRequest("cannot deactivate yourself".to_string()));
    }
    let user = store.user_mut(&id).ok_or(AppError::NotFound(NOT_FOUND))?;
    user.is_active = false;
    let deactivated = user.clone();
    info!(user = %id, "deactivated");
    Ok(Json(Envelope::message("user deactivated").usuario(deactivated)))
}
