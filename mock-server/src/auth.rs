use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use tracing::info;

use crate::error::{require_non_empty, AppError};
use crate::store::{Db, Store};
use crate::types::{
    Envelope, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterUsuario, Role,
    Usuario,
};

pub async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let mut store = db.write().await;
    let user = store
        .check_credentials(&input.email, &input.password)
        .cloned()
        .ok_or(AppError::Unauthorized("invalid credentials"))?;
    if !user.is_active {
        return Err(AppError::Forbidden("account disabled"));
    }
    let (token, refresh_token) = store.issue_tokens(&user.id);
    info!(user = %user.id, "login");
    Ok(Json(LoginResponse {
        token,
        refresh_token,
        user,
    }))
}

/// Public sign-up. Always creates an active regular user.
pub async fn register(
    State(db): State<Db>,
    Json(input): Json<RegisterUsuario>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    let mut store = db.write().await;
    let user = create_account(&mut store, &input, Role::Regular, true)?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::message("user registered").usuario(user)),
    ))
}

/// Admin sign-up honoring `rol` and `isActive`.
pub async fn register_admin(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<RegisterUsuario>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    let mut store = db.write().await;
    store.authenticate_admin(&headers)?;
    let role = input.role.unwrap_or(Role::Regular);
    let is_active = input.is_active.unwrap_or(true);
    let user = create_account(&mut store, &input, role, is_active)?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::message("user registered").usuario(user)),
    ))
}

pub async fn refresh(
    State(db): State<Db>,
    Json(input): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    let mut store = db.write().await;
    let token = store
        .refresh(&input.refresh_token)
        .ok_or(AppError::Unauthorized("invalid refresh token"))?;
    Ok(Json(RefreshResponse { token }))
}

fn create_account(
    store: &mut Store,
    input: &RegisterUsuario,
    role: Role,
    is_active: bool,
) -> Result<Usuario, AppError> {
    require_non_empty("nombre", &input.name)?;
    require_non_empty("correo", &input.email)?;
    require_non_empty("contraseña", &input.password)?;
    if store.email_taken(&input.email) {
        return Err(AppError::BadRequest("email already registered".to_string()));
    }
    let user = store.add_account(&input.name, &input.email, &input.password, role, is_active);
    info!(user = %user.id, role = ?user.role, "registered");
    Ok(user)
}
