//! Character endpoints. The plain routes are scoped to the caller's own
//! characters; the `/admin` routes see everyone's and include the owner.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::error::{require_non_empty, AppError};
use crate::store::{new_id, Db, Store};
use crate::types::{CreatePersonaje, Envelope, Personaje, UpdatePersonaje};

const NOT_FOUND: &str = "character not found";

pub async fn list_mine(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Envelope>, AppError> {
    let store = db.read().await;
    let user = store.authenticate(&headers)?;
    let mine = store
        .personajes
        .iter()
        .filter(|p| p.user_id == user.id)
        .cloned()
        .collect();
    Ok(Json(Envelope::personajes(mine)))
}

pub async fn get_mine(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, AppError> {
    let store = db.read().await;
    let user = store.authenticate(&headers)?;
    let index = position(&store, &id, Some(&user.id))?;
    Ok(Json(Envelope::default().personaje(store.personajes[index].clone())))
}

pub async fn create_mine(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreatePersonaje>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    let mut store = db.write().await;
    let user = store.authenticate(&headers)?;
    let created = insert(&mut store, user.id, input)?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::message("character created").personaje(created)),
    ))
}

pub async fn update_mine(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdatePersonaje>,
) -> Result<Json<Envelope>, AppError> {
    let mut store = db.write().await;
    let user = store.authenticate(&headers)?;
    let index = position(&store, &id, Some(&user.id))?;
    let updated = apply(&mut store, index, input)?;
    Ok(Json(Envelope::message("character updated").personaje(updated)))
}

pub async fn delete_mine(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, AppError> {
    let mut store = db.write().await;
    let user = store.authenticate(&headers)?;
    let index = position(&store, &id, Some(&user.id))?;
    store.personajes.remove(index);
    Ok(Json(Envelope::message("character deleted")))
}

pub async fn list_all(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Envelope>, AppError> {
    let store = db.read().await;
    store.authenticate_admin(&headers)?;
    let all = store
        .personajes
        .iter()
        .map(|p| store.with_owner(p.clone()))
        .collect();
    Ok(Json(Envelope::personajes(all)))
}

pub async fn get_any(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, AppError> {
    let store = db.read().await;
    store.authenticate_admin(&headers)?;
    let index = position(&store, &id, None)?;
    let found = store.with_owner(store.personajes[index].clone());
    Ok(Json(Envelope::default().personaje(found)))
}

/// Create on behalf of `userId`, or the admin when it is absent.
pub async fn create_any(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreatePersonaje>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    let mut store = db.write().await;
    let admin = store.authenticate_admin(&headers)?;
    let owner = input.user_id.clone().unwrap_or(admin.id);
    if store.user(&owner).is_none() {
        return Err(AppError::BadRequest("unknown user".to_string()));
    }
    let created = insert(&mut store, owner, input)?;
    let created = store.with_owner(created);
    Ok((
        StatusCode::CREATED,
        Json(Envelope::message("character created").personaje(created)),
    ))
}

pub async fn update_any(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdatePersonaje>,
) -> Result<Json<Envelope>, AppError> {
    let mut store = db.write().await;
    store.authenticate_admin(&headers)?;
    let index = position(&store, &id, None)?;
    let updated = apply(&mut store, index, input)?;
    let updated = store.with_owner(updated);
    Ok(Json(Envelope::message("character updated").personaje(updated)))
}

pub async fn delete_any(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, AppError> {
    let mut store = db.write().await;
    store.authenticate_admin(&headers)?;
    let index = position(&store, &id, None)?;
    store.personajes.remove(index);
    Ok(Json(Envelope::message("character deleted")))
}

fn position(store: &Store, id: &str, owner: Option<&str>) -> Result<usize, AppError> {
    store
        .personajes
        .iter()
        .position(|p| p.id == id && owner.map_or(true, |owner| p.user_id == owner))
        .ok_or(AppError::NotFound(NOT_FOUND))
}

/// Names are unique per owner, case-insensitively.
fn name_taken(store: &Store, user_id: &str, name: &str, except: Option<&str>) -> bool {
    store.personajes.iter().any(|p| {
        p.user_id == user_id && p.name.eq_ignore_ascii_case(name) && Some(p.id.as_str()) != except
    })
}

fn insert(store: &mut Store, user_id: String, input: CreatePersonaje) -> Result<Personaje, AppError> {
    require_non_empty("nombre", &input.name)?;
    require_non_empty("foto", &input.photo)?;
    if name_taken(store, &user_id, &input.name, None) {
        return Err(AppError::BadRequest("duplicate".to_string()));
    }
    let personaje = Personaje {
        id: new_id(),
        name: input.name,
        photo: input.photo,
        user_id,
        owner: None,
    };
    store.personajes.push(personaje.clone());
    Ok(personaje)
}

fn apply(store: &mut Store, index: usize, input: UpdatePersonaje) -> Result<Personaje, AppError> {
    if let Some(name) = &input.name {
        require_non_empty("nombre", name)?;
        let current = &store.personajes[index];
        if name_taken(store, &current.user_id, name, Some(&current.id)) {
            return Err(AppError::BadRequest("duplicate".to_string()));
        }
    }
    if let Some(photo) = &input.photo {
        require_non_empty("foto", photo)?;
    }

    let personaje = &mut store.personajes[index];
    if let Some(name) = input.name {
        personaje.name = name;
    }
    if let Some(photo) = input.photo {
        personaje.photo = photo;
    }
    Ok(personaje.clone())
}
