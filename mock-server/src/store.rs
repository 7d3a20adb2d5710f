use std::{collections::HashMap, sync::Arc};

use axum::http::{header::AUTHORIZATION, HeaderMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::types::{CatalogCharacter, NamedLink, Personaje, Role, Usuario};

pub const SEED_ADMIN_EMAIL: &str = "admin@example.com";
pub const SEED_ADMIN_PASSWORD: &str = "admin123";
pub const SEED_USER_EMAIL: &str = "user@example.com";
pub const SEED_USER_PASSWORD: &str = "user123";

/// Catalog page size; small so pagination shows up with the seed data.
pub const CATALOG_PAGE_SIZE: usize = 5;

#[derive(Clone, Debug)]
pub struct Account {
    pub user: Usuario,
    pub password: String,
}

#[derive(Debug, Default)]
pub struct Store {
    pub accounts: Vec<Account>,
    pub personajes: Vec<Personaje>,
    pub catalog: Vec<CatalogCharacter>,
    access_tokens: HashMap<String, String>,
    refresh_tokens: HashMap<String, String>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Store {
    /// An admin, a regular user and a small catalog.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        store.add_account("Admin", SEED_ADMIN_EMAIL, SEED_ADMIN_PASSWORD, Role::Admin, true);
        store.add_account("User", SEED_USER_EMAIL, SEED_USER_PASSWORD, Role::Regular, true);
        store.catalog = seed_catalog();
        store
    }

    pub fn add_account(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
        is_active: bool,
    ) -> Usuario {
        let user = Usuario {
            id: new_id(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            is_active,
        };
        self.accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
        });
        user
    }

    pub fn user(&self, id: &str) -> Option<&Usuario> {
        self.accounts.iter().map(|a| &a.user).find(|u| u.id == id)
    }

    pub fn user_mut(&mut self, id: &str) -> Option<&mut Usuario> {
        self.accounts.iter_mut().map(|a| &mut a.user).find(|u| u.id == id)
    }

    pub fn email_taken(&self, email: &str) -> bool {
        self.accounts.iter().any(|a| a.user.email.eq_ignore_ascii_case(email))
    }

    pub fn check_credentials(&self, email: &str, password: &str) -> Option<&Usuario> {
        self.accounts
            .iter()
            .find(|a| a.user.email.eq_ignore_ascii_case(email) && a.password == password)
            .map(|a| &a.user)
    }

    /// Issue an access/refresh token pair for `user_id`.
    pub fn issue_tokens(&mut self, user_id: &str) -> (String, String) {
        let access = new_id();
        let refresh = new_id();
        self.access_tokens.insert(access.clone(), user_id.to_string());
        self.refresh_tokens.insert(refresh.clone(), user_id.to_string());
        (access, refresh)
    }

    pub fn refresh(&mut self, refresh_token: &str) -> Option<String> {
        let user_id = self.refresh_tokens.get(refresh_token)?.clone();
        let access = new_id();
        self.access_tokens.insert(access.clone(), user_id);
        Some(access)
    }

    /// Resolve the bearer token in `headers` to an active user.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Usuario, AppError> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized("missing token"))?;
        let user = self
            .access_tokens
            .get(token)
            .and_then(|id| self.user(id))
            .ok_or(AppError::Unauthorized("invalid token"))?;
        if !user.is_active {
            return Err(AppError::Forbidden("account disabled"));
        }
        Ok(user.clone())
    }

    pub fn authenticate_admin(&self, headers: &HeaderMap) -> Result<Usuario, AppError> {
        let user = self.authenticate(headers)?;
        if user.role != Role::Admin {
            return Err(AppError::Forbidden("admin only"));
        }
        Ok(user)
    }

    /// Attach the owner summary used by admin listings.
    pub fn with_owner(&self, mut personaje: Personaje) -> Personaje {
        personaje.owner = self.user(&personaje.user_id).map(Into::into);
        personaje
    }
}

fn seed_catalog() -> Vec<CatalogCharacter> {
    let rows = [
        ("Rick Sanchez", "Alive", "Human", "Male", "Earth (C-137)"),
        ("Morty Smith", "Alive", "Human", "Male", "unknown"),
        ("Summer Smith", "Alive", "Human", "Female", "Earth (Replacement Dimension)"),
        ("Beth Smith", "Alive", "Human", "Female", "Earth (Replacement Dimension)"),
        ("Jerry Smith", "Alive", "Human", "Male", "Earth (Replacement Dimension)"),
        ("Abadango Cluster Princess", "Alive", "Alien", "Female", "Abadango"),
        ("Abradolf Lincler", "unknown", "Human", "Male", "Earth (Replacement Dimension)"),
        ("Adjudicator Rick", "Dead", "Human", "Male", "unknown"),
    ];
    rows.iter()
        .enumerate()
        .map(|(i, (name, status, species, gender, origin))| {
            let id = i as u64 + 1;
            CatalogCharacter {
                id,
                name: name.to_string(),
                status: status.to_string(),
                species: species.to_string(),
                gender: gender.to_string(),
                origin: NamedLink {
                    name: origin.to_string(),
                    url: String::new(),
                },
                location: NamedLink {
                    name: "Citadel of Ricks".to_string(),
                    url: String::new(),
                },
                image: format!("https://rickandmortyapi.com/api/character/avatar/{id}.jpeg"),
            }
        })
        .collect()
}
