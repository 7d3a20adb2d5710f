//! Remote resource clients backed by the REST API.
//!
//! Each client mirrors the backend into an ordered in-memory list. On
//! failure the list is left untouched, a display message is stored in
//! `error`, and the operation returns an empty or `None`/`false` sentinel.

mod characters;
mod users;

pub use characters::{CharacterRoutes, CharactersClient};
pub use users::UsersClient;

use tracing::warn;

use crate::error::ApiError;
use crate::types::{Personaje, Usuario};

/// Message stored when a 2xx response lacks the expected payload.
pub const UNEXPECTED_RESPONSE: &str = "unexpected response";

pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Personaje {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Usuario {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Ordered items plus the busy flag and last error.
#[derive(Debug, Clone)]
pub struct ResourceList<T> {
    items: Vec<T>,
    is_loading: bool,
    error: Option<String>,
}

impl<T> Default for ResourceList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            error: None,
        }
    }
}

impl<T: Identified + Clone> ResourceList<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub(crate) fn begin_loading(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    pub(crate) fn end_loading(&mut self) {
        self.is_loading = false;
    }

    pub(crate) fn replace_all(&mut self, items: Vec<T>) -> Vec<T> {
        self.items = items;
        self.items.clone()
    }

    pub(crate) fn append(&mut self, item: T) {
        self.items.push(item);
    }

    /// Replace the entry with the same id; absent ids are ignored.
    pub(crate) fn replace(&mut self, id: &str, item: T) {
        if let Some(slot) = self.items.iter_mut().find(|existing| existing.id() == id) {
            *slot = item;
        }
    }

    pub(crate) fn remove(&mut self, id: &str) {
        self.items.retain(|existing| existing.id() != id);
    }

    pub(crate) fn fail(&mut self, operation: &str, err: &ApiError, fallback: &str) {
        warn!(operation, error = %err, "request failed");
        self.error = Some(err.user_message(fallback));
    }

    pub(crate) fn fail_with(&mut self, operation: &str, message: &str) {
        warn!(operation, message, "request failed");
        self.error = Some(message.to_string());
    }
}
