use tracing::debug;

use super::{ResourceList, UNEXPECTED_RESPONSE};
use crate::context::AppContext;
use crate::http::HttpMethod;
use crate::storage::Storage;
use crate::transport::Transport;
use crate::types::{CreateUsuario, UpdateUsuario, Usuario};

const USERS: &str = "/usuarios";
const REGISTER: &str = "/auth/register";
const REGISTER_ADMIN: &str = "/auth/register/admin";

/// Admin view of the backend's user accounts.
#[derive(Debug, Clone, Default)]
pub struct UsersClient {
    state: ResourceList<Usuario>,
}

impl UsersClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Usuario] {
        self.state.items()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    pub fn clear_error(&mut self) {
        self.state.clear_error();
    }

    pub fn fetch<T: Transport, S: Storage>(&mut self, ctx: &AppContext<T, S>) -> Vec<Usuario> {
        self.state.begin_loading();
        let result = ctx.request(HttpMethod::Get, USERS);
        self.state.end_loading();

        match result {
            Ok(envelope) => {
                let items = self.state.replace_all(envelope.usuarios.unwrap_or_default());
                debug!(count = items.len(), "users loaded");
                items
            }
            Err(e) => {
                self.state.fail("list users", &e, "failed to load users");
                Vec::new()
            }
        }
    }

    pub fn get<T: Transport, S: Storage>(&mut self, ctx: &AppContext<T, S>, id: &str) -> Option<Usuario> {
        match ctx.request(HttpMethod::Get, &format!("{USERS}/{id}")) {
            Ok(envelope) => envelope.usuario.or_else(|| {
                self.state.fail_with("get user", UNEXPECTED_RESPONSE);
                None
            }),
            Err(e) => {
                self.state.fail("get user", &e, "failed to load user");
                None
            }
        }
    }

    /// Register a user. Payloads that set a role or the active flag go to
    /// the admin registration endpoint.
    pub fn create<T: Transport, S: Storage>(
        &mut self,
        ctx: &AppContext<T, S>,
        input: &CreateUsuario,
    ) -> Option<Usuario> {
        let endpoint = if input.uses_admin_fields() { REGISTER_ADMIN } else { REGISTER };
        match ctx.request_with(HttpMethod::Post, endpoint, input) {
            Ok(envelope) => match envelope.usuario {
                Some(created) => {
                    self.state.append(created.clone());
                    Some(created)
                }
                None => {
                    self.state.fail_with("create user", UNEXPECTED_RESPONSE);
                    None
                }
            },
            Err(e) => {
                self.state.fail("create user", &e, "failed to create user");
                None
            }
        }
    }

    pub fn update<T: Transport, S: Storage>(
        &mut self,
        ctx: &AppContext<T, S>,
        id: &str,
        input: &UpdateUsuario,
    ) -> Option<Usuario> {
        match ctx.request_with(HttpMethod::Put, &format!("{USERS}/{id}"), input) {
            Ok(envelope) => match envelope.usuario {
                Some(updated) => {
                    self.state.replace(id, updated.clone());
                    Some(updated)
                }
                None => {
                    self.state.fail_with("update user", UNEXPECTED_RESPONSE);
                    None
                }
            },
            Err(e) => {
                self.state.fail("update user", &e, "failed to update user");
                None
            }
        }
    }

    /// Deactivate a user. The backend soft-deletes and may echo the
    /// deactivated record, which then replaces the entry in place; without
    /// it the entry is dropped from the list.
    pub fn delete<T: Transport, S: Storage>(&mut self, ctx: &AppContext<T, S>, id: &str) -> bool {
        match ctx.request(HttpMethod::Delete, &format!("{USERS}/{id}")) {
            Ok(envelope) => {
                match envelope.usuario {
                    Some(deactivated) => self.state.replace(id, deactivated),
                    None => self.state.remove(id),
                }
                true
            }
            Err(e) => {
                self.state.fail("delete user", &e, "failed to delete user");
                false
            }
        }
    }
}
