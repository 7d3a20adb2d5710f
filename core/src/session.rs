//! Authenticated session: current user, access token and refresh token.
//!
//! # Design
//! [`Session`] is plain state with pure role checks, which is what the route
//! guards read. The operations that talk to the backend (`login`,
//! `refresh`) and the ones that touch storage (`logout`) are methods on
//! [`AppContext`], which owns the transport and storage they need.
//!
//! Storage mirrors the three cookies the web client uses: `token`,
//! `refreshToken` and `user`.

use tracing::{debug, warn};

use crate::context::AppContext;
use crate::error::ApiError;
use crate::guards::LANDING_ROUTE;
use crate::http::HttpMethod;
use crate::storage::{load_json_or_default, save_json, Storage, StorageError};
use crate::transport::Transport;
use crate::types::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, Role, Usuario};

pub const TOKEN_KEY: &str = "token";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_KEY: &str = "user";

const LOGIN_FAILED: &str = "invalid credentials";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<Usuario>,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Session {
    /// Restore the session persisted in `storage`.
    ///
    /// A user is restored only when both the token and the user record are
    /// present; a lone token or user is treated as no session.
    pub fn load(storage: &impl Storage) -> Self {
        let token: Option<String> = load_json_or_default(storage, TOKEN_KEY);
        let user: Option<Usuario> = load_json_or_default(storage, USER_KEY);
        let refresh_token: Option<String> = load_json_or_default(storage, REFRESH_TOKEN_KEY);

        match (token, user) {
            (Some(token), Some(user)) if !token.is_empty() => Self {
                user: Some(user),
                token: Some(token),
                refresh_token,
            },
            _ => Self::default(),
        }
    }

    fn persist(&self, storage: &impl Storage) -> Result<(), StorageError> {
        save_json(storage, TOKEN_KEY, &self.token)?;
        save_json(storage, REFRESH_TOKEN_KEY, &self.refresh_token)?;
        save_json(storage, USER_KEY, &self.user)
    }

    fn erase(storage: &impl Storage) -> Result<(), StorageError> {
        storage.remove(TOKEN_KEY)?;
        storage.remove(REFRESH_TOKEN_KEY)?;
        storage.remove(USER_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == Role::Admin)
    }

    pub fn is_active(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_active)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl<T: Transport, S: Storage> AppContext<T, S> {
    /// Log in and persist the new session.
    ///
    /// Returns the user on success, or the message to show on failure.
    pub fn login(&mut self, email: &str, password: &str) -> Result<Usuario, String> {
        let input = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = self
            .send(HttpMethod::Post, "/auth/login", Some(&input))
            .and_then(|response| self.api.parse::<LoginResponse>(response));

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "login failed");
                return Err(e.user_message(LOGIN_FAILED));
            }
        };

        self.session = Session {
            user: Some(response.user.clone()),
            token: Some(response.token),
            refresh_token: Some(response.refresh_token),
        };
        if let Err(e) = self.session.persist(&self.storage) {
            warn!(error = %e, "failed to persist session");
        }
        debug!(user = %response.user.id, "logged in");
        Ok(response.user)
    }

    /// Clear the session in memory and in storage. Returns the route to
    /// navigate to.
    pub fn logout(&mut self) -> &'static str {
        self.session = Session::default();
        if let Err(e) = Session::erase(&self.storage) {
            warn!(error = %e, "failed to clear persisted session");
        }
        LANDING_ROUTE
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Never called automatically; a 401 elsewhere does not trigger it.
    pub fn refresh(&mut self) -> bool {
        let Some(refresh_token) = self.session.refresh_token.clone() else {
            return false;
        };
        let input = RefreshRequest { refresh_token };

        let result = self
            .api
            .build(HttpMethod::Post, "/auth/refresh", Some(&input), None)
            .and_then(|request| self.transport.execute(request))
            .and_then(|response| self.api.parse::<RefreshResponse>(response));

        match result {
            Ok(RefreshResponse { token: Some(token) }) if !token.is_empty() => {
                self.session.token = Some(token);
                if let Err(e) = save_json(&self.storage, TOKEN_KEY, &self.session.token) {
                    warn!(error = %e, "failed to persist refreshed token");
                }
                true
            }
            Ok(_) => {
                warn!(error = %ApiError::EmptyResponse, "refresh returned no token");
                false
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed");
                false
            }
        }
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::guards::{require_admin, GuardDecision, HOME_ROUTE};
    use crate::storage::MemoryStorage;
    use crate::transport::testing::ScriptedTransport;

    const LOGIN_OK: &str = r#"{"token":"tok-1","refreshToken":"ref-1","usuario":{"id":"u1","nombre":"Ana","correo":"ana@x.io","rol":"ADMIN","isActive":true}}"#;

    fn context(transport: &ScriptedTransport, storage: MemoryStorage) -> AppContext<&ScriptedTransport, MemoryStorage> {
        AppContext::new(ClientConfig::default(), transport, storage)
    }

    #[test]
    fn login_populates_state_and_storage() {
        let transport = ScriptedTransport::new();
        transport.respond(200, LOGIN_OK);
        let storage = MemoryStorage::new();
        let mut ctx = context(&transport, storage.clone());

        let user = ctx.login("ana@x.io", "pw").unwrap();
        assert_eq!(user.id, "u1");
        assert!(ctx.is_admin());
        assert!(ctx.session().is_active());
        assert_eq!(ctx.session().token(), Some("tok-1"));

        let req = transport.last_request();
        assert_eq!(req.url, "http://localhost:3020/auth/login");
        assert!(req.header("authorization").is_none());

        let restored = Session::load(&storage);
        assert_eq!(&restored, ctx.session());
    }

    #[test]
    fn login_failure_returns_backend_message() {
        let transport = ScriptedTransport::new();
        transport.respond(401, r#"{"error":"wrong password"}"#);
        let storage = MemoryStorage::new();
        let mut ctx = context(&transport, storage.clone());

        assert_eq!(ctx.login("ana@x.io", "bad").unwrap_err(), "wrong password");
        assert!(!ctx.session().is_authenticated());
        assert!(!storage.contains(TOKEN_KEY));
    }

    #[test]
    fn login_connection_failure() {
        let transport = ScriptedTransport::new();
        transport.fail("refused");
        let mut ctx = context(&transport, MemoryStorage::new());
        assert_eq!(ctx.login("a", "b").unwrap_err(), "connection error");
    }

    #[test]
    fn logout_clears_everything_and_admin_guard_redirects() {
        let transport = ScriptedTransport::new();
        transport.respond(200, LOGIN_OK);
        let storage = MemoryStorage::new();
        let mut ctx = context(&transport, storage.clone());
        ctx.login("ana@x.io", "pw").unwrap();
        assert_eq!(require_admin(ctx.session()), GuardDecision::Proceed);

        assert_eq!(ctx.logout(), LANDING_ROUTE);
        assert_eq!(ctx.session(), &Session::default());
        assert!(!storage.contains(TOKEN_KEY));
        assert!(!storage.contains(REFRESH_TOKEN_KEY));
        assert!(!storage.contains(USER_KEY));
        assert_eq!(
            require_admin(ctx.session()),
            GuardDecision::Redirect(HOME_ROUTE)
        );
    }

    #[test]
    fn load_requires_token_and_user() {
        let storage = MemoryStorage::new();
        save_json(&storage, TOKEN_KEY, &Some("tok")).unwrap();
        assert!(!Session::load(&storage).is_authenticated());
    }

    #[test]
    fn context_restores_persisted_session() {
        let transport = ScriptedTransport::new();
        transport.respond(200, LOGIN_OK);
        let storage = MemoryStorage::new();
        context(&transport, storage.clone()).login("ana@x.io", "pw").unwrap();

        let ctx = context(&transport, storage);
        assert!(ctx.session().is_authenticated());
        assert_eq!(ctx.session().refresh_token.as_deref(), Some("ref-1"));
    }

    #[test]
    fn refresh_replaces_token() {
        let transport = ScriptedTransport::new();
        transport.respond(200, LOGIN_OK).respond(200, r#"{"token":"tok-2"}"#);
        let storage = MemoryStorage::new();
        let mut ctx = context(&transport, storage.clone());
        ctx.login("ana@x.io", "pw").unwrap();

        assert!(ctx.refresh());
        assert_eq!(ctx.session().token(), Some("tok-2"));
        assert_eq!(Session::load(&storage).token(), Some("tok-2"));

        let req = transport.last_request();
        assert_eq!(req.url, "http://localhost:3020/auth/refresh");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["refreshToken"], "ref-1");
    }

    #[test]
    fn refresh_without_token_or_on_error_fails() {
        let transport = ScriptedTransport::new();
        let mut ctx = context(&transport, MemoryStorage::new());
        assert!(!ctx.refresh());
        assert!(transport.requests().is_empty());

        transport.respond(200, LOGIN_OK).respond(401, r#"{"error":"expired"}"#);
        ctx.login("ana@x.io", "pw").unwrap();
        assert!(!ctx.refresh());
        assert_eq!(ctx.session().token(), Some("tok-1"));
    }

    #[test]
    fn refresh_response_without_token_fails() {
        let transport = ScriptedTransport::new();
        transport.respond(200, LOGIN_OK).respond(200, r#"{}"#);
        let mut ctx = context(&transport, MemoryStorage::new());
        ctx.login("ana@x.io", "pw").unwrap();
        assert!(!ctx.refresh());
    }
}
