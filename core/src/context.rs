//! Process-wide client state, constructed explicitly.
//!
//! # Design
//! `AppContext` owns everything that the web client kept in global reactive
//! state: the configuration, the transport, durable storage, the current
//! session and the character book. It is built once at startup, borrowed by
//! the resource clients, and dropped at shutdown. The session and the book
//! are restored from storage in `new`.
//!
//! There is exactly one [`CharacterBook`] per context. Every consumer reads
//! it through [`AppContext::book`] and edits it through
//! [`AppContext::book_mut`], so local ids are allocated from a single list.

use serde::Serialize;
use tracing::warn;

use crate::catalog;
use crate::characters::CharacterBook;
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpResponse};
use crate::session::Session;
use crate::storage::{ConfiguredStorage, Storage};
use crate::transport::{Transport, UreqTransport};
use crate::types::Envelope;

pub struct AppContext<T, S> {
    pub(crate) config: ClientConfig,
    pub(crate) api: ApiClient,
    pub(crate) transport: T,
    pub(crate) storage: S,
    pub(crate) session: Session,
    pub(crate) book: CharacterBook<S>,
}

impl AppContext<UreqTransport, ConfiguredStorage> {
    /// Build a context with the `ureq` transport and the storage selected by
    /// `config.storage_dir`.
    pub fn from_config(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout());
        let storage = ConfiguredStorage::from_dir(config.storage_dir.as_deref());
        Self::new(config, transport, storage)
    }
}

impl<T: Transport, S: Storage + Clone> AppContext<T, S> {
    pub fn new(config: ClientConfig, transport: T, storage: S) -> Self {
        let api = ApiClient::new(&config.api_base_url);
        let session = Session::load(&storage);
        let book = CharacterBook::load(storage.clone());
        Self {
            config,
            api,
            transport,
            storage,
            session,
            book,
        }
    }
}

impl<T: Transport, S: Storage> AppContext<T, S> {
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The merged character view shared by everything holding this context.
    pub fn book(&self) -> &CharacterBook<S> {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut CharacterBook<S> {
        &mut self.book
    }

    /// Send a request to the backend with the current access token.
    pub fn send<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.api.build(method, endpoint, body, self.session.token())?;
        self.transport.execute(request)
    }

    /// Send a body-less request and parse the standard envelope.
    pub fn request(&self, method: HttpMethod, endpoint: &str) -> Result<Envelope, ApiError> {
        let request = self.api.build_empty(method, endpoint, self.session.token());
        let response = self.transport.execute(request)?;
        self.api.parse(response)
    }

    /// Send `body` and parse the standard envelope.
    pub fn request_with<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: &B,
    ) -> Result<Envelope, ApiError> {
        let response = self.send(method, endpoint, Some(body))?;
        self.api.parse(response)
    }

    /// Fetch the remote catalog per the configured URL and page limit.
    pub fn fetch_catalog(&self) -> Result<Vec<catalog::RemoteCharacter>, ApiError> {
        catalog::fetch_catalog(
            &self.transport,
            &self.config.catalog_url,
            self.config.catalog_max_pages.max(1),
        )
    }

    /// Fetch the catalog into the context's book. On failure the book keeps
    /// its current catalog and `false` is returned.
    pub fn load_catalog(&mut self) -> bool {
        match self.fetch_catalog() {
            Ok(characters) => {
                self.book.set_catalog(characters);
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch character catalog");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characters::{CharacterKey, CharacterPatch};
    use crate::storage::MemoryStorage;
    use crate::transport::testing::ScriptedTransport;

    const CATALOG: &str = r#"{"info":{"count":2,"pages":1,"next":null,"prev":null},"results":[{"id":1,"name":"Rick"},{"id":2,"name":"Morty"}]}"#;

    #[test]
    fn send_uses_configured_origin_and_session_token() {
        let transport = ScriptedTransport::new();
        transport.respond(200, "{}");
        let config = ClientConfig {
            api_base_url: "http://backend:9000/".to_string(),
            ..ClientConfig::default()
        };
        let mut ctx = AppContext::new(config, &transport, MemoryStorage::new());
        ctx.session.token = Some("tok".to_string());

        ctx.request(HttpMethod::Get, "/usuarios").unwrap();
        let req = transport.last_request();
        assert_eq!(req.url, "http://backend:9000/usuarios");
        assert_eq!(req.header("authorization"), Some("Bearer tok"));
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn load_catalog_feeds_the_book() {
        let transport = ScriptedTransport::new();
        transport.respond(200, CATALOG);
        let storage = MemoryStorage::new();
        let mut ctx = AppContext::new(ClientConfig::default(), &transport, storage.clone());

        assert!(ctx.load_catalog());
        ctx.book_mut()
            .update(CharacterKey::RemoteOnly(1), CharacterPatch::named("Rick Sanchez"));

        let names: Vec<_> = ctx.book().view().into_iter().map(|c| c.details.name).collect();
        assert_eq!(names, vec!["Rick Sanchez", "Morty"]);
        assert_eq!(
            transport.last_request().url,
            "https://rickandmortyapi.com/api/character"
        );

        // a restarted context over the same storage sees the override
        let reopened = AppContext::new(ClientConfig::default(), &transport, storage);
        assert_eq!(reopened.book().local_characters().len(), 1);
    }

    #[test]
    fn load_catalog_failure_keeps_book_usable() {
        let transport = ScriptedTransport::new();
        transport.fail("offline");
        let mut ctx = AppContext::new(ClientConfig::default(), &transport, MemoryStorage::new());

        assert!(!ctx.load_catalog());
        ctx.book_mut().create(CharacterPatch::named("Bob"));
        assert_eq!(ctx.book().view().len(), 1);
    }

    fn add_from_sidebar<T: Transport>(ctx: &mut AppContext<T, MemoryStorage>) -> CharacterKey {
        ctx.book_mut().create(CharacterPatch::named("Bob"))
    }

    fn add_from_editor<T: Transport>(ctx: &mut AppContext<T, MemoryStorage>) -> CharacterKey {
        ctx.book_mut().create(CharacterPatch::named("Alice"))
    }

    #[test]
    fn consumers_share_one_book() {
        let transport = ScriptedTransport::new();
        let storage = MemoryStorage::new();
        let mut ctx = AppContext::new(ClientConfig::default(), &transport, storage.clone());

        assert_eq!(add_from_sidebar(&mut ctx), CharacterKey::Local(-1));
        assert_eq!(add_from_editor(&mut ctx), CharacterKey::Local(-2));

        let names: Vec<_> = ctx.book().view().into_iter().map(|c| c.details.name).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);

        let reloaded = CharacterBook::load(storage);
        let persisted: Vec<_> = reloaded.view().into_iter().map(|c| c.key).collect();
        assert_eq!(persisted, vec![CharacterKey::Local(-2), CharacterKey::Local(-1)]);
    }

    #[test]
    fn from_config_without_storage_dir_is_in_memory() {
        let ctx = AppContext::from_config(ClientConfig::default());
        assert!(matches!(ctx.storage(), ConfiguredStorage::Memory(_)));
        assert!(!ctx.session().is_authenticated());
        assert_eq!(ctx.api().base_url(), "http://localhost:3020");
    }
}
