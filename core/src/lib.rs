//! Synchronous client core for the personajes backend and the public
//! character catalog.
//!
//! # Overview
//! Requests are built as plain `HttpRequest` values and responses are parsed
//! from plain `HttpResponse` values. The round-trip itself goes through a
//! [`Transport`], so everything above it is deterministic and testable with
//! a scripted transport.
//!
//! # Design
//! - [`AppContext`] holds the configuration, the transport, durable storage,
//!   the session and the character book. It is built once and borrowed by
//!   every operation.
//! - [`CharactersClient`] and [`UsersClient`] mirror backend collections into
//!   ordered lists with a loading flag and a last-error message.
//! - [`CharacterBook`] merges the remote catalog with locally created and
//!   locally edited characters plus deletion tombstones, persisted through
//!   [`Storage`].
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod catalog;
pub mod characters;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod guards;
pub mod http;
pub mod resources;
pub mod session;
pub mod storage;
pub mod transport;
pub mod types;

pub use catalog::{CatalogPage, RemoteCharacter};
pub use characters::{CharacterBook, CharacterDetails, CharacterKey, CharacterPatch, MergedCharacter};
pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use context::AppContext;
pub use error::ApiError;
pub use guards::{require_admin, require_auth, GuardDecision, HOME_ROUTE, LANDING_ROUTE};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use resources::{CharacterRoutes, CharactersClient, UsersClient};
pub use session::Session;
pub use storage::{ConfiguredStorage, FileStorage, MemoryStorage, Storage, StorageError};
pub use transport::{Transport, UreqTransport};
pub use types::{
    CreatePersonaje, CreateUsuario, Envelope, Personaje, Role, UpdatePersonaje, UpdateUsuario, Usuario,
};
