//! Backend characters: the user's own (`/personajes`) and the admin view of
//! everyone's (`/personajes/admin`).

use tracing::debug;

use super::{ResourceList, UNEXPECTED_RESPONSE};
use crate::context::AppContext;
use crate::http::HttpMethod;
use crate::storage::Storage;
use crate::transport::Transport;
use crate::types::{CreatePersonaje, Personaje, UpdatePersonaje};

/// Endpoint layout for one flavor of the characters API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterRoutes {
    pub list: &'static str,
    /// Prefix for single-item reads; the id is appended.
    pub get_prefix: &'static str,
    pub create: &'static str,
    /// Prefix for update and delete; the id is appended.
    pub item_prefix: &'static str,
}

impl CharacterRoutes {
    pub const MINE: CharacterRoutes = CharacterRoutes {
        list: "/personajes/list",
        get_prefix: "/personajes/only/",
        create: "/personajes",
        item_prefix: "/personajes/",
    };

    pub const ADMIN: CharacterRoutes = CharacterRoutes {
        list: "/personajes/admin",
        get_prefix: "/personajes/admin/",
        create: "/personajes/admin",
        item_prefix: "/personajes/admin/",
    };
}

#[derive(Debug, Clone)]
pub struct CharactersClient {
    routes: CharacterRoutes,
    state: ResourceList<Personaje>,
}

impl CharactersClient {
    /// Characters owned by the logged-in user.
    pub fn mine() -> Self {
        Self::with_routes(CharacterRoutes::MINE)
    }

    /// Every user's characters; requires an admin session.
    pub fn admin() -> Self {
        Self::with_routes(CharacterRoutes::ADMIN)
    }

    pub fn with_routes(routes: CharacterRoutes) -> Self {
        Self {
            routes,
            state: ResourceList::default(),
        }
    }

    pub fn routes(&self) -> CharacterRoutes {
        self.routes
    }

    pub fn items(&self) -> &[Personaje] {
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

    pub fn fetch<T: Transport, S: Storage>(&mut self, ctx: &AppContext<T, S>) -> Vec<Personaje> {
        self.state.begin_loading();
        let result = ctx.request(HttpMethod::Get, self.routes.list);
        self.state.end_loading();

        match result {
            Ok(envelope) => {
                let items = self.state.replace_all(envelope.personajes.unwrap_or_default());
                debug!(count = items.len(), route = self.routes.list, "characters loaded");
                items
            }
            Err(e) => {
                self.state.fail("list characters", &e, "failed to load characters");
                Vec::new()
            }
        }
    }

    pub fn get<T: Transport, S: Storage>(&mut self, ctx: &AppContext<T, S>, id: &str) -> Option<Personaje> {
        let endpoint = format!("{}{id}", self.routes.get_prefix);
        match ctx.request(HttpMethod::Get, &endpoint) {
            Ok(envelope) => envelope.personaje.or_else(|| {
                self.state.fail_with("get character", UNEXPECTED_RESPONSE);
                None
            }),
            Err(e) => {
                self.state.fail("get character", &e, "failed to load character");
                None
            }
        }
    }

    pub fn create<T: Transport, S: Storage>(
        &mut self,
        ctx: &AppContext<T, S>,
        input: &CreatePersonaje,
    ) -> Option<Personaje> {
        match ctx.request_with(HttpMethod::Post, self.routes.create, input) {
            Ok(envelope) => match envelope.personaje {
                Some(created) => {
                    self.state.append(created.clone());
                    Some(created)
                }
                None => {
                    self.state.fail_with("create character", UNEXPECTED_RESPONSE);
                    None
                }
            },
            Err(e) => {
                self.state.fail("create character", &e, "failed to create character");
                None
            }
        }
    }

    pub fn update<T: Transport, S: Storage>(
        &mut self,
        ctx: &AppContext<T, S>,
        id: &str,
        input: &UpdatePersonaje,
    ) -> Option<Personaje> {
        let endpoint = format!("{}{id}", self.routes.item_prefix);
        match ctx.request_with(HttpMethod::Put, &endpoint, input) {
            Ok(envelope) => match envelope.personaje {
                Some(updated) => {
                    self.state.replace(id, updated.clone());
                    Some(updated)
                }
                None => {
                    self.state.fail_with("update character", UNEXPECTED_RESPONSE);
                    None
                }
            },
            Err(e) => {
                self.state.fail("update character", &e, "failed to update character");
                None
            }
        }
    }

    pub fn delete<T: Transport, S: Storage>(&mut self, ctx: &AppContext<T, S>, id: &str) -> bool {
        let endpoint = format!("{}{id}", self.routes.item_prefix);
        match ctx.request(HttpMethod::Delete, &endpoint) {
            Ok(_) => {
                self.state.remove(id);
                true
            }
            Err(e) => {
                self.state.fail("delete character", &e, "failed to delete character");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::storage::MemoryStorage;
    use crate::transport::testing::ScriptedTransport;

    const LIST: &str = r#"{"personajes":[
        {"id":"p1","nombre":"Rick","foto":"rick.png","userId":"u1"},
        {"id":"p2","nombre":"Morty","foto":"morty.png","userId":"u1"}
    ]}"#;

    fn ctx(transport: &ScriptedTransport) -> AppContext<&ScriptedTransport, MemoryStorage> {
        AppContext::new(ClientConfig::default(), transport, MemoryStorage::new())
    }

    fn loaded(transport: &ScriptedTransport, client: &mut CharactersClient) {
        transport.respond(200, LIST);
        client.fetch(&ctx(transport));
    }

    #[test]
    fn fetch_replaces_items() {
        let transport = ScriptedTransport::new();
        let mut client = CharactersClient::mine();
        transport.respond(200, LIST);
        let items = client.fetch(&ctx(&transport));
        assert_eq!(items.len(), 2);
        assert_eq!(client.items()[1].name, "Morty");
        assert!(!client.is_loading());
        assert!(client.error().is_none());
        assert_eq!(transport.last_request().url, "http://localhost:3020/personajes/list");
    }

    #[test]
    fn fetch_without_list_field_is_empty() {
        let transport = ScriptedTransport::new();
        transport.respond(200, r#"{"message":"ok"}"#);
        let mut client = CharactersClient::mine();
        assert!(client.fetch(&ctx(&transport)).is_empty());
        assert!(client.error().is_none());
    }

    #[test]
    fn fetch_failure_keeps_items_and_records_message() {
        let transport = ScriptedTransport::new();
        let mut client = CharactersClient::mine();
        loaded(&transport, &mut client);

        transport.respond(403, r#"{"message":"forbidden"}"#);
        assert!(client.fetch(&ctx(&transport)).is_empty());
        assert_eq!(client.items().len(), 2);
        assert_eq!(client.error(), Some("forbidden"));
        assert!(!client.is_loading());
    }

    #[test]
    fn fetch_clears_previous_error() {
        let transport = ScriptedTransport::new();
        let mut client = CharactersClient::mine();
        transport.fail("offline");
        client.fetch(&ctx(&transport));
        assert_eq!(client.error(), Some("connection error"));

        loaded(&transport, &mut client);
        assert!(client.error().is_none());
    }

    #[test]
    fn get_uses_only_route() {
        let transport = ScriptedTransport::new();
        transport.respond(200, r#"{"personaje":{"id":"p9","nombre":"Bird","foto":"b.png","userId":"u1"}}"#);
        let mut client = CharactersClient::mine();
        let found = client.get(&ctx(&transport), "p9").unwrap();
        assert_eq!(found.name, "Bird");
        assert_eq!(transport.last_request().url, "http://localhost:3020/personajes/only/p9");
        assert!(client.items().is_empty());
    }

    #[test]
    fn get_not_found() {
        let transport = ScriptedTransport::new();
        transport.respond(404, "");
        let mut client = CharactersClient::mine();
        assert!(client.get(&ctx(&transport), "nope").is_none());
        assert_eq!(client.error(), Some("failed to load character"));
    }

    #[test]
    fn create_appends() {
        let transport = ScriptedTransport::new();
        let mut client = CharactersClient::mine();
        loaded(&transport, &mut client);

        transport.respond(201, r#"{"personaje":{"id":"p3","nombre":"Summer","foto":"s.png","userId":"u1"}}"#);
        let input = CreatePersonaje {
            name: "Summer".to_string(),
            photo: "s.png".to_string(),
            user_id: None,
        };
        let created = client.create(&ctx(&transport), &input).unwrap();
        assert_eq!(created.id, "p3");
        assert_eq!(client.items().last().unwrap().id, "p3");

        let req = transport.last_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3020/personajes");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"nombre": "Summer", "foto": "s.png"}));
    }

    #[test]
    fn failed_create_leaves_list_and_sets_backend_error() {
        let transport = ScriptedTransport::new();
        let mut client = CharactersClient::mine();
        loaded(&transport, &mut client);
        let before = client.items().to_vec();

        transport.respond(400, r#"{"error":"duplicate"}"#);
        let input = CreatePersonaje {
            name: "Rick".to_string(),
            photo: "rick.png".to_string(),
            user_id: None,
        };
        assert!(client.create(&ctx(&transport), &input).is_none());
        assert_eq!(client.items(), before.as_slice());
        assert_eq!(client.error(), Some("duplicate"));
    }

    #[test]
    fn create_without_payload_is_unexpected() {
        let transport = ScriptedTransport::new();
        transport.respond(201, r#"{"message":"created"}"#);
        let mut client = CharactersClient::mine();
        let input = CreatePersonaje {
            name: "X".to_string(),
            photo: "x.png".to_string(),
            user_id: None,
        };
        assert!(client.create(&ctx(&transport), &input).is_none());
        assert!(client.items().is_empty());
        assert_eq!(client.error(), Some(UNEXPECTED_RESPONSE));
    }

    #[test]
    fn update_replaces_in_place() {
        let transport = ScriptedTransport::new();
        let mut client = CharactersClient::mine();
        loaded(&transport, &mut client);

        transport.respond(200, r#"{"personaje":{"id":"p1","nombre":"Rick Sanchez","foto":"rick.png","userId":"u1"}}"#);
        let input = UpdatePersonaje {
            name: Some("Rick Sanchez".to_string()),
            photo: None,
        };
        client.update(&ctx(&transport), "p1", &input).unwrap();
        assert_eq!(client.items()[0].name, "Rick Sanchez");
        assert_eq!(client.items().len(), 2);
        assert_eq!(transport.last_request().method, HttpMethod::Put);
        assert_eq!(transport.last_request().url, "http://localhost:3020/personajes/p1");
    }

    #[test]
    fn update_failure_uses_field_error() {
        let transport = ScriptedTransport::new();
        let mut client = CharactersClient::mine();
        loaded(&transport, &mut client);

        transport.respond(422, r#"{"errors":[{"msg":"foto must be a URL"}]}"#);
        let input = UpdatePersonaje {
            name: None,
            photo: Some("bad".to_string()),
        };
        assert!(client.update(&ctx(&transport), "p1", &input).is_none());
        assert_eq!(client.items()[0].name, "Rick");
        assert_eq!(client.error(), Some("foto must be a URL"));
    }

    #[test]
    fn delete_filters_out() {
        let transport = ScriptedTransport::new();
        let mut client = CharactersClient::mine();
        loaded(&transport, &mut client);

        transport.respond(200, r#"{"message":"deleted"}"#);
        assert!(client.delete(&ctx(&transport), "p1"));
        assert_eq!(client.items().len(), 1);
        assert_eq!(client.items()[0].id, "p2");
        assert_eq!(transport.last_request().method, HttpMethod::Delete);
    }

    #[test]
    fn delete_failure_keeps_item() {
        let transport = ScriptedTransport::new();
        let mut client = CharactersClient::mine();
        loaded(&transport, &mut client);

        transport.fail("reset");
        assert!(!client.delete(&ctx(&transport), "p1"));
        assert_eq!(client.items().len(), 2);
        assert_eq!(client.error(), Some("connection error"));
    }

    #[test]
    fn admin_routes() {
        let transport = ScriptedTransport::new();
        let mut client = CharactersClient::admin();
        transport
            .respond(200, r#"{"personajes":[]}"#)
            .respond(200, r#"{"personaje":{"id":"p1","nombre":"R","foto":"f","userId":"u2"}}"#)
            .respond(200, r#"{"message":"deleted"}"#);
        let ctx = ctx(&transport);

        client.fetch(&ctx);
        client.get(&ctx, "p1");
        client.delete(&ctx, "p1");

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://localhost:3020/personajes/admin",
                "http://localhost:3020/personajes/admin/p1",
                "http://localhost:3020/personajes/admin/p1",
            ]
        );
    }

    #[test]
    fn admin_create_sends_owner() {
        let transport = ScriptedTransport::new();
        transport.respond(201, r#"{"personaje":{"id":"p5","nombre":"Jerry","foto":"j.png","userId":"u7"}}"#);
        let mut client = CharactersClient::admin();
        let input = CreatePersonaje {
            name: "Jerry".to_string(),
            photo: "j.png".to_string(),
            user_id: Some("u7".to_string()),
        };
        let created = client.create(&ctx(&transport), &input).unwrap();
        assert_eq!(created.user_id, "u7");
        let body: serde_json::Value =
            serde_json::from_str(transport.last_request().body.as_deref().unwrap()).unwrap();
        assert_eq!(body["userId"], "u7");
    }
}
