//! Wire DTOs for the backend REST API.
//!
//! # Design
//! Field names are English in Rust and renamed to the backend's Spanish
//! JSON keys with serde. Update payloads skip absent fields so a partial
//! update only touches what the caller set. The mock-server crate defines
//! its own copies of these shapes; the integration tests catch drift.

use serde::{Deserialize, Serialize};

/// A character owned by a backend user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Personaje {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "foto")]
    pub photo: String,
    pub user_id: String,
    /// Owner summary; only present in admin listings.
    #[serde(rename = "usuario", default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnerSummary {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "correo")]
    pub email: String,
}

/// Payload for creating a character. `user_id` is honored only on the
/// admin endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonaje {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "foto")]
    pub photo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePersonaje {
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "foto", default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Regular,
}

/// A backend user account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "rol")]
    pub role: Role,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Payload for registering a user. Setting `role` or `is_active` routes the
/// request to the admin registration endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUsuario {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "contraseña")]
    pub password: String,
    #[serde(rename = "rol", default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl CreateUsuario {
    pub fn uses_admin_fields(&self) -> bool {
        self.role.is_some() || self.is_active.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUsuario {
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "correo", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "rol", default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "contraseña")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    #[serde(rename = "usuario")]
    pub user: Usuario,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Common response envelope. Each endpoint fills the field it is about and
/// optionally `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub personaje: Option<Personaje>,
    #[serde(default)]
    pub personajes: Option<Vec<Personaje>>,
    #[serde(default)]
    pub usuario: Option<Usuario>,
    #[serde(default)]
    pub usuarios: Option<Vec<Usuario>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personaje_uses_backend_field_names() {
        let json = r#"{"id":"p1","nombre":"Rick","foto":"rick.png","userId":"u1","createdAt":"2024-01-01"}"#;
        let p: Personaje = serde_json::from_str(json).unwrap();
        assert_eq!(p.name, "Rick");
        assert_eq!(p.photo, "rick.png");
        assert_eq!(p.user_id, "u1");
        assert!(p.owner.is_none());
        assert_eq!(p.created_at.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn admin_listing_carries_owner() {
        let json = r#"{"id":"p1","nombre":"Rick","foto":"f","userId":"u1","usuario":{"id":"u1","nombre":"Ana","correo":"ana@x.io"}}"#;
        let p: Personaje = serde_json::from_str(json).unwrap();
        assert_eq!(p.owner.unwrap().email, "ana@x.io");
    }

    #[test]
    fn update_payload_skips_absent_fields() {
        let body = serde_json::to_value(UpdatePersonaje {
            name: Some("Morty".to_string()),
            photo: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"nombre": "Morty"}));
    }

    #[test]
    fn role_is_uppercase_on_the_wire() {
        let u: Usuario = serde_json::from_str(
            r#"{"id":"u1","nombre":"Ana","correo":"a@x.io","rol":"ADMIN","isActive":true}"#,
        )
        .unwrap();
        assert_eq!(u.role, Role::Admin);
        assert!(u.is_active);
        assert_eq!(serde_json::to_value(Role::Regular).unwrap(), "REGULAR");
    }

    #[test]
    fn create_usuario_admin_fields() {
        let mut input = CreateUsuario {
            name: "Ana".to_string(),
            email: "a@x.io".to_string(),
            password: "secret".to_string(),
            role: None,
            is_active: None,
        };
        assert!(!input.uses_admin_fields());
        let body = serde_json::to_value(&input).unwrap();
        assert_eq!(body["contraseña"], "secret");
        assert!(body.get("rol").is_none());

        input.is_active = Some(false);
        assert!(input.uses_admin_fields());
    }

    #[test]
    fn login_response_shape() {
        let json = r#"{"token":"t","refreshToken":"r","usuario":{"id":"u1","nombre":"Ana","correo":"a@x.io","rol":"REGULAR","isActive":true}}"#;
        let r: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(r.refresh_token, "r");
        assert_eq!(r.user.role, Role::Regular);
    }

    #[test]
    fn envelope_tolerates_missing_fields() {
        let e: Envelope = serde_json::from_str(r#"{"message":"ok"}"#).unwrap();
        assert_eq!(e.message.as_deref(), Some("ok"));
        assert!(e.personaje.is_none());
        assert!(e.usuarios.is_none());
    }
}
