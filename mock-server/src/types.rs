use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Regular,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "rol")]
    pub role: Role,
    pub is_active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "correo")]
    pub email: String,
}

impl From<&Usuario> for OwnerSummary {
    fn from(user: &Usuario) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personaje {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "foto")]
    pub photo: String,
    pub user_id: String,
    #[serde(rename = "usuario", default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerSummary>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonaje {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "foto")]
    pub photo: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePersonaje {
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "foto", default)]
    pub photo: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUsuario {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "contraseña")]
    pub password: String,
    #[serde(rename = "rol", default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUsuario {
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "correo", default)]
    pub email: Option<String>,
    #[serde(rename = "rol", default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "contraseña")]
    pub password: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    #[serde(rename = "usuario")]
    pub user: Usuario,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// Response body shared by the resource endpoints.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personaje: Option<Personaje>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personajes: Option<Vec<Personaje>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario: Option<Usuario>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuarios: Option<Vec<Usuario>>,
}

impl Envelope {
    pub fn message(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn personaje(mut self, personaje: Personaje) -> Self {
        self.personaje = Some(personaje);
        self
    }

    pub fn personajes(personajes: Vec<Personaje>) -> Self {
        Self {
            personajes: Some(personajes),
            ..Self::default()
        }
    }

    pub fn usuario(mut self, usuario: Usuario) -> Self {
        self.usuario = Some(usuario);
        self
    }

    pub fn usuarios(usuarios: Vec<Usuario>) -> Self {
        Self {
            usuarios: Some(usuarios),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NamedLink {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogCharacter {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub species: String,
    pub gender: String,
    pub origin: NamedLink,
    pub location: NamedLink,
    pub image: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogInfo {
    pub count: usize,
    pub pages: usize,
    pub next: Option<String>,
    pub prev: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogPage {
    pub info: CatalogInfo,
    pub results: Vec<CatalogCharacter>,
}
