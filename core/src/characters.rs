//! Local-first character list merged with the remote catalog.
//!
//! # Design
//! A [`CharacterBook`] keeps three pieces of state:
//!
//! - the remote catalog, fetched once per session and never mutated;
//! - the local list: characters created on this device plus overrides that
//!   shadow catalog entries, most recent first;
//! - the tombstone set: catalog ids the user deleted.
//!
//! [`CharacterBook::view`] combines them: local-only characters first, then
//! the catalog in its own order with overrides substituted and tombstoned
//! ids dropped unless an override exists.
//!
//! Identity is a tagged [`CharacterKey`] rather than a sign convention.
//! Local-only characters still get negative ids (`min - 1`, starting at
//! `-1`) so they sort in creation order and never collide with catalog ids.
//!
//! Every mutation writes the affected list to storage before returning.
//! Write failures are logged and otherwise ignored.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::RemoteCharacter;
use crate::storage::{load_json_items, save_json, Storage};

pub const LOCAL_CHARACTERS_KEY: &str = "localCharacters";
pub const DELETED_CHARACTERS_KEY: &str = "deletedCharacters";

pub const DEFAULT_NAME: &str = "Unnamed";
pub const DEFAULT_IMAGE: &str = "https://via.placeholder.com/200?text=Local+Character";

/// Identity of an entry in the merged view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterKey {
    /// Created on this device; the id is negative.
    Local(i64),
    /// Catalog entry shadowed by a local override.
    RemoteOverride(u64),
    /// Catalog entry shown as served.
    RemoteOnly(u64),
}

impl CharacterKey {
    /// Interpret a raw signed id: negative ids are local, the rest remote.
    pub fn from_view_id(id: i64) -> Self {
        if id < 0 {
            CharacterKey::Local(id)
        } else {
            CharacterKey::RemoteOnly(id.unsigned_abs())
        }
    }

    pub fn view_id(self) -> i64 {
        match self {
            CharacterKey::Local(id) => id,
            CharacterKey::RemoteOverride(id) | CharacterKey::RemoteOnly(id) => {
                i64::try_from(id).unwrap_or(i64::MAX)
            }
        }
    }

    pub fn remote_id(self) -> Option<u64> {
        match self {
            CharacterKey::Local(_) => None,
            CharacterKey::RemoteOverride(id) | CharacterKey::RemoteOnly(id) => Some(id),
        }
    }
}

/// Identity of a persisted local record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LocalKey {
    Local { id: i64 },
    Override {
        #[serde(rename = "remoteId")]
        remote_id: u64,
    },
}

/// Displayable fields shared by local records and view entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDetails {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Default for CharacterDetails {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            description: String::new(),
            image: DEFAULT_IMAGE.to_string(),
            status: None,
            species: None,
            gender: None,
            origin: None,
            location: None,
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

impl From<&RemoteCharacter> for CharacterDetails {
    fn from(remote: &RemoteCharacter) -> Self {
        Self {
            name: remote.name.clone(),
            description: String::new(),
            image: remote.image.clone(),
            status: non_empty(&remote.status),
            species: non_empty(&remote.species),
            gender: non_empty(&remote.gender),
            origin: remote.origin.as_ref().map(|o| o.name.clone()),
            location: remote.location.as_ref().map(|l| l.name.clone()),
        }
    }
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub status: Option<String>,
    pub species: Option<String>,
    pub gender: Option<String>,
    pub origin: Option<String>,
    pub location: Option<String>,
}

impl CharacterPatch {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn apply(&self, details: &mut CharacterDetails) {
        if let Some(name) = &self.name {
            details.name = name.clone();
        }
        if let Some(description) = &self.description {
            details.description = description.clone();
        }
        if let Some(image) = &self.image {
            details.image = image.clone();
        }
        if self.status.is_some() {
            details.status = self.status.clone();
        }
        if self.species.is_some() {
            details.species = self.species.clone();
        }
        if self.gender.is_some() {
            details.gender = self.gender.clone();
        }
        if self.origin.is_some() {
            details.origin = self.origin.clone();
        }
        if self.location.is_some() {
            details.location = self.location.clone();
        }
    }
}

/// A record in the persisted local list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCharacter {
    pub key: LocalKey,
    #[serde(flatten)]
    pub details: CharacterDetails,
}

impl LocalCharacter {
    fn local_id(&self) -> Option<i64> {
        match self.key {
            LocalKey::Local { id } => Some(id),
            LocalKey::Override { .. } => None,
        }
    }

    fn overrides(&self) -> Option<u64> {
        match self.key {
            LocalKey::Override { remote_id } => Some(remote_id),
            LocalKey::Local { .. } => None,
        }
    }
}

/// One entry of the merged view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedCharacter {
    pub key: CharacterKey,
    pub details: CharacterDetails,
}

impl MergedCharacter {
    /// True for anything backed by a local record.
    pub fn is_local(&self) -> bool {
        !matches!(self.key, CharacterKey::RemoteOnly(_))
    }
}

/// Merge engine over the catalog, the local list and the tombstones.
#[derive(Debug)]
pub struct CharacterBook<S> {
    storage: S,
    local: Vec<LocalCharacter>,
    tombstones: BTreeSet<u64>,
    catalog: Vec<RemoteCharacter>,
}

impl<S: Storage> CharacterBook<S> {
    /// Load the local list and tombstones from `storage`. The catalog starts
    /// empty until [`set_catalog`](Self::set_catalog) is called.
    ///
    /// Unreadable records are skipped one by one, as are local-only records
    /// with a non-negative id, which no view key could address.
    pub fn load(storage: S) -> Self {
        let stored: Vec<LocalCharacter> = load_json_items(&storage, LOCAL_CHARACTERS_KEY);
        let tombstones: BTreeSet<u64> = load_json_items(&storage, DELETED_CHARACTERS_KEY)
            .into_iter()
            .collect();

        let mut seen = HashSet::new();
        let local = stored
            .into_iter()
            .filter(|record| match record.key {
                LocalKey::Local { id } if id >= 0 => {
                    warn!(id, "skipping local character with non-negative id");
                    false
                }
                _ => true,
            })
            .filter(|record| seen.insert(record.key))
            .collect();

        Self {
            storage,
            local,
            tombstones,
            catalog: Vec::new(),
        }
    }

    /// Replace the catalog. Duplicate ids keep their first occurrence.
    pub fn set_catalog(&mut self, characters: Vec<RemoteCharacter>) {
        let mut seen = HashSet::new();
        self.catalog = characters
            .into_iter()
            .filter(|c| seen.insert(c.id))
            .collect();
        debug!(characters = self.catalog.len(), "catalog replaced");
    }

    pub fn catalog(&self) -> &[RemoteCharacter] {
        &self.catalog
    }

    pub fn local_characters(&self) -> &[LocalCharacter] {
        &self.local
    }

    pub fn tombstones(&self) -> &BTreeSet<u64> {
        &self.tombstones
    }

    pub fn is_tombstoned(&self, remote_id: u64) -> bool {
        self.tombstones.contains(&remote_id)
    }

    /// The merged, ordered view.
    pub fn view(&self) -> Vec<MergedCharacter> {
        let overrides: HashMap<u64, &LocalCharacter> = self
            .local
            .iter()
            .filter_map(|record| record.overrides().map(|id| (id, record)))
            .collect();

        let local_only = self.local.iter().filter_map(|record| {
            record.local_id().map(|id| MergedCharacter {
                key: CharacterKey::Local(id),
                details: record.details.clone(),
            })
        });

        let remote = self.catalog.iter().filter_map(|remote| {
            if let Some(record) = overrides.get(&remote.id) {
                return Some(MergedCharacter {
                    key: CharacterKey::RemoteOverride(remote.id),
                    details: record.details.clone(),
                });
            }
            if self.tombstones.contains(&remote.id) {
                return None;
            }
            Some(MergedCharacter {
                key: CharacterKey::RemoteOnly(remote.id),
                details: CharacterDetails::from(remote),
            })
        });

        local_only.chain(remote).collect()
    }

    /// Look up one view entry by key. Remote keys match either variant.
    pub fn get(&self, key: CharacterKey) -> Option<MergedCharacter> {
        self.view().into_iter().find(|entry| match (key, entry.key) {
            (CharacterKey::Local(a), CharacterKey::Local(b)) => a == b,
            _ => key.remote_id().is_some() && key.remote_id() == entry.key.remote_id(),
        })
    }

    /// Next synthetic id: one below the smallest local-only id, or `-1`.
    ///
    /// Once `i64::MIN` is taken, the highest free negative id is used.
    pub fn next_local_id(&self) -> i64 {
        let smallest = self
            .local
            .iter()
            .filter_map(LocalCharacter::local_id)
            .fold(0, i64::min);
        if let Some(id) = smallest.checked_sub(1) {
            return id;
        }

        let used: HashSet<i64> = self.local.iter().filter_map(LocalCharacter::local_id).collect();
        let id = (1..=i64::MAX)
            .map(|n| -n)
            .find(|id| !used.contains(id))
            .unwrap_or(i64::MIN);
        warn!(id, "local ids exhausted below; reusing a free slot");
        id
    }

    /// Create a local-only character at the front of the view.
    pub fn create(&mut self, patch: CharacterPatch) -> CharacterKey {
        let id = self.next_local_id();
        let mut details = CharacterDetails::default();
        patch.apply(&mut details);

        self.local.insert(
            0,
            LocalCharacter {
                key: LocalKey::Local { id },
                details,
            },
        );
        self.persist_local();
        debug!(id, "local character created");
        CharacterKey::Local(id)
    }

    /// Apply `patch` to the character identified by `key`.
    ///
    /// Local keys update the matching record, or do nothing if there is
    /// none. Remote keys update the existing override, or copy the catalog
    /// entry into a new override first.
    pub fn update(&mut self, key: CharacterKey, patch: CharacterPatch) -> bool {
        match key {
            CharacterKey::Local(id) => {
                let Some(record) = self.local.iter_mut().find(|r| r.local_id() == Some(id)) else {
                    debug!(id, "update of unknown local character ignored");
                    return false;
                };
                patch.apply(&mut record.details);
            }
            CharacterKey::RemoteOverride(remote_id) | CharacterKey::RemoteOnly(remote_id) => {
                if let Some(record) = self
                    .local
                    .iter_mut()
                    .find(|r| r.overrides() == Some(remote_id))
                {
                    patch.apply(&mut record.details);
                } else {
                    let mut details = self
                        .catalog
                        .iter()
                        .find(|c| c.id == remote_id)
                        .map(CharacterDetails::from)
                        .unwrap_or_default();
                    patch.apply(&mut details);
                    self.local.insert(
                        0,
                        LocalCharacter {
                            key: LocalKey::Override { remote_id },
                            details,
                        },
                    );
                    debug!(remote_id, "override created");
                }
            }
        }
        self.persist_local();
        true
    }

    /// Remove a character from the view.
    ///
    /// Local-only records are deleted. Remote ids are tombstoned and any
    /// override for them is dropped; the catalog itself is untouched.
    pub fn delete(&mut self, key: CharacterKey) -> bool {
        match key {
            CharacterKey::Local(id) => {
                let before = self.local.len();
                self.local.retain(|r| r.local_id() != Some(id));
                if self.local.len() == before {
                    return false;
                }
                self.persist_local();
                true
            }
            CharacterKey::RemoteOverride(remote_id) | CharacterKey::RemoteOnly(remote_id) => {
                let before = self.local.len();
                self.local.retain(|r| r.overrides() != Some(remote_id));
                if self.local.len() != before {
                    self.persist_local();
                }
                self.tombstones.insert(remote_id);
                self.persist_tombstones();
                debug!(remote_id, "catalog character tombstoned");
                true
            }
        }
    }

    /// Un-hide a tombstoned catalog id.
    pub fn restore(&mut self, remote_id: u64) -> bool {
        if !self.tombstones.remove(&remote_id) {
            return false;
        }
        self.persist_tombstones();
        true
    }

    fn persist_local(&self) {
        if let Err(e) = save_json(&self.storage, LOCAL_CHARACTERS_KEY, &self.local) {
            warn!(error = %e, "failed to persist local characters");
        }
    }

    fn persist_tombstones(&self) {
        if let Err(e) = save_json(&self.storage, DELETED_CHARACTERS_KEY, &self.tombstones) {
            warn!(error = %e, "failed to persist deleted characters");
        }
    }
}
