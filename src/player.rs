//! Player identity, permissions, and messaging: the `PlayerDirectory` seam
//! plus an in-memory implementation for tests and the demo.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Opaque player identity assigned by the host.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Host-side identity/permission/chat surface for connected players.
pub trait PlayerDirectory: Send + Sync {
    fn display_name(&self, player: &PlayerId) -> String;
    fn has_permission(&self, player: &PlayerId, node: &str) -> bool;
    fn send_message(&self, player: &PlayerId, text: &str);
}

// ---------------------------------------------------------------------------
// MemoryPlayerDirectory
// ---------------------------------------------------------------------------

/// In-memory directory: explicit permission grants, captured outbox.
pub struct MemoryPlayerDirectory {
    permissions: RwLock<HashSet<(PlayerId, String)>>,
    names: RwLock<HashMap<PlayerId, String>>,
    outbox: RwLock<Vec<(PlayerId, String)>>,
}

impl MemoryPlayerDirectory {
    pub fn new() -> Self {
        Self {
            permissions: RwLock::new(HashSet::new()),
            names: RwLock::new(HashMap::new()),
            outbox: RwLock::new(Vec::new()),
        }
    }

    pub fn grant(&self, player: &PlayerId, node: impl Into<String>) {
        self.permissions.write().insert((player.clone(), node.into()));
    }

    pub fn revoke(&self, player: &PlayerId, node: &str) {
        self.permissions
            .write()
            .remove(&(player.clone(), node.to_string()));
    }

    pub fn set_display_name(&self, player: &PlayerId, name: impl Into<String>) {
        self.names.write().insert(player.clone(), name.into());
    }

    /// Messages sent to `player`, in delivery order.
    pub fn messages_for(&self, player: &PlayerId) -> Vec<String> {
        self.outbox
            .read()
            .iter()
            .filter(|(p, _)| p == player)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Default for MemoryPlayerDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerDirectory for MemoryPlayerDirectory {
    fn display_name(&self, player: &PlayerId) -> String {
        self.names
            .read()
            .get(player)
            .cloned()
            .unwrap_or_else(|| player.as_str().to_string())
    }

    fn has_permission(&self, player: &PlayerId, node: &str) -> bool {
        self.permissions
            .read()
            .contains(&(player.clone(), node.to_string()))
    }

    fn send_message(&self, player: &PlayerId, text: &str) {
        log::debug!("-> {}: {}", player, text);
        self.outbox.write().push((player.clone(), text.to_string()));
    }
}
