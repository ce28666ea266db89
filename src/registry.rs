//! Portal definitions and the `PortalRegistry` lookup seam.
//!
//! Definitions are read from the registry per lookup and never cached across
//! events; a portal edited between two clicks is seen fresh on the second.

use crate::player::PlayerId;
use crate::types::{BlockPos, Destination, Material, Region};
use crate::world::BlockWorld;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Permission node required to create portals and record wand selections.
pub const CREATE_PERMISSION: &str = "portal.create";

// ---------------------------------------------------------------------------
// PortalDefinition
// ---------------------------------------------------------------------------

/// One named portal: its interior region, frame geometry, pricing, and
/// destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalDefinition {
    pub name: String,
    pub world: String,
    pub region: Region,
    /// Every block position making up the portal's frame.
    pub frame: HashSet<BlockPos>,
    pub frame_material: Material,
    /// Entry fee; zero means free.
    pub price: f64,
    pub currency: String,
    pub destination: Option<Destination>,
    /// Whether teleports out of this portal request a safety check.
    pub safe_teleport: bool,
}

impl PortalDefinition {
    pub fn new(name: impl Into<String>, region: Region) -> Self {
        let world = region.world.clone();
        Self {
            name: name.into(),
            world,
            region,
            frame: HashSet::new(),
            frame_material: Material::Obsidian,
            price: 0.0,
            currency: String::new(),
            destination: None,
            safe_teleport: true,
        }
    }

    /// Node a player must hold to use this portal when access enforcement
    /// is on.
    pub fn access_node(&self) -> String {
        format!("portal.access.{}", self.name)
    }

    /// Node exempting its holder from this portal's entry fee.
    pub fn exempt_node(&self) -> String {
        format!("portal.exempt.{}", self.name)
    }

    /// Node allowing its holder to fill this portal's interior.
    pub fn fill_node(&self) -> String {
        format!("portal.fill.{}", self.name)
    }

    /// True when every frame block currently holds the frame material.
    ///
    /// An empty frame set is invalid: a portal with no frame cannot be lit.
    /// Any unreadable frame block (unloaded world) is invalid too.
    pub fn is_frame_valid(&self, world: &dyn BlockWorld) -> bool {
        if self.frame.is_empty() {
            return false;
        }
        self.frame
            .iter()
            .all(|pos| world.material_at(pos) == Some(self.frame_material))
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Lookup seam over whatever stores portal definitions.
///
/// `resolve_portal` is permission-aware: it may return `None` for a player
/// even though `is_portal` is true for the same location.
pub trait PortalRegistry: Send + Sync {
    /// Pure geometry: is this block inside any portal's interior?
    fn is_portal(&self, pos: &BlockPos) -> bool;

    /// The portal at `pos` as visible to `player`, or `None`.
    fn resolve_portal(&self, player: &PlayerId, pos: &BlockPos) -> Option<PortalDefinition>;
}

// ---------------------------------------------------------------------------
// MemoryPortalRegistry
// ---------------------------------------------------------------------------

/// In-memory registry keyed by portal name.
pub struct MemoryPortalRegistry {
    portals: RwLock<HashMap<String, PortalDefinition>>,
    /// Players for whom a named portal does not resolve.
    concealed: RwLock<HashSet<(String, PlayerId)>>,
}

impl MemoryPortalRegistry {
    pub fn new() -> Self {
        Self {
            portals: RwLock::new(HashMap::new()),
            concealed: RwLock::new(HashSet::new()),
        }
    }

    pub fn insert(&self, portal: PortalDefinition) {
        self.portals.write().insert(portal.name.clone(), portal);
    }

    pub fn remove(&self, name: &str) -> Option<PortalDefinition> {
        self.portals.write().remove(name)
    }

    /// Make `name` stop resolving for `player` while keeping its geometry.
    pub fn conceal(&self, name: impl Into<String>, player: &PlayerId) {
        self.concealed.write().insert((name.into(), player.clone()));
    }

    pub fn portal_count(&self) -> usize {
        self.portals.read().len()
    }
}

impl Default for MemoryPortalRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PortalRegistry for MemoryPortalRegistry {
    fn is_portal(&self, pos: &BlockPos) -> bool {
        self.portals
            .read()
            .values()
            .any(|p| p.region.contains(pos))
    }

    fn resolve_portal(&self, player: &PlayerId, pos: &BlockPos) -> Option<PortalDefinition> {
        let portals = self.portals.read();
        let portal = portals.values().find(|p| p.region.contains(pos))?;
        if self
            .concealed
            .read()
            .contains(&(portal.name.clone(), player.clone()))
        {
            return None;
        }
        Some(portal.clone())
    }
}
