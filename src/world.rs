//! Block world view: the `BlockWorld` read seam and the in-memory
//! `GridWorld` reference implementation used by tests and the demo.

use crate::types::{BlockPos, Material};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Read-only view of the host's mutable block world.
///
/// `material_at` returns `None` when the world is not loaded or the block is
/// otherwise unavailable; callers treat that as a silent no-op, never an
/// error.
pub trait BlockWorld: Send + Sync {
    fn material_at(&self, pos: &BlockPos) -> Option<Material>;
    fn is_world_loaded(&self, world: &str) -> bool;
}

// ---------------------------------------------------------------------------
// GridWorld
// ---------------------------------------------------------------------------

/// Sparse in-memory block store. Unset blocks in a loaded world read as
/// `Air`; any block in an unloaded world reads as `None`.
pub struct GridWorld {
    blocks: RwLock<HashMap<BlockPos, Material>>,
    loaded_worlds: RwLock<HashSet<String>>,
}

impl GridWorld {
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
            loaded_worlds: RwLock::new(HashSet::new()),
        }
    }

    pub fn load_world(&self, world: impl Into<String>) {
        self.loaded_worlds.write().insert(world.into());
    }

    pub fn unload_world(&self, world: &str) {
        self.loaded_worlds.write().remove(world);
    }

    /// Set a block, returning the previous material at that position.
    pub fn set_block(&self, pos: BlockPos, material: Material) -> Option<Material> {
        if material == Material::Air {
            // Air is the sparse default; drop the entry instead of storing it.
            self.blocks.write().remove(&pos)
        } else {
            self.blocks.write().insert(pos, material)
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.read().len()
    }
}

impl Default for GridWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockWorld for GridWorld {
    fn material_at(&self, pos: &BlockPos) -> Option<Material> {
        if !self.loaded_worlds.read().contains(&pos.world) {
            return None;
        }
        Some(
            self.blocks
                .read()
                .get(pos)
                .copied()
                .unwrap_or(Material::Air),
        )
    }

    fn is_world_loaded(&self, world: &str) -> bool {
        self.loaded_worlds.read().contains(world)
    }
}

impl BlockWorld for Arc<GridWorld> {
    fn material_at(&self, pos: &BlockPos) -> Option<Material> {
        self.as_ref().material_at(pos)
    }

    fn is_world_loaded(&self, world: &str) -> bool {
        self.as_ref().is_world_loaded(world)
    }
}
