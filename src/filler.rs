//! Region filling: the `RegionFiller` seam and the in-memory `GridFiller`.

use crate::player::PlayerId;
use crate::types::{BlockPos, Material, Region};
use crate::world::{BlockWorld, GridWorld};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Bulk block mutation seam. Synchronous; callers invoke it from the host's
/// primary thread only.
pub trait RegionFiller: Send + Sync {
    /// Fill `region` with `material`, returning whether anything changed.
    ///
    /// `trigger` is the block interaction that caused the fill and `player`
    /// the actor, both passed through for attribution.
    fn fill(&self, region: &Region, trigger: &BlockPos, material: Material, player: &PlayerId)
        -> bool;
}

// ---------------------------------------------------------------------------
// GridFiller
// ---------------------------------------------------------------------------

/// Filler over a shared [`GridWorld`]. Only replaceable blocks (air,
/// liquids, portal field) are overwritten; anything solid is left alone.
pub struct GridFiller {
    world: Arc<GridWorld>,
}

impl GridFiller {
    pub fn new(world: Arc<GridWorld>) -> Self {
        Self { world }
    }
}

impl RegionFiller for GridFiller {
    fn fill(
        &self,
        region: &Region,
        trigger: &BlockPos,
        material: Material,
        player: &PlayerId,
    ) -> bool {
        let mut changed = 0u64;
        for pos in region.blocks() {
            let Some(current) = self.world.material_at(&pos) else {
                continue;
            };
            if current == material || !current.is_replaceable() {
                continue;
            }
            self.world.set_block(pos, material);
            changed += 1;
        }
        log::debug!(
            "fill {} with {} for {} (trigger {}): {} blocks changed",
            region,
            material,
            player,
            trigger,
            changed
        );
        changed > 0
    }
}
