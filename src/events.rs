//! Host event shapes delivered to the interaction service.
//!
//! One struct per event kind, all plain data. Every event carries a
//! `cancelled` flag; handlers return immediately when it is already set and
//! communicate their own verdict by setting it.

use crate::player::PlayerId;
use crate::types::{ApproachFace, BlockPos, Material};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Click metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickAction {
    LeftClickBlock,
    RightClickBlock,
    LeftClickAir,
    RightClickAir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    Main,
    Off,
}

// ---------------------------------------------------------------------------
// World events
// ---------------------------------------------------------------------------

/// A block changing material by simulation (fire spread, decay, the portal
/// field forming or collapsing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockChangeEvent {
    pub position: BlockPos,
    /// Material the block is changing to.
    pub changed: Material,
    /// Material the block holds now.
    pub current: Material,
    pub cancelled: bool,
}

impl BlockChangeEvent {
    pub fn new(position: BlockPos, changed: Material, current: Material) -> Self {
        Self {
            position,
            changed,
            current,
            cancelled: false,
        }
    }
}

/// Liquid flowing from one block to another. Either side may be absent when
/// the host delivered incomplete data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEvent {
    pub source: Option<BlockPos>,
    pub destination: Option<BlockPos>,
    pub cancelled: bool,
}

impl FlowEvent {
    pub fn new(source: Option<BlockPos>, destination: Option<BlockPos>) -> Self {
        Self {
            source,
            destination,
            cancelled: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Player events
// ---------------------------------------------------------------------------

/// A player scooping liquid into a bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketFillEvent {
    pub player: PlayerId,
    pub clicked: Option<BlockPos>,
    pub cancelled: bool,
}

impl BucketFillEvent {
    pub fn new(player: PlayerId, clicked: Option<BlockPos>) -> Self {
        Self {
            player,
            clicked,
            cancelled: false,
        }
    }
}

/// A player emptying a bucket against a block face.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketEmptyEvent {
    pub player: PlayerId,
    pub clicked: Option<BlockPos>,
    pub face: ApproachFace,
    /// Which bucket was emptied.
    pub bucket: Material,
    pub cancelled: bool,
}

impl BucketEmptyEvent {
    pub fn new(
        player: PlayerId,
        clicked: Option<BlockPos>,
        face: ApproachFace,
        bucket: Material,
    ) -> Self {
        Self {
            player,
            clicked,
            face,
            bucket,
            cancelled: false,
        }
    }
}

/// A player clicking with (or without) something in hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractEvent {
    pub player: PlayerId,
    pub action: ClickAction,
    pub clicked: Option<BlockPos>,
    pub face: ApproachFace,
    pub held: Option<Material>,
    pub hand: Hand,
    pub cancelled: bool,
}

impl InteractEvent {
    pub fn new(
        player: PlayerId,
        action: ClickAction,
        clicked: Option<BlockPos>,
        face: ApproachFace,
        held: Option<Material>,
        hand: Hand,
    ) -> Self {
        Self {
            player,
            action,
            clicked,
            face,
            held,
            hand,
            cancelled: false,
        }
    }
}

/// A player stepping into a portal field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalEnterEvent {
    pub player: PlayerId,
    pub location: BlockPos,
    pub cancelled: bool,
}

impl PortalEnterEvent {
    pub fn new(player: PlayerId, location: BlockPos) -> Self {
        Self {
            player,
            location,
            cancelled: false,
        }
    }
}

/// A teleport the host has already decided on; observed for position
/// tracking only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeleportEvent {
    pub player: PlayerId,
    pub to: BlockPos,
    pub cancelled: bool,
}

impl TeleportEvent {
    pub fn new(player: PlayerId, to: BlockPos) -> Self {
        Self {
            player,
            to,
            cancelled: false,
        }
    }
}
