//! Core value types shared across all modules.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Grid coordinates
// ---------------------------------------------------------------------------

/// Integer offset inside a single world's block grid.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{},{}]", self.x, self.y, self.z)
    }
}

/// A block coordinate: integer triple plus the world it belongs to.
///
/// Equality is structural; two positions in different worlds never compare
/// equal even with identical grid components.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct BlockPos {
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(world: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    pub fn grid(&self) -> GridPos {
        GridPos::new(self.x, self.y, self.z)
    }

    /// The block one step beyond this one in the direction of `face`: the
    /// point actually targeted when a player clicks against a block face.
    pub fn offset(&self, face: ApproachFace) -> BlockPos {
        let (dx, dy, dz) = face.unit_offset();
        BlockPos {
            world: self.world.clone(),
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// Same grid position, one block up.
    pub fn above(&self) -> BlockPos {
        self.offset(ApproachFace::Up)
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@[{},{},{}]", self.world, self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Approach face
// ---------------------------------------------------------------------------

/// The face of a block a player interacted against.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApproachFace {
    Up,
    Down,
    North,
    South,
    East,
    West,
}

impl ApproachFace {
    pub fn unit_offset(self) -> (i32, i32, i32) {
        match self {
            ApproachFace::Up => (0, 1, 0),
            ApproachFace::Down => (0, -1, 0),
            ApproachFace::North => (0, 0, -1),
            ApproachFace::South => (0, 0, 1),
            ApproachFace::East => (1, 0, 0),
            ApproachFace::West => (-1, 0, 0),
        }
    }
}

// ---------------------------------------------------------------------------
// Materials
// ---------------------------------------------------------------------------

/// The block and item kinds this core distinguishes.
///
/// Anything else in the host world is irrelevant to portal mediation and
/// maps onto `Stone`/`Dirt`-class solids at the boundary.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Air,
    Water,
    Lava,
    /// The active portal interior material.
    PortalField,
    /// Default portal frame material.
    Obsidian,
    Fire,
    Stone,
    Dirt,
    /// Default selection wand.
    WoodenAxe,
    /// The ignition tool that lights or strikes out a portal.
    FlintAndSteel,
    WaterBucket,
    LavaBucket,
}

impl Material {
    /// Materials the world simulation may spontaneously create or destroy
    /// inside a portal frame.
    pub fn is_portal_forming(self) -> bool {
        matches!(self, Material::PortalField)
    }

    pub fn is_liquid(self) -> bool {
        matches!(self, Material::Water | Material::Lava)
    }

    /// Materials a region fill is allowed to overwrite.
    pub fn is_replaceable(self) -> bool {
        matches!(
            self,
            Material::Air | Material::Water | Material::Lava | Material::PortalField
        )
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Material::Air => "air",
            Material::Water => "water",
            Material::Lava => "lava",
            Material::PortalField => "portal_field",
            Material::Obsidian => "obsidian",
            Material::Fire => "fire",
            Material::Stone => "stone",
            Material::Dirt => "dirt",
            Material::WoodenAxe => "wooden_axe",
            Material::FlintAndSteel => "flint_and_steel",
            Material::WaterBucket => "water_bucket",
            Material::LavaBucket => "lava_bucket",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

/// An axis-aligned box of blocks inside a single world.
///
/// `min`/`max` are inclusive corners; construction normalises the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub world: String,
    pub min: GridPos,
    pub max: GridPos,
}

impl Region {
    pub fn new(world: impl Into<String>, a: GridPos, b: GridPos) -> Self {
        Self {
            world: world.into(),
            min: GridPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: GridPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    pub fn contains(&self, pos: &BlockPos) -> bool {
        pos.world == self.world
            && (self.min.x..=self.max.x).contains(&pos.x)
            && (self.min.y..=self.max.y).contains(&pos.y)
            && (self.min.z..=self.max.z).contains(&pos.z)
    }

    pub fn volume(&self) -> u64 {
        let dx = (self.max.x - self.min.x + 1) as u64;
        let dy = (self.max.y - self.min.y + 1) as u64;
        let dz = (self.max.z - self.min.z + 1) as u64;
        dx * dy * dz
    }

    /// Iterate every block position in the region.
    pub fn blocks(&self) -> impl Iterator<Item = BlockPos> + '_ {
        let (min, max) = (self.min, self.max);
        (min.x..=max.x).flat_map(move |x| {
            (min.y..=max.y).flat_map(move |y| {
                (min.z..=max.z).map(move |z| BlockPos::new(self.world.clone(), x, y, z))
            })
        })
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}..{}", self.world, self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// Teleport destination
// ---------------------------------------------------------------------------

/// Where a portal sends its users.
///
/// `check_safety` is the destination's own policy: when false, no safety
/// check ever runs for this destination regardless of what the caller asks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub position: BlockPos,
    pub check_safety: bool,
}

impl Destination {
    pub fn new(position: BlockPos) -> Self {
        Self {
            position,
            check_safety: true,
        }
    }

    pub fn unchecked(position: BlockPos) -> Self {
        Self {
            position,
            check_safety: false,
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.position.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Stats & config
// ---------------------------------------------------------------------------

/// Counters describing what the interaction service has done so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionStats {
    pub events_suppressed: u64,
    pub fills_applied: u64,
    pub selections_recorded: u64,
    pub teleports_dispatched: u64,
    pub accesses_denied: u64,
}

/// Read-only administrative configuration consumed by the interaction
/// service. Loading and persistence belong to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalsConfig {
    /// Item that records wand selections when held in the main hand.
    pub wand_material: Material,
    /// Whether players may drain/fill portal interiors with buckets.
    pub bucket_filling: bool,
    /// Whether portal use requires the portal's permission node.
    pub enforce_portal_access: bool,
    /// When true an external selection-tool integration owns the wand and
    /// this core records no selections.
    pub use_external_selection_tool: bool,
    /// Minimum milliseconds between portal teleports for one player.
    pub teleport_cooldown_ms: u64,
}

impl Default for PortalsConfig {
    fn default() -> Self {
        Self {
            wand_material: Material::WoodenAxe,
            bucket_filling: true,
            enforce_portal_access: true,
            use_external_selection_tool: false,
            teleport_cooldown_ms: 1000,
        }
    }
}
