//! Warpgate
//!
//! Portal interaction core for a persistent, mutable 3-D block world:
//! event mediation, access gating, and safe asynchronous teleports.
//!
//! ## Architecture
//!
//! ```text
//! InteractionService  (interaction.rs)  ← event state machine
//!   ├── PortalRegistry   (registry.rs)  ← geometry + definitions
//!   ├── RegionFiller     (filler.rs)    ← bulk block mutation
//!   ├── EconomyGate      (economy.rs)   ← permission + payment decision
//!   ├── SessionStore     (session.rs)   ← per-player transient state
//!   └── TeleportOrchestrator (teleport.rs) ← async relocation pipeline
//!         └── Relocator                 ← host teleport primitive
//! ```
//!
//! The host delivers events on its primary thread; handlers are synchronous
//! and total. Only the relocation pipeline suspends, and its completions are
//! applied by a single pump task through the shared `SessionStore`.

pub mod economy;
pub mod events;
pub mod filler;
pub mod interaction;
pub mod player;
pub mod registry;
pub mod session;
pub mod teleport;
pub mod types;
pub mod world;

// Convenience re-exports
pub use economy::{EconomyGate, EconomyLedger, MemoryLedger, PortalUse};
pub use events::{
    BlockChangeEvent, BucketEmptyEvent, BucketFillEvent, ClickAction, FlowEvent, Hand,
    InteractEvent, PortalEnterEvent, TeleportEvent,
};
pub use filler::{GridFiller, RegionFiller};
pub use interaction::InteractionService;
pub use player::{MemoryPlayerDirectory, PlayerDirectory, PlayerId};
pub use registry::{MemoryPortalRegistry, PortalDefinition, PortalRegistry, CREATE_PERMISSION};
pub use session::{PlayerSession, SessionStore};
pub use teleport::{
    GridRelocator, RelocateError, Relocator, TeleportCompletions, TeleportOrchestrator,
    TeleportOutcome,
};
pub use types::{
    ApproachFace, BlockPos, Destination, GridPos, InteractionStats, Material, PortalsConfig,
    Region,
};
pub use world::{BlockWorld, GridWorld};
