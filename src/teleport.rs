//! Asynchronous safe teleports: the `Relocator` primitive seam, the
//! orchestrator that dispatches relocations, and the completion pump that
//! applies their outcomes to sessions.
//!
//! Dispatch and completion are decoupled on purpose. `relocate` returns
//! immediately; the eventual result arrives as a message on the completion
//! channel and is applied by a single pump task. Nothing is cancellable
//! after dispatch.

use crate::player::{PlayerDirectory, PlayerId};
use crate::session::SessionStore;
use crate::types::{BlockPos, Destination, Material};
use crate::world::{BlockWorld, GridWorld};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a relocation did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelocateError {
    #[error("destination {0} is obstructed")]
    Obstructed(BlockPos),
    #[error("world {0} is not loaded")]
    WorldUnloaded(String),
    #[error("relocation aborted by the host")]
    Aborted,
}

// ---------------------------------------------------------------------------
// Relocator seam
// ---------------------------------------------------------------------------

/// The host's asynchronous teleport primitive.
///
/// The returned handle resolves once the host has moved the player or given
/// up. Dropping the sender side counts as [`RelocateError::Aborted`].
pub trait Relocator: Send + Sync {
    fn begin_relocate(
        &self,
        player: &PlayerId,
        destination: &Destination,
        check_safety: bool,
    ) -> oneshot::Receiver<Result<(), RelocateError>>;
}

// ---------------------------------------------------------------------------
// Outcomes and orchestrator
// ---------------------------------------------------------------------------

/// One finished relocation, delivered on the completion channel.
#[derive(Debug)]
pub struct TeleportOutcome {
    pub player: PlayerId,
    pub destination: Destination,
    pub result: Result<(), RelocateError>,
}

/// Dispatches relocations and forwards their results as completion
/// messages.
pub struct TeleportOrchestrator {
    relocator: Arc<dyn Relocator>,
    completions: mpsc::UnboundedSender<TeleportOutcome>,
}

impl TeleportOrchestrator {
    /// Build an orchestrator plus the receiver half its completions land on.
    pub fn new(relocator: Arc<dyn Relocator>) -> (Self, TeleportCompletions) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                relocator,
                completions: tx,
            },
            TeleportCompletions { rx },
        )
    }

    /// Begin relocating `player` to `destination`.
    ///
    /// The safety check actually requested from the primitive is the AND of
    /// the caller's wish and the destination's own policy; a destination
    /// that opts out is never checked.
    pub fn relocate(&self, player: &PlayerId, destination: &Destination, check_safety: bool) {
        let effective = check_safety && destination.check_safety;
        let handle = self
            .relocator
            .begin_relocate(player, destination, effective);

        let player = player.clone();
        let destination = destination.clone();
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = match handle.await {
                Ok(result) => result,
                Err(_) => Err(RelocateError::Aborted),
            };
            // Receiver gone means the whole pipeline is shutting down.
            let _ = completions.send(TeleportOutcome {
                player,
                destination,
                result,
            });
        });
    }
}

// ---------------------------------------------------------------------------
// Completion pump
// ---------------------------------------------------------------------------

/// Receiver half of the completion channel. Exactly one consumer runs.
pub struct TeleportCompletions {
    rx: mpsc::UnboundedReceiver<TeleportOutcome>,
}

impl TeleportCompletions {
    /// Next outcome, or `None` once every orchestrator clone is gone.
    pub async fn next(&mut self) -> Option<TeleportOutcome> {
        self.rx.recv().await
    }

    /// Drain outcomes forever, applying each to the session store.
    ///
    /// A successful relocation stamps the player's session with the arrival
    /// position and the cooldown clock. A failed one is logged and dropped;
    /// there is no retry and no refund. A missing session (the player
    /// disconnected mid-flight) is a no-op, never a fault.
    pub async fn run(mut self, sessions: Arc<SessionStore>, players: Arc<dyn PlayerDirectory>) {
        while let Some(outcome) = self.next().await {
            apply_outcome(&outcome, &sessions, players.as_ref());
        }
    }
}

/// Apply one completed relocation to the session store.
pub fn apply_outcome(
    outcome: &TeleportOutcome,
    sessions: &SessionStore,
    players: &dyn PlayerDirectory,
) {
    let name = players.display_name(&outcome.player);
    match &outcome.result {
        Ok(()) => {
            sessions.with_existing(&outcome.player, |session| {
                session.record_teleport(outcome.destination.position.clone());
            });
            log::info!("teleported {} to {}", name, outcome.destination);
        }
        Err(reason) => {
            log::info!(
                "teleport of {} to {} failed: {}",
                name,
                outcome.destination,
                reason
            );
        }
    }
}

// ---------------------------------------------------------------------------
// GridRelocator
// ---------------------------------------------------------------------------

/// Relocator over a shared [`GridWorld`], for tests and the demo.
///
/// When the safety check is in effect the destination block and the block
/// above it must both be air, and the destination world loaded.
pub struct GridRelocator {
    world: Arc<GridWorld>,
}

impl GridRelocator {
    pub fn new(world: Arc<GridWorld>) -> Self {
        Self { world }
    }

    fn check(&self, destination: &Destination, check_safety: bool) -> Result<(), RelocateError> {
        let pos = &destination.position;
        if !self.world.is_world_loaded(&pos.world) {
            return Err(RelocateError::WorldUnloaded(pos.world.clone()));
        }
        if check_safety {
            let feet = self.world.material_at(pos);
            let head = self.world.material_at(&pos.above());
            if feet != Some(Material::Air) || head != Some(Material::Air) {
                return Err(RelocateError::Obstructed(pos.clone()));
            }
        }
        Ok(())
    }
}

impl Relocator for GridRelocator {
    fn begin_relocate(
        &self,
        _player: &PlayerId,
        destination: &Destination,
        check_safety: bool,
    ) -> oneshot::Receiver<Result<(), RelocateError>> {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(self.check(destination, check_safety));
        rx
    }
}
