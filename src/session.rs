//! Per-player session state and the injected `SessionStore`.
//!
//! The store is an explicit collaborator handed to whoever needs it; there
//! is no ambient global. Sessions are created lazily on first touch and
//! destroyed on disconnect.

use crate::player::PlayerId;
use crate::types::BlockPos;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// PlayerSession
// ---------------------------------------------------------------------------

/// Everything the core remembers about one connected player.
#[derive(Debug, Default)]
pub struct PlayerSession {
    left_selection: Option<BlockPos>,
    right_selection: Option<BlockPos>,
    debug: bool,
    last_teleport: Option<Instant>,
    tracked_position: Option<BlockPos>,
}

impl PlayerSession {
    /// Record a left-click selection. `world` is the loaded world handle the
    /// click happened in; when the host could not supply one the selection
    /// is rejected and `false` comes back.
    pub fn set_left_selection(&mut self, pos: BlockPos, world: Option<&str>) -> bool {
        if world.is_none() {
            return false;
        }
        self.left_selection = Some(pos);
        true
    }

    /// Record a right-click selection. Same world-handle rule as the left.
    pub fn set_right_selection(&mut self, pos: BlockPos, world: Option<&str>) -> bool {
        if world.is_none() {
            return false;
        }
        self.right_selection = Some(pos);
        true
    }

    pub fn left_selection(&self) -> Option<&BlockPos> {
        self.left_selection.as_ref()
    }

    pub fn right_selection(&self) -> Option<&BlockPos> {
        self.right_selection.as_ref()
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// True while the last teleport is younger than `window`.
    pub fn on_cooldown(&self, window: Duration) -> bool {
        match self.last_teleport {
            Some(at) => at.elapsed() < window,
            None => false,
        }
    }

    /// Stamp a completed teleport: arrival position plus the cooldown clock.
    pub fn record_teleport(&mut self, arrived_at: BlockPos) {
        self.last_teleport = Some(Instant::now());
        self.tracked_position = Some(arrived_at);
    }

    /// Track a position change without touching the cooldown clock.
    pub fn record_arrival(&mut self, arrived_at: BlockPos) {
        self.tracked_position = Some(arrived_at);
    }

    pub fn tracked_position(&self) -> Option<&BlockPos> {
        self.tracked_position.as_ref()
    }

    pub fn last_teleport(&self) -> Option<Instant> {
        self.last_teleport
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// Shared map of player sessions.
pub struct SessionStore {
    sessions: Mutex<HashMap<PlayerId, PlayerSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` against the player's session, creating it first if needed.
    pub fn with_session<R>(&self, player: &PlayerId, f: impl FnOnce(&mut PlayerSession) -> R) -> R {
        let mut sessions = self.sessions.lock();
        let session = sessions.entry(player.clone()).or_default();
        f(session)
    }

    /// Run `f` against the player's session only if one exists.
    ///
    /// Teleport continuations land here: a player who disconnected while a
    /// relocation was in flight simply has no session any more, and the
    /// continuation becomes a no-op.
    pub fn with_existing<R>(
        &self,
        player: &PlayerId,
        f: impl FnOnce(&mut PlayerSession) -> R,
    ) -> Option<R> {
        let mut sessions = self.sessions.lock();
        sessions.get_mut(player).map(f)
    }

    pub fn destroy(&self, player: &PlayerId) {
        self.sessions.lock().remove(player);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
