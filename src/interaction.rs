//! The interaction state machine: one total handler per host event kind.
//!
//! Every handler leaves an already-cancelled event untouched, never panics,
//! and treats absent geometry or registry misses as silent no-ops. Verdicts
//! travel back to the host through each event's `cancelled` flag.

use crate::economy::{EconomyGate, PortalUse};
use crate::events::{
    BlockChangeEvent, BucketEmptyEvent, BucketFillEvent, ClickAction, FlowEvent, Hand,
    InteractEvent, PortalEnterEvent, TeleportEvent,
};
use crate::filler::RegionFiller;
use crate::player::{PlayerDirectory, PlayerId};
use crate::registry::{PortalDefinition, PortalRegistry, CREATE_PERMISSION};
use crate::session::SessionStore;
use crate::teleport::TeleportOrchestrator;
use crate::types::{InteractionStats, Material, PortalsConfig};
use crate::world::BlockWorld;
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// InteractionService
// ---------------------------------------------------------------------------

/// Central dispatcher turning raw host events into portal actions.
///
/// Handlers run synchronously on the host's primary thread; only the
/// relocation pipeline behind [`TeleportOrchestrator`] runs out-of-line.
pub struct InteractionService {
    config: PortalsConfig,
    world: Arc<dyn BlockWorld>,
    registry: Arc<dyn PortalRegistry>,
    filler: Arc<dyn RegionFiller>,
    players: Arc<dyn PlayerDirectory>,
    sessions: Arc<SessionStore>,
    gate: EconomyGate,
    teleports: TeleportOrchestrator,
    stats: InteractionStats,
}

impl InteractionService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: PortalsConfig,
        world: Arc<dyn BlockWorld>,
        registry: Arc<dyn PortalRegistry>,
        filler: Arc<dyn RegionFiller>,
        players: Arc<dyn PlayerDirectory>,
        sessions: Arc<SessionStore>,
        gate: EconomyGate,
        teleports: TeleportOrchestrator,
    ) -> Self {
        Self {
            config,
            world,
            registry,
            filler,
            players,
            sessions,
            gate,
            teleports,
            stats: InteractionStats::default(),
        }
    }

    pub fn stats(&self) -> InteractionStats {
        self.stats.clone()
    }

    // -----------------------------------------------------------------------
    // World events
    // -----------------------------------------------------------------------

    /// Suppress simulation changes that would form or collapse a portal
    /// field inside a registered portal.
    pub fn on_block_change(&mut self, event: &mut BlockChangeEvent) {
        if event.cancelled {
            return;
        }
        let portal_forming =
            event.changed.is_portal_forming() || event.current.is_portal_forming();
        if portal_forming && self.registry.is_portal(&event.position) {
            log::debug!("suppressed block change at {}", event.position);
            event.cancelled = true;
            self.stats.events_suppressed += 1;
        }
    }

    /// Inbound flow into a portal is always blocked; outbound flow is
    /// blocked only while bucket filling is administratively disabled.
    pub fn on_flow(&mut self, event: &mut FlowEvent) {
        if event.cancelled {
            return;
        }
        if let Some(destination) = &event.destination {
            if self.registry.is_portal(destination) {
                log::debug!("suppressed flow into portal at {}", destination);
                event.cancelled = true;
                self.stats.events_suppressed += 1;
                return;
            }
        }
        if self.config.bucket_filling {
            return;
        }
        if let Some(source) = &event.source {
            if self.registry.is_portal(source) {
                log::debug!("suppressed flow out of portal at {}", source);
                event.cancelled = true;
                self.stats.events_suppressed += 1;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Bucket events
    // -----------------------------------------------------------------------

    /// Scooping liquid out of a portal drains the whole interior. The
    /// default removal action is left alone; draining to air is its
    /// functional equivalent.
    pub fn on_bucket_fill(&mut self, event: &mut BucketFillEvent) {
        if event.cancelled {
            return;
        }
        let Some(clicked) = event.clicked.clone() else {
            return;
        };
        let Some(portal) = self.registry.resolve_portal(&event.player, &clicked) else {
            return;
        };
        if self.is_debug(&event.player) {
            self.inspect(&event.player, &portal);
            event.cancelled = true;
            return;
        }
        if self
            .filler
            .fill(&portal.region, &clicked, Material::Air, &event.player)
        {
            self.stats.fills_applied += 1;
        }
    }

    /// Emptying a bucket against a portal face fills the interior with the
    /// bucket's liquid, authorization permitting.
    pub fn on_bucket_empty(&mut self, event: &mut BucketEmptyEvent) {
        if event.cancelled {
            return;
        }
        if !self.config.bucket_filling {
            return;
        }
        let Some(clicked) = event.clicked.clone() else {
            return;
        };
        let target = clicked.offset(event.face);
        let Some(portal) = self.registry.resolve_portal(&event.player, &target) else {
            return;
        };
        if self.is_debug(&event.player) {
            self.inspect(&event.player, &portal);
            event.cancelled = true;
            return;
        }
        if !self
            .players
            .has_permission(&event.player, &portal.fill_node())
        {
            log::debug!(
                "{} may not fill portal {}",
                self.players.display_name(&event.player),
                portal.name
            );
            event.cancelled = true;
            self.stats.accesses_denied += 1;
            return;
        }
        let liquid = match event.bucket {
            Material::WaterBucket => Material::Water,
            Material::LavaBucket => Material::Lava,
            _ => return,
        };
        if self
            .filler
            .fill(&portal.region, &target, liquid, &event.player)
        {
            self.stats.fills_applied += 1;
        }
        event.cancelled = true;
    }

    // -----------------------------------------------------------------------
    // Interact: ignition and wand selection
    // -----------------------------------------------------------------------

    pub fn on_interact(&mut self, event: &mut InteractEvent) {
        if event.cancelled {
            return;
        }
        if event.action == ClickAction::RightClickBlock
            && event.held == Some(Material::FlintAndSteel)
        {
            self.ignite(event);
            return;
        }

        // Wand selection gesture. Every precondition must hold or the event
        // passes through untouched.
        if self.config.use_external_selection_tool {
            return;
        }
        if event.hand != Hand::Main {
            return;
        }
        if event.held != Some(self.config.wand_material) {
            return;
        }
        if !self
            .players
            .has_permission(&event.player, CREATE_PERMISSION)
        {
            return;
        }
        let Some(clicked) = event.clicked.clone() else {
            return;
        };
        let world_handle = if self.world.is_world_loaded(&clicked.world) {
            Some(clicked.world.clone())
        } else {
            None
        };
        let recorded = match event.action {
            ClickAction::LeftClickBlock => self.sessions.with_session(&event.player, |session| {
                session.set_left_selection(clicked.clone(), world_handle.as_deref())
            }),
            ClickAction::RightClickBlock => self.sessions.with_session(&event.player, |session| {
                session.set_right_selection(clicked.clone(), world_handle.as_deref())
            }),
            _ => return,
        };
        if recorded {
            log::debug!(
                "recorded {:?} selection {} for {}",
                event.action,
                clicked,
                self.players.display_name(&event.player)
            );
            self.stats.selections_recorded += 1;
        }
        event.cancelled = recorded;
    }

    /// Ignite or strike out a portal with the ignition tool. Each step can
    /// exit early with the event left uncancelled.
    fn ignite(&mut self, event: &mut InteractEvent) {
        let Some(clicked) = event.clicked.clone() else {
            return;
        };
        let target = clicked.offset(event.face);
        if !self.registry.is_portal(&target) {
            return;
        }
        let Some(portal) = self.registry.resolve_portal(&event.player, &target) else {
            return;
        };
        if !self
            .players
            .has_permission(&event.player, CREATE_PERMISSION)
        {
            return;
        }
        if !portal.is_frame_valid(self.world.as_ref()) {
            return;
        }
        if self.is_debug(&event.player) {
            self.inspect(&event.player, &portal);
            event.cancelled = true;
            return;
        }
        let material = if self.world.material_at(&target) == Some(Material::PortalField) {
            Material::Air
        } else {
            Material::PortalField
        };
        let filled = self
            .filler
            .fill(&portal.region, &target, material, &event.player);
        if filled {
            self.stats.fills_applied += 1;
        }
        event.cancelled = filled;
    }

    // -----------------------------------------------------------------------
    // Portal entry
    // -----------------------------------------------------------------------

    /// Gate a portal entry behind cooldown, permission, and payment, then
    /// hand the relocation to the orchestrator. The underlying host event is
    /// always cancelled once a portal resolves: this core owns the move.
    pub fn on_portal_enter(&mut self, event: &mut PortalEnterEvent) {
        if event.cancelled {
            return;
        }
        let Some(portal) = self
            .registry
            .resolve_portal(&event.player, &event.location)
        else {
            return;
        };
        if self.is_debug(&event.player) {
            self.inspect(&event.player, &portal);
            event.cancelled = true;
            return;
        }
        let Some(destination) = portal.destination.clone() else {
            self.players.send_message(
                &event.player,
                &format!("The {} portal goes nowhere.", portal.name),
            );
            event.cancelled = true;
            return;
        };
        let window = Duration::from_millis(self.config.teleport_cooldown_ms);
        let cooling = self
            .sessions
            .with_session(&event.player, |session| session.on_cooldown(window));
        if cooling {
            self.players
                .send_message(&event.player, "You must wait before using a portal again.");
            event.cancelled = true;
            return;
        }
        match self.gate.check_access(&portal, &event.player) {
            PortalUse::CannotUse => {
                event.cancelled = true;
                self.stats.accesses_denied += 1;
                return;
            }
            PortalUse::PaidUse => {
                self.gate.charge_entry_fee(&portal, &event.player);
            }
            PortalUse::FreeUse => {}
        }
        self.teleports
            .relocate(&event.player, &destination, portal.safe_teleport);
        self.stats.teleports_dispatched += 1;
        event.cancelled = true;
    }

    // -----------------------------------------------------------------------
    // Monitors
    // -----------------------------------------------------------------------

    /// Observe a teleport the host has already committed to; tracks the
    /// player's position without touching the cooldown clock.
    pub fn on_player_teleport(&mut self, event: &TeleportEvent) {
        if event.cancelled {
            log::debug!("ignoring cancelled teleport of {}", event.player);
            return;
        }
        let to = event.to.clone();
        self.sessions
            .with_session(&event.player, |session| session.record_arrival(to));
    }

    pub fn on_player_disconnect(&mut self, player: &PlayerId) {
        self.sessions.destroy(player);
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// Debug-mode output: a portal summary for the player, mirrored to the
    /// log.
    pub fn inspect(&self, player: &PlayerId, portal: &PortalDefinition) {
        let destination = match &portal.destination {
            Some(destination) => destination.to_string(),
            None => "nowhere".to_string(),
        };
        let summary = format!(
            "Portal {} [{}] price {} -> {}",
            portal.name,
            portal.region,
            if portal.price > 0.0 {
                format!("{} {}", portal.price, portal.currency)
            } else {
                "free".to_string()
            },
            destination
        );
        self.players.send_message(player, &summary);
        log::debug!(
            "inspection for {}: {}",
            self.players.display_name(player),
            summary
        );
    }

    fn is_debug(&self, player: &PlayerId) -> bool {
        self.sessions
            .with_session(player, |session| session.is_debug())
    }
}
