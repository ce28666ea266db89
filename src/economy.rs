//! Entry-fee gating: the `EconomyLedger` seam, an in-memory ledger, and the
//! `EconomyGate` that decides whether a player may pass through a portal.

use crate::player::{PlayerDirectory, PlayerId};
use crate::registry::PortalDefinition;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Ledger seam
// ---------------------------------------------------------------------------

/// Host-side account balance surface.
pub trait EconomyLedger: Send + Sync {
    fn is_affordable(&self, player: &PlayerId, price: f64, currency: &str) -> bool;
    fn format_price(&self, price: f64, currency: &str) -> String;
    fn charge(&self, player: &PlayerId, price: f64, currency: &str);
}

/// In-memory ledger: balances keyed by player and currency.
pub struct MemoryLedger {
    balances: RwLock<HashMap<(PlayerId, String), f64>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
        }
    }

    pub fn deposit(&self, player: &PlayerId, amount: f64, currency: impl Into<String>) {
        *self
            .balances
            .write()
            .entry((player.clone(), currency.into()))
            .or_insert(0.0) += amount;
    }

    pub fn balance(&self, player: &PlayerId, currency: &str) -> f64 {
        self.balances
            .read()
            .get(&(player.clone(), currency.to_string()))
            .copied()
            .unwrap_or(0.0)
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl EconomyLedger for MemoryLedger {
    fn is_affordable(&self, player: &PlayerId, price: f64, currency: &str) -> bool {
        self.balance(player, currency) >= price
    }

    fn format_price(&self, price: f64, currency: &str) -> String {
        if currency.is_empty() {
            format!("{:.2}", price)
        } else {
            format!("{:.2} {}", price, currency)
        }
    }

    fn charge(&self, player: &PlayerId, price: f64, currency: &str) {
        *self
            .balances
            .write()
            .entry((player.clone(), currency.to_string()))
            .or_insert(0.0) -= price;
    }
}

// ---------------------------------------------------------------------------
// PortalUse
// ---------------------------------------------------------------------------

/// Outcome of the access check for one use attempt. Callers match on the
/// variant; there are no boolean views of this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalUse {
    CannotUse,
    FreeUse,
    PaidUse,
}

// ---------------------------------------------------------------------------
// EconomyGate
// ---------------------------------------------------------------------------

/// Decides, per attempt, whether a player's portal use is denied, free, or
/// paid. Nothing is cached between attempts.
pub struct EconomyGate {
    ledger: Arc<dyn EconomyLedger>,
    players: Arc<dyn PlayerDirectory>,
    enforce_access: bool,
}

impl EconomyGate {
    pub fn new(
        ledger: Arc<dyn EconomyLedger>,
        players: Arc<dyn PlayerDirectory>,
        enforce_access: bool,
    ) -> Self {
        Self {
            ledger,
            players,
            enforce_access,
        }
    }

    /// Evaluate one use attempt.
    ///
    /// A permission denial is logged but not messaged; an affordability
    /// denial tells the player what the entry costs.
    pub fn check_access(&self, portal: &PortalDefinition, player: &PlayerId) -> PortalUse {
        if self.enforce_access && !self.players.has_permission(player, &portal.access_node()) {
            log::debug!(
                "{} denied access to portal {}: missing {}",
                self.players.display_name(player),
                portal.name,
                portal.access_node()
            );
            return PortalUse::CannotUse;
        }

        if portal.price <= 0.0 || self.players.has_permission(player, &portal.exempt_node()) {
            return PortalUse::FreeUse;
        }

        if !self
            .ledger
            .is_affordable(player, portal.price, &portal.currency)
        {
            let formatted = self.ledger.format_price(portal.price, &portal.currency);
            self.players.send_message(
                player,
                &format!("You need {} to enter the {} portal.", formatted, portal.name),
            );
            return PortalUse::CannotUse;
        }

        PortalUse::PaidUse
    }

    /// Commit the entry fee. Callers invoke this only after a `PaidUse`
    /// verdict; the charge itself never re-checks anything.
    pub fn charge_entry_fee(&self, portal: &PortalDefinition, player: &PlayerId) {
        self.ledger.charge(player, portal.price, &portal.currency);
        log::debug!(
            "charged {} {} for portal {}",
            self.players.display_name(player),
            self.ledger.format_price(portal.price, &portal.currency),
            portal.name
        );
    }
}
