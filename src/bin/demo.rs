//! warpgate-demo binary
//!
//! Wires the interaction core to its in-memory reference collaborators and
//! replays a short scripted session: wand selection, portal ignition, and a
//! paid portal entry.
//!
//! ## Configuration (env / TOML via `config` crate)
//!
//! | Key                        | Default       | Description                      |
//! |----------------------------|---------------|----------------------------------|
//! | `WARPGATE_WAND`            | `wooden_axe`  | Selection wand material          |
//! | `WARPGATE_BUCKET_FILLING`  | `true`        | Allow bucket fill/drain          |
//! | `WARPGATE_ENFORCE_ACCESS`  | `true`        | Require portal access permission |
//! | `WARPGATE_COOLDOWN_MS`     | `1000`        | Per-player teleport cooldown     |
//! | `WARPGATE_CONFIG`          | *(none)*      | Optional TOML config file        |

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use warpgate::{
    ApproachFace, BlockPos, BlockWorld, BucketEmptyEvent, ClickAction, Destination, EconomyGate,
    GridFiller, GridPos, GridRelocator, GridWorld, Hand, InteractEvent, InteractionService,
    Material, MemoryLedger, MemoryPlayerDirectory, MemoryPortalRegistry, PlayerId,
    PortalDefinition, PortalEnterEvent, PortalsConfig, Region, SessionStore,
    TeleportOrchestrator, CREATE_PERMISSION,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "warpgate-demo", about = "Portal interaction core demo", version)]
struct Args {
    /// Selection wand material (snake_case material name)
    #[arg(long, env = "WARPGATE_WAND")]
    wand: Option<String>,

    /// Allow players to drain/fill portals with buckets
    #[arg(long, env = "WARPGATE_BUCKET_FILLING")]
    bucket_filling: Option<bool>,

    /// Require the portal's permission node for entry
    #[arg(long, env = "WARPGATE_ENFORCE_ACCESS")]
    enforce_access: Option<bool>,

    /// Minimum milliseconds between teleports for one player
    #[arg(long, env = "WARPGATE_COOLDOWN_MS")]
    cooldown_ms: Option<u64>,

    /// Optional TOML config file; CLI/env values override it
    #[arg(long, env = "WARPGATE_CONFIG")]
    config: Option<String>,
}

fn load_config(args: &Args) -> Result<PortalsConfig> {
    let mut config = match &args.config {
        Some(path) => config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()
            .with_context(|| format!("reading config file {}", path))?
            .try_deserialize::<PortalsConfig>()
            .context("deserializing portals config")?,
        None => PortalsConfig::default(),
    };
    if let Some(wand) = &args.wand {
        config.wand_material = serde_json::from_value(serde_json::Value::String(wand.clone()))
            .with_context(|| format!("unknown material '{}'", wand))?;
    }
    if let Some(bucket_filling) = args.bucket_filling {
        config.bucket_filling = bucket_filling;
    }
    if let Some(enforce) = args.enforce_access {
        config.enforce_portal_access = enforce;
    }
    if let Some(cooldown) = args.cooldown_ms {
        config.teleport_cooldown_ms = cooldown;
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// World fixture
// ---------------------------------------------------------------------------

/// A 1x2x1 portal interior at (10,64,10)..(10,65,10) ringed by an obsidian
/// frame, in a loaded overworld.
fn build_sample_portal(world: &GridWorld) -> PortalDefinition {
    world.load_world("overworld");

    let interior = Region::new("overworld", GridPos::new(10, 64, 10), GridPos::new(10, 65, 10));
    let mut portal = PortalDefinition::new("demo", interior);
    for y in 63..=66 {
        for x in 9..=11 {
            if (64..=65).contains(&y) && x == 10 {
                continue;
            }
            let pos = BlockPos::new("overworld", x, y, 10);
            world.set_block(pos.clone(), Material::Obsidian);
            portal.frame.insert(pos);
        }
    }
    portal.price = 10.0;
    portal.currency = "coins".to_string();
    portal.destination = Some(Destination::new(BlockPos::new("overworld", 100, 64, 100)));
    portal
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("warpgate=debug".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    log::info!(
        "Starting warpgate-demo (wand={}, bucket_filling={}, enforce_access={}, cooldown={}ms)",
        config.wand_material,
        config.bucket_filling,
        config.enforce_portal_access,
        config.teleport_cooldown_ms,
    );

    // Collaborators
    let world = Arc::new(GridWorld::new());
    let registry = Arc::new(MemoryPortalRegistry::new());
    let players = Arc::new(MemoryPlayerDirectory::new());
    let sessions = Arc::new(SessionStore::new());
    let ledger = Arc::new(MemoryLedger::new());
    let filler = Arc::new(GridFiller::new(world.clone()));
    let relocator = Arc::new(GridRelocator::new(world.clone()));

    let portal = build_sample_portal(&world);
    registry.insert(portal.clone());

    let alice = PlayerId::new("alice");
    players.set_display_name(&alice, "Alice");
    players.grant(&alice, CREATE_PERMISSION);
    players.grant(&alice, portal.access_node());
    players.grant(&alice, portal.fill_node());
    ledger.deposit(&alice, 25.0, "coins");

    let gate = EconomyGate::new(
        ledger.clone(),
        players.clone(),
        config.enforce_portal_access,
    );
    let (orchestrator, completions) = TeleportOrchestrator::new(relocator);
    tokio::spawn(completions.run(sessions.clone(), players.clone()));

    let mut service = InteractionService::new(
        config.clone(),
        world.clone(),
        registry,
        filler,
        players.clone(),
        sessions.clone(),
        gate,
        orchestrator,
    );

    // Scripted session: select both corners of a future frame with the wand.
    let corner = BlockPos::new("overworld", 9, 63, 10);
    let mut select = InteractEvent::new(
        alice.clone(),
        ClickAction::LeftClickBlock,
        Some(corner.clone()),
        ApproachFace::Up,
        Some(config.wand_material),
        Hand::Main,
    );
    service.on_interact(&mut select);
    let mut select = InteractEvent::new(
        alice.clone(),
        ClickAction::RightClickBlock,
        Some(BlockPos::new("overworld", 11, 66, 10)),
        ApproachFace::Up,
        Some(config.wand_material),
        Hand::Main,
    );
    service.on_interact(&mut select);

    // Light the sample portal by striking flint against its frame.
    let mut ignite = InteractEvent::new(
        alice.clone(),
        ClickAction::RightClickBlock,
        Some(BlockPos::new("overworld", 10, 63, 10)),
        ApproachFace::Up,
        Some(Material::FlintAndSteel),
        Hand::Main,
    );
    service.on_interact(&mut ignite);
    log::info!(
        "ignition cancelled default action: {} (interior now {:?})",
        ignite.cancelled,
        world.material_at(&BlockPos::new("overworld", 10, 64, 10)),
    );

    // Splash some lava against the frame to show the fill authorization path.
    let mut splash = BucketEmptyEvent::new(
        alice.clone(),
        Some(BlockPos::new("overworld", 10, 63, 10)),
        ApproachFace::Up,
        Material::LavaBucket,
    );
    service.on_bucket_empty(&mut splash);

    // Relight, then step in for a paid entry.
    let mut relight = InteractEvent::new(
        alice.clone(),
        ClickAction::RightClickBlock,
        Some(BlockPos::new("overworld", 10, 63, 10)),
        ApproachFace::Up,
        Some(Material::FlintAndSteel),
        Hand::Main,
    );
    service.on_interact(&mut relight);

    let mut enter = PortalEnterEvent::new(alice.clone(), BlockPos::new("overworld", 10, 64, 10));
    service.on_portal_enter(&mut enter);

    // Give the completion pump a moment to apply the arrival.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let arrived = sessions
        .with_existing(&alice, |session| session.tracked_position().cloned())
        .flatten();
    log::info!("Alice arrived at {:?}", arrived);
    log::info!("Alice's balance: {} coins", ledger.balance(&alice, "coins"));
    for message in players.messages_for(&alice) {
        log::info!("message to Alice: {}", message);
    }

    let stats = service.stats();
    log::info!(
        "stats: suppressed={} fills={} selections={} teleports={} denied={}",
        stats.events_suppressed,
        stats.fills_applied,
        stats.selections_recorded,
        stats.teleports_dispatched,
        stats.accesses_denied,
    );
    Ok(())
}
