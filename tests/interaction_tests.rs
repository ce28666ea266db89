//! InteractionService handler tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use warpgate::{
        ApproachFace, BlockChangeEvent, BlockPos, BlockWorld, BucketEmptyEvent, BucketFillEvent,
        ClickAction, EconomyGate, FlowEvent, GridFiller, GridPos, GridRelocator, GridWorld, Hand,
        InteractEvent, InteractionService, Material, MemoryLedger, MemoryPlayerDirectory,
        MemoryPortalRegistry, PlayerId, PortalDefinition, PortalsConfig, Region, SessionStore,
        TeleportOrchestrator, CREATE_PERMISSION,
    };

    struct Rig {
        world: Arc<GridWorld>,
        registry: Arc<MemoryPortalRegistry>,
        players: Arc<MemoryPlayerDirectory>,
        sessions: Arc<SessionStore>,
        service: InteractionService,
    }

    fn make_rig(config: PortalsConfig) -> Rig {
        let world = Arc::new(GridWorld::new());
        world.load_world("overworld");
        let registry = Arc::new(MemoryPortalRegistry::new());
        let players = Arc::new(MemoryPlayerDirectory::new());
        let sessions = Arc::new(SessionStore::new());
        let ledger = Arc::new(MemoryLedger::new());
        let filler = Arc::new(GridFiller::new(world.clone()));
        let relocator = Arc::new(GridRelocator::new(world.clone()));
        let gate = EconomyGate::new(
            ledger,
            players.clone(),
            config.enforce_portal_access,
        );
        let (orchestrator, _completions) = TeleportOrchestrator::new(relocator);
        let service = InteractionService::new(
            config,
            world.clone(),
            registry.clone(),
            filler,
            players.clone(),
            sessions.clone(),
            gate,
            orchestrator,
        );
        Rig {
            world,
            registry,
            players,
            sessions,
            service,
        }
    }

    /// A 1x2x1 interior at (10,64,10)..(10,65,10) ringed by obsidian.
    fn make_portal(world: &GridWorld) -> PortalDefinition {
        let interior = Region::new(
            "overworld",
            GridPos::new(10, 64, 10),
            GridPos::new(10, 65, 10),
        );
        let mut portal = PortalDefinition::new("arrival", interior);
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
        portal
    }

    fn alice() -> PlayerId {
        PlayerId::new("alice")
    }

    fn interior() -> BlockPos {
        BlockPos::new("overworld", 10, 64, 10)
    }

    // -----------------------------------------------------------------------
    // Environmental block changes
    // -----------------------------------------------------------------------

    #[test]
    fn portal_forming_change_inside_portal_is_suppressed() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.registry.insert(make_portal(&rig.world));

        let mut event = BlockChangeEvent::new(interior(), Material::PortalField, Material::Air);
        rig.service.on_block_change(&mut event);
        assert!(event.cancelled);
        assert_eq!(rig.service.stats().events_suppressed, 1);
    }

    #[test]
    fn portal_forming_current_material_also_suppresses() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.registry.insert(make_portal(&rig.world));

        // A lit portal naturally collapsing: current is the field material.
        let mut event = BlockChangeEvent::new(interior(), Material::Air, Material::PortalField);
        rig.service.on_block_change(&mut event);
        assert!(event.cancelled);
    }

    #[test]
    fn change_outside_any_portal_is_untouched() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.registry.insert(make_portal(&rig.world));

        let away = BlockPos::new("overworld", 50, 64, 50);
        let mut event = BlockChangeEvent::new(away, Material::PortalField, Material::Air);
        rig.service.on_block_change(&mut event);
        assert!(!event.cancelled);
    }

    #[test]
    fn unrelated_material_change_inside_portal_is_untouched() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.registry.insert(make_portal(&rig.world));

        let mut event = BlockChangeEvent::new(interior(), Material::Fire, Material::Air);
        rig.service.on_block_change(&mut event);
        assert!(!event.cancelled);
    }

    #[test]
    fn already_cancelled_change_is_left_alone() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.registry.insert(make_portal(&rig.world));

        let mut event = BlockChangeEvent::new(interior(), Material::PortalField, Material::Air);
        event.cancelled = true;
        rig.service.on_block_change(&mut event);
        assert!(event.cancelled);
        assert_eq!(rig.service.stats().events_suppressed, 0);
    }

    // -----------------------------------------------------------------------
    // Directional flow
    // -----------------------------------------------------------------------

    #[test]
    fn flow_into_portal_is_suppressed_regardless_of_bucket_flag() {
        for bucket_filling in [true, false] {
            let mut rig = make_rig(PortalsConfig {
                bucket_filling,
                ..Default::default()
            });
            rig.registry.insert(make_portal(&rig.world));

            let outside = BlockPos::new("overworld", 12, 64, 10);
            let mut event = FlowEvent::new(Some(outside), Some(interior()));
            rig.service.on_flow(&mut event);
            assert!(event.cancelled, "bucket_filling={}", bucket_filling);
        }
    }

    #[test]
    fn outbound_flow_suppression_follows_bucket_flag() {
        let outside = BlockPos::new("overworld", 12, 64, 10);

        let mut rig = make_rig(PortalsConfig {
            bucket_filling: false,
            ..Default::default()
        });
        rig.registry.insert(make_portal(&rig.world));
        let mut event = FlowEvent::new(Some(interior()), Some(outside.clone()));
        rig.service.on_flow(&mut event);
        assert!(event.cancelled);

        // The identical event with filling enabled passes through.
        let mut rig = make_rig(PortalsConfig {
            bucket_filling: true,
            ..Default::default()
        });
        rig.registry.insert(make_portal(&rig.world));
        let mut event = FlowEvent::new(Some(interior()), Some(outside));
        rig.service.on_flow(&mut event);
        assert!(!event.cancelled);
    }

    #[test]
    fn flow_with_absent_coordinates_is_a_no_op() {
        let mut rig = make_rig(PortalsConfig {
            bucket_filling: false,
            ..Default::default()
        });
        rig.registry.insert(make_portal(&rig.world));

        let mut event = FlowEvent::new(None, None);
        rig.service.on_flow(&mut event);
        assert!(!event.cancelled);
    }

    // -----------------------------------------------------------------------
    // Bucket fill (drain)
    // -----------------------------------------------------------------------

    #[test]
    fn bucket_fill_drains_interior_without_cancelling() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.registry.insert(make_portal(&rig.world));
        rig.world.set_block(interior(), Material::Water);

        let mut event = BucketFillEvent::new(alice(), Some(interior()));
        rig.service.on_bucket_fill(&mut event);
        assert!(!event.cancelled);
        assert_eq!(rig.world.material_at(&interior()), Some(Material::Air));
        assert_eq!(rig.service.stats().fills_applied, 1);
    }

    #[test]
    fn bucket_fill_outside_portal_is_a_no_op() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.registry.insert(make_portal(&rig.world));

        let away = BlockPos::new("overworld", 50, 64, 50);
        rig.world.set_block(away.clone(), Material::Water);
        let mut event = BucketFillEvent::new(alice(), Some(away.clone()));
        rig.service.on_bucket_fill(&mut event);
        assert!(!event.cancelled);
        assert_eq!(rig.world.material_at(&away), Some(Material::Water));
    }

    #[test]
    fn debug_mode_turns_bucket_fill_into_inspection() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.registry.insert(make_portal(&rig.world));
        rig.world.set_block(interior(), Material::Water);
        rig.sessions
            .with_session(&alice(), |session| session.set_debug(true));

        let mut event = BucketFillEvent::new(alice(), Some(interior()));
        rig.service.on_bucket_fill(&mut event);
        assert!(event.cancelled);
        // No mutation, but an inspection message arrived.
        assert_eq!(rig.world.material_at(&interior()), Some(Material::Water));
        assert!(!rig.players.messages_for(&alice()).is_empty());
        assert_eq!(rig.service.stats().fills_applied, 0);
    }

    // -----------------------------------------------------------------------
    // Bucket empty (fill with liquid)
    // -----------------------------------------------------------------------

    #[test]
    fn bucket_empty_fills_portal_through_face_translation() {
        let mut rig = make_rig(PortalsConfig::default());
        let portal = make_portal(&rig.world);
        rig.players.grant(&alice(), portal.fill_node());
        rig.registry.insert(portal);

        // Click the frame block below the interior, against its top face.
        let below = BlockPos::new("overworld", 10, 63, 10);
        let mut event =
            BucketEmptyEvent::new(alice(), Some(below), ApproachFace::Up, Material::WaterBucket);
        rig.service.on_bucket_empty(&mut event);
        assert!(event.cancelled);
        assert_eq!(rig.world.material_at(&interior()), Some(Material::Water));
    }

    #[test]
    fn bucket_empty_without_fill_permission_is_denied() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.registry.insert(make_portal(&rig.world));

        let below = BlockPos::new("overworld", 10, 63, 10);
        let mut event =
            BucketEmptyEvent::new(alice(), Some(below), ApproachFace::Up, Material::LavaBucket);
        rig.service.on_bucket_empty(&mut event);
        assert!(event.cancelled);
        assert_eq!(rig.world.material_at(&interior()), Some(Material::Air));
        assert_eq!(rig.service.stats().accesses_denied, 1);
    }

    #[test]
    fn bucket_empty_is_inert_when_filling_disabled() {
        let mut rig = make_rig(PortalsConfig {
            bucket_filling: false,
            ..Default::default()
        });
        let portal = make_portal(&rig.world);
        rig.players.grant(&alice(), portal.fill_node());
        rig.registry.insert(portal);

        let below = BlockPos::new("overworld", 10, 63, 10);
        let mut event =
            BucketEmptyEvent::new(alice(), Some(below), ApproachFace::Up, Material::WaterBucket);
        rig.service.on_bucket_empty(&mut event);
        assert!(!event.cancelled);
        assert_eq!(rig.world.material_at(&interior()), Some(Material::Air));
    }

    #[test]
    fn debug_mode_turns_bucket_empty_into_inspection() {
        let mut rig = make_rig(PortalsConfig::default());
        let portal = make_portal(&rig.world);
        rig.players.grant(&alice(), portal.fill_node());
        rig.registry.insert(portal);
        rig.sessions
            .with_session(&alice(), |session| session.set_debug(true));

        let below = BlockPos::new("overworld", 10, 63, 10);
        let mut event =
            BucketEmptyEvent::new(alice(), Some(below), ApproachFace::Up, Material::WaterBucket);
        rig.service.on_bucket_empty(&mut event);
        assert!(event.cancelled);
        assert_eq!(rig.world.material_at(&interior()), Some(Material::Air));
    }

    // -----------------------------------------------------------------------
    // Wand selection
    // -----------------------------------------------------------------------

    fn wand_click(action: ClickAction, clicked: BlockPos) -> InteractEvent {
        InteractEvent::new(
            alice(),
            action,
            Some(clicked),
            ApproachFace::Up,
            Some(Material::WoodenAxe),
            Hand::Main,
        )
    }

    #[test]
    fn wand_records_both_selections() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.players.grant(&alice(), CREATE_PERMISSION);

        let left = BlockPos::new("overworld", 1, 64, 1);
        let right = BlockPos::new("overworld", 3, 66, 3);
        let mut event = wand_click(ClickAction::LeftClickBlock, left.clone());
        rig.service.on_interact(&mut event);
        assert!(event.cancelled);

        let mut event = wand_click(ClickAction::RightClickBlock, right.clone());
        rig.service.on_interact(&mut event);
        assert!(event.cancelled);

        rig.sessions.with_session(&alice(), |session| {
            assert_eq!(session.left_selection(), Some(&left));
            assert_eq!(session.right_selection(), Some(&right));
        });
        assert_eq!(rig.service.stats().selections_recorded, 2);
    }

    #[test]
    fn off_hand_wand_click_is_ignored() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.players.grant(&alice(), CREATE_PERMISSION);

        let mut event = wand_click(ClickAction::LeftClickBlock, interior());
        event.hand = Hand::Off;
        rig.service.on_interact(&mut event);
        assert!(!event.cancelled);
        assert_eq!(rig.service.stats().selections_recorded, 0);
    }

    #[test]
    fn non_wand_item_is_ignored() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.players.grant(&alice(), CREATE_PERMISSION);

        let mut event = wand_click(ClickAction::LeftClickBlock, interior());
        event.held = Some(Material::Stone);
        rig.service.on_interact(&mut event);
        assert!(!event.cancelled);
    }

    #[test]
    fn wand_without_create_permission_is_ignored() {
        let mut rig = make_rig(PortalsConfig::default());

        let mut event = wand_click(ClickAction::LeftClickBlock, interior());
        rig.service.on_interact(&mut event);
        assert!(!event.cancelled);
        assert_eq!(rig.service.stats().selections_recorded, 0);
    }

    #[test]
    fn external_selection_tool_disables_the_wand() {
        let mut rig = make_rig(PortalsConfig {
            use_external_selection_tool: true,
            ..Default::default()
        });
        rig.players.grant(&alice(), CREATE_PERMISSION);

        let mut event = wand_click(ClickAction::LeftClickBlock, interior());
        rig.service.on_interact(&mut event);
        assert!(!event.cancelled);
    }

    #[test]
    fn selection_in_unloaded_world_is_rejected() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.players.grant(&alice(), CREATE_PERMISSION);

        let elsewhere = BlockPos::new("nether", 0, 64, 0);
        let mut event = wand_click(ClickAction::LeftClickBlock, elsewhere);
        rig.service.on_interact(&mut event);
        assert!(!event.cancelled);
        rig.sessions.with_session(&alice(), |session| {
            assert_eq!(session.left_selection(), None);
        });
    }

    // -----------------------------------------------------------------------
    // Ignition
    // -----------------------------------------------------------------------

    fn flint_click(clicked: BlockPos) -> InteractEvent {
        InteractEvent::new(
            alice(),
            ClickAction::RightClickBlock,
            Some(clicked),
            ApproachFace::Up,
            Some(Material::FlintAndSteel),
            Hand::Main,
        )
    }

    #[test]
    fn ignite_toggles_the_interior_on_and_off() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.players.grant(&alice(), CREATE_PERMISSION);
        rig.registry.insert(make_portal(&rig.world));

        let below = BlockPos::new("overworld", 10, 63, 10);
        let mut event = flint_click(below.clone());
        rig.service.on_interact(&mut event);
        assert!(event.cancelled);
        assert_eq!(
            rig.world.material_at(&interior()),
            Some(Material::PortalField)
        );

        let mut event = flint_click(below);
        rig.service.on_interact(&mut event);
        assert!(event.cancelled);
        assert_eq!(rig.world.material_at(&interior()), Some(Material::Air));
    }

    #[test]
    fn ignite_without_create_permission_leaves_event_uncancelled() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.registry.insert(make_portal(&rig.world));

        let mut event = flint_click(BlockPos::new("overworld", 10, 63, 10));
        rig.service.on_interact(&mut event);
        assert!(!event.cancelled);
        assert_eq!(rig.world.material_at(&interior()), Some(Material::Air));
    }

    #[test]
    fn ignite_with_broken_frame_does_nothing() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.players.grant(&alice(), CREATE_PERMISSION);
        let portal = make_portal(&rig.world);
        // Knock one frame block out.
        let broken = BlockPos::new("overworld", 9, 63, 10);
        rig.world.set_block(broken, Material::Air);
        rig.registry.insert(portal);

        let mut event = flint_click(BlockPos::new("overworld", 10, 63, 10));
        rig.service.on_interact(&mut event);
        assert!(!event.cancelled);
        assert_eq!(rig.world.material_at(&interior()), Some(Material::Air));
    }

    #[test]
    fn ignite_exits_quietly_when_resolution_fails() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.players.grant(&alice(), CREATE_PERMISSION);
        let portal = make_portal(&rig.world);
        rig.registry.conceal(portal.name.clone(), &alice());
        rig.registry.insert(portal);

        let mut event = flint_click(BlockPos::new("overworld", 10, 63, 10));
        rig.service.on_interact(&mut event);
        assert!(!event.cancelled);
        assert_eq!(rig.world.material_at(&interior()), Some(Material::Air));
    }

    #[test]
    fn debug_mode_turns_ignite_into_inspection() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.players.grant(&alice(), CREATE_PERMISSION);
        rig.registry.insert(make_portal(&rig.world));
        rig.sessions
            .with_session(&alice(), |session| session.set_debug(true));

        let mut event = flint_click(BlockPos::new("overworld", 10, 63, 10));
        rig.service.on_interact(&mut event);
        assert!(event.cancelled);
        assert_eq!(rig.world.material_at(&interior()), Some(Material::Air));
        assert!(!rig.players.messages_for(&alice()).is_empty());
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    #[test]
    fn disconnect_destroys_the_session() {
        let mut rig = make_rig(PortalsConfig::default());
        rig.sessions
            .with_session(&alice(), |session| session.set_debug(true));
        assert_eq!(rig.sessions.session_count(), 1);

        rig.service.on_player_disconnect(&alice());
        assert_eq!(rig.sessions.session_count(), 0);
    }

    #[test]
    fn monitored_teleport_tracks_position() {
        let mut rig = make_rig(PortalsConfig::default());
        let to = BlockPos::new("overworld", 7, 64, 7);
        let event = warpgate::TeleportEvent::new(alice(), to.clone());
        rig.service.on_player_teleport(&event);
        rig.sessions.with_session(&alice(), |session| {
            assert_eq!(session.tracked_position(), Some(&to));
            assert_eq!(session.last_teleport(), None);
        });
    }

    #[test]
    fn cancelled_teleport_is_not_tracked() {
        let mut rig = make_rig(PortalsConfig::default());
        let mut event = warpgate::TeleportEvent::new(alice(), interior());
        event.cancelled = true;
        rig.service.on_player_teleport(&event);
        assert_eq!(rig.sessions.session_count(), 0);
    }
}
