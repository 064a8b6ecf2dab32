use eregions_core::command::sender::CommandSender;
use eregions_core::host::PlayerSnapshot;
use eregions_core::permission;
use eregions_core::selection::{SelectionTool, Stage};
use eregions_core::testing::{Delivery, Harness};
use eregions_core::Click;
use eregions_utils::{BlockPos, PlayerId};

const BUILDER: &[&str] = &[
    permission::REGION_CREATE,
    permission::CANCEL,
    permission::REGION_MEMBERS,
    permission::REGION_FLAG,
    permission::REGION_FLAGS,
    permission::REGION_MOVE,
    permission::REGION_SIZE,
    permission::REGION_REMOVE,
];

fn sneak(harness: &Harness, player: PlayerId) -> PlayerSnapshot {
    harness.host.update(player, |snapshot| snapshot.sneaking = true);
    harness.snapshot(player).expect("online")
}

/// Runs `create` and clicks both corners.
fn select(harness: &Harness, player: PlayerId, a: BlockPos, b: BlockPos) -> PlayerSnapshot {
    harness.command(player, "create");
    let snapshot = sneak(harness, player);
    assert!(harness.plugin.on_interact(&snapshot, Click::LeftBlock(a)));
    assert!(harness.plugin.on_interact(&snapshot, Click::LeftBlock(b)));
    snapshot
}

/// A harness with `Steve` owning `base1` from (10,64,10) to (20,70,20).
fn with_base() -> (Harness, PlayerSnapshot) {
    let harness = Harness::bundled().expect("bundled config");
    let steve = harness.join("Steve", BUILDER);
    let steve = select(
        &harness,
        steve.id,
        BlockPos::new(10, 64, 10),
        BlockPos::new(20, 70, 20),
    );
    assert!(harness.plugin.on_chat(&steve, "base1"));
    (harness, steve)
}

fn count(lines: &[String], wanted: &str) -> usize {
    lines.iter().filter(|line| *line == wanted).count()
}

#[test]
fn creates_region_from_two_clicks_and_a_name() {
    let (harness, steve) = with_base();

    let region = harness
        .plugin
        .regions()
        .region(Harness::WORLD, "base1")
        .expect("directory")
        .expect("created");
    assert!(region.is_owner(steve.id));
    assert_eq!(region.bounds.min(), BlockPos::new(10, 64, 10));
    assert_eq!(region.bounds.max(), BlockPos::new(20, 70, 20));
    assert_eq!(
        harness.plugin.selections().get(steve.id).map(|session| session.stage),
        Some(Stage::Finalized)
    );

    harness.run_ticks(150);
    let lines = harness.host.chat_lines(steve.id);
    assert_eq!(count(&lines, "Selection started."), 1);
    assert_eq!(count(&lines, "Region base1 created."), 1);
}

#[test]
fn cancel_word_ends_the_selection() {
    let harness = Harness::bundled().expect("bundled config");
    let steve = harness.join("Steve", BUILDER);
    let steve = select(
        &harness,
        steve.id,
        BlockPos::new(0, 0, 0),
        BlockPos::new(5, 5, 5),
    );
    harness.host.take();

    assert!(harness.plugin.on_chat(&steve, "ОТМЕНА"));
    assert!(!harness.plugin.selections().has_active(steve.id));
    assert_eq!(harness.tool.selection(steve.id).ok().flatten(), None);
    assert_eq!(
        harness.host.chat_lines(steve.id),
        vec!["Region creation cancelled."]
    );
    assert!(
        harness
            .plugin
            .regions()
            .region_ids(Harness::WORLD)
            .is_empty()
    );

    // Plain chat passes through once nothing is awaited.
    assert!(!harness.plugin.on_chat(&steve, "hello"));
}

#[test]
fn invalid_names_keep_waiting() {
    let harness = Harness::bundled().expect("bundled config");
    let steve = harness.join("Steve", BUILDER);
    let steve = select(
        &harness,
        steve.id,
        BlockPos::new(0, 0, 0),
        BlockPos::new(5, 5, 5),
    );
    harness.host.take();

    assert!(harness.plugin.on_chat(&steve, "my base"));
    assert!(harness.plugin.selections().is_awaiting_name(steve.id));
    assert_eq!(
        harness.host.chat_lines(steve.id),
        vec!["The region name may only contain letters, digits, - and _."]
    );
}

#[test]
fn overlapping_selection_names_the_existing_region() {
    let (harness, steve) = with_base();
    let steve = select(
        &harness,
        steve.id,
        BlockPos::new(15, 64, 15),
        BlockPos::new(25, 70, 25),
    );
    harness.host.take();

    assert!(harness.plugin.on_chat(&steve, "base2"));
    assert_eq!(
        harness.host.chat_lines(steve.id),
        vec!["Your selection overlaps existing regions: base1."]
    );
    assert!(harness.plugin.selections().is_awaiting_name(steve.id));
    assert_eq!(
        harness.plugin.regions().region_ids(Harness::WORLD),
        vec!["base1"]
    );
}

#[test]
fn second_create_leaves_the_session_alone() {
    let harness = Harness::bundled().expect("bundled config");
    let steve = harness.join("Steve", BUILDER);
    harness.command(steve.id, "create");
    let steve = sneak(&harness, steve.id);
    harness
        .plugin
        .on_interact(&steve, Click::LeftBlock(BlockPos::new(1, 2, 3)));
    let before = harness.plugin.selections().get(steve.id);
    harness.host.take();

    harness.command(steve.id, "create");
    assert_eq!(harness.plugin.selections().get(steve.id), before);
    assert_eq!(
        harness.host.chat_lines(steve.id),
        vec!["You already have an active selection. Use /eregion cancel first."]
    );
}

#[test]
fn clicks_without_sneaking_pass_through() {
    let harness = Harness::bundled().expect("bundled config");
    let steve = harness.join("Steve", BUILDER);
    harness.command(steve.id, "create");
    let standing = harness.snapshot(steve.id).expect("online");

    assert!(!harness
        .plugin
        .on_interact(&standing, Click::LeftBlock(BlockPos::new(1, 2, 3))));
    let session = harness.plugin.selections().get(steve.id).expect("session");
    assert_eq!(session.point_a, None);

    let sneaking = sneak(&harness, steve.id);
    assert!(harness.plugin.on_interact(&sneaking, Click::Right));
    assert!(harness.plugin.on_interact(
        &sneaking,
        Click::LeftAir {
            target: Some(BlockPos::new(4, 5, 6))
        }
    ));
    let session = harness.plugin.selections().get(steve.id).expect("session");
    assert_eq!(
        session.point_a.map(|point| point.pos),
        Some(BlockPos::new(4, 5, 6))
    );
}

#[test]
fn members_are_managed_by_owners_only() {
    let (harness, steve) = with_base();
    let alex = harness.join("Alex", BUILDER);
    harness.host.take();

    harness.command(steve.id, "member add base1 alex");
    assert!(
        harness
            .plugin
            .regions()
            .is_member(Harness::WORLD, "base1", alex.id)
    );
    assert_eq!(
        harness.host.chat_lines(steve.id),
        vec!["Alex is now a member of base1."]
    );

    harness.command(alex.id, "member remove base1 Steve");
    assert_eq!(
        harness.host.chat_lines(alex.id),
        vec!["You are not an owner of base1."]
    );

    harness.command(steve.id, "member add base1 Nobody");
    assert!(
        harness
            .host
            .chat_lines(steve.id)
            .contains(&"Player Nobody is not online.".to_string())
    );
}

#[test]
fn flags_need_a_per_flag_permission() {
    let (harness, steve) = with_base();
    harness
        .host
        .grant(steve.id, "eregions.region.flag.flags.pvp.*");
    harness.host.take();

    harness.command(steve.id, "flag add base1 pvp");
    harness.command(steve.id, "flag add base1 tnt");
    harness.command(steve.id, "flag add base1");
    assert_eq!(
        harness.host.chat_lines(steve.id),
        vec![
            "Flag pvp set on base1.",
            "You may not change the tnt flag.",
            "Name a flag: /eregion flag add base1 <flag>",
        ]
    );

    let flags = harness
        .plugin
        .regions()
        .flags(Harness::WORLD, "base1")
        .expect("flags");
    assert!(flags.contains(&"pvp=allow".to_string()));

    harness.command(steve.id, "flag remove base1 pvp");
    let flags = harness
        .plugin
        .regions()
        .flags(Harness::WORLD, "base1")
        .expect("flags");
    assert!(!flags.iter().any(|flag| flag.starts_with("pvp=")));
}

#[test]
fn move_and_size_reshape_the_selection() {
    let (harness, steve) = with_base();
    harness.host.take();

    harness.command(steve.id, "move +10");
    harness.command(steve.id, "size up 5");
    harness.command(steve.id, "size sideways 5");

    let (_, bounds) = harness
        .plugin
        .selections()
        .get(steve.id)
        .and_then(|session| session.bounds())
        .expect("completed selection");
    assert_eq!(bounds.min(), BlockPos::new(10, 64, 20));
    assert_eq!(bounds.max(), BlockPos::new(20, 75, 30));

    let lines = harness.host.chat_lines(steve.id);
    assert_eq!(
        lines,
        vec![
            "Selection moved by 10 blocks.",
            "Selection resized by 5 blocks (up).",
            "The direction must be up, down or face.",
        ]
    );

    harness.run_ticks(10);
    let visualized = harness
        .host
        .deliveries()
        .into_iter()
        .filter(|delivery| {
            matches!(delivery, Delivery::PlayerCommand { line, .. } if line == "svis we")
        })
        .count();
    assert_eq!(visualized, 2);
}

#[test]
fn oversized_distances_are_refused() {
    let (harness, steve) = with_base();
    let before = harness.plugin.selections().get(steve.id);
    harness.host.take();

    harness.command(steve.id, "size up +2147483647");
    harness.command(steve.id, "size down -2147483648");
    harness.command(steve.id, "move +2147483647");
    assert_eq!(
        harness.host.chat_lines(steve.id),
        vec!["Invalid distance. Use +10 or -5."; 3]
    );
    assert_eq!(harness.plugin.selections().get(steve.id), before);
}

#[test]
fn reshape_without_a_selection_is_refused() {
    let harness = Harness::bundled().expect("bundled config");
    let steve = harness.join("Steve", BUILDER);

    harness.command(steve.id, "move 3");
    assert_eq!(
        harness.host.chat_lines(steve.id),
        vec!["You have no completed selection. Select both corners first."]
    );
}

#[test]
fn removing_a_region_forgets_it() {
    let (harness, steve) = with_base();
    harness.host.take();

    harness.command(steve.id, "remove base1");
    assert!(
        harness
            .plugin
            .regions()
            .region_ids(Harness::WORLD)
            .is_empty()
    );
    assert_eq!(
        harness.host.chat_lines(steve.id),
        vec!["Region base1 removed."]
    );
}

#[test]
fn admin_flag_bypasses_ownership() {
    let (harness, _) = with_base();
    harness.host.take();

    harness.console("admin flag base1 pvp deny members owners");
    let region = harness
        .plugin
        .regions()
        .region(Harness::WORLD, "base1")
        .expect("directory")
        .expect("region");
    assert!(region.flag("pvp").is_some());
    assert_eq!(
        harness.host.deliveries(),
        vec![Delivery::Console(
            "Set pvp=deny on base1 for members, owners.".to_string()
        )]
    );

    harness.host.take();
    harness.console("admin flag base1 pvp allow silent");
    assert!(harness.host.deliveries().is_empty());
}

#[test]
fn boundary_fires_near_created_regions() {
    let (harness, _) = with_base();
    let walker = harness.join("Walker", &[permission::REGION_VIEW]);
    harness.host.update(walker.id, |snapshot| {
        snapshot.position = eregions_utils::Vector3::new(23.0, 65.0, 15.0);
    });
    let walker = harness.snapshot(walker.id).expect("online");

    assert_eq!(
        harness.plugin.boundary().check_boundary(&walker),
        Some("base1".to_string())
    );
    harness.clock.advance(1000);
    assert_eq!(harness.plugin.boundary().check_boundary(&walker), None);

    harness.run_ticks(2);
    assert!(harness.host.deliveries().iter().any(|delivery| matches!(
        delivery,
        Delivery::ActionBar { player, text } if *player == walker.id && text.contains("base1")
    )));
}

#[test]
fn tab_completion_lists_owned_regions() {
    let (harness, steve) = with_base();
    let sender = CommandSender::Player(steve);

    assert_eq!(
        harness.plugin.tab_complete(&sender, &["remove", "b"]),
        vec!["base1"]
    );
    assert_eq!(
        harness.plugin.tab_complete(&sender, &["flag", "add", "base1", "p"]),
        Vec::<String>::new()
    );
}

/// A player awaiting a name for a selection while standing near `base1`.
fn mid_selection_near_base(harness: &Harness, name: &str) -> PlayerSnapshot {
    let mut permissions = BUILDER.to_vec();
    permissions.push(permission::REGION_VIEW);
    let player = harness.join(name, &permissions);
    select(
        harness,
        player.id,
        BlockPos::new(40, 64, 40),
        BlockPos::new(45, 70, 45),
    );
    harness.host.update(player.id, |snapshot| {
        snapshot.position = eregions_utils::Vector3::new(23.0, 65.0, 15.0);
    });
    let player = harness.snapshot(player.id).expect("online");
    assert_eq!(
        harness.plugin.boundary().check_boundary(&player),
        Some("base1".to_string())
    );
    assert!(harness.plugin.selections().is_awaiting_name(player.id));
    player
}

fn assert_forgotten(harness: &Harness, player: PlayerId) {
    let selections = harness.plugin.selections();
    assert!(!selections.has_active(player));
    assert!(!selections.is_awaiting_name(player));
    assert_eq!(harness.tool.selection(player).ok().flatten(), None);
    assert_eq!(harness.plugin.boundary().state(player), None);
}

#[test]
fn quitting_forgets_selection_and_boundary_state() {
    let (harness, _) = with_base();
    let alex = mid_selection_near_base(&harness, "Alex");

    harness.plugin.on_quit(&alex);
    assert_forgotten(&harness, alex.id);

    // Nothing left to clear is fine too.
    harness.plugin.on_quit(&alex);
    assert_forgotten(&harness, alex.id);
}

#[test]
fn dying_forgets_selection_and_boundary_state() {
    let (harness, _) = with_base();
    let alex = mid_selection_near_base(&harness, "Alex");

    harness.plugin.on_death(&alex);
    assert_forgotten(&harness, alex.id);
    assert!(!harness.plugin.on_chat(&alex, "base2"));
    assert_eq!(
        harness.plugin.regions().region_ids(Harness::WORLD),
        vec!["base1"]
    );
}
