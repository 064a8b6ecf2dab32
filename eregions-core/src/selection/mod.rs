//! Interactive region selection.
//!
//! A session moves through three stages. While [`Stage::Selecting`] the player picks two
//! corners by sneak-clicking. Once both are set the session waits for a name typed in chat
//! ([`Stage::AwaitingName`]). After the region is created the session stays around as
//! [`Stage::Finalized`] so `move` and `size` can still work on the corners.

pub mod tool;

use std::sync::Arc;

use eregions_utils::ticks::ms_to_ticks;
use eregions_utils::{BlockPos, Cuboid, PlayerId};
use thiserror::Error;

pub use tool::{MemorySelectionTool, SelectionTool, ToolError, ToolSelection};

use crate::config::ConfigStore;
use crate::host::{Clock, PlayerDirectory, PlayerSnapshot};
use crate::region::{CreateRegionError, Region, RegionService};
use crate::trigger::{CommandTriggerManager, TriggerContext};

/// The only selection kind used so far.
pub const KIND_CREATE: &str = "create";

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Waiting for corner clicks.
    Selecting,
    /// Both corners are set and a name is expected in chat.
    AwaitingName,
    /// The region exists. The corners stay for `move` and `size`.
    Finalized,
}

/// A picked corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPoint {
    /// The world the corner is in.
    pub world: String,
    /// The clicked block.
    pub pos: BlockPos,
}

/// One player's selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSession {
    /// The selecting player.
    pub owner: PlayerId,
    /// What the selection is for, see [`KIND_CREATE`].
    pub kind: String,
    /// The first corner clicked.
    pub point_a: Option<SelectionPoint>,
    /// The second corner clicked.
    pub point_b: Option<SelectionPoint>,
    /// Both points are set.
    pub completed: bool,
    /// Lifecycle stage.
    pub stage: Stage,
    /// Wall-clock milliseconds at creation.
    pub created_at: u64,
}

impl SelectionSession {
    /// The selected box, once both corners are in.
    #[must_use]
    pub fn bounds(&self) -> Option<(String, Cuboid)> {
        let a = self.point_a.as_ref()?;
        let b = self.point_b.as_ref()?;
        Some((a.world.clone(), Cuboid::from_corners(a.pos, b.pos)))
    }
}

/// What a click did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointOutcome {
    /// The player has no session.
    NoSession,
    /// The session is not picking points any more.
    Ignored,
    /// The first corner was set. Also returned when a click in another world restarts.
    First(BlockPos),
    /// The second corner was set and the session now waits for a name.
    Completed { first: BlockPos, second: BlockPos },
}

/// Why naming a selection failed.
#[derive(Debug, Error)]
pub enum FinalizeError {
    /// The player has no selection waiting for a name.
    #[error("no selection is waiting for a name")]
    NotAwaitingName,
    /// The region could not be created.
    #[error(transparent)]
    Create(#[from] CreateRegionError),
}

/// Why a move or resize was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReshapeError {
    /// The player has no selection with both corners set.
    #[error("no completed selection")]
    NoCompletedSelection,
    /// A corner would leave the `i32` coordinate range.
    #[error("the selection would leave the world's coordinate range")]
    OutOfRange,
}

/// Owns every player's selection session.
pub struct SelectionManager {
    sessions: scc::HashMap<PlayerId, SelectionSession>,
    tool: Arc<dyn SelectionTool>,
    regions: Arc<RegionService>,
    triggers: Arc<CommandTriggerManager>,
    config: Arc<ConfigStore>,
    clock: Arc<dyn Clock>,
}

impl SelectionManager {
    /// Creates a manager with no sessions.
    #[must_use]
    pub fn new(
        tool: Arc<dyn SelectionTool>,
        regions: Arc<RegionService>,
        triggers: Arc<CommandTriggerManager>,
        config: Arc<ConfigStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions: scc::HashMap::new(),
            tool,
            regions,
            triggers,
            config,
            clock,
        }
    }

    /// Opens a session. Returns false, leaving the existing session untouched, if the player
    /// already has one.
    pub fn start_selection(&self, player: &PlayerSnapshot, kind: &str) -> bool {
        let session = SelectionSession {
            owner: player.id,
            kind: kind.to_string(),
            point_a: None,
            point_b: None,
            completed: false,
            stage: Stage::Selecting,
            created_at: self.clock.now_millis(),
        };
        if self.sessions.insert_sync(player.id, session).is_err() {
            log::debug!("{} already has a selection session", player.name);
            return false;
        }

        if let Err(error) = self.tool.enable_selection(player.id) {
            log::error!("Failed to enable selection for {}: {error}", player.name);
        }
        log::debug!("{} started a '{kind}' selection", player.name);
        true
    }

    /// Records a clicked corner.
    pub fn record_point(&self, player: &PlayerSnapshot, pos: BlockPos) -> PointOutcome {
        let world = player.world.clone();
        let outcome = self
            .sessions
            .update_sync(&player.id, |_, session| {
                if session.stage != Stage::Selecting {
                    return PointOutcome::Ignored;
                }
                let point = SelectionPoint {
                    world: world.clone(),
                    pos,
                };
                match &session.point_a {
                    Some(first) if first.world == world => {
                        let first = first.pos;
                        session.point_b = Some(point);
                        session.completed = true;
                        session.stage = Stage::AwaitingName;
                        PointOutcome::Completed { first, second: pos }
                    }
                    _ => {
                        session.point_a = Some(point);
                        PointOutcome::First(pos)
                    }
                }
            })
            .unwrap_or(PointOutcome::NoSession);

        match &outcome {
            PointOutcome::First(first) => {
                self.sync_tool(player, *first, *first);
                self.triggers
                    .execute("first-point-selected", player, &TriggerContext::default());
            }
            PointOutcome::Completed { first, second } => {
                self.sync_tool(player, *first, *second);
                log::debug!(
                    "{} completed a selection {}",
                    player.name,
                    Cuboid::from_corners(*first, *second)
                );
                self.schedule_completion(player.id);
            }
            PointOutcome::NoSession | PointOutcome::Ignored => {}
        }
        outcome
    }

    /// Queues the follow-up triggers, each one message delay after the previous.
    fn schedule_completion(&self, player: PlayerId) {
        let step = ms_to_ticks(self.config.get().settings.message_delay_ms);
        let plan = ["second-point-selected", "selection-completed"]
            .into_iter()
            .scan(0, |delay, name| {
                *delay += step;
                Some((*delay, name))
            });
        for (delay, name) in plan {
            self.triggers
                .schedule_trigger(name, player, TriggerContext::default(), delay);
        }
    }

    /// Creates the region from a session waiting for a name.
    ///
    /// On success the session is kept as [`Stage::Finalized`] and `region-created` fires.
    /// On failure the session is left as it was.
    ///
    /// # Errors
    /// See [`FinalizeError`].
    pub fn finalize_with_name(
        &self,
        player: &PlayerSnapshot,
        name: &str,
    ) -> Result<Region, FinalizeError> {
        let session = self
            .get(player.id)
            .filter(|session| session.stage == Stage::AwaitingName)
            .ok_or(FinalizeError::NotAwaitingName)?;
        let (Some(a), Some(b)) = (session.point_a, session.point_b) else {
            return Err(FinalizeError::NotAwaitingName);
        };

        let region = self
            .regions
            .create_region(&a.world, name, a.pos, b.pos, player)?;

        self.sessions.update_sync(&player.id, |_, session| {
            session.stage = Stage::Finalized;
        });
        self.triggers.execute(
            "region-created",
            player,
            &TriggerContext::region(region.id.clone()),
        );
        Ok(region)
    }

    /// Ends the session and switches off point picking. The tool is cleared even without a
    /// session. Returns false if there was none.
    pub fn cancel(&self, player: PlayerId) -> bool {
        let removed = self.sessions.remove_sync(&player).is_some();
        if let Err(error) = self.tool.clear_selection(player) {
            log::error!("Failed to clear tool selection of {player}: {error}");
        }
        removed
    }

    /// Forgets the session but leaves the tool's selection visible.
    /// Returns false if there was none.
    pub fn clear(&self, player: PlayerId) -> bool {
        self.sessions.remove_sync(&player).is_some()
    }

    /// True while the player has a session in any stage.
    #[must_use]
    pub fn has_active(&self, player: PlayerId) -> bool {
        self.sessions.read_sync(&player, |_, _| ()).is_some()
    }

    /// True while the player's selection waits for a name.
    #[must_use]
    pub fn is_awaiting_name(&self, player: PlayerId) -> bool {
        self.sessions
            .read_sync(&player, |_, session| session.stage == Stage::AwaitingName)
            .unwrap_or(false)
    }

    /// A copy of the player's session.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<SelectionSession> {
        self.sessions.read_sync(&player, |_, session| session.clone())
    }

    /// Replaces the corners of a completed selection with `reshape` applied to its box.
    ///
    /// Returns the world and new box. `reshape` returns `None` when the new box would leave
    /// the coordinate range, and the session is then left as it was.
    ///
    /// # Errors
    /// See [`ReshapeError`].
    pub fn reshape(
        &self,
        player: &PlayerSnapshot,
        reshape: impl FnOnce(Cuboid) -> Option<Cuboid>,
    ) -> Result<(String, Cuboid), ReshapeError> {
        let reshaped = self
            .sessions
            .update_sync(&player.id, |_, session| {
                if !session.completed {
                    return Err(ReshapeError::NoCompletedSelection);
                }
                let (world, bounds) = session
                    .bounds()
                    .ok_or(ReshapeError::NoCompletedSelection)?;
                let bounds = reshape(bounds).ok_or(ReshapeError::OutOfRange)?;
                session.point_a = Some(SelectionPoint {
                    world: world.clone(),
                    pos: bounds.min(),
                });
                session.point_b = Some(SelectionPoint {
                    world: world.clone(),
                    pos: bounds.max(),
                });
                Ok((world, bounds))
            })
            .unwrap_or(Err(ReshapeError::NoCompletedSelection))?;

        let (world, bounds) = &reshaped;
        if let Err(error) = self
            .tool
            .set_selection(player.id, world, bounds.min(), bounds.max())
        {
            log::error!("Failed to update tool selection of {}: {error}", player.name);
        }
        Ok(reshaped)
    }

    /// Drops sessions of players who are no longer online. Returns how many were dropped.
    pub fn cleanup_inactive<P: PlayerDirectory + ?Sized>(&self, players: &P) -> usize {
        let mut stale = Vec::new();
        self.sessions.iter_sync(|id, _| {
            if !players.is_online(*id) {
                stale.push(*id);
            }
            true
        });
        for id in &stale {
            self.sessions.remove_sync(id);
        }
        if !stale.is_empty() {
            log::debug!("Dropped {} stale selection sessions", stale.len());
        }
        stale.len()
    }

    /// Number of open sessions.
    /// Number of open sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True when nobody is selecting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn sync_tool(&self, player: &PlayerSnapshot, first: BlockPos, second: BlockPos) {
        if let Err(error) = self
            .tool
            .set_selection(player.id, &player.world, first, second)
        {
            log::error!("Failed to update tool selection of {}: {error}", player.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission;
    use crate::testing::Harness;

    const CONFIG: &str = r#"{
        settings: { message_delay_ms: 100 },
        command_triggers: {
            "first-point-selected": { commands: ["chat! first"] },
            "second-point-selected": { commands: ["chat! second"] },
            "selection-completed": { commands: ["chat! completed"] },
            "region-created": { commands: ["chat! created {region_name}"] },
        },
    }"#;

    fn harness() -> (Harness, PlayerSnapshot) {
        let harness = Harness::from_json5(CONFIG).expect("config");
        let player = harness.join("Alex", &[permission::REGION_CREATE]);
        (harness, player)
    }

    #[test]
    fn test_second_start_leaves_session_untouched() {
        let (harness, player) = harness();
        let selections = harness.plugin.selections();
        assert!(selections.start_selection(&player, KIND_CREATE));
        selections.record_point(&player, BlockPos::new(1, 2, 3));

        assert!(!selections.start_selection(&player, KIND_CREATE));
        let session = selections.get(player.id).expect("session");
        assert_eq!(session.point_a.map(|point| point.pos), Some(BlockPos::new(1, 2, 3)));
        assert_eq!(session.stage, Stage::Selecting);
    }

    #[test]
    fn test_points_keep_click_order() {
        let (harness, player) = harness();
        let selections = harness.plugin.selections();
        selections.start_selection(&player, KIND_CREATE);

        let first = BlockPos::new(20, 70, 20);
        let second = BlockPos::new(10, 64, 10);
        assert_eq!(selections.record_point(&player, first), PointOutcome::First(first));
        assert_eq!(
            selections.record_point(&player, second),
            PointOutcome::Completed { first, second }
        );
        assert_eq!(
            selections.record_point(&player, first),
            PointOutcome::Ignored
        );

        let session = selections.get(player.id).expect("session");
        assert_eq!(session.point_a.map(|point| point.pos), Some(first));
        assert_eq!(session.point_b.map(|point| point.pos), Some(second));
        assert!(session.completed);
        assert_eq!(session.stage, Stage::AwaitingName);
        assert_eq!(
            harness
                .tool
                .selection(player.id)
                .ok()
                .flatten()
                .map(|selection| selection.bounds()),
            Some(Cuboid::from_corners(first, second))
        );
    }

    #[test]
    fn test_completion_triggers_follow_message_delay() {
        let (harness, player) = harness();
        let selections = harness.plugin.selections();
        selections.start_selection(&player, KIND_CREATE);
        selections.record_point(&player, BlockPos::new(0, 0, 0));
        selections.record_point(&player, BlockPos::new(5, 5, 5));

        harness.run_ticks(1);
        assert_eq!(harness.host.chat_lines(player.id), vec!["first"]);
        harness.run_ticks(1);
        assert_eq!(harness.host.chat_lines(player.id), vec!["first"]);
        // 100 ms is two ticks: the fired trigger's own action lands one tick later.
        harness.run_ticks(1);
        assert_eq!(harness.host.chat_lines(player.id), vec!["first", "second"]);
        harness.run_ticks(2);
        assert_eq!(
            harness.host.chat_lines(player.id),
            vec!["first", "second", "completed"]
        );
    }

    #[test]
    fn test_click_in_other_world_restarts() {
        let (harness, player) = harness();
        let selections = harness.plugin.selections();
        selections.start_selection(&player, KIND_CREATE);
        selections.record_point(&player, BlockPos::new(0, 0, 0));

        let mut nether = player.clone();
        nether.world = "nether".into();
        let pos = BlockPos::new(9, 9, 9);
        assert_eq!(selections.record_point(&nether, pos), PointOutcome::First(pos));
        let session = selections.get(player.id).expect("session");
        assert_eq!(session.point_a.map(|point| point.world), Some("nether".into()));
        assert!(session.point_b.is_none());
    }

    #[test]
    fn test_finalize_creates_region() {
        let (harness, player) = harness();
        let selections = harness.plugin.selections();
        assert!(matches!(
            selections.finalize_with_name(&player, "base"),
            Err(FinalizeError::NotAwaitingName)
        ));

        selections.start_selection(&player, KIND_CREATE);
        selections.record_point(&player, BlockPos::new(0, 60, 0));
        selections.record_point(&player, BlockPos::new(10, 70, 10));
        let region = selections
            .finalize_with_name(&player, "Base")
            .expect("created");
        assert_eq!(region.id, "base");
        assert!(region.is_owner(player.id));
        assert_eq!(
            selections.get(player.id).map(|session| session.stage),
            Some(Stage::Finalized)
        );

        harness.host.take();
        harness.run_ticks(10);
        assert!(
            harness
                .host
                .chat_lines(player.id)
                .contains(&"created base".to_string())
        );
    }

    #[test]
    fn test_reshape_needs_completed_selection() {
        let (harness, player) = harness();
        let selections = harness.plugin.selections();
        selections.start_selection(&player, KIND_CREATE);
        selections.record_point(&player, BlockPos::new(0, 0, 0));
        assert_eq!(
            selections.reshape(&player, Some),
            Err(ReshapeError::NoCompletedSelection)
        );

        selections.record_point(&player, BlockPos::new(4, 4, 4));
        let (world, bounds) = selections
            .reshape(&player, |bounds| {
                Some(Cuboid::from_corners(
                    bounds.min(),
                    bounds.max().offset(1, 1, 1),
                ))
            })
            .expect("reshaped");
        assert_eq!(world, Harness::WORLD);
        assert_eq!(bounds.max(), BlockPos::new(5, 5, 5));
        let session = selections.get(player.id).expect("session");
        assert_eq!(session.point_b.map(|point| point.pos), Some(BlockPos::new(5, 5, 5)));
    }

    #[test]
    fn test_refused_reshape_keeps_corners() {
        let (harness, player) = harness();
        let selections = harness.plugin.selections();
        selections.start_selection(&player, KIND_CREATE);
        selections.record_point(&player, BlockPos::new(0, 0, 0));
        selections.record_point(&player, BlockPos::new(4, 4, 4));
        let before = selections.get(player.id);

        assert_eq!(
            selections.reshape(&player, |_| None),
            Err(ReshapeError::OutOfRange)
        );
        assert_eq!(selections.get(player.id), before);
    }

    #[test]
    fn test_cleanup_drops_offline_players() {
        let (harness, player) = harness();
        let other = harness.join("Sam", &[]);
        let selections = harness.plugin.selections();
        selections.start_selection(&player, KIND_CREATE);
        selections.start_selection(&other, KIND_CREATE);

        harness.host.leave(other.id);
        assert_eq!(selections.cleanup_inactive(harness.host.as_ref()), 1);
        assert!(selections.has_active(player.id));
        assert!(!selections.has_active(other.id));
    }
}
