//! Tells players when they come close to the edge of a region.
//!
//! Only regions with `regionborder-view` set to allow take part. Detection distance and
//! cooldown come from the `boundary-enter` boundary trigger.

use std::sync::Arc;

use eregions_utils::PlayerId;

use crate::config::{BOUNDARY_ENTER, ConfigStore};
use crate::host::{Clock, Host, PlayerSnapshot};
use crate::permission;
use crate::region::RegionService;
use crate::trigger::{CommandTriggerManager, TriggerContext};

/// Per-player boundary bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryTrackingState {
    /// The region that last fired `boundary-enter` and is still close by.
    pub last_region: Option<String>,
    /// Wall-clock milliseconds of the last firing.
    pub last_trigger_at: Option<u64>,
}

/// Tells players when they come close to the edge of a region with border view on.
pub struct BoundaryDetectionManager {
    states: scc::HashMap<PlayerId, BoundaryTrackingState>,
    last_checked: scc::HashMap<PlayerId, u64>,
    regions: Arc<RegionService>,
    triggers: Arc<CommandTriggerManager>,
    config: Arc<ConfigStore>,
    host: Arc<dyn Host>,
    clock: Arc<dyn Clock>,
}

impl BoundaryDetectionManager {
    /// Creates a tracker with no per-player state.
    #[must_use]
    pub fn new(
        regions: Arc<RegionService>,
        triggers: Arc<CommandTriggerManager>,
        config: Arc<ConfigStore>,
        host: Arc<dyn Host>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            states: scc::HashMap::new(),
            last_checked: scc::HashMap::new(),
            regions,
            triggers,
            config,
            host,
            clock,
        }
    }

    /// Handles a movement, checking at most once per configured tick interval per player.
    ///
    /// Returns the region the trigger fired for, if any.
    pub fn on_move(&self, player: &PlayerSnapshot, tick: u64) -> Option<String> {
        let config = self.config.get();
        if !config.settings.enable_boundary_detection {
            return None;
        }

        let interval = config.settings.boundary_check_interval_ticks;
        let due = self
            .last_checked
            .read_sync(&player.id, |_, last| tick.saturating_sub(*last) >= interval)
            .unwrap_or(true);
        if !due {
            return None;
        }
        if self
            .last_checked
            .update_sync(&player.id, |_, last| *last = tick)
            .is_none()
        {
            let _ = self.last_checked.insert_sync(player.id, tick);
        }

        self.check_boundary(player)
    }

    /// Checks the player against every border-view region of their world.
    ///
    /// Fires `boundary-enter` for the first region within the detection distance that did not
    /// fire last time. Returns that region's id.
    pub fn check_boundary(&self, player: &PlayerSnapshot) -> Option<String> {
        if !self.host.has_permission(player.id, permission::REGION_VIEW) {
            return None;
        }

        let trigger = self.config.get().boundary_enter();
        if !trigger.enabled {
            return None;
        }

        let now = self.clock.now_millis();
        let state = self
            .states
            .read_sync(&player.id, |_, state| state.clone())
            .unwrap_or_default();
        let cooldown_ms = (trigger.cooldown * 1000.0) as u64;
        if let Some(last) = state.last_trigger_at
            && now.saturating_sub(last) < cooldown_ms
        {
            return None;
        }

        let regions = match self.regions.border_view_regions(&player.world) {
            Ok(regions) => regions,
            Err(error) => {
                log::error!("Boundary check failed for {}: {error}", player.name);
                return None;
            }
        };

        let mut next = state.clone();
        let mut fired = None;
        for region in regions {
            let near = region.bounds.distance_to(player.position) <= trigger.distance;
            if near {
                if next.last_region.as_deref() != Some(region.id.as_str()) {
                    next.last_region = Some(region.id.clone());
                    next.last_trigger_at = Some(now);
                    fired = Some(region.id);
                }
                break;
            }
            if next.last_region.as_deref() == Some(region.id.as_str()) {
                next.last_region = None;
            }
        }

        if next != state {
            self.store(player.id, next);
        }
        if let Some(region) = &fired {
            log::debug!("{} is near the boundary of '{region}'", player.name);
            self.triggers
                .execute(BOUNDARY_ENTER, player, &TriggerContext::region(region.clone()));
        }
        fired
    }

    /// Forgets everything about the player.
    pub fn clear(&self, player: PlayerId) {
        self.states.remove_sync(&player);
        self.last_checked.remove_sync(&player);
    }

    /// The tracking state of a player, if anything fired for them yet.
    #[must_use]
    pub fn state(&self, player: PlayerId) -> Option<BoundaryTrackingState> {
        self.states.read_sync(&player, |_, state| state.clone())
    }

    fn store(&self, player: PlayerId, state: BoundaryTrackingState) {
        if let Err((player, state)) = self.states.insert_sync(player, state) {
            self.states.update_sync(&player, |_, existing| *existing = state);
        }
    }
}

#[cfg(test)]
mod tests {
    use eregions_utils::{BlockPos, Vector3};

    use super::*;
    use crate::testing::Harness;

    const CONFIG: &str = r#"{
        settings: { boundary_check_interval_ticks: 20 },
        boundary_triggers: {
            "boundary-enter": {
                distance: 5,
                cooldown: 3,
                commands: ["chat! near {region_name}"],
            },
        },
    }"#;

    fn setup() -> (Harness, PlayerSnapshot) {
        let harness = Harness::from_json5(CONFIG).expect("config");
        let owner = harness.join("Owner", &[]);
        harness
            .plugin
            .regions()
            .create_region(
                Harness::WORLD,
                "base",
                BlockPos::new(0, 60, 0),
                BlockPos::new(10, 70, 10),
                &owner,
            )
            .expect("region");
        let player = harness.join("Walker", &[permission::REGION_VIEW]);
        (harness, player)
    }

    fn at(player: &PlayerSnapshot, x: f64) -> PlayerSnapshot {
        let mut moved = player.clone();
        moved.position = Vector3::new(x, 65.0, 5.0);
        moved
    }

    #[test]
    fn test_fires_once_while_near() {
        let (harness, player) = setup();
        let boundary = harness.plugin.boundary();

        assert_eq!(boundary.check_boundary(&at(&player, 30.0)), None);
        assert_eq!(boundary.check_boundary(&at(&player, 13.0)), Some("base".into()));
        harness.clock.advance(10_000);
        assert_eq!(boundary.check_boundary(&at(&player, 12.0)), None);

        let state = boundary.state(player.id).expect("state");
        assert_eq!(state.last_region.as_deref(), Some("base"));
    }

    #[test]
    fn test_cooldown_blocks_refiring() {
        let (harness, player) = setup();
        let boundary = harness.plugin.boundary();

        assert!(boundary.check_boundary(&at(&player, 13.0)).is_some());
        // Still cooling down on either side of the border.
        assert_eq!(boundary.check_boundary(&at(&player, 30.0)), None);
        harness.clock.advance(1000);
        assert_eq!(boundary.check_boundary(&at(&player, 13.0)), None);

        harness.clock.advance(3000);
        assert_eq!(boundary.check_boundary(&at(&player, 30.0)), None);
        assert_eq!(boundary.check_boundary(&at(&player, 13.0)), Some("base".into()));
    }

    #[test]
    fn test_requires_view_permission() {
        let (harness, _) = setup();
        let blind = harness.join("Blind", &[]);
        assert_eq!(harness.plugin.boundary().check_boundary(&at(&blind, 13.0)), None);
    }

    #[test]
    fn test_moves_are_throttled() {
        let (harness, player) = setup();
        let boundary = harness.plugin.boundary();

        assert_eq!(boundary.on_move(&at(&player, 30.0), 0), None);
        assert_eq!(boundary.on_move(&at(&player, 13.0), 5), None);
        assert_eq!(boundary.on_move(&at(&player, 13.0), 20), Some("base".into()));
    }

    #[test]
    fn test_trigger_renders_region_name() {
        let (harness, player) = setup();
        harness.plugin.boundary().check_boundary(&at(&player, 13.0));
        harness.run_ticks(2);
        assert_eq!(harness.host.chat_lines(player.id), vec!["near base"]);
    }
}
