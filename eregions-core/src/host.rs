//! Ports to the game server hosting the plugin.
//!
//! The plugin never talks to a concrete server. Everything it needs from the outside world
//! (who is online, what they may do, how to show them text, how to run a command line) goes
//! through the traits in this module, so a real server, the standalone binary and the tests
//! can all drive the same code.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use eregions_utils::{PlayerId, Vector3};

/// A point-in-time view of an online player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    /// Stable identity.
    pub id: PlayerId,
    /// Login name.
    pub name: String,
    /// Display name, possibly decorated.
    pub display_name: String,
    /// Name of the world the player is in.
    pub world: String,
    /// Exact position.
    pub position: Vector3<f64>,
    /// Facing, in degrees. 0 looks towards +z, 90 towards -x.
    pub yaw: f32,
    /// Whether the player is sneaking.
    pub sneaking: bool,
}

impl PlayerSnapshot {
    /// Creates a snapshot of a player standing at the world origin.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, world: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            display_name: name.clone(),
            name,
            world: world.into(),
            position: Vector3::new(0.0, 0.0, 0.0),
            yaw: 0.0,
            sneaking: false,
        }
    }
}

/// Looks up players.
pub trait PlayerDirectory: Send + Sync {
    /// Returns a snapshot of the player if they are online.
    fn player(&self, id: PlayerId) -> Option<PlayerSnapshot>;

    /// Finds an online player by exact login name, ignoring case.
    fn player_by_name(&self, name: &str) -> Option<PlayerSnapshot>;

    /// All players currently online.
    fn online_players(&self) -> Vec<PlayerSnapshot>;

    /// Returns true if the player is online.
    fn is_online(&self, id: PlayerId) -> bool {
        self.player(id).is_some()
    }

    /// The world used when a command does not name one.
    fn default_world(&self) -> String;
}

/// Answers permission questions.
pub trait PermissionOracle: Send + Sync {
    /// Returns true if the player holds the permission node.
    fn has_permission(&self, player: PlayerId, node: &str) -> bool;

    /// Every node effectively granted to the player.
    fn effective_permissions(&self, player: PlayerId) -> Vec<String>;

    /// Numeric value of a permission.
    ///
    /// Returns the largest `n` among granted `node.<n>` permissions, 1 when only the bare node is
    /// granted, and 0 otherwise.
    fn permission_value(&self, player: PlayerId, node: &str) -> u32 {
        let prefix = format!("{node}.");
        let best = self
            .effective_permissions(player)
            .iter()
            .filter_map(|granted| granted.strip_prefix(&prefix)?.parse::<u32>().ok())
            .max();

        match best {
            Some(value) => value,
            None if self.has_permission(player, node) => 1,
            None => 0,
        }
    }
}

/// Fade timings of a title, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleTimes {
    /// Fade in duration.
    pub fade_in: u32,
    /// Time fully shown.
    pub stay: u32,
    /// Fade out duration.
    pub fade_out: u32,
}

impl TitleTimes {
    /// Timings used by triggers: a 10 tick fade around `seconds` of display.
    #[must_use]
    pub const fn for_seconds(seconds: u32) -> Self {
        Self {
            fade_in: 10,
            stay: seconds * 20,
            fade_out: 10,
        }
    }
}

/// Shows text to players and the console.
///
/// All text handed to these methods is already formatted with section-sign codes.
pub trait Presentation: Send + Sync {
    /// Sends a chat line.
    fn send_chat(&self, player: PlayerId, text: &str);
    /// Replaces the action bar. An empty string clears it.
    fn send_action_bar(&self, player: PlayerId, text: &str);
    /// Shows a title and subtitle.
    fn send_title(&self, player: PlayerId, title: &str, subtitle: &str, times: TitleTimes);
    /// Sends a chat line to everyone online.
    fn broadcast(&self, text: &str);
    /// Writes a line to the server console.
    fn send_console(&self, text: &str);
}

/// Runs command lines.
pub trait CommandDispatch: Send + Sync {
    /// Runs `line` (without a leading slash) with the player's permissions.
    /// Returns false if the command was unknown or failed.
    fn dispatch_as_player(&self, player: PlayerId, line: &str) -> bool;
    /// Runs `line` (without a leading slash) as the console.
    fn dispatch_as_console(&self, line: &str) -> bool;
}

/// Everything the plugin needs from its server.
pub trait Host: PlayerDirectory + PermissionOracle + Presentation + CommandDispatch {}

impl<T> Host for T where T: PlayerDirectory + PermissionOracle + Presentation + CommandDispatch {}

/// A source of wall-clock time in milliseconds.
pub trait Clock: Send + Sync {
    /// Milliseconds since the unix epoch.
    fn now_millis(&self) -> u64;
}

/// The system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
            })
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Creates a clock reading `start_millis`.
    #[must_use]
    pub const fn new(start_millis: u64) -> Self {
        Self {
            now: AtomicU64::new(start_millis),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Grants(Vec<String>);

    impl PermissionOracle for Grants {
        fn has_permission(&self, _player: PlayerId, node: &str) -> bool {
            self.0.iter().any(|granted| granted == node)
        }

        fn effective_permissions(&self, _player: PlayerId) -> Vec<String> {
            self.0.clone()
        }
    }

    #[test]
    fn test_permission_value_takes_largest_suffix() {
        let oracle = Grants(vec![
            "eregions.limit.3".to_string(),
            "eregions.limit.12".to_string(),
            "eregions.limit.abc".to_string(),
        ]);
        assert_eq!(oracle.permission_value(PlayerId::random(), "eregions.limit"), 12);
    }

    #[test]
    fn test_permission_value_bare_node_and_missing() {
        let player = PlayerId::random();
        let bare = Grants(vec!["eregions.limit".to_string()]);
        assert_eq!(bare.permission_value(player, "eregions.limit"), 1);

        let none = Grants(Vec::new());
        assert_eq!(none.permission_value(player, "eregions.limit"), 0);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_000);
        clock.advance(500);
        assert_eq!(clock.now_millis(), 1_500);
    }

    #[test]
    fn test_title_times() {
        assert_eq!(
            TitleTimes::for_seconds(3),
            TitleTimes {
                fade_in: 10,
                stay: 60,
                fade_out: 10
            }
        );
    }
}
