//! A host with no game server behind it. Players are simulated and everything shown to them
//! is written to the log.

use eregions_core::host::{
    CommandDispatch, PermissionOracle, PlayerDirectory, PlayerSnapshot, Presentation, TitleTimes,
};
use eregions_core::permission;
use eregions_utils::PlayerId;
use eregions_utils::text::strip_formatting;

/// Nodes every simulated player starts with.
pub const DEFAULT_GRANTS: &[&str] = &["eregions.*", "worldguard.region.flag.flags.*"];

pub struct SimHost {
    default_world: String,
    players: scc::HashMap<PlayerId, PlayerSnapshot>,
    grants: scc::HashMap<PlayerId, Vec<String>>,
}

impl SimHost {
    pub fn new(default_world: impl Into<String>) -> Self {
        Self {
            default_world: default_world.into(),
            players: scc::HashMap::new(),
            grants: scc::HashMap::new(),
        }
    }

    /// Brings a player online in the default world. Returns `None` if the name is taken.
    pub fn join(&self, name: &str) -> Option<PlayerSnapshot> {
        if self.player_by_name(name).is_some() {
            return None;
        }
        let player = PlayerSnapshot::new(PlayerId::random(), name, self.default_world.clone());
        let grants = DEFAULT_GRANTS.iter().map(ToString::to_string).collect();
        let _ = self.players.insert_sync(player.id, player.clone());
        let _ = self.grants.insert_sync(player.id, grants);
        tracing::info!("{name} joined the game");
        Some(player)
    }

    pub fn leave(&self, player: PlayerId) {
        if let Some((_, snapshot)) = self.players.remove_sync(&player) {
            self.grants.remove_sync(&player);
            tracing::info!("{} left the game", snapshot.name);
        }
    }

    /// Applies `change` to an online player and returns the new snapshot.
    pub fn update(
        &self,
        player: PlayerId,
        change: impl FnOnce(&mut PlayerSnapshot),
    ) -> Option<PlayerSnapshot> {
        self.players.update_sync(&player, |_, snapshot| {
            change(snapshot);
            snapshot.clone()
        })
    }

    pub fn grant(&self, player: PlayerId, node: &str) {
        let added = self
            .grants
            .update_sync(&player, |_, granted| granted.push(node.to_string()));
        if added.is_none() {
            let _ = self.grants.insert_sync(player, vec![node.to_string()]);
        }
    }

    /// Takes back a node granted earlier. Returns false if it was not granted as written.
    pub fn revoke(&self, player: PlayerId, node: &str) -> bool {
        self.grants
            .update_sync(&player, |_, granted| {
                let before = granted.len();
                granted.retain(|existing| existing != node);
                granted.len() != before
            })
            .unwrap_or(false)
    }

    fn name_of(&self, player: PlayerId) -> String {
        self.players
            .read_sync(&player, |_, snapshot| snapshot.name.clone())
            .unwrap_or_else(|| player.to_string())
    }
}

impl PlayerDirectory for SimHost {
    fn player(&self, id: PlayerId) -> Option<PlayerSnapshot> {
        self.players.read_sync(&id, |_, snapshot| snapshot.clone())
    }

    fn player_by_name(&self, name: &str) -> Option<PlayerSnapshot> {
        let mut found = None;
        self.players.iter_sync(|_, snapshot| {
            if snapshot.name.eq_ignore_ascii_case(name) {
                found = Some(snapshot.clone());
                return false;
            }
            true
        });
        found
    }

    fn online_players(&self) -> Vec<PlayerSnapshot> {
        let mut players = Vec::with_capacity(self.players.len());
        self.players.iter_sync(|_, snapshot| {
            players.push(snapshot.clone());
            true
        });
        players.sort_by(|a, b| a.name.cmp(&b.name));
        players
    }

    fn default_world(&self) -> String {
        self.default_world.clone()
    }
}

impl PermissionOracle for SimHost {
    fn has_permission(&self, player: PlayerId, node: &str) -> bool {
        self.grants
            .read_sync(&player, |_, granted| {
                granted.iter().any(|grant| permission::covers(grant, node))
            })
            .unwrap_or(false)
    }

    fn effective_permissions(&self, player: PlayerId) -> Vec<String> {
        self.grants
            .read_sync(&player, |_, granted| granted.clone())
            .unwrap_or_default()
    }
}

impl Presentation for SimHost {
    fn send_chat(&self, player: PlayerId, text: &str) {
        tracing::info!(target: "chat", "[to {}] {}", self.name_of(player), strip_formatting(text));
    }

    fn send_action_bar(&self, player: PlayerId, text: &str) {
        if text.is_empty() {
            tracing::debug!(target: "actionbar", "[to {}] cleared", self.name_of(player));
            return;
        }
        tracing::info!(target: "actionbar", "[to {}] {}", self.name_of(player), strip_formatting(text));
    }

    fn send_title(&self, player: PlayerId, title: &str, subtitle: &str, times: TitleTimes) {
        tracing::info!(
            target: "title",
            stay = times.stay,
            "[to {}] {} / {}",
            self.name_of(player),
            strip_formatting(title),
            strip_formatting(subtitle)
        );
    }

    fn broadcast(&self, text: &str) {
        tracing::info!(target: "chat", "[all] {}", strip_formatting(text));
    }

    fn send_console(&self, text: &str) {
        tracing::info!(target: "console", "{}", strip_formatting(text));
    }
}

impl CommandDispatch for SimHost {
    fn dispatch_as_player(&self, player: PlayerId, line: &str) -> bool {
        tracing::info!(target: "dispatch", "{} ran /{line}", self.name_of(player));
        true
    }

    fn dispatch_as_console(&self, line: &str) -> bool {
        tracing::info!(target: "dispatch", "CONSOLE ran /{line}");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_grants_defaults() {
        let host = SimHost::new("world");
        let steve = host.join("Steve").expect("joined");

        assert!(host.join("steve").is_none());
        assert_eq!(host.player_by_name("STEVE").map(|p| p.id), Some(steve.id));
        assert!(host.has_permission(steve.id, permission::REGION_CREATE));
        assert!(host.has_permission(steve.id, "worldguard.region.flag.flags.pvp.*"));

        assert!(host.revoke(steve.id, "eregions.*"));
        assert!(!host.has_permission(steve.id, permission::REGION_CREATE));
        host.grant(steve.id, permission::REGION_CREATE);
        assert!(host.has_permission(steve.id, permission::REGION_CREATE));
    }

    #[test]
    fn test_leave_forgets_player() {
        let host = SimHost::new("world");
        let alex = host.join("Alex").expect("joined");
        host.leave(alex.id);

        assert!(!host.is_online(alex.id));
        assert!(host.effective_permissions(alex.id).is_empty());
        assert!(host.update(alex.id, |p| p.sneaking = true).is_none());
    }
}
