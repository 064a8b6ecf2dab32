//! The port to the tool that shows a player's selection.

use eregions_utils::{BlockPos, Cuboid, PlayerId};
use rustc_hash::FxHashMap;
use parking_lot::Mutex;
use thiserror::Error;

/// A failure of the selection tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool cannot be reached.
    #[error("selection tool unavailable: {0}")]
    Unavailable(String),
    /// The tool has nothing for this player.
    #[error("player {0} has no selection session")]
    NoSession(PlayerId),
}

/// A selection held by the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSelection {
    /// The first corner.
    pub first: BlockPos,
    /// The second corner.
    pub second: BlockPos,
}

impl ToolSelection {
    /// The box spanned by the corners.
    #[must_use]
    pub fn bounds(&self) -> Cuboid {
        Cuboid::from_corners(self.first, self.second)
    }
}

/// The external editing tool that shows and remembers a player's two corners.
pub trait SelectionTool: Send + Sync {
    /// Turns on point picking for the player.
    ///
    /// # Errors
    /// Fails if the tool cannot be reached.
    fn enable_selection(&self, player: PlayerId) -> Result<(), ToolError>;

    /// Replaces the player's selection.
    ///
    /// # Errors
    /// Fails if the tool cannot be reached.
    fn set_selection(
        &self,
        player: PlayerId,
        world: &str,
        first: BlockPos,
        second: BlockPos,
    ) -> Result<(), ToolError>;

    /// The player's current selection, if any.
    ///
    /// # Errors
    /// Fails if the tool cannot be reached.
    fn selection(&self, player: PlayerId) -> Result<Option<ToolSelection>, ToolError>;

    /// Forgets the player's selection.
    ///
    /// # Errors
    /// Fails if the tool cannot be reached.
    fn clear_selection(&self, player: PlayerId) -> Result<(), ToolError>;
}

#[derive(Debug, Default)]
struct ToolState {
    enabled: bool,
    world: String,
    selection: Option<ToolSelection>,
}

/// A selection tool that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemorySelectionTool {
    players: Mutex<FxHashMap<PlayerId, ToolState>>,
}

impl MemorySelectionTool {
    /// A tool with no selections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if point picking was enabled for the player.
    #[must_use]
    pub fn is_enabled(&self, player: PlayerId) -> bool {
        self.players
            .lock()
            .get(&player)
            .is_some_and(|state| state.enabled)
    }

    /// The world of the player's last selection.
    #[must_use]
    pub fn world(&self, player: PlayerId) -> Option<String> {
        self.players
            .lock()
            .get(&player)
            .filter(|state| state.selection.is_some())
            .map(|state| state.world.clone())
    }
}

impl SelectionTool for MemorySelectionTool {
    fn enable_selection(&self, player: PlayerId) -> Result<(), ToolError> {
        self.players.lock().entry(player).or_default().enabled = true;
        Ok(())
    }

    fn set_selection(
        &self,
        player: PlayerId,
        world: &str,
        first: BlockPos,
        second: BlockPos,
    ) -> Result<(), ToolError> {
        let mut players = self.players.lock();
        let state = players.entry(player).or_default();
        state.world = world.to_string();
        state.selection = Some(ToolSelection { first, second });
        Ok(())
    }

    fn selection(&self, player: PlayerId) -> Result<Option<ToolSelection>, ToolError> {
        Ok(self
            .players
            .lock()
            .get(&player)
            .and_then(|state| state.selection))
    }

    fn clear_selection(&self, player: PlayerId) -> Result<(), ToolError> {
        self.players.lock().remove(&player);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_tool() {
        let tool = MemorySelectionTool::new();
        let player = PlayerId::random();
        assert!(!tool.is_enabled(player));

        tool.enable_selection(player).expect("enable");
        tool.set_selection(player, "world", BlockPos::new(5, 1, 5), BlockPos::new(0, 0, 0))
            .expect("set");
        assert!(tool.is_enabled(player));
        assert_eq!(tool.world(player).as_deref(), Some("world"));

        let selection = tool.selection(player).expect("get").expect("selection");
        assert_eq!(selection.bounds().volume(), 6 * 2 * 6);

        tool.clear_selection(player).expect("clear");
        assert!(tool.selection(player).expect("get").is_none());
    }
}
