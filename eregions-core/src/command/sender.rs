//! Who issued a command.

use crate::host::{Host, PlayerSnapshot};
use crate::message::Recipient;

/// The issuer of a command.
#[derive(Debug, Clone)]
pub enum CommandSender {
    /// An online player, as they were when the command was issued.
    Player(PlayerSnapshot),
    /// The server console.
    Console,
}

impl CommandSender {
    /// The player behind the command, if any.
    #[must_use]
    pub const fn player(&self) -> Option<&PlayerSnapshot> {
        match self {
            Self::Player(player) => Some(player),
            Self::Console => None,
        }
    }

    /// Where replies go.
    #[must_use]
    pub const fn recipient(&self) -> Recipient {
        match self {
            Self::Player(player) => Recipient::Player(player.id),
            Self::Console => Recipient::Console,
        }
    }

    /// The player name, or `CONSOLE`.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Player(player) => &player.name,
            Self::Console => "CONSOLE",
        }
    }

    /// The console holds every permission.
    #[must_use]
    pub fn has_permission(&self, host: &dyn Host, node: &str) -> bool {
        match self {
            Self::Player(player) => host.has_permission(player.id, node),
            Self::Console => true,
        }
    }

    /// The world commands act in: the player's own, or the host's default for the console.
    #[must_use]
    pub fn world(&self, host: &dyn Host) -> String {
        match self {
            Self::Player(player) => player.world.clone(),
            Self::Console => host.default_world(),
        }
    }
}
