//! Player event handlers.
//!
//! The host forwards events here. Handlers that can veto the event return `true` when the
//! host should cancel it.

use eregions_utils::BlockPos;

use crate::host::PlayerSnapshot;
use crate::message::Recipient;
use crate::permission;
use crate::plugin::ERegions;
use crate::region::CreateRegionError;
use crate::selection::{FinalizeError, PointOutcome, Stage};

/// A mouse click as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    /// Left click on a block.
    LeftBlock(BlockPos),
    /// Left click into the air.
    LeftAir {
        /// The block the player looks at, if any is in range.
        target: Option<BlockPos>,
    },
    /// Right click. Consumed while selecting, but never records a corner.
    Right,
}

/// Checks a region name typed in chat.
///
/// Returns the message key describing what is wrong with it.
pub fn validate_region_name(name: &str, max_length: usize) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("region-name-empty");
    }
    if name.chars().count() > max_length {
        return Err("region-name-too-long");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err("region-name-invalid");
    }
    Ok(())
}

impl ERegions {
    /// Records a selection corner on a sneaking left click.
    ///
    /// Any sneaking click is cancelled while a session is still being selected or named, so
    /// selecting does not break blocks.
    pub fn on_interact(&self, player: &PlayerSnapshot, click: Click) -> bool {
        let selecting = self
            .selections()
            .get(player.id)
            .is_some_and(|session| session.stage != Stage::Finalized);
        if !player.sneaking || !selecting {
            return false;
        }

        let pos = match click {
            Click::LeftBlock(pos) => pos,
            Click::LeftAir { target } => target.unwrap_or_else(|| player.position.block_pos()),
            Click::Right => return true,
        };
        match self.selections().record_point(player, pos) {
            PointOutcome::First(pos) => log::debug!("{} set the first corner at {pos}", player.name),
            PointOutcome::Completed { second, .. } => {
                log::debug!("{} set the second corner at {second}", player.name);
            }
            PointOutcome::NoSession | PointOutcome::Ignored => {}
        }
        true
    }

    /// Takes a region name from chat while the player's selection awaits one.
    ///
    /// Returns true if the message was consumed and must not reach other players.
    pub fn on_chat(&self, player: &PlayerSnapshot, message: &str) -> bool {
        let selections = self.selections();
        if !selections.is_awaiting_name(player.id)
            || !self.host().has_permission(player.id, permission::REGION_CREATE)
        {
            return false;
        }

        let to = Recipient::Player(player.id);
        let messages = self.messages();
        let name = message.trim();
        let config = self.config().get();
        let settings = &config.settings;

        let lowered = name.to_lowercase();
        if settings
            .cancel_words
            .iter()
            .any(|word| word.to_lowercase() == lowered)
        {
            selections.cancel(player.id);
            messages.send(to, "region-cancelled", &[]);
            return true;
        }

        let max = settings.max_region_name_length;
        if let Err(key) = validate_region_name(name, max) {
            messages.send(to, key, &[("max", &max.to_string()), ("region_name", name)]);
            return true;
        }

        match selections.finalize_with_name(player, name) {
            Ok(region) => log::info!("{} created region '{}'", player.name, region.id),
            Err(FinalizeError::NotAwaitingName) => {}
            Err(FinalizeError::Create(CreateRegionError::Overlap(regions))) => {
                messages.send(to, "region-overlap", &[("regions", &regions.join(", "))]);
            }
            Err(FinalizeError::Create(CreateRegionError::AlreadyExists(_))) => {
                messages.send(to, "region-already-exists", &[("region_name", name)]);
            }
            Err(FinalizeError::Create(CreateRegionError::Directory(error))) => {
                log::error!("Failed to create region '{name}' for {}: {error}", player.name);
                messages.send(to, "region-create-failed", &[("region_name", name)]);
            }
        }
        true
    }

    /// Checks for nearby region boundaries, at most once per configured interval.
    pub fn on_move(&self, player: &PlayerSnapshot) {
        self.boundary().on_move(player, self.current_tick());
    }

    /// Forgets the player's selection and boundary state.
    pub fn on_quit(&self, player: &PlayerSnapshot) {
        self.forget(player);
    }

    /// Forgets the player's selection and boundary state.
    pub fn on_death(&self, player: &PlayerSnapshot) {
        self.forget(player);
    }

    fn forget(&self, player: &PlayerSnapshot) {
        if self.selections().cancel(player.id) {
            log::debug!("Dropped the selection of {}", player.name);
        }
        self.boundary().clear(player.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_region_name() {
        assert_eq!(validate_region_name("base_1-a", 32), Ok(()));
        assert_eq!(validate_region_name("", 32), Err("region-name-empty"));
        assert_eq!(
            validate_region_name(&"a".repeat(33), 32),
            Err("region-name-too-long")
        );
        assert_eq!(validate_region_name("my base", 32), Err("region-name-invalid"));
        assert_eq!(validate_region_name("дом", 32), Err("region-name-invalid"));
    }
}
