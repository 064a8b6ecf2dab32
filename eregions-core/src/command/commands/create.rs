//! Handler for the "create" sub-command.

use crate::command::commands::{SubCommand, reply, require_player};
use crate::command::error::CommandError;
use crate::command::sender::CommandSender;
use crate::permission;
use crate::plugin::ERegions;
use crate::selection::{KIND_CREATE, Stage};

/// Starts selecting the corners of a new region.
pub struct CreateCommand;

impl SubCommand for CreateCommand {
    fn name(&self) -> &'static str {
        "create"
    }

    fn permission(&self) -> &'static str {
        permission::REGION_CREATE
    }

    fn description(&self) -> &'static str {
        "Create a new region"
    }

    fn usage(&self) -> &'static str {
        "/eregion create"
    }

    fn execute(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        _args: &[&str],
    ) -> Result<(), CommandError> {
        let player = require_player(sender)?;
        let selections = plugin.selections();

        // A finalized session only lingers until the next selection starts.
        match selections.get(player.id) {
            Some(session) if session.stage == Stage::Finalized => {
                selections.clear(player.id);
            }
            Some(_) => {
                reply(plugin, sender, "active-selection-exists", &[]);
                return Ok(());
            }
            None => {}
        }

        if !selections.start_selection(player, KIND_CREATE) {
            reply(plugin, sender, "selection-start-error", &[]);
            return Ok(());
        }
        for key in ["selection-start", "selection-instructions", "selection-cancel"] {
            reply(plugin, sender, key, &[]);
        }
        Ok(())
    }
}
