//! Handler for the "cancel" sub-command.

use crate::command::commands::{SubCommand, reply, require_player};
use crate::command::error::CommandError;
use crate::command::sender::CommandSender;
use crate::permission;
use crate::plugin::ERegions;

/// Abandons the sender's selection.
pub struct CancelCommand;

impl SubCommand for CancelCommand {
    fn name(&self) -> &'static str {
        "cancel"
    }

    fn permission(&self) -> &'static str {
        permission::CANCEL
    }

    fn description(&self) -> &'static str {
        "Cancel region creation"
    }

    fn usage(&self) -> &'static str {
        "/eregion cancel"
    }

    fn execute(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        _args: &[&str],
    ) -> Result<(), CommandError> {
        let player = require_player(sender)?;
        if plugin.selections().cancel(player.id) {
            reply(plugin, sender, "region-cancelled", &[]);
        } else {
            reply(plugin, sender, "no-active-selection", &[]);
        }
        Ok(())
    }
}
