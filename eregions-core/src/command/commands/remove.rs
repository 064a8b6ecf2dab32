//! Handler for the "remove" sub-command.

use crate::command::commands::{SubCommand, complete_owned, owned_region, reply, require_player};
use crate::command::error::CommandError;
use crate::command::sender::CommandSender;
use crate::permission;
use crate::plugin::ERegions;
use crate::trigger::TriggerContext;

/// Deletes a region the sender owns.
pub struct RemoveCommand;

impl SubCommand for RemoveCommand {
    fn name(&self) -> &'static str {
        "remove"
    }

    fn permission(&self) -> &'static str {
        permission::REGION_REMOVE
    }

    fn description(&self) -> &'static str {
        "Remove a region"
    }

    fn usage(&self) -> &'static str {
        "/eregion remove <region>"
    }

    fn execute(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        args: &[&str],
    ) -> Result<(), CommandError> {
        let player = require_player(sender)?;
        let [name, ..] = args else {
            return Err(CommandError::InvalidUsage(self.usage()));
        };
        if owned_region(plugin, sender, player, name)?.is_none() {
            return Ok(());
        }

        if plugin.regions().remove_region(&player.world, name)? {
            plugin
                .triggers()
                .execute("region-removed", player, &TriggerContext::region(*name));
            reply(plugin, sender, "region-removed-success", &[("region_name", *name)]);
        } else {
            reply(plugin, sender, "region-remove-failed", &[("region_name", *name)]);
        }
        Ok(())
    }

    fn tab_complete(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        args: &[&str],
    ) -> Vec<String> {
        match args {
            [typed] => complete_owned(plugin, sender, typed),
            _ => Vec::new(),
        }
    }
}
