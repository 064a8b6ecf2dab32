//! Handler for the "owner" sub-command.

use crate::command::commands::SubCommand;
use crate::command::commands::member::{Roster, complete_roster, edit_roster};
use crate::command::error::CommandError;
use crate::command::sender::CommandSender;
use crate::permission;
use crate::plugin::ERegions;

/// Adds players to or removes them from a region's owners.
pub struct OwnerCommand;

impl SubCommand for OwnerCommand {
    fn name(&self) -> &'static str {
        "owner"
    }

    fn permission(&self) -> &'static str {
        permission::REGION_OWNER
    }

    fn description(&self) -> &'static str {
        "Manage region owners"
    }

    fn usage(&self) -> &'static str {
        "/eregion owner <add|remove> <region> <player>"
    }

    fn execute(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        args: &[&str],
    ) -> Result<(), CommandError> {
        edit_roster(Roster::Owners, self.usage(), plugin, sender, args)
    }

    fn tab_complete(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        args: &[&str],
    ) -> Vec<String> {
        complete_roster(plugin, sender, args)
    }
}
