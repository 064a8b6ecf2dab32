//! Handler for the "flags" sub-command.

use crate::command::commands::{SubCommand, complete_owned, owned_region, reply, require_player};
use crate::command::error::CommandError;
use crate::command::sender::CommandSender;
use crate::permission;
use crate::plugin::ERegions;
use crate::region::FlagError;

/// Lists the flags set on an owned region.
pub struct FlagsCommand;

impl SubCommand for FlagsCommand {
    fn name(&self) -> &'static str {
        "flags"
    }

    fn permission(&self) -> &'static str {
        permission::REGION_FLAGS
    }

    fn description(&self) -> &'static str {
        "Show region flags"
    }

    fn usage(&self) -> &'static str {
        "/eregion flags <region>"
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

        let flags = match plugin.regions().flags(&player.world, name) {
            Ok(flags) => flags,
            Err(FlagError::Directory(error)) => return Err(error.into()),
            Err(_) => {
                reply(plugin, sender, "region-not-found", &[("region_name", *name)]);
                return Ok(());
            }
        };
        if flags.is_empty() {
            reply(plugin, sender, "region-no-flags", &[("region_name", *name)]);
        } else {
            reply(
                plugin,
                sender,
                "list-flags",
                &[("region_name", *name), ("region_flags", &flags.join(", "))],
            );
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
