//! Handler for the "help" sub-command.

use crate::command::commands::SubCommand;
use crate::command::error::CommandError;
use crate::command::sender::CommandSender;
use crate::permission;
use crate::plugin::ERegions;

/// Lists the sub-commands the sender may use.
pub struct HelpCommand;

impl SubCommand for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn permission(&self) -> &'static str {
        permission::HELP
    }

    fn description(&self) -> &'static str {
        "Show this help"
    }

    fn usage(&self) -> &'static str {
        "/eregion help"
    }

    fn execute(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        _args: &[&str],
    ) -> Result<(), CommandError> {
        plugin.commands().send_help(plugin, sender);
        Ok(())
    }
}
