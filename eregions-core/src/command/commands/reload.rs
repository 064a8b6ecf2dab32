//! Handler for the "reload" sub-command.

use crate::command::commands::{SubCommand, reply};
use crate::command::error::CommandError;
use crate::command::sender::CommandSender;
use crate::permission;
use crate::plugin::ERegions;

/// Re-reads the configuration file.
pub struct ReloadCommand;

impl SubCommand for ReloadCommand {
    fn name(&self) -> &'static str {
        "reload"
    }

    fn permission(&self) -> &'static str {
        permission::RELOAD
    }

    fn description(&self) -> &'static str {
        "Reload the plugin configuration"
    }

    fn usage(&self) -> &'static str {
        "/eregion reload"
    }

    fn execute(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        _args: &[&str],
    ) -> Result<(), CommandError> {
        match plugin.reload() {
            Ok(()) => reply(plugin, sender, "config-reloaded-success", &[]),
            Err(error) => {
                log::error!("Configuration reload requested by {} failed: {error}", sender.name());
                reply(
                    plugin,
                    sender,
                    "config-reload-error",
                    &[("error", &error.to_string())],
                );
            }
        }
        Ok(())
    }
}
