//! Handler for the "flag" sub-command.

use crate::command::commands::{
    SubCommand, complete_owned, filter_prefix, owned_region, parse_add_remove, reply,
    require_player,
};
use crate::command::error::CommandError;
use crate::command::sender::CommandSender;
use crate::permission;
use crate::plugin::ERegions;
use crate::region::FlagError;
use crate::trigger::TriggerContext;

/// Switches a flag of an owned region on (`allow`) or removes it.
pub struct FlagCommand;

impl FlagCommand {
    fn may_change(plugin: &ERegions, sender: &CommandSender, flag: &str) -> bool {
        permission::flag_nodes(flag)
            .iter()
            .any(|node| sender.has_permission(plugin.host().as_ref(), node))
    }
}

impl SubCommand for FlagCommand {
    fn name(&self) -> &'static str {
        "flag"
    }

    fn permission(&self) -> &'static str {
        permission::REGION_FLAG
    }

    fn description(&self) -> &'static str {
        "Manage region flags"
    }

    fn usage(&self) -> &'static str {
        "/eregion flag <add|remove> <region> <flag>"
    }

    fn execute(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        args: &[&str],
    ) -> Result<(), CommandError> {
        let player = require_player(sender)?;
        let (action, region, flag) = match args {
            [action, region, flag] => (*action, *region, *flag),
            [action, region] => {
                reply(
                    plugin,
                    sender,
                    "flag-name-required",
                    &[("action", *action), ("region_name", *region)],
                );
                return Ok(());
            }
            [_, _, _, ..] => {
                reply(plugin, sender, "too-many-arguments-flag", &[]);
                return Ok(());
            }
            _ => return Err(CommandError::InvalidUsage(self.usage())),
        };

        let Some(add) = parse_add_remove(action) else {
            reply(plugin, sender, "invalid-action-add-remove", &[]);
            return Ok(());
        };
        if owned_region(plugin, sender, player, region)?.is_none() {
            return Ok(());
        }
        if !Self::may_change(plugin, sender, flag) {
            reply(plugin, sender, "no-flag-permission", &[("flag_name", flag)]);
            return Ok(());
        }

        let regions = plugin.regions();
        let result = if add {
            regions
                .set_flag(&player.world, region, flag, "allow", None)
                .map(|_| ())
        } else {
            regions.clear_flag(&player.world, region, flag)
        };

        let placeholders = [("flag_name", flag), ("region_name", region)];
        match result {
            Ok(()) => {}
            Err(FlagError::UnknownFlag(_)) => {
                reply(plugin, sender, "unknown-flag", &placeholders);
                return Ok(());
            }
            Err(FlagError::InvalidValue { .. }) => {
                reply(
                    plugin,
                    sender,
                    "invalid-flag-value",
                    &[("flag_name", flag), ("value", "allow")],
                );
                return Ok(());
            }
            Err(FlagError::RegionNotFound(_)) => {
                reply(plugin, sender, "region-not-found", &placeholders);
                return Ok(());
            }
            Err(FlagError::Directory(error)) => return Err(error.into()),
        }

        let (trigger, state, key) = if add {
            ("flag-added", "allow", "flag-added-success")
        } else {
            ("flag-removed", "deny", "flag-removed-success")
        };
        log::info!("{} {trigger} {flag} on '{region}'", player.name);
        let triggers = plugin.triggers();
        triggers.execute(
            trigger,
            player,
            &TriggerContext::region(region).with_flag_name(flag),
        );
        triggers.execute(
            "flag-changed",
            player,
            &TriggerContext::region(region).with_flag_state(flag, state),
        );
        reply(plugin, sender, key, &placeholders);
        Ok(())
    }

    fn tab_complete(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        args: &[&str],
    ) -> Vec<String> {
        match args {
            [typed] => filter_prefix(["add", "remove"], typed),
            [_, typed] => complete_owned(plugin, sender, typed),
            [_, _, typed] => filter_prefix(
                plugin
                    .regions()
                    .flag_registry()
                    .names()
                    .into_iter()
                    .filter(|flag| Self::may_change(plugin, sender, flag)),
                typed,
            ),
            _ => Vec::new(),
        }
    }
}
