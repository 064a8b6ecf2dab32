//! Handler for the "member" sub-command, and the roster logic it shares with "owner".

use crate::command::commands::{
    SubCommand, complete_owned, filter_prefix, owned_region, parse_add_remove, reply,
    require_player,
};
use crate::command::error::CommandError;
use crate::command::sender::CommandSender;
use crate::permission;
use crate::plugin::ERegions;
use crate::trigger::TriggerContext;

/// Which list of players a command edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Roster {
    Members,
    Owners,
}

impl Roster {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Members => "member",
            Self::Owners => "owner",
        }
    }
}

/// Adds players to or removes them from a region's members.
pub struct MemberCommand;

impl SubCommand for MemberCommand {
    fn name(&self) -> &'static str {
        "member"
    }

    fn permission(&self) -> &'static str {
        permission::REGION_MEMBERS
    }

    fn description(&self) -> &'static str {
        "Manage region members"
    }

    fn usage(&self) -> &'static str {
        "/eregion member <add|remove> <region> <player>"
    }

    fn execute(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        args: &[&str],
    ) -> Result<(), CommandError> {
        edit_roster(Roster::Members, self.usage(), plugin, sender, args)
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

/// `<add|remove> <region> <player>` against either roster.
///
/// The region must exist in the sender's world, the sender must own it and the target must be
/// online. Fires `<roster>-added` or `<roster>-removed` with the target's name.
pub(crate) fn edit_roster(
    roster: Roster,
    usage: &'static str,
    plugin: &ERegions,
    sender: &CommandSender,
    args: &[&str],
) -> Result<(), CommandError> {
    let player = require_player(sender)?;
    let [action, region, target, ..] = args else {
        return Err(CommandError::InvalidUsage(usage));
    };
    let Some(add) = parse_add_remove(action) else {
        reply(plugin, sender, "invalid-action-add-remove", &[]);
        return Ok(());
    };
    if owned_region(plugin, sender, player, region)?.is_none() {
        return Ok(());
    }
    let Some(target) = plugin.host().player_by_name(target) else {
        reply(plugin, sender, "player-not-found", &[("player_name", *target)]);
        return Ok(());
    };

    let regions = plugin.regions();
    let world = &player.world;
    let changed = match (roster, add) {
        (Roster::Members, true) => regions.add_member(world, region, &target)?,
        (Roster::Members, false) => regions.remove_member(world, region, &target)?,
        (Roster::Owners, true) => regions.add_owner(world, region, &target)?,
        (Roster::Owners, false) => regions.remove_owner(world, region, &target)?,
    };

    let prefix = roster.prefix();
    let placeholders = [
        ("player_name", target.name.as_str()),
        ("region_name", *region),
    ];
    if !changed {
        let verb = if add { "add" } else { "remove" };
        reply(plugin, sender, &format!("{prefix}-{verb}-failed"), &placeholders);
        return Ok(());
    }

    let verb = if add { "added" } else { "removed" };
    log::info!(
        "{} {verb} {} as {prefix} of '{region}'",
        player.name,
        target.name
    );
    plugin.triggers().execute(
        &format!("{prefix}-{verb}"),
        player,
        &TriggerContext::region(*region).with_target(target.name.clone()),
    );
    reply(plugin, sender, &format!("{prefix}-{verb}-success"), &placeholders);
    Ok(())
}

pub(crate) fn complete_roster(
    plugin: &ERegions,
    sender: &CommandSender,
    args: &[&str],
) -> Vec<String> {
    match args {
        [typed] => filter_prefix(["add", "remove"], typed),
        [_, typed] => complete_owned(plugin, sender, typed),
        [_, _, typed] => filter_prefix(
            plugin
                .host()
                .online_players()
                .into_iter()
                .map(|player| player.name),
            typed,
        ),
        _ => Vec::new(),
    }
}
