//! Handler for the "admin" sub-command.
//!
//! `admin flag <region> <flag> <value> [groups...] [silent]` sets a flag on any region in the
//! sender's world, bypassing ownership checks.

use std::str::FromStr;

use smallvec::SmallVec;

use crate::command::commands::{SubCommand, complete_owned, filter_prefix, reply};
use crate::command::error::CommandError;
use crate::command::sender::CommandSender;
use crate::permission;
use crate::plugin::ERegions;
use crate::region::{FlagError, RegionGroup};

/// `admin flag <region> <flag> <value> [groups...] [silent]`, run without ownership checks.
pub struct AdminCommand;

/// Parsed trailing words of `admin flag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSelection {
    /// Distinct groups in the order given. `all` when none were named.
    pub groups: SmallVec<[RegionGroup; 5]>,
    /// Suppresses the confirmation to the sender.
    pub silent: bool,
}

impl GroupSelection {
    /// Parses `[groups...] [silent]`. Fails with the first word that names no group.
    pub fn parse<'a>(words: &[&'a str]) -> Result<Self, &'a str> {
        let mut groups: SmallVec<[RegionGroup; 5]> = SmallVec::new();
        let mut silent = false;
        for word in words.iter().copied().filter(|word| !word.trim().is_empty()) {
            if word.eq_ignore_ascii_case("silent") {
                silent = true;
                continue;
            }
            let group = RegionGroup::from_str(word).map_err(|()| word)?;
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
        if groups.is_empty() {
            groups.push(RegionGroup::All);
        }
        Ok(Self { groups, silent })
    }
}

impl AdminCommand {
    const FLAG_USAGE: &'static str = "/eregion admin flag <region> <flag> <value> [groups] [silent]";

    fn flag(
        plugin: &ERegions,
        sender: &CommandSender,
        args: &[&str],
    ) -> Result<(), CommandError> {
        if !sender.has_permission(plugin.host().as_ref(), permission::ADMIN_FLAG) {
            return Err(CommandError::PermissionDenied);
        }
        let [region, flag, value, rest @ ..] = args else {
            return Err(CommandError::InvalidUsage(Self::FLAG_USAGE));
        };
        let selection = match GroupSelection::parse(rest) {
            Ok(selection) => selection,
            Err(group) => {
                reply(plugin, sender, "admin-flag-invalid-group", &[("group", group)]);
                return Ok(());
            }
        };

        let world = sender.world(plugin.host().as_ref());
        let regions = plugin.regions();
        if regions.region(&world, region)?.is_none() {
            reply(plugin, sender, "region-not-found", &[("region_name", *region)]);
            return Ok(());
        }

        for group in &selection.groups {
            let group = (*group != RegionGroup::All).then_some(*group);
            let key = match regions.set_flag(&world, region, flag, value, group) {
                Ok(_) => continue,
                Err(FlagError::Directory(error)) => return Err(error.into()),
                Err(FlagError::UnknownFlag(_)) => "unknown-flag",
                Err(FlagError::InvalidValue { .. }) => "invalid-flag-value",
                Err(FlagError::RegionNotFound(_)) => "region-not-found",
            };
            reply(
                plugin,
                sender,
                key,
                &[
                    ("flag_name", *flag),
                    ("value", *value),
                    ("region_name", *region),
                ],
            );
            return Ok(());
        }

        let groups = selection
            .groups
            .iter()
            .map(|group| group.name())
            .collect::<Vec<_>>()
            .join(", ");
        log::info!(
            "{} set {flag}={value} on '{region}' in {world} for {groups}",
            sender.name()
        );
        if !selection.silent {
            reply(
                plugin,
                sender,
                "admin-flag-success",
                &[
                    ("flag_name", *flag),
                    ("value", *value),
                    ("region_name", *region),
                    ("groups", &groups),
                ],
            );
        }
        Ok(())
    }
}

impl SubCommand for AdminCommand {
    fn name(&self) -> &'static str {
        "admin"
    }

    fn permission(&self) -> &'static str {
        permission::ADMIN
    }

    fn description(&self) -> &'static str {
        "Administrative commands"
    }

    fn usage(&self) -> &'static str {
        "/eregion admin <subcommand>"
    }

    fn execute(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        args: &[&str],
    ) -> Result<(), CommandError> {
        match args {
            [] => {
                reply(plugin, sender, "usage-admin", &[]);
                Ok(())
            }
            [sub, rest @ ..] if sub.eq_ignore_ascii_case("flag") => Self::flag(plugin, sender, rest),
            [sub, ..] => {
                reply(plugin, sender, "unknown-admin-command", &[("command", *sub)]);
                Ok(())
            }
        }
    }

    fn tab_complete(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        args: &[&str],
    ) -> Vec<String> {
        match args {
            [typed] => filter_prefix(["flag"], typed),
            [sub, rest @ ..] if sub.eq_ignore_ascii_case("flag") => match rest {
                [typed] => complete_owned(plugin, sender, typed),
                [_, typed] => filter_prefix(plugin.regions().flag_registry().names(), typed),
                [_, _, typed] => filter_prefix(["allow", "deny"], typed),
                [_, _, _, .., typed] => filter_prefix(
                    RegionGroup::ALL
                        .iter()
                        .map(|group| group.name())
                        .chain(["silent"]),
                    typed,
                ),
                [] => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_default_to_all() {
        let selection = GroupSelection::parse(&[]).expect("no groups");
        assert_eq!(selection.groups.as_slice(), &[RegionGroup::All]);
        assert!(!selection.silent);
    }

    #[test]
    fn test_groups_are_deduplicated_in_order() {
        let selection =
            GroupSelection::parse(&["members", "OWNERS", "silent", "Members", ""]).expect("valid");
        assert_eq!(
            selection.groups.as_slice(),
            &[RegionGroup::Members, RegionGroup::Owners]
        );
        assert!(selection.silent);
    }

    #[test]
    fn test_unknown_group_is_reported() {
        assert_eq!(GroupSelection::parse(&["owners", "guests"]), Err("guests"));
    }
}
