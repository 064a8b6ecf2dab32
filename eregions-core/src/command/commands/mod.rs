//! The `/eregion` sub-commands.
pub mod admin;
pub mod cancel;
pub mod create;
pub mod flag;
pub mod flags;
pub mod help;
pub mod member;
pub mod move_region;
pub mod owner;
pub mod reload;
pub mod remove;
pub mod size;

use crate::command::error::CommandError;
use crate::command::sender::CommandSender;
use crate::host::PlayerSnapshot;
use crate::plugin::ERegions;
use crate::region::Region;

/// A sub-command of `/eregion`.
pub trait SubCommand: Send + Sync {
    /// The word that selects this sub-command.
    fn name(&self) -> &'static str;

    /// The permission node required to use it.
    fn permission(&self) -> &'static str;

    /// One line shown in the help listing.
    fn description(&self) -> &'static str;

    /// The usage line shown when the arguments do not fit.
    fn usage(&self) -> &'static str;

    /// Runs the sub-command with the words that followed its name.
    fn execute(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        args: &[&str],
    ) -> Result<(), CommandError>;

    /// Completions for the last word of `args`.
    fn tab_complete(
        &self,
        _plugin: &ERegions,
        _sender: &CommandSender,
        _args: &[&str],
    ) -> Vec<String> {
        Vec::new()
    }
}

/// Fails with [`CommandError::PlayerOnly`] for the console.
pub(crate) fn require_player(sender: &CommandSender) -> Result<&PlayerSnapshot, CommandError> {
    sender.player().ok_or(CommandError::PlayerOnly)
}

/// Sends a message to whoever issued the command.
pub(crate) fn reply(
    plugin: &ERegions,
    sender: &CommandSender,
    key: &str,
    placeholders: &[(&str, &str)],
) {
    plugin.messages().send(sender.recipient(), key, placeholders);
}

/// Looks up a region in the player's world that the player owns.
///
/// Replies with `region-not-found` or `not-region-owner` and returns `None` otherwise.
pub(crate) fn owned_region(
    plugin: &ERegions,
    sender: &CommandSender,
    player: &PlayerSnapshot,
    name: &str,
) -> Result<Option<Region>, CommandError> {
    let Some(region) = plugin.regions().region(&player.world, name)? else {
        reply(plugin, sender, "region-not-found", &[("region_name", name)]);
        return Ok(None);
    };
    if !region.is_owner(player.id) {
        reply(plugin, sender, "not-region-owner", &[("region_name", name)]);
        return Ok(None);
    }
    Ok(Some(region))
}

/// Completes the names of regions the sender owns in their world.
pub(crate) fn complete_owned(plugin: &ERegions, sender: &CommandSender, typed: &str) -> Vec<String> {
    sender
        .player()
        .map(|player| {
            filter_prefix(
                plugin.regions().owned_regions(&player.world, player.id),
                typed,
            )
        })
        .unwrap_or_default()
}

/// Options starting with `typed`, ignoring case.
pub(crate) fn filter_prefix<I, S>(options: I, typed: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let typed = typed.to_lowercase();
    options
        .into_iter()
        .filter(|option| option.as_ref().to_lowercase().starts_with(&typed))
        .map(|option| option.as_ref().to_string())
        .collect()
}

/// Parses a distance written as `+10`, `-5` or `3`.
pub(crate) fn parse_distance(raw: &str) -> Option<i32> {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.strip_prefix('+').unwrap_or(raw).parse().ok()
}

/// The first word, lowercased, if it is `add` or `remove`.
pub(crate) fn parse_add_remove(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "add" => Some(true),
        "remove" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_distance() {
        assert_eq!(parse_distance("+10"), Some(10));
        assert_eq!(parse_distance("-5"), Some(-5));
        assert_eq!(parse_distance("7"), Some(7));
        assert_eq!(parse_distance("+"), None);
        assert_eq!(parse_distance("1.5"), None);
        assert_eq!(parse_distance("--1"), None);
        assert_eq!(parse_distance("ten"), None);
    }

    #[test]
    fn test_filter_prefix_ignores_case() {
        let options = ["add", "remove", "Admin"];
        assert_eq!(filter_prefix(options, "A"), vec!["add", "Admin"]);
        assert_eq!(filter_prefix(options, ""), vec!["add", "remove", "Admin"]);
        assert!(filter_prefix(options, "x").is_empty());
    }
}
