//! Player and console facing text.
//!
//! Messages are looked up by key. The configuration may override any built-in text or
//! switch it off. A message can carry the same presentation tags as trigger lines, so
//! `actionbar;3! ...` in a message shows it on the action bar instead of in chat.

use std::sync::Arc;

use eregions_utils::PlayerId;
use eregions_utils::text::{format_message, strip_formatting};
use eregions_utils::ticks::seconds_to_ticks;
use parking_lot::Mutex;

use crate::config::ConfigStore;
use crate::host::{Host, TitleTimes};
use crate::scheduler::{ScheduledTask, TaskScheduler};
use crate::trigger::CommandAction;

/// Built-in message texts.
const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    ("selection-start", "&aSelection started."),
    ("selection-instructions", "&7Sneak and left-click two corners of the area."),
    ("selection-cancel", "&7Type &ecancel &7in chat or use &e/eregion cancel &7to stop."),
    ("active-selection-exists", "&cYou already have an active selection. Use &e/eregion cancel &cfirst."),
    ("selection-start-error", "&cCould not start a selection. See the console for details."),
    ("player-only-command", "&cOnly players can use this command."),
    ("no-permission", "&cYou do not have permission to do that."),
    ("no-active-selection", "&cYou have no active selection."),
    ("no-completed-selection", "&cYou have no completed selection. Select both corners first."),
    ("region-cancelled", "&eRegion creation cancelled."),
    ("region-name-empty", "&cThe region name cannot be empty."),
    ("region-name-too-long", "&cThe region name cannot be longer than {max} characters."),
    ("region-name-invalid", "&cThe region name may only contain letters, digits, - and _."),
    ("region-already-exists", "&cA region named &e{region_name} &calready exists."),
    ("region-overlap", "&cYour selection overlaps existing regions: &e{regions}&c."),
    ("region-create-failed", "&cCould not create region &e{region_name}&c."),
    ("region-not-found", "&cRegion &e{region_name} &cwas not found."),
    ("not-region-owner", "&cYou are not an owner of &e{region_name}&c."),
    ("region-removed-success", "&aRegion &e{region_name} &aremoved."),
    ("region-remove-failed", "&cCould not remove region &e{region_name}&c."),
    ("player-not-found", "&cPlayer &e{player_name} &cis not online."),
    ("invalid-action-add-remove", "&cThe action must be &eadd &cor &eremove&c."),
    ("member-added-success", "&e{player_name} &ais now a member of &e{region_name}&a."),
    ("member-removed-success", "&e{player_name} &ais no longer a member of &e{region_name}&a."),
    ("owner-added-success", "&e{player_name} &ais now an owner of &e{region_name}&a."),
    ("owner-removed-success", "&e{player_name} &ais no longer an owner of &e{region_name}&a."),
    ("member-add-failed", "&cCould not add &e{player_name} &cto &e{region_name}&c."),
    ("member-remove-failed", "&cCould not remove &e{player_name} &cfrom &e{region_name}&c."),
    ("owner-add-failed", "&cCould not add owner &e{player_name} &cto &e{region_name}&c."),
    ("owner-remove-failed", "&cCould not remove owner &e{player_name} &cfrom &e{region_name}&c."),
    ("flag-name-required", "&cName a flag: &e/eregion flag {action} {region_name} <flag>"),
    ("too-many-arguments-flag", "&cToo many arguments. Usage: &e/eregion flag <add|remove> <region> <flag>"),
    ("unknown-flag", "&cUnknown flag &e{flag_name}&c."),
    ("invalid-flag-value", "&cInvalid value &e{value} &cfor flag &e{flag_name}&c."),
    ("no-flag-permission", "&cYou may not change the &e{flag_name} &cflag."),
    ("flag-added-success", "&aFlag &e{flag_name} &aset on &e{region_name}&a."),
    ("flag-removed-success", "&aFlag &e{flag_name} &aremoved from &e{region_name}&a."),
    ("flag-add-failed", "&cCould not set flag &e{flag_name}&c."),
    ("flag-remove-failed", "&cCould not remove flag &e{flag_name}&c."),
    ("region-no-flags", "&7Region &e{region_name} &7has no flags."),
    ("list-flags", "&7Flags of &e{region_name}&7: &f{region_flags}"),
    ("invalid-distance", "&cInvalid distance. Use &e+10 &cor &e-5&c."),
    ("invalid-direction", "&cThe direction must be &eup&c, &edown &cor &eface&c."),
    ("selection-moved", "&aSelection moved by &e{size} &ablocks."),
    ("selection-resized", "&aSelection resized by &e{size} &ablocks ({direction})."),
    ("config-reloaded-success", "&aConfiguration reloaded."),
    ("config-reload-error", "&cReload failed: {error}"),
    ("usage", "&cUsage: &e{usage}"),
    ("help-header", "&6eRegions commands:"),
    ("help-entry", "&e{usage} &7- {description}"),
    ("internal-error", "&cAn internal error occurred. See the console for details."),
    ("usage-admin", "&cUsage: &e/eregion admin flag <region> <flag> <value> [groups...] [silent]"),
    ("unknown-admin-command", "&cUnknown admin command &e{command}&c."),
    ("admin-flag-invalid-group", "&cUnknown group &e{group}&c. Use all, members, owners, nonmembers or nonowners."),
    ("admin-flag-success", "&aSet &e{flag_name}={value} &aon &e{region_name} &7for {groups}."),
];

/// Returns the built-in text of a message.
#[must_use]
pub fn default_message(key: &str) -> Option<&'static str> {
    DEFAULT_MESSAGES
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, text)| *text)
}

/// Who receives a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// An online player.
    Player(PlayerId),
    /// The server console. Formatting is stripped.
    Console,
}

/// Formats and delivers text.
#[derive(Clone)]
pub struct MessageService {
    host: Arc<dyn Host>,
    config: Arc<ConfigStore>,
    scheduler: Arc<Mutex<TaskScheduler>>,
}

impl MessageService {
    /// Creates a service that schedules delayed clears on `scheduler`.
    #[must_use]
    pub fn new(
        host: Arc<dyn Host>,
        config: Arc<ConfigStore>,
        scheduler: Arc<Mutex<TaskScheduler>>,
    ) -> Self {
        Self {
            host,
            config,
            scheduler,
        }
    }

    /// Resolves a message key and fills in `{name}` placeholders.
    ///
    /// Returns `None` for disabled and unknown keys.
    #[must_use]
    pub fn render(&self, key: &str, placeholders: &[(&str, &str)]) -> Option<String> {
        let config = self.config.get();
        let template = match config.message(key) {
            Some(entry) if !entry.enabled => return None,
            Some(entry) => entry.message.clone(),
            None => {
                let Some(text) = default_message(key) else {
                    log::warn!("Message not found for key '{key}'");
                    return None;
                };
                text.to_string()
            }
        };

        Some(
            placeholders
                .iter()
                .fold(template, |text, (name, value)| {
                    text.replace(&format!("{{{name}}}"), value)
                }),
        )
    }

    /// Sends a configured message.
    pub fn send(&self, to: Recipient, key: &str, placeholders: &[(&str, &str)]) {
        if let Some(text) = self.render(key, placeholders) {
            self.send_text(to, &text);
        }
    }

    /// Sends raw text, honouring presentation tags. Blank text is dropped.
    pub fn send_text(&self, to: Recipient, text: &str) {
        match CommandAction::parse_message(text) {
            Ok(action) => self.present(to, &action),
            Err(error) => {
                log::debug!("Sending '{text}' as plain chat: {error}");
                if !text.trim().is_empty() {
                    self.chat(to, text);
                }
            }
        }
    }

    /// Shows a presentation action. Command actions are not presentations and are ignored.
    pub fn present(&self, to: Recipient, action: &CommandAction) {
        match action {
            CommandAction::SendChat(text) => self.chat(to, text),
            CommandAction::SendActionBar { text, seconds } => self.action_bar(to, text, *seconds),
            CommandAction::SendTitle {
                title,
                subtitle,
                seconds,
            } => self.title(to, title, subtitle, *seconds),
            CommandAction::LogToConsole(text) => self.host.send_console(&format_message(text)),
            CommandAction::Broadcast(text) => self.host.broadcast(&format_message(text)),
            CommandAction::RunAsPlayer(_) | CommandAction::RunAsConsole(_) => {
                log::warn!("Ignoring command action '{action}' in a message");
            }
        }
    }

    /// Sends a chat line.
    pub fn chat(&self, to: Recipient, text: &str) {
        let formatted = format_message(text);
        match to {
            Recipient::Player(player) => self.host.send_chat(player, &formatted),
            Recipient::Console => self.host.send_console(&strip_formatting(&formatted)),
        }
    }

    /// Shows an action bar and schedules clearing it after `seconds` when positive.
    pub fn action_bar(&self, to: Recipient, text: &str, seconds: u32) {
        if text.trim().is_empty() {
            return;
        }
        let formatted = format_message(text);
        let Recipient::Player(player) = to else {
            self.host.send_console(&strip_formatting(&formatted));
            return;
        };

        self.host.send_action_bar(player, &formatted);
        if seconds > 0 {
            self.scheduler.lock().schedule(
                seconds_to_ticks(u64::from(seconds)),
                ScheduledTask::ClearActionBar { player },
            );
        }
    }

    /// Shows a title. Blank parts are sent empty.
    pub fn title(&self, to: Recipient, title: &str, subtitle: &str, seconds: u32) {
        let format = |text: &str| {
            if text.trim().is_empty() {
                String::new()
            } else {
                format_message(text)
            }
        };
        let (title, subtitle) = (format(title), format(subtitle));

        match to {
            Recipient::Player(player) => {
                self.host
                    .send_title(player, &title, &subtitle, TitleTimes::for_seconds(seconds));
            }
            Recipient::Console => {
                let line = [title, subtitle]
                    .iter()
                    .filter(|part| !part.is_empty())
                    .map(|part| strip_formatting(part))
                    .collect::<Vec<_>>()
                    .join(" ");
                self.host.send_console(&line);
            }
        }
    }

    /// Clears a player's action bar.
    pub fn clear_action_bar(&self, player: PlayerId) {
        self.host.send_action_bar(player, "");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_default_key_is_unique() {
        let mut keys: Vec<&str> = DEFAULT_MESSAGES.iter().map(|(key, _)| *key).collect();
        keys.sort_unstable();
        let before = keys.len();
        keys.dedup();
        assert_eq!(keys.len(), before);
    }

    #[test]
    fn test_default_message_lookup() {
        assert!(default_message("region-overlap").is_some_and(|text| text.contains("{regions}")));
        assert!(default_message("no-such-key").is_none());
    }
}
