//! The `/eregion` command: sub-command registration, dispatch and tab completion.
pub mod commands;
pub mod error;
pub mod sender;

use std::sync::Arc;

use crate::command::commands::{
    SubCommand, admin, cancel, create, flag, flags, help, member, move_region, owner, reload,
    remove, size,
};
use crate::command::error::CommandError::*;
use crate::command::sender::CommandSender;
use crate::plugin::ERegions;

/// Routes `/eregion <sub-command> ...` to its handler.
pub struct CommandDispatcher {
    /// Sub-command names to their handlers.
    handlers: scc::HashMap<&'static str, Arc<dyn SubCommand>>,
}

impl CommandDispatcher {
    /// Creates a dispatcher with no sub-commands.
    #[must_use]
    pub fn new() -> Self {
        CommandDispatcher {
            handlers: scc::HashMap::new(),
        }
    }

    /// Runs the arguments that followed `/eregion`.
    ///
    /// No arguments, an unknown sub-command or a sub-command the sender may not use all show
    /// the help listing.
    pub fn handle_command(&self, plugin: &ERegions, sender: &CommandSender, line: &str) {
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some((name, rest)) = args.split_first() else {
            self.send_help(plugin, sender);
            return;
        };

        let Some(handler) = self.handler(name) else {
            log::debug!("{} used unknown sub-command '{name}'", sender.name());
            self.send_help(plugin, sender);
            return;
        };
        if !sender.has_permission(plugin.host().as_ref(), handler.permission()) {
            log::debug!("{} may not use '{name}'", sender.name());
            self.send_help(plugin, sender);
            return;
        }

        log::debug!("{} issued /eregion {line}", sender.name());
        let Err(error) = handler.execute(plugin, sender, rest) else {
            return;
        };

        let to = sender.recipient();
        let messages = plugin.messages();
        match error {
            PlayerOnly => messages.send(to, "player-only-command", &[]),
            InvalidUsage(usage) => messages.send(to, "usage", &[("usage", usage)]),
            PermissionDenied => {
                log::warn!("Permission denied for {} running \"{line}\"", sender.name());
                messages.send(to, "no-permission", &[]);
            }
            Directory(error) => {
                log::error!("Error while running \"{line}\" for {}: {error}", sender.name());
                messages.send(to, "internal-error", &[]);
            }
        }
    }

    /// Completions for the word being typed. `args` are the words after `/eregion`, the last
    /// one possibly empty.
    #[must_use]
    pub fn tab_complete(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        args: &[&str],
    ) -> Vec<String> {
        match args {
            [] | [_] => {
                let typed = args.first().copied().unwrap_or_default();
                let names = self
                    .permitted(plugin, sender)
                    .into_iter()
                    .map(|handler| handler.name());
                commands::filter_prefix(names, typed)
            }
            [name, rest @ ..] => self
                .handler(name)
                .filter(|handler| {
                    sender.has_permission(plugin.host().as_ref(), handler.permission())
                })
                .map(|handler| handler.tab_complete(plugin, sender, rest))
                .unwrap_or_default(),
        }
    }

    /// Lists the sub-commands the sender may use.
    pub fn send_help(&self, plugin: &ERegions, sender: &CommandSender) {
        let to = sender.recipient();
        let messages = plugin.messages();
        messages.send(to, "help-header", &[]);
        for handler in self.permitted(plugin, sender) {
            messages.send(
                to,
                "help-entry",
                &[
                    ("usage", handler.usage()),
                    ("description", handler.description()),
                ],
            );
        }
    }

    /// Registers a sub-command under its name.
    pub fn register(&self, handler: impl SubCommand + 'static) {
        let handler: Arc<dyn SubCommand> = Arc::new(handler);
        if let Err((name, _)) = self.handlers.insert_sync(handler.name(), handler) {
            log::warn!("Sub-command {name} is already registered");
        }
    }

    /// Unregisters a sub-command.
    pub fn unregister(&self, name: &str) {
        self.handlers.remove_sync(name);
    }

    fn handler(&self, name: &str) -> Option<Arc<dyn SubCommand>> {
        let name = name.to_lowercase();
        self.handlers.read_sync(name.as_str(), |_, handler| handler.clone())
    }

    /// Sub-commands the sender holds the permission for, sorted by name.
    fn permitted(&self, plugin: &ERegions, sender: &CommandSender) -> Vec<Arc<dyn SubCommand>> {
        let mut permitted = Vec::new();
        self.handlers.iter_sync(|_, handler| {
            if sender.has_permission(plugin.host().as_ref(), handler.permission()) {
                permitted.push(handler.clone());
            }
            true
        });
        permitted.sort_unstable_by_key(|handler| handler.name());
        permitted
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        let dispatcher = Self::new();
        dispatcher.register(create::CreateCommand);
        dispatcher.register(cancel::CancelCommand);
        dispatcher.register(remove::RemoveCommand);
        dispatcher.register(member::MemberCommand);
        dispatcher.register(owner::OwnerCommand);
        dispatcher.register(flag::FlagCommand);
        dispatcher.register(flags::FlagsCommand);
        dispatcher.register(move_region::MoveCommand);
        dispatcher.register(size::SizeCommand);
        dispatcher.register(reload::ReloadCommand);
        dispatcher.register(help::HelpCommand);
        dispatcher.register(admin::AdminCommand);
        dispatcher
    }
}
