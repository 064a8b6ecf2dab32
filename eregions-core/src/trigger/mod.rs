//! Named command triggers.
//!
//! A trigger is a configured list of command lines fired when something happens: a region is
//! created, a member added, a boundary approached. Each line is rendered with the trigger's
//! placeholders when it fires and then queued. Consecutive lines are spaced by
//! `settings.command_delay_ms`.

mod action;
mod context;

use std::sync::Arc;

use eregions_utils::PlayerId;
use eregions_utils::ticks::ms_to_ticks;
use parking_lot::Mutex;

pub use action::{ActionParseError, CommandAction, DEFAULT_DISPLAY_SECONDS};
pub use context::{Placeholders, TriggerContext};

use crate::config::ConfigStore;
use crate::host::{Host, PlayerSnapshot};
use crate::message::{MessageService, Recipient};
use crate::scheduler::{ScheduledTask, TaskScheduler};

/// Fires configured triggers and runs their actions.
pub struct CommandTriggerManager {
    config: Arc<ConfigStore>,
    host: Arc<dyn Host>,
    scheduler: Arc<Mutex<TaskScheduler>>,
    messages: MessageService,
}

impl CommandTriggerManager {
    /// Creates a manager that queues actions on `scheduler`.
    #[must_use]
    pub fn new(
        config: Arc<ConfigStore>,
        host: Arc<dyn Host>,
        scheduler: Arc<Mutex<TaskScheduler>>,
        messages: MessageService,
    ) -> Self {
        Self {
            config,
            host,
            scheduler,
            messages,
        }
    }

    /// Fires a trigger for the player. Returns the number of actions queued.
    ///
    /// The n-th action runs `(n - 1) * command_delay` after the first. A trigger that is not
    /// configured, or has no commands, does nothing.
    pub fn execute(&self, name: &str, player: &PlayerSnapshot, context: &TriggerContext) -> usize {
        let config = self.config.get();
        let Some(actions) = config.trigger_actions(name).filter(|actions| !actions.is_empty())
        else {
            log::debug!("Trigger '{name}' is not configured or has no commands");
            return 0;
        };

        let step = ms_to_ticks(config.settings.command_delay_ms);
        let placeholders = context.bind(player);
        if config.settings.debug {
            log::debug!(
                "Firing trigger '{name}' for {} with {} commands",
                player.name,
                actions.len()
            );
        }

        let mut scheduler = self.scheduler.lock();
        for (index, action) in (0u64..).zip(actions) {
            let rendered = action.map_text(|text| placeholders.apply(text));
            log::trace!("Queued '{rendered}' for {} in {} ticks", player.name, index * step);
            scheduler.schedule(
                index * step,
                ScheduledTask::RunAction {
                    player: player.id,
                    action: rendered,
                },
            );
        }
        actions.len()
    }

    /// Fires a trigger after `delay` ticks, if the player is still online then.
    pub fn schedule_trigger(&self, name: &str, player: PlayerId, context: TriggerContext, delay: u64) {
        self.scheduler.lock().schedule(
            delay,
            ScheduledTask::FireTrigger {
                name: name.to_string(),
                player,
                context,
            },
        );
    }

    /// Runs a player command after `delay` ticks.
    pub fn schedule_player_command(&self, player: PlayerId, command: &str, delay: u64) {
        self.scheduler.lock().schedule(
            delay,
            ScheduledTask::RunPlayerCommand {
                player,
                command: command.to_string(),
            },
        );
    }

    /// Runs a task taken off the scheduler.
    pub fn run_task(&self, task: ScheduledTask) {
        match task {
            ScheduledTask::RunAction { player, action } => self.run_action(player, &action),
            ScheduledTask::RunPlayerCommand { player, command } => {
                self.dispatch_as_player(player, &command);
            }
            ScheduledTask::FireTrigger {
                name,
                player,
                context,
            } => match self.host.player(player) {
                Some(snapshot) => {
                    self.execute(&name, &snapshot, &context);
                }
                None => log::debug!("Skipping trigger '{name}': player {player} went offline"),
            },
            ScheduledTask::ClearActionBar { player } => {
                if self.host.is_online(player) {
                    self.messages.clear_action_bar(player);
                }
            }
        }
    }

    /// Runs one rendered action.
    pub fn run_action(&self, player: PlayerId, action: &CommandAction) {
        log::trace!("Running '{action}' for {player}");
        match action {
            CommandAction::RunAsPlayer(command) => {
                let config = self.config.get();
                let settings = &config.settings;
                let visualizer = format!("{} ", settings.visualizer_command);
                if command.starts_with(&visualizer) {
                    self.schedule_player_command(player, command, settings.visualizer_delay_ticks);
                } else {
                    self.dispatch_as_player(player, command);
                }
            }
            CommandAction::RunAsConsole(command) => {
                if !self.host.dispatch_as_console(command) {
                    log::warn!("Console command '{command}' failed");
                }
            }
            CommandAction::LogToConsole(text) => log::info!("{text}"),
            presentation => self.messages.present(Recipient::Player(player), presentation),
        }
    }

    fn dispatch_as_player(&self, player: PlayerId, command: &str) {
        if !self.host.is_online(player) {
            log::warn!("Player {player} is offline, not running '{command}'");
            return;
        }
        if !self.host.dispatch_as_player(player, command) {
            log::warn!("Command '{command}' failed for player {player}");
        }
    }
}
