//! The assembled plugin.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::boundary::BoundaryDetectionManager;
use crate::command::CommandDispatcher;
use crate::command::sender::CommandSender;
use crate::config::{ConfigError, ConfigStore};
use crate::host::{Clock, Host};
use crate::message::MessageService;
use crate::region::{DirectoryError, RegionDirectory, RegionService};
use crate::scheduler::TaskScheduler;
use crate::selection::{SelectionManager, SelectionTool};
use crate::trigger::CommandTriggerManager;

/// Ticks between sweeps for sessions of players who went offline.
pub const CLEANUP_INTERVAL_TICKS: u64 = 1200;

/// Every component of the plugin, wired together.
///
/// The host drives it by calling [`ERegions::tick`] once per server tick and forwarding player
/// events to the `on_*` handlers.
pub struct ERegions {
    host: Arc<dyn Host>,
    config: Arc<ConfigStore>,
    scheduler: Arc<Mutex<TaskScheduler>>,
    messages: MessageService,
    triggers: Arc<CommandTriggerManager>,
    regions: Arc<RegionService>,
    selections: SelectionManager,
    boundary: BoundaryDetectionManager,
    commands: CommandDispatcher,
}

impl ERegions {
    /// Builds the plugin on top of the host's ports.
    #[must_use]
    pub fn new(
        host: Arc<dyn Host>,
        clock: Arc<dyn Clock>,
        directory: Arc<dyn RegionDirectory>,
        tool: Arc<dyn SelectionTool>,
        config: Arc<ConfigStore>,
    ) -> Self {
        let scheduler = Arc::new(Mutex::new(TaskScheduler::new()));
        let messages = MessageService::new(host.clone(), config.clone(), scheduler.clone());
        let triggers = Arc::new(CommandTriggerManager::new(
            config.clone(),
            host.clone(),
            scheduler.clone(),
            messages.clone(),
        ));
        let regions = Arc::new(RegionService::new(directory, config.clone()));
        let selections = SelectionManager::new(
            tool,
            regions.clone(),
            triggers.clone(),
            config.clone(),
            clock.clone(),
        );
        let boundary = BoundaryDetectionManager::new(
            regions.clone(),
            triggers.clone(),
            config.clone(),
            host.clone(),
            clock,
        );

        log::info!("eRegions enabled");
        Self {
            host,
            config,
            scheduler,
            messages,
            triggers,
            regions,
            selections,
            boundary,
            commands: CommandDispatcher::default(),
        }
    }

    /// Advances the scheduler by one tick and runs whatever became due.
    pub fn tick(&self) {
        // The lock is released before running tasks, which may schedule more.
        let (tick, due) = {
            let mut scheduler = self.scheduler.lock();
            let due = scheduler.advance();
            (scheduler.current_tick(), due)
        };
        for task in due {
            self.triggers.run_task(task);
        }
        if tick % CLEANUP_INTERVAL_TICKS == 0 {
            self.selections.cleanup_inactive(self.host.as_ref());
        }
    }

    /// Runs `/eregion <line>`.
    pub fn handle_command(&self, sender: &CommandSender, line: &str) {
        self.commands.handle_command(self, sender, line);
    }

    /// Completions for `/eregion <args>`.
    #[must_use]
    pub fn tab_complete(&self, sender: &CommandSender, args: &[&str]) -> Vec<String> {
        self.commands.tab_complete(self, sender, args)
    }

    /// Re-reads the configuration. The old configuration stays live on error.
    ///
    /// # Errors
    /// Returns the load error.
    pub fn reload(&self) -> Result<(), ConfigError> {
        self.config.reload()?;
        log::info!("Configuration reloaded");
        Ok(())
    }

    /// Persists regions.
    ///
    /// # Errors
    /// Returns the directory's error.
    pub fn save(&self) -> Result<(), DirectoryError> {
        self.regions.save()
    }

    /// Saves regions and drops every session.
    pub fn shutdown(&self) {
        for player in self.host.online_players() {
            self.selections.cancel(player.id);
            self.boundary.clear(player.id);
        }
        if let Err(error) = self.save() {
            log::error!("Failed to save regions on shutdown: {error}");
        }
        log::info!("eRegions disabled");
    }

    /// The tick counter, advanced by [`ERegions::tick`].
    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.scheduler.lock().current_tick()
    }

    /// Number of tasks waiting in the scheduler.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.lock().pending()
    }

    /// The server ports.
    #[must_use]
    pub const fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    /// The live configuration.
    #[must_use]
    pub const fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    /// Message delivery.
    #[must_use]
    pub const fn messages(&self) -> &MessageService {
        &self.messages
    }

    /// Trigger execution.
    #[must_use]
    pub const fn triggers(&self) -> &Arc<CommandTriggerManager> {
        &self.triggers
    }

    /// Region access.
    #[must_use]
    pub const fn regions(&self) -> &Arc<RegionService> {
        &self.regions
    }

    /// Selection sessions.
    #[must_use]
    pub const fn selections(&self) -> &SelectionManager {
        &self.selections
    }

    /// Boundary detection.
    #[must_use]
    pub const fn boundary(&self) -> &BoundaryDetectionManager {
        &self.boundary
    }

    /// The `/eregion` dispatcher.
    #[must_use]
    pub const fn commands(&self) -> &CommandDispatcher {
        &self.commands
    }
}
