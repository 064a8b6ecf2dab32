//! Delayed work, measured in server ticks.
//!
//! Tasks are plain data. The plugin drains the due ones every tick and runs them itself, so
//! nothing scheduled here can hold a borrow of the plugin or outlive it.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use eregions_utils::PlayerId;

use crate::trigger::CommandAction;
use crate::trigger::TriggerContext;

/// A unit of delayed work.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledTask {
    /// Runs an already rendered action on behalf of a player.
    RunAction {
        /// The triggering player.
        player: PlayerId,
        /// What to do.
        action: CommandAction,
    },
    /// Runs a command as the player, skipping any further delay rules.
    RunPlayerCommand {
        /// The acting player.
        player: PlayerId,
        /// The command line.
        command: String,
    },
    /// Fires a named trigger for a player who must still be online.
    FireTrigger {
        /// Trigger name.
        name: String,
        /// The triggering player.
        player: PlayerId,
        /// Placeholder values captured when scheduled.
        context: TriggerContext,
    },
    /// Clears the player's action bar.
    ClearActionBar {
        /// Whose action bar.
        player: PlayerId,
    },
}

impl ScheduledTask {
    /// The player the task acts for.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        match self {
            Self::RunAction { player, .. }
            | Self::RunPlayerCommand { player, .. }
            | Self::FireTrigger { player, .. }
            | Self::ClearActionBar { player } => *player,
        }
    }
}

#[derive(Debug)]
struct Entry {
    due: u64,
    sequence: u64,
    task: ScheduledTask,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.sequence).cmp(&(other.due, other.sequence))
    }
}

/// A tick-driven queue of delayed tasks.
///
/// Tasks due on the same tick run in the order they were scheduled.
#[derive(Debug, Default)]
pub struct TaskScheduler {
    current_tick: u64,
    next_sequence: u64,
    queue: BinaryHeap<Reverse<Entry>>,
}

impl TaskScheduler {
    /// Creates an empty scheduler at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last tick that was advanced to.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Number of tasks still waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queues a task to run `delay` ticks from now.
    ///
    /// A delay of 0 runs on the next tick, never during the current one.
    pub fn schedule(&mut self, delay: u64, task: ScheduledTask) {
        let entry = Entry {
            due: self.current_tick + delay.max(1),
            sequence: self.next_sequence,
            task,
        };
        self.next_sequence += 1;
        self.queue.push(Reverse(entry));
    }

    /// Moves to the next tick and removes every task now due, in run order.
    pub fn advance(&mut self) -> Vec<ScheduledTask> {
        self.current_tick += 1;

        let mut due = Vec::new();
        while let Some(Reverse(entry)) = self.queue.peek() {
            if entry.due > self.current_tick {
                break;
            }
            if let Some(Reverse(entry)) = self.queue.pop() {
                due.push(entry.task);
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear(player: PlayerId) -> ScheduledTask {
        ScheduledTask::ClearActionBar { player }
    }

    #[test]
    fn test_zero_delay_runs_next_tick() {
        let mut scheduler = TaskScheduler::new();
        let player = PlayerId::random();
        scheduler.schedule(0, clear(player));
        assert_eq!(scheduler.advance(), vec![clear(player)]);
        assert!(scheduler.advance().is_empty());
    }

    #[test]
    fn test_due_order_then_insertion_order() {
        let mut scheduler = TaskScheduler::new();
        let (a, b, c) = (PlayerId::random(), PlayerId::random(), PlayerId::random());
        scheduler.schedule(2, clear(a));
        scheduler.schedule(1, clear(b));
        scheduler.schedule(2, clear(c));

        assert_eq!(scheduler.advance(), vec![clear(b)]);
        assert_eq!(scheduler.advance(), vec![clear(a), clear(c)]);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.current_tick(), 2);
    }

    #[test]
    fn test_tasks_scheduled_later_are_relative_to_now() {
        let mut scheduler = TaskScheduler::new();
        let player = PlayerId::random();
        scheduler.advance();
        scheduler.advance();
        scheduler.schedule(3, clear(player));
        assert!(scheduler.advance().is_empty());
        assert!(scheduler.advance().is_empty());
        assert_eq!(scheduler.advance().len(), 1);
    }
}
