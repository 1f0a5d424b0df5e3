//! Single-shot delayed tasks.
//!
//! Stands in for engine coroutines: a task is scheduled for a future tick,
//! can be cancelled before it fires, and is handed back to the world when
//! due. Tasks carry enough context for the world to decide whether they are
//! still relevant when they fire.

use serde::{Deserialize, Serialize};

use crate::components::NestId;

/// Handle to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u64);

/// Work the world runs when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Task {
    /// Build a nest's starting units.
    ///
    /// Only valid if the nest is still active in the same activation.
    SeedNest {
        /// Nest to seed.
        nest: NestId,
        /// Activation epoch the task was scheduled in.
        epoch: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Scheduled {
    id: TaskId,
    due: u64,
    task: Task,
}

/// Timer queue keyed by simulation tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    pending: Vec<Scheduled>,
    next_id: u64,
}

impl Scheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to fire at tick `due`.
    pub fn schedule(&mut self, due: u64, task: Task) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled { id, due, task });
        id
    }

    /// Cancel a pending task. Returns `false` if it already fired or never existed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.id != id);
        self.pending.len() != before
    }

    /// Remove and return every task due at or before `now`.
    ///
    /// Ordered by due tick, then by scheduling order.
    pub fn take_due(&mut self, now: u64) -> Vec<Task> {
        let mut due: Vec<Scheduled> = Vec::new();
        self.pending.retain(|s| {
            if s.due <= now {
                due.push(s.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|s| (s.due, s.id));
        due.into_iter().map(|s| s.task).collect()
    }

    /// Number of tasks waiting to fire.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
