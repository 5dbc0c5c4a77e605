//! Cooperative task queue
//!
//! Work handed to the scheduler runs on the next tick of the owner's update
//! loop, never synchronously. Every task gets a token; cancelling a token
//! removes the task so it can never run.

use std::collections::VecDeque;

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskToken(u64);

/// Single-threaded FIFO of deferred tasks
#[derive(Debug)]
pub struct Scheduler<T> {
    tasks: VecDeque<(TaskToken, T)>,
    next_token: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
            next_token: 0,
        }
    }

    /// Enqueue a task for the next tick
    pub fn schedule(&mut self, task: T) -> TaskToken {
        let token = TaskToken(self.next_token);
        self.next_token += 1;
        self.tasks.push_back((token, task));
        token
    }

    /// Cancel a pending task
    ///
    /// Returns the task if it had not run yet.
    pub fn cancel(&mut self, token: TaskToken) -> Option<T> {
        let index = self.tasks.iter().position(|(t, _)| *t == token)?;
        self.tasks.remove(index).map(|(_, task)| task)
    }

    /// Get a pending task
    pub fn get(&self, token: TaskToken) -> Option<&T> {
        self.tasks
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, task)| task)
    }

    /// Check if a task is still waiting to run
    pub fn is_pending(&self, token: TaskToken) -> bool {
        self.tasks.iter().any(|(t, _)| *t == token)
    }

    /// Token that the next scheduled task will get
    ///
    /// Taken at the start of a tick: tasks enqueued while the tick runs get
    /// a token at or past the boundary and wait for the following tick.
    pub fn boundary(&self) -> TaskToken {
        TaskToken(self.next_token)
    }

    /// Pop the oldest task scheduled before `boundary`
    pub fn pop_due(&mut self, boundary: TaskToken) -> Option<(TaskToken, T)> {
        match self.tasks.front() {
            Some((token, _)) if *token < boundary => self.tasks.pop_front(),
            _ => None,
        }
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
