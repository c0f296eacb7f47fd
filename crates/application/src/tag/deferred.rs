use std::collections::VecDeque;

/// Work postponed to the next tick of the host loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Re-apply context data after an overlay closed, optionally firing a view
    Refresh { notify_view: bool },
}

/// FIFO queue of deferred continuations.
///
/// Nothing runs until the owner drains it, so ordering is deterministic.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    tasks: VecDeque<Deferred>,
}

impl DeferredQueue {
    pub fn schedule(&mut self, task: Deferred) {
        self.tasks.push_back(task);
    }

    /// Take every task scheduled so far, oldest first.
    ///
    /// Tasks scheduled while the batch runs belong to the next tick.
    pub fn take_pending(&mut self) -> Vec<Deferred> {
        self.tasks.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
