use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Single slot: a second open before the first close loses the first snapshot
pub const DEFAULT_BACKUP_DEPTH: usize = 1;

/// Identifies a snapshot taken when an overlay opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotHandle(u64);

impl SnapshotHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Bounded stack of DigitalData snapshots
#[derive(Debug)]
pub struct SnapshotStack {
    depth: usize,
    next_id: u64,
    entries: VecDeque<(SnapshotHandle, Value)>,
}

impl SnapshotStack {
    pub fn new(depth: usize) -> Self {
        Self {
            depth: depth.max(1),
            next_id: 0,
            entries: VecDeque::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Save a snapshot, evicting the oldest one when the stack is full
    pub fn push(&mut self, snapshot: Value) -> SnapshotHandle {
        if self.entries.len() >= self.depth {
            if let Some((evicted, _)) = self.entries.pop_front() {
                warn!(
                    snapshot = evicted.id(),
                    depth = self.depth,
                    "Snapshot overwritten before its overlay closed"
                );
            }
        }

        let handle = SnapshotHandle(self.next_id);
        self.next_id += 1;
        self.entries.push_back((handle, snapshot));
        handle
    }

    /// Take the most recent snapshot
    pub fn pop(&mut self) -> Option<Value> {
        self.entries.pop_back().map(|(_, snapshot)| snapshot)
    }

    /// Take a specific snapshot; newer snapshots are discarded with it
    pub fn take(&mut self, handle: SnapshotHandle) -> Option<Value> {
        let position = self.entries.iter().position(|(h, _)| *h == handle)?;
        let discarded = self.entries.len() - position - 1;
        if discarded > 0 {
            warn!(
                snapshot = handle.id(),
                discarded = discarded,
                "Closing an outer overlay discards nested snapshots"
            );
        }

        let (_, snapshot) = self.entries.remove(position)?;
        self.entries.truncate(position);
        Some(snapshot)
    }
}

impl Default for SnapshotStack {
    fn default() -> Self {
        Self::new(DEFAULT_BACKUP_DEPTH)
    }
}
