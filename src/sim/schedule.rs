//! Deferred phase work (respawn debounce, won -> letter delay, auto finale)
//!
//! Entries carry the session generation they were scheduled under. A reset
//! bumps the generation, so anything queued before it is recognisably stale
//! when it comes due.

use std::collections::VecDeque;

/// Work that runs a fixed number of ticks after it was scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredEvent {
    /// Bring back a fresh actor after a collection
    RespawnActor,
    /// Move from `Won` to `LetterOpen`
    OpenLetter,
    /// Move from `LetterOpen` to `Finale` without user action
    StartFinale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub due_tick: u64,
    pub generation: u32,
    pub event: DeferredEvent,
}

/// FIFO timer queue driven by the simulation tick counter
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    /// Sorted by due tick; equal due ticks keep insertion order
    pending: VecDeque<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `event` to fire `delay_ticks` after `now`
    pub fn schedule(&mut self, now: u64, delay_ticks: u64, generation: u32, event: DeferredEvent) {
        let entry = Scheduled {
            due_tick: now + delay_ticks,
            generation,
            event,
        };
        // Insert after every entry due at or before this one
        let idx = self.pending.partition_point(|s| s.due_tick <= entry.due_tick);
        self.pending.insert(idx, entry);
    }

    /// Remove and return everything due at `now`, oldest first
    pub fn take_due(&mut self, now: u64) -> Vec<Scheduled> {
        let split = self.pending.partition_point(|s| s.due_tick <= now);
        self.pending.drain(..split).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
