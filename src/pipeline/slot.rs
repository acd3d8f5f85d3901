//! Per-task result slots.
//!
//! Each slot is its own mutex/condvar pair: workers publishing different
//! tasks never contend, and the writer waits on exactly the slot it needs.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::TaskError;

/// Compressed result of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutput {
    pub compressed: Vec<u8>,
    pub original_len: usize,
}

impl TaskOutput {
    pub fn compressed_len(&self) -> usize {
        self.compressed.len()
    }
}

#[derive(Debug)]
enum SlotState {
    Pending,
    Ready(TaskOutput),
    Failed(TaskError),
    Taken,
}

/// Returned when a slot is published a second time; the original outcome is
/// kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyPublished;

/// Single-writer, single-reader cell holding one task's outcome.
#[derive(Debug)]
pub struct ResultSlot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl Default for ResultSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultSlot {
    pub fn new() -> Self {
        ResultSlot {
            state: Mutex::new(SlotState::Pending),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settle(&self, outcome: SlotState) -> Result<(), AlreadyPublished> {
        let mut state = self.lock();
        if !matches!(*state, SlotState::Pending) {
            return Err(AlreadyPublished);
        }
        *state = outcome;
        drop(state);
        self.ready.notify_all();
        Ok(())
    }

    /// Stores a successful result and wakes the writer.
    pub fn publish(&self, output: TaskOutput) -> Result<(), AlreadyPublished> {
        self.settle(SlotState::Ready(output))
    }

    /// Stores a task failure and wakes the writer.
    pub fn fail(&self, error: TaskError) -> Result<(), AlreadyPublished> {
        self.settle(SlotState::Failed(error))
    }

    /// True once the slot left the pending state.
    pub fn is_settled(&self) -> bool {
        !matches!(*self.lock(), SlotState::Pending)
    }

    /// Blocks until the slot is settled and moves its outcome out.
    ///
    /// A second call returns [`TaskError::AlreadyTaken`].
    pub fn await_ready(&self) -> Result<TaskOutput, TaskError> {
        let mut state = self.lock();
        // Re-check after every wake-up: condvars may wake spuriously.
        while matches!(*state, SlotState::Pending) {
            state = self.ready.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        match std::mem::replace(&mut *state, SlotState::Taken) {
            SlotState::Ready(output) => Ok(output),
            SlotState::Failed(error) => Err(error),
            SlotState::Taken => Err(TaskError::AlreadyTaken),
            SlotState::Pending => unreachable!("wait loop exits only once settled"),
        }
    }
}

/// One [`ResultSlot`] per task, indexed like the file list.
#[derive(Debug)]
pub struct SlotTable {
    slots: Vec<ResultSlot>,
}

impl SlotTable {
    pub fn new(len: usize) -> Self {
        SlotTable {
            slots: (0..len).map(|_| ResultSlot::new()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// # Panics
    /// Panics if `index` is out of range; task indices always come from the
    /// same list the table was sized from.
    pub fn slot(&self, index: usize) -> &ResultSlot {
        &self.slots[index]
    }

    #[cfg(test)]
    pub(crate) fn get(&self, index: usize) -> Option<&ResultSlot> {
        self.slots.get(index)
    }
}
