//! Bounded blocking FIFO of task indices with a one-way close.
//!
//! One mutex guards the buffer, the count and the closed flag. Two condition
//! variables signal the transitions: `not_empty` wakes poppers, `not_full`
//! wakes pushers. Push and pop wake a single waiter; [`BoundedQueue::close`]
//! wakes every waiter so that all idle workers observe closure.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Returned by [`BoundedQueue::push`] once the queue has been closed. Carries
/// the rejected item back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Closed<T>(pub T);

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

pub struct BoundedQueue<T> {
    state: Mutex<QueueState<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Creates an open, empty queue. Returns `None` when `capacity` is 0.
    pub fn new(capacity: usize) -> Option<Self> {
        if capacity == 0 {
            return None;
        }
        Some(BoundedQueue {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        })
    }

    // Every critical section leaves the state consistent, so a poisoned lock
    // is still safe to reuse.
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `item`, blocking while the queue is full.
    ///
    /// Fails as soon as the queue is closed, even when space is available.
    pub fn push(&self, item: T) -> Result<(), Closed<T>> {
        let mut state = self.lock();
        while state.items.len() == self.capacity && !state.closed {
            state = self
                .not_full
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if state.closed {
            return Err(Closed(item));
        }
        state.items.push_back(item);
        debug_assert!(state.items.len() <= self.capacity);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Removes the oldest item, blocking while the queue is empty and open.
    ///
    /// Returns `None` only once the queue is closed *and* drained.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.lock();
        while state.items.is_empty() && !state.closed {
            state = self
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        let item = state.items.pop_front()?;
        drop(state);
        self.not_full.notify_one();
        Some(item)
    }

    /// Marks the queue closed and wakes all blocked poppers and pushers.
    /// Items already queued remain poppable.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        drop(state);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Closes the queue and discards every queued item, so the next `pop`
    /// on every thread returns `None`. Returns the number of items dropped.
    pub fn cancel(&self) -> usize {
        let mut state = self.lock();
        state.closed = true;
        let dropped = state.items.len();
        state.items.clear();
        drop(state);
        self.not_empty.notify_all();
        self.not_full.notify_all();
        dropped
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
