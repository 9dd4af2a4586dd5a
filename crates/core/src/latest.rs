use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    sequence: u64,
}

/// Single-slot latest-value channel.
///
/// A publish overwrites any value nobody has taken yet; there is never more
/// than one value waiting. The lock is held only to swap the slot.
#[derive(Debug)]
pub struct LatestValue<T> {
    slot: Mutex<Slot<T>>,
}

impl<T> Default for LatestValue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestValue<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                value: None,
                sequence: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        // A panicking writer cannot leave the slot half-written.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if an unconsumed value was replaced.
    pub fn publish(&self, value: T) -> bool {
        let mut slot = self.lock();
        slot.sequence = slot.sequence.wrapping_add(1);
        slot.value.replace(value).is_some()
    }

    /// Like [`LatestValue::publish`], but lets `merge` carry state from an
    /// unconsumed value into its replacement before it is dropped.
    pub fn publish_merge<F>(&self, mut value: T, merge: F) -> bool
    where
        F: FnOnce(&T, &mut T),
    {
        let mut slot = self.lock();
        slot.sequence = slot.sequence.wrapping_add(1);
        if let Some(pending) = slot.value.as_ref() {
            merge(pending, &mut value);
        }
        slot.value.replace(value).is_some()
    }

    pub fn take(&self) -> Option<T> {
        self.lock().value.take()
    }

    /// Number of values ever published.
    pub fn sequence(&self) -> u64 {
        self.lock().sequence
    }

    pub fn has_pending(&self) -> bool {
        self.lock().value.is_some()
    }
}

impl<T: Clone> LatestValue<T> {
    pub fn peek(&self) -> Option<T> {
        self.lock().value.clone()
    }
}
