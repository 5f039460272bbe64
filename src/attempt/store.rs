//! Bounded store of committed attempts

use super::Attempt;

/// Committed attempts in commit order, never more than `capacity`
#[derive(Debug, Clone)]
pub struct AttemptStore {
    capacity: usize,
    attempts: Vec<Attempt>,
    persisted: usize,
}

impl AttemptStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            attempts: Vec::with_capacity(capacity),
            persisted: 0,
        }
    }

    /// Seal an attempt into the store, assigning the next attempt number.
    ///
    /// Returns the attempt number, or `None` when the store is already full
    /// and the attempt was not recorded.
    pub fn commit(&mut self, mut attempt: Attempt) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let number = self.attempts.len() + 1;
        attempt.assign_number(number);
        self.attempts.push(attempt);
        Some(number)
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.attempts.len() >= self.capacity
    }

    /// Attempts not yet written to persistent storage
    pub fn pending(&self) -> &[Attempt] {
        &self.attempts[self.persisted..]
    }

    /// Mark every attempt up to the current length as persisted
    pub fn mark_persisted(&mut self) {
        self.persisted = self.attempts.len();
    }

    pub fn persisted(&self) -> usize {
        self.persisted
    }
}
