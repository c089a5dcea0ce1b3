//! Admission control for job submissions.
//!
//! A bounded semaphore evaluated at submission time. The permit is moved
//! into the worker task and released when the task drops it, so the slot
//! is held for the full duration of the job on every exit path.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Try-acquire slot gate for concurrently active jobs.
pub struct AdmissionControl {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionControl {
    /// Create a gate with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Try to claim a slot. `None` means the service is at capacity.
    pub fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.permits).try_acquire_owned().ok()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_slot_rejects_second_submission() {
        let gate = AdmissionControl::new(1);

        let permit = gate.try_acquire().expect("first acquire");
        assert!(gate.try_acquire().is_none());

        drop(permit);
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn test_capacity_and_availability() {
        let gate = AdmissionControl::new(2);
        assert_eq!(gate.capacity(), 2);
        assert_eq!(gate.available(), 2);

        let _a = gate.try_acquire().unwrap();
        assert_eq!(gate.available(), 1);
    }
}
