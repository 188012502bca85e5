use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Counting gate that bounds outstanding GPU submissions.
///
/// Each slot is a token in a bounded channel: acquiring pushes a token,
/// releasing pops one. Permits are `Send` so they can ride along inside
/// `Queue::on_submitted_work_done` and free their slot once the GPU retires
/// the submission.
#[derive(Clone)]
pub(crate) struct InflightGate {
    slots: Sender<()>,
    returns: Receiver<()>,
    depth: usize,
}

impl InflightGate {
    pub(crate) fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        let (slots, returns) = bounded(depth);
        Self {
            slots,
            returns,
            depth,
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn try_acquire(&self) -> Option<InflightPermit> {
        match self.slots.try_send(()) {
            Ok(()) => Some(InflightPermit {
                returns: Some(self.returns.clone()),
            }),
            Err(TrySendError::Full(())) => None,
            // Unreachable while `self` holds the receiver.
            Err(TrySendError::Disconnected(())) => None,
        }
    }

    /// Takes a slot, running `wait` once to retire GPU work when the gate is full.
    pub(crate) fn acquire_with<F>(&self, wait: F) -> Option<InflightPermit>
    where
        F: FnOnce(),
    {
        if let Some(permit) = self.try_acquire() {
            return Some(permit);
        }
        tracing::trace!(depth = self.depth, "in-flight gate full; waiting on GPU");
        wait();
        self.try_acquire()
    }
}

/// One occupied in-flight slot. Dropping the permit frees the slot.
pub(crate) struct InflightPermit {
    returns: Option<Receiver<()>>,
}

impl InflightPermit {
    pub(crate) fn release(mut self) {
        self.release_slot();
    }

    fn release_slot(&mut self) {
        if let Some(returns) = self.returns.take() {
            let _ = returns.try_recv();
        }
    }
}

impl Drop for InflightPermit {
    fn drop(&mut self) {
        self.release_slot();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::INFLIGHT_FRAMES;

    #[test]
    fn bounds_outstanding_permits() {
        let gate = InflightGate::new(INFLIGHT_FRAMES);
        let permits: Vec<_> = (0..INFLIGHT_FRAMES)
            .map(|_| gate.try_acquire().expect("slot available"))
            .collect();
        assert_eq!(gate.in_flight(), 3);
        assert!(gate.try_acquire().is_none());

        drop(permits);
        assert_eq!(gate.in_flight(), 0);
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn release_frees_exactly_one_slot() {
        let gate = InflightGate::new(2);
        let first = gate.try_acquire().unwrap();
        let _second = gate.try_acquire().unwrap();
        first.release();
        assert_eq!(gate.in_flight(), 1);
        let _third = gate.try_acquire().unwrap();
        assert!(gate.try_acquire().is_none());
    }

    #[test]
    fn acquire_with_runs_wait_only_when_full() {
        let gate = InflightGate::new(1);
        let mut waited = false;
        let held = gate.acquire_with(|| waited = true).unwrap();
        assert!(!waited);

        // Simulates the GPU completion callback firing during the wait.
        let mut pending = Some(held);
        let permit = gate.acquire_with(|| {
            pending.take();
        });
        assert!(permit.is_some());
        assert!(pending.is_none());
    }

    #[test]
    fn acquire_with_gives_up_when_wait_frees_nothing() {
        let gate = InflightGate::new(1);
        let _held = gate.try_acquire().unwrap();
        assert!(gate.acquire_with(|| {}).is_none());
    }

    #[test]
    fn permits_release_from_other_threads() {
        let gate = InflightGate::new(1);
        let permit = gate.try_acquire().unwrap();
        std::thread::spawn(move || drop(permit)).join().unwrap();
        assert_eq!(gate.in_flight(), 0);
    }

    #[test]
    fn zero_depth_is_clamped() {
        let gate = InflightGate::new(0);
        assert_eq!(gate.depth(), 1);
    }
}
