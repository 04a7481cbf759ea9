use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Maximum number of activity probes talking to the service at once.
pub const PROBE_CONCURRENCY: usize = 5;

/// Counting admission gate with occupancy instrumentation.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    inner: Arc<GateInner>,
}

#[derive(Debug)]
struct GateInner {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    occupied: AtomicUsize,
    high_water: AtomicUsize,
}

impl AdmissionGate {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(GateInner {
                semaphore: Arc::new(Semaphore::new(capacity)),
                capacity,
                occupied: AtomicUsize::new(0),
                high_water: AtomicUsize::new(0),
            }),
        }
    }

    /// Waits for a free slot. Returns `None` only if the gate was closed.
    pub async fn admit(&self) -> Option<GateSlot> {
        let permit = self.inner.semaphore.clone().acquire_owned().await.ok()?;
        let occupied = self.inner.occupied.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.high_water.fetch_max(occupied, Ordering::SeqCst);
        Some(GateSlot {
            inner: self.inner.clone(),
            _permit: permit,
        })
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn occupied(&self) -> usize {
        self.inner.occupied.load(Ordering::SeqCst)
    }

    /// Highest number of slots ever held at the same time.
    pub fn high_water_mark(&self) -> usize {
        self.inner.high_water.load(Ordering::SeqCst)
    }
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::new(PROBE_CONCURRENCY)
    }
}

/// A held slot; released when dropped, on every exit path.
#[derive(Debug)]
pub struct GateSlot {
    inner: Arc<GateInner>,
    _permit: OwnedSemaphorePermit,
}

impl Drop for GateSlot {
    fn drop(&mut self) {
        self.inner.occupied.fetch_sub(1, Ordering::SeqCst);
    }
}
