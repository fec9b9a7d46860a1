//! In-order command queue bound to one device.
//!
//! Commands run in submission order and never overlap. Host devices execute a
//! command inside the queue's own rayon pool, so parallel work a kernel spawns
//! stays on the device's workers. Failures are carried by the returned
//! [`Event`] and surface when the host waits on it.

use bude_core::{BudeError, Result};
use bytemuck::Pod;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::time::{Duration, Instant};

use crate::device::Device;
use crate::usm::{SharedAllocator, SharedBuffer};

/// Completion handle for one submitted command.
#[derive(Debug)]
#[must_use = "an event must be waited on before its results are read"]
pub struct Event {
    sequence: u64,
    elapsed: Duration,
    outcome: Result<()>,
}

impl Event {
    /// Position of the command in the queue's submission order.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Device-side execution time of the command.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Blocks until the command completes and returns its outcome.
    pub fn wait(self) -> Result<()> {
        self.outcome
    }
}

/// A single in-order queue.
pub struct InOrderQueue {
    device: Device,
    pool: ThreadPool,
    allocator: SharedAllocator,
    submitted: u64,
    pending: Vec<Event>,
}

impl InOrderQueue {
    /// Creates a queue on `device`, spinning up its worker pool.
    pub fn new(device: &Device) -> Result<Self> {
        let workers = device.worker_threads();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("bude-device-{}", i))
            .build()
            .map_err(|e| BudeError::device("queue creation", e.to_string()))?;

        log::info!(
            "Created in-order queue on {} ({} workers)",
            device.name(),
            workers
        );

        Ok(Self {
            device: device.clone(),
            pool,
            allocator: SharedAllocator::new(device.name(), device.shared_capacity()),
            submitted: 0,
            pending: Vec::new(),
        })
    }

    /// Device this queue submits to.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Allocator for memory shared between the host and this queue's device.
    pub fn allocator(&self) -> &SharedAllocator {
        &self.allocator
    }

    /// Number of commands submitted so far.
    pub fn submitted(&self) -> u64 {
        self.submitted
    }

    /// Submits a command group and returns its completion event.
    pub fn submit<F>(&mut self, command: F) -> Event
    where
        F: FnOnce() -> Result<()> + Send,
    {
        let sequence = self.submitted;
        self.submitted += 1;

        let start = Instant::now();
        let outcome = self.pool.install(command);
        let elapsed = start.elapsed();

        log::trace!(
            "Command {} on {} finished in {:?}",
            sequence,
            self.device.name(),
            elapsed
        );

        Event {
            sequence,
            elapsed,
            outcome,
        }
    }

    /// Copies `src` into the shared buffer `dst`; lengths must match.
    pub fn copy<T: Pod + Send + Sync>(&mut self, src: &[T], dst: &mut SharedBuffer<T>) -> Event {
        self.submit(|| {
            if src.len() != dst.len() {
                return Err(BudeError::invalid_argument(format!(
                    "copy of {} elements into a shared buffer of {}",
                    src.len(),
                    dst.len()
                )));
            }
            dst.copy_from_slice(src);
            Ok(())
        })
    }

    /// Fills the shared buffer `dst` with `value`.
    pub fn fill<T: Pod + Send + Sync>(&mut self, dst: &mut SharedBuffer<T>, value: T) -> Event {
        self.submit(|| {
            dst.fill(value);
            Ok(())
        })
    }

    /// Records an event to be collected by the next [`InOrderQueue::wait`].
    pub fn defer(&mut self, event: Event) {
        self.pending.push(event);
    }

    /// Waits for every deferred event, returning the first failure.
    pub fn wait(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        for event in pending {
            event.wait()?;
        }
        log::trace!("Queue on {} drained {} events", self.device.name(), count);
        Ok(())
    }
}

impl std::fmt::Debug for InOrderQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InOrderQueue")
            .field("device", &self.device.name())
            .field("submitted", &self.submitted)
            .field("pending", &self.pending.len())
            .finish()
    }
}
