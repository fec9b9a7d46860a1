//! Unified shared memory.
//!
//! A [`SharedBuffer`] is one allocation addressable by the host and by kernels
//! running on the device without an explicit transfer. Buffers come from a
//! [`SharedAllocator`] bound to a queue's device; the allocator tracks live and
//! peak bytes and refuses allocations past the device capacity.
//!
//! Buffers own their memory and release it when dropped, so a run's buffers
//! are freed together when the marshaled deck goes out of scope.

use bude_core::{BudeError, Result};
use bytemuck::Pod;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct UsmAccounting {
    live: AtomicUsize,
    peak: AtomicUsize,
    allocations: AtomicUsize,
}

/// Allocation statistics for one allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsmStats {
    pub live_bytes: usize,
    pub peak_bytes: usize,
    /// Allocations made over the allocator's lifetime
    pub allocations: usize,
}

/// Hands out shared allocations for one device.
#[derive(Debug, Clone)]
pub struct SharedAllocator {
    device_name: String,
    capacity: Option<usize>,
    accounting: Arc<UsmAccounting>,
}

impl SharedAllocator {
    pub fn new(device_name: impl Into<String>, capacity: Option<usize>) -> Self {
        Self {
            device_name: device_name.into(),
            capacity,
            accounting: Arc::new(UsmAccounting::default()),
        }
    }

    /// Allocates `len` zero-initialised elements.
    pub fn alloc_zeroed<T: Pod>(&self, len: usize) -> Result<SharedBuffer<T>> {
        let bytes = len * std::mem::size_of::<T>();
        self.reserve(bytes)?;

        log::trace!(
            "Shared alloc on {}: {} x {} ({} bytes)",
            self.device_name,
            len,
            std::any::type_name::<T>(),
            bytes
        );

        Ok(SharedBuffer {
            data: bytemuck::zeroed_slice_box(len),
            accounting: Arc::clone(&self.accounting),
        })
    }

    fn reserve(&self, bytes: usize) -> Result<()> {
        let acc = &self.accounting;
        let live = acc.live.fetch_add(bytes, Ordering::SeqCst) + bytes;

        if let Some(capacity) = self.capacity {
            if live > capacity {
                acc.live.fetch_sub(bytes, Ordering::SeqCst);
                return Err(BudeError::SharedMemoryExhausted {
                    requested: bytes,
                    live: live - bytes,
                    capacity,
                });
            }
        }

        acc.peak.fetch_max(live, Ordering::SeqCst);
        acc.allocations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    pub fn stats(&self) -> UsmStats {
        UsmStats {
            live_bytes: self.accounting.live.load(Ordering::SeqCst),
            peak_bytes: self.accounting.peak.load(Ordering::SeqCst),
            allocations: self.accounting.allocations.load(Ordering::SeqCst),
        }
    }
}

/// A single-owner shared allocation of `T` records.
pub struct SharedBuffer<T: Pod> {
    data: Box<[T]>,
    accounting: Arc<UsmAccounting>,
}

impl<T: Pod> SharedBuffer<T> {
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of_val(&*self.data)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Pod> Deref for SharedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T: Pod> DerefMut for SharedBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Pod> std::fmt::Debug for SharedBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("type", &std::any::type_name::<T>())
            .field("len", &self.data.len())
            .finish()
    }
}

impl<T: Pod> Drop for SharedBuffer<T> {
    fn drop(&mut self) {
        self.accounting
            .live
            .fetch_sub(self.size_bytes(), Ordering::SeqCst);
    }
}
