//! # bude-gpu
//!
//! Execution layer for the BUDE benchmark.
//! Devices, unified shared memory, the in-order queue and the fasten dispatch.

pub mod device;
pub mod dispatch;
pub mod kernel;
pub mod marshal;
pub mod queue;
pub mod usm;

// Host reference scoring kernel
pub mod host_fasten;

pub use device::{Device, DeviceInfo, DeviceKind, DeviceRegistry, Selection, SelectionRule};
pub use dispatch::{run_benchmark, BenchmarkRun, DispatchPlan, PhaseTimings};
pub use host_fasten::HostFasten;
pub use kernel::{FastenArgs, FastenKernel};
pub use marshal::{PoseBuffers, SharedDeck};
pub use queue::{Event, InOrderQueue};
pub use usm::{SharedAllocator, SharedBuffer, UsmStats};
