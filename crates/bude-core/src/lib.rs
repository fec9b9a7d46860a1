//! # bude-core
//!
//! Host-side building blocks for the BUDE docking benchmark:
//! - **Types**: `Atom`, `FFParams`, `PoseSet` and the run constants
//! - **Deck**: binary deck loading with record truncation semantics
//! - **Metrics**: FLOP, instruction and interaction rates from elapsed time
//! - **Validation**: relative-difference check against reference energies
//! - **Errors**: `BudeError` shared by every crate in the workspace
//!
//! ```text
//! ┌─────────────┐
//! │  bude-core  │  ← records, deck, metrics, validation
//! └─────────────┘
//!        ▲
//! ┌──────┴──────┐
//! │  bude-gpu   │  ← devices, shared memory, queue, dispatch
//! └─────────────┘
//!        ▲
//! ┌──────┴──────┐
//! │  bude-cli   │  ← configuration, reporting, `bude` binary
//! └─────────────┘
//! ```

pub mod deck;
pub mod errors;
pub mod metrics;
pub mod types;
pub mod validation;

pub use deck::{read_records, write_records, Deck};
pub use errors::{BudeError, Result};
pub use metrics::KernelMetrics;
pub use types::{Atom, FFParams, PoseSet, WorkloadShape};
pub use validation::{ReferenceEnergies, ValidationReport};
